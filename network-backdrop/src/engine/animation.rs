//! Frame-driven rotation of the backdrop scene.
//!
//! The scheduler is a component on the scene root. Bevy runs `Update` once
//! per presented frame (vsync), so `advance_backdrop_frames` executes at the
//! display's refresh cadence and its mutation is visible to that frame's
//! render. Stopping deactivates the scene camera and the state flag keeps the
//! system from touching the scene again.

use std::f32::consts::TAU;
use std::f64::consts::TAU as TAU_F64;

use bevy::prelude::*;
use serde::Serialize;

use crate::engine::config::RotationStep;
use crate::engine::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    Idle,
    Running,
    Stopped,
}

/// Per-scene frame scheduler. `Stopped` is terminal.
#[derive(Component, Debug)]
pub struct AnimationScheduler {
    state: SchedulerState,
    step: RotationStep,
    frames: u64,
}

impl AnimationScheduler {
    pub fn new(step: RotationStep) -> Self {
        Self {
            state: SchedulerState::Idle,
            step,
            frames: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    /// Frames advanced since `start`.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn start(&mut self) -> Result<(), EngineError> {
        match self.state {
            SchedulerState::Idle => {
                self.state = SchedulerState::Running;
                Ok(())
            }
            SchedulerState::Running => Ok(()),
            SchedulerState::Stopped => Err(EngineError::InvalidTransition {
                from: SchedulerState::Stopped,
                to: SchedulerState::Running,
            }),
        }
    }

    /// Idempotent.
    pub fn stop(&mut self) {
        self.state = SchedulerState::Stopped;
    }

    /// Advance one frame if running. Returns whether anything changed.
    pub fn tick(&mut self, rotation: &mut SceneRotation) -> bool {
        if !self.is_running() {
            return false;
        }
        rotation.advance(self.step);
        self.frames += 1;
        true
    }
}

/// Scene orientation in radians, kept within `[0, 2π)` per axis. Completed
/// turns are counted separately so the unwrapped angle keeps growing while
/// the rendered angle stays precise.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct SceneRotation {
    pub x: f32,
    pub y: f32,
    turns_x: u64,
    turns_y: u64,
}

impl SceneRotation {
    pub fn advance(&mut self, step: RotationStep) {
        (self.x, self.turns_x) = wrap_angle(self.x + step.x, self.turns_x);
        (self.y, self.turns_y) = wrap_angle(self.y + step.y, self.turns_y);
    }

    /// Total angle turned about x since the scene was created.
    pub fn unwrapped_x(&self) -> f64 {
        self.turns_x as f64 * TAU_F64 + self.x as f64
    }

    /// Total angle turned about y since the scene was created.
    pub fn unwrapped_y(&self) -> f64 {
        self.turns_y as f64 * TAU_F64 + self.y as f64
    }

    pub fn to_quat(self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.x, self.y, 0.0)
    }
}

fn wrap_angle(angle: f32, turns: u64) -> (f32, u64) {
    if angle < TAU {
        return (angle, turns);
    }
    let wrapped = angle.rem_euclid(TAU);
    (wrapped, turns + (angle / TAU).floor() as u64)
}

/// Marker for meshes rotated by the scheduler
#[derive(Component)]
pub struct BackdropDrawable;

/// Drawables owned by a scene root
#[derive(Component, Debug, Clone, Copy)]
pub struct SceneDrawables {
    pub points: Entity,
    pub edges: Entity,
}

/// Rotate every running scene by one step and write the orientation to
/// both of its drawables.
pub fn advance_backdrop_frames(
    mut scenes: Query<(&mut AnimationScheduler, &mut SceneRotation, &SceneDrawables)>,
    mut drawables: Query<&mut Transform, With<BackdropDrawable>>,
) {
    for (mut scheduler, mut rotation, scene) in &mut scenes {
        if !scheduler.tick(&mut rotation) {
            continue;
        }

        let orientation = rotation.to_quat();
        for entity in [scene.points, scene.edges] {
            // Drawables already released by teardown are skipped
            if let Ok(mut transform) = drawables.get_mut(entity) {
                transform.rotation = orientation;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bevy::ecs::system::RunSystemOnce;

    fn spawn_scene(world: &mut World) -> Entity {
        let points = world
            .spawn((Transform::default(), BackdropDrawable))
            .id();
        let edges = world
            .spawn((Transform::default(), BackdropDrawable))
            .id();
        world
            .spawn((
                AnimationScheduler::new(RotationStep::default()),
                SceneRotation::default(),
                SceneDrawables { points, edges },
            ))
            .id()
    }

    fn run_frame(world: &mut World) {
        world
            .run_system_once(advance_backdrop_frames)
            .expect("frame system runs");
    }

    #[test]
    fn idle_scheduler_does_not_advance() {
        let mut world = World::new();
        let root = spawn_scene(&mut world);
        run_frame(&mut world);

        assert_eq!(world.get::<SceneRotation>(root), Some(&SceneRotation::default()));
        assert_eq!(world.get::<AnimationScheduler>(root).map(|s| s.frames()), Some(0));
    }

    #[test]
    fn running_scheduler_rotates_strictly_each_frame() {
        let mut world = World::new();
        let root = spawn_scene(&mut world);
        world
            .get_mut::<AnimationScheduler>(root)
            .expect("scheduler")
            .start()
            .expect("start");

        let mut previous = SceneRotation::default();
        for _ in 0..10 {
            run_frame(&mut world);
            let current = *world.get::<SceneRotation>(root).expect("rotation");
            assert!(current.unwrapped_x() > previous.unwrapped_x());
            assert!(current.unwrapped_y() > previous.unwrapped_y());
            previous = current;
        }

        assert_relative_eq!(previous.y, 10.0 * 0.0005, epsilon = 1e-6);
        assert_relative_eq!(previous.x, 10.0 * 0.0002, epsilon = 1e-6);
        assert_eq!(world.get::<AnimationScheduler>(root).map(|s| s.frames()), Some(10));
    }

    #[test]
    fn both_drawables_share_the_scene_orientation() {
        let mut world = World::new();
        let root = spawn_scene(&mut world);
        world
            .get_mut::<AnimationScheduler>(root)
            .expect("scheduler")
            .start()
            .expect("start");
        run_frame(&mut world);

        let expected = world.get::<SceneRotation>(root).expect("rotation").to_quat();
        let drawables = *world.get::<SceneDrawables>(root).expect("drawables");
        for entity in [drawables.points, drawables.edges] {
            let rotation = world.get::<Transform>(entity).expect("transform").rotation;
            assert!(rotation.abs_diff_eq(expected, 1e-6));
        }
    }

    #[test]
    fn stopped_scheduler_freezes_rotation() {
        let mut world = World::new();
        let root = spawn_scene(&mut world);
        world
            .get_mut::<AnimationScheduler>(root)
            .expect("scheduler")
            .start()
            .expect("start");
        run_frame(&mut world);
        run_frame(&mut world);

        world.get_mut::<AnimationScheduler>(root).expect("scheduler").stop();
        let frozen = *world.get::<SceneRotation>(root).expect("rotation");
        for _ in 0..50 {
            run_frame(&mut world);
        }
        assert_eq!(world.get::<SceneRotation>(root), Some(&frozen));
    }

    #[test]
    fn stop_is_idempotent_and_terminal() {
        let mut scheduler = AnimationScheduler::new(RotationStep::default());
        scheduler.stop();
        scheduler.stop();
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert!(matches!(
            scheduler.start(),
            Err(EngineError::InvalidTransition {
                from: SchedulerState::Stopped,
                to: SchedulerState::Running
            })
        ));
    }

    #[test]
    fn start_twice_keeps_running() {
        let mut scheduler = AnimationScheduler::new(RotationStep::default());
        scheduler.start().expect("first start");
        scheduler.start().expect("second start");
        assert!(scheduler.is_running());
    }

    #[test]
    fn missing_drawables_are_skipped() {
        let mut world = World::new();
        let root = spawn_scene(&mut world);
        let drawables = *world.get::<SceneDrawables>(root).expect("drawables");
        world.despawn(drawables.points);
        world
            .get_mut::<AnimationScheduler>(root)
            .expect("scheduler")
            .start()
            .expect("start");

        run_frame(&mut world);
        assert!(world.get::<SceneRotation>(root).expect("rotation").y > 0.0);
    }

    #[test]
    fn rotation_keeps_increasing_across_many_turns() {
        let mut rotation = SceneRotation {
            x: TAU - 0.0001,
            y: TAU - 0.0003,
            turns_x: 20_000,
            turns_y: 20_000,
        };
        let step = RotationStep::default();

        for _ in 0..50 {
            let previous = rotation;
            rotation.advance(step);
            assert!(rotation.unwrapped_x() > previous.unwrapped_x());
            assert!(rotation.unwrapped_y() > previous.unwrapped_y());
            assert!((0.0..TAU).contains(&rotation.x));
            assert!((0.0..TAU).contains(&rotation.y));
        }
        assert_eq!(rotation.turns_x, 20_001);
        assert_eq!(rotation.turns_y, 20_001);
    }

    #[test]
    fn rendered_angle_keeps_full_step_precision_after_long_runs() {
        let mut rotation = SceneRotation::default();
        let step = RotationStep::default();
        // Roughly 95 hours at 60 Hz
        let frames = 20_500_000u64;
        for _ in 0..frames {
            rotation.advance(step);
        }

        let before = rotation;
        rotation.advance(step);
        assert_relative_eq!(
            rotation.unwrapped_x() - before.unwrapped_x(),
            f64::from(step.x),
            epsilon = 1e-5
        );
        assert!(rotation.turns_x > 600);
    }
}
