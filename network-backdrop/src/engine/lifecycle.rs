//! One mounted backdrop instance.
//!
//! `BackdropEngine::mount` validates the config, samples the cloud, builds
//! the proximity graph once, acquires a surface and starts the scheduler.
//! `dispose` stops the scheduler before releasing anything, so a frame that
//! is already queued sees `Stopped` and leaves the scene alone.

use bevy::prelude::*;
use rand::Rng;
use serde::Serialize;

use crate::engine::animation::{AnimationScheduler, SceneRotation, SchedulerState};
use crate::engine::config::BackdropConfig;
use crate::engine::error::EngineError;
use crate::engine::point_cloud::{Point, generate};
use crate::engine::proximity::{EdgeSet, build};
use crate::engine::scene::renderer::{SceneHandle, SceneRenderer};
use crate::engine::scene::surface::{SurfaceHost, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineLifecycle {
    Created,
    Running,
    Disposed,
}

/// Snapshot reported to the host page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackdropStatus {
    pub lifecycle: EngineLifecycle,
    pub scheduler: Option<SchedulerState>,
    pub points: usize,
    pub edges: usize,
    pub frames: u64,
}

pub struct BackdropEngine {
    config: BackdropConfig,
    points: Vec<Point>,
    edges: EdgeSet,
    scene: SceneRenderer,
    host: Box<dyn SurfaceHost>,
    lifecycle: EngineLifecycle,
}

impl BackdropEngine {
    /// Create and start in one step.
    pub fn mount(
        world: &mut World,
        host: Box<dyn SurfaceHost>,
        viewport: Viewport,
        config: BackdropConfig,
    ) -> Result<Self, EngineError> {
        let mut engine = Self::create(world, host, viewport, config)?;
        engine.start(world)?;
        Ok(engine)
    }

    pub fn create(
        world: &mut World,
        host: Box<dyn SurfaceHost>,
        viewport: Viewport,
        config: BackdropConfig,
    ) -> Result<Self, EngineError> {
        Self::create_with_rng(world, host, viewport, config, &mut rand::thread_rng())
    }

    /// Like `create` with an explicit random source.
    pub fn create_with_rng<R: Rng + ?Sized>(
        world: &mut World,
        mut host: Box<dyn SurfaceHost>,
        viewport: Viewport,
        config: BackdropConfig,
        rng: &mut R,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let count = config.point_count()?;

        let points = generate(rng, count, &config.bounds, &config.colour_bands);
        let edges = build(&points, config.proximity_threshold);

        let scene = SceneRenderer::create(
            world,
            host.as_mut(),
            viewport,
            &config,
            &points,
            &edges,
        )?;

        Ok(Self {
            config,
            points,
            edges,
            scene,
            host,
            lifecycle: EngineLifecycle::Created,
        })
    }

    /// Activate the camera and begin advancing frames.
    pub fn start(&mut self, world: &mut World) -> Result<(), EngineError> {
        let handle = self.live_handle()?;

        let Some(mut scheduler) = world.get_mut::<AnimationScheduler>(handle.root) else {
            return Err(EngineError::Disposed);
        };
        scheduler.start()?;

        if let Some(mut camera) = world.get_mut::<Camera>(handle.camera) {
            camera.is_active = true;
        }

        self.lifecycle = EngineLifecycle::Running;
        info!("Backdrop animation started");
        Ok(())
    }

    /// Stop advancing frames and stop rendering. Idempotent.
    pub fn stop(&mut self, world: &mut World) {
        let Some(handle) = self.scene.handle() else {
            return;
        };

        if let Some(mut scheduler) = world.get_mut::<AnimationScheduler>(handle.root) {
            if scheduler.state() != SchedulerState::Stopped {
                scheduler.stop();
                info!("Backdrop animation stopped after {} frames", scheduler.frames());
            }
        }

        if let Some(mut camera) = world.get_mut::<Camera>(handle.camera) {
            camera.is_active = false;
        }
    }

    /// Stop, then release the scene and detach the surface. Safe to call
    /// more than once.
    pub fn dispose(&mut self, world: &mut World) {
        if self.lifecycle == EngineLifecycle::Disposed {
            return;
        }
        self.stop(world);
        self.scene.dispose(world, self.host.as_mut());
        self.lifecycle = EngineLifecycle::Disposed;
    }

    pub fn lifecycle(&self) -> EngineLifecycle {
        self.lifecycle
    }

    pub fn config(&self) -> &BackdropConfig {
        &self.config
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn edges(&self) -> &EdgeSet {
        &self.edges
    }

    pub fn scene(&self) -> Option<SceneHandle> {
        self.scene.handle()
    }

    pub fn host(&self) -> &dyn SurfaceHost {
        self.host.as_ref()
    }

    pub fn rotation(&self, world: &World) -> Option<SceneRotation> {
        let handle = self.scene.handle()?;
        world.get::<SceneRotation>(handle.root).copied()
    }

    pub fn status(&self, world: &World) -> BackdropStatus {
        let scheduler = self
            .scene
            .handle()
            .and_then(|handle| world.get::<AnimationScheduler>(handle.root));
        self.status_from(scheduler)
    }

    /// Status from an already fetched scheduler, for callers inside systems.
    pub fn status_from(&self, scheduler: Option<&AnimationScheduler>) -> BackdropStatus {
        BackdropStatus {
            lifecycle: self.lifecycle,
            scheduler: scheduler.map(|s| s.state()),
            points: self.points.len(),
            edges: self.edges.len(),
            frames: scheduler.map_or(0, |s| s.frames()),
        }
    }

    fn live_handle(&self) -> Result<SceneHandle, EngineError> {
        if self.lifecycle == EngineLifecycle::Disposed {
            return Err(EngineError::Disposed);
        }
        self.scene.handle().ok_or(EngineError::Disposed)
    }
}

impl Drop for BackdropEngine {
    fn drop(&mut self) {
        if self.scene.is_live() {
            warn!("Backdrop engine dropped without dispose; queueing its scene for release");
            self.scene.abandon(self.host.as_mut());
        }
    }
}
