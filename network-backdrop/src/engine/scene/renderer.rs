use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use bevy::render::view::NoFrustumCulling;

use super::billboard::PointBillboardMaterial;
use super::mesh::{create_edge_mesh, create_point_cloud_mesh, edge_material};
use super::surface::{RenderSupport, SurfaceElement, SurfaceHost, Viewport};
use crate::engine::animation::{
    AnimationScheduler, BackdropDrawable, SceneDrawables, SceneRotation,
};
use crate::engine::camera::{backdrop_camera, covers_depth};
use crate::engine::config::BackdropConfig;
use crate::engine::core::window_config::surface_window;
use crate::engine::error::EngineError;
use crate::engine::point_cloud::Point;
use crate::engine::proximity::EdgeSet;

/// Root entity of one backdrop scene
#[derive(Component)]
pub struct BackdropScene;

#[derive(Component)]
pub struct PointCloudDrawable;

#[derive(Component)]
pub struct EdgeDrawable;

/// Entity ids of a live scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneHandle {
    pub root: Entity,
    pub points: Entity,
    pub edges: Entity,
    pub camera: Entity,
    pub window: Entity,
}

/// Entities and assets of one scene, released together.
struct SceneResources {
    handle: SceneHandle,
    meshes: Vec<Handle<Mesh>>,
    point_material: Option<Handle<PointBillboardMaterial>>,
    edge_material: Option<Handle<StandardMaterial>>,
}

impl SceneResources {
    /// Freeze the scene, then despawn its entities and drop its assets.
    fn release(self, world: &mut World) {
        let handle = self.handle;

        if let Some(mut scheduler) = world.get_mut::<AnimationScheduler>(handle.root) {
            scheduler.stop();
        }
        if let Some(mut camera) = world.get_mut::<Camera>(handle.camera) {
            camera.is_active = false;
        }

        for entity in [handle.root, handle.points, handle.edges, handle.camera] {
            if let Ok(entity) = world.get_entity_mut(entity) {
                entity.despawn();
            }
        }

        if let Some(mut meshes) = world.get_resource_mut::<Assets<Mesh>>() {
            for mesh in &self.meshes {
                meshes.remove(mesh);
            }
        }
        if let Some(material) = &self.point_material {
            if let Some(mut materials) = world.get_resource_mut::<Assets<PointBillboardMaterial>>() {
                materials.remove(material);
            }
        }
        if let Some(material) = &self.edge_material {
            if let Some(mut materials) = world.get_resource_mut::<Assets<StandardMaterial>>() {
                materials.remove(material);
            }
        }

        // The window may already be gone if the user closed it
        if let Ok(window) = world.get_entity_mut(handle.window) {
            window.despawn();
        }
    }
}

/// Scenes whose owner went away without `dispose`. Drained by
/// `release_orphaned_scenes` once world access is available again.
#[derive(Resource, Clone, Default)]
pub struct OrphanedScenes(Arc<Mutex<Vec<SceneResources>>>);

impl OrphanedScenes {
    fn push(&self, resources: SceneResources) {
        if let Ok(mut queue) = self.0.lock() {
            queue.push(resources);
        }
    }

    fn take(&self) -> Vec<SceneResources> {
        self.0
            .lock()
            .map(|mut queue| std::mem::take(&mut *queue))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.lock().map(|queue| queue.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Release every scene queued by a dropped owner.
pub fn release_orphaned_scenes(world: &mut World) {
    let Some(orphans) = world.get_resource::<OrphanedScenes>().map(|o| o.take()) else {
        return;
    };

    for resources in orphans {
        warn!("Releasing orphaned backdrop scene {:?}", resources.handle.root);
        resources.release(world);
    }
}

/// Owns everything allocated for one scene until `dispose`.
pub struct SceneRenderer {
    resources: Option<SceneResources>,
    surface: SurfaceElement,
    orphans: OrphanedScenes,
}

impl SceneRenderer {
    /// Acquire a surface from `host`, build the drawables and camera, and
    /// return the owning renderer.
    ///
    /// Fails with `RenderingUnavailable` before touching `host` when the app
    /// has no render device.
    pub fn create(
        world: &mut World,
        host: &mut dyn SurfaceHost,
        viewport: Viewport,
        config: &BackdropConfig,
        points: &[Point],
        edges: &EdgeSet,
    ) -> Result<Self, EngineError> {
        RenderSupport::check(world.get_resource::<RenderSupport>())?;
        if !world.contains_resource::<Assets<Mesh>>()
            || !world.contains_resource::<Assets<StandardMaterial>>()
            || !world.contains_resource::<Assets<PointBillboardMaterial>>()
        {
            return Err(EngineError::RenderingUnavailable(
                "mesh and material assets are not initialised".to_string(),
            ));
        }

        let window = world.spawn_empty().id();
        let surface = SurfaceElement::new(window, viewport);
        if let Err(error) = host.attach(&surface) {
            world.despawn(window);
            return Err(error);
        }
        world.entity_mut(window).insert(surface_window(&surface));

        if !covers_depth(&config.camera, &config.bounds) {
            warn!("Camera planes clip part of the point cloud");
        }

        let mut meshes = Vec::new();

        let point_mesh = create_point_cloud_mesh(points, config)
            .map(|mesh| world.resource_mut::<Assets<Mesh>>().add(mesh));
        let (points_entity, point_material) = spawn_drawable(
            world,
            point_mesh,
            PointBillboardMaterial::new(config, &viewport),
            PointCloudDrawable,
            &mut meshes,
        );

        let edge_mesh = create_edge_mesh(points, edges)
            .map(|mesh| world.resource_mut::<Assets<Mesh>>().add(mesh));
        let (edges_entity, edge_material) = spawn_drawable(
            world,
            edge_mesh,
            edge_material(config),
            EdgeDrawable,
            &mut meshes,
        );

        let camera = world.spawn(backdrop_camera(window, &config.camera)).id();

        let root = world
            .spawn((
                BackdropScene,
                AnimationScheduler::new(config.rotation),
                SceneRotation::default(),
                SceneDrawables {
                    points: points_entity,
                    edges: edges_entity,
                },
            ))
            .id();

        info!(
            "Backdrop scene created on {}: {} points, {} edges, {}x{} @{}x",
            surface.id,
            points.len(),
            edges.len(),
            viewport.width,
            viewport.height,
            viewport.scale_factor
        );

        let orphans = world.get_resource_or_init::<OrphanedScenes>().clone();

        Ok(Self {
            resources: Some(SceneResources {
                handle: SceneHandle {
                    root,
                    points: points_entity,
                    edges: edges_entity,
                    camera,
                    window,
                },
                meshes,
                point_material,
                edge_material,
            }),
            surface,
            orphans,
        })
    }

    pub fn handle(&self) -> Option<SceneHandle> {
        self.resources.as_ref().map(|r| r.handle)
    }

    pub fn surface(&self) -> &SurfaceElement {
        &self.surface
    }

    pub fn is_live(&self) -> bool {
        self.resources.is_some()
    }

    /// Release every entity and asset created by `create` and detach the
    /// surface from `host`. Later calls do nothing.
    pub fn dispose(&mut self, world: &mut World, host: &mut dyn SurfaceHost) {
        let Some(resources) = self.resources.take() else {
            return;
        };
        resources.release(world);

        if !host.detach(&self.surface) {
            warn!("Surface {} was already detached from its host", self.surface.id);
        }

        info!("Backdrop scene on {} released", self.surface.id);
    }

    /// Detach the surface now and queue the scene for release on the next
    /// `release_orphaned_scenes` run. Used when an engine is dropped without
    /// being disposed.
    pub(crate) fn abandon(&mut self, host: &mut dyn SurfaceHost) {
        if let Some(resources) = self.resources.take() {
            host.detach(&self.surface);
            self.orphans.push(resources);
        }
    }
}

fn spawn_drawable<M: Material>(
    world: &mut World,
    mesh: Option<Handle<Mesh>>,
    material: M,
    marker: impl Component,
    meshes: &mut Vec<Handle<Mesh>>,
) -> (Entity, Option<Handle<M>>) {
    let material = mesh
        .as_ref()
        .map(|_| world.resource_mut::<Assets<M>>().add(material));

    let mut entity = world.spawn((
        Transform::IDENTITY,
        Visibility::Visible,
        NoFrustumCulling,
        BackdropDrawable,
        marker,
    ));

    // Empty clouds keep the drawable entity but render nothing
    if let (Some(mesh), Some(material)) = (mesh, material.as_ref()) {
        entity.insert((Mesh3d(mesh.clone()), MeshMaterial3d(material.clone())));
        meshes.push(mesh);
    }

    (entity.id(), material)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::point_cloud::{ColourClass, generate};
    use crate::engine::proximity::build;
    use crate::engine::scene::surface::NativeHost;
    use crate::engine::test_support::render_world;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn cloud(count: usize) -> (BackdropConfig, Vec<Point>, EdgeSet) {
        let config = BackdropConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let points = generate(&mut rng, count, &config.bounds, &config.colour_bands);
        let edges = build(&points, config.proximity_threshold);
        (config, points, edges)
    }

    #[test]
    fn create_builds_scene_and_attaches_surface() {
        let mut world = render_world();
        let mut host = NativeHost::default();
        let (config, points, edges) = cloud(300);

        let scene = SceneRenderer::create(
            &mut world,
            &mut host,
            Viewport::default(),
            &config,
            &points,
            &edges,
        )
        .expect("scene");

        let handle = scene.handle().expect("live scene");
        assert_eq!(host.attached_surfaces(), 1);
        assert!(world.get::<Window>(handle.window).is_some());
        assert!(world.get::<Mesh3d>(handle.points).is_some());
        assert!(
            world
                .get::<MeshMaterial3d<PointBillboardMaterial>>(handle.points)
                .is_some()
        );
        assert!(world.get::<Camera>(handle.camera).is_some());
        assert!(world.get::<AnimationScheduler>(handle.root).is_some());
        assert_eq!(world.resource::<Assets<Mesh>>().len(), 2);
    }

    #[test]
    fn dispose_releases_everything_and_is_idempotent() {
        let mut world = render_world();
        let mut host = NativeHost::default();
        let (config, points, edges) = cloud(300);

        let mut scene = SceneRenderer::create(
            &mut world,
            &mut host,
            Viewport::default(),
            &config,
            &points,
            &edges,
        )
        .expect("scene");
        let handle = scene.handle().expect("live scene");

        scene.dispose(&mut world, &mut host);
        assert!(!scene.is_live());
        assert_eq!(host.attached_surfaces(), 0);
        for entity in [handle.root, handle.points, handle.edges, handle.camera, handle.window] {
            assert!(world.get_entity(entity).is_err());
        }
        assert!(world.resource::<Assets<Mesh>>().is_empty());
        assert!(world.resource::<Assets<StandardMaterial>>().is_empty());
        assert!(world.resource::<Assets<PointBillboardMaterial>>().is_empty());

        scene.dispose(&mut world, &mut host);
        assert_eq!(host.attached_surfaces(), 0);
    }

    #[test]
    fn empty_cloud_creates_blank_scene() {
        let mut world = render_world();
        let mut host = NativeHost::default();
        let config = BackdropConfig::default();

        let mut scene = SceneRenderer::create(
            &mut world,
            &mut host,
            Viewport::default(),
            &config,
            &[],
            &EdgeSet::new(),
        )
        .expect("blank scene");
        let handle = scene.handle().expect("live scene");

        assert!(world.get::<Mesh3d>(handle.points).is_none());
        assert!(world.get::<Mesh3d>(handle.edges).is_none());
        assert!(world.resource::<Assets<Mesh>>().is_empty());

        scene.dispose(&mut world, &mut host);
        assert_eq!(host.attached_surfaces(), 0);
    }

    #[test]
    fn isolated_points_get_no_edge_mesh() {
        let mut world = render_world();
        let mut host = NativeHost::default();
        let config = BackdropConfig::default();
        let points = [Point {
            position: Vec3::ZERO,
            class: ColourClass::Alert,
        }];

        let scene = SceneRenderer::create(
            &mut world,
            &mut host,
            Viewport::default(),
            &config,
            &points,
            &EdgeSet::new(),
        )
        .expect("scene");
        let handle = scene.handle().expect("live scene");
        assert!(world.get::<Mesh3d>(handle.points).is_some());
        assert!(world.get::<Mesh3d>(handle.edges).is_none());
    }

    #[test]
    fn missing_render_device_fails_without_attaching() {
        let mut world = render_world();
        world.insert_resource(RenderSupport::Unavailable("no adapter".to_string()));
        let mut host = NativeHost::default();
        let (config, points, edges) = cloud(10);

        let result = SceneRenderer::create(
            &mut world,
            &mut host,
            Viewport::default(),
            &config,
            &points,
            &edges,
        );
        assert!(matches!(result, Err(EngineError::RenderingUnavailable(_))));
        assert_eq!(host.attached_surfaces(), 0);
        let mut windows = world.query::<&Window>();
        assert_eq!(windows.iter(&world).count(), 0);
    }

    #[test]
    fn failed_attach_leaves_no_window_behind() {
        let mut world = render_world();
        let mut host = crate::engine::scene::surface::CanvasHost::new("missing");
        let (config, points, edges) = cloud(10);

        let result = SceneRenderer::create(
            &mut world,
            &mut host,
            Viewport::default(),
            &config,
            &points,
            &edges,
        );
        assert!(matches!(result, Err(EngineError::Surface(_))));
        let mut windows = world.query::<&Window>();
        assert_eq!(windows.iter(&world).count(), 0);
    }

    #[test]
    fn abandoned_scene_is_released_by_orphan_system() {
        let mut world = render_world();
        let mut host = NativeHost::default();
        let (config, points, edges) = cloud(50);

        let mut scene = SceneRenderer::create(
            &mut world,
            &mut host,
            Viewport::default(),
            &config,
            &points,
            &edges,
        )
        .expect("scene");
        let handle = scene.handle().expect("live scene");

        scene.abandon(&mut host);
        assert_eq!(host.attached_surfaces(), 0);
        assert_eq!(world.resource::<OrphanedScenes>().len(), 1);
        assert!(world.get_entity(handle.root).is_ok());

        release_orphaned_scenes(&mut world);
        assert!(world.resource::<OrphanedScenes>().is_empty());
        for entity in [handle.root, handle.points, handle.edges, handle.camera, handle.window] {
            assert!(world.get_entity(entity).is_err());
        }
        assert!(world.resource::<Assets<Mesh>>().is_empty());
        assert!(world.resource::<Assets<PointBillboardMaterial>>().is_empty());

        scene.abandon(&mut host);
        assert!(world.resource::<OrphanedScenes>().is_empty());
    }
}
