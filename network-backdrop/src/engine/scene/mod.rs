//! Drawable scene construction and the surfaces it renders into.
//!
//! Builds the point and edge meshes, binds a perspective camera to a
//! freshly acquired window surface, and tears all of it down again.

/// Screen-space dot material for the point cloud mesh.
pub mod billboard;

/// Point cloud and proximity edge mesh builders.
pub mod mesh;

/// Scene creation and scoped teardown.
///
/// Owns every entity and asset allocated for one backdrop instance and
/// releases scenes whose owner was dropped without disposing.
pub mod renderer;

/// Rendering surfaces, viewport sizing and the hosts surfaces attach to.
pub mod surface;
