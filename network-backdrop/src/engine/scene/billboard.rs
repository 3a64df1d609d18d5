//! Screen-space dot material for the point cloud.

use bevy::pbr::{MaterialPipeline, MaterialPipelineKey};
use bevy::render::mesh::MeshVertexBufferLayoutRef;
use bevy::render::render_resource::{
    AsBindGroup, RenderPipelineDescriptor, ShaderRef, SpecializedMeshPipelineError,
};
use bevy::{prelude::*, reflect::TypePath};

use crate::engine::config::BackdropConfig;
use crate::engine::scene::surface::Viewport;

pub const POINT_BILLBOARD_SHADER: &str = "shaders/point_billboard.wgsl";

/// Expands each point quad around its centre in clip space so the dot keeps
/// the same pixel diameter at every depth. Colour comes from the vertices.
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct PointBillboardMaterial {
    /// x = dot diameter in physical pixels
    #[uniform(0)]
    pub params: Vec4,
}

impl PointBillboardMaterial {
    pub fn new(config: &BackdropConfig, viewport: &Viewport) -> Self {
        Self {
            params: Vec4::new(config.point_size * viewport.scale_factor, 0.0, 0.0, 0.0),
        }
    }

    pub fn diameter_px(&self) -> f32 {
        self.params.x
    }
}

impl Material for PointBillboardMaterial {
    fn vertex_shader() -> ShaderRef {
        POINT_BILLBOARD_SHADER.into()
    }

    fn fragment_shader() -> ShaderRef {
        POINT_BILLBOARD_SHADER.into()
    }

    fn specialize(
        _pipeline: &MaterialPipeline<Self>,
        descriptor: &mut RenderPipelineDescriptor,
        layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        let vertex_layout = layout.0.get_layout(&[
            Mesh::ATTRIBUTE_POSITION.at_shader_location(0),
            Mesh::ATTRIBUTE_UV_0.at_shader_location(1),
            Mesh::ATTRIBUTE_COLOR.at_shader_location(2),
        ])?;
        descriptor.vertex.buffers = vec![vertex_layout];
        // Quads face the screen by construction
        descriptor.primitive.cull_mode = None;
        Ok(())
    }
}
