use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};

use crate::engine::config::BackdropConfig;
use crate::engine::point_cloud::Point;
use crate::engine::proximity::EdgeSet;

/// Quad corners in dot space. The vertex shader scales them to pixels.
const DOT_CORNERS: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];

const DOT_TRIANGLES: [[u32; 3]; 2] = [[0, 1, 2], [0, 2, 3]];

pub const VERTICES_PER_DOT: usize = DOT_CORNERS.len();

/// One coloured quad per point, merged into a single triangle mesh. Every
/// corner sits at the point centre; `PointBillboardMaterial` spreads the
/// corners out in screen space. Returns `None` for an empty cloud.
pub fn create_point_cloud_mesh(points: &[Point], config: &BackdropConfig) -> Option<Mesh> {
    if points.is_empty() {
        return None;
    }

    let vertex_count = points.len() * VERTICES_PER_DOT;
    let mut positions = Vec::with_capacity(vertex_count);
    let mut corners = Vec::with_capacity(vertex_count);
    let mut colours = Vec::with_capacity(vertex_count);
    let mut indices = Vec::with_capacity(points.len() * DOT_TRIANGLES.len() * 3);

    for (i, point) in points.iter().enumerate() {
        let base = (i * VERTICES_PER_DOT) as u32;
        let colour = linear_colour(config.colour_for(point.class));

        for corner in DOT_CORNERS {
            positions.push(point.position.to_array());
            corners.push(corner);
            colours.push(colour);
        }
        for triangle in DOT_TRIANGLES {
            indices.extend(triangle.iter().map(|corner| base + corner));
        }
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, corners);
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, colours);
    mesh.insert_indices(Indices::U32(indices));
    Some(mesh)
}

/// Line segments between connected points. Returns `None` without edges.
pub fn create_edge_mesh(points: &[Point], edges: &EdgeSet) -> Option<Mesh> {
    if edges.is_empty() {
        return None;
    }

    let positions: Vec<[f32; 3]> = points.iter().map(|p| p.position.to_array()).collect();
    let indices: Vec<u32> = edges
        .iter()
        .flat_map(|edge| {
            let (a, b) = edge.endpoints();
            [a, b]
        })
        .collect();

    let mut mesh = Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::RENDER_WORLD);
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_indices(Indices::U32(indices));
    Some(mesh)
}

/// Faint blended line material
pub fn edge_material(config: &BackdropConfig) -> StandardMaterial {
    let [r, g, b] = config.line_colour;
    StandardMaterial {
        base_color: Color::srgba(r, g, b, config.line_opacity),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    }
}

fn linear_colour([r, g, b]: [f32; 3]) -> [f32; 4] {
    let linear = Color::srgb(r, g, b).to_linear();
    [linear.red, linear.green, linear.blue, 1.0]
}
