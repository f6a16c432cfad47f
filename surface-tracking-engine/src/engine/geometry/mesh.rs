use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};

use super::polygon::{fan_indices, polygon_normal};

/// Triangle-list data shared by a surface's visible fill and its occluder.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl SurfaceMesh {
    pub fn from_boundary(boundary: &[Vec3]) -> Self {
        let normal = polygon_normal(boundary).to_array();

        Self {
            positions: boundary.iter().map(|point| point.to_array()).collect(),
            normals: vec![normal; boundary.len()],
            indices: fan_indices(boundary.len()),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Main-world data is kept so the mesh can be rewritten in place on rebuild.
    pub fn to_mesh(&self) -> Mesh {
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
        self.write_into(&mut mesh);
        mesh
    }

    /// Replace vertex and index data of an existing mesh without changing its identity.
    pub fn write_into(&self, mesh: &mut Mesh) {
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, self.positions.clone());
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, self.normals.clone());
        mesh.insert_indices(Indices::U32(self.indices.clone()));
    }
}

/// Closed line strip tracing a surface boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineMesh {
    pub points: Vec<[f32; 3]>,
}

impl OutlineMesh {
    /// The first point is repeated at the end to close the loop. Points are
    /// lifted along the surface normal so the outline stays above the fill.
    pub fn from_boundary(boundary: &[Vec3], lift: f32) -> Self {
        let offset = polygon_normal(boundary) * lift;

        let mut points: Vec<[f32; 3]> = boundary
            .iter()
            .map(|point| (*point + offset).to_array())
            .collect();
        if let Some(first) = points.first().copied() {
            points.push(first);
        }

        Self { points }
    }

    pub fn to_mesh(&self) -> Mesh {
        let mut mesh = Mesh::new(PrimitiveTopology::LineStrip, RenderAssetUsages::default());
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, self.points.clone());
        mesh
    }
}
