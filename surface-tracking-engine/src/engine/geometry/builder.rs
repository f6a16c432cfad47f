use bevy::prelude::*;
use constants::render_settings::OUTLINE_LIFT;
use constants::surface::{MIN_POLYGON_VERTICES, MIN_SURFACE_AREA};

use super::mesh::{OutlineMesh, SurfaceMesh};
use super::polygon::polygon_area;
use crate::engine::render::surface_renderer::{SurfaceHandles, SurfaceRenderer};
use crate::engine::session::config::SurfaceTrackingConfig;
use crate::engine::surfaces::record::{SurfaceId, SurfaceOrientation};

/// Mesh data for one qualifying boundary. The fill mesh doubles as the occluder.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceGeometry {
    pub area: f32,
    pub surface: SurfaceMesh,
    pub outline: OutlineMesh,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuiltSurface {
    pub area: f32,
    pub handles: SurfaceHandles,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RebuildOutcome {
    Rebuilt { area: f32 },
    /// The new boundary no longer qualifies. No handle was touched.
    BelowThreshold,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceGeometryBuilder {
    min_area: f32,
    min_vertices: usize,
    outline_lift: f32,
}

impl Default for SurfaceGeometryBuilder {
    fn default() -> Self {
        Self::new(MIN_SURFACE_AREA, MIN_POLYGON_VERTICES)
    }
}

impl SurfaceGeometryBuilder {
    pub fn new(min_area: f32, min_vertices: usize) -> Self {
        Self {
            min_area,
            min_vertices,
            outline_lift: OUTLINE_LIFT,
        }
    }

    pub fn from_config(config: &SurfaceTrackingConfig) -> Self {
        Self::new(config.min_area, config.min_vertices)
    }

    /// Triangulate and measure a boundary. `None` when it has too few vertices
    /// or too little area to be worth displaying.
    pub fn compute(&self, boundary: &[Vec3]) -> Option<SurfaceGeometry> {
        if boundary.len() < self.min_vertices.max(3) {
            return None;
        }

        let area = polygon_area(boundary);
        if !area.is_finite() || area < self.min_area {
            return None;
        }

        Some(SurfaceGeometry {
            area,
            surface: SurfaceMesh::from_boundary(boundary),
            outline: OutlineMesh::from_boundary(boundary, self.outline_lift),
        })
    }

    /// Create the visible fill, outline and occluder for a new surface.
    pub fn build<R: SurfaceRenderer>(
        &self,
        renderer: &mut R,
        id: SurfaceId,
        boundary: &[Vec3],
        orientation: SurfaceOrientation,
        transform: Transform,
    ) -> Option<BuiltSurface> {
        let geometry = self.compute(boundary)?;

        let handles = SurfaceHandles {
            visible: renderer.spawn_visible(id, &geometry.surface, orientation, transform),
            outline: renderer.spawn_outline(id, &geometry.outline, transform),
            occluder: renderer.spawn_occluder(id, &geometry.surface, transform),
        };

        Some(BuiltSurface {
            area: geometry.area,
            handles,
        })
    }

    /// Rewrite an existing surface for a new boundary. Fill and occluder keep
    /// their entity and mesh asset; the outline is replaced.
    pub fn rebuild<R: SurfaceRenderer>(
        &self,
        renderer: &mut R,
        id: SurfaceId,
        handles: &mut SurfaceHandles,
        boundary: &[Vec3],
        orientation: SurfaceOrientation,
        transform: Transform,
    ) -> RebuildOutcome {
        let Some(geometry) = self.compute(boundary) else {
            return RebuildOutcome::BelowThreshold;
        };

        renderer.update_visible(&handles.visible, &geometry.surface, orientation, transform);
        renderer.update_occluder(&handles.occluder, &geometry.surface, transform);

        let outline = renderer.spawn_outline(id, &geometry.outline, transform);
        let previous = std::mem::replace(&mut handles.outline, outline);
        if let Err(err) = renderer.dispose(&previous) {
            warn!("[SURFACE] {} stale outline dispose failed: {}", id, err);
        }

        RebuildOutcome::Rebuilt {
            area: geometry.area,
        }
    }
}
