use bevy::prelude::*;
use constants::placement::CENTER_PLACEMENT_DISTANCE;
use constants::surface::{
    MAX_DISPLAYED_SURFACES, MIN_POLYGON_VERTICES, MIN_SURFACE_AREA, SNAPSHOT_INTERVAL_FRAMES,
    STABILITY_THRESHOLD,
};
use serde::{Deserialize, Serialize};

use crate::engine::error::SurfaceTrackingError;
use crate::engine::surfaces::record::SurfaceOrientation;
use crate::tools::placement::controller::PlacementMode;

/// Runtime tunables for the tracking pipeline. Missing fields fall back to the
/// defaults in the `constants` crate, so hosts may send partial overrides.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceTrackingConfig {
    pub min_area: f32,
    pub min_vertices: usize,
    pub stability_threshold: u32,
    pub max_displayed: usize,
    pub snapshot_interval_frames: u32,
    pub placement_mode: PlacementMode,
    pub center_distance: f32,
    /// Orientations requested when enabling tracking on the device.
    pub requested_orientations: Vec<SurfaceOrientation>,
    /// Cast cursor rays against materialized surfaces on native builds.
    pub emulate_hit_test: bool,
}

impl Default for SurfaceTrackingConfig {
    fn default() -> Self {
        Self {
            min_area: MIN_SURFACE_AREA,
            min_vertices: MIN_POLYGON_VERTICES,
            stability_threshold: STABILITY_THRESHOLD,
            max_displayed: MAX_DISPLAYED_SURFACES,
            snapshot_interval_frames: SNAPSHOT_INTERVAL_FRAMES,
            placement_mode: PlacementMode::SingleObject,
            center_distance: CENTER_PLACEMENT_DISTANCE,
            requested_orientations: vec![
                SurfaceOrientation::Horizontal,
                SurfaceOrientation::Vertical,
            ],
            emulate_hit_test: cfg!(not(target_arch = "wasm32")),
        }
    }
}

impl SurfaceTrackingConfig {
    /// Overrides may tighten the materialization limits but never loosen them
    /// past the compiled defaults.
    pub fn validate(&self) -> Result<(), SurfaceTrackingError> {
        let invalid = |message: String| Err(SurfaceTrackingError::InvalidConfig(message));

        if !self.min_area.is_finite() || self.min_area < MIN_SURFACE_AREA {
            return invalid(format!("min_area must be at least {}", MIN_SURFACE_AREA));
        }
        if self.min_vertices < MIN_POLYGON_VERTICES {
            return invalid(format!("min_vertices must be at least {}", MIN_POLYGON_VERTICES));
        }
        if self.stability_threshold < STABILITY_THRESHOLD {
            return invalid(format!(
                "stability_threshold must be at least {}",
                STABILITY_THRESHOLD
            ));
        }
        if !(1..=MAX_DISPLAYED_SURFACES).contains(&self.max_displayed) {
            return invalid(format!(
                "max_displayed must be between 1 and {}",
                MAX_DISPLAYED_SURFACES
            ));
        }
        if !self.center_distance.is_finite() || self.center_distance <= 0.0 {
            return invalid("center_distance must be positive".to_string());
        }
        Ok(())
    }
}
