use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::render::surface_renderer::SurfaceHandles;

/// Opaque surface key assigned by the tracking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceOrientation {
    Horizontal,
    Vertical,
    #[default]
    Unknown,
}

impl SurfaceOrientation {
    /// Map a tracker orientation label. Anything unrecognised is `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "horizontal" | "horizontal_up" | "horizontal_down" | "floor" | "ceiling" => {
                Self::Horizontal
            }
            "vertical" | "wall" => Self::Vertical,
            _ => Self::Unknown,
        }
    }
}

/// A surface report after typed ingestion. Pose is already resolved to a
/// transform, orientation to an enum.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceObservation {
    pub id: SurfaceId,
    pub boundary: Vec<Vec3>,
    pub orientation: SurfaceOrientation,
    pub transform: Transform,
}

/// One materialized surface. The record is the sole owner of its three
/// renderables; they are created and disposed together.
#[derive(Debug, Clone)]
pub struct SurfaceRecord {
    pub id: SurfaceId,
    pub boundary: Vec<Vec3>,
    pub orientation: SurfaceOrientation,
    pub area: f32,
    pub observation_count: u32,
    pub handles: SurfaceHandles,
    pub transform: Transform,
}
