use bevy::prelude::*;
use thiserror::Error;

use crate::engine::surfaces::record::SurfaceOrientation;

/// Failures raised inside the tracking pipeline. None of these escape a system:
/// the owning system logs them and degrades.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceTrackingError {
    #[error("surface tracking unsupported: {reason}")]
    Unsupported { reason: String },

    #[error("surface tracking cannot detect {0:?} surfaces on this device")]
    OrientationUnavailable(SurfaceOrientation),

    #[error("invalid tracking config: {0}")]
    InvalidConfig(String),

    #[error("malformed tracking payload: {0}")]
    Payload(String),

    #[error("renderable {0:?} no longer exists")]
    Dispose(Entity),
}
