use bevy::prelude::*;

use super::ingest::HitTestResult;
use super::tracking::{TrackingCapabilities, ViewMode};
use crate::engine::surfaces::record::{SurfaceId, SurfaceObservation};

/// Surface reports from the tracking session, already typed.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Added(SurfaceObservation),
    Updated(SurfaceObservation),
    Removed(SurfaceId),
}

#[derive(Event, Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started {
        mode: ViewMode,
        capabilities: TrackingCapabilities,
    },
    Ended,
}

/// One frame's hit-test delivery. May be empty.
#[derive(Event, Debug, Clone, Default, PartialEq)]
pub struct HitTestEvent {
    pub results: Vec<HitTestResult>,
}

/// Viewer pose reported by the device; drives the layer cameras.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct CameraPoseEvent {
    pub transform: Transform,
}
