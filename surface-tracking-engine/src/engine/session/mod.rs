//! Tracking session boundary.
//!
//! Host messages are normalized into typed events here, sessions are started
//! and torn down, and recorded sessions can be replayed on native builds.

pub mod config;

/// Events the tracking session feeds into the pipeline.
pub mod events;

/// Raw payload types and their normalization into typed observations.
pub mod ingest;

/// Recorded host traffic played back through the bridge.
pub mod replay;

/// Session lifecycle, capability negotiation and camera pose.
pub mod tracking;
