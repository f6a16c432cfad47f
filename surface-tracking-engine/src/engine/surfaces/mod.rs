//! Surface records and their lifecycle.
//!
//! A surface is observed repeatedly by the tracking session before it is
//! trusted. Once stable and large enough it is materialized into three
//! renderables, rebuilt in place on every update, and disposed on removal,
//! demotion or session teardown.

pub mod diagnostics;

/// Id-keyed record store enforcing stability, display cap and geometry thresholds.
pub mod lifecycle;

pub mod record;

/// Per-session observation counter gating materialization.
pub mod stabilizer;

/// Bevy systems driving the lifecycle from surface events and publishing status.
pub mod systems;
