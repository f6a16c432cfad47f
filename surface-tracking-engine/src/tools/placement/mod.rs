/// Tap-latched placement state for single-object and multi-instance content.
pub mod controller;

/// Overlay ring following the latest hit-test result.
pub mod reticle;

/// Bevy systems applying placements, removals and desktop input.
pub mod systems;
