/// Minimum fan-summed polygon area (square metres) for a surface to be displayed.
pub const MIN_SURFACE_AREA: f32 = 0.12;

/// Minimum boundary vertex count for a surface to be eligible at all.
pub const MIN_POLYGON_VERTICES: usize = 4;

/// Number of observations (added or updated) before a surface is treated as real.
pub const STABILITY_THRESHOLD: u32 = 3;

/// Maximum number of surfaces materialized at once. New surfaces are dropped, not queued.
pub const MAX_DISPLAYED_SURFACES: usize = 25;

/// Frames between diagnostic snapshots of live surface records.
pub const SNAPSHOT_INTERVAL_FRAMES: u32 = 300;
