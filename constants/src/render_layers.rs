/// Camera passthrough and surface occluders. Drawn first, depth only.
pub const BACKGROUND_LAYER: usize = 0;

/// Placed content, surface fills and outlines.
pub const CONTENT_LAYER: usize = 1;

/// Placement reticle. Always drawn last, on top.
pub const OVERLAY_LAYER: usize = 2;

pub const BACKGROUND_CAMERA_ORDER: isize = 0;
pub const CONTENT_CAMERA_ORDER: isize = 1;
pub const OVERLAY_CAMERA_ORDER: isize = 2;
