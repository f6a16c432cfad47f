/// Distance in front of the camera used by "create here" placements.
pub const CENTER_PLACEMENT_DISTANCE: f32 = 1.5;

/// Extra yaw applied to single-object placements. The bundled content is authored facing -Z.
pub const SINGLE_OBJECT_YAW_CORRECTION: f32 = std::f32::consts::PI;
