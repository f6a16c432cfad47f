use bevy::color::Color;

/// Translucent fill for floors, tables and other horizontal surfaces.
pub const HORIZONTAL_SURFACE_TINT: Color = Color::srgba(0.15, 0.55, 1.0, 0.35);

/// Translucent fill for walls.
pub const VERTICAL_SURFACE_TINT: Color = Color::srgba(1.0, 0.55, 0.1, 0.35);

/// Fill used when the tracker could not classify the surface.
pub const UNKNOWN_SURFACE_TINT: Color = Color::srgba(0.7, 0.7, 0.7, 0.25);

pub const SURFACE_OUTLINE_COLOUR: Color = Color::srgba(1.0, 1.0, 1.0, 0.9);

/// Offset along the surface normal so the outline does not z-fight the fill.
pub const OUTLINE_LIFT: f32 = 0.002;

pub const RETICLE_INNER_RADIUS: f32 = 0.08;
pub const RETICLE_OUTER_RADIUS: f32 = 0.1;
pub const RETICLE_COLOUR: Color = Color::srgb(1.0, 1.0, 1.0);

/// Clear colour of the background layer outside augmented sessions.
pub const VIRTUAL_BACKGROUND_COLOUR: Color = Color::srgb(0.08, 0.09, 0.11);
