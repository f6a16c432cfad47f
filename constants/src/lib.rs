pub mod path;
pub mod placement;
pub mod render_layers;
pub mod render_settings;
pub mod surface;
