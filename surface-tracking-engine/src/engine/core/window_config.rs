use bevy::prelude::*;
use bevy::window::{CompositeAlphaMode, PresentMode};

/// The wasm canvas is transparent so the host's camera feed shows through
/// wherever the background layer clears to transparent.
#[cfg(target_arch = "wasm32")]
pub fn create_window_config() -> Window {
    Window {
        canvas: Some("#bevy-canvas".into()),
        fit_canvas_to_parent: true,
        prevent_default_event_handling: false,
        transparent: true,
        composite_alpha_mode: CompositeAlphaMode::PreMultiplied,
        present_mode: PresentMode::AutoVsync,
        ..default()
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn create_window_config() -> Window {
    Window {
        title: "Surface Tracking Engine".into(),
        resolution: (1280.0, 720.0).into(),
        composite_alpha_mode: CompositeAlphaMode::Auto,
        present_mode: PresentMode::AutoVsync,
        ..default()
    }
}
