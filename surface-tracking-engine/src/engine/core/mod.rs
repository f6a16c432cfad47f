//! Core application setup.
//!
//! Builds the Bevy app for native and WASM targets, owns the tracking plugin
//! and its per-frame system ordering, and configures the window.

/// Application setup: plugins, layer cameras, lighting and placeholder content.
pub mod app_setup;

/// The surface tracking plugin and its `TrackingSet` stage ordering.
pub mod plugin;

/// Platform-specific window configuration for native and WASM builds.
///
/// Configures a transparent canvas for web targets and vsync settings.
pub mod window_config;
