//! Rendering side of the surface pipeline.
//!
//! Three cameras share one target and draw in order: Background (camera
//! passthrough and depth-only occluders), Content (placed objects, surface
//! fills and outlines) and Overlay (placement reticle). Their clear and depth
//! behaviour is driven by the occlusion configurator per session mode.

/// Surface fill tints, outline material and the depth-only occluder material.
pub mod materials;

/// Layer definitions, per-mode clear/depth policy and the configurator resource.
pub mod occlusion;

/// Renderer seam used by the surface builder and lifecycle manager.
pub mod surface_renderer;
