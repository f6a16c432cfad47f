//! Surface geometry: polygon maths, mesh data and the three-renderable builder.
//!
//! Surfaces arrive as ordered boundary loops in surface-local space. They are
//! fan-triangulated from vertex 0, measured by summing unsigned fan-triangle
//! areas, and turned into a visible fill, a closed outline and a depth-only
//! occluder.

/// Builds and rebuilds the visible / outline / occluder renderables of a surface.
pub mod builder;

/// CPU-side mesh data for surface fills and outlines, convertible to Bevy meshes.
pub mod mesh;

/// Pure polygon functions: fan triangulation, area and normal.
pub mod polygon;
