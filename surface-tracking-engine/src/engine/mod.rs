pub mod core;
pub mod error;
pub mod geometry;
pub mod render;
pub mod session;
pub mod surfaces;
