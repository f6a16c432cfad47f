//! Real-time spatial surface tracking and occlusion engine.
//!
//! Consumes surface and hit-test events from a host tracking session,
//! filters them into stable surfaces, renders them with depth-correct
//! occlusion across three camera layers, and resolves taps into placements.
pub mod engine;
pub mod rpc;
pub mod tools;
