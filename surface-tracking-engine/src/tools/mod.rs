//! Interaction tools layered on the surface pipeline.
//!
//! ## Placement
//!
//! A tap arms the `PlacementController`; the next hit-test delivery with at
//! least one result becomes the placement pose.
//!
//! ```text
//! tap_down (host or left click)
//!   └─> TapDownEvent
//!       └─> handle_tap_down()          pending = true
//! hit_test_result (host or emulation)
//!   └─> HitTestEvent
//!       ├─> apply_hit_test_placements() first result consumed, pending = false
//!       └─> update_reticle()           ring follows the first result
//! ```
//!
//! In single-object mode the tracked content root is moved; in multi-instance
//! mode a new instance is spawned from the `PlacementTemplate`.
//!
//! ## Native Builds
//! - Left click: tap
//! - `C`: place at center
//! - `Backspace`: remove the latest instance
//! - Cursor ray against materialized surfaces stands in for device hit-test

/// Desktop hit-test emulation against materialized surfaces.
pub mod hit_test;

/// Tap-latched placement, reticle and instance management.
pub mod placement;
