//! JSON-RPC 2.0 bridge between the host page and the tracking pipeline.
//!
//! The host owns the device tracking session. It posts surface, hit-test,
//! pose and user-intent messages into the engine iframe; the engine answers
//! requests and pushes status notifications back.
//!
//! ```text
//! Host (parent window)  <──postMessage──>  Bevy (iframe)
//!        │                                        │
//!        ├─ surface_added / hit_test_result ────> │ IncomingHostMessage
//!        │                                        ├─ dispatch_host_message()
//!        │                                        ├─ typed Bevy events
//!        │ <───────────── surface_detected ───────┤ notification
//!        ├─ get_surface_status (id: 1) ─────────> │
//!        │ <────────── {detected, count} (id: 1) ─┤ response
//! ```
//!
//! ## Host → Engine
//!
//! ### Session
//! - `session_started`: `{ mode: "augmented" | "virtual", capabilities }`
//! - `session_ended`
//! - `configure_tracking`: replace the tracking config; rejected mid-session
//!
//! ### Tracking
//! - `surface_added`, `surface_updated`: `{ id, polygon, orientation?, pose? }`
//! - `surface_removed`: `{ id }`
//! - `hit_test_result`: `{ results: [pose...] }`, possibly empty
//! - `camera_pose`: `{ matrix? | position?, rotation? }`
//!
//! ### Intent
//! - `tap_down`
//! - `place_at_center`: optional reference pose
//! - `remove_instance`: optional `{ instance }`, latest when omitted
//!
//! ### Queries
//! - `get_surface_status`: `{ detected, count }`
//!
//! ## Engine → Host
//!
//! - `surface_detected`: first surface of the session materialized
//! - `surface_count_changed`: `{ count }`
//! - `placement_applied`: `{ mode, position, instance? }`
//! - `instance_removed`: `{ instance, position }`
//! - `tracking_unsupported`: `{ reason }`
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32600`: Invalid request
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error

/// Host message parsing, dispatch into Bevy events and outgoing notifications.
pub mod host_rpc;
