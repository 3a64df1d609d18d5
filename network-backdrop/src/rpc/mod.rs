//! JSON-RPC 2.0 communication layer between the backdrop and its host page.
//!
//! The backdrop runs inside an iframe or canvas on a page that owns its
//! lifecycle. The page mounts, unmounts and queries the backdrop through
//! `postMessage`, and the backdrop pushes state changes back as notifications.
//!
//! ## Message Flow
//!
//! ```text
//! Host page (Parent Window)  <──postMessage──>  Bevy (iframe)
//!        │                                        │
//!        ├─ Request (with ID) ──────────────────> │
//!        │                                        ├─ Process request
//!        │ <───────────────── Response (with ID) ─┤
//!        │                                        │
//!        │ <────────── Notification (no ID) ─────┤
//! ```
//!
//! ## Methods
//!
//! - `backdrop_mount`: Create and start a backdrop if none is live
//! - `backdrop_unmount`: Stop and dispose the live backdrop
//! - `backdrop_status`: Lifecycle, scheduler state, point, edge and frame counts
//!
//! ## Notifications
//!
//! - `backdrop_state`: Sent after every mount and unmount with the new status
//! - `backdrop_unavailable`: Sent when no render device exists; the page keeps
//!   running without a background
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32601`: Method not found
//! - `-32603`: Internal error
//!
//! Off wasm the listener is never installed and outgoing messages are dropped.

/// JSON-RPC 2.0 bidirectional communication system for host page integration.
///
/// Handles request-response patterns, notifications, and WASM message listeners.
pub mod web_rpc;
