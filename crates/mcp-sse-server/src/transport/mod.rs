//! Transport layer: HTTP with Server-Sent Events.

#[cfg(feature = "sse")]
pub mod sse;

#[cfg(feature = "sse")]
pub use sse::{AppState, SseTransport};

/// Opens a session's event stream.
pub const SSE_PATH: &str = "/sse";
/// Accepts posted JSON-RPC frames.
pub const MESSAGES_PATH: &str = "/messages";
pub const INFO_PATH: &str = "/info";
pub const HEALTH_PATH: &str = "/health";

/// Every path served over HTTP.
pub const ENDPOINTS: [&str; 4] = [SSE_PATH, MESSAGES_PATH, INFO_PATH, HEALTH_PATH];
