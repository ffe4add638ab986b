//! MCP server over Server-Sent Events.
//!
//! Resources, tools and prompts are registered once at startup in a
//! [`CapabilityRegistry`]. Clients open an SSE stream, post JSON-RPC
//! requests against their session, and receive each response on the
//! stream. Requests from all sessions are dispatched concurrently.

pub mod builtin;
pub mod config;
pub mod invoke;
pub mod prompts;
pub mod protocol;
pub mod registry;
pub mod resources;
pub mod schema;
pub mod session;
pub mod tools;
pub mod transport;
pub mod types;

pub use builtin::Builtins;
pub use config::ServerConfig;
pub use invoke::Invoker;
pub use protocol::ProtocolHandler;
pub use registry::CapabilityRegistry;
pub use session::SessionManager;
#[cfg(feature = "sse")]
pub use transport::SseTransport;
