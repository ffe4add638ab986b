//! MCP protocol layer: frame decoding, version negotiation and request dispatch.

pub mod handler;
pub mod negotiation;
pub mod request;

pub use handler::ProtocolHandler;
pub use request::{Inbound, McpRequest, Method};
