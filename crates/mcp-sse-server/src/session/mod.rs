//! Session management: one record and one outbound stream per connected client.

pub mod manager;

pub use manager::{
    Session, SessionId, SessionManager, SessionState, SessionStream, DEFAULT_OUTBOUND_CAPACITY,
    DEFAULT_SEND_TIMEOUT,
};
