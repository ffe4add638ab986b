//! Protocol version negotiation during `initialize`.

use crate::types::{
    InitializeParams, InitializeResult, LATEST_PROTOCOL_VERSION, SUPPORTED_PROTOCOL_VERSIONS,
};

/// Pick the protocol version for a client: its own if supported, otherwise
/// the newest this server speaks.
pub fn negotiate(params: &InitializeParams) -> InitializeResult {
    let requested = params.protocol_version.as_str();
    let version = if SUPPORTED_PROTOCOL_VERSIONS.contains(&requested) {
        requested
    } else {
        tracing::warn!(
            "Client requested protocol version {}, server supports {:?}. Offering {}.",
            requested,
            SUPPORTED_PROTOCOL_VERSIONS,
            LATEST_PROTOCOL_VERSION
        );
        LATEST_PROTOCOL_VERSION
    };

    tracing::info!(
        "Initialized with client: {} v{} (protocol {version})",
        params.client_info.name,
        params.client_info.version
    );

    InitializeResult::for_version(version)
}
