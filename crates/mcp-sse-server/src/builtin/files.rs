//! File access helpers for the file-backed schemes.

use std::io::ErrorKind as IoErrorKind;
use std::path::Path;

use crate::types::{McpError, McpResult};

/// Accept a URI parameter as a single plain path component.
pub fn safe_segment<'a>(name: &str, value: &'a str) -> McpResult<&'a str> {
    let plain = !value.is_empty()
        && !value.starts_with('.')
        && !value.contains(['\\', '/', '\0', ':']);
    if plain {
        Ok(value)
    } else {
        Err(McpError::invalid_argument(
            name,
            format!("'{value}' is not a plain file or directory name"),
        ))
    }
}

/// Read a UTF-8 file; a missing file is `ResourceNotFound(uri)`.
pub async fn read_text(path: &Path, uri: &str) -> McpResult<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| io_failure(e, uri))
}

/// Read a binary file; a missing file is `ResourceNotFound(uri)`.
pub async fn read_bytes(path: &Path, uri: &str) -> McpResult<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| io_failure(e, uri))
}

fn io_failure(e: std::io::Error, uri: &str) -> McpError {
    match e.kind() {
        IoErrorKind::NotFound => McpError::ResourceNotFound(uri.to_string()),
        _ => McpError::Upstream(format!("cannot read {uri}: {e}")),
    }
}

/// MIME type from a file extension.
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "txt" | "log" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "zip" => "application/zip",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}
