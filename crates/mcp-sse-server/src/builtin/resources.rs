//! Built-in resources: configuration, API docs, greetings, files and records.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::registry::CapabilityRegistry;
use crate::resources::{producer_fn, ResourceDescriptor, ResourceProducer, UriParams};
use crate::types::{McpError, McpResult, ResourceBody};

use super::files::{mime_for, read_bytes, read_text, safe_segment};
use super::store::KeyValueStore;
use super::Builtins;

const API_DOCUMENTATION: &str = r#"# MCP SSE Server API

## Endpoints

- `GET /sse` opens a session. The first event (`endpoint`) carries the
  URL to post messages to; every response arrives as a `message` event.
- `POST /messages?sessionId=<id>` accepts one JSON-RPC request. Answers
  `202 Accepted`; the response is delivered on the session's stream.
- `GET /info` describes the server and its tools.
- `GET /health` answers `ok`.

## Resources

- `config://app` public configuration
- `documentation://api` this document
- `greeting://{name}` a greeting
- `log://{filename}` a log file
- `doc://{type}/{filename}` a document, base64-encoded
- `text://{category}/{filename}` a text file
- `db://{collection}/{id}` a stored record

## Tools

- `add` adds two numbers
- `web_search` searches the web
- `db_put` stores a record
- `db_list` lists the ids of a collection

## Prompts

- `review_code` asks for a code review
- `explain_resource` asks for an explanation of a resource
- `summarize_log` asks for a summary of a log file
"#;

pub(super) fn register(registry: &mut CapabilityRegistry, builtins: &Builtins) -> McpResult<()> {
    let snapshot = Arc::new(builtins.config.public_snapshot());
    registry.register_resource(
        ResourceDescriptor::exact(
            "config://app",
            "App configuration",
            producer_fn(move |_| {
                let snapshot = Arc::clone(&snapshot);
                async move { Ok(ResourceBody::json(&*snapshot)) }
            }),
        )
        .with_description("Server configuration with credentials redacted")
        .with_mime_type("application/json"),
    )?;

    registry.register_resource(
        ResourceDescriptor::exact(
            "documentation://api",
            "API documentation",
            producer_fn(|_| async { Ok(ResourceBody::text(API_DOCUMENTATION, "text/markdown")) }),
        )
        .with_description("Endpoints, resources, tools and prompts of this server")
        .with_mime_type("text/markdown"),
    )?;

    registry.register_resource(
        ResourceDescriptor::template(
            "greeting://{name}",
            "Greeting",
            producer_fn(|params: UriParams| async move {
                params
                    .require("name")
                    .map(|name| ResourceBody::text(format!("Hello, {name}!"), "text/plain"))
            }),
        )?
        .with_description("A personalized greeting")
        .with_mime_type("text/plain"),
    )?;

    let root = &builtins.content_root;
    registry.register_resource(
        ResourceDescriptor::template(
            "log://{filename}",
            "Log file",
            LogFiles {
                dir: root.join("logs"),
            },
        )?
        .with_description("Contents of a log file")
        .with_mime_type("text/plain"),
    )?;

    registry.register_resource(
        ResourceDescriptor::template(
            "doc://{type}/{filename}",
            "Document",
            Documents {
                dir: root.join("docs"),
            },
        )?
        .with_description("A document of the given type, base64-encoded"),
    )?;

    registry.register_resource(
        ResourceDescriptor::template(
            "text://{category}/{filename}",
            "Text file",
            TextFiles {
                dir: root.join("text"),
            },
        )?
        .with_description("A text file from a category"),
    )?;

    registry.register_resource(
        ResourceDescriptor::template(
            "db://{collection}/{id}",
            "Database record",
            Records {
                store: Arc::clone(&builtins.store),
            },
        )?
        .with_description("A record from the key-value store")
        .with_mime_type("application/json"),
    )?;

    Ok(())
}

struct LogFiles {
    dir: PathBuf,
}

#[async_trait]
impl ResourceProducer for LogFiles {
    async fn produce(&self, uri: &str, params: &UriParams) -> McpResult<ResourceBody> {
        let filename = safe_segment("filename", params.require("filename")?)?;
        let text = read_text(&self.dir.join(filename), uri).await?;
        Ok(ResourceBody::text(text, "text/plain"))
    }
}

struct Documents {
    dir: PathBuf,
}

#[async_trait]
impl ResourceProducer for Documents {
    async fn produce(&self, uri: &str, params: &UriParams) -> McpResult<ResourceBody> {
        let kind = safe_segment("type", params.require("type")?)?;
        let filename = safe_segment("filename", params.require("filename")?)?;
        let path = self.dir.join(kind).join(filename);
        let bytes = read_bytes(&path, uri).await?;
        Ok(ResourceBody::blob(bytes, mime_for(&path)))
    }
}

struct TextFiles {
    dir: PathBuf,
}

#[async_trait]
impl ResourceProducer for TextFiles {
    async fn produce(&self, uri: &str, params: &UriParams) -> McpResult<ResourceBody> {
        let category = safe_segment("category", params.require("category")?)?;
        let filename = safe_segment("filename", params.require("filename")?)?;
        let path = self.dir.join(category).join(filename);
        let text = read_text(&path, uri).await?;
        Ok(ResourceBody::text(text, mime_for(&path)))
    }
}

struct Records {
    store: Arc<KeyValueStore>,
}

#[async_trait]
impl ResourceProducer for Records {
    async fn produce(&self, uri: &str, params: &UriParams) -> McpResult<ResourceBody> {
        let collection = params.require("collection")?;
        let id = params.require("id")?;
        let record: Value = self
            .store
            .get(collection, id)
            .ok_or_else(|| McpError::ResourceNotFound(uri.to_string()))?;
        Ok(ResourceBody::json(&record))
    }
}
