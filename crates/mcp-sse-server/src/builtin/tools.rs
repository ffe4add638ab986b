//! Built-in tools: arithmetic, web search and the record store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::registry::CapabilityRegistry;
use crate::schema::{str_arg, Arguments, FieldType, InputShape};
use crate::tools::{ToolDescriptor, ToolExecutor};
use crate::types::{McpError, McpResult, ToolCallResult};

use super::search::SearchClient;
use super::store::KeyValueStore;
use super::Builtins;

/// Upper bound on `web_search`'s `count`.
pub const MAX_SEARCH_RESULTS: usize = 20;

pub(super) fn register(registry: &mut CapabilityRegistry, builtins: &Builtins) -> McpResult<()> {
    registry.register_tool(
        ToolDescriptor::new(
            "add",
            InputShape::new()
                .required("a", FieldType::Number, "First addend")
                .required("b", FieldType::Number, "Second addend"),
            Add,
        )
        .with_description("Add two numbers"),
    )?;

    let search = &builtins.config.search;
    registry.register_tool(
        ToolDescriptor::new(
            "web_search",
            InputShape::new()
                .required("query", FieldType::String, "Search query")
                .optional(
                    "count",
                    FieldType::Integer,
                    "Number of results (1-20, default from configuration)",
                ),
            WebSearch {
                client: Arc::clone(&builtins.search),
                default_count: search.max_results,
            },
        )
        .with_description("Search the web and return titles, URLs and descriptions")
        // Leaves room for the HTTP client's own timeout to fire first.
        .with_timeout(Duration::from_secs(search.timeout_secs.max(1) + 5)),
    )?;

    registry.register_tool(
        ToolDescriptor::new(
            "db_put",
            InputShape::new()
                .required("collection", FieldType::String, "Collection name")
                .required("id", FieldType::String, "Record id")
                .required("data", FieldType::String, "Record as JSON text"),
            DbPut {
                store: Arc::clone(&builtins.store),
            },
        )
        .with_description("Store a JSON record, replacing any record with the same id"),
    )?;

    registry.register_tool(
        ToolDescriptor::new(
            "db_list",
            InputShape::new().required("collection", FieldType::String, "Collection name"),
            DbList {
                store: Arc::clone(&builtins.store),
            },
        )
        .with_description("List the record ids of a collection"),
    )?;

    Ok(())
}

struct Add;

#[async_trait]
impl ToolExecutor for Add {
    async fn execute(&self, args: Arguments) -> McpResult<ToolCallResult> {
        let a = number_arg(&args, "a")?;
        let b = number_arg(&args, "b")?;
        Ok(ToolCallResult::text(sum(a, b)?))
    }
}

fn number_arg<'a>(args: &'a Arguments, name: &str) -> McpResult<&'a Value> {
    args.get(name)
        .filter(|v| v.is_number())
        .ok_or_else(|| McpError::invalid_argument(name, "expected number"))
}

/// Integers add exactly; anything else adds as floating point.
fn sum(a: &Value, b: &Value) -> McpResult<String> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        if let Some(total) = x.checked_add(y) {
            return Ok(total.to_string());
        }
    }
    let x = a.as_f64().unwrap_or_default();
    let y = b.as_f64().unwrap_or_default();
    let total = x + y;
    if !total.is_finite() {
        return Err(McpError::invalid_argument("b", "sum is out of range"));
    }
    Ok(total.to_string())
}

struct WebSearch {
    client: Arc<dyn SearchClient>,
    default_count: usize,
}

#[async_trait]
impl ToolExecutor for WebSearch {
    async fn execute(&self, args: Arguments) -> McpResult<ToolCallResult> {
        let query = str_arg(&args, "query")?.trim();
        if query.is_empty() {
            return Err(McpError::invalid_argument("query", "must not be empty"));
        }

        let count = match args.get("count").and_then(Value::as_i64) {
            Some(n) if (1..=MAX_SEARCH_RESULTS as i64).contains(&n) => n as usize,
            Some(_) => {
                return Err(McpError::invalid_argument(
                    "count",
                    format!("must be between 1 and {MAX_SEARCH_RESULTS}"),
                ))
            }
            None => self.default_count.clamp(1, MAX_SEARCH_RESULTS),
        };

        let hits = self.client.search(query, count).await?;
        tracing::debug!("web_search {query:?}: {} hits", hits.len());
        Ok(ToolCallResult::json(&hits))
    }
}

struct DbPut {
    store: Arc<KeyValueStore>,
}

#[async_trait]
impl ToolExecutor for DbPut {
    async fn execute(&self, args: Arguments) -> McpResult<ToolCallResult> {
        let collection = str_arg(&args, "collection")?;
        let id = str_arg(&args, "id")?;
        let data: Value = serde_json::from_str(str_arg(&args, "data")?)
            .map_err(|e| McpError::invalid_argument("data", format!("not valid JSON: {e}")))?;

        let replaced = self.store.put(collection, id, data).is_some();
        tracing::debug!("Stored {collection}/{id} (replaced: {replaced})");
        Ok(ToolCallResult::json(&json!({
            "collection": collection,
            "id": id,
            "uri": format!("db://{collection}/{id}"),
            "created": !replaced,
        })))
    }
}

struct DbList {
    store: Arc<KeyValueStore>,
}

#[async_trait]
impl ToolExecutor for DbList {
    async fn execute(&self, args: Arguments) -> McpResult<ToolCallResult> {
        let collection = str_arg(&args, "collection")?;
        Ok(ToolCallResult::json(&json!({
            "collection": collection,
            "ids": self.store.ids(collection),
        })))
    }
}
