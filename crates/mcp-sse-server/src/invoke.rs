//! Handler invocation: validate input, run the capability, normalize the outcome.
//!
//! Every invocation runs as its own task. It completes even if the session
//! that asked for it has closed, and a panic inside a capability surfaces as
//! an `internal` failure.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::timeout;

use crate::prompts::PromptDescriptor;
use crate::resources::ResolvedResource;
use crate::tools::ToolDescriptor;
use crate::types::{McpError, McpResult, PromptGetResult, ReadResourceResult, ToolCallResult};

/// Runs resolved handlers under an optional deadline.
#[derive(Debug, Clone, Default)]
pub struct Invoker {
    deadline: Option<Duration>,
}

impl Invoker {
    /// An invoker with no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound every invocation by `deadline`. A zero duration means no deadline.
    pub fn with_deadline(deadline: Duration) -> Self {
        Self {
            deadline: (!deadline.is_zero()).then_some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Read a resolved resource.
    pub async fn read_resource(
        &self,
        uri: &str,
        resolved: ResolvedResource,
    ) -> McpResult<ReadResourceResult> {
        let ResolvedResource { descriptor, params } = resolved;
        let label = descriptor.name.clone();
        let owned_uri = uri.to_string();

        let body = self
            .run(&label, self.deadline, async move {
                descriptor.producer.produce(&owned_uri, &params).await
            })
            .await?;

        Ok(ReadResourceResult {
            contents: vec![body.into_content(uri)],
        })
    }

    /// Validate `args` against the tool's shape, then execute it. On a
    /// validation failure the executor is never called.
    pub async fn call_tool(
        &self,
        tool: Arc<ToolDescriptor>,
        args: Option<Value>,
    ) -> McpResult<ToolCallResult> {
        let args = tool.input.validate(args)?;
        let deadline = tool.timeout.or(self.deadline);
        let executor = Arc::clone(&tool.executor);

        self.run(&tool.name, deadline, async move { executor.execute(args).await })
            .await
    }

    /// Validate `args` against the prompt's shape, if it declares one, then render it.
    pub async fn get_prompt(
        &self,
        prompt: Arc<PromptDescriptor>,
        args: Option<Value>,
    ) -> McpResult<PromptGetResult> {
        let args = match &prompt.input {
            Some(shape) => shape.validate(args)?,
            None => match args {
                Some(Value::Object(map)) => map,
                None | Some(Value::Null) => serde_json::Map::new(),
                Some(_) => {
                    return Err(McpError::invalid_argument(
                        "arguments",
                        "expected an object",
                    ))
                }
            },
        };
        let renderer = Arc::clone(&prompt.renderer);

        let messages = self
            .run(&prompt.name, self.deadline, async move {
                renderer.render(args).await
            })
            .await?;

        Ok(PromptGetResult {
            description: prompt.description.clone(),
            messages,
        })
    }

    async fn run<T, F>(&self, label: &str, deadline: Option<Duration>, fut: F) -> McpResult<T>
    where
        F: Future<Output = McpResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let task = tokio::spawn(async move {
            match deadline {
                Some(limit) => timeout(limit, fut)
                    .await
                    .map_err(|_| McpError::DeadlineExceeded(limit))?,
                None => fut.await,
            }
        });

        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(join_err) if join_err.is_panic() => {
                tracing::error!("Handler '{label}' panicked");
                Err(McpError::InternalError(format!("handler '{label}' panicked")))
            }
            Err(join_err) => Err(McpError::InternalError(format!(
                "handler '{label}' was cancelled: {join_err}"
            ))),
        };

        if let Err(e) = &outcome {
            tracing::warn!("Handler '{label}' failed: {e}");
        }
        outcome
    }
}
