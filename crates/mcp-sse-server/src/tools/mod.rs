//! Tools: named, argument-validated actions.

pub mod registry;

use std::future::Future;

use async_trait::async_trait;

use crate::schema::Arguments;
use crate::types::{McpResult, ToolCallResult};

pub use registry::{ToolDescriptor, ToolRegistry};

/// Capability that runs a tool once its arguments passed validation.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, args: Arguments) -> McpResult<ToolCallResult>;
}

/// Adapter turning an async closure into a [`ToolExecutor`].
pub struct FnExecutor<F>(F);

/// Wrap `f(args)` as a tool executor.
pub fn executor_fn<F, Fut>(f: F) -> FnExecutor<F>
where
    F: Fn(Arguments) -> Fut + Send + Sync,
    Fut: Future<Output = McpResult<ToolCallResult>> + Send,
{
    FnExecutor(f)
}

#[async_trait]
impl<F, Fut> ToolExecutor for FnExecutor<F>
where
    F: Fn(Arguments) -> Fut + Send + Sync,
    Fut: Future<Output = McpResult<ToolCallResult>> + Send,
{
    async fn execute(&self, args: Arguments) -> McpResult<ToolCallResult> {
        (self.0)(args).await
    }
}
