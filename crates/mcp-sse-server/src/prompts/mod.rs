//! Prompts: named templates that expand into role-tagged message sequences.

pub mod registry;

use std::future::Future;

use async_trait::async_trait;

use crate::schema::Arguments;
use crate::types::{McpResult, PromptMessage};

pub use registry::{PromptDescriptor, PromptRegistry};

/// Capability that expands a prompt into messages.
#[async_trait]
pub trait PromptRenderer: Send + Sync {
    async fn render(&self, args: Arguments) -> McpResult<Vec<PromptMessage>>;
}

/// Adapter turning an async closure into a [`PromptRenderer`].
pub struct FnRenderer<F>(F);

/// Wrap `f(args)` as a prompt renderer.
pub fn renderer_fn<F, Fut>(f: F) -> FnRenderer<F>
where
    F: Fn(Arguments) -> Fut + Send + Sync,
    Fut: Future<Output = McpResult<Vec<PromptMessage>>> + Send,
{
    FnRenderer(f)
}

#[async_trait]
impl<F, Fut> PromptRenderer for FnRenderer<F>
where
    F: Fn(Arguments) -> Fut + Send + Sync,
    Fut: Future<Output = McpResult<Vec<PromptMessage>>> + Send,
{
    async fn render(&self, args: Arguments) -> McpResult<Vec<PromptMessage>> {
        (self.0)(args).await
    }
}
