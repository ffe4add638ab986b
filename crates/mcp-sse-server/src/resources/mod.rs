//! Resources: addressable, read-only content behind exact URIs or URI templates.

pub mod registry;
pub mod template;

use std::future::Future;

use async_trait::async_trait;

use crate::types::{McpResult, ResourceBody};

pub use registry::{ResolvedResource, ResourceAddress, ResourceDescriptor, ResourceRegistry};
pub use template::{UriParams, UriTemplate};

/// Capability that produces the body of a resource.
///
/// `uri` is the concrete URI being read; `params` holds the template
/// bindings (empty for exact resources).
#[async_trait]
pub trait ResourceProducer: Send + Sync {
    async fn produce(&self, uri: &str, params: &UriParams) -> McpResult<ResourceBody>;
}

/// Adapter turning an async closure into a [`ResourceProducer`].
pub struct FnProducer<F>(F);

/// Wrap `f(params)` as a resource producer.
pub fn producer_fn<F, Fut>(f: F) -> FnProducer<F>
where
    F: Fn(UriParams) -> Fut + Send + Sync,
    Fut: Future<Output = McpResult<ResourceBody>> + Send,
{
    FnProducer(f)
}

#[async_trait]
impl<F, Fut> ResourceProducer for FnProducer<F>
where
    F: Fn(UriParams) -> Fut + Send + Sync,
    Fut: Future<Output = McpResult<ResourceBody>> + Send,
{
    async fn produce(&self, _uri: &str, params: &UriParams) -> McpResult<ResourceBody> {
        (self.0)(params.clone()).await
    }
}
