use crate::error::FetchError;
use crate::strategy::{SamplingStrategyParameters, SamplingStrategyResponse};
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// Retrieves the current sampling strategy for a service.
///
/// The transport is entirely up to the implementation: an HTTP client talking
/// to a Jaeger agent, a file on disk, a canned response in tests. The poller
/// calls [`fetch`] once per polling interval, and never from the sampling path.
///
/// [`fetch`]: StrategyFetcher::fetch
#[async_trait]
pub trait StrategyFetcher: Debug + Send + Sync + 'static {
    /// Fetch the strategy for `params.service_name` from `params.endpoint`.
    async fn fetch(
        &self,
        params: &SamplingStrategyParameters,
    ) -> Result<SamplingStrategyResponse, FetchError>;
}

#[async_trait]
impl<T: StrategyFetcher + ?Sized> StrategyFetcher for Arc<T> {
    async fn fetch(
        &self,
        params: &SamplingStrategyParameters,
    ) -> Result<SamplingStrategyResponse, FetchError> {
        self.as_ref().fetch(params).await
    }
}

#[async_trait]
impl<T: StrategyFetcher + ?Sized> StrategyFetcher for Box<T> {
    async fn fetch(
        &self,
        params: &SamplingStrategyParameters,
    ) -> Result<SamplingStrategyResponse, FetchError> {
        self.as_ref().fetch(params).await
    }
}
