//! # Jaeger remote sampler for OpenTelemetry
//!
//! A [`ShouldSample`] implementation whose strategy is controlled remotely. A
//! background poller periodically fetches the sampling strategy of a service,
//! translates it into a [`Sampler`] and atomically swaps it in. Sampling
//! decisions never wait on the poller: they are always served by the most
//! recently installed strategy.
//!
//! Strategies follow the Jaeger remote sampling protocol and can be
//! * probabilistic: sample a fixed ratio of traces, decided by trace id,
//! * rate limiting: sample at most a number of traces per second,
//! * per operation: a probabilistic or rate limiting sampler per span name,
//!   with a probabilistic default.
//!
//! How strategies are retrieved is left to a [`StrategyFetcher`]. Polling runs on
//! a [`runtime::Runtime`], [`runtime::Tokio`] being the default.
//!
//! ## Getting started
//!
//! ```no_run
//! use async_trait::async_trait;
//! use opentelemetry::trace::{Tracer, TracerProvider as _};
//! use opentelemetry_jaeger_remote_sampler::{
//!     runtime, FetchError, JaegerRemoteSampler, SamplingStrategyParameters,
//!     SamplingStrategyResponse, StrategyFetcher,
//! };
//! use opentelemetry_sdk::trace::SdkTracerProvider;
//! use std::time::Duration;
//!
//! #[derive(Debug)]
//! struct StaticStrategy;
//!
//! #[async_trait]
//! impl StrategyFetcher for StaticStrategy {
//!     async fn fetch(
//!         &self,
//!         _params: &SamplingStrategyParameters,
//!     ) -> Result<SamplingStrategyResponse, FetchError> {
//!         Ok(SamplingStrategyResponse::probabilistic(0.5))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sampler = JaegerRemoteSampler::builder(runtime::Tokio, StaticStrategy)
//!         .with_service_name("checkout")
//!         .with_polling_interval(Duration::from_secs(10))
//!         .build()?;
//!
//!     let provider = SdkTracerProvider::builder()
//!         .with_sampler(sampler.clone())
//!         .build();
//!
//!     provider.tracer("checkout").in_span("GET /cart", |_cx| {});
//!
//!     sampler.shutdown();
//!     Ok(())
//! }
//! ```
//!
//! ## Environment
//!
//! [`JaegerRemoteSampler::builder`] picks up `OTEL_SERVICE_NAME`, and the
//! `endpoint`, `pollingIntervalMs` and `initialSamplingRate` entries of
//! `OTEL_TRACES_SAMPLER_ARG` when `OTEL_TRACES_SAMPLER` selects `jaeger_remote`
//! or `parentbased_jaeger_remote`.
//!
//! [`ShouldSample`]: opentelemetry_sdk::trace::ShouldSample
#![warn(
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    unreachable_pub,
    unused
)]
#![allow(clippy::needless_doctest_main)]
#![cfg_attr(docsrs, feature(doc_cfg), deny(rustdoc::broken_intra_doc_links))]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/open-telemetry/opentelemetry-rust/main/assets/logo.svg"
)]

mod config;
mod error;
mod fetcher;
mod poller;
mod remote_sampler;
pub mod runtime;
mod sampler;
mod strategy;
mod translator;
mod util;

pub use error::{FetchError, SamplingError};
pub use fetcher::StrategyFetcher;
pub use remote_sampler::{JaegerRemoteSampler, JaegerRemoteSamplerBuilder};
pub use sampler::{PerOperationSampler, RateLimitingSampler, Sampler};
pub use strategy::{
    OperationSamplingStrategy, PerOperationSamplingStrategies, ProbabilisticSamplingStrategy,
    RateLimitingSamplingStrategy, SamplingStrategyParameters, SamplingStrategyResponse,
    SamplingStrategyType,
};
pub use translator::translate;
