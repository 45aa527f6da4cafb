use crate::config::EnvConfig;
use crate::error::SamplingError;
use crate::fetcher::StrategyFetcher;
use crate::poller::StrategyPoller;
use crate::runtime::Runtime;
use crate::sampler::{PerOperationSampler, Sampler};
use crate::strategy::SamplingStrategyParameters;
use arc_swap::ArcSwap;
use futures_channel::oneshot;
use opentelemetry::trace::{
    Link, SamplingDecision, SamplingResult, SpanKind, TraceContextExt, TraceId, TraceState,
};
use opentelemetry::{otel_debug, Context, KeyValue};
use opentelemetry_sdk::trace::ShouldSample;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

pub(crate) const DEFAULT_REMOTE_SAMPLER_ENDPOINT: &str = "http://localhost:5778/sampling";
pub(crate) const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(60);
pub(crate) const DEFAULT_INITIAL_SAMPLING_RATE: f64 = 0.001;

/// Builder for [`JaegerRemoteSampler`].
///
/// Values found in the environment (see [`JaegerRemoteSampler::builder`]) are
/// used as defaults; the `with_*` methods override them.
#[derive(Debug)]
pub struct JaegerRemoteSamplerBuilder<R, F>
where
    R: Runtime,
    F: StrategyFetcher,
{
    runtime: R,
    fetcher: F,
    service_name: String,
    endpoint: String,
    polling_interval: Duration,
    initial_sampling_rate: f64,
    initial_operation_sampling_rates: HashMap<String, f64>,
}

impl<R, F> JaegerRemoteSamplerBuilder<R, F>
where
    R: Runtime,
    F: StrategyFetcher,
{
    pub(crate) fn new(runtime: R, fetcher: F) -> Self {
        let env_config = EnvConfig::from_env();
        JaegerRemoteSamplerBuilder {
            runtime,
            fetcher,
            service_name: env_config.service_name.unwrap_or_default(),
            endpoint: env_config
                .endpoint
                .unwrap_or_else(|| DEFAULT_REMOTE_SAMPLER_ENDPOINT.to_string()),
            polling_interval: env_config
                .polling_interval
                .unwrap_or(DEFAULT_POLLING_INTERVAL),
            initial_sampling_rate: env_config
                .initial_sampling_rate
                .unwrap_or(DEFAULT_INITIAL_SAMPLING_RATE),
            initial_operation_sampling_rates: HashMap::new(),
        }
    }

    /// The service whose strategy is fetched. Required.
    pub fn with_service_name<S: Into<String>>(self, service_name: S) -> Self {
        Self {
            service_name: service_name.into(),
            ..self
        }
    }

    /// Where the strategy is served from. Passed to the fetcher untouched.
    pub fn with_endpoint<S: Into<String>>(self, endpoint: S) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..self
        }
    }

    /// How often the strategy is fetched. Defaults to 60 seconds.
    pub fn with_polling_interval(self, interval: Duration) -> Self {
        Self {
            polling_interval: interval,
            ..self
        }
    }

    /// Sampling probability used until the first strategy is fetched.
    /// Defaults to `0.001`. The initial sampler is always
    /// [`Sampler::ProbabilisticRatio`], even for a rate of `1.0`.
    pub fn with_initial_sampling_rate(self, rate: f64) -> Self {
        Self {
            initial_sampling_rate: rate,
            ..self
        }
    }

    /// Sampling probability for `operation` until the first strategy is fetched.
    ///
    /// When any operation rate is set, the initial sampler is a per-operation
    /// sampler using the initial sampling rate as its default.
    pub fn with_initial_operation_sampling_rate<S: Into<String>>(
        mut self,
        operation: S,
        rate: f64,
    ) -> Self {
        self.initial_operation_sampling_rates
            .insert(operation.into(), rate);
        self
    }

    /// Validate the configuration and start polling for strategies.
    ///
    /// The poller is spawned on the runtime and fetches a strategy right away.
    /// Nothing is spawned when the configuration is invalid.
    pub fn build(self) -> Result<JaegerRemoteSampler, SamplingError> {
        if self.service_name.is_empty() {
            return Err(SamplingError::InvalidConfig(
                "service name cannot be empty".into(),
            ));
        }
        if self.endpoint.is_empty() {
            return Err(SamplingError::InvalidConfig("endpoint cannot be empty".into()));
        }
        if self.polling_interval.is_zero() {
            return Err(SamplingError::InvalidConfig(
                "polling interval must be greater than zero".into(),
            ));
        }
        let initial_sampler = self.initial_sampler()?;

        otel_debug!(
            name: "JaegerRemoteSampler.Built",
            service_name = self.service_name.clone(),
            endpoint = self.endpoint.clone(),
            polling_interval = format!("{:?}", self.polling_interval),
            initial_sampler = initial_sampler.description()
        );

        let active = Arc::new(ArcSwap::from_pointee(initial_sampler));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let poller = StrategyPoller::new(
            self.fetcher,
            SamplingStrategyParameters {
                service_name: self.service_name,
                endpoint: self.endpoint,
            },
            Arc::clone(&active),
        );

        let runtime = self.runtime.clone();
        let polling_interval = self.polling_interval;
        self.runtime.spawn(Box::pin(async move {
            let interval = runtime.interval(polling_interval);
            poller.run(interval, shutdown_rx).await;
        }));

        Ok(JaegerRemoteSampler {
            inner: Arc::new(Inner {
                active,
                shutdown: Mutex::new(Some(shutdown_tx)),
            }),
        })
    }

    fn initial_sampler(&self) -> Result<Sampler, SamplingError> {
        let default_sampler = initial_ratio(self.initial_sampling_rate)?;
        if self.initial_operation_sampling_rates.is_empty() {
            return Ok(default_sampler);
        }

        let operation_map = self
            .initial_operation_sampling_rates
            .iter()
            .map(|(operation, rate)| Ok((operation.clone(), initial_ratio(*rate)?)))
            .collect::<Result<HashMap<_, _>, SamplingError>>()?;
        Ok(Sampler::PerOperation(PerOperationSampler::new(
            default_sampler,
            operation_map,
        )))
    }
}

// Unlike fetched strategies, a rate of 1 stays a ratio sampler.
fn initial_ratio(rate: f64) -> Result<Sampler, SamplingError> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(SamplingError::invalid_probability(rate));
    }
    Ok(Sampler::ProbabilisticRatio(rate))
}

/// Sampler that fetches the sampling configuration from remotes.
///
/// Note that the backend doesn't need to be Jaeger so long as it supports jaeger remote sampler
/// protocol. How the strategy is retrieved is up to the [`StrategyFetcher`].
///
/// Sampling decisions are always served from the most recently installed
/// strategy; fetching a new one never blocks them. Until the first strategy
/// arrives, and whenever a fetched strategy is rejected, the previous strategy
/// stays in effect.
///
/// Clones share the same strategy and poller. The poller stops when
/// [`shutdown`](JaegerRemoteSampler::shutdown) is called or the last clone is
/// dropped.
#[derive(Clone)]
pub struct JaegerRemoteSampler {
    inner: Arc<Inner>,
}

struct Inner {
    active: Arc<ArcSwap<Sampler>>,
    // dropping the sender stops the poller as well
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
}

impl JaegerRemoteSampler {
    /// Create a builder polling `fetcher` on `runtime`.
    ///
    /// The builder reads the following environment variables:
    /// * `OTEL_SERVICE_NAME`: the service name.
    /// * `OTEL_TRACES_SAMPLER_ARG`, when `OTEL_TRACES_SAMPLER` is `jaeger_remote`
    ///   or `parentbased_jaeger_remote`: comma separated `endpoint`,
    ///   `pollingIntervalMs` and `initialSamplingRate` values, e.g.
    ///   `endpoint=http://localhost:5778/sampling,pollingIntervalMs=5000,initialSamplingRate=0.25`.
    pub fn builder<R, F>(runtime: R, fetcher: F) -> JaegerRemoteSamplerBuilder<R, F>
    where
        R: Runtime,
        F: StrategyFetcher,
    {
        JaegerRemoteSamplerBuilder::new(runtime, fetcher)
    }

    /// Decide with the active strategy whether to sample the trace.
    pub fn decide(&self, trace_id: TraceId, name: &str) -> SamplingDecision {
        self.inner.active.load().decide(trace_id, name)
    }

    /// Description of the active strategy, e.g. `ProbabilisticRatio{0.001}`.
    pub fn description(&self) -> String {
        self.inner.active.load().description()
    }

    /// Stop polling for new strategies. The active strategy keeps serving
    /// decisions.
    pub fn shutdown(&self) {
        let sender = self
            .inner
            .shutdown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(sender) = sender {
            // the poller may already be gone
            let _ = sender.send(());
        }
    }
}

impl Debug for JaegerRemoteSampler {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JaegerRemoteSampler")
            .field("sampler", &self.description())
            .finish()
    }
}

impl ShouldSample for JaegerRemoteSampler {
    fn should_sample(
        &self,
        parent_context: Option<&Context>,
        trace_id: TraceId,
        name: &str,
        _span_kind: &SpanKind,
        _attributes: &[KeyValue],
        _links: &[Link],
    ) -> SamplingResult {
        SamplingResult {
            decision: self.decide(trace_id, name),
            // No extra attributes ever set by the remote sampler.
            attributes: Vec::new(),
            // remote strategies never modify trace state.
            trace_state: match parent_context {
                Some(ctx) => ctx.span().span_context().trace_state().clone(),
                None => TraceState::default(),
            },
        }
    }
}

#[cfg(all(test, feature = "rt-tokio"))]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::runtime::Tokio;
    use crate::strategy::SamplingStrategyResponse;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct FixedStrategy(SamplingStrategyResponse);

    #[async_trait]
    impl StrategyFetcher for FixedStrategy {
        async fn fetch(
            &self,
            _params: &SamplingStrategyParameters,
        ) -> Result<SamplingStrategyResponse, FetchError> {
            Ok(self.0.clone())
        }
    }

    // every setting is explicit so tests changing the environment don't interfere
    fn builder() -> JaegerRemoteSamplerBuilder<Tokio, FixedStrategy> {
        JaegerRemoteSampler::builder(Tokio, FixedStrategy(SamplingStrategyResponse::default()))
            .with_service_name("foo")
            .with_endpoint(DEFAULT_REMOTE_SAMPLER_ENDPOINT)
            .with_polling_interval(DEFAULT_POLLING_INTERVAL)
            .with_initial_sampling_rate(DEFAULT_INITIAL_SAMPLING_RATE)
    }

    #[tokio::test]
    async fn initial_sampler_uses_initial_rate() {
        let sampler = builder().build().expect("valid configuration");
        assert_eq!(sampler.description(), "ProbabilisticRatio{0.001}");

        let sampler = builder()
            .with_initial_sampling_rate(0.5)
            .build()
            .expect("valid configuration");
        assert_eq!(sampler.description(), "ProbabilisticRatio{0.5}");
    }

    #[tokio::test]
    async fn initial_rate_of_one_stays_a_ratio() {
        let sampler = builder()
            .with_initial_sampling_rate(1.0)
            .build()
            .expect("valid configuration");
        assert_eq!(sampler.description(), "ProbabilisticRatio{1}");
        assert_eq!(
            sampler.decide(TraceId::from(u128::MAX), "op"),
            SamplingDecision::RecordAndSample
        );
    }

    #[tokio::test]
    async fn initial_operation_overrides() {
        let sampler = builder()
            .with_initial_sampling_rate(0.25)
            .with_initial_operation_sampling_rate("GET /health", 0.0)
            .with_initial_operation_sampling_rate("POST /checkout", 1.0)
            .build()
            .expect("valid configuration");
        assert_eq!(
            sampler.description(),
            "PerOperation{default=ProbabilisticRatio{0.25},per={GET /health:ProbabilisticRatio{0},POST /checkout:ProbabilisticRatio{1}}}"
        );
        assert_eq!(
            sampler.decide(TraceId::from(1u128), "POST /checkout"),
            SamplingDecision::RecordAndSample
        );
        assert_eq!(
            sampler.decide(TraceId::from(1u128), "GET /health"),
            SamplingDecision::Drop
        );
    }

    #[tokio::test]
    async fn invalid_configuration_is_rejected() {
        assert!(matches!(
            builder().with_service_name("").build(),
            Err(SamplingError::InvalidConfig(_))
        ));
        assert!(matches!(
            builder().with_endpoint("").build(),
            Err(SamplingError::InvalidConfig(_))
        ));
        assert!(matches!(
            builder().with_polling_interval(Duration::ZERO).build(),
            Err(SamplingError::InvalidConfig(_))
        ));
        assert!(matches!(
            builder().with_initial_sampling_rate(1.5).build(),
            Err(SamplingError::InvalidRate { .. })
        ));
        assert!(matches!(
            builder()
                .with_initial_operation_sampling_rate("foo", -1.0)
                .build(),
            Err(SamplingError::InvalidRate { .. })
        ));
    }

    #[tokio::test]
    async fn should_sample_propagates_parent_trace_state() {
        let sampler = builder()
            .with_initial_sampling_rate(1.0)
            .build()
            .expect("valid configuration");
        let result = sampler.should_sample(
            None,
            TraceId::from(1u128),
            "op",
            &SpanKind::Internal,
            &[],
            &[],
        );
        assert_eq!(result.decision, SamplingDecision::RecordAndSample);
        assert!(result.attributes.is_empty());
        assert_eq!(result.trace_state, TraceState::default());
    }

    #[tokio::test]
    async fn clones_share_the_active_sampler() {
        let sampler = builder().build().expect("valid configuration");
        let cloned = sampler.clone();
        sampler.shutdown();
        sampler.shutdown();
        assert_eq!(sampler.description(), cloned.description());
        assert_eq!(
            format!("{cloned:?}"),
            "JaegerRemoteSampler { sampler: \"ProbabilisticRatio{0.001}\" }"
        );
    }
}
