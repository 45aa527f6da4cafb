//! Sampling strategy documents served by a Jaeger compatible backend.
//!
//! The types mirror the `api_v2` sampling messages and (de)serialize from the
//! JSON encoding served on the agent's `/sampling` endpoint.
//! See <https://github.com/jaegertracing/jaeger-idl/blob/main/proto/api_v2/sampling.proto>.
use serde::{Deserialize, Serialize};

/// ProbabilisticSamplingStrategy samples traces with a fixed probability.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProbabilisticSamplingStrategy {
    /// samplingRate is the sampling probability in the range [0.0, 1.0].
    pub sampling_rate: f64,
}

/// RateLimitingSamplingStrategy samples a fixed number of traces per time interval.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitingSamplingStrategy {
    /// Maximum number of traces sampled per second. Fractional rates such as
    /// `0.1` (one trace every ten seconds) are accepted.
    pub max_traces_per_second: f64,
}

/// OperationSamplingStrategy is a sampling strategy for a given operation
/// (aka endpoint, span name).
///
/// Exactly one of the strategies should be populated; the probabilistic one
/// wins when both are.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperationSamplingStrategy {
    /// The operation (span) name the strategy applies to.
    pub operation: String,
    /// Probabilistic sampling for this operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probabilistic_sampling: Option<ProbabilisticSamplingStrategy>,
    /// Rate limited sampling for this operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limiting_sampling: Option<RateLimitingSamplingStrategy>,
}

/// PerOperationSamplingStrategies is a combination of strategies for different endpoints
/// as well as some service-wide defaults. It is particularly useful for services whose
/// endpoints receive vastly different traffic, so that any single rate of sampling would
/// result in either too much data for some endpoints or almost no data for other endpoints.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerOperationSamplingStrategies {
    /// defaultSamplingProbability is the sampling probability for spans that do not match
    /// any of the perOperationStrategies.
    #[serde(default)]
    pub default_sampling_probability: f64,
    /// defaultLowerBoundTracesPerSecond defines a lower-bound rate limit. Accepted on the
    /// wire, not enforced by this sampler.
    #[serde(default)]
    pub default_lower_bound_traces_per_second: f64,
    /// perOperationStrategies describes sampling strategies for individual operations within
    /// a given service.
    #[serde(default)]
    pub per_operation_strategies: Vec<OperationSamplingStrategy>,
    /// defaultUpperBoundTracesPerSecond defines an upper bound rate limit. Accepted on the
    /// wire, not enforced by this sampler.
    #[serde(default)]
    pub default_upper_bound_traces_per_second: f64,
}

/// SamplingStrategyResponse contains an overall sampling strategy for a given service.
///
/// This type should be treated as a union where only one of the strategy fields is present.
/// A response without any strategy leaves the current sampler in place.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SamplingStrategyResponse {
    /// Legacy field that was meant to indicate which one of the strategy fields
    /// below is present. It was not extended when per-operation strategy was
    /// introduced, so it is ignored when `operation_sampling` is set.
    #[serde(default)]
    pub strategy_type: SamplingStrategyType,
    /// Service wide probabilistic sampling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probabilistic_sampling: Option<ProbabilisticSamplingStrategy>,
    /// Service wide rate limited sampling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limiting_sampling: Option<RateLimitingSamplingStrategy>,
    /// Sampling per operation, with a service wide default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_sampling: Option<PerOperationSamplingStrategies>,
}

impl SamplingStrategyResponse {
    /// A service wide probabilistic strategy.
    pub fn probabilistic(sampling_rate: f64) -> Self {
        SamplingStrategyResponse {
            strategy_type: SamplingStrategyType::Probabilistic,
            probabilistic_sampling: Some(ProbabilisticSamplingStrategy { sampling_rate }),
            ..Default::default()
        }
    }

    /// A service wide rate limiting strategy.
    pub fn rate_limiting(max_traces_per_second: f64) -> Self {
        SamplingStrategyResponse {
            strategy_type: SamplingStrategyType::RateLimiting,
            rate_limiting_sampling: Some(RateLimitingSamplingStrategy {
                max_traces_per_second,
            }),
            ..Default::default()
        }
    }

    /// A per-operation strategy.
    pub fn per_operation(operation_sampling: PerOperationSamplingStrategies) -> Self {
        SamplingStrategyResponse {
            operation_sampling: Some(operation_sampling),
            ..Default::default()
        }
    }
}

/// Parameters handed to the [`StrategyFetcher`] on every fetch.
///
/// [`StrategyFetcher`]: crate::StrategyFetcher
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SamplingStrategyParameters {
    /// serviceName is a required argument.
    pub service_name: String,
    /// Where the strategy is served from, e.g. `http://localhost:5778/sampling`.
    pub endpoint: String,
}

/// See description of the SamplingStrategyResponse.strategyType field.
///
/// Accepts both the enum name (`"RATE_LIMITING"`) and its numeric value (`1`).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "RawStrategyType", into = "RawStrategyType")]
pub enum SamplingStrategyType {
    /// `PROBABILISTIC`, numeric value `0`.
    #[default]
    Probabilistic,
    /// `RATE_LIMITING`, numeric value `1`.
    RateLimiting,
    /// Any other tag, kept verbatim.
    Unrecognized(String),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawStrategyType {
    Code(i64),
    Name(String),
}

impl From<RawStrategyType> for SamplingStrategyType {
    fn from(raw: RawStrategyType) -> Self {
        match raw {
            RawStrategyType::Code(0) => SamplingStrategyType::Probabilistic,
            RawStrategyType::Code(1) => SamplingStrategyType::RateLimiting,
            RawStrategyType::Code(code) => SamplingStrategyType::Unrecognized(code.to_string()),
            RawStrategyType::Name(name) => match name.as_str() {
                "PROBABILISTIC" => SamplingStrategyType::Probabilistic,
                "RATE_LIMITING" => SamplingStrategyType::RateLimiting,
                _ => SamplingStrategyType::Unrecognized(name),
            },
        }
    }
}

impl From<SamplingStrategyType> for RawStrategyType {
    fn from(strategy_type: SamplingStrategyType) -> Self {
        match strategy_type {
            SamplingStrategyType::Probabilistic => RawStrategyType::Name("PROBABILISTIC".into()),
            SamplingStrategyType::RateLimiting => RawStrategyType::Name("RATE_LIMITING".into()),
            SamplingStrategyType::Unrecognized(tag) => match tag.parse() {
                Ok(code) => RawStrategyType::Code(code),
                Err(_) => RawStrategyType::Name(tag),
            },
        }
    }
}
