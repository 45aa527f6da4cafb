use crate::error::SamplingError;
use opentelemetry::trace::{SamplingDecision, TraceId};
use std::fmt;

mod per_operation;
mod rate_limit;

pub use per_operation::PerOperationSampler;
pub use rate_limit::RateLimitingSampler;

/// The decision functions a remote strategy can be translated into.
///
/// A `Sampler` is immutable once built. When the remote strategy changes, the
/// [`JaegerRemoteSampler`] installs a brand new `Sampler` instead of updating
/// the active one in place.
///
/// The [`Display`] implementation renders a stable description of the
/// configuration, e.g. `PerOperation{default=ProbabilisticRatio{0.2},per={foo:AlwaysOn}}`.
///
/// [`JaegerRemoteSampler`]: crate::JaegerRemoteSampler
/// [`Display`]: std::fmt::Display
#[derive(Debug, PartialEq)]
pub enum Sampler {
    /// Always sample the trace
    AlwaysOn,
    /// Never sample the trace
    AlwaysOff,
    /// Sample a given fraction of traces, decided from the trace id alone.
    /// Fractions >= 1 will always sample, fractions <= 0 never sample.
    ///
    /// Use [`Sampler::probabilistic`] to build a validated instance.
    ProbabilisticRatio(f64),
    /// Sample at most a fixed number of traces per second.
    RateLimiting(RateLimitingSampler),
    /// Pick a sampler by operation (span) name, falling back to a default.
    PerOperation(PerOperationSampler),
}

impl Sampler {
    /// Create a ratio based sampler.
    ///
    /// Returns [`SamplingError::InvalidRate`] when `rate` is not within `[0, 1]`.
    /// A rate of exactly `1.0` yields [`Sampler::AlwaysOn`].
    pub fn probabilistic(rate: f64) -> Result<Sampler, SamplingError> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(SamplingError::invalid_probability(rate));
        }
        if rate == 1.0 {
            Ok(Sampler::AlwaysOn)
        } else {
            Ok(Sampler::ProbabilisticRatio(rate))
        }
    }

    /// Create a rate limiting sampler admitting `max_traces_per_second`.
    ///
    /// Returns [`SamplingError::InvalidRate`] for negative, infinite or NaN values.
    pub fn rate_limiting(max_traces_per_second: f64) -> Result<Sampler, SamplingError> {
        RateLimitingSampler::new(max_traces_per_second).map(Sampler::RateLimiting)
    }

    /// Decide whether the trace identified by `trace_id` should be sampled.
    ///
    /// `name` is the operation (span) name; only per-operation samplers look at it.
    pub fn decide(&self, trace_id: TraceId, name: &str) -> SamplingDecision {
        match self {
            Sampler::AlwaysOn => SamplingDecision::RecordAndSample,
            Sampler::AlwaysOff => SamplingDecision::Drop,
            Sampler::ProbabilisticRatio(prob) => sample_based_on_probability(prob, trace_id),
            Sampler::RateLimiting(rate_limiter) => rate_limiter.decide(),
            Sampler::PerOperation(per_operation) => per_operation.decide(trace_id, name),
        }
    }

    /// Human readable description of the sampler configuration.
    pub fn description(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Sampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sampler::AlwaysOn => f.write_str("AlwaysOn"),
            Sampler::AlwaysOff => f.write_str("AlwaysOff"),
            Sampler::ProbabilisticRatio(prob) => write!(f, "ProbabilisticRatio{{{prob}}}"),
            Sampler::RateLimiting(rate_limiter) => fmt::Display::fmt(rate_limiter, f),
            Sampler::PerOperation(per_operation) => fmt::Display::fmt(per_operation, f),
        }
    }
}

pub(crate) fn sample_based_on_probability(prob: &f64, trace_id: TraceId) -> SamplingDecision {
    if *prob >= 1.0 {
        SamplingDecision::RecordAndSample
    } else {
        let prob_upper_bound = (prob.max(0.0) * (1u64 << 63) as f64) as u64;
        let trace_id_low = u128::from_be_bytes(trace_id.to_bytes()) as u64;
        let rnd_from_trace_id = trace_id_low >> 1;

        if rnd_from_trace_id < prob_upper_bound {
            SamplingDecision::RecordAndSample
        } else {
            SamplingDecision::Drop
        }
    }
}
