//! Errors produced while configuring the sampler or applying remote strategies.
use thiserror::Error;

/// Errors returned by the remote sampler.
///
/// None of these ever reach the sampling decision path. Errors raised during a
/// poll cycle are logged and the previously installed strategy keeps serving
/// decisions.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SamplingError {
    /// The fetch collaborator could not deliver a strategy document.
    #[error("failed to fetch sampling strategy: {0}")]
    FetchFailure(#[from] FetchError),

    /// The strategy document has an unrecognized or inconsistent shape.
    #[error("malformed sampling strategy: {0}")]
    MalformedStrategy(String),

    /// A sampling probability outside `[0, 1]` or an invalid rate limit.
    #[error("invalid {kind} {value}: {reason}")]
    InvalidRate {
        /// Which rate was rejected, e.g. `sampling rate`.
        kind: &'static str,
        /// The rejected value.
        value: f64,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The sampler builder was given an unusable configuration.
    #[error("invalid sampler configuration: {0}")]
    InvalidConfig(String),
}

impl SamplingError {
    pub(crate) fn invalid_probability(value: f64) -> Self {
        SamplingError::InvalidRate {
            kind: "sampling rate",
            value,
            reason: "must be between 0.0 and 1.0",
        }
    }

    pub(crate) fn invalid_rate_limit(value: f64) -> Self {
        SamplingError::InvalidRate {
            kind: "max traces per second",
            value,
            reason: "must be a finite, non-negative number",
        }
    }

    /// Folds a sampler construction failure into a strategy error.
    pub(crate) fn into_malformed(self) -> Self {
        match self {
            SamplingError::MalformedStrategy(_) => self,
            other => SamplingError::MalformedStrategy(other.to_string()),
        }
    }
}

/// Error returned by a [`StrategyFetcher`] when no strategy document could be
/// retrieved.
///
/// [`StrategyFetcher`]: crate::StrategyFetcher
#[derive(Error, Debug)]
#[error(transparent)]
pub struct FetchError(#[from] Box<dyn std::error::Error + Send + Sync + 'static>);

impl From<String> for FetchError {
    fn from(err_msg: String) -> Self {
        FetchError(Box::new(Custom(err_msg)))
    }
}

impl From<&'static str> for FetchError {
    fn from(err_msg: &'static str) -> Self {
        FetchError(Box::new(Custom(err_msg.into())))
    }
}

/// Wrap type for string
#[derive(Error, Debug)]
#[error("{0}")]
struct Custom(String);
