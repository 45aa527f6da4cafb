use crate::error::SamplingError;
use opentelemetry::trace::SamplingDecision;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// Samples at most `max_traces_per_second` traces per second.
///
/// Backed by a leaky bucket holding up to `max(max_traces_per_second, 1)`
/// credits, refilled continuously. Concurrent callers share the bucket.
pub struct RateLimitingSampler {
    max_traces_per_second: f64,
    bucket: Mutex<LeakyBucket>,
}

impl RateLimitingSampler {
    pub(crate) fn new(max_traces_per_second: f64) -> Result<Self, SamplingError> {
        if !max_traces_per_second.is_finite() || max_traces_per_second < 0.0 {
            return Err(SamplingError::invalid_rate_limit(max_traces_per_second));
        }
        Ok(RateLimitingSampler {
            max_traces_per_second,
            bucket: Mutex::new(LeakyBucket::new(
                max_traces_per_second.max(1.0),
                max_traces_per_second,
            )),
        })
    }

    /// Maximum number of traces sampled per second.
    pub fn max_traces_per_second(&self) -> f64 {
        self.max_traces_per_second
    }

    pub(crate) fn decide(&self) -> SamplingDecision {
        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        if bucket.should_sample() {
            SamplingDecision::RecordAndSample
        } else {
            SamplingDecision::Drop
        }
    }
}

impl fmt::Debug for RateLimitingSampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimitingSampler")
            .field("max_traces_per_second", &self.max_traces_per_second)
            .finish()
    }
}

impl fmt::Display for RateLimitingSampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RateLimiting{{{}}}", self.max_traces_per_second)
    }
}

// compares configuration only, not the credit balance
impl PartialEq for RateLimitingSampler {
    fn eq(&self, other: &Self) -> bool {
        self.max_traces_per_second == other.max_traces_per_second
    }
}

// leaky bucket based rate limit
pub(crate) struct LeakyBucket {
    span_per_sec: f64,
    available: f64,
    bucket_size: f64,
    last_time: Instant,
}

impl LeakyBucket {
    pub(crate) fn new(bucket_size: f64, span_per_sec: f64) -> LeakyBucket {
        LeakyBucket {
            span_per_sec,
            // a zero rate never admits anything, not even an initial burst
            available: if span_per_sec > 0.0 { bucket_size } else { 0.0 },
            bucket_size,
            last_time: Instant::now(),
        }
    }

    pub(crate) fn should_sample(&mut self) -> bool {
        self.check_availability(Instant::now())
    }

    fn check_availability(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_time);
        if now > self.last_time {
            self.last_time = now;
        }
        self.available = f64::min(
            elapsed.as_secs_f64() * self.span_per_sec + self.available,
            self.bucket_size,
        );

        if self.available >= 1.0 {
            self.available -= 1.0;
            true
        } else {
            false
        }
    }
}
