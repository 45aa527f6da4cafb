//! Internal utilities

/// Helper which wraps `tokio::time::interval` and makes it return a stream
///
/// Missed ticks are delayed rather than bursted, a slow fetch never triggers
/// back to back polls.
#[cfg(any(feature = "rt-tokio", feature = "rt-tokio-current-thread"))]
pub(crate) fn tokio_interval_stream(
    period: std::time::Duration,
) -> tokio_stream::wrappers::IntervalStream {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    tokio_stream::wrappers::IntervalStream::new(interval)
}
