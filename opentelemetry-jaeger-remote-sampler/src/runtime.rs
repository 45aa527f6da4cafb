//! Async runtimes the strategy poller can run on.
//!
//! The poller needs two things from a runtime: a ticking interval and a way to
//! run a future in the background. [`Tokio`] and [`TokioCurrentThread`] are
//! provided behind the `rt-tokio` and `rt-tokio-current-thread` features.
use futures_util::{future::BoxFuture, stream::Stream};
use std::time::Duration;

/// Drives the strategy poller.
///
/// Implement this to poll on a runtime other than [Tokio].
///
/// [Tokio]: https://crates.io/crates/tokio
pub trait Runtime: Clone + Send + Sync + 'static {
    /// Stream ticking once per polling interval. Only the ticks matter, not
    /// the items.
    ///
    /// The first tick must be immediate so a strategy is fetched as soon as the
    /// poller starts.
    type Interval: Stream + Send;

    /// Start ticking every `duration`.
    fn interval(&self, duration: Duration) -> Self::Interval;

    /// Run `future` in the background until it completes.
    ///
    /// The poller is started through this and never joined; it completes once
    /// the sampler is shut down or dropped.
    fn spawn(&self, future: BoxFuture<'static, ()>);
}

/// Polls on the ambient Tokio multi thread runtime.
///
/// The sampler must be built from within that runtime.
#[cfg(feature = "rt-tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "rt-tokio")))]
#[derive(Debug, Clone)]
pub struct Tokio;

#[cfg(feature = "rt-tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "rt-tokio")))]
impl Runtime for Tokio {
    type Interval = tokio_stream::wrappers::IntervalStream;

    fn interval(&self, duration: Duration) -> Self::Interval {
        crate::util::tokio_interval_stream(duration)
    }

    fn spawn(&self, future: BoxFuture<'static, ()>) {
        #[allow(clippy::let_underscore_future)]
        // detached, the poller stops on its own
        let _ = tokio::spawn(future);
    }
}

/// Polls on a current thread Tokio runtime owned by a dedicated thread.
///
/// Works without an ambient runtime, and keeps polling even if the
/// application blocks its own scheduler thread.
#[cfg(feature = "rt-tokio-current-thread")]
#[cfg_attr(docsrs, doc(cfg(feature = "rt-tokio-current-thread")))]
#[derive(Debug, Clone)]
pub struct TokioCurrentThread;

#[cfg(feature = "rt-tokio-current-thread")]
#[cfg_attr(docsrs, doc(cfg(feature = "rt-tokio-current-thread")))]
impl Runtime for TokioCurrentThread {
    type Interval = tokio_stream::wrappers::IntervalStream;

    fn interval(&self, duration: Duration) -> Self::Interval {
        crate::util::tokio_interval_stream(duration)
    }

    fn spawn(&self, future: BoxFuture<'static, ()>) {
        std::thread::spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(err) => {
                    opentelemetry::otel_error!(
                        name: "JaegerRemoteSampler.RuntimeCreationFailed",
                        error = format!("{err}")
                    );
                    return;
                }
            };
            rt.block_on(future);
        });
    }
}
