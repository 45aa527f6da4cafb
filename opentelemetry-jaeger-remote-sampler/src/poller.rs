use crate::error::SamplingError;
use crate::fetcher::StrategyFetcher;
use crate::sampler::Sampler;
use crate::strategy::SamplingStrategyParameters;
use crate::translator::translate;
use arc_swap::ArcSwap;
use futures_channel::oneshot;
use futures_util::{future::FutureExt as _, pin_mut, select, stream::Stream, StreamExt as _};
use opentelemetry::{otel_debug, otel_warn};
use std::sync::Arc;

/// What a successful poll cycle did to the active sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UpdateOutcome {
    /// A new sampler was installed.
    Updated,
    /// The response carried no strategy, the active sampler was kept.
    Unchanged,
}

/// Periodically fetches the remote strategy and installs it.
///
/// The poller is the only writer of the active sampler slot.
#[derive(Debug)]
pub(crate) struct StrategyPoller<F> {
    fetcher: F,
    params: SamplingStrategyParameters,
    active: Arc<ArcSwap<Sampler>>,
}

impl<F: StrategyFetcher> StrategyPoller<F> {
    pub(crate) fn new(
        fetcher: F,
        params: SamplingStrategyParameters,
        active: Arc<ArcSwap<Sampler>>,
    ) -> Self {
        StrategyPoller {
            fetcher,
            params,
            active,
        }
    }

    /// Run a single fetch, translate and install cycle.
    ///
    /// On error the active sampler is left untouched.
    pub(crate) async fn update(&self) -> Result<UpdateOutcome, SamplingError> {
        let response = self.fetcher.fetch(&self.params).await?;

        let current = self.active.load_full();
        let next = translate(&response, &current)?;
        if Arc::ptr_eq(&current, &next) {
            return Ok(UpdateOutcome::Unchanged);
        }

        otel_debug!(
            name: "JaegerRemoteSampler.StrategyUpdated",
            previous = current.description(),
            current = next.description()
        );
        self.active.store(next);
        Ok(UpdateOutcome::Updated)
    }

    /// Poll on every tick of `interval` until `shutdown` resolves.
    ///
    /// `shutdown` resolves either when a shutdown is requested or when its
    /// sender is dropped. An in-flight fetch is abandoned on shutdown.
    pub(crate) async fn run<I>(self, interval: I, shutdown: oneshot::Receiver<()>)
    where
        I: Stream + Send,
    {
        let mut shutdown = shutdown.fuse();
        let ticks = interval.map(|_| ()).fuse();
        pin_mut!(ticks);

        loop {
            select! {
                _ = shutdown => break,
                tick = ticks.next() => {
                    if tick.is_none() {
                        break;
                    }
                    let update = self.update().fuse();
                    pin_mut!(update);
                    select! {
                        _ = shutdown => break,
                        result = update => self.report(result),
                    }
                }
            }
        }

        otel_debug!(
            name: "JaegerRemoteSampler.PollerStopped",
            service_name = self.params.service_name.clone()
        );
    }

    fn report(&self, result: Result<UpdateOutcome, SamplingError>) {
        match result {
            Ok(UpdateOutcome::Updated) | Ok(UpdateOutcome::Unchanged) => {}
            Err(SamplingError::FetchFailure(err)) => {
                otel_warn!(
                    name: "JaegerRemoteSampler.FetchFailed",
                    service_name = self.params.service_name.clone(),
                    endpoint = self.params.endpoint.clone(),
                    error = format!("{err}")
                );
            }
            Err(err) => {
                otel_warn!(
                    name: "JaegerRemoteSampler.StrategyRejected",
                    service_name = self.params.service_name.clone(),
                    error = format!("{err}")
                );
            }
        }
    }
}
