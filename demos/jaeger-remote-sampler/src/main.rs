use async_trait::async_trait;
use opentelemetry::global;
use opentelemetry::trace::Tracer;
use opentelemetry_jaeger_remote_sampler::{
    runtime, FetchError, JaegerRemoteSampler, SamplingStrategyParameters,
    SamplingStrategyResponse, StrategyFetcher,
};
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::path::PathBuf;
use std::time::Duration;

/// Reads the strategy from a JSON file, edit it while the demo runs to see
/// the sampler follow.
#[derive(Debug)]
struct FileStrategyFetcher {
    path: PathBuf,
}

#[async_trait]
impl StrategyFetcher for FileStrategyFetcher {
    async fn fetch(
        &self,
        params: &SamplingStrategyParameters,
    ) -> Result<SamplingStrategyResponse, FetchError> {
        let document = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|err| FetchError::from(format!("{}: {err}", self.path.display())))?;
        println!(
            "fetched strategy for {} (endpoint {})",
            params.service_name, params.endpoint
        );
        serde_json::from_str(&document).map_err(|err| FetchError::from(err.to_string()))
    }
}

fn init_tracer_provider(sampler: JaegerRemoteSampler) -> SdkTracerProvider {
    let provider = SdkTracerProvider::builder()
        .with_sampler(sampler)
        .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
        .build();
    global::set_tracer_provider(provider.clone());
    provider
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("strategy.json"));

    let sampler = JaegerRemoteSampler::builder(runtime::Tokio, FileStrategyFetcher { path })
        .with_service_name("foo")
        .with_polling_interval(Duration::from_secs(5))
        .build()?;
    let provider = init_tracer_provider(sampler.clone());
    let tracer = global::tracer("jaeger-remote-sampler-demo");

    for _ in 0..10 {
        println!("active sampler: {}", sampler.description());
        tracer.in_span("test", |_cx| {});
        tracer.in_span("should_record", |_cx| {});
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    sampler.shutdown();
    provider.shutdown()?;
    Ok(())
}
