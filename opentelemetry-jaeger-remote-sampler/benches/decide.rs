use async_trait::async_trait;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use opentelemetry::trace::TraceId;
use opentelemetry_jaeger_remote_sampler::{
    runtime, FetchError, JaegerRemoteSampler, PerOperationSampler, Sampler,
    SamplingStrategyParameters, SamplingStrategyResponse, StrategyFetcher,
};
use std::collections::HashMap;
use std::hint::black_box;
use std::time::Duration;

#[derive(Debug)]
struct NoStrategy;

#[async_trait]
impl StrategyFetcher for NoStrategy {
    async fn fetch(
        &self,
        _params: &SamplingStrategyParameters,
    ) -> Result<SamplingStrategyResponse, FetchError> {
        Ok(SamplingStrategyResponse::default())
    }
}

fn per_operation_sampler(operations: usize) -> Sampler {
    let operation_map = (0..operations)
        .map(|i| (format!("operation-{i}"), Sampler::ProbabilisticRatio(0.5)))
        .collect::<HashMap<_, _>>();
    Sampler::PerOperation(PerOperationSampler::new(
        Sampler::ProbabilisticRatio(0.001),
        operation_map,
    ))
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("decide");
    let trace_id = TraceId::from(0x4bf92f3577b34da6a3ce929d0e0e4736u128);

    group.bench_function("probabilistic", |b| {
        let sampler = Sampler::ProbabilisticRatio(0.5);
        b.iter(|| black_box(sampler.decide(black_box(trace_id), "operation-1")))
    });
    group.bench_function("rate_limiting", |b| {
        let sampler = Sampler::rate_limiting(1_000_000.0).expect("valid rate");
        b.iter(|| black_box(sampler.decide(black_box(trace_id), "operation-1")))
    });
    for operations in [1, 16, 256] {
        group.bench_function(BenchmarkId::new("per_operation", operations), |b| {
            let sampler = per_operation_sampler(operations);
            b.iter(|| black_box(sampler.decide(black_box(trace_id), "operation-0")))
        });
    }

    group.bench_function("remote_sampler", |b| {
        let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
        let _guard = rt.enter();
        let sampler = JaegerRemoteSampler::builder(runtime::Tokio, NoStrategy)
            .with_service_name("bench")
            .with_polling_interval(Duration::from_secs(3600))
            .with_initial_sampling_rate(0.5)
            .build()
            .expect("valid configuration");
        b.iter(|| black_box(sampler.decide(black_box(trace_id), "operation-1")));
        sampler.shutdown();
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
