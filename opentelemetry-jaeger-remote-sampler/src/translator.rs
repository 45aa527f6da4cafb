//! Turns a [`SamplingStrategyResponse`] into a [`Sampler`].
use crate::error::SamplingError;
use crate::sampler::{PerOperationSampler, Sampler};
use crate::strategy::{
    OperationSamplingStrategy, PerOperationSamplingStrategies, SamplingStrategyResponse,
    SamplingStrategyType,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Build the sampler described by `response`.
///
/// Strategies are considered in order: per operation, probabilistic, rate
/// limiting. A response without any strategy hands back `current` itself, so
/// callers can tell "no change" apart from an update with [`Arc::ptr_eq`].
///
/// The whole response is rejected with [`SamplingError::MalformedStrategy`] if
/// any part of it is invalid; no partially translated sampler is ever returned.
pub fn translate(
    response: &SamplingStrategyResponse,
    current: &Arc<Sampler>,
) -> Result<Arc<Sampler>, SamplingError> {
    if let Some(operation_sampling) = &response.operation_sampling {
        return per_operation_sampler(operation_sampling).map(Arc::new);
    }

    if let SamplingStrategyType::Unrecognized(tag) = &response.strategy_type {
        return Err(SamplingError::MalformedStrategy(format!(
            "unsupported strategy type {tag}"
        )));
    }

    if let Some(probabilistic) = &response.probabilistic_sampling {
        Sampler::probabilistic(probabilistic.sampling_rate)
            .map(Arc::new)
            .map_err(SamplingError::into_malformed)
    } else if let Some(rate_limiting) = &response.rate_limiting_sampling {
        Sampler::rate_limiting(rate_limiting.max_traces_per_second)
            .map(Arc::new)
            .map_err(SamplingError::into_malformed)
    } else {
        Ok(Arc::clone(current))
    }
}

fn per_operation_sampler(
    strategies: &PerOperationSamplingStrategies,
) -> Result<Sampler, SamplingError> {
    let default_sampler = Sampler::probabilistic(strategies.default_sampling_probability)
        .map_err(SamplingError::into_malformed)?;

    let mut operation_map = HashMap::with_capacity(strategies.per_operation_strategies.len());
    for strategy in &strategies.per_operation_strategies {
        let sampler = operation_sampler(strategy)?;
        if operation_map
            .insert(strategy.operation.clone(), sampler)
            .is_some()
        {
            return Err(SamplingError::MalformedStrategy(format!(
                "duplicate strategy for operation {:?}",
                strategy.operation
            )));
        }
    }

    Ok(Sampler::PerOperation(PerOperationSampler::new(
        default_sampler,
        operation_map,
    )))
}

fn operation_sampler(strategy: &OperationSamplingStrategy) -> Result<Sampler, SamplingError> {
    let sampler = if let Some(probabilistic) = &strategy.probabilistic_sampling {
        Sampler::probabilistic(probabilistic.sampling_rate)
    } else if let Some(rate_limiting) = &strategy.rate_limiting_sampling {
        Sampler::rate_limiting(rate_limiting.max_traces_per_second)
    } else {
        return Err(SamplingError::MalformedStrategy(format!(
            "no strategy for operation {:?}",
            strategy.operation
        )));
    };

    sampler.map_err(|err| {
        SamplingError::MalformedStrategy(format!("operation {:?}: {err}", strategy.operation))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{ProbabilisticSamplingStrategy, RateLimitingSamplingStrategy};
    use rstest::rstest;

    fn default_sampler() -> Arc<Sampler> {
        Arc::new(Sampler::ProbabilisticRatio(0.001))
    }

    fn operation(name: &str, rate: f64) -> OperationSamplingStrategy {
        OperationSamplingStrategy {
            operation: name.into(),
            probabilistic_sampling: Some(ProbabilisticSamplingStrategy {
                sampling_rate: rate,
            }),
            rate_limiting_sampling: None,
        }
    }

    #[test]
    fn empty_response_is_a_no_op() {
        let current = default_sampler();
        let next = translate(&SamplingStrategyResponse::default(), &current).expect("no-op");
        assert!(Arc::ptr_eq(&current, &next));
    }

    #[test]
    fn unrecognized_strategy_type_is_rejected() {
        let response = SamplingStrategyResponse {
            strategy_type: SamplingStrategyType::Unrecognized("13".into()),
            rate_limiting_sampling: Some(RateLimitingSamplingStrategy {
                max_traces_per_second: 100.0,
            }),
            ..Default::default()
        };
        assert!(matches!(
            translate(&response, &default_sampler()),
            Err(SamplingError::MalformedStrategy(_))
        ));
    }

    #[rstest]
    #[case(SamplingStrategyResponse::probabilistic(0.8), "ProbabilisticRatio{0.8}")]
    #[case(SamplingStrategyResponse::probabilistic(0.0), "ProbabilisticRatio{0}")]
    #[case(SamplingStrategyResponse::probabilistic(1.0), "AlwaysOn")]
    #[case(SamplingStrategyResponse::rate_limiting(100.0), "RateLimiting{100}")]
    #[case(SamplingStrategyResponse::rate_limiting(0.0), "RateLimiting{0}")]
    fn global_strategies(#[case] response: SamplingStrategyResponse, #[case] expected: &str) {
        let sampler = translate(&response, &default_sampler()).expect("valid strategy");
        assert_eq!(sampler.description(), expected);
    }

    #[rstest]
    #[case(SamplingStrategyResponse::probabilistic(1.5))]
    #[case(SamplingStrategyResponse::probabilistic(-0.5))]
    #[case(SamplingStrategyResponse::probabilistic(f64::NAN))]
    #[case(SamplingStrategyResponse::rate_limiting(-1.0))]
    fn invalid_rates_are_malformed(#[case] response: SamplingStrategyResponse) {
        assert!(matches!(
            translate(&response, &default_sampler()),
            Err(SamplingError::MalformedStrategy(_))
        ));
    }

    #[test]
    fn per_operation_strategy() {
        let response = SamplingStrategyResponse::per_operation(PerOperationSamplingStrategies {
            default_sampling_probability: 0.2,
            per_operation_strategies: vec![operation("foo", 1.0)],
            ..Default::default()
        });
        let sampler = translate(&response, &default_sampler()).expect("valid strategy");
        assert_eq!(
            sampler.description(),
            "PerOperation{default=ProbabilisticRatio{0.2},per={foo:AlwaysOn}}"
        );
    }

    #[test]
    fn per_operation_takes_precedence() {
        let response = SamplingStrategyResponse {
            strategy_type: SamplingStrategyType::Probabilistic,
            probabilistic_sampling: Some(ProbabilisticSamplingStrategy { sampling_rate: 1.0 }),
            operation_sampling: Some(PerOperationSamplingStrategies {
                default_sampling_probability: 1.0,
                ..Default::default()
            }),
            ..Default::default()
        };
        let sampler = translate(&response, &default_sampler()).expect("valid strategy");
        assert_eq!(
            *sampler,
            Sampler::PerOperation(PerOperationSampler::new(Sampler::AlwaysOn, HashMap::new()))
        );
    }

    #[test]
    fn per_operation_with_rate_limited_operation() {
        let response = SamplingStrategyResponse::per_operation(PerOperationSamplingStrategies {
            default_sampling_probability: 0.5,
            per_operation_strategies: vec![
                operation("b", 0.1),
                OperationSamplingStrategy {
                    operation: "a".into(),
                    probabilistic_sampling: None,
                    rate_limiting_sampling: Some(RateLimitingSamplingStrategy {
                        max_traces_per_second: 3.0,
                    }),
                },
            ],
            ..Default::default()
        });
        let sampler = translate(&response, &default_sampler()).expect("valid strategy");
        assert_eq!(
            sampler.description(),
            "PerOperation{default=ProbabilisticRatio{0.5},per={a:RateLimiting{3},b:ProbabilisticRatio{0.1}}}"
        );
    }

    #[rstest]
    #[case::default_out_of_range(1.2, vec![operation("foo", 0.5)])]
    #[case::operation_out_of_range(0.2, vec![operation("foo", 0.5), operation("bar", 7.0)])]
    #[case::duplicate_operation(0.2, vec![operation("foo", 0.5), operation("foo", 0.1)])]
    #[case::empty_operation(0.2, vec![OperationSamplingStrategy { operation: "foo".into(), ..Default::default() }])]
    fn malformed_per_operation_is_rejected_whole(
        #[case] default_sampling_probability: f64,
        #[case] per_operation_strategies: Vec<OperationSamplingStrategy>,
    ) {
        let response = SamplingStrategyResponse::per_operation(PerOperationSamplingStrategies {
            default_sampling_probability,
            per_operation_strategies,
            ..Default::default()
        });
        assert!(matches!(
            translate(&response, &default_sampler()),
            Err(SamplingError::MalformedStrategy(_))
        ));
    }

    #[test]
    fn rate_limiting_used_when_probabilistic_missing() {
        // the legacy type tag does not have to match the populated field
        let response = SamplingStrategyResponse {
            strategy_type: SamplingStrategyType::Probabilistic,
            rate_limiting_sampling: Some(RateLimitingSamplingStrategy {
                max_traces_per_second: 2.0,
            }),
            ..Default::default()
        };
        let sampler = translate(&response, &default_sampler()).expect("valid strategy");
        assert_eq!(sampler.description(), "RateLimiting{2}");
    }
}
