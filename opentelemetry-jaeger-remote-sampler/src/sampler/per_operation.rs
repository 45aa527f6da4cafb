use super::Sampler;
use opentelemetry::trace::{SamplingDecision, TraceId};
use std::collections::HashMap;
use std::fmt;

/// Dispatches to a sampler chosen by operation name.
///
/// Operations missing from the map are sampled by the default sampler. The map
/// is fixed at construction.
#[derive(Debug, PartialEq)]
pub struct PerOperationSampler {
    default_sampler: Box<Sampler>,
    operation_map: HashMap<String, Sampler>,
}

impl PerOperationSampler {
    /// Create a per-operation sampler.
    pub fn new(default_sampler: Sampler, operation_map: HashMap<String, Sampler>) -> Self {
        PerOperationSampler {
            default_sampler: Box::new(default_sampler),
            operation_map,
        }
    }

    /// The sampler used for operations without a dedicated entry.
    pub fn default_sampler(&self) -> &Sampler {
        &self.default_sampler
    }

    /// The sampler used for `operation`, if it has a dedicated entry.
    pub fn operation_sampler(&self, operation: &str) -> Option<&Sampler> {
        self.operation_map.get(operation)
    }

    pub(crate) fn decide(&self, trace_id: TraceId, name: &str) -> SamplingDecision {
        self.operation_map
            .get(name)
            .unwrap_or(&*self.default_sampler)
            .decide(trace_id, name)
    }
}

impl fmt::Display for PerOperationSampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut operations: Vec<_> = self.operation_map.iter().collect();
        operations.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));

        write!(f, "PerOperation{{default={},per={{", self.default_sampler)?;
        for (idx, (operation, sampler)) in operations.into_iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            write!(f, "{operation}:{sampler}")?;
        }
        f.write_str("}}")
    }
}
