//! Environment configuration
//!
//! Reads the standard OpenTelemetry variables selecting the Jaeger remote
//! sampler. Invalid entries are reported and skipped, they never fail the
//! builder.
use opentelemetry::otel_warn;
use std::env;
use std::time::Duration;

/// Name of the service, used to look up its strategy.
pub(crate) const OTEL_SERVICE_NAME: &str = "OTEL_SERVICE_NAME";
/// Sampler selected by the application.
pub(crate) const OTEL_TRACES_SAMPLER: &str = "OTEL_TRACES_SAMPLER";
/// Arguments of the selected sampler.
pub(crate) const OTEL_TRACES_SAMPLER_ARG: &str = "OTEL_TRACES_SAMPLER_ARG";

const ENDPOINT_KEY: &str = "endpoint";
const POLLING_INTERVAL_KEY: &str = "pollingIntervalMs";
const INITIAL_SAMPLING_RATE_KEY: &str = "initialSamplingRate";

/// Settings found in the environment. `None` means not set or invalid.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct EnvConfig {
    pub(crate) service_name: Option<String>,
    pub(crate) endpoint: Option<String>,
    pub(crate) polling_interval: Option<Duration>,
    pub(crate) initial_sampling_rate: Option<f64>,
}

impl EnvConfig {
    pub(crate) fn from_env() -> Self {
        let mut config = EnvConfig {
            service_name: env::var(OTEL_SERVICE_NAME)
                .ok()
                .filter(|name| !name.is_empty()),
            ..Default::default()
        };

        if let Ok(sampler) = env::var(OTEL_TRACES_SAMPLER) {
            match sampler.as_str() {
                "jaeger_remote" | "parentbased_jaeger_remote" => {
                    if let Ok(arg) = env::var(OTEL_TRACES_SAMPLER_ARG) {
                        config.apply_sampler_arg(&arg);
                    }
                }
                // another sampler is selected, its argument isn't ours
                _ => {}
            }
        }

        config
    }

    /// Apply `key=value` pairs separated by commas, e.g.
    /// `endpoint=http://localhost:5778/sampling,pollingIntervalMs=5000,initialSamplingRate=0.25`.
    pub(crate) fn apply_sampler_arg(&mut self, arg: &str) {
        for pair in arg.split(',').map(str::trim).filter(|pair| !pair.is_empty()) {
            let Some((key, value)) = pair.split_once('=') else {
                otel_warn!(
                    name: "JaegerRemoteSampler.Config.InvalidSamplerArgument",
                    message = "Ignoring OTEL_TRACES_SAMPLER_ARG entry without a value",
                    entry = pair.to_string()
                );
                continue;
            };
            let value = value.trim();

            match key.trim() {
                ENDPOINT_KEY if !value.is_empty() => self.endpoint = Some(value.to_string()),
                POLLING_INTERVAL_KEY => match value.parse::<u64>() {
                    Ok(ms) if ms > 0 => self.polling_interval = Some(Duration::from_millis(ms)),
                    _ => {
                        otel_warn!(
                            name: "JaegerRemoteSampler.Config.InvalidSamplerArgument",
                            message = "pollingIntervalMs must be a positive number of milliseconds, using the default",
                            value = value.to_string()
                        );
                    }
                },
                INITIAL_SAMPLING_RATE_KEY => match value.parse::<f64>() {
                    Ok(rate) if (0.0..=1.0).contains(&rate) => {
                        self.initial_sampling_rate = Some(rate)
                    }
                    _ => {
                        otel_warn!(
                            name: "JaegerRemoteSampler.Config.InvalidSamplerArgument",
                            message = "initialSamplingRate must be between 0.0 and 1.0, using the default",
                            value = value.to_string()
                        );
                    }
                },
                other => {
                    otel_warn!(
                        name: "JaegerRemoteSampler.Config.InvalidSamplerArgument",
                        message = "Ignoring unknown or empty OTEL_TRACES_SAMPLER_ARG entry",
                        key = other.to_string()
                    );
                }
            }
        }
    }
}
