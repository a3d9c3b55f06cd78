use serde::Serialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const DEFAULT_LOG_FILTER: &str = "greeter_core=info,runner_container=info,bootstrap=info";

/// Logs go to stderr; stdout carries output records.
pub fn init_tracing(filter: Option<&str>) {
    let fallback = filter.unwrap_or(DEFAULT_LOG_FILTER).to_string();
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct InvocationMetrics {
    pub invocations: usize,
    pub defaulted_names: usize,
    pub skipped_records: usize,
}

impl InvocationMetrics {
    pub fn record_invocation(&mut self, defaulted: bool) {
        self.invocations += 1;
        if defaulted {
            self.defaulted_names += 1;
        }
    }

    pub fn record_skip(&mut self) {
        self.skipped_records += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_counters() {
        let mut metrics = InvocationMetrics::default();
        metrics.record_invocation(false);
        metrics.record_invocation(true);
        metrics.record_skip();

        assert_eq!(metrics.invocations, 2);
        assert_eq!(metrics.defaulted_names, 1);
        assert_eq!(metrics.skipped_records, 1);
    }

    #[test]
    fn test_init_tracing_twice_does_not_panic() {
        init_tracing(None);
        init_tracing(Some("greeter_core=debug"));
    }
}
