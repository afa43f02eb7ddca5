//! # Submission Metrics
//!
//! Prometheus counters for the submitter. They live in their own
//! [`prometheus::Registry`] under the `paychan` prefix so an embedding
//! service can expose them next to its own without name clashes.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Metric handles for one or more submitters. Clones share the handles.
#[derive(Clone)]
pub struct SubmitterMetrics {
    registry: Registry,
    /// Attempts started, including the first one of each submission.
    pub attempts_total: IntCounter,
    /// Send failures, labelled by ledger error kind.
    pub send_failures_total: IntCounterVec,
    /// Confirmation failures.
    pub confirm_failures_total: IntCounter,
    /// Submissions that ended, labelled by outcome.
    pub submissions_total: IntCounterVec,
    /// Attempts needed per finished submission.
    pub attempts_per_submission: Histogram,
}

impl SubmitterMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("paychan".into()), None)?;

        let attempts_total = IntCounter::new(
            "submission_attempts_total",
            "Transaction build attempts, first attempts included",
        )?;
        registry.register(Box::new(attempts_total.clone()))?;

        let send_failures_total = IntCounterVec::new(
            Opts::new("send_failures_total", "Failed sends by ledger error kind"),
            &["kind"],
        )?;
        registry.register(Box::new(send_failures_total.clone()))?;

        let confirm_failures_total = IntCounter::new(
            "confirm_failures_total",
            "Sent transactions that did not confirm",
        )?;
        registry.register(Box::new(confirm_failures_total.clone()))?;

        let submissions_total = IntCounterVec::new(
            Opts::new("submissions_total", "Finished submissions by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(submissions_total.clone()))?;

        let attempts_per_submission = Histogram::with_opts(
            HistogramOpts::new(
                "attempts_per_submission",
                "Attempts used by each finished submission",
            )
            .buckets(vec![1.0, 2.0, 3.0, 4.0, 6.0, 8.0, 12.0, 16.0]),
        )?;
        registry.register(Box::new(attempts_per_submission.clone()))?;

        Ok(Self {
            registry,
            attempts_total,
            send_failures_total,
            confirm_failures_total,
            submissions_total,
            attempts_per_submission,
        })
    }

    pub(crate) fn finished(&self, outcome: &str, attempts: u32) {
        self.submissions_total.with_label_values(&[outcome]).inc();
        self.attempts_per_submission.observe(attempts as f64);
    }

    /// Renders every metric in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_with_prefix() {
        let m = SubmitterMetrics::new().unwrap();
        m.attempts_total.inc();
        m.send_failures_total.with_label_values(&["transport"]).inc();
        m.finished("confirmed", 2);

        let text = m.encode().unwrap();
        assert!(text.contains("paychan_submission_attempts_total 1"));
        assert!(text.contains("paychan_send_failures_total{kind=\"transport\"} 1"));
        assert!(text.contains("paychan_submissions_total{outcome=\"confirmed\"} 1"));
    }
}
