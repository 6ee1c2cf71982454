//! Counters for pipeline job triggers.
//!
//! The collector is a plain value owned by whoever serves the API and handed to the handlers that trigger jobs;
//! there is no process wide registry. Exporting the counts to a metrics backend is left to the owner.

use crate::models::PipelineKind;
use dashmap::DashMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct TriggerCount {
    pub app_name: String,
    pub pipeline: PipelineKind,
    pub count: u64,
}

/// Number of triggered jobs per application and pipeline kind. Safe to share between request handlers.
#[derive(Debug, Default)]
pub struct JobTriggerMetrics {
    triggers: DashMap<(String, PipelineKind), AtomicU64>,
}

impl JobTriggerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_trigger(&self, app_name: &str, pipeline: PipelineKind) {
        self.triggers
            .entry((app_name.to_string(), pipeline))
            .or_default()
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self, app_name: &str, pipeline: PipelineKind) -> u64 {
        self.triggers
            .get(&(app_name.to_string(), pipeline))
            .map(|count| count.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.triggers
            .iter()
            .map(|count| count.value().load(Ordering::Relaxed))
            .sum()
    }

    /// Returns every counter, ordered by application and then pipeline kind.
    pub fn snapshot(&self) -> Vec<TriggerCount> {
        let mut counts: Vec<TriggerCount> = self
            .triggers
            .iter()
            .map(|entry| TriggerCount {
                app_name: entry.key().0.clone(),
                pipeline: entry.key().1,
                count: entry.value().load(Ordering::Relaxed),
            })
            .collect();

        counts.sort_by(|a, b| (&a.app_name, a.pipeline).cmp(&(&b.app_name, b.pipeline)));
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::thread;

    #[test]
    fn counts_per_application_and_pipeline() {
        let metrics = JobTriggerMetrics::new();

        metrics.record_trigger("a1", PipelineKind::BuildDeploy);
        metrics.record_trigger("a1", PipelineKind::BuildDeploy);
        metrics.record_trigger("a1", PipelineKind::Promote);
        metrics.record_trigger("a0", PipelineKind::Build);

        assert_eq!(metrics.count("a1", PipelineKind::BuildDeploy), 2);
        assert_eq!(metrics.count("a1", PipelineKind::Deploy), 0);
        assert_eq!(metrics.total(), 4);
        assert_eq!(
            metrics.snapshot(),
            vec![
                TriggerCount {
                    app_name: "a0".into(),
                    pipeline: PipelineKind::Build,
                    count: 1,
                },
                TriggerCount {
                    app_name: "a1".into(),
                    pipeline: PipelineKind::BuildDeploy,
                    count: 2,
                },
                TriggerCount {
                    app_name: "a1".into(),
                    pipeline: PipelineKind::Promote,
                    count: 1,
                },
            ]
        );
    }

    #[test]
    /// Separate collectors never see each other's counts.
    fn collectors_are_independent() {
        let first = JobTriggerMetrics::new();
        let second = JobTriggerMetrics::new();

        first.record_trigger("a1", PipelineKind::Deploy);

        assert_eq!(first.total(), 1);
        assert_eq!(second.total(), 0);
    }

    #[test]
    fn concurrent_triggers_are_all_counted() {
        let metrics = JobTriggerMetrics::new();

        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..100 {
                        metrics.record_trigger("a1", PipelineKind::Build);
                    }
                });
            }
        });

        assert_eq!(metrics.count("a1", PipelineKind::Build), 800);
    }
}
