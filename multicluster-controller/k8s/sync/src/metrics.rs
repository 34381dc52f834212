use crate::{Error, Outcome};
use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{
        counter::Counter,
        family::Family,
        gauge::Gauge,
        histogram::{exponential_buckets, Histogram},
    },
    registry::{Registry, Unit},
};
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct ControllerMetrics {
    reconciles: Family<OutcomeLabels, Counter>,
    errors: Family<ErrorLabels, Counter>,
    requeues: Counter,
    queue_depth: Gauge,
    duration: Histogram,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct OutcomeLabels {
    outcome: &'static str,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct ErrorLabels {
    kind: &'static str,
}

// === impl ControllerMetrics ===

impl ControllerMetrics {
    pub fn register(prom: &mut Registry) -> Self {
        let reconciles = Family::default();
        prom.register(
            "reconciles",
            "Count of successful reconciliations by outcome",
            reconciles.clone(),
        );

        let errors = Family::default();
        prom.register(
            "reconcile_errors",
            "Count of failed reconciliations by kind of error",
            errors.clone(),
        );

        let requeues = Counter::default();
        prom.register(
            "requeues",
            "Count of keys requeued after a failed reconciliation",
            requeues.clone(),
        );

        let queue_depth = Gauge::default();
        prom.register(
            "queue_depth",
            "Number of keys waiting to be reconciled",
            queue_depth.clone(),
        );

        let duration = Histogram::new(exponential_buckets(0.001, 2.0, 14));
        prom.register_with_unit(
            "reconcile_duration",
            "Time taken by a single reconciliation",
            Unit::Seconds,
            duration.clone(),
        );

        Self {
            reconciles,
            errors,
            requeues,
            queue_depth,
            duration,
        }
    }

    pub(crate) fn observe(&self, result: &Result<Outcome, Error>, elapsed: Duration) {
        self.duration.observe(elapsed.as_secs_f64());
        match result {
            Ok(outcome) => {
                self.reconciles
                    .get_or_create(&OutcomeLabels {
                        outcome: outcome.as_str(),
                    })
                    .inc();
            }
            Err(error) => {
                self.errors
                    .get_or_create(&ErrorLabels { kind: error.kind() })
                    .inc();
            }
        }
    }

    pub(crate) fn requeued(&self) {
        self.requeues.inc();
    }

    pub(crate) fn set_queue_depth(&self, depth: usize) {
        self.queue_depth.set(depth as i64);
    }
}
