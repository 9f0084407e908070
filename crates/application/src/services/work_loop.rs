//! Work loop service
//!
//! Produces one correlated unit of work per interval: open a span, log a
//! record carrying the span's trace id, increment the counter, close the
//! span, then sleep. The loop runs until the shutdown future resolves or an
//! optional iteration limit is reached.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use domain::{LogRecord, ResourceAttributes, SpanContext};
use tracing::{debug, info, instrument};

use crate::error::ApplicationError;
use crate::ports::{CounterPort, EventLogPort, TracePort};

/// Counter increment per unit of work
const INCREMENT: u64 = 1;

/// Configuration for the work loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkLoopConfig {
    /// Pause between units of work
    pub interval: Duration,
    /// Name given to each span
    pub span_name: String,
    /// Message of each log record
    pub message: String,
    /// Value of the `source` log field
    pub source: String,
    /// Stop after this many units (run until shutdown when `None`)
    pub max_iterations: Option<u64>,
}

impl Default for WorkLoopConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            span_name: "work".to_string(),
            message: "Did Work".to_string(),
            source: "app".to_string(),
            max_iterations: None,
        }
    }
}

impl WorkLoopConfig {
    /// Reject configurations the loop cannot run with
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.interval.is_zero() {
            return Err(ApplicationError::Configuration(
                "work interval must be greater than zero".to_string(),
            ));
        }
        if self.span_name.trim().is_empty() {
            return Err(ApplicationError::Configuration(
                "span name must not be empty".to_string(),
            ));
        }
        if self.max_iterations == Some(0) {
            return Err(ApplicationError::Configuration(
                "max_iterations must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a single unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkUnit {
    /// Sequence number, starting at 1
    pub iteration: u64,
    /// The span opened (and closed) for this unit
    pub span: SpanContext,
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The shutdown future resolved
    Shutdown,
    /// `max_iterations` units were completed
    IterationLimit,
}

/// Summary returned when the loop stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkLoopReport {
    /// Units of work completed
    pub iterations: u64,
    /// Why the loop ended
    pub stop_reason: StopReason,
}

/// Drives the span / log / counter emission cycle
pub struct WorkLoopService {
    tracer: Arc<dyn TracePort>,
    counter: Arc<dyn CounterPort>,
    events: Arc<dyn EventLogPort>,
    resource: ResourceAttributes,
    config: WorkLoopConfig,
    completed: AtomicU64,
}

impl std::fmt::Debug for WorkLoopService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkLoopService")
            .field("resource", &self.resource)
            .field("config", &self.config)
            .field("completed", &self.completed.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl WorkLoopService {
    /// Create a work loop over the given ports
    pub fn new(
        tracer: Arc<dyn TracePort>,
        counter: Arc<dyn CounterPort>,
        events: Arc<dyn EventLogPort>,
        resource: ResourceAttributes,
        config: WorkLoopConfig,
    ) -> Result<Self, ApplicationError> {
        config.validate()?;
        Ok(Self {
            tracer,
            counter,
            events,
            resource,
            config,
            completed: AtomicU64::new(0),
        })
    }

    /// Loop configuration
    pub const fn config(&self) -> &WorkLoopConfig {
        &self.config
    }

    /// Units of work completed so far
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Perform one unit of work
    ///
    /// The span is always ended before this returns.
    pub fn run_once(&self) -> WorkUnit {
        let iteration = self.completed.load(Ordering::Relaxed) + 1;

        let span = self.tracer.start_span(&self.config.span_name);
        let context = span.context();

        let record = LogRecord::info(&self.config.message, context, self.resource.clone())
            .with_source(&self.config.source)
            .with_iteration(iteration);
        self.events.emit(&record);

        self.counter.add(INCREMENT);
        span.end();

        self.completed.store(iteration, Ordering::Relaxed);
        debug!(iteration, trace_id = %context.trace_id, "Unit of work completed");

        WorkUnit {
            iteration,
            span: context,
        }
    }

    /// Run until `shutdown` resolves or the iteration limit is hit
    ///
    /// The first unit runs immediately. A shutdown that arrives while a unit
    /// is in progress takes effect once that unit has completed.
    #[instrument(skip_all, fields(interval_ms = self.config.interval.as_millis()))]
    pub async fn run_until<F>(&self, shutdown: F) -> WorkLoopReport
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(resource = %self.resource, "Work loop started");

        let stop_reason = loop {
            self.run_once();

            if let Some(limit) = self.config.max_iterations {
                if self.completed() >= limit {
                    break StopReason::IterationLimit;
                }
            }

            tokio::select! {
                biased;
                () = &mut shutdown => break StopReason::Shutdown,
                () = tokio::time::sleep(self.config.interval) => {},
            }
        };

        let report = WorkLoopReport {
            iterations: self.completed(),
            stop_reason,
        };
        info!(
            iterations = report.iterations,
            reason = ?report.stop_reason,
            "Work loop stopped"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use domain::{Severity, SpanId, TraceId};
    use parking_lot::Mutex;

    use super::*;
    use crate::ports::{MockCounterPort, MockEventLogPort, MockTracePort, SpanGuard};

    #[derive(Default)]
    struct SpanLedger {
        started: Vec<SpanContext>,
        ended: Vec<SpanContext>,
    }

    /// Trace port that hands out sequential ids and records span lifecycles
    #[derive(Default)]
    struct RecordingTracer {
        next: AtomicU64,
        ledger: Arc<Mutex<SpanLedger>>,
    }

    struct RecordingSpan {
        context: SpanContext,
        ledger: Arc<Mutex<SpanLedger>>,
    }

    impl SpanGuard for RecordingSpan {
        fn context(&self) -> SpanContext {
            self.context
        }

        fn end(self: Box<Self>) {
            self.ledger.lock().ended.push(self.context);
        }
    }

    impl TracePort for RecordingTracer {
        fn start_span(&self, _name: &str) -> Box<dyn SpanGuard> {
            let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
            let context = SpanContext::new(
                TraceId::from_bytes(u128::from(n).to_be_bytes()),
                SpanId::from_bytes(n.to_be_bytes()),
            );
            self.ledger.lock().started.push(context);
            Box::new(RecordingSpan {
                context,
                ledger: Arc::clone(&self.ledger),
            })
        }
    }

    #[derive(Default)]
    struct RecordingEvents {
        records: Mutex<Vec<LogRecord>>,
    }

    impl EventLogPort for RecordingEvents {
        fn emit(&self, record: &LogRecord) {
            self.records.lock().push(record.clone());
        }
    }

    #[derive(Default)]
    struct RecordingCounter {
        value: AtomicU64,
    }

    impl CounterPort for RecordingCounter {
        fn add(&self, delta: u64) {
            self.value.fetch_add(delta, Ordering::Relaxed);
        }
    }

    struct Harness {
        tracer: Arc<RecordingTracer>,
        events: Arc<RecordingEvents>,
        counter: Arc<RecordingCounter>,
        service: WorkLoopService,
    }

    fn resource() -> ResourceAttributes {
        ResourceAttributes::new("otel-docs", "dev", "0.1").unwrap()
    }

    fn harness(config: WorkLoopConfig) -> Harness {
        let tracer = Arc::new(RecordingTracer::default());
        let events = Arc::new(RecordingEvents::default());
        let counter = Arc::new(RecordingCounter::default());
        let service = WorkLoopService::new(
            Arc::clone(&tracer) as Arc<dyn TracePort>,
            Arc::clone(&counter) as Arc<dyn CounterPort>,
            Arc::clone(&events) as Arc<dyn EventLogPort>,
            resource(),
            config,
        )
        .unwrap();
        Harness {
            tracer,
            events,
            counter,
            service,
        }
    }

    #[test]
    fn config_default_matches_reference_loop() {
        let config = WorkLoopConfig::default();
        assert_eq!(config.interval, Duration::from_secs(5));
        assert_eq!(config.span_name, "work");
        assert_eq!(config.message, "Did Work");
        assert_eq!(config.source, "app");
        assert!(config.max_iterations.is_none());
    }

    #[test]
    fn config_rejects_zero_interval() {
        let config = WorkLoopConfig {
            interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ApplicationError::Configuration(_))
        ));
    }

    #[test]
    fn config_rejects_blank_span_name() {
        let config = WorkLoopConfig {
            span_name: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_rejects_zero_iteration_limit() {
        let config = WorkLoopConfig {
            max_iterations: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn run_once_logs_trace_id_of_its_span() {
        let h = harness(WorkLoopConfig::default());

        let unit = h.service.run_once();

        let records = h.events.records.lock();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].span, unit.span);
        assert_eq!(records[0].trace_id(), unit.span.trace_id.to_string());
        assert_eq!(records[0].message, "Did Work");
        assert_eq!(records[0].source, "app");
        assert_eq!(records[0].severity, Severity::Info);
        assert_eq!(records[0].iteration, 1);
        assert_eq!(records[0].resource, resource());
    }

    #[test]
    fn every_started_span_is_ended() {
        let h = harness(WorkLoopConfig::default());

        for _ in 0..4 {
            h.service.run_once();
        }

        let ledger = h.tracer.ledger.lock();
        assert_eq!(ledger.started.len(), 4);
        assert_eq!(ledger.started, ledger.ended);
    }

    #[test]
    fn counter_equals_iterations() {
        let h = harness(WorkLoopConfig::default());

        for _ in 0..7 {
            h.service.run_once();
        }

        assert_eq!(h.counter.value.load(Ordering::Relaxed), 7);
        assert_eq!(h.service.completed(), 7);
    }

    #[test]
    fn each_iteration_gets_a_fresh_trace() {
        let h = harness(WorkLoopConfig::default());

        let first = h.service.run_once();
        let second = h.service.run_once();

        assert_ne!(first.span.trace_id, second.span.trace_id);
        assert_eq!(first.iteration, 1);
        assert_eq!(second.iteration, 2);
    }

    #[test]
    fn run_once_uses_configured_span_name_and_ports_in_order() {
        let mut tracer = MockTracePort::new();
        let mut events = MockEventLogPort::new();
        let mut counter = MockCounterPort::new();
        let mut seq = mockall::Sequence::new();

        let context = SpanContext::new(
            TraceId::from_bytes([7; 16]),
            SpanId::from_bytes([5; 8]),
        );
        tracer
            .expect_start_span()
            .withf(|name| name == "checkout")
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| {
                Box::new(RecordingSpan {
                    context,
                    ledger: Arc::new(Mutex::new(SpanLedger::default())),
                }) as Box<dyn SpanGuard>
            });
        events
            .expect_emit()
            .withf(move |record| record.span == context && record.message == "Did Work")
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        counter
            .expect_add()
            .withf(|delta| *delta == 1)
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let service = WorkLoopService::new(
            Arc::new(tracer),
            Arc::new(counter),
            Arc::new(events),
            resource(),
            WorkLoopConfig {
                span_name: "checkout".to_string(),
                ..Default::default()
            },
        )
        .unwrap();

        let unit = service.run_once();
        assert_eq!(unit.span, context);
    }

    #[tokio::test(start_paused = true)]
    async fn twelve_seconds_at_five_second_interval() {
        let h = harness(WorkLoopConfig::default());

        let report = h
            .service
            .run_until(tokio::time::sleep(Duration::from_secs(12)))
            .await;

        // Units at t=0s, 5s and 10s
        assert_eq!(report.iterations, 3);
        assert_eq!(report.stop_reason, StopReason::Shutdown);
        assert_eq!(h.counter.value.load(Ordering::Relaxed), 3);
        assert_eq!(h.events.records.lock().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_at_iteration_limit() {
        let h = harness(WorkLoopConfig {
            max_iterations: Some(2),
            ..Default::default()
        });

        let report = h.service.run_until(std::future::pending::<()>()).await;

        assert_eq!(report.iterations, 2);
        assert_eq!(report.stop_reason, StopReason::IterationLimit);
        let ledger = h.tracer.ledger.lock();
        assert_eq!(ledger.started.len(), 2);
        assert_eq!(ledger.ended.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_already_signalled_still_completes_first_unit() {
        let h = harness(WorkLoopConfig::default());

        let report = h.service.run_until(std::future::ready(())).await;

        assert_eq!(report.iterations, 1);
        assert_eq!(report.stop_reason, StopReason::Shutdown);
        assert_eq!(h.tracer.ledger.lock().ended.len(), 1);
    }
}
