//! Sampling loop
//!
//! Each cycle fetches the full ticker list, filters it, evaluates every
//! remaining instrument against the snapshot (bounded concurrency), commits
//! the results and only then sleeps. The sleep is the barrier that makes one
//! cycle's commits visible to the next.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use common::logger::{TraceId, child_span, cycle_span, warn_if_slow};
use futures::{StreamExt, stream};
use tokio::sync::watch;
use tracing::{Instrument, debug, info, warn};

use crate::comparator::{Comparator, Evaluation};
use crate::error::{FetchError, ParseError};
use crate::market::source::QuoteSource;
use crate::market::types::{Quote, WatchScope};
use crate::metrics::CycleCounters;
use crate::snapshot::SnapshotStore;

/// Scheduling knobs fixed at startup.
#[derive(Debug, Clone)]
pub struct CycleSettings {
    pub scope: WatchScope,
    pub interval: Duration,
    pub max_concurrency: usize,
}

/// What happened to the quotes of one successful fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub filtered_out: usize,
    pub skipped_empty: usize,
    pub evaluated: usize,
    pub parse_failures: usize,
    pub notified: usize,
}

pub struct CycleScheduler {
    source: Arc<dyn QuoteSource>,
    comparator: Comparator,
    store: SnapshotStore,
    settings: CycleSettings,
    counters: CycleCounters,
}

impl CycleScheduler {
    pub fn new(
        source: Arc<dyn QuoteSource>,
        comparator: Comparator,
        store: SnapshotStore,
        mut settings: CycleSettings,
        counters: CycleCounters,
    ) -> Self {
        settings.max_concurrency = settings.max_concurrency.max(1);

        Self {
            source,
            comparator,
            store,
            settings,
            counters,
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Runs cycles until `shutdown` flips (or its sender is dropped).
    ///
    /// A cycle in progress always finishes; shutdown is only observed while
    /// sleeping between cycles.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            every_ms = self.settings.interval.as_millis() as u64,
            scope_configured = self.settings.scope.is_configured(),
            threshold = self.comparator.threshold(),
            max_concurrency = self.settings.max_concurrency,
            "cycle scheduler started"
        );

        loop {
            // Errors are already logged and counted inside the cycle.
            let _ = self.run_cycle().await;

            tokio::select! {
                _ = tokio::time::sleep(self.settings.interval) => {}
                _ = shutdown.changed() => {
                    info!("shutdown requested; cycle scheduler stopping");
                    break;
                }
            }
        }
    }

    /// Runs exactly one fetch-filter-compare-commit round.
    ///
    /// On fetch failure nothing is evaluated and the snapshot is untouched.
    pub async fn run_cycle(&self) -> Result<CycleReport, FetchError> {
        let cycle = self.counters.cycles.fetch_add(1, Ordering::Relaxed) + 1;
        let span = cycle_span(cycle, &TraceId::default());

        self.run_cycle_inner().instrument(span).await
    }

    async fn run_cycle_inner(&self) -> Result<CycleReport, FetchError> {
        let started = Instant::now();
        debug!("cycle started");

        let quotes = match warn_if_slow(
            "fetch_quotes",
            Duration::from_secs(3),
            self.source.fetch_all(),
        )
        .await
        {
            Ok(quotes) => quotes,
            Err(e) => {
                CycleCounters::incr(&self.counters.fetch_failures);
                warn!(error = %e, "quote fetch failed; skipping cycle");
                return Err(e);
            }
        };

        let mut report = CycleReport {
            fetched: quotes.len(),
            ..CycleReport::default()
        };

        let work = self.select(quotes, &mut report);

        let pending: Vec<_> = work
            .into_iter()
            .map(|quote| {
                let span = child_span("evaluate", &quote.instrument_id);
                self.evaluate_one(quote).instrument(span)
            })
            .collect();

        let mut results =
            std::pin::pin!(stream::iter(pending).buffer_unordered(self.settings.max_concurrency));

        // Commits happen here, one at a time, as evaluations complete.
        while let Some((instrument_id, outcome)) = results.next().await {
            match outcome {
                Ok(evaluation) => {
                    report.evaluated += 1;
                    CycleCounters::incr(&self.counters.evaluated);
                    if evaluation.should_notify {
                        report.notified += 1;
                    }
                    self.store.set(&instrument_id, evaluation.quote).await;
                }
                Err(e) => {
                    report.parse_failures += 1;
                    CycleCounters::incr(&self.counters.parse_failures);
                    warn!(error = %e, instrument = %instrument_id, "skipping instrument this cycle");
                }
            }
        }

        info!(
            fetched = report.fetched,
            filtered_out = report.filtered_out,
            skipped_empty = report.skipped_empty,
            evaluated = report.evaluated,
            parse_failures = report.parse_failures,
            notified = report.notified,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "cycle complete"
        );

        Ok(report)
    }

    async fn evaluate_one(&self, quote: Quote) -> (String, Result<Evaluation, ParseError>) {
        let instrument_id = quote.instrument_id.clone();
        let prior = self.store.get(&instrument_id).await;
        let outcome = self.comparator.evaluate(quote, prior.as_ref()).await;
        (instrument_id, outcome)
    }

    /// Applies the watch scope, then drops quotes without an observation.
    fn select(&self, quotes: Vec<Quote>, report: &mut CycleReport) -> Vec<Quote> {
        quotes
            .into_iter()
            .filter(|q| {
                if !self.settings.scope.matches(&q.instrument_id) {
                    report.filtered_out += 1;
                    return false;
                }
                if !q.has_observation() {
                    report.skipped_empty += 1;
                    debug!(instrument = %q.instrument_id, "empty last value; skipping");
                    return false;
                }
                true
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeliveryError;
    use crate::notify::Notifier;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tracing_test::traced_test;

    struct FailingSource;

    #[async_trait]
    impl QuoteSource for FailingSource {
        async fn fetch_all(&self) -> Result<Vec<Quote>, FetchError> {
            Err(FetchError::InvalidResponse("connection reset".into()))
        }
    }

    struct FixedSource(Vec<Quote>);

    #[async_trait]
    impl QuoteSource for FixedSource {
        async fn fetch_all(&self) -> Result<Vec<Quote>, FetchError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, message: &str) -> Result<(), DeliveryError> {
            self.sent.lock().unwrap().push(message.to_string());
            Ok(())
        }
    }

    fn scheduler(source: Arc<dyn QuoteSource>, scope: WatchScope) -> CycleScheduler {
        let counters = CycleCounters::default();
        let comparator = Comparator::new(
            0.01,
            Arc::new(RecordingNotifier::default()),
            counters.clone(),
        );
        CycleScheduler::new(
            source,
            comparator,
            SnapshotStore::new(),
            CycleSettings {
                scope,
                interval: Duration::from_secs(5),
                max_concurrency: 4,
            },
            counters,
        )
    }

    #[tokio::test]
    #[traced_test]
    async fn fetch_failure_is_logged_and_counted() {
        let s = scheduler(Arc::new(FailingSource), WatchScope::all());

        assert!(s.run_cycle().await.is_err());
        assert_eq!(CycleCounters::read(&s.counters.fetch_failures), 1);
        assert_eq!(CycleCounters::read(&s.counters.cycles), 1);
        assert!(s.store().is_empty().await);
        assert!(logs_contain("quote fetch failed"));
    }

    #[tokio::test]
    async fn select_applies_scope_before_empty_check() {
        let s = scheduler(Arc::new(FixedSource(vec![])), WatchScope::new(Some("USDT")));
        let mut report = CycleReport::default();

        let kept = s.select(
            vec![
                Quote::new("BTC-USDT", "1"),
                Quote::new("BTC-KRW", ""),
                Quote::new("ETH-USDT", ""),
                Quote::new("ETH-BTC", "2"),
            ],
            &mut report,
        );

        assert_eq!(kept, vec![Quote::new("BTC-USDT", "1")]);
        assert_eq!(report.filtered_out, 2);
        assert_eq!(report.skipped_empty, 1);
    }

    #[tokio::test]
    async fn zero_concurrency_is_clamped() {
        let source = Arc::new(FixedSource(vec![Quote::new("BTC-USDT", "1")]));
        let counters = CycleCounters::default();
        let comparator = Comparator::new(0.01, Arc::new(RecordingNotifier::default()), counters.clone());
        let s = CycleScheduler::new(
            source,
            comparator,
            SnapshotStore::new(),
            CycleSettings {
                scope: WatchScope::all(),
                interval: Duration::from_secs(1),
                max_concurrency: 0,
            },
            counters,
        );

        let report = s.run_cycle().await.unwrap();
        assert_eq!(report.evaluated, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_on_shutdown_after_finishing_cycle() {
        let source = Arc::new(FixedSource(vec![Quote::new("BTC-USDT", "100")]));
        let s = scheduler(source, WatchScope::all());
        let store = s.store().clone();
        let counters = s.counters.clone();

        let (tx, rx) = watch::channel(false);

        // Let at least two cycles run on the paused clock.
        tokio::join!(s.run(rx), async move {
            tokio::time::sleep(Duration::from_secs(6)).await;
            tx.send(true).unwrap();
        });

        assert!(CycleCounters::read(&counters.cycles) >= 2);
        assert_eq!(store.get("BTC-USDT").await.unwrap().parsed_last, 100.0);
    }
}
