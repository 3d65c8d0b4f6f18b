//! Per-instrument change detection.
//!
//! `compare` is the pure decision: parse the new value, measure it against the
//! remembered one, decide whether the move is large enough to alert on.
//! `Comparator` wraps it with the alert side effect.

use std::sync::Arc;
use std::time::Duration;

use common::logger::warn_if_slow;
use tracing::{info, warn};

use crate::error::ParseError;
use crate::market::types::{ObservedQuote, Quote};
use crate::metrics::CycleCounters;
use crate::notify::Notifier;

/// Result of evaluating one quote. `quote` is always committed to the snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub quote: ObservedQuote,
    pub should_notify: bool,
}

/// Parses a raw `last` value. Only finite numbers are accepted.
pub fn parse_last(quote: &Quote) -> Result<f64, ParseError> {
    quote
        .raw_last
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError {
            instrument_id: quote.instrument_id.clone(),
            raw: quote.raw_last.clone(),
        })
}

/// Relative change `|current / prior - 1|`, or `None` when it is not finite
/// (zero prior, or overflow).
pub fn change_ratio(current: f64, prior: f64) -> Option<f64> {
    let ratio = (current / prior - 1.0).abs();
    ratio.is_finite().then_some(ratio)
}

/// Decides whether `quote` moved more than `threshold` relative to `prior`.
///
/// A first observation (no prior) never notifies. Equality with the
/// threshold does not notify either.
pub fn compare(
    quote: Quote,
    prior: Option<&ObservedQuote>,
    threshold: f64,
) -> Result<Evaluation, ParseError> {
    let parsed_last = parse_last(&quote)?;

    let ratio = prior.and_then(|p| change_ratio(parsed_last, p.parsed_last));
    if ratio.is_none() && prior.is_some() {
        warn!(
            instrument = %quote.instrument_id,
            prior = prior.map(|p| p.parsed_last),
            "change ratio undefined against prior value; resetting baseline"
        );
    }

    let should_notify = ratio.is_some_and(|r| r > threshold);

    Ok(Evaluation {
        quote: ObservedQuote {
            instrument_id: quote.instrument_id,
            raw_last: quote.raw_last,
            parsed_last,
            change_ratio: ratio,
        },
        should_notify,
    })
}

/// Alert text for a quote that crossed the threshold.
pub fn alert_message(quote: &ObservedQuote) -> String {
    format!(
        "[{}] change {:.5}",
        quote.instrument_id,
        quote.change_ratio.unwrap_or_default()
    )
}

/// Runs `compare` and delivers the alert when the threshold is crossed.
#[derive(Clone)]
pub struct Comparator {
    threshold: f64,
    notifier: Arc<dyn Notifier>,
    counters: CycleCounters,
}

impl Comparator {
    pub fn new(threshold: f64, notifier: Arc<dyn Notifier>, counters: CycleCounters) -> Self {
        Self {
            threshold,
            notifier,
            counters,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Evaluates one quote. Delivery happens before this returns; a failed
    /// delivery is logged and does not change the returned evaluation.
    pub async fn evaluate(
        &self,
        quote: Quote,
        prior: Option<&ObservedQuote>,
    ) -> Result<Evaluation, ParseError> {
        let evaluation = compare(quote, prior, self.threshold)?;

        if evaluation.should_notify {
            let message = alert_message(&evaluation.quote);

            info!(
                instrument = %evaluation.quote.instrument_id,
                last = evaluation.quote.parsed_last,
                prior = prior.map(|p| p.parsed_last),
                change = evaluation.quote.change_ratio,
                threshold = self.threshold,
                "change threshold crossed"
            );

            let sent = warn_if_slow(
                "notify",
                Duration::from_secs(2),
                self.notifier.send(&message),
            )
            .await;

            match sent {
                Ok(()) => CycleCounters::incr(&self.counters.notifications_sent),
                Err(e) => {
                    CycleCounters::incr(&self.counters.delivery_failures);
                    warn!(
                        error = %e,
                        instrument = %evaluation.quote.instrument_id,
                        "alert delivery failed"
                    );
                }
            }
        }

        Ok(evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: f64 = 0.01;

    fn prior(id: &str, last: f64) -> ObservedQuote {
        ObservedQuote {
            instrument_id: id.to_string(),
            raw_last: last.to_string(),
            parsed_last: last,
            change_ratio: None,
        }
    }

    #[test]
    fn first_observation_never_notifies() {
        let out = compare(Quote::new("XRP-USDT", "0.5"), None, THRESHOLD).unwrap();

        assert!(!out.should_notify);
        assert_eq!(out.quote.parsed_last, 0.5);
        assert_eq!(out.quote.change_ratio, None);
    }

    #[test]
    fn large_move_notifies_with_formatted_message() {
        let p = prior("BTC-USDT", 100.0);
        let out = compare(Quote::new("BTC-USDT", "101.5"), Some(&p), THRESHOLD).unwrap();

        assert!(out.should_notify);
        let ratio = out.quote.change_ratio.unwrap();
        assert!((ratio - 0.015).abs() < 1e-12);
        assert_eq!(alert_message(&out.quote), "[BTC-USDT] change 0.01500");
    }

    #[test]
    fn small_move_is_committed_without_alert() {
        let p = prior("ETH-USDT", 50.0);
        let out = compare(Quote::new("ETH-USDT", "50.2"), Some(&p), THRESHOLD).unwrap();

        assert!(!out.should_notify);
        assert!((out.quote.change_ratio.unwrap() - 0.004).abs() < 1e-12);
        assert_eq!(out.quote.parsed_last, 50.2);
    }

    #[test]
    fn drops_are_measured_as_absolute_change() {
        let p = prior("SOL-USDT", 100.0);
        let out = compare(Quote::new("SOL-USDT", "97"), Some(&p), THRESHOLD).unwrap();

        assert!(out.should_notify);
        assert!((out.quote.change_ratio.unwrap() - 0.03).abs() < 1e-12);
    }

    #[test]
    fn change_equal_to_threshold_does_not_notify() {
        let p = prior("A-USDT", 1.0);
        let out = compare(Quote::new("A-USDT", "1.5"), Some(&p), 0.5).unwrap();

        assert_eq!(out.quote.change_ratio, Some(0.5));
        assert!(!out.should_notify);
    }

    #[test]
    fn unparseable_last_is_a_parse_error() {
        for raw in ["abc", "1,5", "NaN", "inf", " 1"] {
            let err = compare(Quote::new("BAD-USDT", raw), None, THRESHOLD).unwrap_err();
            assert_eq!(err.instrument_id, "BAD-USDT");
            assert_eq!(err.raw, raw);
        }
    }

    #[test]
    fn zero_prior_resets_baseline_without_alert() {
        let p = prior("ZERO-USDT", 0.0);
        let out = compare(Quote::new("ZERO-USDT", "3"), Some(&p), THRESHOLD).unwrap();

        assert!(!out.should_notify);
        assert_eq!(out.quote.change_ratio, None);
        assert_eq!(out.quote.parsed_last, 3.0);
    }
}
