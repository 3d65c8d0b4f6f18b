/// Raw observation for one instrument, exactly as the provider reported it.
///
/// An empty `raw_last` means the provider had no trade to report this cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub instrument_id: String,
    pub raw_last: String,
}

impl Quote {
    pub fn new(instrument_id: impl Into<String>, raw_last: impl Into<String>) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            raw_last: raw_last.into(),
        }
    }

    pub fn has_observation(&self) -> bool {
        !self.raw_last.is_empty()
    }
}

/// A quote whose `last` value parsed successfully in some cycle.
///
/// This is what the snapshot keeps per instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedQuote {
    pub instrument_id: String,
    pub raw_last: String,
    pub parsed_last: f64,

    /// `|parsed_last / prior - 1|`; `None` when there was no usable prior value.
    pub change_ratio: Option<f64>,
}

/// Optional filter on instrument identifiers, fixed at startup.
///
/// A configured part `USDT` keeps `BTC-USDT` and drops `BTC-ETH`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchScope {
    needle: Option<String>,
}

impl WatchScope {
    pub fn all() -> Self {
        Self::default()
    }

    /// Blank parts are treated as "no scope".
    pub fn new(part: Option<&str>) -> Self {
        let needle = part
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| format!("-{p}"));
        Self { needle }
    }

    pub fn is_configured(&self) -> bool {
        self.needle.is_some()
    }

    pub fn matches(&self, instrument_id: &str) -> bool {
        match &self.needle {
            Some(needle) => instrument_id.contains(needle.as_str()),
            None => true,
        }
    }
}
