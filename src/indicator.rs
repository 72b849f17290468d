pub mod ma;
pub mod macd;
pub mod rsi;

use crate::model::Bar;

/// A technical analysis indicator that operates on a slice of bars.
///
/// Bars must be in ascending chronological order (oldest first).
pub trait Indicator: Send + Sync {
    /// Short label used in diagnostics (e.g., "rsi", "sma").
    fn name(&self) -> &str;

    /// Minimum number of consecutive usable bars before the first value is defined.
    fn required_bars(&self) -> usize;

    /// Calculate one value per input bar.
    ///
    /// A value is `None` while history is insufficient or when any bar it
    /// depends on is unusable. Value `i` only reads bars `0..=i`.
    fn calculate(&self, bars: &[Bar]) -> Vec<Option<f64>>;
}

/// Extract close prices; unusable bars yield `None`.
pub fn close_prices(bars: &[Bar]) -> Vec<Option<f64>> {
    bars.iter().map(Bar::usable_close).collect()
}

#[cfg(test)]
pub(crate) fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    use chrono::{Duration, TimeZone, Utc};

    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar {
            open_time: start + Duration::days(i as i64),
            open: c,
            high: c,
            low: c,
            close: c,
            volume: 1000.0,
        })
        .collect()
}
