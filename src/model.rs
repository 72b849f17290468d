use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bar interval supported by the market data provider.
///
/// String representations match the provider's interval codes (e.g. `"1h"`, `"1wk"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    Min1,
    #[serde(rename = "2m")]
    Min2,
    #[serde(rename = "5m")]
    Min5,
    #[serde(rename = "15m")]
    Min15,
    #[serde(rename = "30m")]
    Min30,
    #[serde(rename = "60m")]
    Min60,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "5d")]
    Day5,
    #[serde(rename = "1wk")]
    Week1,
    #[serde(rename = "1mo")]
    Month1,
}

impl Interval {
    pub const ALL: &[Interval] = &[
        Self::Min1,
        Self::Min2,
        Self::Min5,
        Self::Min15,
        Self::Min30,
        Self::Min60,
        Self::Hour1,
        Self::Day1,
        Self::Day5,
        Self::Week1,
        Self::Month1,
    ];

    /// Parse a provider interval code into an `Interval`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "1m" => Some(Self::Min1),
            "2m" => Some(Self::Min2),
            "5m" => Some(Self::Min5),
            "15m" => Some(Self::Min15),
            "30m" => Some(Self::Min30),
            "60m" => Some(Self::Min60),
            "1h" => Some(Self::Hour1),
            "1d" => Some(Self::Day1),
            "5d" => Some(Self::Day5),
            "1wk" => Some(Self::Week1),
            "1mo" => Some(Self::Month1),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Min1 => "1m",
            Self::Min2 => "2m",
            Self::Min5 => "5m",
            Self::Min15 => "15m",
            Self::Min30 => "30m",
            Self::Min60 => "60m",
            Self::Hour1 => "1h",
            Self::Day1 => "1d",
            Self::Day5 => "5d",
            Self::Week1 => "1wk",
            Self::Month1 => "1mo",
        }
    }

    /// Human-readable name shown when the interval is offered or reported.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Min1 => "1 minute (1m) - limited data",
            Self::Min2 => "2 minutes (2m) - limited data",
            Self::Min5 => "5 minutes (5m)",
            Self::Min15 => "15 minutes (15m)",
            Self::Min30 => "30 minutes (30m)",
            Self::Min60 => "60 minutes (60m)",
            Self::Hour1 => "1 hour (1h)",
            Self::Day1 => "1 day (1d)",
            Self::Day5 => "5 days (5d)",
            Self::Week1 => "1 week (1wk)",
            Self::Month1 => "1 month (1mo)",
        }
    }

    /// Default history to request for this interval.
    ///
    /// Intraday data is only served for a short trailing window, so sub-hour and
    /// hourly intervals stay within 7 days.
    pub fn lookback(self) -> LookbackPeriod {
        match self {
            Self::Min1
            | Self::Min2
            | Self::Min5
            | Self::Min15
            | Self::Min30
            | Self::Min60
            | Self::Hour1 => LookbackPeriod::Days7,
            Self::Day1 => LookbackPeriod::Months6,
            Self::Day5 | Self::Week1 | Self::Month1 => LookbackPeriod::Year1,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How far back to fetch bars, in the provider's `range` format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LookbackPeriod {
    #[serde(rename = "7d")]
    Days7,
    #[serde(rename = "6mo")]
    Months6,
    #[serde(rename = "1y")]
    Year1,
}

impl LookbackPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Days7 => "7d",
            Self::Months6 => "6mo",
            Self::Year1 => "1y",
        }
    }
}

impl fmt::Display for LookbackPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One OHLCV time step. Series are ordered oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// The close, when it is finite and volume is finite and non-negative.
    /// Open, high and low are not read by any indicator and do not count.
    pub fn usable_close(&self) -> Option<f64> {
        let usable = self.close.is_finite() && self.volume.is_finite() && self.volume >= 0.0;
        usable.then_some(self.close)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub code: String,
    pub name: String,
}

/// A symbol + interval selection, passed whole into the fetch/analysis path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub symbol: String,
    pub interval: Interval,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(close: f64, volume: f64) -> Bar {
        Bar {
            open_time: Utc::now(),
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close,
            volume,
        }
    }

    #[test]
    fn interval_codes_parse_back() {
        for &interval in Interval::ALL {
            assert_eq!(Interval::from_str(interval.as_str()), Some(interval));
        }
    }

    #[test]
    fn interval_invalid_string_returns_none() {
        assert_eq!(Interval::from_str("4h"), None);
        assert_eq!(Interval::from_str(""), None);
    }

    #[test]
    fn intraday_intervals_use_short_lookback() {
        for code in ["1m", "2m", "5m", "15m", "30m", "60m", "1h"] {
            let interval = Interval::from_str(code).unwrap();
            assert_eq!(interval.lookback(), LookbackPeriod::Days7, "{code}");
        }
    }

    #[test]
    fn daily_uses_six_months_and_longer_use_a_year() {
        assert_eq!(Interval::Day1.lookback(), LookbackPeriod::Months6);
        assert_eq!(Interval::Day5.lookback(), LookbackPeriod::Year1);
        assert_eq!(Interval::Week1.lookback(), LookbackPeriod::Year1);
        assert_eq!(Interval::Month1.lookback(), LookbackPeriod::Year1);
    }

    #[test]
    fn lookback_display() {
        assert_eq!(LookbackPeriod::Days7.to_string(), "7d");
        assert_eq!(LookbackPeriod::Months6.to_string(), "6mo");
        assert_eq!(LookbackPeriod::Year1.to_string(), "1y");
    }

    #[test]
    fn bar_with_nan_close_is_unusable() {
        assert_eq!(bar(1.0, 0.0).usable_close(), Some(1.0));
        assert_eq!(bar(f64::NAN, 0.0).usable_close(), None);
        assert_eq!(bar(f64::INFINITY, 0.0).usable_close(), None);
    }

    #[test]
    fn bar_with_negative_volume_is_unusable() {
        assert_eq!(bar(1.0, -1.0).usable_close(), None);
        assert_eq!(bar(1.0, f64::NAN).usable_close(), None);
    }

    #[test]
    fn bad_open_high_low_keep_the_close() {
        let gappy = Bar {
            open: f64::NAN,
            high: f64::INFINITY,
            low: f64::NAN,
            ..bar(1.25, 10.0)
        };
        assert_eq!(gappy.usable_close(), Some(1.25));
    }

    #[test]
    fn interval_serializes_as_code() {
        let json = serde_json::to_string(&Interval::Week1).unwrap();
        assert_eq!(json, "\"1wk\"");
        let parsed: Interval = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Interval::Week1);
    }
}
