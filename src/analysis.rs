pub mod engine;
pub mod render;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;

/// Indicator windows. Cross-field ordering (short < long, fast < slow) is the
/// caller's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub sma_short_window: usize,
    pub sma_long_window: usize,
    pub rsi_window: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sma_short_window: 20,
            sma_long_window: 50,
            rsi_window: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
        }
    }
}

/// Indicator values for one bar. `None` means undefined at that bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    pub rsi: Option<f64>,
    pub macd_line: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Price,
    Trend,
    Crossover,
    Momentum,
    Macd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Sideways,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossDirection {
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdSignal {
    Bullish,
    Bearish,
    Continuing,
}

/// One interpretive statement derived from defined indicator values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    Price {
        close: f64,
    },
    Trend {
        close: f64,
        sma_short: f64,
        sma_long: f64,
        short_window: usize,
        long_window: usize,
        direction: TrendDirection,
    },
    Crossover {
        short_window: usize,
        long_window: usize,
        direction: CrossDirection,
    },
    Momentum {
        rsi: f64,
        window: usize,
        zone: RsiZone,
    },
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
        cross: MacdSignal,
    },
}

impl Finding {
    pub fn category(&self) -> Category {
        match self {
            Self::Price { .. } => Category::Price,
            Self::Trend { .. } => Category::Trend,
            Self::Crossover { .. } => Category::Crossover,
            Self::Momentum { .. } => Category::Momentum,
            Self::Macd { .. } => Category::Macd,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Price { close } => write!(f, "Current price is {close:.5}."),
            Self::Trend {
                short_window,
                long_window,
                direction,
                ..
            } => match direction {
                TrendDirection::Up => write!(
                    f,
                    "Price is above both moving averages ({short_window} and {long_window}), suggesting an uptrend."
                ),
                TrendDirection::Down => write!(
                    f,
                    "Price is below both moving averages ({short_window} and {long_window}), suggesting a downtrend."
                ),
                TrendDirection::Sideways => write!(
                    f,
                    "Price is trading between the moving averages, suggesting a sideways or unclear trend."
                ),
            },
            Self::Crossover {
                short_window,
                long_window,
                direction,
            } => match direction {
                CrossDirection::Bullish => write!(
                    f,
                    "Possible golden cross: SMA {short_window} crossed above SMA {long_window} (bullish)."
                ),
                CrossDirection::Bearish => write!(
                    f,
                    "Possible death cross: SMA {short_window} crossed below SMA {long_window} (bearish)."
                ),
            },
            Self::Momentum { zone, .. } => match zone {
                RsiZone::Overbought => write!(
                    f,
                    "RSI above {RSI_OVERBOUGHT}, a possible overbought zone."
                ),
                RsiZone::Oversold => {
                    write!(f, "RSI below {RSI_OVERSOLD}, a possible oversold zone.")
                }
                RsiZone::Neutral => write!(
                    f,
                    "RSI is trading in the neutral zone ({RSI_OVERSOLD}-{RSI_OVERBOUGHT})."
                ),
            },
            Self::Macd { cross, .. } => match cross {
                MacdSignal::Bullish => write!(
                    f,
                    "MACD line crossed above the signal line, a possible bullish signal."
                ),
                MacdSignal::Bearish => write!(
                    f,
                    "MACD line crossed below the signal line, a possible bearish signal."
                ),
                MacdSignal::Continuing => write!(
                    f,
                    "MACD gives no clear signal or is continuing its current trend."
                ),
            },
        }
    }
}

/// Findings in stage order, plus stage-level notes for stages that were skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub as_of: Option<DateTime<Utc>>,
    pub findings: Vec<Finding>,
    pub notes: Vec<String>,
}

impl AnalysisResult {
    /// `true` when nothing could be computed ("insufficient data").
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

#[cfg(test)]
impl AnalysisResult {
    pub fn find(&self, category: Category) -> Option<&Finding> {
        self.findings.iter().find(|f| f.category() == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_windows() {
        let config = AnalysisConfig::default();
        assert_eq!(config.sma_short_window, 20);
        assert_eq!(config.sma_long_window, 50);
        assert_eq!(config.rsi_window, 14);
        assert_eq!(
            (config.macd_fast, config.macd_slow, config.macd_signal),
            (12, 26, 9)
        );
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: AnalysisConfig = toml::from_str("rsi_window = 7").unwrap();
        assert_eq!(config.rsi_window, 7);
        assert_eq!(config.sma_long_window, 50);
    }

    #[test]
    fn neutral_rsi_statement_names_bounds() {
        let finding = Finding::Momentum {
            rsi: 55.0,
            window: 14,
            zone: RsiZone::Neutral,
        };
        assert_eq!(
            finding.to_string(),
            "RSI is trading in the neutral zone (30-70)."
        );
    }

    #[test]
    fn finding_serializes_with_kind_tag() {
        let finding = Finding::Crossover {
            short_window: 20,
            long_window: 50,
            direction: CrossDirection::Bullish,
        };
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["kind"], "crossover");
        assert_eq!(json["direction"], "bullish");
    }

    #[test]
    fn empty_result_is_insufficient() {
        assert!(AnalysisResult::default().is_empty());
    }
}
