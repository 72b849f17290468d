use error_stack::Report;

use crate::analysis::{
    AnalysisConfig, AnalysisResult, CrossDirection, Finding, IndicatorRow, MacdSignal,
    RSI_OVERBOUGHT, RSI_OVERSOLD, RsiZone, TrendDirection,
};
use crate::error::IndicatorError;
use crate::indicator::Indicator;
use crate::indicator::ma::Sma;
use crate::indicator::macd::Macd;
use crate::indicator::rsi::Rsi;
use crate::model::Bar;

/// Computes the indicator set over a bar series and derives findings from the
/// last two bars. Holds no state between calls.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalysisConfig,
    sma_short: Sma,
    sma_long: Sma,
    rsi: Rsi,
    macd: Macd,
}

impl Analyzer {
    /// Fails only when a window is zero.
    pub fn new(config: AnalysisConfig) -> Result<Self, Report<IndicatorError>> {
        Ok(Self {
            config,
            sma_short: Sma::new(config.sma_short_window)?,
            sma_long: Sma::new(config.sma_long_window)?,
            rsi: Rsi::new(config.rsi_window)?,
            macd: Macd::new(config.macd_fast, config.macd_slow, config.macd_signal)?,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Per-bar indicator values, one row per input bar.
    pub fn indicators(&self, bars: &[Bar]) -> Vec<IndicatorRow> {
        let sma_short = self.sma_short.calculate(bars);
        let sma_long = self.sma_long.calculate(bars);
        let rsi = self.rsi.calculate(bars);
        let macd = self.macd.calculate_full(bars);

        (0..bars.len())
            .map(|i| IndicatorRow {
                sma_short: sma_short[i],
                sma_long: sma_long[i],
                rsi: rsi[i],
                macd_line: macd[i].line,
                macd_signal: macd[i].signal,
                macd_histogram: macd[i].histogram,
            })
            .collect()
    }

    pub fn analyze(&self, bars: &[Bar]) -> AnalysisResult {
        let Some(last) = bars.last() else {
            return AnalysisResult {
                notes: vec!["no bars to analyze".into()],
                ..AnalysisResult::default()
            };
        };

        let rows = self.indicators(bars);
        let n = rows.len();
        let current = &rows[n - 1];
        let previous = n.checked_sub(2).map(|i| &rows[i]);
        let close = last.usable_close();

        let mut result = AnalysisResult {
            as_of: Some(last.open_time),
            ..AnalysisResult::default()
        };

        match close {
            Some(close) => result.findings.push(Finding::Price { close }),
            None => result
                .notes
                .push("price: last bar has a non-finite close or an invalid volume".into()),
        }

        match close {
            None => result
                .notes
                .push("trend: no usable close at the last bar".into()),
            Some(close) => match self.trend_finding(close, current) {
                Some(finding) => result.findings.push(finding),
                None => result.notes.push(self.missing_note("trend", &self.sma_long, n)),
            },
        }

        if let Some(finding) = self.crossover_finding(current, previous) {
            result.findings.push(finding);
        }

        match self.momentum_finding(current) {
            Some(finding) => result.findings.push(finding),
            None => result.notes.push(self.missing_note("momentum", &self.rsi, n)),
        }

        match macd_finding(current, previous) {
            Some(finding) => result.findings.push(finding),
            None => result.notes.push(self.missing_note("macd", &self.macd, n)),
        }

        result
    }

    fn trend_finding(&self, close: f64, current: &IndicatorRow) -> Option<Finding> {
        let sma_short = current.sma_short?;
        let sma_long = current.sma_long?;
        Some(Finding::Trend {
            close,
            sma_short,
            sma_long,
            short_window: self.sma_short.period(),
            long_window: self.sma_long.period(),
            direction: classify_trend(close, sma_short, sma_long),
        })
    }

    fn crossover_finding(
        &self,
        current: &IndicatorRow,
        previous: Option<&IndicatorRow>,
    ) -> Option<Finding> {
        let previous = previous?;
        let direction = detect_cross(
            (previous.sma_short?, previous.sma_long?),
            (current.sma_short?, current.sma_long?),
        )?;
        Some(Finding::Crossover {
            short_window: self.sma_short.period(),
            long_window: self.sma_long.period(),
            direction,
        })
    }

    fn momentum_finding(&self, current: &IndicatorRow) -> Option<Finding> {
        let rsi = current.rsi?;
        Some(Finding::Momentum {
            rsi,
            window: self.rsi.period(),
            zone: classify_rsi(rsi),
        })
    }

    fn missing_note(&self, stage: &str, indicator: &dyn Indicator, available: usize) -> String {
        format!(
            "{stage}: {} undefined at the last bar (needs {} consecutive usable bars, series has {available})",
            indicator.name(),
            indicator.required_bars(),
        )
    }
}

/// Strict comparison on both sides; anything else is sideways.
pub fn classify_trend(close: f64, sma_short: f64, sma_long: f64) -> TrendDirection {
    if close > sma_short && close > sma_long {
        TrendDirection::Up
    } else if close < sma_short && close < sma_long {
        TrendDirection::Down
    } else {
        TrendDirection::Sideways
    }
}

pub fn classify_rsi(rsi: f64) -> RsiZone {
    if rsi > RSI_OVERBOUGHT {
        RsiZone::Overbought
    } else if rsi < RSI_OVERSOLD {
        RsiZone::Oversold
    } else {
        RsiZone::Neutral
    }
}

/// `(fast, slow)` pairs for the previous and current bar. Non-strict on the
/// previous side, strict on the current side.
fn detect_cross(previous: (f64, f64), current: (f64, f64)) -> Option<CrossDirection> {
    let (prev_fast, prev_slow) = previous;
    let (fast, slow) = current;
    if prev_fast <= prev_slow && fast > slow {
        Some(CrossDirection::Bullish)
    } else if prev_fast >= prev_slow && fast < slow {
        Some(CrossDirection::Bearish)
    } else {
        None
    }
}

fn macd_finding(current: &IndicatorRow, previous: Option<&IndicatorRow>) -> Option<Finding> {
    let line = current.macd_line?;
    let signal = current.macd_signal?;
    let histogram = current.macd_histogram?;

    // A previous bar without both MACD values counts as no previous bar.
    let previous = previous.and_then(|p| p.macd_line.zip(p.macd_signal));
    let cross = match previous {
        None if line > signal => MacdSignal::Bullish,
        None if line < signal => MacdSignal::Bearish,
        None => MacdSignal::Continuing,
        Some(prev) => match detect_cross(prev, (line, signal)) {
            Some(CrossDirection::Bullish) => MacdSignal::Bullish,
            Some(CrossDirection::Bearish) => MacdSignal::Bearish,
            None => MacdSignal::Continuing,
        },
    };

    Some(Finding::Macd {
        line,
        signal,
        histogram,
        cross,
    })
}
