use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::ma::Ema;
use crate::indicator::{Indicator, close_prices};
use crate::model::Bar;

/// MACD line, signal line and histogram for one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MacdPoint {
    pub line: Option<f64>,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
}

/// Moving Average Convergence Divergence.
///
/// Fast/slow ordering is not checked; `fast >= slow` yields a meaningless but
/// well-defined series.
#[derive(Debug, Clone)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
}

impl Macd {
    pub fn new(
        fast_period: usize,
        slow_period: usize,
        signal_period: usize,
    ) -> Result<Self, Report<IndicatorError>> {
        if fast_period == 0 || slow_period == 0 || signal_period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "all macd periods must be > 0".into(),
            });
        }
        Ok(Self {
            fast: Ema::new(fast_period)?,
            slow: Ema::new(slow_period)?,
            signal: Ema::new(signal_period)?,
        })
    }

    /// One point per input bar.
    pub fn calculate_full(&self, bars: &[Bar]) -> Vec<MacdPoint> {
        let prices = close_prices(bars);
        let fast_ema = self.fast.calculate_prices(&prices);
        let slow_ema = self.slow.calculate_prices(&prices);

        let macd_line: Vec<Option<f64>> = fast_ema
            .iter()
            .zip(&slow_ema)
            .map(|(f, s)| Some((*f)? - (*s)?))
            .collect();
        let signal_line = self.signal.calculate_prices(&macd_line);

        macd_line
            .into_iter()
            .zip(signal_line)
            .map(|(line, signal)| MacdPoint {
                line,
                signal,
                histogram: line.zip(signal).map(|(m, s)| m - s),
            })
            .collect()
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        "macd"
    }

    fn required_bars(&self) -> usize {
        self.fast.period().max(self.slow.period()) + self.signal.period() - 1
    }

    /// Returns MACD line values only.
    fn calculate(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        self.calculate_full(bars).into_iter().map(|p| p.line).collect()
    }
}
