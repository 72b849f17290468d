use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::{Indicator, close_prices};
use crate::model::Bar;

/// RSI (Relative Strength Index) over simple trailing averages of gains and losses.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "rsi period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn calculate_prices(&self, prices: &[Option<f64>]) -> Vec<Option<f64>> {
        let deltas: Vec<Option<f64>> = prices.windows(2).map(|w| Some(w[1]? - w[0]?)).collect();

        let mut results = vec![None; self.period.min(prices.len())];
        results.extend(deltas.windows(self.period).map(|w| {
            let mut gains = 0.0;
            let mut losses = 0.0;
            for delta in w {
                let delta = (*delta)?;
                gains += delta.max(0.0);
                losses += (-delta).max(0.0);
            }
            Some(rsi_value(
                gains / self.period as f64,
                losses / self.period as f64,
            ))
        }));
        results
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        "rsi"
    }

    fn required_bars(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        self.calculate_prices(&close_prices(bars))
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        // flat window: no gains and no losses
        if avg_gain == 0.0 {
            return 50.0;
        }
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}
