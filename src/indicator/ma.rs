use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::{Indicator, close_prices};
use crate::model::Bar;

/// Simple Moving Average.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "sma period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Trailing mean per position; `None` until `period` values exist or when
    /// the window holds an undefined value.
    pub fn calculate_prices(&self, prices: &[Option<f64>]) -> Vec<Option<f64>> {
        let warmup = (self.period - 1).min(prices.len());
        let mut results = vec![None; warmup];
        results.extend(prices.windows(self.period).map(|w| {
            w.iter()
                .copied()
                .sum::<Option<f64>>()
                .map(|sum| sum / self.period as f64)
        }));
        results
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        "sma"
    }

    fn required_bars(&self) -> usize {
        self.period
    }

    fn calculate(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        self.calculate_prices(&close_prices(bars))
    }
}

/// Exponential Moving Average with smoothing factor `2 / (period + 1)`.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "ema period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// EMA per position, seeded with the SMA of the first `period` values.
    ///
    /// An undefined input resets the average; seeding starts over with the
    /// next `period` consecutive defined values.
    pub fn calculate_prices(&self, prices: &[Option<f64>]) -> Vec<Option<f64>> {
        let k = 2.0 / (self.period as f64 + 1.0);
        let mut seed: Vec<f64> = Vec::with_capacity(self.period);
        let mut ema: Option<f64> = None;
        let mut results = Vec::with_capacity(prices.len());

        for &price in prices {
            ema = match (price, ema) {
                (None, _) => {
                    seed.clear();
                    None
                }
                (Some(p), Some(prev)) => Some(p * k + prev * (1.0 - k)),
                (Some(p), None) => {
                    seed.push(p);
                    if seed.len() == self.period {
                        let sma = seed.iter().sum::<f64>() / self.period as f64;
                        seed.clear();
                        Some(sma)
                    } else {
                        None
                    }
                }
            };
            results.push(ema);
        }

        results
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        "ema"
    }

    fn required_bars(&self) -> usize {
        self.period
    }

    fn calculate(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        self.calculate_prices(&close_prices(bars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::bars_from_closes;

    #[test]
    fn sma_period_zero_invalid() {
        assert!(Sma::new(0).is_err());
    }

    #[test]
    fn sma_short_input_is_all_undefined() {
        let sma = Sma::new(5).unwrap();
        let values = sma.calculate(&bars_from_closes(&[1.0; 4]));
        assert_eq!(values, vec![None; 4]);
    }

    #[test]
    fn sma_empty_input() {
        let sma = Sma::new(3).unwrap();
        assert!(sma.calculate(&[]).is_empty());
    }

    #[test]
    fn sma_known_value_aligned_to_bars() {
        let sma = Sma::new(3).unwrap();
        let values = sma.calculate(&bars_from_closes(&[1.0, 2.0, 3.0, 4.0]));
        assert_eq!(values.len(), 4);
        assert_eq!(values[0], None);
        assert_eq!(values[1], None);
        // (1+2+3)/3 = 2.0, (2+3+4)/3 = 3.0
        assert!((values[2].unwrap() - 2.0).abs() < 1e-9);
        assert!((values[3].unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn sma_window_with_gap_is_undefined() {
        let sma = Sma::new(2).unwrap();
        let values = sma.calculate_prices(&[Some(1.0), None, Some(3.0), Some(5.0)]);
        assert_eq!(values, vec![None, None, None, Some(4.0)]);
    }

    #[test]
    fn ema_period_zero_invalid() {
        assert!(Ema::new(0).is_err());
    }

    #[test]
    fn ema_flat_prices() {
        let ema = Ema::new(3).unwrap();
        let values = ema.calculate(&bars_from_closes(&[10.0; 6]));
        for v in values.iter().skip(2) {
            assert!((v.unwrap() - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn ema_seed_equals_sma() {
        let ema = Ema::new(3).unwrap();
        let values = ema.calculate(&bars_from_closes(&[1.0, 2.0, 3.0, 4.0]));
        assert_eq!(values[1], None);
        // seed = (1+2+3)/3 = 2.0, then 4*0.5 + 2*0.5 = 3.0
        assert!((values[2].unwrap() - 2.0).abs() < 1e-9);
        assert!((values[3].unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn ema_reseeds_after_gap() {
        let ema = Ema::new(2).unwrap();
        let values = ema.calculate_prices(&[Some(1.0), Some(3.0), None, Some(5.0), Some(7.0)]);
        assert_eq!(values[1], Some(2.0));
        assert_eq!(values[2], None);
        assert_eq!(values[3], None);
        assert_eq!(values[4], Some(6.0));
    }
}
