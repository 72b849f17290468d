use crate::config::PairConfig;
use crate::model::{CurrencyPair, Interval};

/// Built-in symbol list, in menu order.
pub const DEFAULT_PAIRS: &[(&str, &str)] = &[
    ("EURUSD=X", "EUR/USD"),
    ("GBPUSD=X", "GBP/USD"),
    ("USDJPY=X", "USD/JPY"),
    ("AUDUSD=X", "AUD/USD"),
    ("USDCAD=X", "USD/CAD"),
    ("XAUUSD=X", "Gold / US Dollar (XAU/USD)"),
    ("GC=F", "Gold futures (GC=F)"),
    ("SI=F", "Silver futures (SI=F)"),
];

/// Selection tables: symbols, then intervals.
#[derive(Debug, Clone)]
pub struct Catalog {
    pairs: Vec<CurrencyPair>,
}

impl Catalog {
    /// Configured pairs replace the built-in list when any are given.
    pub fn from_config(pairs: &[PairConfig]) -> Self {
        if pairs.is_empty() {
            return Self::default();
        }
        Self {
            pairs: pairs
                .iter()
                .map(|p| CurrencyPair {
                    code: p.code.clone(),
                    name: p.name.clone(),
                })
                .collect(),
        }
    }

    pub fn pairs(&self) -> &[CurrencyPair] {
        &self.pairs
    }

    pub fn intervals(&self) -> &'static [Interval] {
        Interval::ALL
    }

    /// Display name for a symbol code, falling back to the code itself.
    pub fn pair_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.pairs
            .iter()
            .find(|p| p.code == code)
            .map_or(code, |p| p.name.as_str())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            pairs: DEFAULT_PAIRS
                .iter()
                .map(|&(code, name)| CurrencyPair {
                    code: code.into(),
                    name: name.into(),
                })
                .collect(),
        }
    }
}
