pub mod yahoo;

use error_stack::Report;
use futures::future::BoxFuture;

use crate::error::MarketDataError;
use crate::model::{Bar, Interval, LookbackPeriod};

/// Source of historical bars for a symbol.
///
/// Uses `BoxFuture` (from `futures` crate) instead of `async fn` in trait
/// to keep the trait object-safe (`dyn MarketData`).
pub trait MarketData: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch bars oldest first. An empty vector means the provider has no data
    /// for this selection.
    fn fetch_bars(
        &self,
        symbol: &str,
        interval: Interval,
        period: LookbackPeriod,
    ) -> BoxFuture<'_, Result<Vec<Bar>, Report<MarketDataError>>>;
}
