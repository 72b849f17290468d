use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::AnalysisResult;
use crate::analysis::engine::Analyzer;
use crate::analysis::render::{render_analysis, render_insufficient};
use crate::catalog::Catalog;
use crate::market_data::MarketData;
use crate::model::{AnalysisRequest, LookbackPeriod};

/// Terminal state of one request. Fetch failures, empty series and series too
/// short for any indicator all end as `InsufficientData`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    InsufficientData { reason: String },
    Analysis { result: AnalysisResult },
}

/// Everything the presentation layer needs for one request.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub request_id: Uuid,
    pub request: AnalysisRequest,
    pub pair_name: String,
    pub interval_name: String,
    pub period: LookbackPeriod,
    pub outcome: Outcome,
}

impl AnalysisReport {
    pub fn render(&self) -> String {
        match &self.outcome {
            Outcome::InsufficientData { .. } => {
                render_insufficient(&self.pair_name, &self.interval_name)
            }
            Outcome::Analysis { result } => {
                render_analysis(&self.pair_name, &self.interval_name, result)
            }
        }
    }
}

/// Fetch bars for `request` and analyze them.
pub async fn process_request(
    market: &dyn MarketData,
    analyzer: &Analyzer,
    catalog: &Catalog,
    request: &AnalysisRequest,
) -> AnalysisReport {
    let request_id = Uuid::new_v4();
    let period = request.interval.lookback();

    info!(
        %request_id,
        provider = market.name(),
        symbol = %request.symbol,
        interval = %request.interval,
        range = %period,
        "analysis requested"
    );

    let outcome = match market
        .fetch_bars(&request.symbol, request.interval, period)
        .await
    {
        Err(e) => {
            warn!(%request_id, error = ?e, "bar fetch failed");
            Outcome::InsufficientData {
                reason: format!("fetch failed: {}", e.current_context()),
            }
        }
        Ok(bars) if bars.is_empty() => {
            warn!(%request_id, symbol = %request.symbol, "provider returned no bars");
            Outcome::InsufficientData {
                reason: "no data".into(),
            }
        }
        Ok(bars) => {
            let result = analyzer.analyze(&bars);
            for note in &result.notes {
                debug!(%request_id, note = %note, "analysis stage skipped");
            }
            if result.is_empty() {
                Outcome::InsufficientData {
                    reason: format!("no indicator computable from {} bars", bars.len()),
                }
            } else {
                info!(
                    %request_id,
                    bars = bars.len(),
                    findings = result.findings.len(),
                    "analysis complete"
                );
                Outcome::Analysis { result }
            }
        }
    };

    AnalysisReport {
        request_id,
        request: request.clone(),
        pair_name: catalog.pair_name(&request.symbol).to_owned(),
        interval_name: request.interval.display_name().to_owned(),
        period,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use error_stack::Report;
    use futures::future::BoxFuture;

    use crate::analysis::{AnalysisConfig, Category};
    use crate::error::MarketDataError;
    use crate::indicator::bars_from_closes;
    use crate::model::{Bar, Interval};

    struct StubMarket {
        bars: Option<Vec<Bar>>,
        calls: Mutex<Vec<(String, Interval, LookbackPeriod)>>,
    }

    impl StubMarket {
        fn new(bars: Option<Vec<Bar>>) -> Self {
            Self {
                bars,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl MarketData for StubMarket {
        fn name(&self) -> &str {
            "stub"
        }

        fn fetch_bars(
            &self,
            symbol: &str,
            interval: Interval,
            period: LookbackPeriod,
        ) -> BoxFuture<'_, Result<Vec<Bar>, Report<MarketDataError>>> {
            self.calls
                .lock()
                .unwrap()
                .push((symbol.to_owned(), interval, period));
            let result = self.bars.clone().ok_or_else(|| {
                Report::new(MarketDataError::Request {
                    provider: "stub".into(),
                })
            });
            Box::pin(async move { result })
        }
    }

    fn request(symbol: &str, interval: Interval) -> AnalysisRequest {
        AnalysisRequest {
            symbol: symbol.into(),
            interval,
        }
    }

    fn analyzer() -> Analyzer {
        Analyzer::new(AnalysisConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn fetch_error_becomes_insufficient_data() {
        let market = StubMarket::new(None);
        let report = process_request(
            &market,
            &analyzer(),
            &Catalog::default(),
            &request("EURUSD=X", Interval::Day1),
        )
        .await;
        assert!(matches!(report.outcome, Outcome::InsufficientData { .. }));
        assert!(report.render().contains("no data could be retrieved for EUR/USD"));
    }

    #[tokio::test]
    async fn empty_series_becomes_insufficient_data() {
        let market = StubMarket::new(Some(Vec::new()));
        let report = process_request(
            &market,
            &analyzer(),
            &Catalog::default(),
            &request("GBPUSD=X", Interval::Hour1),
        )
        .await;
        assert_eq!(
            report.outcome,
            Outcome::InsufficientData {
                reason: "no data".into()
            }
        );
    }

    #[tokio::test]
    async fn nan_only_series_becomes_insufficient_data() {
        let market = StubMarket::new(Some(bars_from_closes(&[f64::NAN])));
        let report = process_request(
            &market,
            &analyzer(),
            &Catalog::default(),
            &request("GBPUSD=X", Interval::Hour1),
        )
        .await;
        assert!(matches!(report.outcome, Outcome::InsufficientData { .. }));
    }

    #[tokio::test]
    async fn interval_selects_lookback_period() {
        let market = StubMarket::new(Some(Vec::new()));
        for (interval, period) in [
            (Interval::Min15, LookbackPeriod::Days7),
            (Interval::Day1, LookbackPeriod::Months6),
            (Interval::Week1, LookbackPeriod::Year1),
        ] {
            process_request(
                &market,
                &analyzer(),
                &Catalog::default(),
                &request("USDJPY=X", interval),
            )
            .await;
            let calls = market.calls.lock().unwrap();
            assert_eq!(calls.last().unwrap().2, period);
        }
    }

    #[tokio::test]
    async fn short_series_is_partial_analysis() {
        let market = StubMarket::new(Some(bars_from_closes(&[1.0, 1.01, 1.02, 1.0, 1.03])));
        let report = process_request(
            &market,
            &analyzer(),
            &Catalog::default(),
            &request("AUDUSD=X", Interval::Day1),
        )
        .await;
        let Outcome::Analysis { result } = &report.outcome else {
            panic!("expected analysis, got {:?}", report.outcome);
        };
        assert_eq!(result.findings.len(), 1);
        assert!(result.find(Category::Price).is_some());
        let text = report.render();
        assert!(text.starts_with("Analysis of AUD/USD on 1 day (1d):"));
        assert!(text.contains("Current price: 1.03000"));
    }

    #[tokio::test]
    async fn report_serializes_outcome_status() {
        let market = StubMarket::new(Some(Vec::new()));
        let report = process_request(
            &market,
            &analyzer(),
            &Catalog::default(),
            &request("SI=F", Interval::Month1),
        )
        .await;
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"]["status"], "insufficient_data");
        assert_eq!(json["request"]["interval"], "1mo");
        assert_eq!(json["period"], "1y");
        assert_eq!(json["pair_name"], "Silver futures (SI=F)");
    }
}
