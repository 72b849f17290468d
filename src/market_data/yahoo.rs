use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::ProviderConfig;
use crate::error::MarketDataError;
use crate::market_data::MarketData;
use crate::model::{Bar, Interval, LookbackPeriod};

const PROVIDER: &str = "yahoo";
const USER_AGENT: &str = concat!("forex-analyst/", env!("CARGO_PKG_VERSION"));

/// Yahoo Finance chart API client.
pub struct YahooFinance {
    client: reqwest::Client,
    base_url: String,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl YahooFinance {
    pub fn new(config: &ProviderConfig) -> Result<Self, Report<MarketDataError>> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .change_context(MarketDataError::Client {
                provider: PROVIDER.into(),
            })?;
        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(nonzero!(2u32));

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_second(per_second))),
        })
    }
}

impl MarketData for YahooFinance {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn fetch_bars(
        &self,
        symbol: &str,
        interval: Interval,
        period: LookbackPeriod,
    ) -> BoxFuture<'_, Result<Vec<Bar>, Report<MarketDataError>>> {
        let symbol = symbol.to_owned();
        Box::pin(async move {
            self.rate_limiter.until_ready().await;

            let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
            let params = [("interval", interval.as_str()), ("range", period.as_str())];
            debug!(%url, interval = %interval, range = %period, "requesting chart");

            let response = self
                .client
                .get(&url)
                .query(&params)
                .send()
                .await
                .change_context(MarketDataError::Request {
                    provider: PROVIDER.into(),
                })
                .attach_with(|| format!("symbol: {symbol}"))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .change_context(MarketDataError::Request {
                    provider: PROVIDER.into(),
                })?;

            // Unknown symbols come back as 404 with an error envelope.
            if !status.is_success() {
                let report = match parse_chart(&body) {
                    Err(report) => report,
                    Ok(_) => Report::new(MarketDataError::Request {
                        provider: PROVIDER.into(),
                    }),
                };
                return Err(report.attach(format!("HTTP status: {status}")));
            }

            let bars = parse_chart(&body).attach_with(|| format!("symbol: {symbol}"))?;

            info!(
                symbol = %symbol,
                interval = %interval,
                range = %period,
                fetched = bars.len(),
                "yahoo chart fetch complete"
            );

            Ok(bars)
        })
    }
}

// ── Response types ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

/// Column-oriented OHLCV; any cell may be null.
#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

impl Quote {
    fn cell(column: &[Option<f64>], i: usize) -> Option<f64> {
        column.get(i).copied().flatten()
    }

    /// `None` when the row carries no prices at all.
    fn bar_at(&self, i: usize, timestamp: i64) -> Option<Bar> {
        let open_time = DateTime::from_timestamp(timestamp, 0)?;
        let prices = [
            Self::cell(&self.open, i),
            Self::cell(&self.high, i),
            Self::cell(&self.low, i),
            Self::cell(&self.close, i),
        ];
        if prices.iter().all(Option::is_none) {
            return None;
        }
        let [open, high, low, close] = prices.map(|p| p.unwrap_or(f64::NAN));
        Some(Bar {
            open_time,
            open,
            high,
            low,
            close,
            volume: Self::cell(&self.volume, i).unwrap_or(0.0),
        })
    }
}

/// Parse a chart response body into bars sorted by time with duplicates removed.
fn parse_chart(body: &str) -> Result<Vec<Bar>, Report<MarketDataError>> {
    let envelope: ChartEnvelope =
        serde_json::from_str(body).change_context(MarketDataError::ResponseParse {
            provider: PROVIDER.into(),
        })?;

    if let Some(error) = envelope.chart.error {
        return Err(Report::new(MarketDataError::Upstream {
            provider: PROVIDER.into(),
            description: error.description,
        })
        .attach(format!("code: {}", error.code)));
    }

    let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut bars: Vec<Bar> = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| quote.bar_at(i, ts))
        .collect();
    bars.sort_by_key(|b| b.open_time);
    bars.dedup_by_key(|b| b.open_time);

    Ok(bars)
}
