use crate::analysis::{AnalysisResult, Finding};

/// Plain-text report: header, then labeled values and statements in stage order.
pub fn render_analysis(pair_name: &str, interval_name: &str, result: &AnalysisResult) -> String {
    let mut out = format!("Analysis of {pair_name} on {interval_name}:\n");
    if let Some(as_of) = result.as_of {
        out.push_str(&format!("As of {}\n", as_of.format("%Y-%m-%d %H:%M UTC")));
    }
    out.push('\n');

    if result.is_empty() {
        out.push_str("Could not produce an analysis from the available data.\n");
        return out;
    }

    for finding in &result.findings {
        for line in finding_lines(finding) {
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

pub fn render_insufficient(pair_name: &str, interval_name: &str) -> String {
    format!(
        "Sorry, no data could be retrieved for {pair_name} on {interval_name}.\n\
         The data may be unavailable or there may be a temporary problem. \
         Please try again later or choose another timeframe.\n"
    )
}

fn finding_lines(finding: &Finding) -> Vec<String> {
    match finding {
        Finding::Price { close } => vec![format!("Current price: {close:.5}")],
        Finding::Trend {
            sma_short,
            sma_long,
            short_window,
            long_window,
            ..
        } => vec![
            format!("SMA ({short_window}): {sma_short:.5}"),
            format!("SMA ({long_window}): {sma_long:.5}"),
            finding.to_string(),
        ],
        Finding::Crossover { .. } => vec![finding.to_string()],
        Finding::Momentum { rsi, window, .. } => {
            vec![format!("RSI ({window}): {rsi:.2}"), finding.to_string()]
        }
        Finding::Macd {
            line,
            signal,
            histogram,
            ..
        } => vec![
            format!("MACD: {line:.4}"),
            format!("MACD Signal: {signal:.4}"),
            format!("MACD Histogram: {histogram:.4}"),
            finding.to_string(),
        ],
    }
}
