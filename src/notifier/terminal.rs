use std::io::Write;

use crate::notifier::Notifier;
use crate::request::{AnalysisReport, Outcome};

/// Writes the plain-text rendering to stdout.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, report: &AnalysisReport) {
        let text = report.render();
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{text}") {
            tracing::warn!(error = %e, "failed to write report to stdout");
        }

        if let Outcome::InsufficientData { reason } = &report.outcome {
            tracing::info!(
                request_id = %report.request_id,
                symbol = %report.request.symbol,
                interval = %report.request.interval,
                reason = %reason,
                "insufficient data"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisResult;
    use crate::model::{AnalysisRequest, Interval, LookbackPeriod};
    use uuid::Uuid;

    #[test]
    fn terminal_notifier_does_not_panic() {
        let notifier = TerminalNotifier;
        let report = AnalysisReport {
            request_id: Uuid::new_v4(),
            request: AnalysisRequest {
                symbol: "EURUSD=X".into(),
                interval: Interval::Day1,
            },
            pair_name: "EUR/USD".into(),
            interval_name: Interval::Day1.display_name().into(),
            period: LookbackPeriod::Months6,
            outcome: Outcome::Analysis {
                result: AnalysisResult::default(),
            },
        };
        // Should not panic
        notifier.notify(&report);
    }
}
