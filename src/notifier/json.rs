use std::io::Write;

use crate::notifier::Notifier;
use crate::request::AnalysisReport;

/// Writes one JSON document per report to stdout.
pub struct JsonNotifier;

impl Notifier for JsonNotifier {
    fn notify(&self, report: &AnalysisReport) {
        match serde_json::to_string(report) {
            Ok(json) => {
                let mut stdout = std::io::stdout().lock();
                if let Err(e) = writeln!(stdout, "{json}") {
                    tracing::warn!(error = %e, "failed to write report to stdout");
                }
            }
            Err(e) => {
                tracing::error!(request_id = %report.request_id, error = %e, "report serialization failed");
            }
        }
    }
}
