pub mod json;
pub mod terminal;

use crate::request::AnalysisReport;

/// Sink for finished analysis reports.
pub trait Notifier: Send + Sync {
    fn notify(&self, report: &AnalysisReport);
}
