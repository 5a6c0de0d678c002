//! Recording sink for tests.
//!
//! ```ignore
//! let sink = Arc::new(MemorySink::default());
//! handle_connection(stream, peer, Arc::clone(&sink) as Arc<dyn ErrorSink>, 1024).await;
//! assert_eq!(sink.reports()[0].message, "malformed message");
//! ```

use std::sync::Mutex;

use crate::reporting::{ErrorReport, ErrorSink};

/// Stores every report it receives, in order.
#[derive(Debug, Default)]
pub struct MemorySink {
    reports: Mutex<Vec<ErrorReport>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the reports received so far.
    pub fn reports(&self) -> Vec<ErrorReport> {
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl ErrorSink for MemorySink {
    fn report(&self, report: &ErrorReport) {
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(report.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.report(&ErrorReport::new("a", "first", ""));
        sink.report(&ErrorReport::new("b", "second", ""));

        let reports = sink.reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].message, "first");
        assert_eq!(reports[1].component, "b");
    }
}
