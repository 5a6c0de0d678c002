//! Error-reporting seam.
//!
//! The codec itself only returns `Result`s.  Code around it (the node's
//! connection handlers, a component that wants to publish its own failures)
//! describes a failure as an [`ErrorReport`] and hands it to an [`ErrorSink`].
//!
//! # Testability
//!
//! The [`ErrorSink`] trait lets tests swap the tracing-backed sink for the
//! recording [`mock::MemorySink`].

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::protocol::messages::ErrorLogMessage;

pub mod mock;

/// Structured description of one failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Component the failure happened in.
    pub component: String,
    /// What went wrong.
    pub message: String,
    /// Where / while doing what.
    pub context: String,
}

impl ErrorReport {
    pub fn new(
        component: impl Into<String>,
        message: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            component: component.into(),
            message: message.into(),
            context: context.into(),
        }
    }

    /// Wraps the report into a wire message from reporter `user_uuid`.
    pub fn into_message(self, user_uuid: impl Into<String>) -> ErrorLogMessage {
        ErrorLogMessage {
            user_uuid: user_uuid.into(),
            component: self.component,
            error_msg: self.message,
            context: self.context,
            values: String::new(),
        }
    }
}

impl From<&ErrorLogMessage> for ErrorReport {
    fn from(msg: &ErrorLogMessage) -> Self {
        Self {
            component: msg.component.clone(),
            message: msg.error_msg.clone(),
            context: msg.context.clone(),
        }
    }
}

/// Destination for failure reports.
pub trait ErrorSink: Send + Sync {
    fn report(&self, report: &ErrorReport);
}

/// Sink that emits every report as a `tracing` error event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(&self, report: &ErrorReport) {
        error!(
            component = %report.component,
            context = %report.context,
            "{}",
            report.message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_message_maps_fields() {
        let report = ErrorReport::new("node", "malformed message", "peer 10.0.0.1:4711");

        let msg = report.into_message("a1b2");

        assert_eq!(msg.user_uuid, "a1b2");
        assert_eq!(msg.component, "node");
        assert_eq!(msg.error_msg, "malformed message");
        assert_eq!(msg.context, "peer 10.0.0.1:4711");
        assert!(msg.values.is_empty());
    }

    #[test]
    fn test_report_from_message_drops_identity_and_values() {
        let msg = ErrorLogMessage::new("core", "oops")
            .with_context("{}")
            .with_values("[1]");

        let report = ErrorReport::from(&msg);

        assert_eq!(report, ErrorReport::new("core", "oops", "{}"));
    }

    #[test]
    fn test_tracing_sink_accepts_report_without_subscriber() {
        // No subscriber installed: the event is dropped, the call must not panic.
        TracingErrorSink.report(&ErrorReport::new("core", "oops", ""));
    }
}
