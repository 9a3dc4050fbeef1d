//! Operator notice feed

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;

/// Weight of an operator notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Failure,
}

impl Severity {
    /// Lowercase tag for logs
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Failure => "failure",
        }
    }
}

/// Human-readable report for the operator message feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub severity: Severity,
    pub text: String,
}

/// Cloneable producer half of the notice feed
#[derive(Clone)]
pub struct NoticeSender {
    tx: mpsc::UnboundedSender<Notice>,
}

impl NoticeSender {
    /// Create a sender plus the receiving end for the UI/log consumer
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Post one notice
    ///
    /// Fire-and-forget: a closed feed is logged, never fatal.
    pub fn post(&self, severity: Severity, text: impl Into<String>) {
        let notice = Notice {
            severity,
            text: text.into(),
        };
        if let Err(err) = self.tx.send(notice) {
            warn!("notice feed closed, dropping: {}", err.0.text);
        }
    }
}
