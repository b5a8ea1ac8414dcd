use std::error::Error as _;

use tracing::{error, warn};

use super::errors::StudentError;

/// Write-only sink for classified failures and warnings.
#[cfg_attr(test, mockall::automock)]
pub trait LoggingBroker: Send + Sync {
    fn log_error(&self, error: &StudentError);
    fn log_critical(&self, error: &StudentError);
    fn log_warning(&self, message: &str);
}

/// Forwards to the process-wide `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLoggingBroker;

impl LoggingBroker for TracingLoggingBroker {
    fn log_error(&self, err: &StudentError) {
        error!(code = err.code(), error = %err, cause = ?err.source().map(|c| c.to_string()), "student operation failed");
    }

    fn log_critical(&self, err: &StudentError) {
        // tracing has no level above ERROR
        error!(severity = "critical", code = err.code(), error = %err, cause = ?err.source().map(|c| c.to_string()), "student operation failed");
    }

    fn log_warning(&self, message: &str) {
        warn!("{message}");
    }
}
