//! Error types for the report lifecycle.

use rcl_model::StoreError;
use thiserror::Error;

use crate::status::DatasetStatus;

/// Failure reported by the remote dataset service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("remote service unavailable: {0}")]
    Unavailable(String),

    #[error("remote service rejected {sender_id}: {message}")]
    Rejected { sender_id: String, message: String },

    #[error("no remote dataset for {sender_id}")]
    NotFound { sender_id: String },
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no reports to process")]
    EmptyBatch,

    #[error("cannot aggregate reports of different data collections ({expected} and {found})")]
    MixedDataCollections { expected: String, found: String },

    #[error("cannot {action} report {sender_id} in status {status}")]
    InvalidTransition {
        sender_id: String,
        status: DatasetStatus,
        action: &'static str,
    },

    #[error("aggregator report {aggregator_id} not found")]
    MissingAggregator { aggregator_id: String },

    #[error("report {sender_id} is not stored")]
    Unsaved { sender_id: String },
}

impl ReportError {
    /// Short message suitable for display to an operator.
    pub fn user_message(&self) -> String {
        match self {
            ReportError::Service(ServiceError::Unavailable(_)) => {
                "The data collection service could not be reached. Try again later.".to_string()
            }
            ReportError::Service(err) => format!("The data collection service refused: {err}"),
            ReportError::Store(err) => format!("Local storage error: {err}"),
            ReportError::EmptyBatch => "There are no reports to process.".to_string(),
            ReportError::InvalidTransition { status, action, .. } => {
                format!("Cannot {action} a report in status {status}.")
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
