//! The remote data collection service, as seen by the lifecycle.
//!
//! Only coarse results cross this boundary: a status, or the ids assigned to
//! a sent dataset. Message building and transport live behind the trait.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ServiceError;
use crate::report::Report;
use crate::status::DatasetStatus;

/// Ids and status the service returns for a sent dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReceipt {
    pub message_id: String,
    pub dataset_id: String,
    pub status: DatasetStatus,
}

pub trait ReportService: Send + Sync {
    /// Current status of the report's dataset.
    fn fetch_status(&self, report: &Report) -> Result<DatasetStatus, ServiceError>;

    fn send(&self, report: &Report) -> Result<SendReceipt, ServiceError>;

    /// Submits a validated dataset; returns the resulting status.
    fn submit(&self, report: &Report) -> Result<DatasetStatus, ServiceError>;
}

/// A call recorded by [`MockReportService`], keyed by sender id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    FetchStatus(String),
    Send(String),
    Submit(String),
}

#[derive(Debug, Default)]
struct MockState {
    statuses: HashMap<String, DatasetStatus>,
    failure: Option<ServiceError>,
    calls: Vec<ServiceCall>,
    sent: u32,
}

/// Scripted [`ReportService`] that records every call.
#[derive(Debug)]
pub struct MockReportService {
    state: Mutex<MockState>,
    send_status: DatasetStatus,
    submit_status: DatasetStatus,
}

impl Default for MockReportService {
    fn default() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            send_status: DatasetStatus::Uploaded,
            submit_status: DatasetStatus::Submitted,
        }
    }
}

impl MockReportService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status returned by `fetch_status` for a sender id.
    #[must_use]
    pub fn with_status(self, sender_id: impl Into<String>, status: DatasetStatus) -> Self {
        self.set_status(sender_id, status);
        self
    }

    #[must_use]
    pub fn with_send_status(mut self, status: DatasetStatus) -> Self {
        self.send_status = status;
        self
    }

    #[must_use]
    pub fn with_submit_status(mut self, status: DatasetStatus) -> Self {
        self.submit_status = status;
        self
    }

    /// Every following call fails with `error`.
    #[must_use]
    pub fn failing(self, error: ServiceError) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.failure = Some(error);
        }
        self
    }

    pub fn set_status(&self, sender_id: impl Into<String>, status: DatasetStatus) {
        if let Ok(mut state) = self.state.lock() {
            state.statuses.insert(sender_id.into(), status);
        }
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        self.state
            .lock()
            .map(|state| state.calls.clone())
            .unwrap_or_default()
    }

    fn record<T>(
        &self,
        call: ServiceCall,
        respond: impl FnOnce(&mut MockState) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| ServiceError::Unavailable("mock state poisoned".to_string()))?;
        debug!(?call, "mock service call");
        state.calls.push(call);
        if let Some(error) = &state.failure {
            return Err(error.clone());
        }
        respond(&mut state)
    }
}

impl ReportService for MockReportService {
    fn fetch_status(&self, report: &Report) -> Result<DatasetStatus, ServiceError> {
        let sender_id = report.sender_id().to_string();
        self.record(ServiceCall::FetchStatus(sender_id.clone()), |state| {
            state
                .statuses
                .get(&sender_id)
                .copied()
                .ok_or(ServiceError::NotFound { sender_id })
        })
    }

    fn send(&self, report: &Report) -> Result<SendReceipt, ServiceError> {
        let sender_id = report.sender_id().to_string();
        let status = self.send_status;
        self.record(ServiceCall::Send(sender_id.clone()), |state| {
            state.sent += 1;
            state.statuses.insert(sender_id, status);
            Ok(SendReceipt {
                message_id: format!("MSG-{}", state.sent),
                dataset_id: format!("DS-{}", state.sent),
                status,
            })
        })
    }

    fn submit(&self, report: &Report) -> Result<DatasetStatus, ServiceError> {
        let sender_id = report.sender_id().to_string();
        let status = self.submit_status;
        self.record(ServiceCall::Submit(sender_id.clone()), |state| {
            state.statuses.insert(sender_id, status);
            Ok(status)
        })
    }
}
