//! Background report tasks.
//!
//! Each task runs on its own thread and reports back through an mpsc
//! channel. A task always sends exactly one update unless the receiver is
//! gone.

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;

use tracing::{debug, warn};

use crate::error::ReportError;
use crate::lifecycle::{self, AmendmentBatch, SendOutcome};
use crate::report::Report;
use crate::repository::ReportRepository;
use crate::service::ReportService;

/// Which background task an update belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    RefreshStatus,
    FindAmended,
    SendBatch,
}

impl TaskKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            TaskKind::RefreshStatus => "refresh status",
            TaskKind::FindAmended => "find amended reports",
            TaskKind::SendBatch => "send batch",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub enum TaskResult {
    Refreshed(Report),
    Amended(AmendmentBatch),
    Sent(SendOutcome),
}

#[derive(Debug)]
pub enum TaskUpdate {
    Finished(TaskResult),
    Terminated { task: TaskKind, error: ReportError },
}

fn finish(
    sender: &Sender<TaskUpdate>,
    task: TaskKind,
    result: Result<TaskResult, ReportError>,
) {
    let update = match result {
        Ok(result) => {
            debug!(%task, "task finished");
            TaskUpdate::Finished(result)
        }
        Err(error) => {
            warn!(%task, %error, "task terminated");
            TaskUpdate::Terminated { task, error }
        }
    };
    let _ = sender.send(update);
}

/// Refreshes one report's status in the background.
pub fn spawn_refresh(
    repo: ReportRepository,
    service: Arc<dyn ReportService>,
    report: Report,
    sender: Sender<TaskUpdate>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let result =
            lifecycle::refresh_status(&repo, service.as_ref(), &report).map(TaskResult::Refreshed);
        finish(&sender, TaskKind::RefreshStatus, result);
    })
}

/// Loads the amendment batch of a data collection in the background.
pub fn spawn_find_amended(
    repo: ReportRepository,
    dc_code: String,
    sender: Sender<TaskUpdate>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let result = lifecycle::load_amendment_batch(&repo, &dc_code).map(TaskResult::Amended);
        finish(&sender, TaskKind::FindAmended, result);
    })
}

pub fn spawn_send(
    repo: ReportRepository,
    service: Arc<dyn ReportService>,
    batch: AmendmentBatch,
    sender: Sender<TaskUpdate>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let result = lifecycle::send_batch(&repo, service.as_ref(), &batch).map(TaskResult::Sent);
        finish(&sender, TaskKind::SendBatch, result);
    })
}
