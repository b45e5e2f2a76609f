//! Amendment, aggregation, send, submit and status refresh.
//!
//! When several amended reports of a data collection are sent together, an
//! aggregator report of type `COLLECTION_AGGREGATION` is sent in their place.
//! The children then follow the aggregator: they adopt its status and point
//! at it through their aggregator id until it reaches a finalized status,
//! after which the link is cleared and the aggregator deleted.

use rcl_model::RowId;
use tracing::{info, warn};

use crate::error::{ReportError, Result};
use crate::report::Report;
use crate::report_type::ReportType;
use crate::repository::ReportRepository;
use crate::service::{ReportService, SendReceipt};
use crate::status::DatasetStatus;
use crate::version;

/// Suffix of the sender id of an aggregator report.
pub const AGGREGATOR_SUFFIX: &str = "_AGGR";

/// Locally validated amendments of a data collection.
pub fn find_amended_reports(repo: &ReportRepository, dc_code: &str) -> Result<Vec<Report>> {
    Ok(repo
        .all()?
        .into_iter()
        .filter(|r| r.dc_code() == dc_code)
        .filter(|r| r.status() == DatasetStatus::LocallyValidated)
        .filter(Report::is_amendment)
        .collect())
}

/// The amended reports handled together, with their aggregator if they
/// were already sent as one.
#[derive(Debug, Clone, Default)]
pub struct AmendmentBatch {
    pub aggregator: Option<Report>,
    pub reports: Vec<Report>,
}

impl AmendmentBatch {
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn can_all_be_sent(&self) -> bool {
        !self.is_empty() && self.reports.iter().all(|r| r.status().can_be_sent())
    }

    pub fn can_all_be_submitted(&self) -> bool {
        !self.is_empty() && self.reports.iter().all(|r| r.status().can_be_submitted())
    }

    pub fn can_refresh_status(&self) -> bool {
        !self.is_empty() && self.reports.iter().any(|r| r.status().can_be_refreshed())
    }
}

/// Loads the amendments of a data collection still in progress.
///
/// If a live aggregator exists, the batch is its children. Otherwise it is
/// every visible amendment that left draft and is not finalized.
pub fn load_amendment_batch(repo: &ReportRepository, dc_code: &str) -> Result<AmendmentBatch> {
    let all = repo.all()?;
    let in_progress =
        |r: &Report| r.dc_code() == dc_code && r.is_amendment() && !r.status().is_finalized();

    let aggregator = all
        .iter()
        .find(|r| r.is_aggregator() && in_progress(r))
        .cloned();

    let reports = match aggregator.as_ref().and_then(Report::id) {
        Some(aggregator_id) => all
            .into_iter()
            .filter(|r| r.is_visible() && in_progress(r))
            .filter(|r| r.aggregator_row_id() == Some(aggregator_id))
            .collect(),
        None => all
            .into_iter()
            .filter(|r| r.is_visible() && in_progress(r))
            .filter(|r| r.status() != DatasetStatus::Draft)
            .collect(),
    };

    Ok(AmendmentBatch {
        aggregator,
        reports,
    })
}

/// Creates and stores the aggregator report sending `children` together.
pub fn create_aggregated_report(repo: &ReportRepository, children: &[Report]) -> Result<Report> {
    let first = children.first().ok_or(ReportError::EmptyBatch)?;
    let dc_code = first.dc_code();
    if let Some(other) = children.iter().find(|r| r.dc_code() != dc_code) {
        return Err(ReportError::MixedDataCollections {
            expected: dc_code.to_string(),
            found: other.dc_code().to_string(),
        });
    }

    let highest = children
        .iter()
        .filter_map(|r| version::version_number(r.version()))
        .max()
        .unwrap_or(0);

    let mut aggregator = repo.new_report();
    aggregator.set_report_type(ReportType::CollectionAggregation);
    aggregator.set_dc_code(dc_code);
    aggregator.set_year(first.year());
    aggregator.set_sender_id(format!("{dc_code}{AGGREGATOR_SUFFIX}"));
    aggregator.set_version(format!("{highest:02}"));
    aggregator.set_status(DatasetStatus::LocallyValidated);
    let id = repo.insert(&mut aggregator)?;

    info!(
        %id,
        dc_code,
        children = children.len(),
        version = aggregator.version(),
        "aggregator report created"
    );
    Ok(aggregator)
}

/// Row changes derived from an aggregator's status, applied in two phases.
///
/// The plan is computed without touching the store; [`StatusFanOut::commit`]
/// then writes every update before performing any deletion. A failure stops
/// the commit and leaves already written rows in place.
#[derive(Debug, Clone, Default)]
pub struct StatusFanOut {
    updates: Vec<Report>,
    deletions: Vec<RowId>,
}

impl StatusFanOut {
    /// Children adopt the aggregator's status and point at it.
    pub fn adopt(aggregator: &Report, children: &[Report]) -> Result<Self> {
        let aggregator_id = aggregator
            .id()
            .ok_or_else(|| ReportError::Unsaved {
                sender_id: aggregator.sender_id().to_string(),
            })?
            .to_string();
        let updates = children
            .iter()
            .cloned()
            .map(|mut child| {
                child.set_status(aggregator.status());
                child.set_aggregator_id(Some(&aggregator_id));
                child
            })
            .collect();
        Ok(Self {
            updates,
            deletions: Vec::new(),
        })
    }

    /// Children follow a refreshed aggregator. Once the aggregator is
    /// finalized the children are detached and every stored version of the
    /// aggregator is scheduled for deletion.
    pub fn follow(aggregator: &Report, children: Vec<Report>, versions: &[Report]) -> Self {
        let status = aggregator.status();
        let finalized = status.is_finalized();
        let updates = children
            .into_iter()
            .map(|mut child| {
                child.set_status(status);
                if finalized {
                    child.set_aggregator_id(None);
                }
                child
            })
            .collect();
        let deletions = if finalized {
            versions.iter().filter_map(Report::id).collect()
        } else {
            Vec::new()
        };
        Self { updates, deletions }
    }

    /// Every report gets `status`.
    pub fn assign(status: DatasetStatus, reports: &[Report]) -> Self {
        let updates = reports
            .iter()
            .cloned()
            .map(|mut report| {
                report.set_status(status);
                report
            })
            .collect();
        Self {
            updates,
            deletions: Vec::new(),
        }
    }

    /// Additionally delete these rows after the updates.
    #[must_use]
    pub fn with_deletions(mut self, ids: impl IntoIterator<Item = RowId>) -> Self {
        self.deletions.extend(ids);
        self
    }

    pub fn updates(&self) -> &[Report] {
        &self.updates
    }

    pub fn deletions(&self) -> &[RowId] {
        &self.deletions
    }

    /// Writes the updates, then the deletions. Returns the updated reports.
    pub fn commit(self, repo: &ReportRepository) -> Result<Vec<Report>> {
        for report in &self.updates {
            repo.update(report)?;
        }
        for id in &self.deletions {
            repo.delete(*id)?;
        }
        info!(
            updated = self.updates.len(),
            deleted = self.deletions.len(),
            "status fan-out committed"
        );
        Ok(self.updates)
    }
}

/// Result of sending a batch.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    /// The report actually sent: the single report or the aggregator.
    pub target: Report,
    pub receipt: SendReceipt,
    /// Batch reports as stored after the send.
    pub reports: Vec<Report>,
}

fn apply_receipt(report: &mut Report, receipt: &SendReceipt) {
    report.set_message_id(receipt.message_id.clone());
    report.set_last_message_id(receipt.message_id.clone());
    report.set_dataset_id(receipt.dataset_id.clone());
    report.set_status(receipt.status);
}

/// Sends a batch of amended reports. A single report is sent directly;
/// several are sent through a new aggregator, which the reports then follow.
pub fn send_batch(
    repo: &ReportRepository,
    service: &dyn ReportService,
    batch: &AmendmentBatch,
) -> Result<SendOutcome> {
    if let Some(blocked) = batch.reports.iter().find(|r| !r.status().can_be_sent()) {
        return Err(ReportError::InvalidTransition {
            sender_id: blocked.sender_id().to_string(),
            status: blocked.status(),
            action: "send",
        });
    }

    let mut target = match batch.reports.as_slice() {
        [] => return Err(ReportError::EmptyBatch),
        [single] => single.clone(),
        many => create_aggregated_report(repo, many)?,
    };

    let receipt = service.send(&target)?;
    apply_receipt(&mut target, &receipt);
    repo.update(&target)?;
    info!(
        sender_id = target.sender_id(),
        message_id = %receipt.message_id,
        status = %receipt.status,
        "report sent"
    );

    let reports = if target.is_aggregator() {
        let stale_versions = repo
            .versions(target.sender_id())?
            .into_iter()
            .filter_map(|r| r.id())
            .filter(|id| Some(*id) != target.id());
        StatusFanOut::adopt(&target, &batch.reports)?
            .with_deletions(stale_versions)
            .commit(repo)?
    } else {
        vec![target.clone()]
    };

    Ok(SendOutcome {
        target,
        receipt,
        reports,
    })
}

/// Submits a validated batch: the aggregator when the batch was sent as
/// one, otherwise its first report. Every batch report takes the resulting
/// status. An aggregator that is no longer stored fails the submission.
pub fn submit_batch(
    repo: &ReportRepository,
    service: &dyn ReportService,
    batch: &AmendmentBatch,
) -> Result<DatasetStatus> {
    let first = batch.reports.first().ok_or(ReportError::EmptyBatch)?;

    let mut target = match first.aggregator_id() {
        Some(aggregator_id) => first
            .aggregator_row_id()
            .map(|id| repo.get(id))
            .transpose()?
            .flatten()
            .ok_or_else(|| ReportError::MissingAggregator {
                aggregator_id: aggregator_id.to_string(),
            })?,
        None => first.clone(),
    };

    if !target.status().can_be_submitted() {
        return Err(ReportError::InvalidTransition {
            sender_id: target.sender_id().to_string(),
            status: target.status(),
            action: "submit",
        });
    }

    let status = service.submit(&target)?;
    target.set_status(status);
    repo.update(&target)?;
    info!(sender_id = target.sender_id(), %status, "report submitted");

    let others: Vec<Report> = batch
        .reports
        .iter()
        .filter(|r| r.id() != target.id())
        .cloned()
        .collect();
    StatusFanOut::assign(status, &others).commit(repo)?;
    Ok(status)
}

/// Refreshes a report's status from the service.
///
/// An aggregated report is refreshed through its aggregator, whose status is
/// then fanned out to every report it carries. Returns the refreshed report
/// (the aggregator, when one was used).
pub fn refresh_status(
    repo: &ReportRepository,
    service: &dyn ReportService,
    report: &Report,
) -> Result<Report> {
    if let Some(aggregator_id) = report.aggregator_id() {
        let aggregator = match report.aggregator_row_id() {
            Some(id) => repo.get(id)?,
            None => None,
        };
        match aggregator {
            Some(aggregator) => return refresh_aggregator(repo, service, aggregator),
            None => warn!(
                sender_id = report.sender_id(),
                aggregator_id, "aggregator not found, refreshing the report itself"
            ),
        }
    }

    let mut refreshed = report.clone();
    let status = service.fetch_status(&refreshed)?;
    refreshed.set_status(status);
    repo.update(&refreshed)?;
    info!(sender_id = refreshed.sender_id(), %status, "status refreshed");
    Ok(refreshed)
}

fn refresh_aggregator(
    repo: &ReportRepository,
    service: &dyn ReportService,
    mut aggregator: Report,
) -> Result<Report> {
    let aggregator_id = aggregator.id().ok_or_else(|| ReportError::Unsaved {
        sender_id: aggregator.sender_id().to_string(),
    })?;
    let status = service.fetch_status(&aggregator)?;
    aggregator.set_status(status);
    repo.update(&aggregator)?;

    let children = repo.by_aggregator(aggregator_id)?;
    let versions = if status.is_finalized() {
        repo.versions(aggregator.sender_id())?
    } else {
        Vec::new()
    };
    info!(
        sender_id = aggregator.sender_id(),
        %status,
        children = children.len(),
        "aggregator status refreshed"
    );
    StatusFanOut::follow(&aggregator, children, &versions).commit(repo)?;
    Ok(aggregator)
}
