//! Report lifecycle for the reporting client.
//!
//! A report is a row of the `Report` table. Its dataset moves through the
//! statuses of [`DatasetStatus`] as it is validated locally, sent to the
//! remote service and submitted. Amended reports of one data collection can
//! be sent together through an aggregator report; see [`lifecycle`].

pub mod columns;
pub mod error;
pub mod lifecycle;
pub mod report;
pub mod report_type;
pub mod repository;
pub mod service;
pub mod status;
pub mod version;
pub mod worker;

pub use error::{ReportError, Result, ServiceError};
pub use lifecycle::{
    AmendmentBatch, SendOutcome, StatusFanOut, create_aggregated_report, find_amended_reports,
    load_amendment_batch, refresh_status, send_batch, submit_batch,
};
pub use report::Report;
pub use report_type::ReportType;
pub use repository::ReportRepository;
pub use service::{MockReportService, ReportService, SendReceipt, ServiceCall};
pub use status::DatasetStatus;
pub use worker::{TaskKind, TaskResult, TaskUpdate, spawn_find_amended, spawn_refresh, spawn_send};
