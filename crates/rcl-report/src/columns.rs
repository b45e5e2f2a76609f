//! Columns of the `Report` table.

use rcl_model::{Column, Schema};

pub const REPORT_SHEET: &str = "Report";

pub const YEAR: &str = "reportYear";
pub const MONTH: &str = "reportMonth";
pub const DC_CODE: &str = "dcCode";
pub const COUNTRY: &str = "country";
pub const AGGREGATOR_ID: &str = "aggregatorId";
pub const REPORT_TYPE: &str = "reportType";
pub const SENDER_ID: &str = "reportSenderId";
pub const MESSAGE_ID: &str = "reportMessageId";
pub const LAST_MESSAGE_ID: &str = "reportLastMessageId";
pub const LAST_MODIFYING_MESSAGE_ID: &str = "reportLastModifyingMessageId";
pub const LAST_VALIDATION_MESSAGE_ID: &str = "reportLastValidationMessageId";
pub const DATASET_ID: &str = "reportDatasetId";
pub const STATUS: &str = "reportStatus";
pub const PREVIOUS_STATUS: &str = "reportPreviousStatus";
pub const VERSION: &str = "reportVersion";

pub const ALL: [&str; 15] = [
    YEAR,
    MONTH,
    DC_CODE,
    COUNTRY,
    AGGREGATOR_ID,
    REPORT_TYPE,
    SENDER_ID,
    MESSAGE_ID,
    LAST_MESSAGE_ID,
    LAST_MODIFYING_MESSAGE_ID,
    LAST_VALIDATION_MESSAGE_ID,
    DATASET_ID,
    STATUS,
    PREVIOUS_STATUS,
    VERSION,
];

/// Bare `Report` schema with every lifecycle column and no formulas.
pub fn report_schema() -> rcl_model::Result<Schema> {
    Schema::new(REPORT_SHEET, ALL.iter().map(|id| Column::new(*id)).collect())
}
