use std::sync::Arc;

use rcl_model::{Row, RowId, Schema};

use crate::columns;
use crate::report_type::ReportType;
use crate::status::DatasetStatus;
use crate::version;

/// A row of the `Report` table, seen as a submittable dataset.
#[derive(Debug, Clone)]
pub struct Report {
    row: Row,
}

impl From<Row> for Report {
    fn from(row: Row) -> Self {
        Self { row }
    }
}

impl Report {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            row: Row::new(schema),
        }
    }

    pub fn row(&self) -> &Row {
        &self.row
    }

    pub fn row_mut(&mut self) -> &mut Row {
        &mut self.row
    }

    pub fn into_row(self) -> Row {
        self.row
    }

    /// Database id of the report row.
    pub fn id(&self) -> Option<RowId> {
        self.row.id()
    }

    fn text(&self, column: &str) -> &str {
        self.row.code(column)
    }

    fn set_text(&mut self, column: &str, value: impl Into<String>) {
        self.row.put_code(column, value);
    }

    pub fn version(&self) -> &str {
        self.text(columns::VERSION)
    }

    pub fn set_version(&mut self, value: impl Into<String>) {
        self.set_text(columns::VERSION, value);
    }

    pub fn is_baseline_version(&self) -> bool {
        version::is_baseline(self.version())
    }

    pub fn is_amendment(&self) -> bool {
        version::is_amendment(self.version())
    }

    pub fn sender_id(&self) -> &str {
        self.text(columns::SENDER_ID)
    }

    pub fn set_sender_id(&mut self, value: impl Into<String>) {
        self.set_text(columns::SENDER_ID, value);
    }

    /// Dataset id assigned by the remote service.
    pub fn dataset_id(&self) -> &str {
        self.text(columns::DATASET_ID)
    }

    pub fn set_dataset_id(&mut self, value: impl Into<String>) {
        self.set_text(columns::DATASET_ID, value);
    }

    pub fn message_id(&self) -> &str {
        self.text(columns::MESSAGE_ID)
    }

    pub fn set_message_id(&mut self, value: impl Into<String>) {
        self.set_text(columns::MESSAGE_ID, value);
    }

    pub fn last_message_id(&self) -> &str {
        self.text(columns::LAST_MESSAGE_ID)
    }

    pub fn set_last_message_id(&mut self, value: impl Into<String>) {
        self.set_text(columns::LAST_MESSAGE_ID, value);
    }

    pub fn last_modifying_message_id(&self) -> &str {
        self.text(columns::LAST_MODIFYING_MESSAGE_ID)
    }

    pub fn set_last_modifying_message_id(&mut self, value: impl Into<String>) {
        self.set_text(columns::LAST_MODIFYING_MESSAGE_ID, value);
    }

    pub fn last_validation_message_id(&self) -> &str {
        self.text(columns::LAST_VALIDATION_MESSAGE_ID)
    }

    pub fn set_last_validation_message_id(&mut self, value: impl Into<String>) {
        self.set_text(columns::LAST_VALIDATION_MESSAGE_ID, value);
    }

    pub fn dc_code(&self) -> &str {
        self.text(columns::DC_CODE)
    }

    pub fn set_dc_code(&mut self, value: impl Into<String>) {
        self.set_text(columns::DC_CODE, value);
    }

    pub fn year(&self) -> &str {
        self.text(columns::YEAR)
    }

    pub fn set_year(&mut self, value: impl Into<String>) {
        self.set_text(columns::YEAR, value);
    }

    pub fn month(&self) -> &str {
        self.text(columns::MONTH)
    }

    pub fn set_month(&mut self, value: impl Into<String>) {
        self.set_text(columns::MONTH, value);
    }

    pub fn status(&self) -> DatasetStatus {
        DatasetStatus::from_text(self.text(columns::STATUS))
    }

    /// Sets the status, keeping the replaced one as the previous status.
    pub fn set_status(&mut self, status: DatasetStatus) {
        let current = self.status();
        self.set_text(columns::PREVIOUS_STATUS, current.as_str());
        self.set_text(columns::STATUS, status.as_str());
    }

    /// `None` when no status was ever replaced.
    pub fn previous_status(&self) -> Option<DatasetStatus> {
        let text = self.text(columns::PREVIOUS_STATUS);
        (!text.trim().is_empty()).then(|| DatasetStatus::from_text(text))
    }

    /// Forces the report back to draft, whatever its status.
    pub fn make_editable(&mut self) {
        self.set_status(DatasetStatus::Draft);
    }

    pub fn is_editable(&self) -> bool {
        self.status().is_editable()
    }

    /// Id of the aggregator report this report was sent with.
    pub fn aggregator_id(&self) -> Option<&str> {
        let text = self.text(columns::AGGREGATOR_ID).trim();
        (!text.is_empty()).then_some(text)
    }

    /// The aggregator id as a row id, when it is one.
    pub fn aggregator_row_id(&self) -> Option<RowId> {
        self.aggregator_id().and_then(|id| id.parse().ok())
    }

    /// Blank or `None` clears the aggregator.
    pub fn set_aggregator_id(&mut self, id: Option<&str>) {
        match id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => self.set_text(columns::AGGREGATOR_ID, id),
            None => {
                self.row.remove(columns::AGGREGATOR_ID);
            }
        }
    }

    pub fn is_aggregated(&self) -> bool {
        self.aggregator_id().is_some()
    }

    pub fn report_type(&self) -> ReportType {
        ReportType::from_text_or_default(self.text(columns::REPORT_TYPE))
    }

    pub fn set_report_type(&mut self, report_type: ReportType) {
        self.set_text(columns::REPORT_TYPE, report_type.as_str());
    }

    pub fn is_aggregator(&self) -> bool {
        self.report_type() == ReportType::CollectionAggregation
    }

    /// Only regular monthly reports are listed to the user.
    pub fn is_visible(&self) -> bool {
        self.report_type() == ReportType::SimpleMonthly
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> Report {
        Report::new(Arc::new(columns::report_schema().unwrap()))
    }

    #[test]
    fn set_status_keeps_one_level_of_history() {
        let mut report = report();
        assert_eq!(report.status(), DatasetStatus::Draft);
        assert_eq!(report.previous_status(), None);

        report.set_status(DatasetStatus::LocallyValidated);
        report.set_status(DatasetStatus::Uploaded);
        assert_eq!(report.status(), DatasetStatus::Uploaded);
        assert_eq!(report.previous_status(), Some(DatasetStatus::LocallyValidated));

        report.make_editable();
        assert_eq!(report.status(), DatasetStatus::Draft);
        assert_eq!(report.previous_status(), Some(DatasetStatus::Uploaded));
    }

    #[test]
    fn aggregator_id_is_trimmed_and_blank_clears() {
        let mut report = report();
        report.set_aggregator_id(Some(" 12 "));
        assert_eq!(report.aggregator_id(), Some("12"));
        assert_eq!(report.aggregator_row_id(), Some(RowId::new(12)));
        assert!(report.is_aggregated());

        report.set_aggregator_id(Some("   "));
        assert!(!report.is_aggregated());
        assert!(report.row().get(columns::AGGREGATOR_ID).is_none());
    }

    #[test]
    fn type_defaults_to_simple_monthly() {
        let mut report = report();
        assert_eq!(report.report_type(), ReportType::SimpleMonthly);
        assert!(report.is_visible());

        report.row_mut().put_code(columns::REPORT_TYPE, "weekly");
        assert_eq!(report.report_type(), ReportType::SimpleMonthly);

        report.set_report_type(ReportType::CollectionAggregation);
        assert!(!report.is_visible());
        assert!(report.is_aggregator());
    }

    #[test]
    fn version_rules() {
        let mut report = report();
        assert!(report.is_baseline_version());
        report.set_version("02");
        assert!(report.is_amendment());
        assert!(!report.is_baseline_version());
    }
}
