//! Status of a report's dataset on the remote data collection service.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DatasetStatus {
    /// Being edited locally; never validated.
    #[default]
    Draft,
    /// Passed local validation, ready to be sent.
    LocallyValidated,
    UploadFailed,
    Uploaded,
    /// Received by the service, validation running.
    Processing,
    Valid,
    ValidWithWarnings,
    /// Rejected by validation but still editable.
    RejectedEditable,
    Rejected,
    Submitted,
    /// Accepted into the data warehouse.
    AcceptedDwh,
    Deleted,
    /// A status text this client does not know.
    Other,
}

impl DatasetStatus {
    pub const ALL: [DatasetStatus; 13] = [
        DatasetStatus::Draft,
        DatasetStatus::LocallyValidated,
        DatasetStatus::UploadFailed,
        DatasetStatus::Uploaded,
        DatasetStatus::Processing,
        DatasetStatus::Valid,
        DatasetStatus::ValidWithWarnings,
        DatasetStatus::RejectedEditable,
        DatasetStatus::Rejected,
        DatasetStatus::Submitted,
        DatasetStatus::AcceptedDwh,
        DatasetStatus::Deleted,
        DatasetStatus::Other,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            DatasetStatus::Draft => "DRAFT",
            DatasetStatus::LocallyValidated => "LOCALLY_VALIDATED",
            DatasetStatus::UploadFailed => "UPLOAD_FAILED",
            DatasetStatus::Uploaded => "UPLOADED",
            DatasetStatus::Processing => "PROCESSING",
            DatasetStatus::Valid => "VALID",
            DatasetStatus::ValidWithWarnings => "VALID_WITH_WARNINGS",
            DatasetStatus::RejectedEditable => "REJECTED_EDITABLE",
            DatasetStatus::Rejected => "REJECTED",
            DatasetStatus::Submitted => "SUBMITTED",
            DatasetStatus::AcceptedDwh => "ACCEPTED_DWH",
            DatasetStatus::Deleted => "DELETED",
            DatasetStatus::Other => "OTHER",
        }
    }

    /// Parses stored text: empty means [`DatasetStatus::Draft`], anything
    /// unknown is [`DatasetStatus::Other`].
    pub fn from_text(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return DatasetStatus::Draft;
        }
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(text))
            .unwrap_or(DatasetStatus::Other)
    }

    pub const fn is_editable(self) -> bool {
        matches!(
            self,
            DatasetStatus::Draft
                | DatasetStatus::LocallyValidated
                | DatasetStatus::UploadFailed
                | DatasetStatus::RejectedEditable
        )
    }

    pub const fn can_be_sent(self) -> bool {
        matches!(self, DatasetStatus::LocallyValidated)
    }

    pub const fn can_be_submitted(self) -> bool {
        matches!(self, DatasetStatus::Valid | DatasetStatus::ValidWithWarnings)
    }

    pub const fn can_be_refreshed(self) -> bool {
        matches!(
            self,
            DatasetStatus::Uploaded
                | DatasetStatus::Processing
                | DatasetStatus::Valid
                | DatasetStatus::ValidWithWarnings
                | DatasetStatus::Submitted
                | DatasetStatus::Other
        )
    }

    /// Terminal: the dataset will not change any more.
    pub const fn is_finalized(self) -> bool {
        matches!(
            self,
            DatasetStatus::AcceptedDwh | DatasetStatus::Rejected | DatasetStatus::Deleted
        )
    }
}

impl fmt::Display for DatasetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_text(s))
    }
}
