use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    /// A regular monthly report, shown to the user.
    #[default]
    SimpleMonthly,
    /// Synthetic report sending several amended reports together.
    CollectionAggregation,
}

impl ReportType {
    pub const fn as_str(self) -> &'static str {
        match self {
            ReportType::SimpleMonthly => "SIMPLE_MONTHLY",
            ReportType::CollectionAggregation => "COLLECTION_AGGREGATION",
        }
    }

    /// Unknown or empty text falls back to [`ReportType::SimpleMonthly`].
    pub fn from_text_or_default(text: &str) -> Self {
        let text = text.trim();
        if text.eq_ignore_ascii_case(ReportType::CollectionAggregation.as_str()) {
            ReportType::CollectionAggregation
        } else {
            ReportType::SimpleMonthly
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
