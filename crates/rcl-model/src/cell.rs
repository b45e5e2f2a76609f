use serde::{Deserialize, Serialize};

/// Value of one column in a row: a code and an optional display label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Cell {
    /// A cell whose label is its code.
    pub fn plain(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: None,
        }
    }

    pub fn labelled(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: Some(label.into()),
        }
    }

    pub fn label_or_code(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.code)
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty() && self.label.as_deref().is_none_or(str::is_empty)
    }
}
