//! Formula engine settings.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FormulaError, Result};

/// Settings read from a `formula.toml` file.
///
/// ```toml
/// true_value = "Yes"
/// false_value = "No"
/// truthy_values = ["yes", "true"]
/// trace_column = "sampId"
///
/// [keywords]
/// APP_NAME = "tse-reporting-tool"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormulaConfig {
    /// Text written for a true comparison or logical function.
    pub true_value: String,
    /// Text written for a false comparison or logical function.
    pub false_value: String,
    /// Words (case-insensitive) considered true by IF, AND and OR.
    pub truthy_values: Vec<String>,
    /// Static `%NAME` constants. These take precedence over built-in keywords.
    pub keywords: BTreeMap<String, String>,
    /// Column whose evaluation stages are logged at debug level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_column: Option<String>,
}

impl Default for FormulaConfig {
    fn default() -> Self {
        Self {
            true_value: "Yes".to_string(),
            false_value: "No".to_string(),
            truthy_values: vec!["yes".to_string(), "true".to_string()],
            keywords: BTreeMap::new(),
            trace_column: None,
        }
    }
}

impl FormulaConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| FormulaError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| FormulaError::ConfigParse {
            origin: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|source| FormulaError::ConfigParse {
            origin: "<inline>".to_string(),
            source,
        })
    }

    pub fn is_true(&self, text: &str) -> bool {
        let text = text.trim();
        self.truthy_values
            .iter()
            .any(|word| word.eq_ignore_ascii_case(text))
    }

    pub fn bool_text(&self, value: bool) -> &str {
        if value {
            &self.true_value
        } else {
            &self.false_value
        }
    }

    #[must_use]
    pub fn with_keyword(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.keywords.insert(name.into(), value.into());
        self
    }
}
