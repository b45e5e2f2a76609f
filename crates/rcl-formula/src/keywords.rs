use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::config::FormulaConfig;

pub const TODAY: &str = "TODAY";
pub const CURRENT_YEAR: &str = "CURRENT_YEAR";
pub const CURRENT_MONTH: &str = "CURRENT_MONTH";

pub const ROW_ID: &str = "ROW_ID";
pub const TABLE_NAME: &str = "TABLE_NAME";

pub const BUILTIN_KEYWORDS: [&str; 3] = [TODAY, CURRENT_YEAR, CURRENT_MONTH];
pub const ROW_KEYWORDS: [&str; 2] = [ROW_ID, TABLE_NAME];

/// Values of every `%NAME` keyword for one evaluation.
#[derive(Debug, Clone, Default)]
pub struct KeywordTable {
    values: BTreeMap<String, String>,
}

impl KeywordTable {
    pub fn new(config: &FormulaConfig, today: NaiveDate) -> Self {
        let mut values = BTreeMap::new();
        values.insert(TODAY.to_string(), today.format("%Y-%m-%d").to_string());
        values.insert(CURRENT_YEAR.to_string(), today.year().to_string());
        values.insert(CURRENT_MONTH.to_string(), today.month().to_string());
        for (name, value) in &config.keywords {
            values.insert(name.clone(), value.clone());
        }
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
