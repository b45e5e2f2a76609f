//! Scanning formula text for fragments of one kind.
//!
//! Every finder walks the text left to right and resumes after the end of the
//! previous match, so the fragments of a list never overlap and nothing is
//! matched inside a fragment that was already consumed.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{FormulaError, Result};
use crate::fragment::{CellPart, Comparator, FormulaList, Fragment, FragmentKind};
use crate::keywords::{KeywordTable, ROW_KEYWORDS};

pub const RELATION: &str = "RELATION";

static KEYWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%([A-Z][A-Z0-9_]*)").expect("valid keyword regex"));

static COLUMN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%([A-Za-z_][A-Za-z0-9_]*)\.(code|label)").expect("valid column regex")
});

static EQUAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^(),=!]*)==([^(),=!]*)").expect("valid comparator regex"));

static NOT_EQUAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^(),=!]*)!=([^(),=!]*)").expect("valid comparator regex"));

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// A `%NAME` may not run into `.` or further identifier characters.
fn ends_keyword(text: &str, end: usize) -> bool {
    text[end..]
        .chars()
        .next()
        .is_none_or(|c| c != '.' && !is_ident_char(c))
}

fn find_percent_names(text: &str, accept: impl Fn(&str) -> bool, row: bool) -> FormulaList {
    let mut list = FormulaList::new();
    for caps in KEYWORD_RE.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if !ends_keyword(text, whole.end()) || !accept(name.as_str()) {
            continue;
        }
        let name = name.as_str().to_string();
        let kind = if row {
            FragmentKind::RowKeyword { name }
        } else {
            FragmentKind::Keyword { name }
        };
        list.push(Fragment::new(kind, whole.as_str(), whole.range()));
    }
    list
}

/// `%NAME` constants known to the keyword table.
pub fn find_keywords(text: &str, keywords: &KeywordTable) -> FormulaList {
    find_percent_names(text, |name| keywords.contains(name), false)
}

/// `%ROW_ID` and `%TABLE_NAME`.
pub fn find_row_keywords(text: &str) -> FormulaList {
    find_percent_names(text, |name| ROW_KEYWORDS.contains(&name), true)
}

/// `%column.code` and `%column.label` references.
pub fn find_columns(text: &str) -> FormulaList {
    let mut list = FormulaList::new();
    for caps in COLUMN_RE.captures_iter(text) {
        let (Some(whole), Some(column), Some(part)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        let part = if part.as_str() == "label" {
            CellPart::Label
        } else {
            CellPart::Code
        };
        let kind = FragmentKind::Column {
            column: column.as_str().to_string(),
            part,
        };
        list.push(Fragment::new(kind, whole.as_str(), whole.range()));
    }
    list
}

pub fn find_comparators(text: &str, comparator: Comparator) -> FormulaList {
    let re = match comparator {
        Comparator::Equal => &*EQUAL_RE,
        Comparator::NotEqual => &*NOT_EQUAL_RE,
    };
    let mut list = FormulaList::new();
    for caps in re.captures_iter(text) {
        let (Some(whole), Some(lhs), Some(rhs)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        let kind = FragmentKind::Comparison {
            lhs: lhs.as_str().to_string(),
            comparator,
            rhs: rhs.as_str().to_string(),
        };
        list.push(Fragment::new(kind, whole.as_str(), whole.range()));
    }
    list
}

/// A `NAME(...)` call: its byte span and the text between the parentheses.
struct Call<'t> {
    start: usize,
    end: usize,
    body: &'t str,
}

fn find_calls<'t>(text: &'t str, name: &str) -> Result<Vec<Call<'t>>> {
    let opener = format!("{name}(");
    let mut calls = Vec::new();
    let mut cursor = 0;
    while let Some(offset) = text[cursor..].find(&opener) {
        let start = cursor + offset;
        let body_start = start + opener.len();
        let at_boundary = text[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !is_ident_char(c));
        if !at_boundary {
            cursor = body_start;
            continue;
        }
        let Some(close) = text[body_start..].find(')') else {
            return Err(FormulaError::UnclosedCall {
                text: text[start..].to_string(),
            });
        };
        let end = body_start + close + 1;
        calls.push(Call {
            start,
            end,
            body: &text[body_start..body_start + close],
        });
        cursor = end;
    }
    Ok(calls)
}

/// `RELATION(Parent,field)` references. The field may carry a `.code` or
/// `.label` suffix; without one the code is read.
pub fn find_relations(text: &str) -> Result<FormulaList> {
    let mut list = FormulaList::new();
    for call in find_calls(text, RELATION)? {
        let unsolved = &text[call.start..call.end];
        let malformed = || FormulaError::MalformedRelation {
            text: unsolved.to_string(),
        };
        if call.body.contains('(') {
            return Err(malformed());
        }
        let parts: Vec<&str> = call.body.split(',').map(str::trim).collect();
        let [parent, field_spec] = parts.as_slice() else {
            return Err(malformed());
        };
        let (field, part) = match field_spec.rsplit_once('.') {
            Some((field, part)) => match part.parse::<CellPart>() {
                Ok(part) => (field, part),
                Err(_) => (*field_spec, CellPart::Code),
            },
            None => (*field_spec, CellPart::Code),
        };
        if parent.is_empty() || field.is_empty() {
            return Err(malformed());
        }
        let kind = FragmentKind::Relation {
            parent: (*parent).to_string(),
            field: field.to_string(),
            part,
        };
        list.push(Fragment::new(kind, unsolved, call.start..call.end));
    }
    Ok(list)
}

/// Calls of one function. The body runs up to the first `)`, so a call still
/// containing an unsolved inner call is rejected.
pub fn find_function(text: &str, name: &str) -> Result<FormulaList> {
    let mut list = FormulaList::new();
    for call in find_calls(text, name)? {
        let unsolved = &text[call.start..call.end];
        if call.body.contains('(') {
            return Err(FormulaError::MalformedCall {
                text: unsolved.to_string(),
            });
        }
        let operands = if call.body.is_empty() {
            Vec::new()
        } else {
            call.body.split(',').map(str::to_string).collect()
        };
        let kind = FragmentKind::Function {
            name: name.to_string(),
            operands,
        };
        list.push(Fragment::new(kind, unsolved, call.start..call.end));
    }
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormulaConfig;
    use chrono::NaiveDate;

    fn keywords() -> KeywordTable {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        KeywordTable::new(&FormulaConfig::default().with_keyword("APP", "rcl"), today)
    }

    #[test]
    fn keyword_must_not_run_into_reference() {
        let list = find_keywords("%APP-%TODAY.code %APPx %NOPE %CURRENT_YEAR", &keywords());
        let names: Vec<&str> = list.iter().map(Fragment::unsolved).collect();
        assert_eq!(names, vec!["%APP", "%CURRENT_YEAR"]);
    }

    #[test]
    fn row_keywords_only() {
        let list = find_row_keywords("%ROW_ID/%TABLE_NAME/%TODAY");
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn column_references_carry_part() {
        let list = find_columns("%a.code+%b_2.label");
        let kinds: Vec<&FragmentKind> = list.iter().map(|f| &f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                &FragmentKind::Column {
                    column: "a".into(),
                    part: CellPart::Code
                },
                &FragmentKind::Column {
                    column: "b_2".into(),
                    part: CellPart::Label
                },
            ]
        );
    }

    #[test]
    fn comparator_operands_stop_at_delimiters() {
        let list = find_comparators("IF(a == b,x,y)", Comparator::Equal);
        assert_eq!(list.len(), 1);
        assert_eq!(list.iter().next().map(Fragment::unsolved), Some("a == b"));
    }

    #[test]
    fn function_respects_identifier_boundary() {
        let list = find_function("COLOR(x) OR(a,b)", "OR").unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.iter().next().map(|f| f.span()), Some(9..16));
    }

    #[test]
    fn function_without_close_fails() {
        let err = find_function("SUM(1,2", "SUM").unwrap_err();
        assert!(matches!(err, FormulaError::UnclosedCall { text } if text == "SUM(1,2"));
    }

    #[test]
    fn nested_call_is_malformed() {
        let err = find_function("IF(AND(a,b),x,y)", "IF").unwrap_err();
        assert!(matches!(err, FormulaError::MalformedCall { text } if text == "IF(AND(a,b)"));
    }

    #[test]
    fn empty_body_has_no_operands() {
        let list = find_function("NEXT()", "NEXT").unwrap();
        assert!(matches!(
            &list.iter().next().unwrap().kind,
            FragmentKind::Function { operands, .. } if operands.is_empty()
        ));
    }

    #[test]
    fn relation_parts() {
        let list = find_relations("RELATION(Country, name.label)-RELATION(Country,code)").unwrap();
        let kinds: Vec<&FragmentKind> = list.iter().map(|f| &f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                &FragmentKind::Relation {
                    parent: "Country".into(),
                    field: "name".into(),
                    part: CellPart::Label
                },
                &FragmentKind::Relation {
                    parent: "Country".into(),
                    field: "code".into(),
                    part: CellPart::Code
                },
            ]
        );
    }

    #[test]
    fn relation_needs_two_operands() {
        let err = find_relations("RELATION(Country)").unwrap_err();
        assert!(matches!(err, FormulaError::MalformedRelation { .. }));
    }
}
