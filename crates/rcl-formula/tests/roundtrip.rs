//! Splicing fragments back into the gaps they were found between must
//! reproduce the scanned text exactly.

use chrono::NaiveDate;
use proptest::prelude::*;
use rcl_formula::finder;
use rcl_formula::keywords::KeywordTable;
use rcl_formula::{Comparator, FormulaConfig, FormulaList, Fragment, FUNCTIONS};

fn token() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "%a.code",
        "%b_1.label",
        "%TODAY",
        "%ROW_ID",
        "%TABLE_NAME",
        "%APP",
        "RELATION(Country,name.label)",
        "RELATION(Country,code)",
        "IF(Yes,a,b)",
        "SUM(1,2)",
        "ZERO_PADDING(7,3)",
        "NEXT()",
        "HASH(MD5,x)",
        "x == y",
        "1!=2",
        "-",
        " ",
        ",",
        "é",
        "plain",
    ])
}

fn formula() -> impl Strategy<Value = String> {
    prop::collection::vec(token(), 0..12).prop_map(|tokens| tokens.concat())
}

fn assert_round_trip(text: &str, list: &FormulaList) {
    assert_eq!(list.splice(text, Fragment::unsolved), text);
    let mut last_end = 0;
    for fragment in list {
        let span = fragment.span();
        assert!(span.start >= last_end, "fragments overlap in {text:?}");
        assert_eq!(&text[span.clone()], fragment.unsolved());
        last_end = span.end;
    }
}

proptest! {
    #[test]
    fn every_finder_round_trips(text in formula()) {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date");
        let keywords = KeywordTable::new(&FormulaConfig::default().with_keyword("APP", "rcl"), today);

        assert_round_trip(&text, &finder::find_keywords(&text, &keywords));
        assert_round_trip(&text, &finder::find_row_keywords(&text));
        assert_round_trip(&text, &finder::find_columns(&text));
        assert_round_trip(&text, &finder::find_relations(&text).expect("well-formed relations"));
        assert_round_trip(&text, &finder::find_comparators(&text, Comparator::Equal));
        assert_round_trip(&text, &finder::find_comparators(&text, Comparator::NotEqual));
        for spec in FUNCTIONS {
            let list = finder::find_function(&text, spec.name).expect("well-formed calls");
            assert_round_trip(&text, &list);
        }
    }
}

#[test]
fn solved_splice_replaces_only_fragments() {
    let text = "%a.code+%b.label";
    let mut list = finder::find_columns(text);
    for fragment in list.iter_mut() {
        let value = fragment.unsolved().trim_start_matches('%').replace('.', "_");
        fragment.resolve(value);
    }
    let spliced = list.splice(text, |f| f.solved().unwrap_or_default());
    assert_eq!(spliced, "a_code+b_label");
}
