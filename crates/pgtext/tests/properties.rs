//! Property-based tests for record rendering
//!
//! These tests use proptest to generate random values and relations and
//! verify the rendering invariants that hold for every input.

mod harness;

use harness::*;
use pgtext::common::{encode_literal, literal, render_row, JSON_NO_IDENTITY};
use pgtext::{
    ChangeEvent, Column, ColumnValue, Dialect, FormatterConfig, RelationIdentity, RowChange,
    RowTuple, TypeCategory,
};
use proptest::prelude::*;
use std::sync::Arc;

// Generate numeric output function text
prop_compose! {
    fn numeric_text()(s in "-?[0-9]{1,12}(\\.[0-9]{1,6})?|NaN|Infinity|-Infinity") -> String {
        s
    }
}

// Generate arbitrary text, including quotes, backslashes and control characters
prop_compose! {
    fn arbitrary_text(max_len: usize)(v in prop::collection::vec(any::<char>(), 0..max_len)) -> String {
        v.into_iter().collect()
    }
}

// Generate text a JSON parser accepts once escaped: only \n, \r and \t
// among the control characters
prop_compose! {
    fn json_text(max_len: usize)(
        v in prop::collection::vec(
            any::<char>().prop_filter("raw control character", |c| {
                !c.is_control() || matches!(*c, '\n' | '\r' | '\t')
            }),
            0..max_len,
        )
    ) -> String {
        v.into_iter().collect()
    }
}

// Generate a column name
prop_compose! {
    fn column_name()(s in "[a-zA-Z_][a-zA-Z0-9_ \"]{0,15}") -> String {
        s
    }
}

// Generate a relation of 1..8 text columns with a random identity index
prop_compose! {
    fn keyed_relation()(
        count in 1usize..8,
    )(
        index in prop::sample::subsequence((1..=count as i32).collect::<Vec<_>>(), 1..=count)
            .prop_shuffle(),
        dropped in prop::collection::vec(any::<bool>(), count),
        count in Just(count),
    ) -> (Arc<RelationIdentity>, usize) {
        let columns = (1..=count as i32)
            .map(|ordinal| {
                let column = Column::new(format!("c{}", ordinal), ordinal, "text");
                let is_key = index.contains(&ordinal);
                if dropped[ordinal as usize - 1] && !is_key {
                    column.dropped()
                } else {
                    column
                }
            })
            .collect();
        let rel = RelationIdentity::new("public", "t", columns).with_identity_index(index);
        (Arc::new(rel), count)
    }
}

/// Extract the JSON string escape of `text` the way the renderer writes it.
fn json_string(text: &str) -> String {
    literal(TypeCategory::Other, text, Dialect::Json)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Numeric values are written verbatim in both dialects
    #[test]
    fn test_numeric_verbatim(text in numeric_text()) {
        for dialect in [Dialect::Json, Dialect::Plain] {
            prop_assert_eq!(literal(TypeCategory::Numeric, &text, dialect), text.clone());
        }
    }

    /// Booleans are exactly `true` for "t" and `false` for anything else
    #[test]
    fn test_boolean_two_valued(text in arbitrary_text(8)) {
        let expected = if text == "t" { "true" } else { "false" };
        for dialect in [Dialect::Json, Dialect::Plain] {
            prop_assert_eq!(literal(TypeCategory::Boolean, &text, dialect), expected);
        }
    }

    /// JSON string escaping round-trips through a JSON parser
    #[test]
    fn test_json_string_roundtrip(text in json_text(64)) {
        let encoded = json_string(&text);
        let decoded: String = serde_json::from_str(&encoded).unwrap();
        prop_assert_eq!(decoded, text);
    }

    /// Plain strings are single quoted with embedded quotes doubled
    #[test]
    fn test_plain_string_quoting(text in arbitrary_text(64)) {
        let mut out = String::new();
        encode_literal(&mut out, TypeCategory::Other, &text, Dialect::Plain);
        prop_assert!(out.starts_with('\'') && out.ends_with('\''));
        let inner = &out[1..out.len() - 1];
        prop_assert_eq!(inner.replace("''", "'"), text);
    }

    /// Rendered JSON rows are valid JSON objects keyed by column name
    #[test]
    fn test_json_row_parses(
        names in prop::collection::btree_set(column_name(), 1..6),
        texts in prop::collection::vec(json_text(16), 6),
    ) {
        let columns: Vec<Column> = names
            .iter()
            .zip(1..)
            .map(|(name, ordinal)| Column::new(name.as_str(), ordinal, "text"))
            .collect();
        let row = RowTuple::new(
            texts
                .iter()
                .take(columns.len())
                .map(|t| ColumnValue::text(TypeCategory::Other, t.as_str()))
                .collect(),
        );

        let mut out = String::new();
        render_row(&mut out, &columns, &row, false, Dialect::Json);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        let object = parsed.as_object().unwrap();
        prop_assert_eq!(object.len(), columns.len());
        for (column, text) in columns.iter().zip(texts.iter()) {
            prop_assert_eq!(object[&column.name].as_str(), Some(text.as_str()));
        }
    }

    /// Keys follow the identity index order, not the table order
    #[test]
    fn test_key_in_index_order((rel, count) in keyed_relation()) {
        let values = (1..=count)
            .map(|i| ColumnValue::text(TypeCategory::Numeric, i.to_string()))
            .collect();
        let change = RowChange::delete(rel.clone(), Some(RowTuple::new(values)));

        let sink = format(FormatterConfig::json(), &[ChangeEvent::from(change)]);
        let record = sink.texts()[0];

        let cells: Vec<String> = rel
            .identity_index
            .iter()
            .flatten()
            .map(|o| format!("\"c{}\":{}", o, o))
            .collect();
        let expected = format!(",\"key\":{{{}}}}}", cells.join(","));
        prop_assert!(record.ends_with(&expected), "{} does not end with {}", record, expected);
    }

    /// Without identity index the JSON key is always the sentinel
    #[test]
    fn test_sentinel_without_index(id in any::<u32>()) {
        let change = RowChange::delete(users(false), Some(user_key(&id.to_string())));
        let sink = format(FormatterConfig::json(), &[change.into()]);
        let record: serde_json::Value = serde_json::from_str(sink.texts()[0]).unwrap();
        prop_assert_eq!(record["key"].as_str(), Some(JSON_NO_IDENTITY));
    }

    /// Dropped columns never appear in INSERT data
    #[test]
    fn test_dropped_columns_hidden((rel, count) in keyed_relation()) {
        let values = (1..=count)
            .map(|i| ColumnValue::text(TypeCategory::Other, format!("v{}", i)))
            .collect();
        let change = RowChange::insert(rel.clone(), RowTuple::new(values));
        let sink = format(FormatterConfig::plain(), &[change.into()]);
        let record = sink.texts()[0];

        for (i, column) in rel.columns.iter().enumerate() {
            let cell = format!("{}[text]:'v{}'", column.name, i + 1);
            prop_assert_eq!(record.contains(&cell), !column.is_dropped);
        }
    }
}
