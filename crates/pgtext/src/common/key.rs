//! # Key extraction
//!
//! UPDATE and DELETE records name the row they touch through its identity
//! columns, read from the identity tuple in index-definition order:
//!
//! ```text
//! JSON:  "key":{"tenant":3,"id":5}
//! plain: tenant[integer]:3 id[integer]:5
//! ```
//!
//! A relation without identity index renders a fixed sentinel instead
//! (`"***FIXME***"` / `(no-tuple-data)`): consumers cannot tell which row
//! such an event refers to.
//!
//! An UPDATE without identity tuple takes its key from the new row. There an
//! unchanged out-of-line key value is legitimately missing and renders as the
//! unchanged-toast placeholder.

use crate::common::literal::push_json_string;
use crate::common::row::render_cells;
use crate::common::{
    Column, ColumnValue, Dialect, KeySource, RelationIdentity, RowTuple, TypeCategory,
};
use tracing::{error, warn};

/// JSON key of a relation without identity index.
pub const JSON_NO_IDENTITY: &str = "***FIXME***";
/// Plain marker for missing identity or missing tuple data.
pub const PLAIN_NO_TUPLE_DATA: &str = "(no-tuple-data)";

/// What the key extractor wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Identity columns rendered; number of cells written
    Extracted(usize),
    /// Relation has no identity index; sentinel written
    NoIdentity,
    /// Identity tuple was not captured; missing-data marker written
    NoTupleData,
}

/// Append the identity of the row to `out`.
///
/// The plain dialect omits NULL identity cells, since an identity tuple
/// leaves every non-key column NULL.
pub fn extract_key(
    out: &mut String,
    relation: &RelationIdentity,
    key_tuple: Option<(&RowTuple, KeySource)>,
    dialect: Dialect,
) -> KeyOutcome {
    let row_oid = key_tuple
        .and_then(|(t, _)| t.oid)
        .filter(|_| relation.has_oids);

    let Some(index) = relation.identity_index.as_deref().or(row_oid.map(|_| &[][..])) else {
        match dialect {
            Dialect::Json => push_json_string(out, JSON_NO_IDENTITY),
            Dialect::Plain => out.push_str(PLAIN_NO_TUPLE_DATA),
        }
        return KeyOutcome::NoIdentity;
    };

    let Some((tuple, source)) = key_tuple else {
        out.push_str(match dialect {
            Dialect::Json => "null",
            Dialect::Plain => PLAIN_NO_TUPLE_DATA,
        });
        return KeyOutcome::NoTupleData;
    };

    let oid_cell = row_oid.map(|oid| {
        (
            Column::new("oid", 0, "oid"),
            ColumnValue::text(TypeCategory::Numeric, oid.to_string()),
        )
    });

    let mut cells: Vec<(&Column, &ColumnValue)> = Vec::with_capacity(index.len() + 1);
    if let Some((column, value)) = &oid_cell {
        cells.push((column, value));
    }
    for &ordinal in index {
        let Some(pos) = relation.position_of(ordinal) else {
            warn!(
                "Identity ordinal {} not found in {}",
                ordinal,
                relation.qualified_name()
            );
            continue;
        };
        let Some(value) = tuple.values.get(pos) else {
            warn!(
                "Identity tuple for {} has no value for ordinal {}",
                relation.qualified_name(),
                ordinal
            );
            continue;
        };
        if value.is_unchanged_toast() && source == KeySource::OldRow {
            error!(
                "Identity column {} of {} was not transmitted",
                relation.columns[pos].name,
                relation.qualified_name()
            );
            debug_assert!(false, "unchanged toast value in identity column");
        }
        cells.push((&relation.columns[pos], value));
    }

    let skip_nulls = dialect == Dialect::Plain;
    KeyOutcome::Extracted(render_cells(out, cells, skip_nulls, dialect))
}
