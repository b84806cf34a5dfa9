//! Row rendering
//!
//! Renders the visible columns of a tuple, delegating each transmitted value
//! to the literal encoder.
//!
//! ```text
//! JSON:  {"id":1,"name":"O'Neil","bio":"???unchanged-toast-datum???"}
//! plain: id[integer]:1 name[text]:'O''Neil' bio[text]:unchanged-toast-datum
//! ```

use crate::common::literal::{encode_literal, push_identifier, push_json_string};
use crate::common::{Column, ColumnValue, Datum, Dialect, RowTuple};
use tracing::debug;

/// JSON placeholder for a value that was not transmitted.
pub const JSON_UNCHANGED_TOAST: &str = "\"???unchanged-toast-datum???\"";
/// Plain placeholder for a value that was not transmitted.
pub const PLAIN_UNCHANGED_TOAST: &str = "unchanged-toast-datum";

/// Append the rendering of `row` to `out`.
///
/// Dropped and system columns are skipped. With `skip_nulls`, NULL cells are
/// omitted entirely. The JSON dialect wraps the cells in `{...}`.
///
/// Returns the number of cells written.
pub fn render_row(
    out: &mut String,
    columns: &[Column],
    row: &RowTuple,
    skip_nulls: bool,
    dialect: Dialect,
) -> usize {
    if columns.len() != row.len() {
        debug!(
            "Tuple has {} values for {} columns; extra entries ignored",
            row.len(),
            columns.len()
        );
    }
    let cells = columns
        .iter()
        .zip(row.values.iter())
        .filter(|(column, _)| column.is_visible());
    render_cells(out, cells, skip_nulls, dialect)
}

/// Append `(column, value)` pairs in the order given.
///
/// Shared by the row renderer and the key extractor.
pub(crate) fn render_cells<'a>(
    out: &mut String,
    cells: impl IntoIterator<Item = (&'a Column, &'a ColumnValue)>,
    skip_nulls: bool,
    dialect: Dialect,
) -> usize {
    let mut written = 0;
    if dialect == Dialect::Json {
        out.push('{');
    }
    for (column, value) in cells {
        if skip_nulls && value.is_null() {
            continue;
        }
        if written > 0 {
            out.push(separator(dialect));
        }
        push_cell_name(out, &column.name, &column.type_name, dialect);
        push_value(out, value, dialect);
        written += 1;
    }
    if dialect == Dialect::Json {
        out.push('}');
    }
    written
}

/// Cell separator of the dialect.
pub(crate) fn separator(dialect: Dialect) -> char {
    match dialect {
        Dialect::Json => ',',
        Dialect::Plain => ' ',
    }
}

/// `"name":` or `name[type]:`
pub(crate) fn push_cell_name(out: &mut String, name: &str, type_name: &str, dialect: Dialect) {
    match dialect {
        Dialect::Json => push_json_string(out, name),
        Dialect::Plain => {
            push_identifier(out, name);
            out.push('[');
            out.push_str(type_name);
            out.push(']');
        }
    }
    out.push(':');
}

/// Append one value: `null`, the unchanged-toast placeholder, or a literal.
pub fn push_value(out: &mut String, value: &ColumnValue, dialect: Dialect) {
    match &value.datum {
        Datum::Null => out.push_str("null"),
        Datum::UnchangedToast => out.push_str(match dialect {
            Dialect::Json => JSON_UNCHANGED_TOAST,
            Dialect::Plain => PLAIN_UNCHANGED_TOAST,
        }),
        Datum::Text(text) => encode_literal(out, value.type_category, text, dialect),
    }
}
