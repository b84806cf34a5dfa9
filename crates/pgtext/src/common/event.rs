//! Change event representation
//!
//! The immutable, already-resolved view of one replication event handed to
//! the formatter: transaction boundaries and row changes carrying their
//! relation metadata and tuples.
//!
//! ## Tuples
//!
//! A [`RowTuple`] is aligned 1:1 with [`RelationIdentity::columns`]. It is
//! either a full row (INSERT, UPDATE new row) or an identity tuple (UPDATE
//! old key, DELETE) where only the replica identity columns carry data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Literal syntax family of a column type.
///
/// Drives how a rendered value is written out. Unknown types always fall
/// into [`TypeCategory::Other`], which quotes and escapes the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeCategory {
    /// Integers, floats, arbitrary precision numeric: written verbatim
    Numeric,
    /// bit / varbit: written as a `B'...'` literal
    BitString,
    /// bool: `t` maps to `true`, anything else to `false`
    Boolean,
    /// Quoted and escaped string fallback
    #[default]
    #[serde(other)]
    Other,
}

impl TypeCategory {
    /// Classify a PostgreSQL built-in type OID.
    pub fn from_type_oid(type_oid: u32) -> Self {
        match type_oid {
            // int2, int4, int8, oid, float4, float8, numeric
            21 | 23 | 20 | 26 | 700 | 701 | 1700 => TypeCategory::Numeric,
            // bit, varbit
            1560 | 1562 => TypeCategory::BitString,
            // bool
            16 => TypeCategory::Boolean,
            _ => TypeCategory::Other,
        }
    }

    /// Get the snake_case name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeCategory::Numeric => "numeric",
            TypeCategory::BitString => "bit_string",
            TypeCategory::Boolean => "boolean",
            TypeCategory::Other => "other",
        }
    }
}

impl std::fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a single cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Datum {
    /// SQL NULL
    Null,
    /// Out-of-line value that was not modified and therefore not transmitted
    UnchangedToast,
    /// Output function text of the value
    Text(String),
}

/// One cell of a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnValue {
    pub type_category: TypeCategory,
    pub datum: Datum,
}

impl ColumnValue {
    /// A non-null value with its output function text.
    pub fn text(type_category: TypeCategory, text: impl Into<String>) -> Self {
        Self {
            type_category,
            datum: Datum::Text(text.into()),
        }
    }

    /// A NULL value.
    pub fn null(type_category: TypeCategory) -> Self {
        Self {
            type_category,
            datum: Datum::Null,
        }
    }

    /// An unchanged TOAST value.
    pub fn unchanged_toast(type_category: TypeCategory) -> Self {
        Self {
            type_category,
            datum: Datum::UnchangedToast,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.datum, Datum::Null)
    }

    pub fn is_unchanged_toast(&self) -> bool {
        matches!(self.datum, Datum::UnchangedToast)
    }

    /// Output function text, if the value was transmitted and is not NULL.
    pub fn rendered_text(&self) -> Option<&str> {
        match &self.datum {
            Datum::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Column definition within a relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// 1-based attribute number; negative for system columns
    pub ordinal: i32,
    /// Type name printed by the plain dialect, e.g. `integer`
    pub type_name: String,
    #[serde(default)]
    pub is_dropped: bool,
}

impl Column {
    /// Create a live user column.
    pub fn new(name: impl Into<String>, ordinal: i32, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ordinal,
            type_name: type_name.into(),
            is_dropped: false,
        }
    }

    /// Mark the column as dropped.
    pub fn dropped(mut self) -> Self {
        self.is_dropped = true;
        self
    }

    /// System columns carry negative attribute numbers.
    pub fn is_system(&self) -> bool {
        self.ordinal < 0
    }

    /// Whether the column takes part in rendered output.
    pub fn is_visible(&self) -> bool {
        !self.is_dropped && !self.is_system()
    }
}

/// Ordered cells of one row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowTuple {
    pub values: Vec<ColumnValue>,
    /// Row OID, only for relations declaring `has_oids`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oid: Option<u32>,
}

impl RowTuple {
    pub fn new(values: Vec<ColumnValue>) -> Self {
        Self { values, oid: None }
    }

    /// Attach a row OID.
    pub fn with_oid(mut self, oid: u32) -> Self {
        self.oid = Some(oid);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Resolved relation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationIdentity {
    pub schema_name: String,
    pub table_name: String,
    pub columns: Vec<Column>,
    /// Ordinals of the replica identity index, in index order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_index: Option<Vec<i32>>,
    /// Relation carries the implicit `oid` identity column
    #[serde(default)]
    pub has_oids: bool,
}

impl RelationIdentity {
    /// Create a relation without identity index.
    pub fn new(
        schema_name: impl Into<String>,
        table_name: impl Into<String>,
        columns: Vec<Column>,
    ) -> Self {
        Self {
            schema_name: schema_name.into(),
            table_name: table_name.into(),
            columns,
            identity_index: None,
            has_oids: false,
        }
    }

    /// Set the identity index ordinals (index order).
    pub fn with_identity_index(mut self, ordinals: Vec<i32>) -> Self {
        self.identity_index = Some(ordinals);
        self
    }

    /// Declare the implicit OID column.
    pub fn with_oids(mut self) -> Self {
        self.has_oids = true;
        self
    }

    /// Position of the column with the given ordinal.
    pub fn position_of(&self, ordinal: i32) -> Option<usize> {
        self.columns.iter().position(|c| c.ordinal == ordinal)
    }

    /// `schema.table`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema_name, self.table_name)
    }
}

/// Row change kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    /// Row inserted
    Insert,
    /// Row updated
    Update,
    /// Row deleted
    Delete,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Insert => "INSERT",
            ChangeKind::Update => "UPDATE",
            ChangeKind::Delete => "DELETE",
        }
    }

    /// UPDATE and DELETE identify an existing row.
    pub fn has_key(&self) -> bool {
        matches!(self, ChangeKind::Update | ChangeKind::Delete)
    }

    /// INSERT and UPDATE carry new row data.
    pub fn has_data(&self) -> bool {
        matches!(self, ChangeKind::Insert | ChangeKind::Update)
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction id and commit time of a BEGIN or COMMIT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInfo {
    pub xid: u32,
    pub commit_time: DateTime<Utc>,
}

impl TransactionInfo {
    pub fn new(xid: u32, commit_time: DateTime<Utc>) -> Self {
        Self { xid, commit_time }
    }
}

/// A row-level modification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowChange {
    pub kind: ChangeKind,
    pub relation: Arc<RelationIdentity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_row: Option<RowTuple>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_row: Option<RowTuple>,
}

impl RowChange {
    /// Create a new INSERT change
    pub fn insert(relation: Arc<RelationIdentity>, new_row: RowTuple) -> Self {
        Self {
            kind: ChangeKind::Insert,
            relation,
            new_row: Some(new_row),
            old_row: None,
        }
    }

    /// Create a new UPDATE change; `old_row` is only present when identity
    /// columns changed
    pub fn update(
        relation: Arc<RelationIdentity>,
        old_row: Option<RowTuple>,
        new_row: RowTuple,
    ) -> Self {
        Self {
            kind: ChangeKind::Update,
            relation,
            new_row: Some(new_row),
            old_row,
        }
    }

    /// Create a new DELETE change
    pub fn delete(relation: Arc<RelationIdentity>, old_row: Option<RowTuple>) -> Self {
        Self {
            kind: ChangeKind::Delete,
            relation,
            new_row: None,
            old_row,
        }
    }

    /// Tuple the row identity is read from, and which row it is.
    ///
    /// UPDATE falls back to the new row when no old key was captured.
    pub fn key_tuple(&self) -> Option<(&RowTuple, KeySource)> {
        match self.kind {
            ChangeKind::Insert => None,
            ChangeKind::Update => match (&self.old_row, &self.new_row) {
                (Some(old), _) => Some((old, KeySource::OldRow)),
                (None, Some(new)) => Some((new, KeySource::NewRow)),
                (None, None) => None,
            },
            ChangeKind::Delete => self.old_row.as_ref().map(|old| (old, KeySource::OldRow)),
        }
    }
}

/// Row a key is read from.
///
/// An old row carries every identity column. A new row used as key fallback
/// may leave an unchanged out-of-line key value untransmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// Identity tuple of an UPDATE or DELETE
    OldRow,
    /// New row of an UPDATE without identity tuple
    NewRow,
}

/// One event delivered by the upstream decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// Transaction begin
    Begin(TransactionInfo),
    /// Transaction commit
    Commit(TransactionInfo),
    /// Row insert, update or delete
    RowChange(RowChange),
}

impl ChangeEvent {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            ChangeEvent::Begin(_) => "BEGIN",
            ChangeEvent::Commit(_) => "COMMIT",
            ChangeEvent::RowChange(change) => change.kind.as_str(),
        }
    }
}

impl From<RowChange> for ChangeEvent {
    fn from(change: RowChange) -> Self {
        ChangeEvent::RowChange(change)
    }
}
