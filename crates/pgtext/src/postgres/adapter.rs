//! pgoutput to change event adapter
//!
//! Keeps the relation and type caches a pgoutput stream relies on and turns
//! decoded messages into [`ChangeEvent`]s for the formatter.
//!
//! ```text
//! Relation / Type ──▶ cache, no event
//! Begin           ──▶ ChangeEvent::Begin   (xid remembered)
//! Insert/Update/Delete ──▶ ChangeEvent::RowChange
//! Commit          ──▶ ChangeEvent::Commit  (xid of the open BEGIN)
//! Origin / Truncate / Stream* ──▶ skipped
//! ```

use super::protocol::{
    PgOutputDecoder, RelationBody, ReplicationMessage, Tuple, TupleData, TypeBody,
};
use super::replica_identity::ReplicaIdentity;
use super::type_mapper::PostgresTypeMapper;
use crate::common::{
    from_pg_micros, ChangeEvent, Column, ColumnValue, DecodingError, RelationIdentity, Result,
    RowChange, RowTuple, TransactionInfo, TypeCategory,
};
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Cached relation with the per-column literal categories.
#[derive(Debug, Clone)]
pub struct RelationEntry {
    pub identity: Arc<RelationIdentity>,
    pub categories: Vec<TypeCategory>,
}

/// Stateful pgoutput message adapter.
#[derive(Debug, Default)]
pub struct PgOutputAdapter {
    relations: HashMap<u32, RelationEntry>,
    types: HashMap<u32, String>,
    current_xid: Option<u32>,
}

impl PgOutputAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one pgoutput message and apply it.
    pub fn decode_and_apply(&mut self, data: &mut Bytes) -> Result<Option<ChangeEvent>> {
        let message = PgOutputDecoder::decode(data)?;
        self.apply(message)
    }

    /// Apply a decoded message, returning the change event it produces.
    pub fn apply(&mut self, message: ReplicationMessage) -> Result<Option<ChangeEvent>> {
        match message {
            ReplicationMessage::Begin(begin) => {
                if let Some(open) = self.current_xid {
                    warn!("BEGIN for xid {} while xid {} is open", begin.xid, open);
                }
                self.current_xid = Some(begin.xid);
                Ok(Some(ChangeEvent::Begin(TransactionInfo::new(
                    begin.xid,
                    from_pg_micros(begin.timestamp),
                ))))
            }
            ReplicationMessage::Commit(commit) => {
                let xid = self.current_xid.take().ok_or_else(|| {
                    DecodingError::invalid_state(format!(
                        "COMMIT at LSN {:X} without BEGIN",
                        commit.commit_lsn
                    ))
                })?;
                Ok(Some(ChangeEvent::Commit(TransactionInfo::new(
                    xid,
                    from_pg_micros(commit.timestamp),
                ))))
            }
            ReplicationMessage::Relation(rel) => {
                self.on_relation(rel);
                Ok(None)
            }
            ReplicationMessage::Type(ty) => {
                self.on_type(ty);
                Ok(None)
            }
            ReplicationMessage::Insert(insert) => {
                let entry = self.relation(insert.relation_id)?;
                let row = to_row(&insert.tuple, entry);
                Ok(Some(
                    RowChange::insert(entry.identity.clone(), row).into(),
                ))
            }
            ReplicationMessage::Update(update) => {
                let entry = self.relation(update.relation_id)?;
                let old_row = update
                    .key_tuple
                    .as_ref()
                    .map(|t| to_identity_row(t, entry))
                    .transpose()?;
                let new_row = to_row(&update.new_tuple, entry);
                Ok(Some(
                    RowChange::update(entry.identity.clone(), old_row, new_row).into(),
                ))
            }
            ReplicationMessage::Delete(delete) => {
                let entry = self.relation(delete.relation_id)?;
                let old_row = delete
                    .key_tuple
                    .as_ref()
                    .map(|t| to_identity_row(t, entry))
                    .transpose()?;
                Ok(Some(
                    RowChange::delete(entry.identity.clone(), old_row).into(),
                ))
            }
            ReplicationMessage::Skipped(skipped) => {
                debug!("Skipping {} message", skipped.name());
                Ok(None)
            }
        }
    }

    fn on_relation(&mut self, rel: RelationBody) {
        let replica_identity = rel.replica_identity;
        if let ReplicaIdentity::Unknown(b) = replica_identity {
            warn!("Relation {}.{} has unknown replica identity {}", rel.namespace, rel.name, b);
        }

        let mut columns = Vec::with_capacity(rel.columns.len());
        let mut categories = Vec::with_capacity(rel.columns.len());
        let mut key_ordinals = Vec::new();
        for (ordinal, col) in (1..).zip(rel.columns.iter()) {
            columns.push(Column::new(col.name.as_str(), ordinal, self.type_name(col.type_id)));
            categories.push(PostgresTypeMapper::type_category(col.type_id));
            if col.is_key {
                key_ordinals.push(ordinal);
            }
        }

        let mut identity = RelationIdentity::new(rel.namespace, rel.name, columns);
        if !key_ordinals.is_empty() && replica_identity.identifies_rows() {
            identity = identity.with_identity_index(key_ordinals);
        }

        debug!(
            "Relation {} -> {} ({} columns, replica identity {})",
            rel.id,
            identity.qualified_name(),
            identity.columns.len(),
            replica_identity
        );
        self.relations.insert(
            rel.id,
            RelationEntry {
                identity: Arc::new(identity),
                categories,
            },
        );
    }

    fn on_type(&mut self, ty: TypeBody) {
        let name = match ty.namespace.as_str() {
            "" | "pg_catalog" | "public" => ty.name,
            ns => format!("{}.{}", ns, ty.name),
        };
        debug!("Type {} -> {}", ty.id, name);
        self.types.insert(ty.id, name);
    }

    fn type_name(&self, type_oid: u32) -> String {
        if let Some(name) = self.types.get(&type_oid) {
            return name.clone();
        }
        PostgresTypeMapper::builtin_type_name(type_oid)
            .map(str::to_string)
            .unwrap_or_else(|| PostgresTypeMapper::unknown_type_name(type_oid))
    }

    fn relation(&self, relation_id: u32) -> Result<&RelationEntry> {
        self.relations
            .get(&relation_id)
            .ok_or(DecodingError::UnknownRelation(relation_id))
    }

    /// Cached relation by id.
    pub fn get_relation(&self, relation_id: u32) -> Option<&RelationEntry> {
        self.relations.get(&relation_id)
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    /// Xid of the transaction between BEGIN and COMMIT, if any.
    pub fn current_xid(&self) -> Option<u32> {
        self.current_xid
    }
}

fn to_row(tuple: &Tuple, entry: &RelationEntry) -> RowTuple {
    let values = tuple
        .0
        .iter()
        .enumerate()
        .map(|(i, data)| {
            let category = entry.categories.get(i).copied().unwrap_or_default();
            match data {
                TupleData::Null => ColumnValue::null(category),
                TupleData::Toast => ColumnValue::unchanged_toast(category),
                TupleData::Text(bytes) => {
                    ColumnValue::text(category, String::from_utf8_lossy(bytes))
                }
            }
        })
        .collect();
    RowTuple::new(values)
}

/// Map an UPDATE/DELETE identity tuple.
///
/// Every identity column must have been transmitted; an unchanged-toast
/// placeholder there leaves the row unidentifiable.
fn to_identity_row(tuple: &Tuple, entry: &RelationEntry) -> Result<RowTuple> {
    let identity = &entry.identity;
    for &ordinal in identity.identity_index.iter().flatten() {
        let Some(pos) = identity.position_of(ordinal) else {
            continue;
        };
        if matches!(tuple.0.get(pos), Some(TupleData::Toast)) {
            return Err(DecodingError::invalid_state(format!(
                "identity column {} of {} not transmitted",
                identity.columns[pos].name,
                identity.qualified_name()
            )));
        }
    }
    Ok(to_row(tuple, entry))
}
