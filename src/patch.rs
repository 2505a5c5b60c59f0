//! Builds parameterized `UPDATE` statements from sparse patch records.
//!
//! Column names only ever come from the static [`ColumnMap`] of an entity;
//! every caller-supplied value, including the row id, is bound as a
//! `$n` placeholder.

use thiserror::Error;
use time::OffsetDateTime;

use crate::fields::{Fields, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub field: &'static str,
    pub name: &'static str,
    pub mutable: bool,
}

impl Column {
    pub const fn mutable(field: &'static str, name: &'static str) -> Self {
        Self {
            field,
            name,
            mutable: true,
        }
    }

    pub const fn immutable(field: &'static str, name: &'static str) -> Self {
        Self {
            field,
            name,
            mutable: false,
        }
    }
}

/// Field-to-column table of one entity, in canonical field order.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap {
    pub table: &'static str,
    pub id_column: &'static str,
    pub columns: &'static [Column],
    /// Refreshed with the current time on every patch.
    pub updated_at: Option<&'static str>,
}

impl ColumnMap {
    /// Mutable columns only, in canonical order.
    pub fn writable(&self) -> impl Iterator<Item = &'static Column> {
        self.columns.iter().filter(|c| c.mutable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("patch for {table} contains no updatable fields")]
    Empty { table: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatchStatement<'a> {
    pub sql: String,
    /// Bound in placeholder order; the row id is always last.
    pub values: Vec<Value<'a>>,
}

/// Present, mutable fields of `candidate` in canonical order.
pub fn present_fields<'a, F: Fields + ?Sized>(
    candidate: &'a F,
    map: &ColumnMap,
) -> Vec<(&'static Column, Value<'a>)> {
    map.writable()
        .filter_map(|c| candidate.field(c.field).map(|v| (c, v)))
        .collect()
}

/// Fails with [`PatchError::Empty`] when the patch would change nothing.
pub fn ensure_not_empty<F: Fields + ?Sized>(candidate: &F, map: &ColumnMap) -> Result<(), PatchError> {
    if map.writable().any(|c| candidate.field(c.field).is_some()) {
        Ok(())
    } else {
        Err(PatchError::Empty { table: map.table })
    }
}

pub fn build_patch<'a, F: Fields + ?Sized>(
    candidate: &'a F,
    map: &ColumnMap,
    id: i64,
) -> Result<PatchStatement<'a>, PatchError> {
    build_patch_at(candidate, map, id, OffsetDateTime::now_utc())
}

/// Same as [`build_patch`] with an explicit `updated_at` timestamp.
pub fn build_patch_at<'a, F: Fields + ?Sized>(
    candidate: &'a F,
    map: &ColumnMap,
    id: i64,
    now: OffsetDateTime,
) -> Result<PatchStatement<'a>, PatchError> {
    let present = present_fields(candidate, map);
    if present.is_empty() {
        return Err(PatchError::Empty { table: map.table });
    }

    let mut values = Vec::with_capacity(present.len() + 2);
    let mut sets = Vec::with_capacity(present.len() + 1);
    for (column, value) in present {
        values.push(value);
        sets.push(format!("{} = ${}", column.name, values.len()));
    }
    if let Some(column) = map.updated_at {
        values.push(Value::Time(now));
        sets.push(format!("{} = ${}", column, values.len()));
    }
    values.push(Value::Int(id));

    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ${}",
        map.table,
        sets.join(", "),
        map.id_column,
        values.len()
    );
    Ok(PatchStatement { sql, values })
}
