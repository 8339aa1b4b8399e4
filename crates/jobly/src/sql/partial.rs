//! Partial-update SET clause generation.
//!
//! [`sql_for_partial_update`] turns an ordered set of `field -> value` pairs
//! into `"col1"=$1, "col2"=$2, ...` plus the matching value list. It knows
//! nothing about any particular table: callers supply a [`FieldMap`] for the
//! fields whose column name differs from the field name.
//!
//! ```ignore
//! const FIELDS: FieldMap = FieldMap::new(&[("numEmployees", "num_employees")]);
//!
//! let mut data = UpdateData::new();
//! data.set("name", "New".to_string()).set("numEmployees", Some(5_i32));
//!
//! let set = sql_for_partial_update(data, &FIELDS)?;
//! assert_eq!(set.set_cols(), r#""name"=$1, "num_employees"=$2"#);
//! ```

use super::builder::{Param, Sql};
use crate::error::{JoblyError, JoblyResult};
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// Static translation from logical field names to physical column names.
///
/// Only names that differ need an entry; unknown fields map to themselves.
#[derive(Debug, Clone, Copy)]
pub struct FieldMap(&'static [(&'static str, &'static str)]);

impl FieldMap {
    /// A map with no renames.
    pub const EMPTY: FieldMap = FieldMap(&[]);

    pub const fn new(pairs: &'static [(&'static str, &'static str)]) -> Self {
        Self(pairs)
    }

    /// Resolve the column for `field`, falling back to `field` itself.
    pub fn column<'a>(&self, field: &'a str) -> &'a str {
        self.0
            .iter()
            .find(|(logical, _)| *logical == field)
            .map_or(field, |(_, physical)| *physical)
    }
}

/// An ordered mapping of logical field names to new values.
///
/// Insertion order is preserved and determines placeholder numbering. Setting
/// a field twice replaces its value but keeps its original position.
#[derive(Debug, Default, Clone)]
pub struct UpdateData {
    fields: Vec<(String, Param)>,
}

impl UpdateData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `field` to `value`. Use `None::<T>` to write SQL `NULL`.
    pub fn set<T>(&mut self, field: impl Into<String>, value: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.set_value(field.into(), Arc::new(value))
    }

    /// Set `field` only when `value` is `Some` (`None` leaves it out entirely).
    pub fn set_opt<T>(&mut self, field: impl Into<String>, value: Option<T>) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        if let Some(v) = value {
            self.set(field, v);
        }
        self
    }

    fn set_value(&mut self, field: String, value: Param) -> &mut Self {
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field, value)),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

/// The rendered SET clause of a partial update.
#[derive(Debug)]
pub struct SetClause {
    sql: Sql,
}

impl SetClause {
    /// `"col1"=$1, "col2"=$2, ...` numbered from 1.
    pub fn set_cols(&self) -> String {
        self.sql.to_sql()
    }

    /// Values in placeholder order: `values()[i]` binds `$i+1`.
    pub fn values(&self) -> &[Param] {
        self.sql.params()
    }

    /// Number of assignments in the clause.
    pub fn len(&self) -> usize {
        self.sql.params().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sql.params().is_empty()
    }

    /// The clause as an `Sql` fragment, for appending into a full statement.
    pub fn into_sql(self) -> Sql {
        self.sql
    }
}

/// Quote a column name as a SQL identifier, escaping embedded `"`.
pub(crate) fn quote_ident(name: &str) -> JoblyResult<String> {
    if name.is_empty() {
        return Err(JoblyError::validation("Column name cannot be empty"));
    }
    if name.contains('\0') {
        return Err(JoblyError::validation(
            "Column name cannot contain NUL character",
        ));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Build the SET clause for a partial update.
///
/// Fails with [`JoblyError::Validation`] when `data` is empty; an UPDATE
/// with nothing to set is always a caller error.
pub fn sql_for_partial_update(data: UpdateData, field_map: &FieldMap) -> JoblyResult<SetClause> {
    if data.is_empty() {
        return Err(JoblyError::validation("No data"));
    }

    let mut sql = Sql::empty();
    for (i, (field, value)) in data.fields.into_iter().enumerate() {
        if i > 0 {
            sql.push(", ");
        }
        sql.push(&quote_ident(field_map.column(&field))?)
            .push("=")
            .push_bind_value(value);
    }
    Ok(SetClause { sql })
}
