//! WHERE-clause assembly for filtered listing.
//!
//! A [`Filter`] collects predicates in the order they are added and renders
//! them as one conjunction. Values are always bound as parameters; only the
//! static column names and operators become SQL text.
//!
//! ```ignore
//! let mut filter = Filter::new();
//! filter.contains("name", "net").at_least("num_employees", 100_i32);
//!
//! let q = filter.build("SELECT handle, name FROM companies", "name");
//! assert_eq!(
//!     q.to_sql(),
//!     "SELECT handle, name FROM companies WHERE name ILIKE $1 AND num_employees >= $2 ORDER BY name"
//! );
//! ```

use super::builder::{Param, Sql};
use crate::error::{JoblyError, JoblyResult};
use std::sync::Arc;
use tokio_postgres::types::ToSql;

#[derive(Debug, Clone)]
enum Predicate {
    /// `column <op> $n`
    Compare {
        column: &'static str,
        op: &'static str,
        value: Param,
    },
    /// Fixed SQL with no bound value, e.g. `equity > 0`.
    Literal(&'static str),
}

/// An ordered conjunction of predicates.
#[derive(Debug, Default, Clone)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    fn compare(&mut self, column: &'static str, op: &'static str, value: Param) -> &mut Self {
        self.predicates.push(Predicate::Compare { column, op, value });
        self
    }

    /// Case-insensitive substring match: `column ILIKE '%text%'`.
    ///
    /// `%`, `_` and `\` in `text` match literally.
    pub fn contains(&mut self, column: &'static str, text: &str) -> &mut Self {
        let pattern = format!("%{}%", escape_like(text));
        self.compare(column, "ILIKE", Arc::new(pattern))
    }

    /// Inclusive lower bound: `column >= value`.
    pub fn at_least<T>(&mut self, column: &'static str, value: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.compare(column, ">=", Arc::new(value))
    }

    /// Inclusive upper bound: `column <= value`.
    pub fn at_most<T>(&mut self, column: &'static str, value: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.compare(column, "<=", Arc::new(value))
    }

    /// A predicate that binds nothing.
    pub fn literal(&mut self, predicate: &'static str) -> &mut Self {
        self.predicates.push(Predicate::Literal(predicate));
        self
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Append ` WHERE p1 AND p2 ...` to `sql`. No-op when there are no predicates.
    pub fn push_where(self, sql: &mut Sql) {
        if self.predicates.is_empty() {
            return;
        }
        sql.push(" WHERE ");
        for (i, predicate) in self.predicates.into_iter().enumerate() {
            if i > 0 {
                sql.push(" AND ");
            }
            match predicate {
                Predicate::Compare { column, op, value } => {
                    sql.push(column)
                        .push(" ")
                        .push(op)
                        .push(" ")
                        .push_bind_value(value);
                }
                Predicate::Literal(text) => {
                    sql.push(text);
                }
            }
        }
    }

    /// `base [WHERE ...] ORDER BY order_by`.
    pub fn build(self, base: &str, order_by: &str) -> Sql {
        let mut sql = Sql::new(base);
        self.push_where(&mut sql);
        sql.push(" ORDER BY ").push(order_by);
        sql
    }
}

/// Reject a range whose lower bound exceeds its upper bound.
///
/// Passes when either side is absent.
pub fn check_range<T: PartialOrd>(
    min: Option<T>,
    max: Option<T>,
    message: &str,
) -> JoblyResult<()> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(JoblyError::validation(message)),
        _ => Ok(()),
    }
}

fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
