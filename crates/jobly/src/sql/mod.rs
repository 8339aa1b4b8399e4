//! Dynamic SQL building.
//!
//! - [`Sql`] composes statement text and bound values without manually
//!   tracking placeholder indices.
//! - [`sql_for_partial_update`] renders the SET clause of a partial update.
//! - [`Filter`] renders the WHERE clause of a filtered listing.
//!
//! # Example
//!
//! ```ignore
//! use jobly::sql;
//!
//! let mut q = sql("SELECT handle, name FROM companies WHERE handle = ");
//! q.push_bind(handle.to_string());
//!
//! let company: Option<Company> = q.fetch_opt_as(&conn).await?;
//! ```

mod builder;
mod filter;
mod parts;
mod partial;


pub use builder::{Param, Sql};
pub use filter::{Filter, check_range};
pub use partial::{FieldMap, SetClause, UpdateData, sql_for_partial_update};

/// Start building a SQL statement.
pub fn sql(initial_sql: impl Into<String>) -> Sql {
    Sql::new(initial_sql)
}
