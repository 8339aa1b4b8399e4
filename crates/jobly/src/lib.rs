//! # jobly
//!
//! PostgreSQL data access for companies and the jobs they post.
//!
//! ## Features
//!
//! - **Partial updates**: [`sql_for_partial_update`] turns only the supplied
//!   fields into a `SET` clause, translating field names through a static
//!   [`FieldMap`]
//! - **Filtered listing**: [`Filter`] builds `WHERE` conjunctions whose values
//!   are always bound as parameters
//! - **Transaction-friendly**: every operation takes a [`GenericClient`], so a
//!   caller-managed transaction works anywhere a client does
//! - **Typed errors**: validation, conflict and not-found outcomes are distinct
//!   [`JoblyError`] variants for the caller to map onto responses
//!
//! ## Example
//!
//! ```ignore
//! use jobly::{Company, CompanyFilter, CompanyPatch, DatabaseConfig};
//!
//! let client = jobly::connect(&DatabaseConfig::from_env()?).await?;
//!
//! let filter = CompanyFilter { name: Some("net".into()), ..Default::default() };
//! let companies = Company::find_all(&client, &filter).await?;
//!
//! let patch = CompanyPatch { num_employees: Some(Some(42)), ..Default::default() };
//! let updated = Company::update(&client, "c1", patch).await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod monitor;
pub mod row;
pub mod sql;

pub use client::GenericClient;
pub use config::{DatabaseConfig, connect};
pub use error::{JoblyError, JoblyResult};
pub use models::{
    Company, CompanyDetail, CompanyFilter, CompanyPatch, Job, JobFilter, JobPatch, NewCompany,
    NewJob,
};
pub use monitor::SqlLogger;
pub use row::{FromRow, RowExt};
pub use sql::{
    FieldMap, Filter, Param, SetClause, Sql, UpdateData, check_range, sql, sql_for_partial_update,
};
