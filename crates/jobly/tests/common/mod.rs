#![allow(dead_code)]

use jobly::{GenericClient, JoblyError, JoblyResult};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// One statement as seen by the database boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub tag: Option<String>,
    pub sql: String,
    pub param_count: usize,
}

/// A `GenericClient` stub that records statements and replays canned results.
///
/// Queries return no rows unless a conflict is scripted; `execute` pops the
/// next scripted row count (default 0).
#[derive(Default)]
pub struct RecordingClient {
    statements: Mutex<Vec<Recorded>>,
    execute_counts: Mutex<VecDeque<u64>>,
    query_conflict: Option<String>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the row counts returned by successive `execute` calls.
    pub fn with_execute_counts(counts: impl IntoIterator<Item = u64>) -> Self {
        Self {
            execute_counts: Mutex::new(counts.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Make every query fail the way a primary key violation from Postgres does.
    pub fn with_query_conflict(self) -> Self {
        self.with_query_conflict_on("companies_pkey")
    }

    /// Make every query fail with a unique violation on `constraint`, shaped
    /// like `JoblyError::from_db_error` output.
    pub fn with_query_conflict_on(mut self, constraint: &str) -> Self {
        self.query_conflict = Some(format!(
            "{constraint}: duplicate key value violates unique constraint \"{constraint}\""
        ));
        self
    }

    pub fn statements(&self) -> Vec<Recorded> {
        self.statements.lock().unwrap().clone()
    }

    pub fn tags(&self) -> Vec<String> {
        self.statements()
            .into_iter()
            .map(|s| s.tag.unwrap_or_default())
            .collect()
    }

    fn record(&self, tag: Option<&str>, sql: &str, params: &[&(dyn ToSql + Sync)]) {
        self.statements.lock().unwrap().push(Recorded {
            tag: tag.map(str::to_string),
            sql: sql.to_string(),
            param_count: params.len(),
        });
    }

    fn rows(&self) -> JoblyResult<Vec<Row>> {
        if let Some(msg) = &self.query_conflict {
            return Err(JoblyError::conflict(msg.clone()));
        }
        Ok(vec![])
    }

    fn next_count(&self) -> u64 {
        self.execute_counts.lock().unwrap().pop_front().unwrap_or(0)
    }
}

impl GenericClient for RecordingClient {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<Vec<Row>> {
        self.record(None, sql, params);
        self.rows()
    }

    async fn query_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<Vec<Row>> {
        self.record(Some(tag), sql, params);
        self.rows()
    }

    async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<Option<Row>> {
        self.record(None, sql, params);
        Ok(self.rows()?.into_iter().next())
    }

    async fn query_opt_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<Option<Row>> {
        self.record(Some(tag), sql, params);
        Ok(self.rows()?.into_iter().next())
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<u64> {
        self.record(None, sql, params);
        Ok(self.next_count())
    }

    async fn execute_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<u64> {
        self.record(Some(tag), sql, params);
        Ok(self.next_count())
    }
}
