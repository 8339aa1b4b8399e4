//! Jobs: create, list with filters, fetch, partial update, delete.

use super::double_option;
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::row::{FromRow, RowExt};
use crate::sql::{FieldMap, Filter, Sql, UpdateData, sql, sql_for_partial_update};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// Job patch fields already match their column names.
pub const JOB_FIELDS: FieldMap = FieldMap::EMPTY;

const RETURNING: &str = "id, title, salary, equity, company_handle";

/// A stored job. `id` is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    /// Fraction of the company offered, serialized as a decimal string.
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

/// Input for [`Job::create`].
///
/// When `id` is given it is checked for duplicates and inserted explicitly,
/// and the id sequence is then advanced past it. Otherwise the database
/// assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    #[serde(default)]
    pub id: Option<i32>,
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// Partial update for a job. `id` and `company_handle` cannot change.
///
/// `salary` and `equity` are nullable: `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub salary: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub equity: Option<Option<Decimal>>,
}

impl JobPatch {
    pub fn into_update_data(self) -> UpdateData {
        let mut data = UpdateData::new();
        data.set_opt("title", self.title)
            .set_opt("salary", self.salary)
            .set_opt("equity", self.equity);
        data
    }
}

/// Criteria for [`Job::find_all`]. Absent fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    /// Case-insensitive substring of the job title.
    pub title: Option<String>,
    pub min_salary: Option<i32>,
    /// When present (either value), keeps only jobs with non-zero equity.
    pub has_equity: Option<bool>,
}

impl JobFilter {
    /// Build the listing query: title, then salary, then equity, ordered by id.
    pub fn to_sql(&self) -> Sql {
        let mut filter = Filter::new();
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            filter.contains("title", title);
        }
        if let Some(min) = self.min_salary {
            filter.at_least("salary", min);
        }
        if self.has_equity.is_some() {
            filter.literal("equity > 0");
        }

        filter
            .build(&format!("SELECT {RETURNING} FROM jobs"), "id")
            .tagged("jobs.find_all")
    }
}

impl Job {
    /// Insert a new job.
    ///
    /// Fails with [`JoblyError::Conflict`] if an explicit `id` is taken and
    /// with [`JoblyError::ForeignKeyViolation`] if the company does not exist.
    pub async fn create(conn: &impl GenericClient, new: &NewJob) -> JoblyResult<Job> {
        if let Some(id) = new.id {
            let mut check = sql("SELECT id FROM jobs WHERE id = ");
            check.tag("jobs.duplicate_check").push_bind(id);
            if check.execute(conn).await? > 0 {
                tracing::debug!(target: "jobly", id, "duplicate job");
                return Err(duplicate(id));
            }
        }

        let mut insert = match new.id {
            Some(id) => {
                let mut q =
                    sql("INSERT INTO jobs (id, title, salary, equity, company_handle) VALUES (");
                q.push_bind(id).push(", ");
                q
            }
            None => sql("INSERT INTO jobs (title, salary, equity, company_handle) VALUES ("),
        };
        insert
            .tag("jobs.create")
            .push_bind(new.title.clone())
            .push(", ")
            .push_bind(new.salary)
            .push(", ")
            .push_bind(new.equity)
            .push(", ")
            .push_bind(new.company_handle.clone())
            .push(") RETURNING ")
            .push(RETURNING);

        let job: Job = insert.fetch_one_as(conn).await.map_err(|e| match (e, new.id) {
            (JoblyError::Conflict(msg), Some(id)) if msg.starts_with("jobs_pkey:") => {
                duplicate(id)
            }
            (other, _) => other,
        })?;

        if new.id.is_some() {
            // An explicit id bypasses the serial sequence; move it past the highest id.
            let mut sync =
                sql("SELECT setval(pg_get_serial_sequence('jobs', 'id'), (SELECT MAX(id) FROM jobs))");
            sync.tag("jobs.sync_sequence");
            sync.execute(conn).await?;
        }
        Ok(job)
    }

    /// All jobs matching `filter`, ordered by id.
    pub async fn find_all(conn: &impl GenericClient, filter: &JobFilter) -> JoblyResult<Vec<Job>> {
        filter.to_sql().fetch_all_as(conn).await
    }

    /// All jobs of one company, ordered by id.
    pub async fn find_by_company(
        conn: &impl GenericClient,
        company_handle: &str,
    ) -> JoblyResult<Vec<Job>> {
        let mut q = sql(format!("SELECT {RETURNING} FROM jobs WHERE company_handle = "));
        q.tag("jobs.find_by_company")
            .push_bind(company_handle.to_string())
            .push(" ORDER BY id");
        q.fetch_all_as(conn).await
    }

    /// Fetch one job by id.
    pub async fn get(conn: &impl GenericClient, id: i32) -> JoblyResult<Job> {
        let mut q = sql(format!("SELECT {RETURNING} FROM jobs WHERE id = "));
        q.tag("jobs.get").push_bind(id);

        q.fetch_opt_as(conn).await?.ok_or_else(|| not_found(id))
    }

    /// Update only the fields present in `patch`.
    pub async fn update(conn: &impl GenericClient, id: i32, patch: JobPatch) -> JoblyResult<Job> {
        let set = sql_for_partial_update(patch.into_update_data(), &JOB_FIELDS)?;

        let mut q = sql("UPDATE jobs SET ");
        q.tag("jobs.update");
        q.push_sql(set.into_sql());
        q.push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(RETURNING);

        q.fetch_opt_as(conn).await?.ok_or_else(|| not_found(id))
    }

    pub async fn remove(conn: &impl GenericClient, id: i32) -> JoblyResult<()> {
        let mut q = sql("DELETE FROM jobs WHERE id = ");
        q.tag("jobs.remove").push_bind(id);

        if q.execute(conn).await? == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

fn duplicate(id: i32) -> JoblyError {
    JoblyError::conflict(format!("Duplicate job: {id}"))
}

fn not_found(id: i32) -> JoblyError {
    tracing::debug!(target: "jobly", id, "job not found");
    JoblyError::not_found(format!("No job: {id}"))
}
