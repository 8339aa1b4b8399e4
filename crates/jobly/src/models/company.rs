//! Companies: create, list with filters, fetch, partial update, delete.

use super::double_option;
use super::job::Job;
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::row::{FromRow, RowExt};
use crate::sql::{FieldMap, Filter, Sql, UpdateData, check_range, sql, sql_for_partial_update};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// Patch field names whose column name differs.
pub const COMPANY_FIELDS: FieldMap =
    FieldMap::new(&[("numEmployees", "num_employees"), ("logoUrl", "logo_url")]);

const RETURNING: &str = "handle, name, description, num_employees, logo_url";

/// A stored company. `handle` is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("num_employees")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

/// Input for [`Company::create`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// A company with its jobs, as returned by [`Company::get_with_jobs`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<Job>,
}

/// Partial update for a company.
///
/// `num_employees` and `logo_url` are nullable: `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub num_employees: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub logo_url: Option<Option<String>>,
}

impl CompanyPatch {
    /// Supplied fields in declaration order, keyed by their camelCase names.
    pub fn into_update_data(self) -> UpdateData {
        let mut data = UpdateData::new();
        data.set_opt("name", self.name)
            .set_opt("description", self.description)
            .set_opt("numEmployees", self.num_employees)
            .set_opt("logoUrl", self.logo_url);
        data
    }
}

/// Criteria for [`Company::find_all`]. Absent fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyFilter {
    /// Case-insensitive substring of the company name.
    pub name: Option<String>,
    pub min_employees: Option<i32>,
    pub max_employees: Option<i32>,
}

impl CompanyFilter {
    /// Build the listing query: name, then employee bounds, ordered by name.
    ///
    /// Fails with a validation error when `min_employees > max_employees`.
    pub fn to_sql(&self) -> JoblyResult<Sql> {
        check_range(
            self.min_employees,
            self.max_employees,
            "Maximum employees must be greater than minimum",
        )?;

        let mut filter = Filter::new();
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            filter.contains("name", name);
        }
        if let Some(min) = self.min_employees {
            filter.at_least("num_employees", min);
        }
        if let Some(max) = self.max_employees {
            filter.at_most("num_employees", max);
        }

        Ok(filter
            .build(&format!("SELECT {RETURNING} FROM companies"), "name")
            .tagged("companies.find_all"))
    }
}

impl Company {
    /// Insert a new company.
    ///
    /// Fails with [`JoblyError::Conflict`] if the handle is taken, whether the
    /// duplicate is seen by the pre-check or by the primary key constraint.
    /// A clash on another unique column keeps the database message.
    pub async fn create(conn: &impl GenericClient, new: &NewCompany) -> JoblyResult<Company> {
        let mut check = sql("SELECT handle FROM companies WHERE handle = ");
        check
            .tag("companies.duplicate_check")
            .push_bind(new.handle.clone());
        if check.execute(conn).await? > 0 {
            tracing::debug!(target: "jobly", handle = %new.handle, "duplicate company");
            return Err(duplicate(&new.handle));
        }

        let mut insert = sql(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url) VALUES (",
        );
        insert
            .tag("companies.create")
            .push_bind(new.handle.clone())
            .push(", ")
            .push_bind(new.name.clone())
            .push(", ")
            .push_bind(new.description.clone())
            .push(", ")
            .push_bind(new.num_employees)
            .push(", ")
            .push_bind(new.logo_url.clone())
            .push(") RETURNING ")
            .push(RETURNING);

        insert.fetch_one_as(conn).await.map_err(|e| match e {
            JoblyError::Conflict(msg) if msg.starts_with("companies_pkey:") => {
                duplicate(&new.handle)
            }
            other => other,
        })
    }

    /// All companies matching `filter`, ordered by name.
    pub async fn find_all(
        conn: &impl GenericClient,
        filter: &CompanyFilter,
    ) -> JoblyResult<Vec<Company>> {
        filter.to_sql()?.fetch_all_as(conn).await
    }

    /// Fetch one company by handle.
    pub async fn get(conn: &impl GenericClient, handle: &str) -> JoblyResult<Company> {
        let mut q = sql(format!("SELECT {RETURNING} FROM companies WHERE handle = "));
        q.tag("companies.get").push_bind(handle.to_string());

        q.fetch_opt_as(conn).await?.ok_or_else(|| not_found(handle))
    }

    /// Fetch one company together with its jobs.
    pub async fn get_with_jobs(
        conn: &impl GenericClient,
        handle: &str,
    ) -> JoblyResult<CompanyDetail> {
        let company = Self::get(conn, handle).await?;
        let jobs = Job::find_by_company(conn, handle).await?;
        Ok(CompanyDetail { company, jobs })
    }

    /// Update only the fields present in `patch`.
    ///
    /// An empty patch is a validation error and is rejected before any
    /// statement is sent.
    pub async fn update(
        conn: &impl GenericClient,
        handle: &str,
        patch: CompanyPatch,
    ) -> JoblyResult<Company> {
        let set = sql_for_partial_update(patch.into_update_data(), &COMPANY_FIELDS)?;

        let mut q = sql("UPDATE companies SET ");
        q.tag("companies.update");
        q.push_sql(set.into_sql());
        q.push(" WHERE handle = ")
            .push_bind(handle.to_string())
            .push(" RETURNING ")
            .push(RETURNING);

        q.fetch_opt_as(conn).await?.ok_or_else(|| not_found(handle))
    }

    /// Delete a company (its jobs go with it through the foreign key).
    pub async fn remove(conn: &impl GenericClient, handle: &str) -> JoblyResult<()> {
        let mut q = sql("DELETE FROM companies WHERE handle = ");
        q.tag("companies.remove").push_bind(handle.to_string());

        if q.execute(conn).await? == 0 {
            return Err(not_found(handle));
        }
        Ok(())
    }
}

fn duplicate(handle: &str) -> JoblyError {
    JoblyError::conflict(format!("Duplicate company: {handle}"))
}

fn not_found(handle: &str) -> JoblyError {
    tracing::debug!(target: "jobly", handle, "company not found");
    JoblyError::not_found(format!("No company: {handle}"))
}
