use super::parts::SqlPart;
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::monitor::SqlLogger;
use crate::row::FromRow;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// A bound parameter value.
pub type Param = Arc<dyn ToSql + Sync + Send>;

/// A parameter-safe dynamic SQL builder.
///
/// `Sql` stores SQL pieces and parameters separately and generates `$1, $2, ...`
/// placeholders in the final SQL string. Because both outputs are rendered
/// from the same part list, placeholder `$n` always refers to `params[n - 1]`.
#[must_use]
pub struct Sql {
    parts: Vec<SqlPart>,
    params: Vec<Param>,
    tag: Option<String>,
    logger: SqlLogger,
}

impl Sql {
    /// Create a new builder with an initial SQL fragment.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        Self {
            parts: vec![SqlPart::Raw(initial_sql.into())],
            params: Vec::new(),
            tag: None,
            logger: SqlLogger::default(),
        }
    }

    /// Create an empty builder.
    pub fn empty() -> Self {
        Self {
            parts: Vec::new(),
            params: Vec::new(),
            tag: None,
            logger: SqlLogger::default(),
        }
    }

    /// Associate a tag for logging (consuming version).
    ///
    /// # Example
    /// ```ignore
    /// let companies: Vec<Company> = jobly::sql("SELECT ... FROM companies")
    ///     .tagged("companies.find_all")
    ///     .fetch_all_as(&client)
    ///     .await?;
    /// ```
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Associate a tag for logging.
    pub fn tag(&mut self, tag: impl Into<String>) -> &mut Self {
        self.tag = Some(tag.into());
        self
    }

    /// Replace the statement logger.
    pub fn log_with(&mut self, logger: SqlLogger) -> &mut Self {
        self.logger = logger;
        self
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(SqlPart::Raw(sql.to_string())),
        }
        self
    }

    /// Append a parameter placeholder and bind its value.
    pub fn push_bind<T>(&mut self, value: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.push_bind_value(Arc::new(value))
    }

    /// Append a parameter placeholder for an already type-erased value.
    pub fn push_bind_value(&mut self, value: Param) -> &mut Self {
        self.parts.push(SqlPart::Param);
        self.params.push(value);
        self
    }

    /// Append another `Sql` fragment, consuming it.
    ///
    /// The fragment's placeholders are renumbered to follow the ones already
    /// in `self`.
    pub fn push_sql(&mut self, other: Sql) -> &mut Self {
        for part in other.parts {
            match part {
                SqlPart::Raw(s) => {
                    self.push(&s);
                }
                SqlPart::Param => self.parts.push(SqlPart::Param),
            }
        }
        self.params.extend(other.params);
        if self.tag.is_none() {
            self.tag = other.tag;
        }
        self
    }

    /// Render SQL with `$1, $2, ...` placeholders.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        let mut idx: usize = 0;
        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Param => {
                    idx += 1;
                    out.push('$');
                    out.push_str(&idx.to_string());
                }
            }
        }
        out
    }

    /// Bound values in placeholder order.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect()
    }

    pub fn tag_name(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    fn validate(&self) -> JoblyResult<()> {
        let placeholder_count = self
            .parts
            .iter()
            .filter(|p| matches!(p, SqlPart::Param))
            .count();

        if placeholder_count != self.params.len() {
            let params_len = self.params.len();
            return Err(JoblyError::Validation(format!(
                "Sql: placeholders({placeholder_count}) != params({params_len})"
            )));
        }
        Ok(())
    }

    fn prepare(&self) -> JoblyResult<(String, Vec<&(dyn ToSql + Sync)>)> {
        self.validate()?;
        let sql = self.to_sql();
        let params = self.params_ref();
        self.logger.log(self.tag.as_deref(), &sql, params.len());
        Ok((sql, params))
    }

    /// Execute the built SQL and return all rows mapped to `T`.
    pub async fn fetch_all_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<Vec<T>> {
        let (sql, params) = self.prepare()?;
        let rows = match self.tag.as_deref() {
            Some(tag) => conn.query_tagged(tag, &sql, &params).await?,
            None => conn.query(&sql, &params).await?,
        };
        rows.iter().map(T::from_row).collect()
    }

    /// Execute the built SQL and return the **first** row mapped to `T`.
    ///
    /// Returns [`JoblyError::NotFound`] if no rows are returned.
    pub async fn fetch_one_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<T> {
        self.fetch_opt_as(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found("Expected one row, got none"))
    }

    /// Execute the built SQL and return at most one row mapped to `T`.
    pub async fn fetch_opt_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> JoblyResult<Option<T>> {
        let (sql, params) = self.prepare()?;
        let row = match self.tag.as_deref() {
            Some(tag) => conn.query_opt_tagged(tag, &sql, &params).await?,
            None => conn.query_opt(&sql, &params).await?,
        };
        row.as_ref().map(T::from_row).transpose()
    }

    /// Execute the built SQL and return affected row count.
    pub async fn execute(&self, conn: &impl GenericClient) -> JoblyResult<u64> {
        let (sql, params) = self.prepare()?;
        match self.tag.as_deref() {
            Some(tag) => conn.execute_tagged(tag, &sql, &params).await,
            None => conn.execute(&sql, &params).await,
        }
    }
}

impl std::fmt::Debug for Sql {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sql")
            .field("sql", &self.to_sql())
            .field("params", &self.params)
            .field("tag", &self.tag)
            .finish()
    }
}
