//! Company operations against a recording client stub.

mod common;

use common::RecordingClient;
use jobly::{Company, CompanyFilter, CompanyPatch, JoblyError, NewCompany};

fn new_company() -> NewCompany {
    NewCompany {
        handle: "new".into(),
        name: "New".into(),
        description: "New Description".into(),
        num_employees: Some(1),
        logo_url: Some("http://new.img".into()),
    }
}

/************************************** create */

#[tokio::test]
async fn create_duplicate_is_conflict_without_insert() {
    let client = RecordingClient::with_execute_counts([1]);

    let err = Company::create(&client, &new_company()).await.unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(err.to_string(), "Conflict: Duplicate company: new");

    let statements = client.statements();
    assert_eq!(statements.len(), 1);
    assert_eq!(
        statements[0].sql,
        "SELECT handle FROM companies WHERE handle = $1"
    );
    assert_eq!(statements[0].tag.as_deref(), Some("companies.duplicate_check"));
}

#[tokio::test]
async fn create_unique_violation_from_database_is_conflict() {
    let client = RecordingClient::new().with_query_conflict();

    let err = Company::create(&client, &new_company()).await.unwrap_err();
    assert!(matches!(&err, JoblyError::Conflict(msg) if msg == "Duplicate company: new"));
    assert_eq!(
        client.tags(),
        vec!["companies.duplicate_check", "companies.create"]
    );
}

#[tokio::test]
async fn create_other_unique_violation_keeps_database_message() {
    let client = RecordingClient::new().with_query_conflict_on("companies_name_key");

    let err = Company::create(&client, &new_company()).await.unwrap_err();
    assert!(err.is_conflict());
    assert!(matches!(&err, JoblyError::Conflict(msg) if msg.starts_with("companies_name_key:")));
}

#[tokio::test]
async fn create_binds_every_column() {
    let client = RecordingClient::new();

    let _ = Company::create(&client, &new_company()).await;

    let insert = &client.statements()[1];
    assert_eq!(
        insert.sql,
        "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING handle, name, description, num_employees, logo_url"
    );
    assert_eq!(insert.param_count, 5);
}

/************************************** find_all */

#[tokio::test]
async fn find_all_without_filter() {
    let client = RecordingClient::new();

    let companies = Company::find_all(&client, &CompanyFilter::default())
        .await
        .unwrap();
    assert!(companies.is_empty());

    let statements = client.statements();
    assert_eq!(
        statements[0].sql,
        "SELECT handle, name, description, num_employees, logo_url FROM companies ORDER BY name"
    );
    assert_eq!(statements[0].param_count, 0);
    assert_eq!(statements[0].tag.as_deref(), Some("companies.find_all"));
}

#[tokio::test]
async fn find_all_with_every_filter() {
    let client = RecordingClient::new();
    let filter = CompanyFilter {
        name: Some("net".into()),
        min_employees: Some(2),
        max_employees: Some(3),
    };

    Company::find_all(&client, &filter).await.unwrap();

    let statements = client.statements();
    assert_eq!(
        statements[0].sql,
        "SELECT handle, name, description, num_employees, logo_url FROM companies \
         WHERE name ILIKE $1 AND num_employees >= $2 AND num_employees <= $3 ORDER BY name"
    );
    assert_eq!(statements[0].param_count, 3);
}

#[tokio::test]
async fn find_all_min_greater_than_max_never_reaches_database() {
    let client = RecordingClient::new();
    let filter = CompanyFilter {
        min_employees: Some(100),
        max_employees: Some(10),
        ..Default::default()
    };

    let err = Company::find_all(&client, &filter).await.unwrap_err();
    assert!(err.is_validation());
    assert!(client.statements().is_empty());
}

#[test]
fn filter_query_binds_name_pattern() {
    let filter = CompanyFilter {
        name: Some("net".into()),
        ..Default::default()
    };
    let q = filter.to_sql().unwrap();

    assert_eq!(
        q.to_sql(),
        "SELECT handle, name, description, num_employees, logo_url FROM companies \
         WHERE name ILIKE $1 ORDER BY name"
    );
    assert_eq!(format!("{:?}", q.params()[0]), "\"%net%\"");
}

#[test]
fn filter_query_bounds_only() {
    let filter = CompanyFilter {
        max_employees: Some(10),
        ..Default::default()
    };
    let q = filter.to_sql().unwrap();
    assert!(q.to_sql().ends_with("WHERE num_employees <= $1 ORDER BY name"));
    assert_eq!(format!("{:?}", q.params()[0]), "10");
}

/************************************** get */

#[tokio::test]
async fn get_missing_is_not_found() {
    let client = RecordingClient::new();

    let err = Company::get(&client, "nope").await.unwrap_err();
    assert!(matches!(&err, JoblyError::NotFound(msg) if msg == "No company: nope"));
}

#[tokio::test]
async fn get_with_jobs_missing_company_skips_jobs_query() {
    let client = RecordingClient::new();

    let err = Company::get_with_jobs(&client, "nope").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(client.tags(), vec!["companies.get"]);
}

/************************************** update */

#[tokio::test]
async fn update_sends_only_supplied_fields() {
    let client = RecordingClient::new();
    let patch = CompanyPatch {
        name: Some("New".into()),
        logo_url: Some(None),
        ..Default::default()
    };

    let err = Company::update(&client, "c1", patch).await.unwrap_err();
    assert!(err.is_not_found());

    let statements = client.statements();
    assert_eq!(
        statements[0].sql,
        "UPDATE companies SET \"name\"=$1, \"logo_url\"=$2 WHERE handle = $3 \
         RETURNING handle, name, description, num_employees, logo_url"
    );
    assert_eq!(statements[0].param_count, 3);
    assert_eq!(statements[0].tag.as_deref(), Some("companies.update"));
}

#[tokio::test]
async fn update_with_no_data_is_validation_error() {
    let client = RecordingClient::new();

    let err = Company::update(&client, "c1", CompanyPatch::default())
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(client.statements().is_empty());
}

/************************************** remove */

#[tokio::test]
async fn remove_existing() {
    let client = RecordingClient::with_execute_counts([1]);

    Company::remove(&client, "c1").await.unwrap();
    assert_eq!(
        client.statements()[0].sql,
        "DELETE FROM companies WHERE handle = $1"
    );
}

#[tokio::test]
async fn remove_missing_is_not_found() {
    let client = RecordingClient::new();

    let err = Company::remove(&client, "nope").await.unwrap_err();
    assert!(err.is_not_found());
}
