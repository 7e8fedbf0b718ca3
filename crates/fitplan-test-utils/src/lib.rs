//! PostgreSQL fixtures for the catalog query tests.
//!
//! Every test runs in a throwaway database holding an empty `exercises`
//! table ([`CATALOG_FIXTURE_SCHEMA`]). The server behind those databases is
//! `FITPLAN_TEST_PG_URL` when set, otherwise one testcontainers Postgres
//! started lazily and shared by all tests in the binary.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use testcontainers::ContainerAsync;
use testcontainers::ImageExt;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use fitplan_db::models::Exercise;

/// Shape of the production catalog table. The service never creates it;
/// tests need it to exist.
pub const CATALOG_FIXTURE_SCHEMA: &str = "CREATE TABLE exercises (\
     id TEXT PRIMARY KEY, \
     name TEXT, \
     bodypart TEXT, \
     target TEXT, \
     equipment TEXT, \
     othermuscleslist TEXT[], \
     instructionslist TEXT[], \
     gifurl TEXT, \
     gifid TEXT\
 )";

struct SharedPg {
    /// Server URL without a database name.
    base_url: String,
    /// Dropping the handle stops the container. `None` for an external server.
    _container: Option<ContainerAsync<Postgres>>,
}

static SHARED_PG: OnceCell<SharedPg> = OnceCell::const_new();

async fn init_shared_pg() -> SharedPg {
    if let Ok(url) = std::env::var("FITPLAN_TEST_PG_URL") {
        return SharedPg {
            base_url: url,
            _container: None,
        };
    }

    let container = Postgres::default()
        .with_tag("17")
        .start()
        .await
        .expect("failed to start PostgreSQL container");

    let host = container.get_host().await.expect("failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("failed to get mapped port");

    SharedPg {
        base_url: format!("postgresql://postgres:postgres@{host}:{port}"),
        _container: Some(container),
    }
}

/// Base URL for the shared PostgreSQL, without a database name.
pub async fn pg_url() -> &'static str {
    let shared = SHARED_PG.get_or_init(init_shared_pg).await;
    &shared.base_url
}

async fn maintenance_pool() -> PgPool {
    let maint_url = format!("{}/postgres", pg_url().await);
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&maint_url)
        .await
        .expect("failed to connect to maintenance database")
}

/// Create a temporary database holding an empty `exercises` table.
///
/// Returns `(pool, db_name)`. Call [`drop_test_db`] with the returned
/// `db_name` when the test is done.
pub async fn create_test_db() -> (PgPool, String) {
    let maint_pool = maintenance_pool().await;
    let db_name = format!("fitplan_test_{}", Uuid::new_v4().simple());
    let stmt = format!("CREATE DATABASE {db_name}");
    maint_pool
        .execute(stmt.as_str())
        .await
        .unwrap_or_else(|e| panic!("failed to create temp database {db_name}: {e}"));
    maint_pool.close().await;

    let temp_url = format!("{}/{db_name}", pg_url().await);
    let temp_pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&temp_url)
        .await
        .unwrap_or_else(|e| panic!("failed to connect to temp database {db_name}: {e}"));

    temp_pool
        .execute(CATALOG_FIXTURE_SCHEMA)
        .await
        .expect("catalog fixture schema should apply");

    (temp_pool, db_name)
}

/// Drop a database made by [`create_test_db`]. Open connections are killed
/// first; a database that is already gone is ignored.
pub async fn drop_test_db(db_name: &str) {
    let maint_pool = maintenance_pool().await;

    let terminate = format!(
        "SELECT pg_terminate_backend(pid) \
         FROM pg_stat_activity \
         WHERE datname = '{db_name}' AND pid <> pg_backend_pid()"
    );
    let _ = maint_pool.execute(terminate.as_str()).await;

    let stmt = format!("DROP DATABASE IF EXISTS {db_name}");
    let _ = maint_pool.execute(stmt.as_str()).await;
    maint_pool.close().await;
}

/// Insert a catalog row. Panics on failure.
pub async fn insert_exercise(pool: &PgPool, exercise: &Exercise) {
    sqlx::query(
        "INSERT INTO exercises \
         (id, name, bodypart, target, equipment, othermuscleslist, instructionslist, gifurl, gifid) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(&exercise.id)
    .bind(&exercise.name)
    .bind(&exercise.body_part)
    .bind(&exercise.target)
    .bind(&exercise.equipment)
    .bind(&exercise.other_muscles)
    .bind(&exercise.instructions)
    .bind(&exercise.gif_url)
    .bind(&exercise.gif_id)
    .execute(pool)
    .await
    .unwrap_or_else(|e| panic!("failed to insert exercise {}: {e}", exercise.id));
}

/// A fully populated exercise for fixtures.
pub fn sample_exercise(id: &str, name: &str, body_part: &str, target: &str) -> Exercise {
    Exercise {
        id: id.to_owned(),
        name: name.to_owned(),
        body_part: body_part.to_owned(),
        target: target.to_owned(),
        equipment: "body weight".to_owned(),
        other_muscles: Some(vec!["core".to_owned()]),
        instructions: Some(vec![
            "Get into position.".to_owned(),
            "Perform the movement.".to_owned(),
        ]),
        gif_url: Some(format!("https://example.com/{id}.gif")),
        gif_id: Some(id.to_owned()),
    }
}
