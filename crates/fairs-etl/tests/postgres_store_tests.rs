//! PostgreSQL store tests against a PostGIS container
//!
//! Run with `cargo test -p fairs-etl --test postgres_store_tests -- --ignored`.

use fairs_common::TracingFailureLog;
use fairs_etl::dataset::{dataset_for, Dataset};
use fairs_etl::fairs::FairLoader;
use fairs_etl::store::PgFairStore;
use fairs_etl::{EtlError, SupportedFile};
use serial_test::serial;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use testcontainers::core::IntoContainerPort;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;

const HEADER: &str = "AREAP,SETCENS,SUBPREFE,CODSUBPREF,REGIAO5,REGIAO8,DISTRITO,CODDIST,NUMERO,NOME_FEIRA,REGISTRO,LOGRADOURO,BAIRRO,REFERENCIA,LAT,LONG";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("fairs_etl=debug")
        .with_test_writer()
        .try_init();
}

async fn start_postgis() -> (ContainerAsync<Postgres>, PgPool) {
    let container = Postgres::default()
        .with_name("postgis/postgis")
        .with_tag("16-3.4-alpine")
        .start()
        .await
        .expect("Failed to start PostGIS container");

    let host = container.get_host().await.expect("Failed to get container host");
    let port = container
        .get_host_port_ipv4(5432.tcp())
        .await
        .expect("Failed to get container port");

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&format!("postgresql://postgres:postgres@{}:{}/postgres", host, port))
        .await
        .expect("Failed to connect to PostgreSQL");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    (container, pool)
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
#[serial]
#[ignore] // Requires Docker
async fn test_single_row_is_normalized() {
    init_tracing();
    let (_container, pool) = start_postgis().await;

    let dataset = dataset_for(
        SupportedFile::Fairs2014,
        PgFairStore::new(pool.clone()),
        TracingFailureLog,
    );
    let content = format!(
        "{}\n10,100,X,1,R5,R8,D,9,0,Test Fair,ABC123,Main St,Center,Near park,23456789,46912345\n",
        HEADER
    );
    let records = dataset.parse(&content).unwrap();
    dataset.load(&records).await.unwrap();

    let sector_parent: String = sqlx::query_scalar(
        "SELECT a.code FROM census_sectors s JOIN census_areas a ON a.id = s.census_area_id WHERE s.code = '100'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(sector_parent, "10");

    let district_parent: String = sqlx::query_scalar(
        "SELECT b.name FROM districts d JOIN boroughs b ON b.id = d.borough_id WHERE d.name = 'D'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(district_parent, "X");

    let (number, lon, lat): (Option<i32>, f64, f64) = sqlx::query_as(
        "SELECT number, ST_X(coordinates::geometry), ST_Y(coordinates::geometry) FROM fair_addresses",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(number, None);
    assert!((lon - 46.912345).abs() < 1e-6);
    assert!((lat - 23.456789).abs() < 1e-6);

    let (name, pmsp_code): (Option<String>, Option<String>) =
        sqlx::query_as("SELECT name, pmsp_code FROM fairs")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(name.as_deref(), Some("Test Fair"));
    assert_eq!(pmsp_code.as_deref(), Some("ABC123"));
}

#[tokio::test]
#[serial]
#[ignore] // Requires Docker
async fn test_constraint_violation_rolls_back() {
    init_tracing();
    let (_container, pool) = start_postgis().await;

    // A pre-existing area makes the load hit the unique constraint
    sqlx::query("INSERT INTO census_areas (code) VALUES ('10')")
        .execute(&pool)
        .await
        .unwrap();

    let dataset = dataset_for(
        SupportedFile::Fairs2014,
        PgFairStore::new(pool.clone()),
        TracingFailureLog,
    );
    let content = format!(
        "{}\n11,110,X,1,R5,R8,D,9,1,F,1,RUA,B,,1,1\n10,100,X,1,R5,R8,E,8,2,G,2,RUA,B,,1,1\n",
        HEADER
    );
    let records = dataset.parse(&content).unwrap();

    let loader = FairLoader::new(PgFairStore::new(pool.clone()), TracingFailureLog);
    let err = loader.load(&records).await.unwrap_err();

    assert!(matches!(err, EtlError::Insertion));
    assert_eq!(count(&pool, "census_areas").await, 1);
    for table in ["census_sectors", "boroughs", "districts", "fair_addresses", "fairs"] {
        assert_eq!(count(&pool, table).await, 0, "{} should be empty", table);
    }
}

#[tokio::test]
#[serial]
#[ignore] // Requires Docker
async fn test_unknown_district_leaves_null_lookup() {
    init_tracing();
    let (_container, pool) = start_postgis().await;

    let loader = FairLoader::new(PgFairStore::new(pool.clone()), TracingFailureLog);
    let record = [
        ("NOME_FEIRA", "F"),
        ("NUMERO", "7"),
        ("LAT", "0"),
        ("LONG", "0"),
    ]
    .into_iter()
    .collect();

    loader.load(&[record]).await.unwrap();

    let (number, district_id, census_area_id): (Option<i32>, Option<i64>, Option<i64>) =
        sqlx::query_as("SELECT number, district_id, census_area_id FROM fair_addresses")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(number, Some(7));
    assert_eq!(district_id, None);
    assert_eq!(census_area_id, None);
}
