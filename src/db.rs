use crate::config::DatabaseConfig;
use eyre::{Error, WrapErr, bail};
use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;
use tracing::{debug, info};

const MYSQL_SCHEMA: &str = include_str!("../schema/mysql.sql");
#[cfg(feature = "sqlite")]
const SQLITE_SCHEMA: &str = include_str!("../schema/sqlite.sql");

pub async fn connect(config: &DatabaseConfig) -> Result<AnyPool, Error> {
    sqlx::any::install_default_drivers();
    let pool = AnyPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
        .wrap_err("cannot connect to database")?;
    info!(
        max_connections = config.max_connections,
        "connected to database"
    );
    Ok(pool)
}

fn schema_for(url: &str) -> Result<&'static str, Error> {
    match url.split(':').next() {
        Some("mysql") => Ok(MYSQL_SCHEMA),
        #[cfg(feature = "sqlite")]
        Some("sqlite") => Ok(SQLITE_SCHEMA),
        _ => bail!("no schema available for database url {url:?}"),
    }
}

/// Create the tables for the backend designated by `url` if they do not exist yet.
pub async fn init_schema(pool: &AnyPool, url: &str) -> Result<(), Error> {
    let statements = schema_for(url)?
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty());
    for statement in statements {
        debug!(statement, "applying schema statement");
        sqlx::query(statement)
            .execute(pool)
            .await
            .wrap_err("cannot create database schema")?;
    }
    info!("database schema is ready");
    Ok(())
}

#[test]
fn test_schema_selection() {
    assert!(schema_for("mysql://user@localhost/thesis").is_ok());
    assert!(schema_for("postgres://localhost/thesis").is_err());
    #[cfg(feature = "sqlite")]
    assert!(schema_for("sqlite::memory:").is_ok());
}

#[cfg(test)]
#[tokio::test]
async fn test_init_schema_is_idempotent() {
    let config = crate::testing::database_config();
    let pool = connect(&config).await.unwrap();
    init_schema(&pool, &config.url).await.unwrap();
    init_schema(&pool, &config.url).await.unwrap();
    let tables: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN \
         ('degrees', 'students', 'teachers', 'proposals', 'applications')",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(tables, 5);
}
