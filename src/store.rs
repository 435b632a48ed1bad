//! Database bootstrap: create the target database when missing, build the
//! connection pool.

use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};

use crate::error::AppError;

pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Split a database URL into the admin URL (same server, `postgres`
/// database) and the target database name.
fn split_database_url(database_url: &str) -> Result<(String, String), AppError> {
    let path_start = database_url
        .rfind('/')
        .ok_or_else(|| AppError::BadRequest("DATABASE_URL has no database path".into()))?
        + 1;
    let db_name = database_url[path_start..]
        .split('?')
        .next()
        .unwrap_or("")
        .trim()
        .to_string();
    let admin_url = format!("{}postgres", &database_url[..path_start]);
    Ok((admin_url, db_name))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Ensure the database in `database_url` exists, creating it via the
/// server's `postgres` database when not. Call before building the pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = split_database_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let options = PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {e}")))?;
    let mut conn = options.connect().await?;
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_name)
            .fetch_one(&mut conn)
            .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %db_name, "database created");
    }
    Ok(())
}
