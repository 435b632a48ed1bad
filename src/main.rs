//! Catalog API server: ensure the database, migrate, provision the API
//! token, optionally seed demo data, then serve.

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use catalog_api::{auth, fixtures, migration, routes, store, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("catalog_api=info,tower_http=info")),
        )
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/catalog".into());
    store::ensure_database_exists(&database_url).await?;
    let pool = store::connect(&database_url, 5).await?;
    migration::run(&pool).await?;

    match std::env::var("CATALOG_API_TOKEN") {
        Ok(token) if !token.is_empty() => auth::provision_token(&pool, &token, "env").await?,
        _ => auth::ensure_bootstrap_token(&pool).await?,
    }
    if std::env::var("CATALOG_SEED").as_deref() == Ok("1") {
        fixtures::seed_demo(&pool).await?;
    }

    let app = routes::app(AppState::new(pool));
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
