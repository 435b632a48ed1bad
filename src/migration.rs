//! Embedded versioned migrations. Applied versions are tracked in
//! schema_migrations; each pending migration runs in its own transaction.

use std::collections::HashSet;

use sqlx::PgPool;

use crate::error::AppError;

struct Migration {
    version: i32,
    label: &'static str,
    statements: &'static [&'static str],
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        label: "create manufacturer",
        statements: &[
            "CREATE TABLE manufacturer (
                id SERIAL PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                description TEXT NOT NULL,
                country_code VARCHAR(3) NOT NULL,
                listed_date TIMESTAMPTZ NOT NULL
            )",
        ],
    },
    Migration {
        version: 2,
        label: "create product",
        statements: &[
            // No ON DELETE action: the cascade from manufacturer to product
            // is an explicit application-level transaction.
            "CREATE TABLE product (
                id SERIAL PRIMARY KEY,
                mpn VARCHAR(255) NOT NULL,
                name VARCHAR(255) NOT NULL,
                description TEXT NOT NULL,
                issue_date TIMESTAMPTZ NOT NULL,
                manufacturer_id INTEGER NOT NULL REFERENCES manufacturer (id)
            )",
            "CREATE INDEX idx_product_manufacturer ON product (manufacturer_id)",
            "CREATE INDEX idx_product_issue_date ON product (issue_date)",
        ],
    },
    Migration {
        version: 3,
        label: "create api_token",
        statements: &[
            "CREATE TABLE api_token (
                id SERIAL PRIMARY KEY,
                token VARCHAR(120) UNIQUE NOT NULL,
                label TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
        ],
    },
];

/// Apply all pending migrations.
pub async fn run(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await?;

    let applied: HashSet<i32> =
        sqlx::query_scalar("SELECT version FROM schema_migrations ORDER BY version")
            .fetch_all(pool)
            .await?
            .into_iter()
            .collect();

    for migration in MIGRATIONS {
        if applied.contains(&migration.version) {
            continue;
        }
        let mut tx = pool.begin().await?;
        for statement in migration.statements {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        sqlx::query("INSERT INTO schema_migrations (version) VALUES ($1)")
            .bind(migration.version)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::info!(
            version = migration.version,
            label = migration.label,
            "migration applied"
        );
    }
    Ok(())
}
