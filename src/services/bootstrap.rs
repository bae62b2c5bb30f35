use chrono::Utc;
use sqlx::Row;

use crate::database::DbPool;
use crate::utils::crypto::hash_password;
use crate::utils::error::AppResult;

const DEFAULT_CATEGORY_NAME: &str = "general";

// Runs once at startup so a fresh database serves useful responses.
pub async fn ensure_directory_defaults(pool: &DbPool) -> AppResult<()> {
    ensure_category(
        pool,
        DEFAULT_CATEGORY_NAME,
        Some("Servers without a more specific home"),
    )
    .await?;

    match (
        std::env::var("ADMIN_USERNAME"),
        std::env::var("ADMIN_PASSWORD"),
    ) {
        (Ok(username), Ok(password)) => ensure_admin_user(pool, &username, &password).await?,
        (Ok(username), Err(_)) => {
            tracing::warn!(
                "ADMIN_PASSWORD not set, skipping admin account for {}",
                username
            );
        }
        _ => {}
    }

    Ok(())
}

async fn ensure_category(pool: &DbPool, name: &str, description: Option<&str>) -> AppResult<()> {
    let existing = sqlx::query("SELECT COUNT(*) as count FROM categories WHERE name = ?")
        .bind(name)
        .fetch_one(pool.as_ref())
        .await?
        .get::<i64, _>("count");

    if existing > 0 {
        return Ok(());
    }

    sqlx::query("INSERT INTO categories (name, description, created_at) VALUES (?, ?, ?)")
        .bind(name)
        .bind(description)
        .bind(Utc::now().to_rfc3339())
        .execute(pool.as_ref())
        .await?;

    tracing::info!("Created default category {}", name);

    Ok(())
}

async fn ensure_admin_user(pool: &DbPool, username: &str, password: &str) -> AppResult<()> {
    let existing = sqlx::query("SELECT COUNT(*) as count FROM users WHERE username = ?")
        .bind(username)
        .fetch_one(pool.as_ref())
        .await?
        .get::<i64, _>("count");

    if existing > 0 {
        return Ok(());
    }

    let password_hash = hash_password(password)?;

    sqlx::query(
        "INSERT INTO users (username, password_hash, created_at, is_admin) VALUES (?, ?, ?, 1)",
    )
    .bind(username)
    .bind(&password_hash)
    .bind(Utc::now().to_rfc3339())
    .execute(pool.as_ref())
    .await?;

    tracing::info!("Created admin user {}", username);

    Ok(())
}
