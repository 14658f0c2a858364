// ABOUTME: SQLite-backed FitnessStore using sqlx with inline schema migrations
// ABOUTME: Stores workout and diet plans as JSON text and upserts users on external id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tokio::fs;
use tracing::{debug, field, info, instrument, Span};
use uuid::Uuid;

use super::FitnessStore;
use crate::errors::{AppError, AppResult};
use crate::models::{NewPlan, Plan, User, UserSync};

/// In-memory databases must stay on one connection to keep their tables
const MEMORY_POOL_SIZE: u32 = 1;

/// Connection cap for file-backed databases
const FILE_POOL_SIZE: u32 = 5;

// ============================================================================
// Store
// ============================================================================

/// SQLite persistence for plans and users
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `database_url` and migrate it
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the file cannot be created, or
    /// a migration statement fails
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let in_memory = database_url.contains(":memory:");
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config(format!("Invalid DATABASE_URL {database_url}: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        if !in_memory {
            ensure_parent_dir(options.get_filename()).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory {
                MEMORY_POOL_SIZE
            } else {
                FILE_POOL_SIZE
            })
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        let store = Self { pool };
        store.migrate().await?;
        info!(database.url = %database_url, "Database ready");
        Ok(store)
    }

    /// Get a reference to the database pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables and indexes if they do not exist
    ///
    /// # Errors
    ///
    /// Returns an error if a schema statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        // Create users table
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                external_id TEXT UNIQUE NOT NULL,
                email TEXT NOT NULL,
                name TEXT NOT NULL,
                image TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create users table: {e}")))?;

        // Create plans table
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS plans (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                workout_plan TEXT NOT NULL,
                diet_plan TEXT NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create plans table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_plans_user_id ON plans(user_id)")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to create plans index: {e}")))?;

        debug!("Database migrations applied");
        Ok(())
    }
}

// ============================================================================
// FitnessStore implementation
// ============================================================================

#[async_trait]
impl FitnessStore for SqliteStore {
    #[instrument(skip(self, plan), fields(user.id = %plan.user_id, plan.id))]
    async fn create_plan(&self, plan: &NewPlan) -> AppResult<Uuid> {
        let id = Uuid::new_v4();
        Span::current().record("plan.id", field::display(id));
        let workout_json = serde_json::to_string(&plan.workout_plan)?;
        let diet_json = serde_json::to_string(&plan.diet_plan)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        if plan.is_active {
            sqlx::query("UPDATE plans SET is_active = 0 WHERE user_id = $1 AND is_active = 1")
                .bind(&plan.user_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::database(format!("Failed to deactivate previous plans: {e}"))
                })?;
        }

        sqlx::query(
            r"
            INSERT INTO plans (id, user_id, name, workout_plan, diet_plan, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(id.to_string())
        .bind(&plan.user_id)
        .bind(&plan.name)
        .bind(workout_json)
        .bind(diet_json)
        .bind(plan.is_active)
        .bind(timestamp(Utc::now()))
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to create plan: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Transaction commit failed: {e}")))?;

        info!("Plan persisted");
        Ok(id)
    }

    async fn get_user_plans(&self, user_id: &str) -> AppResult<Vec<Plan>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, name, workout_plan, diet_plan, is_active, created_at
            FROM plans
            WHERE user_id = $1
            ORDER BY created_at DESC, rowid DESC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list plans: {e}")))?;

        rows.iter().map(row_to_plan).collect()
    }

    #[instrument(skip(self, user), fields(user.external_id = %user.external_id))]
    async fn sync_user(&self, user: &UserSync) -> AppResult<()> {
        let now = timestamp(Utc::now());

        sqlx::query(
            r"
            INSERT INTO users (id, external_id, email, name, image, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ON CONFLICT(external_id) DO UPDATE SET
                email = excluded.email,
                name = excluded.name,
                image = excluded.image,
                updated_at = excluded.updated_at
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&user.external_id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.image)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to sync user: {e}")))?;

        debug!("User synced");
        Ok(())
    }

    async fn get_user_by_external_id(&self, external_id: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, external_id, email, name, image, created_at, updated_at
            FROM users
            WHERE external_id = $1
            ",
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;

        row.as_ref().map(row_to_user).transpose()
    }
}

// ============================================================================
// Row mapping
// ============================================================================

fn row_to_plan(row: &SqliteRow) -> AppResult<Plan> {
    let workout_json: String = row.get("workout_plan");
    let diet_json: String = row.get("diet_plan");

    Ok(Plan {
        id: parse_uuid(row.get("id"))?,
        user_id: row.get("user_id"),
        name: row.get("name"),
        workout_plan: serde_json::from_str(&workout_json)?,
        diet_plan: serde_json::from_str(&diet_json)?,
        is_active: row.get("is_active"),
        created_at: parse_timestamp(row.get("created_at"))?,
    })
}

fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    Ok(User {
        id: parse_uuid(row.get("id"))?,
        external_id: row.get("external_id"),
        email: row.get("email"),
        name: row.get("name"),
        image: row.get("image"),
        created_at: parse_timestamp(row.get("created_at"))?,
        updated_at: parse_timestamp(row.get("updated_at"))?,
    })
}

/// Fixed-width RFC 3339 so text ordering matches time ordering
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::database(format!("Invalid stored timestamp {raw}: {e}")))
}

fn parse_uuid(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| AppError::database(format!("Invalid stored id {raw}: {e}")))
}

async fn ensure_parent_dir(path: &Path) -> AppResult<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to create {}: {e}", dir.display()))
            }),
        _ => Ok(()),
    }
}
