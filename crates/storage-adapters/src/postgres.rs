//! # Postgres adapters
//!
//! Sites are stored one row per document with the comment collection in a
//! JSONB column. A save is a single `UPDATE ... WHERE id = $1 AND revision = $2`,
//! so it either replaces the whole document or changes nothing.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{Comment, DomainError, Result, Site, SiteRepository, User, UserRepository};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::Row;
use tracing::error;
use uuid::Uuid;

const SITE_COLUMNS: &str = "id, name, description, image, elevation, cost, featured, comments, \
                            revision, created_at, updated_at";

const UNIQUE_VIOLATION: &str = "23505";

/// Opens a bounded pool. The acquire timeout bounds every store call.
pub async fn connect(
    url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> std::result::Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(url)
        .await
}

pub async fn migrate(pool: &PgPool) -> std::result::Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Case-folded unique index on `sites.name`, see the init migration.
const SITE_NAME_CONSTRAINT: &str = "sites_name_key";

fn storage_error(op: &'static str, err: sqlx::Error) -> DomainError {
    if let Some(db) = err.as_database_error() {
        if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return DomainError::Conflict(unique_violation_message(op, db.constraint()));
        }
    }
    error!(op, error = %err, "postgres operation failed");
    DomainError::StorageUnavailable(format!("{op}: {err}"))
}

fn unique_violation_message(op: &str, constraint: Option<&str>) -> String {
    match constraint {
        Some(SITE_NAME_CONSTRAINT) => "a site with that name already exists".into(),
        Some(other) => format!("{op}: duplicate value violates {other}"),
        None => format!("{op}: duplicate value"),
    }
}

fn to_db_int(field: &str, value: Option<u32>) -> Result<Option<i32>> {
    value
        .map(i32::try_from)
        .transpose()
        .map_err(|_| DomainError::Validation(format!("{field} is out of range")))
}

fn row_to_site(row: &PgRow) -> std::result::Result<Site, sqlx::Error> {
    let cost: Option<i32> = row.try_get("cost")?;
    let Json(comments): Json<Vec<Comment>> = row.try_get("comments")?;
    Ok(Site {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        image: row.try_get("image")?,
        elevation: row.try_get("elevation")?,
        // The column carries a CHECK (cost >= 0).
        cost: cost.map(|c| c.max(0) as u32),
        featured: row.try_get("featured")?,
        comments,
        revision: row.try_get("revision")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

pub struct PgSiteRepository {
    pool: PgPool,
}

impl PgSiteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SiteRepository for PgSiteRepository {
    async fn list_all(&self) -> Result<Vec<Site>> {
        let rows = sqlx::query(&format!(
            "SELECT {SITE_COLUMNS} FROM sites ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("list sites", e))?;

        rows.iter()
            .map(row_to_site)
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| storage_error("decode site", e))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Site>> {
        let row = sqlx::query(&format!("SELECT {SITE_COLUMNS} FROM sites WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("find site", e))?;

        row.as_ref()
            .map(row_to_site)
            .transpose()
            .map_err(|e| storage_error("decode site", e))
    }

    async fn create(&self, site: Site) -> Result<Site> {
        let row = sqlx::query(&format!(
            "INSERT INTO sites (id, name, description, image, elevation, cost, featured, \
             comments, revision, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {SITE_COLUMNS}"
        ))
        .bind(site.id)
        .bind(&site.name)
        .bind(&site.description)
        .bind(&site.image)
        .bind(site.elevation)
        .bind(to_db_int("cost", site.cost)?)
        .bind(site.featured)
        .bind(Json(&site.comments))
        .bind(site.revision)
        .bind(site.created_at)
        .bind(site.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("create site", e))?;

        row_to_site(&row).map_err(|e| storage_error("decode site", e))
    }

    async fn save(&self, site: &Site) -> Result<Site> {
        let row = sqlx::query(&format!(
            "UPDATE sites SET name = $3, description = $4, image = $5, elevation = $6, \
             cost = $7, featured = $8, comments = $9, updated_at = $10, \
             revision = revision + 1 \
             WHERE id = $1 AND revision = $2 \
             RETURNING {SITE_COLUMNS}"
        ))
        .bind(site.id)
        .bind(site.revision)
        .bind(&site.name)
        .bind(&site.description)
        .bind(&site.image)
        .bind(site.elevation)
        .bind(to_db_int("cost", site.cost)?)
        .bind(site.featured)
        .bind(Json(&site.comments))
        .bind(site.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("save site", e))?;

        match row {
            Some(row) => row_to_site(&row).map_err(|e| storage_error("decode site", e)),
            // Either the row is gone or its revision moved on.
            None => match self.find_by_id(site.id).await? {
                Some(_) => Err(DomainError::stale_site(site.id)),
                None => Err(DomainError::SiteNotFound(site.id)),
            },
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sites WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("delete site", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sites")
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("delete all sites", e))?;
        Ok(result.rows_affected())
    }
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts or refreshes an account. Used by the seed binary.
    pub async fn upsert(&self, user: &User) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, username, first_name, last_name, admin) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (username) DO UPDATE \
             SET first_name = EXCLUDED.first_name, last_name = EXCLUDED.last_name, \
                 admin = EXCLUDED.admin",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.admin)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("upsert user", e))?;
        Ok(())
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, first_name, last_name, admin FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("find user", e))?;

        row.as_ref()
            .map(row_to_user)
            .transpose()
            .map_err(|e| storage_error("decode user", e))
    }
}

fn row_to_user(row: &PgRow) -> std::result::Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        admin: row.try_get("admin")?,
    })
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        let rows = sqlx::query(
            "SELECT id, username, first_name, last_name, admin FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("find users", e))?;

        rows.iter()
            .map(row_to_user)
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| storage_error("decode user", e))
    }
}
