use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::models::{PriceHistory, PriceObservation, TrackedItem};
use crate::store::PriceStore;
use crate::utils::error::AppError;

/// SQLite-backed store. Prices are persisted as TEXT and parsed back into
/// `Decimal` on read so no precision is lost to floating point.
pub struct SqliteStore {
    pool: SqlitePool,
    retention_cap: i64,
}

impl SqliteStore {
    pub async fn connect(config: &DatabaseConfig, retention_cap: usize) -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout))
            .connect(&config.url)
            .await?;

        let store = Self {
            pool,
            retention_cap: retention_cap as i64,
        };
        store.bootstrap().await?;
        info!(url = %config.url, "database ready");
        Ok(store)
    }

    async fn bootstrap(&self) -> Result<(), AppError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tracked_items (
                id TEXT PRIMARY KEY,
                url TEXT NOT NULL,
                title TEXT NOT NULL,
                current_price TEXT NOT NULL,
                target_price TEXT,
                store TEXT NOT NULL,
                image_url TEXT NOT NULL DEFAULT '',
                is_active INTEGER NOT NULL DEFAULT 1,
                last_checked TEXT,
                owner_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS price_observations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                item_id TEXT NOT NULL REFERENCES tracked_items(id),
                price TEXT NOT NULL,
                observed_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_observations_item
             ON price_observations (item_id, observed_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl PriceStore for SqliteStore {
    async fn insert_item(
        &self,
        item: &TrackedItem,
        seed: &PriceObservation,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO tracked_items
                (id, url, title, current_price, target_price, store, image_url,
                 is_active, last_checked, owner_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.id)
        .bind(&item.url)
        .bind(&item.title)
        .bind(item.current_price.to_string())
        .bind(item.target_price.map(|p| p.to_string()))
        .bind(&item.store)
        .bind(&item.image_url)
        .bind(item.is_active)
        .bind(item.last_checked)
        .bind(&item.owner_id)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO price_observations (item_id, price, observed_at) VALUES (?, ?, ?)",
        )
        .bind(&item.id)
        .bind(seed.price.to_string())
        .bind(seed.observed_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn active_items(&self) -> Result<Vec<TrackedItem>, AppError> {
        let rows = sqlx::query(
            "SELECT * FROM tracked_items WHERE is_active = 1 ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(item_from_row).collect()
    }

    async fn find_item(&self, id: &str, owner_id: &str) -> Result<TrackedItem, AppError> {
        let row = sqlx::query("SELECT * FROM tracked_items WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => item_from_row(&row),
            None => Err(AppError::NotFound {
                resource: format!("tracked item {id}"),
            }),
        }
    }

    async fn commit_observation(
        &self,
        item: &TrackedItem,
        observation: &PriceObservation,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE tracked_items
            SET title = ?, current_price = ?, image_url = ?, last_checked = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&item.title)
        .bind(item.current_price.to_string())
        .bind(&item.image_url)
        .bind(item.last_checked)
        .bind(item.updated_at)
        .bind(&item.id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO price_observations (item_id, price, observed_at) VALUES (?, ?, ?)",
        )
        .bind(&item.id)
        .bind(observation.price.to_string())
        .bind(observation.observed_at)
        .execute(&mut *tx)
        .await?;

        // Evict everything older than the newest `retention_cap` rows.
        sqlx::query(
            r#"
            DELETE FROM price_observations
            WHERE item_id = ?
              AND id NOT IN (
                  SELECT id FROM price_observations
                  WHERE item_id = ?
                  ORDER BY observed_at DESC, id DESC
                  LIMIT ?
              )
            "#,
        )
        .bind(&item.id)
        .bind(&item.id)
        .bind(self.retention_cap)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn history(&self, item_id: &str) -> Result<PriceHistory, AppError> {
        let rows = sqlx::query(
            "SELECT price, observed_at FROM price_observations
             WHERE item_id = ? ORDER BY observed_at, id",
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        let observations = rows
            .iter()
            .map(|row| -> Result<PriceObservation, AppError> {
                let price = parse_price(row.try_get::<String, _>("price")?.as_str())?;
                let observed_at: DateTime<Utc> = row.try_get("observed_at")?;
                Ok(PriceObservation::at(price, observed_at))
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(PriceHistory::from_observations(
            observations,
            self.retention_cap as usize,
        ))
    }

    async fn deactivate_item(&self, id: &str, owner_id: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE tracked_items SET is_active = 0, updated_at = ?
             WHERE id = ? AND owner_id = ?",
        )
        .bind(Utc::now())
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound {
                resource: format!("tracked item {id}"),
            });
        }
        Ok(())
    }
}

fn item_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<TrackedItem, AppError> {
    let target_price = row
        .try_get::<Option<String>, _>("target_price")?
        .map(|raw| parse_price(&raw))
        .transpose()?;

    Ok(TrackedItem {
        id: row.try_get("id")?,
        url: row.try_get("url")?,
        title: row.try_get("title")?,
        current_price: parse_price(row.try_get::<String, _>("current_price")?.as_str())?,
        target_price,
        store: row.try_get("store")?,
        image_url: row.try_get("image_url")?,
        is_active: row.try_get("is_active")?,
        last_checked: row.try_get("last_checked")?,
        owner_id: row.try_get("owner_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn parse_price(raw: &str) -> Result<Decimal, AppError> {
    Decimal::from_str(raw)
        .map_err(|err| AppError::Internal(format!("corrupt price value '{raw}': {err}")))
}
