//! Farefinder Profile Store
//! Copyright (c) 2026 Farefinder contributors
//! Licensed and distributed under either of
//!   * MIT license (license terms at the root of the package or at http://opensource.org/licenses/MIT).
//!   * Apache v2 license (license terms at the root of the package or at http://www.apache.org/licenses/LICENSE-2.0).
//! at your option. This file may not be copied, modified, or distributed except according to those terms.

//! farefinder-internals/profile-store
//! SQLite-backed persistence for user accounts, travel preferences and
//! saved flight searches. Each search is written inside one transaction
//! with explicit rollback on any write error.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, Row};
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("email already registered: {0}")]
    EmailTaken(String),
    #[error("not found: {0}")]
    NotFound(String),
}

/// A user row minus the credential material.
#[derive(Debug, Clone, FromRow)]
pub struct UserProfile {
    pub user_id: i64,
    pub email: String,
    pub full_name: String,
    /// "nonstop" or "any".
    pub flight_type: Option<String>,
    pub currency: Option<String>,
    pub market: Option<String>,
}

/// Partial preference update; `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct PreferencesUpdate {
    pub flight_type: Option<String>,
    pub currency: Option<String>,
    pub market: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SavedSearch {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub trip_type: String,
    pub search_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SavedResult {
    pub airline: String,
    /// `None` when the provider price never parsed to a number.
    pub price: Option<f64>,
    pub duration_minutes: i64,
    pub stops: i64,
    pub booking_url: Option<String>,
    pub departure_time: Option<String>,
    pub arrival_time: Option<String>,
}

#[derive(Clone)]
pub struct ProfileStore {
    pool: SqlitePool,
}

impl ProfileStore {
    /// Open (creating if needed) the database at `db_path` and ensure the
    /// schema exists. Foreign keys on, WAL journal.
    pub async fn open(db_path: &Path) -> Result<Self> {
        let newly_created = !db_path.exists();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Pragmas go through the connect options so every pooled
        // connection gets them, not just the first.
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_millis(5000));
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        if newly_created {
            tracing::info!("Initialized new profile store: {}", db_path.display());
        } else {
            tracing::debug!("Opened existing profile store: {}", db_path.display());
        }

        let store = Self { pool };
        store.create_schema().await?;
        Ok(store)
    }

    async fn create_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                user_id       INTEGER PRIMARY KEY AUTOINCREMENT,
                email         TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                full_name     TEXT NOT NULL,
                flight_type   TEXT,
                currency      TEXT,
                market        TEXT,
                created_at    TEXT NOT NULL,
                updated_at    TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS flight_search (
                search_id      INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id        INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
                origin         TEXT NOT NULL,
                destination    TEXT NOT NULL,
                departure_date TEXT NOT NULL,
                return_date    TEXT,
                trip_type      TEXT NOT NULL,
                search_url     TEXT,
                created_at     TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS flight_results (
                result_id        INTEGER PRIMARY KEY AUTOINCREMENT,
                search_id        INTEGER NOT NULL REFERENCES flight_search(search_id) ON DELETE CASCADE,
                airline          TEXT NOT NULL,
                price            REAL,
                duration_minutes INTEGER NOT NULL,
                stops            INTEGER NOT NULL,
                booking_url      TEXT,
                departure_time   TEXT,
                arrival_time     TEXT,
                retrieved_at     TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Create an account. The password is stored as a salted SHA-256 hash.
    pub async fn register(&self, email: &str, password: &str, full_name: &str) -> Result<i64> {
        let existing = sqlx::query("SELECT user_id FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(StoreError::EmailTaken(email.to_string()));
        }

        let now = now_str();
        let row = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, full_name, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING user_id
            "#,
        )
        .bind(email)
        .bind(hash_password(password))
        .bind(full_name)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;

        let user_id: i64 = row.try_get("user_id")?;
        tracing::info!("Registered user {} ({})", user_id, email);
        Ok(user_id)
    }

    /// Returns the user id on a correct email/password pair, `None` on a
    /// wrong password or unknown email.
    pub async fn verify_login(&self, email: &str, password: &str) -> Result<Option<i64>> {
        let row = sqlx::query("SELECT user_id, password_hash FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let stored: String = row.try_get("password_hash")?;
        if verify_password(password, &stored) {
            Ok(Some(row.try_get("user_id")?))
        } else {
            Ok(None)
        }
    }

    pub async fn profile(&self, user_id: i64) -> Result<UserProfile> {
        sqlx::query_as::<_, UserProfile>(
            "SELECT user_id, email, full_name, flight_type, currency, market
             FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("user {}", user_id)))
    }

    pub async fn find_user(&self, email: &str) -> Result<Option<UserProfile>> {
        Ok(sqlx::query_as::<_, UserProfile>(
            "SELECT user_id, email, full_name, flight_type, currency, market
             FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Apply a partial preference update, keeping stored values where the
    /// update carries `None`.
    pub async fn update_preferences(
        &self,
        user_id: i64,
        update: &PreferencesUpdate,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                flight_type = COALESCE(?, flight_type),
                currency    = COALESCE(?, currency),
                market      = COALESCE(?, market),
                updated_at  = ?
            WHERE user_id = ?
            "#,
        )
        .bind(&update.flight_type)
        .bind(&update.currency)
        .bind(&update.market)
        .bind(now_str())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("user {}", user_id)));
        }
        Ok(())
    }

    /// Persist one search and all of its results atomically. Any write
    /// failure rolls the whole search back.
    pub async fn save_search(
        &self,
        user_id: i64,
        search: &SavedSearch,
        results: &[SavedResult],
    ) -> Result<i64> {
        let mut tx = self.pool.begin().await?;
        match insert_search(&mut tx, user_id, search, results).await {
            Ok(search_id) => {
                tx.commit().await?;
                tracing::debug!(
                    "Saved search {} with {} results for user {}",
                    search_id,
                    results.len(),
                    user_id
                );
                Ok(search_id)
            }
            Err(e) => {
                if let Err(rb) = tx.rollback().await {
                    tracing::warn!("Rollback after failed save also failed: {}", rb);
                }
                Err(e)
            }
        }
    }

    pub async fn saved_results(&self, search_id: i64) -> Result<Vec<SavedResult>> {
        let rows = sqlx::query(
            "SELECT airline, price, duration_minutes, stops, booking_url,
                    departure_time, arrival_time
             FROM flight_results WHERE search_id = ? ORDER BY result_id",
        )
        .bind(search_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(SavedResult {
                    airline: row.try_get("airline")?,
                    price: row.try_get("price")?,
                    duration_minutes: row.try_get("duration_minutes")?,
                    stops: row.try_get("stops")?,
                    booking_url: row.try_get("booking_url")?,
                    departure_time: row.try_get("departure_time")?,
                    arrival_time: row.try_get("arrival_time")?,
                })
            })
            .collect()
    }
}

async fn insert_search(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    user_id: i64,
    search: &SavedSearch,
    results: &[SavedResult],
) -> Result<i64> {
    let row = sqlx::query(
        r#"
        INSERT INTO flight_search
            (user_id, origin, destination, departure_date, return_date,
             trip_type, search_url, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING search_id
        "#,
    )
    .bind(user_id)
    .bind(&search.origin)
    .bind(&search.destination)
    .bind(search.departure_date.format("%Y-%m-%d").to_string())
    .bind(search.return_date.map(|d| d.format("%Y-%m-%d").to_string()))
    .bind(&search.trip_type)
    .bind(&search.search_url)
    .bind(now_str())
    .fetch_one(&mut **tx)
    .await?;
    let search_id: i64 = row.try_get("search_id")?;

    for result in results {
        sqlx::query(
            r#"
            INSERT INTO flight_results
                (search_id, airline, price, duration_minutes, stops,
                 booking_url, departure_time, arrival_time, retrieved_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(search_id)
        .bind(&result.airline)
        .bind(result.price)
        .bind(result.duration_minutes)
        .bind(result.stops)
        .bind(&result.booking_url)
        .bind(&result.departure_time)
        .bind(&result.arrival_time)
        .bind(now_str())
        .execute(&mut **tx)
        .await?;
    }

    Ok(search_id)
}

fn now_str() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.to_rfc3339()
}

/// Salted SHA-256, stored as `salt_hex$digest_hex`.
fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    format!("{}${}", to_hex(&salt), digest_hex(&salt, password))
}

fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, digest)) = stored.split_once('$') else {
        return false;
    };
    let Some(salt) = from_hex(salt_hex) else {
        return false;
    };
    digest_hex(&salt, password) == digest
}

fn digest_hex(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    to_hex(&hasher.finalize())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn from_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}
