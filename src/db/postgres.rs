//! Postgres-backed datastore implementation.
//!
//! Holds the single long-lived connection pool for the process: opened at
//! startup, closed at shutdown. Handlers share it through the relay.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{Account, Datastore, Error, NewAccount, OtpRecord};

/// Long-lived Postgres session for the relay.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects to Postgres, applies pending migrations, and returns the
    /// store.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Connected to Postgres, migrations applied");
        Ok(Self { pool })
    }

    /// Closes the underlying pool. Called once at shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait::async_trait]
impl Datastore for PgStore {
    async fn create_account(&self, new: NewAccount) -> Result<Account, Error> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, phone_number, first_name, last_name, email, is_verified, created_at)
            VALUES ($1, $2, $3, $4, $5, FALSE, $6)
            RETURNING id, phone_number, first_name, last_name, email, is_verified, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.phone_number)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => Error::Duplicate,
            _ => Error::Sqlx(e),
        })?;

        info!("Created account for phone number: {}", account.phone_number);
        Ok(account)
    }

    async fn find_account(&self, phone_number: &str) -> Result<Option<Account>, Error> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, phone_number, first_name, last_name, email, is_verified, created_at
            FROM accounts
            WHERE phone_number = $1
            "#,
        )
        .bind(phone_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn mark_account_verified(&self, phone_number: &str) -> Result<(), Error> {
        sqlx::query("UPDATE accounts SET is_verified = TRUE WHERE phone_number = $1")
            .bind(phone_number)
            .execute(&self.pool)
            .await?;

        info!("Marked account verified for phone number: {}", phone_number);
        Ok(())
    }

    async fn insert_otp(&self, record: OtpRecord) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO otp_verifications (id, phone_number, otp_code, expires_at, is_used, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id)
        .bind(&record.phone_number)
        .bind(&record.otp_code)
        .bind(record.expires_at)
        .bind(record.is_used)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn consume_otp(
        &self,
        phone_number: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, Error> {
        // Single conditional statement: selecting the newest candidate and
        // flipping its used flag must not race a concurrent consumer. The
        // affected-row count gates whether verification proceeds.
        let result = sqlx::query(
            r#"
            UPDATE otp_verifications
            SET is_used = TRUE
            WHERE id = (
                SELECT id
                FROM otp_verifications
                WHERE phone_number = $1
                  AND otp_code = $2
                  AND is_used = FALSE
                  AND expires_at >= $3
                ORDER BY created_at DESC
                LIMIT 1
            )
            AND is_used = FALSE
            "#,
        )
        .bind(phone_number)
        .bind(code)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
