use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;

use crate::auth::repo_types::{NewUser, Session, SessionRecord, User, UserKey};

const EMAIL_UNIQUE_CONSTRAINT: &str = "account_user_email_key";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("user not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Transactional access to the `account_user` / `account_usersession` tables.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn get_user(&self, key: UserKey<'_>) -> Result<User, StoreError>;

    /// Replaces whatever session `user_id` had with one holding `token`.
    async fn create_session(&self, user_id: i32, token: &str) -> Result<Session, StoreError>;

    /// `None` when no session matches both the token and the user.
    async fn get_session(
        &self,
        token: &str,
        user_id: i32,
    ) -> Result<Option<SessionRecord>, StoreError>;

    /// Succeeds whether or not a row matched.
    async fn delete_session(&self, token: &str) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }

    /// Administrative removal; the user's session goes with it.
    pub async fn delete_user(&self, id: i32) -> Result<(), StoreError> {
        let mut tx = self.db.begin().await?;
        sqlx::query("DELETE FROM account_user WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tx = self.db.begin().await?;
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO account_user (email, password_hash, full_name, address, phone_number, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(user.email())
        .bind(user.password_hash())
        .bind(user.full_name())
        .bind(user.address())
        .bind(user.phone_number())
        .bind(user.role())
        .fetch_one(&mut *tx)
        .await
        .map_err(classify_insert_error)?;
        tx.commit().await?;

        debug!(user_id = id, "user row inserted");
        Ok(user.into_user(id))
    }

    async fn get_user(&self, key: UserKey<'_>) -> Result<User, StoreError> {
        let query = match key {
            UserKey::Id(id) => sqlx::query_as::<_, User>(
                r#"
                SELECT id, email, password_hash, full_name, address, phone_number, role
                FROM account_user
                WHERE id = $1
                "#,
            )
            .bind(id),
            UserKey::Email(email) => sqlx::query_as::<_, User>(
                r#"
                SELECT id, email, password_hash, full_name, address, phone_number, role
                FROM account_user
                WHERE email = $1
                "#,
            )
            .bind(email),
        };
        query
            .fetch_optional(&self.db)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn create_session(&self, user_id: i32, token: &str) -> Result<Session, StoreError> {
        let mut tx = self.db.begin().await?;
        sqlx::query("DELETE FROM account_usersession WHERE account_user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        // a concurrent login for the same user fails here on the unique user id
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO account_usersession (token, account_user_id)
            VALUES ($1, $2)
            RETURNING id, token, account_user_id
            "#,
        )
        .bind(token)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        debug!(user_id, session_id = session.id, "session replaced");
        Ok(session)
    }

    async fn get_session(
        &self,
        token: &str,
        user_id: i32,
    ) -> Result<Option<SessionRecord>, StoreError> {
        let record = sqlx::query_as::<_, SessionRecord>(
            r#"
            SELECT s.id AS session_id, s.token,
                   u.id, u.email, u.password_hash, u.full_name, u.address, u.phone_number, u.role
            FROM account_usersession s
            INNER JOIN account_user u ON u.id = s.account_user_id
            WHERE s.token = $1 AND s.account_user_id = $2
            "#,
        )
        .bind(token)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(record)
    }

    async fn delete_session(&self, token: &str) -> Result<(), StoreError> {
        let mut tx = self.db.begin().await?;
        let result = sqlx::query("DELETE FROM account_usersession WHERE token = $1")
            .bind(token)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!(rows = result.rows_affected(), "session delete");
        Ok(())
    }
}

fn classify_insert_error(err: sqlx::Error) -> StoreError {
    if is_duplicate_email(&err) {
        StoreError::DuplicateEmail
    } else {
        StoreError::Database(err)
    }
}

fn is_duplicate_email(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if db_err.is_unique_violation() {
            if let Some(constraint) = db_err.constraint() {
                return constraint == EMAIL_UNIQUE_CONSTRAINT;
            }
        }
    }
    let message = err.to_string().to_lowercase();
    message.contains("duplicate") && message.contains("email")
}
