use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::{AccountError, AccountResult};
use crate::users::model::User;

/// Persistence for user records.
///
/// `insert` must reject a record whose email is already stored with
/// [`AccountError::UniquenessViolation`]; that check is what settles
/// concurrent creation of the same account.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: &User) -> AccountResult<()>;
    async fn find_by_email(&self, email: &str) -> AccountResult<Option<User>>;
    async fn touch_last_login(&self, id: Uuid, at: OffsetDateTime) -> AccountResult<()>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_insert_error(e: sqlx::Error, email: &str) -> AccountError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AccountError::UniquenessViolation {
                email: email.to_string(),
            }
        }
        other => AccountError::Storage(other),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, user: &User) -> AccountResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password, first_name, last_name,
                               is_active, is_staff, is_superuser, date_joined, last_login)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.is_active)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .bind(user.date_joined)
        .bind(user.last_login)
        .execute(&self.db)
        .await
        .map_err(|e| map_insert_error(e, &user.email))?;
        debug!(user_id = %user.id, "user row inserted");
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> AccountResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password, first_name, last_name,
                   is_active, is_staff, is_superuser, date_joined, last_login
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn touch_last_login(&self, id: Uuid, at: OffsetDateTime) -> AccountResult<()> {
        sqlx::query("UPDATE users SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

/// Process-local repository keyed by stored email.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> AccountResult<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(AccountError::UniquenessViolation {
                email: user.email.clone(),
            });
        }
        users.insert(user.email.clone(), user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> AccountResult<Option<User>> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn touch_last_login(&self, id: Uuid, at: OffsetDateTime) -> AccountResult<()> {
        let mut users = self.users.write().await;
        if let Some(user) = users.values_mut().find(|u| u.id == id) {
            user.last_login = Some(at);
        }
        Ok(())
    }
}
