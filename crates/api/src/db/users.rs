//! User repository for database operations.
//!
//! `external_id` carries a partial unique index (`WHERE external_id IS NOT NULL`),
//! so two concurrent first logins for the same provider subject cannot both
//! insert: the loser gets `RepositoryError::Conflict`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use calorie_quest_core::{Email, UserId, UserIdentity};

use super::{RepositoryError, UserStore};

/// Database row for `users`.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: Option<String>,
    display_name: String,
    is_guest: bool,
    created_at: DateTime<Utc>,
    external_id: Option<String>,
}

impl TryFrom<UserRow> for UserIdentity {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = row
            .email
            .as_deref()
            .map(Email::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
            })?;

        Ok(Self {
            id: row.id,
            email,
            display_name: row.display_name,
            is_guest: row.is_guest,
            created_at: row.created_at,
            external_id: row.external_id,
        })
    }
}

/// `PostgreSQL`-backed [`UserStore`].
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id, is_guest = user.is_guest))]
    async fn create(&self, user: &UserIdentity) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO users (id, email, display_name, is_guest, created_at, external_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(&user.id)
        .bind(user.email.as_ref().map(Email::as_str))
        .bind(&user.display_name)
        .bind(user.is_guest)
        .bind(user.created_at)
        .bind(user.external_id.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("user already exists".to_owned());
            }
            RepositoryError::from(e)
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<UserIdentity>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT id, email, display_name, is_guest, created_at, external_id
            FROM users
            WHERE external_id = $1
            ORDER BY created_at ASC
            LIMIT 1
            ",
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserIdentity::try_from).transpose()
    }
}
