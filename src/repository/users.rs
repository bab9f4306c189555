//! Users and accounts repository

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{ProfileStatus, Role},
        user::{ActivationToken, MemberProfile, User},
    },
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    /// Get profile of a user
    pub async fn get_profile(&self, user_id: i64) -> AppResult<MemberProfile> {
        sqlx::query_as::<_, MemberProfile>("SELECT * FROM member_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile for user {} not found", user_id)))
    }

    /// Create an inactive user with a PENDING profile and an activation token.
    /// One transaction: the account never exists without its token.
    pub async fn create_account(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        full_name: &str,
        token: &str,
        token_expires_at: DateTime<Utc>,
    ) -> AppResult<User> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, is_active)
            VALUES ($1, $2, $3, FALSE)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(format!("Username {} is already taken", username))
            }
            _ => AppError::Database(e),
        })?;

        sqlx::query(
            r#"
            INSERT INTO member_profiles (user_id, full_name, status, role)
            VALUES ($1, $2, 'PENDING', 'USER')
            "#,
        )
        .bind(user.id)
        .bind(full_name)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO activation_tokens (user_id, token, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(user.id)
        .bind(token)
        .bind(token_expires_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user)
    }

    /// Look up an activation token
    pub async fn get_activation_token(&self, token: &str) -> AppResult<ActivationToken> {
        sqlx::query_as::<_, ActivationToken>("SELECT * FROM activation_tokens WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Activation token not found".to_string()))
    }

    /// Activate account: user active, profile ACTIVE, token consumed.
    pub async fn activate(&self, token_id: i64, user_id: i64, now: DateTime<Utc>) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE users SET is_active = TRUE WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE member_profiles SET status = 'ACTIVE' WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let result =
            sqlx::query("UPDATE activation_tokens SET used_at = $2 WHERE id = $1 AND used_at IS NULL")
                .bind(token_id)
                .bind(now)
                .execute(&mut *tx)
                .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::InvalidState(
                "Activation token already used".to_string(),
            ));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Update own profile fields
    pub async fn update_profile(
        &self,
        user_id: i64,
        full_name: Option<&str>,
        avatar_url: Option<&str>,
        email: Option<&str>,
    ) -> AppResult<MemberProfile> {
        let mut tx = self.pool.begin().await?;

        if let Some(email) = email {
            sqlx::query("UPDATE users SET email = $2 WHERE id = $1")
                .bind(user_id)
                .bind(email)
                .execute(&mut *tx)
                .await?;
        }

        let profile = sqlx::query_as::<_, MemberProfile>(
            r#"
            UPDATE member_profiles SET
                full_name = COALESCE($2, full_name),
                avatar_url = COALESCE($3, avatar_url)
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(full_name)
        .bind(avatar_url)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile for user {} not found", user_id)))?;

        tx.commit().await?;
        Ok(profile)
    }

    /// Change a member's role (admin operation)
    pub async fn set_role(&self, user_id: i64, role: Role) -> AppResult<MemberProfile> {
        sqlx::query_as::<_, MemberProfile>(
            "UPDATE member_profiles SET role = $2 WHERE user_id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile for user {} not found", user_id)))
    }

    /// Change a member's status (admin operation)
    pub async fn set_status(&self, user_id: i64, status: ProfileStatus) -> AppResult<MemberProfile> {
        sqlx::query_as::<_, MemberProfile>(
            "UPDATE member_profiles SET status = $2 WHERE user_id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile for user {} not found", user_id)))
    }
}
