//! Account management service: signup, activation, login, profiles

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;

use crate::{
    config::{AuthConfig, ServerConfig},
    error::{AppError, AppResult},
    models::{
        enums::{MailType, ProfileStatus, Role},
        mail::NewMail,
        user::{Claims, Login, LoginResponse, Me, MemberProfile, Signup, UpdateProfile, User},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct AccountsService {
    repository: Repository,
    auth_config: AuthConfig,
    server_config: ServerConfig,
}

impl AccountsService {
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        server_config: ServerConfig,
    ) -> Self {
        Self {
            repository,
            auth_config,
            server_config,
        }
    }

    /// Create an inactive account and enqueue the activation mail.
    pub async fn signup(&self, signup: Signup, now: DateTime<Utc>) -> AppResult<User> {
        let password_hash = hash_password(&signup.password)?;
        let token = generate_token();
        let expires_at = now + Duration::hours(self.auth_config.activation_token_hours);

        let user = self
            .repository
            .users
            .create_account(
                &signup.username,
                &signup.email,
                &password_hash,
                &signup.full_name,
                &token,
                expires_at,
            )
            .await?;

        let activation_link = format!(
            "{}/api/v1/auth/activate/{}",
            self.server_config.public_url, token
        );
        self.repository
            .mail
            .enqueue(&NewMail {
                mail_type: MailType::AccountActivation,
                to_user_id: Some(user.id),
                to_email: Some(signup.email.clone()),
                subject: "Activate your Shelfmark account".to_string(),
                body: format!(
                    "Hello {},\n\n\
                     Please follow the link below to activate your account:\n{}\n\n\
                     The link expires in {} hours. If you did not sign up, you can\n\
                     ignore this mail.\n",
                    signup.username, activation_link, self.auth_config.activation_token_hours
                ),
                reference: None,
            })
            .await?;

        tracing::info!(user_id = user.id, "account created, activation mail queued");
        Ok(user)
    }

    /// Consume an activation token and activate the account.
    pub async fn activate(&self, token: &str, now: DateTime<Utc>) -> AppResult<()> {
        let activation = self.repository.users.get_activation_token(token).await?;
        if !activation.is_valid_at(now) {
            return Err(AppError::InvalidState(
                "Activation token is expired or already used".to_string(),
            ));
        }
        self.repository
            .users
            .activate(activation.id, activation.user_id, now)
            .await?;
        tracing::info!(user_id = activation.user_id, "account activated");
        Ok(())
    }

    /// Verify credentials and issue a JWT.
    pub async fn login(&self, login: Login, now: DateTime<Utc>) -> AppResult<LoginResponse> {
        let user = self
            .repository
            .users
            .get_by_username(&login.username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid credentials".to_string()))?;

        verify_password(&login.password, &user.password_hash)
            .map_err(|_| AppError::Authentication("Invalid credentials".to_string()))?;

        if !user.is_active {
            return Err(AppError::Authentication(
                "Account is not activated".to_string(),
            ));
        }

        let profile = self.repository.users.get_profile(user.id).await?;
        if profile.status == ProfileStatus::Inactive {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }

        let claims = Claims {
            sub: user.username.clone(),
            user_id: user.id,
            role: profile.role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.auth_config.jwt_expiration_hours)).timestamp(),
        };
        let token = claims
            .create_token(&self.auth_config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            user_id: user.id,
            role: profile.role,
        })
    }

    /// Profile view for the authenticated user
    pub async fn me(&self, user_id: i64) -> AppResult<Me> {
        let user = self.repository.users.get_by_id(user_id).await?;
        let profile = self.repository.users.get_profile(user_id).await?;
        Ok(Me {
            user_id: user.id,
            username: user.username,
            email: user.email,
            full_name: profile.full_name,
            role: profile.role,
            status: profile.status,
        })
    }

    /// Update the authenticated user's profile
    pub async fn update_profile(
        &self,
        user_id: i64,
        update: UpdateProfile,
    ) -> AppResult<MemberProfile> {
        self.repository
            .users
            .update_profile(
                user_id,
                update.full_name.as_deref(),
                update.avatar_url.as_deref(),
                update.email.as_deref(),
            )
            .await
    }

    /// Promote/demote a member (admin operation)
    pub async fn set_role(&self, user_id: i64, role: Role) -> AppResult<MemberProfile> {
        self.repository.users.set_role(user_id, role).await
    }

    /// Enable/disable a member (admin operation)
    pub async fn set_status(&self, user_id: i64, status: ProfileStatus) -> AppResult<MemberProfile> {
        self.repository.users.set_status(user_id, status).await
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> Result<(), argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    Argon2::default().verify_password(password.as_bytes(), &parsed)
}

/// 32 random bytes, hex-encoded: 64 characters, fits the token column.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash).is_ok());
        assert!(verify_password("wrong", &hash).is_err());
    }

    #[test]
    fn generated_tokens_are_unique_and_sized() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }
}
