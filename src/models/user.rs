//! User account, member profile and auth types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

use super::enums::{ProfileStatus, Role};

/// User account from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Member profile (1:1 with user)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MemberProfile {
    pub id: i64,
    pub user_id: i64,
    pub full_name: String,
    pub status: ProfileStatus,
    pub role: Role,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Account activation token
#[derive(Debug, Clone, FromRow)]
pub struct ActivationToken {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ActivationToken {
    /// Token is usable only if never used and not yet expired.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.used_at.is_none() && self.expires_at > now
    }
}

/// Signup request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct Signup {
    #[validate(length(min = 3, max = 150, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 255, message = "Full name is required"))]
    pub full_name: String,
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct Login {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub user_id: i64,
    pub role: Role,
}

/// Authenticated user profile view
#[derive(Debug, Serialize, ToSchema)]
pub struct Me {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub status: ProfileStatus,
}

/// Update own profile request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfile {
    #[validate(length(min = 1, max = 255, message = "Full name must be 1-255 characters"))]
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

/// JWT claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub user_id: i64,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Single authorization gate for every lifecycle-mutating operation.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Administrator privileges required".to_string(),
            ))
        }
    }

    /// The caller must be the given user or an admin.
    pub fn require_self_or_admin(&self, user_id: i64) -> Result<(), AppError> {
        if self.user_id == user_id || self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Operation allowed only for the owner or an administrator".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(role: Role) -> Claims {
        Claims {
            sub: "alice".to_string(),
            user_id: 7,
            role,
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn admin_gate() {
        assert!(claims(Role::Admin).require_admin().is_ok());
        assert!(claims(Role::User).require_admin().is_err());
    }

    #[test]
    fn self_or_admin_gate() {
        let user = claims(Role::User);
        assert!(user.require_self_or_admin(7).is_ok());
        assert!(user.require_self_or_admin(8).is_err());
        assert!(claims(Role::Admin).require_self_or_admin(8).is_ok());
    }

    #[test]
    fn activation_token_validity() {
        let now = Utc::now();
        let mut token = ActivationToken {
            id: 1,
            user_id: 1,
            token: "abc".to_string(),
            expires_at: now + Duration::hours(1),
            used_at: None,
            created_at: now,
        };
        assert!(token.is_valid_at(now));

        token.used_at = Some(now);
        assert!(!token.is_valid_at(now));

        token.used_at = None;
        token.expires_at = now - Duration::seconds(1);
        assert!(!token.is_valid_at(now));
    }
}
