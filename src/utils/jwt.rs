use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::user::UserRole;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,       // user id
    pub username: String,
    pub role: UserRole,
    /// Set on short-lived tokens issued by admin re-authorization.
    #[serde(default)]
    pub elevated: bool,
    pub exp: i64,        // expiration timestamp
    pub iat: i64,        // issued at timestamp
}

pub fn create_token(
    user_id: Uuid,
    username: &str,
    role: UserRole,
    elevated: bool,
    secret: &str,
    lifetime: Duration,
) -> AppResult<String> {
    let now = Utc::now();
    let exp = now + lifetime;

    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        role,
        elevated,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
}

pub fn verify_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_roundtrip_keeps_role_and_elevation() {
        let id = Uuid::new_v4();
        let token = create_token(id, "maria", UserRole::Admin, true, "secret", Duration::minutes(5))
            .unwrap();

        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.username, "maria");
        assert_eq!(claims.role, UserRole::Admin);
        assert!(claims.elevated);
    }

    #[test]
    fn test_wrong_secret_is_unauthorized() {
        let token = create_token(
            Uuid::new_v4(),
            "maria",
            UserRole::User,
            false,
            "secret",
            Duration::hours(1),
        )
        .unwrap();

        assert!(matches!(
            verify_token(&token, "other"),
            Err(AppError::Unauthorized(_))
        ));
    }
}
