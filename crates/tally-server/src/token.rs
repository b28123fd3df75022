//! Bearer credential issue and verification
//!
//! Tokens are HS256 JWTs binding user id, role, and email at issuance time.
//! Role changes after issuance are not reflected until re-login.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use tally_core::models::User;

/// Token validity window: two hours from issuance
pub const TOKEN_TTL_SECS: i64 = 2 * 60 * 60;

/// Claims carried by the bearer credential
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub role: String,
    pub email: String,
    /// Expiry as a unix timestamp
    pub exp: i64,
}

/// Issue a token for a user
pub fn issue(secret: &str, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        user_id: user.id,
        role: user.role.as_str().to_string(),
        email: user.email.clone(),
        exp: Utc::now().timestamp() + TOKEN_TTL_SECS,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a token and return its claims
///
/// Expired, malformed, and badly-signed tokens all yield `None`; the caller
/// maps every failure to the same unauthorized response.
pub fn verify(secret: &str, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::models::Role;

    fn user() -> User {
        User {
            id: 42,
            email: "salary@example.com".to_string(),
            password_hash: String::new(),
            role: Role::Salary,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issue_and_verify_roundtrip() {
        let token = issue("secret", &user()).unwrap();
        let claims = verify("secret", &token).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.role, "salary");
        assert_eq!(claims.email, "salary@example.com");
    }

    #[test]
    fn wrong_secret_fails() {
        let token = issue("secret", &user()).unwrap();
        assert!(verify("other", &token).is_none());
    }

    #[test]
    fn tampered_token_fails() {
        let token = issue("secret", &user()).unwrap();
        let tampered = format!("{}x", token);
        assert!(verify("secret", &tampered).is_none());
    }

    #[test]
    fn expired_token_fails() {
        let claims = Claims {
            user_id: 1,
            role: "salary".to_string(),
            email: "x@example.com".to_string(),
            exp: Utc::now().timestamp() - 120,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert!(verify("secret", &token).is_none());
    }
}
