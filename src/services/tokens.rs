use chrono::{Duration, Utc};
use color_eyre::{eyre::eyre, Result};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::db::User;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies bearer tokens for authenticated users.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn issue(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| eyre!("failed to sign token: {e}"))
    }

    /// The user id the token was issued for, or `None` for a token that is
    /// malformed, tampered with or expired.
    pub fn verify(&self, token: &str) -> Option<i64> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).ok()?;
        data.claims.sub.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: 42,
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn issued_token_verifies_to_its_user() {
        let keys = TokenKeys::new("test-secret", 1);
        let token = keys.issue(&user()).unwrap();
        assert_eq!(keys.verify(&token), Some(42));
    }

    #[test]
    fn token_signed_with_other_secret_is_refused() {
        let token = TokenKeys::new("one", 1).issue(&user()).unwrap();
        assert_eq!(TokenKeys::new("two", 1).verify(&token), None);
    }

    #[test]
    fn expired_token_is_refused() {
        // Past the default 60s leeway.
        let keys = TokenKeys::new("test-secret", -1);
        let token = keys.issue(&user()).unwrap();
        assert_eq!(keys.verify(&token), None);
    }

    #[test]
    fn garbage_is_refused() {
        let keys = TokenKeys::new("test-secret", 1);
        assert_eq!(keys.verify("not-a-token"), None);
    }
}
