//! Access token verification.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use crate::claims::{AccessClaims, TokenError, validate_claims};

/// Verifies a bearer token and returns its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<AccessClaims, TokenError>;
}

/// HS256 validator sharing a secret with the hosted auth service.
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>, audience: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "sub", "aud"]);
        // Time checks run against the caller's clock in `validate_claims`.
        validation.validate_exp = false;

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<AccessClaims, TokenError> {
        let data = jsonwebtoken::decode::<AccessClaims>(token, &self.key, &self.validation)
            .map_err(|e| TokenError::Rejected(e.to_string()))?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header};
    use sparekeep_core::UserId;

    const SECRET: &str = "test-secret";

    fn mint(secret: &str, aud: &str, now: DateTime<Utc>) -> (String, UserId) {
        let sub = UserId::new();
        let claims = AccessClaims {
            sub,
            email: Some("tech@plant.example".to_string()),
            aud: aud.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(5)).timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();
        (token, sub)
    }

    #[test]
    fn accepts_valid_token() {
        let now = Utc::now();
        let (token, sub) = mint(SECRET, "authenticated", now);
        let claims = Hs256JwtValidator::new(SECRET, "authenticated")
            .validate(&token, now)
            .unwrap();
        assert_eq!(claims.sub, sub);
        assert_eq!(claims.email.as_deref(), Some("tech@plant.example"));
    }

    #[test]
    fn rejects_wrong_secret_and_audience() {
        let now = Utc::now();
        let validator = Hs256JwtValidator::new(SECRET, "authenticated");

        let (forged, _) = mint("other-secret", "authenticated", now);
        assert!(matches!(validator.validate(&forged, now), Err(TokenError::Rejected(_))));

        let (anon, _) = mint(SECRET, "anon", now);
        assert!(matches!(validator.validate(&anon, now), Err(TokenError::Rejected(_))));
    }

    #[test]
    fn expiry_uses_supplied_clock() {
        let now = Utc::now();
        let (token, _) = mint(SECRET, "authenticated", now);
        let validator = Hs256JwtValidator::new(SECRET, "authenticated");
        assert_eq!(
            validator.validate(&token, now + Duration::minutes(6)),
            Err(TokenError::Expired)
        );
    }
}
