use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sparekeep_core::UserId;

/// Access token claims issued by the hosted auth service.
///
/// Timestamps are seconds since the Unix epoch, as in any JWT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject / user identifier.
    pub sub: UserId,

    #[serde(default)]
    pub email: Option<String>,

    /// Audience ("authenticated" for signed-in users).
    pub aud: String,

    /// Issued-at.
    pub iat: i64,

    /// Expiration.
    pub exp: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("token rejected: {0}")]
    Rejected(String),
}

/// Deterministically validate the time window of decoded claims.
pub fn validate_claims(claims: &AccessClaims, now: DateTime<Utc>) -> Result<(), TokenError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_claims(now: DateTime<Utc>) -> AccessClaims {
        AccessClaims {
            sub: UserId::new(),
            email: Some("tech@plant.example".to_string()),
            aud: "authenticated".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(10)).timestamp(),
        }
    }

    #[test]
    fn accepts_inside_window() {
        let now = Utc::now();
        assert_eq!(validate_claims(&test_claims(now), now), Ok(()));
    }

    #[test]
    fn rejects_expired_and_future_tokens() {
        let now = Utc::now();
        let claims = test_claims(now);

        assert_eq!(
            validate_claims(&claims, now + Duration::minutes(11)),
            Err(TokenError::Expired)
        );
        assert_eq!(
            validate_claims(&claims, now - Duration::minutes(1)),
            Err(TokenError::NotYetValid)
        );
    }

    #[test]
    fn rejects_inverted_window() {
        let now = Utc::now();
        let mut claims = test_claims(now);
        claims.exp = claims.iat;
        assert_eq!(validate_claims(&claims, now), Err(TokenError::InvalidTimeWindow));
    }
}
