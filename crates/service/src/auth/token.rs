//! Session tokens: self-contained HS256 JWTs, never stored server-side.

use std::collections::BTreeSet;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::domain::{Principal, RoleName};
use super::errors::AuthError;

/// Default token lifetime (12 hours)
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 12 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Account email
    pub sub: String,
    pub uid: Uuid,
    pub name: String,
    pub roles: BTreeSet<RoleName>,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn for_principal(principal: &Principal, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: principal.email.clone(),
            uid: principal.id,
            name: principal.name.clone(),
            roles: principal.roles.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    pub fn principal(&self) -> Principal {
        Principal { id: self.uid, name: self.name.clone(), email: self.sub.clone(), roles: self.roles.clone() }
    }
}

/// Signs and verifies session tokens; algorithm and keys are up to the implementation.
pub trait TokenSigner: Send + Sync {
    fn sign(&self, claims: &SessionClaims) -> Result<String, AuthError>;
    /// Any invalid, tampered or expired token is [`AuthError::Unauthorized`].
    fn verify(&self, token: &str) -> Result<SessionClaims, AuthError>;
    fn ttl(&self) -> Duration;
}

pub struct JwtTokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtTokenSigner {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn with_default_ttl(secret: &str) -> Self {
        Self::new(secret, Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES))
    }
}

impl TokenSigner for JwtTokenSigner {
    fn sign(&self, claims: &SessionClaims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(|e| AuthError::TokenError(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(err = %e, "token rejected");
                AuthError::Unauthorized
            })
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}
