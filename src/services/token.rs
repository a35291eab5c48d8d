use crate::models::claims_dao::{Claims, Identity};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authorization header required in the form `Bearer <token>`")]
    MissingOrMalformedHeader,
    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Failed to generate token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("Token lifetime of {0:?} is out of range")]
    TtlOutOfRange(Duration),
}

/// Issues and validates HS256 bearer tokens. The key is shared read-only
/// across requests.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> TokenService {
        TokenService {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn issue(&self, identity: Identity) -> Result<String, TokenError> {
        let claims = Claims::new(identity, Utc::now(), self.ttl)
            .ok_or(TokenError::TtlOutOfRange(self.ttl))?;
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        Ok(encode(
            &Header::new(Algorithm::HS256),
            claims,
            &self.encoding_key,
        )?)
    }

    /// Validate the raw value of an `Authorization` header.
    pub fn validate(&self, header: Option<&str>) -> Result<Claims, AuthError> {
        let token = header
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingOrMalformedHeader)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            debug!("token rejected: {e}");
            AuthError::InvalidOrExpiredToken
        })?;

        // jsonwebtoken accepts exp == now, the window is exclusive here
        if data.claims.is_expired_at(Utc::now()) {
            return Err(AuthError::InvalidOrExpiredToken);
        }

        Ok(data.claims)
    }
}
