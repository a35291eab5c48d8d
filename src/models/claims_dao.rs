use crate::models::token_dto::TokenRequest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Caller identity carried inside a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub emp_code: String,
    pub site: String,
}

impl From<TokenRequest> for Identity {
    fn from(req: TokenRequest) -> Self {
        Identity {
            username: req.username,
            emp_code: req.emp_code,
            site: req.site,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    #[serde(rename = "empCode")]
    pub emp_code: String,
    pub site: String,
    pub iat: i64, // Issued at
    pub exp: i64, // Expiration time
}

impl Claims {
    /// Returns `None` when `issued_at + ttl` is not a representable time.
    pub fn new(identity: Identity, issued_at: DateTime<Utc>, ttl: Duration) -> Option<Claims> {
        let ttl = chrono::Duration::from_std(ttl).ok()?;
        let expires_at = issued_at.checked_add_signed(ttl)?;
        Some(Claims {
            username: identity.username,
            emp_code: identity.emp_code,
            site: identity.site,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        })
    }

    pub fn identity(&self) -> Identity {
        Identity {
            username: self.username.clone(),
            emp_code: self.emp_code.clone(),
            site: self.site.clone(),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}
