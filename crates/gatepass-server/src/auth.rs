use std::collections::BTreeMap;

use async_trait::async_trait;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use gatepass_types::OwnerId;
use subtle::ConstantTimeEq;

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug)]
pub enum Credentials {
    Bearer(String),
    Anonymous,
}

impl Credentials {
    /// Extract `Authorization: Bearer <token>` from request headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map_or(Self::Anonymous, |t| Self::Bearer(t.to_owned()))
    }
}

/// Resolves a bearer credential to a stable subject identifier.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<OwnerId>;
}

/// Identity provider backed by a fixed token → subject table.
pub struct StaticTokenProvider {
    tokens: Vec<(String, OwnerId)>,
}

impl StaticTokenProvider {
    pub fn new(tokens: &BTreeMap<String, String>) -> Self {
        Self {
            tokens: tokens
                .iter()
                .map(|(token, subject)| (token.clone(), OwnerId::new(subject.as_str())))
                .collect(),
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticTokenProvider {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<OwnerId> {
        let Credentials::Bearer(presented) = credentials else {
            return Err(ServerError::Authentication("no token provided".into()));
        };
        // Compare against every entry so lookup time does not depend on which one matched.
        let mut found = None;
        for (token, subject) in &self.tokens {
            if bool::from(token.as_bytes().ct_eq(presented.as_bytes())) {
                found = Some(subject);
            }
        }
        found
            .cloned()
            .ok_or_else(|| ServerError::Authentication("unknown token".into()))
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("token_count", &self.tokens.len())
            .finish()
    }
}

/// The authenticated subject must be the user the request claims to act for.
pub fn authorize(subject: &OwnerId, claimed_user_id: &str) -> ServerResult<()> {
    if subject.as_str() != claimed_user_id {
        return Err(ServerError::Authorization {
            claimed: claimed_user_id.to_owned(),
            subject: subject.clone(),
        });
    }
    Ok(())
}
