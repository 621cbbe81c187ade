//! Caller identity seam.
//!
//! Token issuance, password hashing and user registration live in an
//! external identity service; this module only consumes an opaque bearer
//! token and turns it into a caller identity plus role.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::utils::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// Verified caller identity as yielded by the authenticator.
#[derive(Debug, Clone, Copy)]
pub struct Claims {
    pub user_id: i64,
    pub role: Role,
}

/// Opaque credential verifier. Implementations must be pure lookups or
/// signature checks; no request state is consulted.
pub trait Authenticator: Send + Sync {
    fn verify(&self, token: &str) -> Result<Claims, AppError>;
}

/// Token table sourced from configuration: each entry maps a bearer token to
/// an existing user row. Stands in for the external identity service, which
/// honors the same `Authenticator` contract.
#[derive(Debug, Default)]
pub struct StaticTokenAuthenticator {
    tokens: HashMap<String, Claims>,
}

impl StaticTokenAuthenticator {
    /// Parses `API_TOKENS="<token>:<user_id>:<role>,..."`.
    pub fn from_env() -> Self {
        let raw = env::var("API_TOKENS").unwrap_or_default();
        let mut authenticator = Self::default();
        for entry in raw.split(',').filter(|e| !e.trim().is_empty()) {
            match parse_token_entry(entry.trim()) {
                Some((token, claims)) => {
                    authenticator.tokens.insert(token, claims);
                }
                None => {
                    tracing::warn!(entry, "Ignoring malformed API_TOKENS entry");
                }
            }
        }
        tracing::info!(count = authenticator.tokens.len(), "Configured bearer tokens");
        authenticator
    }

    pub fn with_token(mut self, token: &str, claims: Claims) -> Self {
        self.tokens.insert(token.to_string(), claims);
        self
    }
}

fn parse_token_entry(entry: &str) -> Option<(String, Claims)> {
    let mut parts = entry.splitn(3, ':');
    let token = parts.next()?.to_string();
    let user_id = parts.next()?.parse::<i64>().ok()?;
    let role = match parts.next()? {
        "user" => Role::User,
        "admin" => Role::Admin,
        _ => return None,
    };
    Some((token, Claims { user_id, role }))
}

impl Authenticator for StaticTokenAuthenticator {
    fn verify(&self, token: &str) -> Result<Claims, AppError> {
        self.tokens
            .get(token)
            .copied()
            .ok_or_else(|| AppError::Auth("Invalid or expired token".to_string()))
    }
}

fn bearer_claims(parts: &Parts, state: &AppState) -> Result<Claims, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Auth("Access denied. No token provided".to_string()))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Auth("Access denied. No token provided".to_string()))?;
    state.authenticator.verify(token)
}

/// Extractor for any authenticated caller (buyers and organizers alike).
pub struct AuthUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        bearer_claims(parts, state).map(AuthUser)
    }
}

/// Extractor for organizer-only endpoints.
pub struct AuthAdmin(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AuthAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let claims = bearer_claims(parts, state)?;
        if claims.role != Role::Admin {
            return Err(AppError::Forbidden(
                "Admin privileges required".to_string(),
            ));
        }
        Ok(AuthAdmin(claims))
    }
}

pub type SharedAuthenticator = Arc<dyn Authenticator>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_entry_parsing() {
        let (token, claims) = parse_token_entry("gate-1:7:admin").unwrap();
        assert_eq!(token, "gate-1");
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.role, Role::Admin);

        assert!(parse_token_entry("broken").is_none());
        assert!(parse_token_entry("t:nan:user").is_none());
        assert!(parse_token_entry("t:1:superuser").is_none());
    }

    #[test]
    fn test_static_authenticator_lookup() {
        let authenticator = StaticTokenAuthenticator::default().with_token(
            "buyer-1",
            Claims {
                user_id: 2,
                role: Role::User,
            },
        );
        assert_eq!(authenticator.verify("buyer-1").unwrap().user_id, 2);
        assert!(authenticator.verify("unknown").is_err());
    }
}
