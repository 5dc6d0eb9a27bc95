pub mod gate;

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use gate::{AuthorizationError, Decision, DenyReason, SuperadminGate};

/// Audience Supabase stamps on access tokens issued to signed-in users.
pub const SUPABASE_AUDIENCE: &str = "authenticated";

/// Cookie the Supabase auth helpers store the access token in.
pub const ACCESS_TOKEN_COOKIE: &str = "sb-access-token";

/// Supabase access token claims (only the fields we read)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    pub aud: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

/// Caller identity resolved from the request session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: String,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl From<Claims> for SessionIdentity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid Authorization header: {0}")]
    InvalidHeader(String),

    #[error("Invalid access token: {0}")]
    InvalidToken(String),
}

/// Maps an inbound request to the calling identity, if there is one.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<SessionIdentity>, SessionError>;
}

/// Verifies Supabase access tokens locally with the project's JWT secret.
pub struct JwtSessionResolver {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionResolver {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[SUPABASE_AUDIENCE]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, SessionError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| SessionError::InvalidToken(e.to_string()))
    }
}

#[async_trait]
impl SessionResolver for JwtSessionResolver {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<SessionIdentity>, SessionError> {
        let Some(token) = extract_access_token(headers)? else {
            return Ok(None);
        };

        let claims = self.verify(&token)?;
        Ok(Some(SessionIdentity::from(claims)))
    }
}

/// Pull the access token from `Authorization: Bearer`, falling back to the
/// Supabase session cookie. `Ok(None)` means the request carries no session.
pub fn extract_access_token(headers: &HeaderMap) -> Result<Option<String>, SessionError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| SessionError::InvalidHeader("not valid ASCII".to_string()))?;

        // The auth scheme is case-insensitive (RFC 7235).
        let (scheme, token) = auth_str.trim().split_once(' ').unwrap_or((auth_str.trim(), ""));
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(SessionError::InvalidHeader("must use Bearer token format".to_string()));
        }
        let token = token.trim();

        if token.is_empty() {
            return Err(SessionError::InvalidHeader("empty bearer token".to_string()));
        }
        return Ok(Some(token.to_string()));
    }

    Ok(session_cookie(headers))
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == ACCESS_TOKEN_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
