//! services/api/src/web/auth.rs
//!
//! Verification of the session tokens issued by the external identity
//! provider, and the extractor handlers use to read the resulting caller.

use axum::{extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use summary_core::CallerContext;

/// Claims the identity provider puts in its session tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Identity-provider subject, the external user identifier.
    pub sub: String,
    /// Expiration timestamp.
    pub exp: usize,
}

/// Verifies HS256 session tokens against a shared secret.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Returns the caller vouched for by `token`.
    pub fn verify(&self, token: &str) -> Result<CallerContext, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(CallerContext::new(data.claims.sub))
    }
}

/// The authenticated caller of the current request, if any.
///
/// Populated by the [`authenticate`](crate::web::middleware::authenticate)
/// middleware; never rejects, so handlers decide how to answer anonymous calls.
pub struct Caller(pub Option<CallerContext>);

impl Caller {
    pub fn context(&self) -> Option<&CallerContext> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller(parts.extensions.get::<CallerContext>().cloned()))
    }
}
