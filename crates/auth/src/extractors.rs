//! Axum extractors for authentication
//!
//! Generic over any state `S` where `AuthBackend: FromRef<S>`.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::backend::{AuthBackend, AuthContext, IdentityContext};
use crate::error::AuthError;
use crate::jwt::extract_bearer_token;

/// Authenticated caller extractor (bearer JWT)
#[derive(Debug)]
pub struct AuthUser(pub AuthContext);

impl<S> FromRequestParts<S> for AuthUser
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = bearer(parts)?;
        let auth_context = AuthBackend::from_ref(state).authenticate_jwt(&token)?;

        Ok(AuthUser(auth_context))
    }
}

/// Caller with a valid token who may not have a local user yet
#[derive(Debug)]
pub struct IdentityCaller(pub IdentityContext);

impl<S> FromRequestParts<S> for IdentityCaller
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = bearer(parts)?;
        let identity = AuthBackend::from_ref(state).authenticate_identity(&token)?;

        Ok(IdentityCaller(identity))
    }
}

fn bearer(parts: &Parts) -> Result<String, AuthError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthorization)?;
    extract_bearer_token(auth_header)
}
