//! Bearer-token session verification.
//!
//! The identity provider mints the tokens; this module only verifies them
//! (HS256 against the shared secret) and exposes the caller's identity to
//! handlers. `Session` rejects with 401, `MaybeSession` is for the public
//! certificate form where a session merely attaches ownership.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub email: Option<String>,
}

fn verify_bearer(parts: &Parts, secret: &str) -> Result<Session, AppError> {
    let token = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("No autorizado".to_string()))?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|_| AppError::Unauthorized("No autorizado".to_string()))?;

    let user_id = Uuid::parse_str(&token_data.claims.sub)
        .map_err(|_| AppError::Unauthorized("No autorizado".to_string()))?;

    Ok(Session {
        user_id,
        email: token_data.claims.email,
    })
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        verify_bearer(parts, &state.config.jwt_secret)
    }
}

/// Optional session: absent or invalid credentials become `None` instead of
/// a rejection.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<Session>);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for MaybeSession {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeSession(
            verify_bearer(parts, &state.config.jwt_secret).ok(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn token_for(sub: &str, exp: usize) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            email: Some("vet@example.com".to_string()),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn parts_with(header_value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header_value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let (parts, _) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn accepts_a_valid_token() {
        let user_id = Uuid::new_v4();
        let token = token_for(&user_id.to_string(), far_future());
        let parts = parts_with(Some(&format!("Bearer {}", token)));
        let session = verify_bearer(&parts, SECRET).unwrap();
        assert_eq!(session.user_id, user_id);
        assert_eq!(session.email.as_deref(), Some("vet@example.com"));
    }

    #[test]
    fn rejects_a_missing_header() {
        let parts = parts_with(None);
        assert!(verify_bearer(&parts, SECRET).is_err());
    }

    #[test]
    fn rejects_an_expired_token() {
        let token = token_for(&Uuid::new_v4().to_string(), 1_000);
        let parts = parts_with(Some(&format!("Bearer {}", token)));
        assert!(verify_bearer(&parts, SECRET).is_err());
    }

    #[test]
    fn rejects_a_non_uuid_subject() {
        let token = token_for("service-account", far_future());
        let parts = parts_with(Some(&format!("Bearer {}", token)));
        assert!(verify_bearer(&parts, SECRET).is_err());
    }

    fn far_future() -> usize {
        (chrono::Utc::now().timestamp() + 3600) as usize
    }
}
