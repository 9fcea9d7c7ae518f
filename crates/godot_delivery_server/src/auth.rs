use crate::api::ApiError;
use crate::state::AppState;

use godot_delivery_core::prelude::{credentials::MANAGER_USER, *};

use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, header::AUTHORIZATION, request::Parts},
};
use base64::{Engine, engine::general_purpose::STANDARD};

/// A request carrying the manager's basic auth credential.
///
/// Rejects with **HTTP 403** before the request body is read.
#[derive(Clone, Debug)]
pub struct ManagerAuth;

impl FromRequestParts<AppState> for ManagerAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::Missing)?;

        let (user, password) = parse_basic(header).ok_or(AuthError::Invalid)?;

        let expected = state.config.manager_password.as_str();
        let user_matches = constant_time_eq(user.as_bytes(), MANAGER_USER.as_bytes());
        let password_matches = constant_time_eq(password.as_bytes(), expected.as_bytes());
        if expected.is_empty() || !(user_matches & password_matches) {
            return Err(AuthError::Invalid.into());
        }

        Ok(ManagerAuth)
    }
}

/// Decodes `Basic <base64(user:password)>`.
fn parse_basic(header: &HeaderValue) -> Option<(String, String)> {
    let (scheme, encoded) = header.to_str().ok()?.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

/// Compares without exiting at the first differing byte. Only the length is leaked.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
