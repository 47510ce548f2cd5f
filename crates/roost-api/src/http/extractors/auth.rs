//! Caller identity extractor.
//!
//! Reads the credential from:
//! - `Authorization: Bearer <token>` header
//! - `token` cookie
//!
//! and resolves it to a user id through the `IdentityResolver` port.

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;

use roost_core::repository::identity::IdentityResolver;
use roost_types::error::ChatError;
use roost_types::user::UserId;

use crate::http::error::AppError;
use crate::state::AppState;

/// The authenticated caller. Extracting this rejects unauthenticated requests.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub UserId);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let credential = extract_credential(parts).ok_or(ChatError::Unauthenticated)?;

        match state.tokens.resolve(&credential).await {
            Ok(Some(user_id)) => Ok(CurrentUser(user_id)),
            Ok(None) => Err(ChatError::Unauthenticated.into()),
            Err(e) => Err(AppError::Internal(format!("identity lookup failed: {e}"))),
        }
    }
}

/// Pull the raw credential from the request, header first.
fn extract_credential(parts: &Parts) -> Option<String> {
    if let Some(auth) = parts.headers.get(AUTHORIZATION) {
        if let Some(token) = auth.to_str().ok()?.strip_prefix("Bearer ") {
            let token = token.trim();
            return (!token.is_empty()).then(|| token.to_string());
        }
    }

    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == "token" && !value.is_empty()).then(|| value.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/chats");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn bearer_header() {
        let p = parts(&[("authorization", "Bearer roost_abc")]);
        assert_eq!(extract_credential(&p).as_deref(), Some("roost_abc"));
    }

    #[test]
    fn token_cookie() {
        let p = parts(&[("cookie", "theme=dark; token=roost_xyz; lang=en")]);
        assert_eq!(extract_credential(&p).as_deref(), Some("roost_xyz"));
    }

    #[test]
    fn header_wins_over_cookie() {
        let p = parts(&[
            ("authorization", "Bearer roost_header"),
            ("cookie", "token=roost_cookie"),
        ]);
        assert_eq!(extract_credential(&p).as_deref(), Some("roost_header"));
    }

    #[test]
    fn missing_or_empty_credentials() {
        assert!(extract_credential(&parts(&[])).is_none());
        assert!(extract_credential(&parts(&[("authorization", "Bearer ")])).is_none());
        assert!(extract_credential(&parts(&[("cookie", "token=")])).is_none());
        assert!(extract_credential(&parts(&[("cookie", "mytoken=roost_a")])).is_none());
    }
}
