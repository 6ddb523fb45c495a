//! Login and logout endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::application::messages::{Locale, Message};
use crate::infrastructure::error::AuthError;
use crate::infrastructure::traits::{Caller, CredentialService};
use crate::server::error::ApiError;
use crate::server::ServerState;

const TOKEN_SCHEMES: [&str; 2] = ["Token", "Bearer"];

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// The key from `Authorization: Token <key>` or `Authorization: Bearer <key>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, key) = value.trim().split_once(' ')?;
    let key = key.trim();
    (TOKEN_SCHEMES.iter().any(|s| s.eq_ignore_ascii_case(scheme)) && !key.is_empty()).then_some(key)
}

pub fn caller_from_headers(headers: &HeaderMap, credentials: &dyn CredentialService) -> Option<Caller> {
    bearer_token(headers).and_then(|token| credentials.identify(token))
}

/// POST /api/auth/login/
pub(crate) async fn login(
    State(state): State<ServerState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let locale = Locale::default();
    let request = body.map(|Json(r)| r).unwrap_or_else(|rejection| {
        debug!(%rejection, "unreadable login body");
        LoginRequest::default()
    });
    let (Some(username), Some(password)) = (
        request.username.filter(|u| !u.is_empty()),
        request.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::plain(
            StatusCode::BAD_REQUEST,
            Message::MissingParams.render(locale),
        ));
    };

    match state.credentials.login(&username, &password) {
        Ok(session) => Ok(Json(LoginResponse {
            token: session.token,
            user_id: session.user_id,
            username: session.username,
            email: session.email,
        })),
        Err(AuthError::InvalidCredentials) => Err(ApiError::plain(
            StatusCode::UNAUTHORIZED,
            Message::InvalidCredentials.render(locale),
        )),
        Err(e) => {
            error!(error = %e, "login failed");
            Err(ApiError::plain(
                StatusCode::BAD_REQUEST,
                Message::Unexpected.render(locale),
            ))
        }
    }
}

/// POST /api/auth/logout/
pub(crate) async fn logout(
    State(state): State<ServerState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    let locale = Locale::default();
    let Some(token) = bearer_token(&headers).filter(|t| state.credentials.identify(t).is_some())
    else {
        return Err(ApiError::unauthorized(locale));
    };
    state.credentials.logout(token);
    Ok(Json(MessageResponse {
        message: Message::LoggedOut.render(locale),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Token abc123", Some("abc123"))]
    #[case("Bearer abc123", Some("abc123"))]
    #[case("token   abc123 ", Some("abc123"))]
    #[case("Basic abc123", None)]
    #[case("Token", None)]
    #[case("Token ", None)]
    fn given_authorization_header_when_extracting_then_expected_token(
        #[case] value: &str,
        #[case] expected: Option<&str>,
    ) {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        assert_eq!(bearer_token(&headers), expected);
    }

    #[test]
    fn given_no_header_when_extracting_then_none() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
