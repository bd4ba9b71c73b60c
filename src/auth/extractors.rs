use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::auth::session::Identity;
use crate::error::AppError;
use crate::state::AppState;

/// Resolve the caller from the session cookie, if any.
fn identify(parts: &Parts, state: &AppState) -> Option<Identity> {
    let jar = CookieJar::from_headers(&parts.headers);
    let token = state.cookie.get(&jar)?;
    state.sessions.resolve(&token)
}

/// Requires a live session; rejects with 401 otherwise.
///
/// List it before any body extractor so nothing is read or written for
/// anonymous callers.
pub struct AuthUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match identify(parts, state) {
            Some(identity) => Ok(AuthUser(identity)),
            None => {
                debug!(path = %parts.uri.path(), "rejected unauthenticated request");
                Err(AppError::Unauthorized)
            }
        }
    }
}

/// Like [`AuthUser`] but never rejects.
pub struct MaybeAuthUser(pub Option<Identity>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(identify(parts, state)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Request};

    fn parts_with_cookie(cookie: Option<&str>) -> Parts {
        let mut req = Request::builder().uri("/products");
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        req.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_user_resolves_live_session() {
        let state = AppState::fake().await;
        let token = state.sessions.create(5, "alice");
        let mut parts = parts_with_cookie(Some(&format!("session_token={token}")));

        let AuthUser(id) = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(id.user_id, 5);
        assert_eq!(id.username, "alice");
    }

    #[tokio::test]
    async fn auth_user_rejects_missing_or_stale_cookie() {
        let state = AppState::fake().await;

        let mut parts = parts_with_cookie(None);
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Unauthorized));

        let token = state.sessions.create(5, "alice");
        state.sessions.invalidate(&token);
        let mut parts = parts_with_cookie(Some(&format!("session_token={token}")));
        assert!(AuthUser::from_request_parts(&mut parts, &state).await.is_err());
    }

    #[tokio::test]
    async fn maybe_auth_user_never_fails() {
        let state = AppState::fake().await;
        let mut parts = parts_with_cookie(Some("session_token=bogus"));
        let MaybeAuthUser(id) = MaybeAuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(id.is_none());
    }
}
