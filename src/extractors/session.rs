use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use sea_orm::DatabaseConnection;

use crate::auth::session::{self, Flash, SessionData, SessionUser, SESSION_COOKIE};
use crate::controllers::AppState;
use crate::error::AppError;

/// Extractor giving handlers the request's session.
///
/// A missing, invalid, or expired cookie yields an anonymous session — no
/// page should fail just because the visitor has no session yet. A session
/// store read failure is logged and likewise treated as anonymous.
///
/// ```rust,ignore
/// async fn my_handler(State(state): State<AppState>, session: Session) -> impl IntoResponse {
///     let username = session.user().map(|u| u.username.as_str());
///     // ...
/// }
/// ```
#[derive(Debug, Default)]
pub struct Session {
    record_id: Option<i32>,
    token: Option<String>,
    data: SessionData,
}

impl Session {
    /// The logged-in user's projection, if any.
    pub fn user(&self) -> Option<&SessionUser> {
        self.data.user.as_ref()
    }

    /// Take the pending flash message, removing it from the store.
    /// Read-once: a second call (or a second request) sees nothing.
    pub async fn take_flash(&mut self, db: &DatabaseConnection) -> Result<Option<Flash>, AppError> {
        let flash = self.data.flash.take();
        if flash.is_some() {
            if let Some(id) = self.record_id {
                session::save(db, id, &self.data).await?;
            }
        }
        Ok(flash)
    }

    /// Store a flash message for the next rendered page.
    ///
    /// Creates the session lazily if the visitor has none yet; in that
    /// case the returned `Set-Cookie` value must be attached to the
    /// response.
    pub async fn put_flash(
        &mut self,
        db: &DatabaseConnection,
        secret: &str,
        flash: Flash,
    ) -> Result<Option<String>, AppError> {
        self.data.flash = Some(flash);

        match self.record_id {
            Some(id) => {
                session::save(db, id, &self.data).await?;
                Ok(None)
            }
            None => {
                let (id, token) = session::create(db, secret, &self.data).await?;
                self.record_id = Some(id);
                let cookie = session::cookie(&token);
                self.token = Some(token);
                Ok(Some(cookie))
            }
        }
    }

    /// Start a fresh session for `user`, discarding any existing one
    /// (tokens rotate on login). Returns the `Set-Cookie` value.
    pub async fn log_in(
        &mut self,
        db: &DatabaseConnection,
        secret: &str,
        user: SessionUser,
        flash: Option<Flash>,
    ) -> Result<String, AppError> {
        if let Some(token) = self.token.take() {
            session::destroy(db, secret, &token).await?;
        }

        self.data = SessionData {
            user: Some(user),
            flash,
        };
        let (id, token) = session::create(db, secret, &self.data).await?;
        self.record_id = Some(id);
        let cookie = session::cookie(&token);
        self.token = Some(token);
        Ok(cookie)
    }

    /// Destroy the session server-side. Returns the `Set-Cookie` value
    /// that expires the browser cookie.
    pub async fn log_out(
        &mut self,
        db: &DatabaseConnection,
        secret: &str,
    ) -> Result<String, AppError> {
        if let Some(token) = self.token.take() {
            session::destroy(db, secret, &token).await?;
        }
        self.record_id = None;
        self.data = SessionData::default();
        Ok(session::clear_cookie())
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = cookie_value(parts, SESSION_COOKIE) else {
            return Ok(Session::default());
        };

        match session::load(&state.db, &state.config.session_secret, &token).await {
            Ok(Some((id, data))) => Ok(Session {
                record_id: Some(id),
                token: Some(token),
                data,
            }),
            Ok(None) => Ok(Session::default()),
            Err(err) => {
                tracing::warn!(error = %err, "session load failed; treating request as anonymous");
                Ok(Session::default())
            }
        }
    }
}

fn cookie_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}
