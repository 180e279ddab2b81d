use std::sync::Arc;

use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::storage::LocalStorage;

/// Shared application state available in all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub storage: LocalStorage,
}

/// 303 redirect, optionally carrying a `Set-Cookie` from a session write.
pub(crate) fn see_other(to: &str, cookie: Option<String>) -> Response {
    match cookie {
        Some(cookie) => (AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to(to)).into_response(),
        None => Redirect::to(to).into_response(),
    }
}

pub mod auth;
pub mod home;
pub mod sounds;
pub mod users;
