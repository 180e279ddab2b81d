use askama::Template;
use axum::http::StatusCode;
use axum::response::Html;
use axum::Router;
use tower_http::services::ServeDir;

use crate::config::Config;
use crate::controllers::{self, AppState};
use crate::error::AppError;
use crate::extractors::Session;
use crate::views::NotFoundTemplate;

/// Assemble the application routes: home and auth at the root, sounds and
/// users nested under their prefixes, static assets and uploads as file
/// services, and the 404 fallback for everything unmatched.
pub fn build_routes(config: &Config) -> Router<AppState> {
    Router::new()
        .merge(controllers::home::routes())
        .merge(controllers::auth::routes())
        .nest("/sounds", controllers::sounds::routes())
        .nest("/users", controllers::users::routes())
        .nest_service("/public", ServeDir::new("public"))
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .fallback(not_found)
}

/// Anything that matches no route: a 404 page that still carries the
/// session user so the navigation chrome stays consistent.
async fn not_found(session: Session) -> Result<(StatusCode, Html<String>), AppError> {
    let page = NotFoundTemplate {
        title: "Page Not Found",
        user: session.user().cloned(),
    };
    Ok((StatusCode::NOT_FOUND, Html(page.render()?)))
}
