use askama::Template;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::auth::session::Flash;
use crate::error::AppError;
use crate::extractors::Session;
use crate::models::sound::{self, Entity as Sound, SoundCard};
use crate::models::user::Entity as User;
use crate::views::HomeTemplate;

use super::AppState;

pub const HOME_TITLE: &str = "Mental Wellness Soundboard";

/// How many sounds the home page shows.
const HOME_PAGE_LIMIT: u64 = 12;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(index))
}

/// The home page: the twelve most recent public sounds, newest first.
///
/// A fetch failure never reaches the visitor as a crash — the page renders
/// with an empty listing and an error flash, and the detail is logged.
async fn index(
    State(state): State<AppState>,
    mut session: Session,
) -> Result<Html<String>, AppError> {
    let flash = match session.take_flash(&state.db).await {
        Ok(flash) => flash,
        Err(err) => {
            tracing::warn!(error = %err, "failed to consume flash message");
            None
        }
    };

    let (sounds, messages) = match fetch_home_sounds(&state.db).await {
        Ok(sounds) => (sounds, flash),
        Err(err) => {
            tracing::error!(error = %err, "failed to load sounds for the home page");
            (Vec::new(), Some(Flash::error("Failed to load sounds")))
        }
    };

    let page = HomeTemplate {
        title: HOME_TITLE,
        user: session.user().cloned(),
        sounds,
        current_mood: "all".to_string(),
        messages,
    };
    Ok(Html(page.render()?))
}

/// Up to twelve most recent public sounds, each resolved to a card that
/// carries just the uploader's username.
async fn fetch_home_sounds(db: &DatabaseConnection) -> Result<Vec<SoundCard>, DbErr> {
    let rows = Sound::find()
        .filter(sound::Column::IsPublic.eq(true))
        .find_also_related(User)
        .order_by_desc(sound::Column::CreatedAt)
        .limit(HOME_PAGE_LIMIT)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(sound, uploader)| SoundCard::new(sound, uploader))
        .collect())
}
