use askama::Template;
use axum::extract::{Path, State};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::error::AppError;
use crate::extractors::Session;
use crate::models::sound::{self, Entity as Sound, SoundCard};
use crate::models::user::{self, Entity as User};
use crate::views::ProfileTemplate;

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/{username}", get(profile))
}

/// A user's profile: join date plus their sounds. Visitors see only the
/// public ones; the owner sees everything.
async fn profile(
    State(state): State<AppState>,
    session: Session,
    Path(username): Path<String>,
) -> Result<Html<String>, AppError> {
    let Some(profile_user) = User::find()
        .filter(user::Column::Username.eq(&username))
        .one(&state.db)
        .await?
    else {
        return Err(AppError::NotFound(format!("no user named {username}")));
    };

    let viewing_own = session.user().map(|u| u.id) == Some(profile_user.id);

    let mut find = Sound::find().filter(sound::Column::UploaderId.eq(profile_user.id));
    if !viewing_own {
        find = find.filter(sound::Column::IsPublic.eq(true));
    }

    let rows = find
        .order_by_desc(sound::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let sounds: Vec<SoundCard> = rows
        .into_iter()
        .map(|s| SoundCard::new(s, Some(profile_user.clone())))
        .collect();

    let page = ProfileTemplate {
        title: format!("{}'s sounds", profile_user.username),
        user: session.user().cloned(),
        profile_name: profile_user.username.clone(),
        joined: profile_user.created_at.format("%b %d, %Y").to_string(),
        sounds,
    };
    Ok(Html(page.render()?))
}
