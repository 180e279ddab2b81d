use askama::Template;
use axum::extract::{Multipart, Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;

use crate::auth::session::Flash;
use crate::error::AppError;
use crate::extractors::Session;
use crate::models::sound::{self, Category, Entity as Sound, SoundCard};
use crate::models::user::Entity as User;
use crate::storage::{looks_like_audio, LocalStorage};
use crate::views::{HomeTemplate, SoundTemplate, UploadTemplate};

use super::{see_other, AppState};

const BROWSE_TITLE: &str = "Browse Sounds";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/upload", get(upload_form).post(upload))
        .route("/{id}", get(detail))
        .route("/{id}/delete", post(delete))
}

// ── Request types ──

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub mood: Option<String>,
}

// ── Handlers ──

/// Public sounds, optionally narrowed to one mood. Unknown mood values
/// fall back to the unfiltered listing.
async fn list(
    State(state): State<AppState>,
    mut session: Session,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, AppError> {
    let flash = session.take_flash(&state.db).await?;
    let mood = query.mood.as_deref().and_then(Category::parse);

    let mut find = Sound::find().filter(sound::Column::IsPublic.eq(true));
    if let Some(mood) = mood {
        find = find.filter(sound::Column::Category.eq(mood));
    }

    let rows = find
        .find_also_related(User)
        .order_by_desc(sound::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let page = HomeTemplate {
        title: BROWSE_TITLE,
        user: session.user().cloned(),
        sounds: rows
            .into_iter()
            .map(|(s, u)| SoundCard::new(s, u))
            .collect(),
        current_mood: mood
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "all".to_string()),
        messages: flash,
    };
    Ok(Html(page.render()?))
}

/// Sound detail page. Private sounds are visible only to their uploader;
/// everyone else gets a 404 rather than a hint that the sound exists.
async fn detail(
    State(state): State<AppState>,
    mut session: Session,
    Path(id): Path<i32>,
) -> Result<Html<String>, AppError> {
    let row = Sound::find_by_id(id)
        .find_also_related(User)
        .one(&state.db)
        .await?;

    let Some((sound_model, uploader)) = row else {
        return Err(AppError::NotFound(format!("no sound with id {id}")));
    };

    let is_owner = session.user().map(|u| u.id) == Some(sound_model.uploader_id);
    if !sound_model.is_public && !is_owner {
        return Err(AppError::NotFound(format!("no sound with id {id}")));
    }

    let flash = session.take_flash(&state.db).await?;
    let card = SoundCard::new(sound_model, uploader);

    let page = SoundTemplate {
        title: card.title.clone(),
        user: session.user().cloned(),
        sound: card,
        messages: flash,
        can_delete: is_owner,
    };
    Ok(Html(page.render()?))
}

async fn upload_form(session: Session) -> Result<Response, AppError> {
    if session.user().is_none() {
        return Ok(Redirect::to("/login").into_response());
    }
    render_upload(&session, None)
}

/// Accept a multipart upload, store the file, and create the sound.
async fn upload(
    State(state): State<AppState>,
    mut session: Session,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let Some(current) = session.user().cloned() else {
        return Ok(Redirect::to("/login").into_response());
    };

    let mut title = String::new();
    let mut category = None;
    // An unchecked checkbox is simply absent from the form.
    let mut is_public = false;
    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_upload)? {
        match field.name() {
            Some("title") => title = field.text().await.map_err(bad_upload)?.trim().to_string(),
            Some("category") => {
                category = Category::parse(field.text().await.map_err(bad_upload)?.trim());
            }
            Some("is_public") => {
                let value = field.text().await.map_err(bad_upload)?;
                is_public = matches!(value.as_str(), "on" | "true" | "1");
            }
            Some("file") => {
                let filename = field.file_name().unwrap_or("sound").to_string();
                let content_type = field.content_type().map(|s| s.to_string());
                let bytes = field.bytes().await.map_err(bad_upload)?;
                file = Some((filename, content_type, bytes.to_vec()));
            }
            _ => {}
        }
    }

    if title.is_empty() {
        return render_upload(&session, Some(Flash::error("A title is required")));
    }
    let Some(category) = category else {
        return render_upload(&session, Some(Flash::error("Pick a mood category")));
    };
    let Some((filename, content_type, data)) = file else {
        return render_upload(&session, Some(Flash::error("Choose an audio file")));
    };
    if data.is_empty() {
        return render_upload(&session, Some(Flash::error("Choose an audio file")));
    }
    if data.len() as u64 > state.config.max_upload_size {
        return render_upload(&session, Some(Flash::error("File is too large")));
    }
    if !looks_like_audio(content_type.as_deref(), &filename) {
        return render_upload(&session, Some(Flash::error("Only audio files are accepted")));
    }

    let stored = state.storage.store(&filename, &data).await?;
    let now = Utc::now().naive_utc();

    let new_sound = sound::ActiveModel {
        title: Set(title),
        category: Set(category),
        is_public: Set(is_public),
        file_path: Set(stored.url.clone()),
        uploader_id: Set(current.id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let sound_model = new_sound.insert(&state.db).await?;
    tracing::info!(
        sound_id = sound_model.id,
        user_id = current.id,
        size = stored.size,
        "sound uploaded"
    );

    let cookie = session
        .put_flash(
            &state.db,
            &state.config.session_secret,
            Flash::success("Sound uploaded"),
        )
        .await?;
    Ok(see_other(&format!("/sounds/{}", sound_model.id), cookie))
}

/// Remove a sound and its stored file. Owner only; anyone else gets 404.
async fn delete(
    State(state): State<AppState>,
    mut session: Session,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let Some(current) = session.user().cloned() else {
        return Ok(Redirect::to("/login").into_response());
    };

    let Some(sound_model) = Sound::find_by_id(id).one(&state.db).await? else {
        return Err(AppError::NotFound(format!("no sound with id {id}")));
    };

    if sound_model.uploader_id != current.id {
        return Err(AppError::NotFound(format!("no sound with id {id}")));
    }

    if let Some(name) = LocalStorage::stored_name_from_url(&sound_model.file_path) {
        if let Err(err) = state.storage.delete(name).await {
            tracing::warn!(error = %err, sound_id = id, "failed to remove stored file");
        }
    }

    Sound::delete_by_id(id).exec(&state.db).await?;
    tracing::info!(sound_id = id, user_id = current.id, "sound deleted");

    let cookie = session
        .put_flash(
            &state.db,
            &state.config.session_secret,
            Flash::success("Sound deleted"),
        )
        .await?;
    Ok(see_other("/sounds", cookie))
}

// ── Helpers ──

fn bad_upload(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("malformed upload form: {err}"))
}

fn render_upload(session: &Session, messages: Option<Flash>) -> Result<Response, AppError> {
    let page = UploadTemplate {
        title: "Upload a sound",
        user: session.user().cloned(),
        messages,
    };
    Ok(Html(page.render()?).into_response())
}
