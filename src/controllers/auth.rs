use askama::Template;
use axum::extract::{Form, State};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::Deserialize;

use crate::auth::session::{Flash, SessionUser};
use crate::auth::{hash_password, verify_password};
use crate::error::AppError;
use crate::extractors::Session;
use crate::models::user::{self, Entity as User};
use crate::views::{LoginTemplate, RegisterTemplate};

use super::{see_other, AppState};

const MIN_PASSWORD_LENGTH: usize = 8;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_form).post(register))
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout))
}

// ── Request types ──

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

// ── Handlers ──

async fn register_form(session: Session) -> Result<Response, AppError> {
    render_register(&session, None)
}

/// Create an account, log it in, and send the visitor home.
async fn register(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let username = form.username.trim().to_string();
    let email = form.email.trim().to_string();

    if username.is_empty() || email.is_empty() || form.password.is_empty() {
        return render_register(
            &session,
            Some(Flash::error("Username, email, and password are required")),
        );
    }

    if form.password.len() < MIN_PASSWORD_LENGTH {
        return render_register(
            &session,
            Some(Flash::error(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            ))),
        );
    }

    let existing = User::find()
        .filter(
            user::Column::Email
                .eq(&email)
                .or(user::Column::Username.eq(&username)),
        )
        .one(&state.db)
        .await?;

    if existing.is_some() {
        return render_register(
            &session,
            Some(Flash::error(
                "An account with this email or username already exists",
            )),
        );
    }

    let password_hash = hash_password(&form.password)?;
    let now = Utc::now().naive_utc();

    let new_user = user::ActiveModel {
        email: Set(email),
        username: Set(username),
        password_hash: Set(password_hash),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let user_model = new_user.insert(&state.db).await?;
    tracing::info!(user_id = user_model.id, username = %user_model.username, "account registered");

    let flash = Flash::success(format!("Welcome, {}!", user_model.username));
    let cookie = session
        .log_in(
            &state.db,
            &state.config.session_secret,
            SessionUser {
                id: user_model.id,
                username: user_model.username,
            },
            Some(flash),
        )
        .await?;

    Ok(see_other("/", Some(cookie)))
}

async fn login_form(session: Session) -> Result<Response, AppError> {
    render_login(&session, None)
}

/// Verify credentials and rotate the session.
///
/// Bad credentials re-render the form without revealing which field was
/// wrong.
async fn login(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let user_model = User::find()
        .filter(user::Column::Email.eq(form.email.trim()))
        .one(&state.db)
        .await?;

    let Some(user_model) = user_model else {
        return render_login(&session, Some(Flash::error("Invalid email or password")));
    };

    if !verify_password(&form.password, &user_model.password_hash)? {
        return render_login(&session, Some(Flash::error("Invalid email or password")));
    }

    tracing::info!(user_id = user_model.id, username = %user_model.username, "logged in");

    let flash = Flash::success(format!("Welcome back, {}!", user_model.username));
    let cookie = session
        .log_in(
            &state.db,
            &state.config.session_secret,
            SessionUser {
                id: user_model.id,
                username: user_model.username,
            },
            Some(flash),
        )
        .await?;

    Ok(see_other("/", Some(cookie)))
}

/// Destroy the session and expire the cookie.
async fn logout(State(state): State<AppState>, mut session: Session) -> Result<Response, AppError> {
    let cookie = session
        .log_out(&state.db, &state.config.session_secret)
        .await?;
    Ok(see_other("/", Some(cookie)))
}

// ── Rendering helpers ──

fn render_register(session: &Session, messages: Option<Flash>) -> Result<Response, AppError> {
    let page = RegisterTemplate {
        title: "Create an account",
        user: session.user().cloned(),
        messages,
    };
    Ok(Html(page.render()?).into_response())
}

fn render_login(session: &Session, messages: Option<Flash>) -> Result<Response, AppError> {
    let page = LoginTemplate {
        title: "Log in",
        user: session.user().cloned(),
        messages,
    };
    Ok(Html(page.render()?).into_response())
}
