//! Database-backed cookie sessions.
//!
//! The browser holds an opaque random token in the `sb_session` cookie;
//! the server stores a keyed hash of that token next to a JSON payload
//! (the logged-in user's minimal projection and at most one pending flash
//! message). The payload expires 24 hours after the last write. Expired
//! rows are deleted lazily when the token is next presented.

use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::AppError;
use crate::models::session;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "sb_session";

/// Sessions expire this long after the last write.
const SESSION_TTL_HOURS: i64 = 24;

type HmacSha256 = Hmac<Sha256>;

// ─── Payload types ─────────────────────────────────────────────

/// The minimal projection of a logged-in user kept in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i32,
    pub username: String,
}

/// A read-once notification: shown on the next rendered page, then gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

impl FlashKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashKind::Success => "success",
            FlashKind::Error => "error",
        }
    }
}

impl Flash {
    pub fn success(text: impl Into<String>) -> Self {
        Flash {
            kind: FlashKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Flash {
            kind: FlashKind::Error,
            text: text.into(),
        }
    }
}

/// Everything a session row carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<Flash>,
}

// ─── Token helpers ─────────────────────────────────────────────

/// Generate a cryptographically secure random session token (hex-encoded).
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// Keyed hash of a session token for safe database storage.
pub fn hash_token(secret: &str, token: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Cookie string establishing a session in the browser.
pub fn cookie(token: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        SESSION_TTL_HOURS * 3600
    )
}

/// Cookie string that removes the session cookie from the browser.
pub fn clear_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

// ─── Store operations ──────────────────────────────────────────

fn encode(data: &SessionData) -> Result<String, AppError> {
    serde_json::to_string(data)
        .map_err(|e| AppError::Internal(format!("Failed to encode session data: {}", e)))
}

fn decode(raw: &str) -> Result<SessionData, AppError> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::Internal(format!("Failed to decode session data: {}", e)))
}

/// Insert a fresh session row carrying `data`. Returns `(row id, token)`;
/// the raw token goes into the cookie and is never stored.
pub async fn create(
    db: &DatabaseConnection,
    secret: &str,
    data: &SessionData,
) -> Result<(i32, String), AppError> {
    let token = generate_token();
    let now = Utc::now().naive_utc();

    let model = session::ActiveModel {
        token_hash: Set(hash_token(secret, &token)),
        data: Set(encode(data)?),
        expires_at: Set(now + Duration::hours(SESSION_TTL_HOURS)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let inserted = model.insert(db).await?;
    Ok((inserted.id, token))
}

/// Look up a session by its cookie token. Expired rows are deleted and
/// reported as absent.
pub async fn load(
    db: &DatabaseConnection,
    secret: &str,
    token: &str,
) -> Result<Option<(i32, SessionData)>, AppError> {
    let token_hash = hash_token(secret, token);

    let Some(row) = session::Entity::find()
        .filter(session::Column::TokenHash.eq(&token_hash))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    if row.expires_at < Utc::now().naive_utc() {
        session::Entity::delete_by_id(row.id).exec(db).await?;
        return Ok(None);
    }

    let data = decode(&row.data)?;
    Ok(Some((row.id, data)))
}

/// Persist `data` into an existing session row, refreshing its expiry.
pub async fn save(db: &DatabaseConnection, id: i32, data: &SessionData) -> Result<(), AppError> {
    let now = Utc::now().naive_utc();

    let model = session::ActiveModel {
        id: Set(id),
        data: Set(encode(data)?),
        expires_at: Set(now + Duration::hours(SESSION_TTL_HOURS)),
        updated_at: Set(now),
        ..Default::default()
    };

    model.update(db).await?;
    Ok(())
}

/// Remove the session row for a token, if one exists.
pub async fn destroy(db: &DatabaseConnection, secret: &str, token: &str) -> Result<(), AppError> {
    let token_hash = hash_token(secret, token);

    session::Entity::delete_many()
        .filter(session::Column::TokenHash.eq(&token_hash))
        .exec(db)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_hash_is_deterministic_and_keyed() {
        let token = generate_token();
        assert_eq!(hash_token("s1", &token), hash_token("s1", &token));
        assert_ne!(hash_token("s1", &token), hash_token("s2", &token));
        assert_ne!(hash_token("s1", &token), token);
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn data_round_trips_through_json() {
        let data = SessionData {
            user: Some(SessionUser {
                id: 1,
                username: "ana".to_string(),
            }),
            flash: Some(Flash::success("Welcome, ana!")),
        };
        let encoded = encode(&data).unwrap();
        assert_eq!(decode(&encoded).unwrap(), data);
    }

    #[test]
    fn empty_payload_encodes_compactly() {
        assert_eq!(encode(&SessionData::default()).unwrap(), "{}");
    }

    #[test]
    fn cookie_attributes() {
        let c = cookie("abc");
        assert!(c.starts_with("sb_session=abc;"));
        assert!(c.contains("HttpOnly"));
        assert!(c.contains("Max-Age=86400"));
        assert!(clear_cookie().contains("Max-Age=0"));
    }
}
