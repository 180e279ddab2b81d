use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Server-side session entity. The browser only ever sees the opaque
/// cookie token; this row stores a keyed hash of it plus the JSON payload.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub token_hash: String,

    /// JSON-encoded session payload (user projection, flash message).
    #[sea_orm(column_type = "Text")]
    pub data: String,

    /// Refreshed to 24h from now on every write.
    pub expires_at: NaiveDateTime,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
