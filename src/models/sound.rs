use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sound entity — an uploaded audio clip tagged with a mood category.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sounds")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    pub category: Category,

    /// Only public sounds appear in shared listings.
    #[sea_orm(default_value = true)]
    pub is_public: bool,

    /// Path the clip is served from (under /uploads).
    pub file_path: String,

    pub uploader_id: i32,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UploaderId",
        to = "super::user::Column::Id"
    )]
    Uploader,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Uploader.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Mood category a sound is filed under.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[sea_orm(string_value = "calm")]
    Calm,
    #[sea_orm(string_value = "happy")]
    Happy,
    #[sea_orm(string_value = "sad")]
    Sad,
    #[sea_orm(string_value = "meditation")]
    Meditation,
    #[sea_orm(string_value = "other")]
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Calm,
        Category::Happy,
        Category::Sad,
        Category::Meditation,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Calm => "calm",
            Category::Happy => "happy",
            Category::Sad => "sad",
            Category::Meditation => "meditation",
            Category::Other => "other",
        }
    }

    /// Parse a user-supplied category name. Unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "calm" => Some(Category::Calm),
            "happy" => Some(Category::Happy),
            "sad" => Some(Category::Sad),
            "meditation" => Some(Category::Meditation),
            "other" => Some(Category::Other),
            _ => None,
        }
    }
}

// ─── View model ────────────────────────────────────────────────

/// The shape a sound takes in rendered listings: the uploader resolved to
/// a username, the category flattened to its name, and a `full_url` the
/// audio player can point at.
#[derive(Debug, Clone, Serialize)]
pub struct SoundCard {
    pub id: i32,
    pub title: String,
    pub category: String,
    pub uploader: String,
    pub full_url: String,
    pub created_at: String,
}

impl SoundCard {
    pub fn new(sound: Model, uploader: Option<super::user::Model>) -> Self {
        SoundCard {
            id: sound.id,
            category: sound.category.as_str().to_string(),
            uploader: uploader
                .map(|u| u.username)
                .unwrap_or_else(|| "unknown".to_string()),
            full_url: sound.file_path,
            created_at: sound.created_at.format("%b %d, %Y").to_string(),
            title: sound.title,
        }
    }
}
