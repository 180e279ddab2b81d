//! Askama template structs — the render context for every page.

use askama::Template;

use crate::auth::session::{Flash, SessionUser};
use crate::models::sound::SoundCard;

/// Map a mood category to its display icon. Total over arbitrary input:
/// anything unrecognized falls back to the generic music icon.
pub fn mood_icon(category: &str) -> &'static str {
    match category {
        "calm" => "cloud-rain",
        "happy" => "tree",
        "sad" => "fire",
        "meditation" => "om",
        "all" => "music",
        _ => "music",
    }
}

/// Home page and mood-filtered sound listing.
#[derive(Template)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub title: &'static str,
    pub user: Option<SessionUser>,
    pub sounds: Vec<SoundCard>,
    pub current_mood: String,
    pub messages: Option<Flash>,
}

impl HomeTemplate {
    pub fn mood_icon(&self, category: &str) -> &'static str {
        mood_icon(category)
    }
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub title: &'static str,
    pub user: Option<SessionUser>,
    pub messages: Option<Flash>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub title: &'static str,
    pub user: Option<SessionUser>,
    pub messages: Option<Flash>,
}

#[derive(Template)]
#[template(path = "upload.html")]
pub struct UploadTemplate {
    pub title: &'static str,
    pub user: Option<SessionUser>,
    pub messages: Option<Flash>,
}

/// Sound detail page with the audio player.
#[derive(Template)]
#[template(path = "sound.html")]
pub struct SoundTemplate {
    pub title: String,
    pub user: Option<SessionUser>,
    pub sound: SoundCard,
    pub messages: Option<Flash>,
    pub can_delete: bool,
}

impl SoundTemplate {
    pub fn mood_icon(&self, category: &str) -> &'static str {
        mood_icon(category)
    }
}

/// A user's public profile and their sounds.
#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub title: String,
    pub user: Option<SessionUser>,
    pub profile_name: String,
    pub joined: String,
    pub sounds: Vec<SoundCard>,
}

impl ProfileTemplate {
    pub fn mood_icon(&self, category: &str) -> &'static str {
        mood_icon(category)
    }
}

#[derive(Template)]
#[template(path = "404.html")]
pub struct NotFoundTemplate {
    pub title: &'static str,
    pub user: Option<SessionUser>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: &'static str,
    pub user: Option<SessionUser>,
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mood_icon_maps_every_known_category() {
        assert_eq!(mood_icon("calm"), "cloud-rain");
        assert_eq!(mood_icon("happy"), "tree");
        assert_eq!(mood_icon("sad"), "fire");
        assert_eq!(mood_icon("meditation"), "om");
        assert_eq!(mood_icon("all"), "music");
    }

    #[test]
    fn mood_icon_is_total_over_arbitrary_input() {
        assert_eq!(mood_icon("unknown-value"), "music");
        assert_eq!(mood_icon(""), "music");
        assert_eq!(mood_icon("CALM"), "music");
    }

    #[test]
    fn error_page_renders_the_fixed_message() {
        let page = ErrorTemplate {
            title: "Server Error",
            user: None,
            message: "Something went wrong!",
        };
        let html = page.render().unwrap();
        assert!(html.contains("Something went wrong!"));
    }
}
