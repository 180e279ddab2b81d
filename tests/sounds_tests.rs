use chrono::{Duration, Utc};
use sea_orm::EntityTrait;

use soundboard::models::sound::{Category, Entity as Sound};
use soundboard::TestApp;

fn audio_form(title: &str, public: bool) -> reqwest::multipart::Form {
    let mut form = reqwest::multipart::Form::new()
        .text("title", title.to_string())
        .text("category", "calm")
        .part(
            "file",
            reqwest::multipart::Part::bytes(vec![0u8; 128])
                .file_name("clip.mp3")
                .mime_str("audio/mpeg")
                .unwrap(),
        );
    if public {
        form = form.text("is_public", "on");
    }
    form
}

#[tokio::test]
async fn browse_filters_by_mood() {
    let app = TestApp::new().await;
    let uploader = app.seed_user("ana", "ana@example.com", "password123").await;

    let now = Utc::now().naive_utc();
    app.seed_sound(&uploader, "calm-one", Category::Calm, true, now).await;
    app.seed_sound(
        &uploader,
        "happy-one",
        Category::Happy,
        true,
        now + Duration::seconds(1),
    )
    .await;

    let all = app.client.get(&app.url("/sounds")).await;
    assert!(all.body.contains("calm-one"));
    assert!(all.body.contains("happy-one"));

    let calm = app.client.get(&app.url("/sounds?mood=calm")).await;
    assert!(calm.body.contains("calm-one"));
    assert!(!calm.body.contains("happy-one"));

    // unknown moods fall back to the unfiltered listing
    let unknown = app.client.get(&app.url("/sounds?mood=angry")).await;
    assert!(unknown.body.contains("calm-one"));
    assert!(unknown.body.contains("happy-one"));
}

#[tokio::test]
async fn upload_requires_login() {
    let app = TestApp::new().await;

    let form_page = app.client.get(&app.url("/sounds/upload")).await;
    assert!(form_page.url.ends_with("/login"));

    let res = app
        .client
        .post_multipart(&app.url("/sounds/upload"), audio_form("sneaky", true))
        .await;
    assert!(res.url.ends_with("/login"));

    let rows = Sound::find().all(&app.db).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn upload_creates_a_sound_and_lands_on_its_page() {
    let app = TestApp::new().await;
    app.register("ana", "ana@example.com", "password123").await;

    let res = app
        .client
        .post_multipart(&app.url("/sounds/upload"), audio_form("Ocean waves", true))
        .await;

    assert_eq!(res.status, 200);
    assert!(res.url.contains("/sounds/"), "expected detail page, got {}", res.url);
    assert!(res.body.contains("Sound uploaded"));
    assert!(res.body.contains("Ocean waves"));
    assert!(res.body.contains("<audio"));

    let rows = Sound::find().all(&app.db).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].is_public);
    assert_eq!(rows[0].category, Category::Calm);

    // the clip really landed on disk, under the served path
    let stored_name = rows[0].file_path.strip_prefix("/uploads/").unwrap();
    let on_disk = std::path::Path::new(&app.config.upload_dir).join(stored_name);
    assert!(on_disk.exists());
}

#[tokio::test]
async fn upload_rejects_files_that_are_not_audio() {
    let app = TestApp::new().await;
    app.register("ana", "ana@example.com", "password123").await;

    let form = reqwest::multipart::Form::new()
        .text("title", "not a sound")
        .text("category", "calm")
        .part(
            "file",
            reqwest::multipart::Part::bytes(b"hello".to_vec())
                .file_name("notes.txt")
                .mime_str("text/plain")
                .unwrap(),
        );

    let res = app
        .client
        .post_multipart(&app.url("/sounds/upload"), form)
        .await;
    assert!(res.body.contains("Only audio files are accepted"));

    let rows = Sound::find().all(&app.db).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn private_sounds_stay_off_shared_pages() {
    let app = TestApp::new().await;
    app.register("ana", "ana@example.com", "password123").await;

    // checkbox left unchecked: the field is simply absent
    let res = app
        .client
        .post_multipart(&app.url("/sounds/upload"), audio_form("secret chant", false))
        .await;
    assert!(res.body.contains("secret chant"));

    let rows = Sound::find().all(&app.db).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].is_public);
    let detail_path = format!("/sounds/{}", rows[0].id);

    // not on the home page or the browse page
    let home = app.fresh_client().get(&app.url("/")).await;
    assert!(!home.body.contains("secret chant"));
    let browse = app.fresh_client().get(&app.url("/sounds")).await;
    assert!(!browse.body.contains("secret chant"));

    // owner sees the detail page; a stranger gets a 404
    let own = app.client.get(&app.url(&detail_path)).await;
    assert_eq!(own.status, 200);
    let stranger = app.fresh_client().get(&app.url(&detail_path)).await;
    assert_eq!(stranger.status, 404);
}

#[tokio::test]
async fn owner_can_delete_their_sound() {
    let app = TestApp::new().await;
    app.register("ana", "ana@example.com", "password123").await;

    app.client
        .post_multipart(&app.url("/sounds/upload"), audio_form("fleeting", true))
        .await;
    let sound = Sound::find().one(&app.db).await.unwrap().unwrap();

    let res = app
        .client
        .post_form(&app.url(&format!("/sounds/{}/delete", sound.id)), &[])
        .await;
    assert!(res.url.ends_with("/sounds"));
    assert!(res.body.contains("Sound deleted"));

    assert!(Sound::find_by_id(sound.id)
        .one(&app.db)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn strangers_cannot_delete_sounds() {
    let app = TestApp::new().await;
    app.register("ana", "ana@example.com", "password123").await;

    app.client
        .post_multipart(&app.url("/sounds/upload"), audio_form("keep me", true))
        .await;
    let sound = Sound::find().one(&app.db).await.unwrap().unwrap();

    // a different logged-in visitor
    let stranger = app.fresh_client();
    stranger
        .post_form(
            &app.url("/register"),
            &[
                ("username", "bob"),
                ("email", "bob@example.com"),
                ("password", "password123"),
            ],
        )
        .await;

    let res = stranger
        .post_form(&app.url(&format!("/sounds/{}/delete", sound.id)), &[])
        .await;
    assert_eq!(res.status, 404);

    assert!(Sound::find_by_id(sound.id)
        .one(&app.db)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn unknown_sound_detail_is_404() {
    let app = TestApp::new().await;

    let res = app.client.get(&app.url("/sounds/9999")).await;
    assert_eq!(res.status, 404);
}
