use chrono::{Duration, Utc};

use soundboard::models::sound::Category;
use soundboard::TestApp;

#[tokio::test]
async fn profile_shows_only_public_sounds_to_visitors() {
    let app = TestApp::new().await;
    let ana = app.seed_user("ana", "ana@example.com", "password123").await;

    let now = Utc::now().naive_utc();
    app.seed_sound(&ana, "shared clip", Category::Happy, true, now).await;
    app.seed_sound(
        &ana,
        "private clip",
        Category::Sad,
        false,
        now + Duration::seconds(1),
    )
    .await;

    let res = app.client.get(&app.url("/users/ana")).await;
    assert_eq!(res.status, 200);
    assert!(res.body.contains("ana"));
    assert!(res.body.contains("Joined"));
    assert!(res.body.contains("shared clip"));
    assert!(!res.body.contains("private clip"));
}

#[tokio::test]
async fn owner_sees_their_private_sounds() {
    let app = TestApp::new().await;
    let ana = app.seed_user("ana", "ana@example.com", "password123").await;
    app.seed_sound(
        &ana,
        "private clip",
        Category::Sad,
        false,
        Utc::now().naive_utc(),
    )
    .await;

    app.login("ana@example.com", "password123").await;

    let res = app.client.get(&app.url("/users/ana")).await;
    assert_eq!(res.status, 200);
    assert!(res.body.contains("private clip"));
}

#[tokio::test]
async fn unknown_user_is_404() {
    let app = TestApp::new().await;

    let res = app.client.get(&app.url("/users/nobody")).await;
    assert_eq!(res.status, 404);
}
