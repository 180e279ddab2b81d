use chrono::{Duration, Utc};
use sea_orm::ConnectionTrait;

use soundboard::auth::session::{self, Flash, SessionData};
use soundboard::models::sound::Category;
use soundboard::TestApp;

const CARD: &str = "<div class=\"sound-card\">";

#[tokio::test]
async fn home_lists_at_most_twelve_public_sounds_newest_first() {
    let app = TestApp::new().await;
    let uploader = app.seed_user("ana", "ana@example.com", "password123").await;

    let base = Utc::now().naive_utc() - Duration::hours(1);
    for i in 1..=15 {
        app.seed_sound(
            &uploader,
            &format!("pub-{:02}", i),
            Category::Calm,
            true,
            base + Duration::seconds(i),
        )
        .await;
    }
    for i in 1..=3 {
        app.seed_sound(
            &uploader,
            &format!("priv-{:02}", i),
            Category::Happy,
            false,
            base + Duration::seconds(100 + i),
        )
        .await;
    }

    let res = app.client.get(&app.url("/")).await;
    assert_eq!(res.status, 200);

    // exactly twelve cards, all public
    assert_eq!(res.count(CARD), 12);
    assert_eq!(res.count("priv-"), 0);

    // the twelve newest made the cut, the three oldest did not
    for i in 4..=15 {
        assert!(res.body.contains(&format!("pub-{:02}", i)), "missing pub-{:02}", i);
    }
    for i in 1..=3 {
        assert!(!res.body.contains(&format!("pub-{:02}", i)));
    }

    // newest first
    let pos = |needle: &str| res.body.find(needle).expect("sound missing from page");
    assert!(pos("pub-15") < pos("pub-12"));
    assert!(pos("pub-12") < pos("pub-08"));
    assert!(pos("pub-08") < pos("pub-04"));
}

#[tokio::test]
async fn home_renders_with_no_sounds_and_no_session() {
    let app = TestApp::new().await;

    let res = app.client.get(&app.url("/")).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.count(CARD), 0);
    assert!(res.body.contains("No sounds here yet."));

    // anonymous chrome: login links, no user menu
    assert!(res.body.contains("Log in"));
    assert!(!res.body.contains("Log out"));
}

#[tokio::test]
async fn home_shows_uploader_username_and_category_icon() {
    let app = TestApp::new().await;
    let uploader = app.seed_user("ana", "ana@example.com", "password123").await;
    app.seed_sound(
        &uploader,
        "Rain on a tin roof",
        Category::Calm,
        true,
        Utc::now().naive_utc(),
    )
    .await;

    let res = app.client.get(&app.url("/")).await;
    assert_eq!(res.status, 200);
    assert!(res.body.contains("Rain on a tin roof"));
    assert!(res.body.contains("/users/ana"));
    assert!(res.body.contains("fa-cloud-rain"));
}

#[tokio::test]
async fn home_soft_fails_when_the_query_breaks() {
    let app = TestApp::new().await;

    // Simulate a data-access failure: the sounds table is gone.
    app.db
        .execute_unprepared("DROP TABLE sounds")
        .await
        .expect("failed to drop table");

    let res = app.client.get(&app.url("/")).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.count(CARD), 0);
    assert!(res.body.contains("Failed to load sounds"));
}

#[tokio::test]
async fn home_flash_is_read_once() {
    let app = TestApp::new().await;

    let (_, token) = session::create(
        &app.db,
        &app.config.session_secret,
        &SessionData {
            user: None,
            flash: Some(Flash::success("hello exactly once")),
        },
    )
    .await
    .expect("failed to mint session");
    let cookie = format!("sb_session={}", token);

    let first = app.client.get_with_cookie(&app.url("/"), &cookie).await;
    assert_eq!(first.status, 200);
    assert!(first.body.contains("hello exactly once"));

    let second = app.client.get_with_cookie(&app.url("/"), &cookie).await;
    assert_eq!(second.status, 200);
    assert!(!second.body.contains("hello exactly once"));
}

#[tokio::test]
async fn home_flash_consumed_even_when_fetch_fails() {
    let app = TestApp::new().await;

    let (_, token) = session::create(
        &app.db,
        &app.config.session_secret,
        &SessionData {
            user: None,
            flash: Some(Flash::success("pending note")),
        },
    )
    .await
    .expect("failed to mint session");
    let cookie = format!("sb_session={}", token);

    app.db
        .execute_unprepared("DROP TABLE sounds")
        .await
        .expect("failed to drop table");

    // the failure render shows the error flash, not the stored one
    let res = app.client.get_with_cookie(&app.url("/"), &cookie).await;
    assert_eq!(res.status, 200);
    assert!(res.body.contains("Failed to load sounds"));
    assert!(!res.body.contains("pending note"));

    // and the stored flash is gone
    let loaded = session::load(&app.db, &app.config.session_secret, &token)
        .await
        .expect("session store unreachable")
        .expect("session vanished");
    assert_eq!(loaded.1.flash, None);
}

#[tokio::test]
async fn unknown_path_renders_the_not_found_page() {
    let app = TestApp::new().await;

    let res = app.client.get(&app.url("/definitely-not-a-page")).await;
    assert_eq!(res.status, 404);
    assert!(res.body.contains("That page does not exist."));
}
