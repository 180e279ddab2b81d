use std::net::SocketAddr;

use chrono::NaiveDateTime;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tokio::net::TcpListener;
use uuid::Uuid;

use crate::auth::hash_password;
use crate::config::Config;
use crate::models::sound::{self, Category};
use crate::models::user;

/// A test application builder for integration testing.
///
/// Spins up the real server on an OS-assigned port against a throwaway
/// SQLite database.
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn home_page_renders() {
///     let app = TestApp::new().await;
///     let res = app.client.get(&app.url("/")).await;
///     assert_eq!(res.status, 200);
/// }
/// ```
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: TestClient,
    pub db: DatabaseConnection,
    pub config: Config,
}

impl TestApp {
    /// Create a new test app with a throwaway SQLite database and upload
    /// directory.
    pub async fn new() -> Self {
        let run_id = Uuid::new_v4();
        let db_path = std::env::temp_dir().join(format!("soundboard-test-{}.db", run_id));
        let upload_dir = std::env::temp_dir().join(format!("soundboard-test-uploads-{}", run_id));

        let config = Config {
            database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
            session_secret: "test-secret-key-for-testing".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 0, // OS assigns a random port
            environment: "test".to_string(),
            upload_dir: upload_dir.display().to_string(),
            max_upload_size: 10_485_760,
        };

        Self::with_config(config).await
    }

    /// Create a new test app with a custom config.
    pub async fn with_config(config: Config) -> Self {
        let app = crate::App::with_config(config)
            .await
            .expect("Failed to create test app");

        let router = app.router();
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");
        let addr = listener.local_addr().expect("Failed to get local addr");

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        TestApp {
            addr,
            client: TestClient::new(),
            db: app.db,
            config: app.config,
        }
    }

    /// Get the base URL for the test server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// A second client with its own cookie jar — a different visitor.
    pub fn fresh_client(&self) -> TestClient {
        TestClient::new()
    }

    /// Register an account through the real form; the session cookie ends
    /// up in the default client's jar.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> TestResponse {
        self.client
            .post_form(
                &self.url("/register"),
                &[
                    ("username", username),
                    ("email", email),
                    ("password", password),
                ],
            )
            .await
    }

    /// Log in through the real form with the default client.
    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.client
            .post_form(
                &self.url("/login"),
                &[("email", email), ("password", password)],
            )
            .await
    }

    /// Insert a user directly, bypassing the form.
    pub async fn seed_user(&self, username: &str, email: &str, password: &str) -> user::Model {
        let now = chrono::Utc::now().naive_utc();
        user::ActiveModel {
            email: Set(email.to_string()),
            username: Set(username.to_string()),
            password_hash: Set(hash_password(password).expect("Failed to hash password")),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("Failed to seed user")
    }

    /// Insert a sound directly with an explicit creation time, so tests
    /// control the ordering.
    pub async fn seed_sound(
        &self,
        uploader: &user::Model,
        title: &str,
        category: Category,
        is_public: bool,
        created_at: NaiveDateTime,
    ) -> sound::Model {
        sound::ActiveModel {
            title: Set(title.to_string()),
            category: Set(category),
            is_public: Set(is_public),
            file_path: Set(format!("/uploads/{}.mp3", Uuid::new_v4())),
            uploader_id: Set(uploader.id),
            created_at: Set(created_at),
            updated_at: Set(created_at),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("Failed to seed sound")
    }
}

/// A simple HTTP test client with a cookie jar and helper methods.
#[derive(Clone)]
pub struct TestClient {
    inner: reqwest::Client,
}

impl TestClient {
    /// Create a new client with an empty cookie jar.
    pub fn new() -> Self {
        TestClient {
            inner: reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .expect("Failed to build test client"),
        }
    }

    /// Send a GET request (redirects are followed).
    pub async fn get(&self, url: &str) -> TestResponse {
        let res = self.inner.get(url).send().await.expect("GET request failed");
        TestResponse::from_response(res).await
    }

    /// Send a GET request with an explicit `Cookie` header, bypassing the
    /// jar. Useful when a test has minted a session token directly.
    pub async fn get_with_cookie(&self, url: &str, cookie: &str) -> TestResponse {
        let res = self
            .inner
            .get(url)
            .header("Cookie", cookie)
            .send()
            .await
            .expect("GET request failed");
        TestResponse::from_response(res).await
    }

    /// Send a POST request with a urlencoded form body.
    pub async fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> TestResponse {
        let res = self
            .inner
            .post(url)
            .form(fields)
            .send()
            .await
            .expect("POST request failed");
        TestResponse::from_response(res).await
    }

    /// Send a POST request with a multipart body.
    pub async fn post_multipart(&self, url: &str, form: reqwest::multipart::Form) -> TestResponse {
        let res = self
            .inner
            .post(url)
            .multipart(form)
            .send()
            .await
            .expect("POST request failed");
        TestResponse::from_response(res).await
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}

/// A simplified HTTP response for test assertions.
#[derive(Debug)]
pub struct TestResponse {
    pub status: u16,
    /// Final URL after redirects.
    pub url: String,
    pub body: String,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let url = res.url().to_string();
        let body = res.text().await.unwrap_or_default();
        TestResponse { status, url, body }
    }

    /// How many times `needle` occurs in the body.
    pub fn count(&self, needle: &str) -> usize {
        self.body.matches(needle).count()
    }
}
