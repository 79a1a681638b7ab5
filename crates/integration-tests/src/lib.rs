//! Integration tests for Notetaker.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p notetaker-integration-tests
//! ```
//!
//! Every test spawns its own server in-process on an ephemeral port with the
//! in-memory stores, then drives it over HTTP like a browser would.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use reqwest::{Client, Response, cookie::Jar, redirect::Policy};
use secrecy::SecretString;
use tower_sessions::MemoryStore;

use notetaker_web::config::{NotetakerConfig, StorageConfig};
use notetaker_web::middleware::create_session_layer;
use notetaker_web::state::AppState;

/// Session secret used by every test server.
pub const TEST_SESSION_SECRET: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%";

/// A running test server.
pub struct TestApp {
    pub base_url: String,
}

impl TestApp {
    /// Spawn a fresh server with empty in-memory stores.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn spawn() -> Self {
        let listener = tokio::net::TcpListener::bind(SocketAddr::new(
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            0,
        ))
        .await
        .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        let config = test_config(addr);
        let session_layer = create_session_layer(MemoryStore::default(), &config);
        let app = notetaker_web::app(AppState::in_memory(config), session_layer);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                panic!("Test server failed: {e}");
            }
        });

        Self {
            base_url: format!("http://{addr}"),
        }
    }

    /// A new browser with its own cookie jar.
    #[must_use]
    pub fn browser(&self) -> Browser {
        Browser::new(self.base_url.clone())
    }
}

fn test_config(addr: SocketAddr) -> NotetakerConfig {
    NotetakerConfig {
        host: addr.ip(),
        port: addr.port(),
        base_url: format!("http://{addr}"),
        session_secret: SecretString::from(TEST_SESSION_SECRET.to_string()),
        storage: StorageConfig::Memory,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// An HTTP client that keeps cookies between requests.
///
/// `follow` chases redirects like a browser; `manual` stops at the first
/// response so tests can look at the `Location` header.
pub struct Browser {
    base_url: String,
    follow: Client,
    manual: Client,
}

impl Browser {
    fn new(base_url: String) -> Self {
        let jar = Arc::new(Jar::default());
        let follow = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .build()
            .expect("Failed to create HTTP client");
        let manual = Client::builder()
            .cookie_provider(jar)
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client");
        Self {
            base_url,
            follow,
            manual,
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET `path`, following redirects, and return the final page.
    pub async fn get(&self, path: &str) -> Page {
        let resp = self
            .follow
            .get(self.url(path))
            .send()
            .await
            .expect("GET failed");
        Page::read(resp).await
    }

    /// POST `fields` to `path`, following redirects, and return the final page.
    pub async fn post(&self, path: &str, fields: &[(&str, &str)]) -> Page {
        let resp = self
            .follow
            .post(self.url(path))
            .form(fields)
            .send()
            .await
            .expect("POST failed");
        Page::read(resp).await
    }

    /// POST `fields` to `path` without following redirects.
    pub async fn post_manual(&self, path: &str, fields: &[(&str, &str)]) -> Response {
        self.manual
            .post(self.url(path))
            .form(fields)
            .send()
            .await
            .expect("POST failed")
    }

    /// GET `path` without following redirects.
    pub async fn get_manual(&self, path: &str) -> Response {
        self.manual
            .get(self.url(path))
            .send()
            .await
            .expect("GET failed")
    }

    /// Register `username` and land on the home page.
    pub async fn register(&self, username: &str, password: &str) -> Page {
        self.post(
            "/register",
            &[
                ("register", "Register"),
                ("username", username),
                ("password", password),
            ],
        )
        .await
    }

    /// Log in as `username`.
    pub async fn login(&self, username: &str, password: &str) -> Page {
        self.post(
            "/login",
            &[
                ("login", "Login"),
                ("username", username),
                ("password", password),
            ],
        )
        .await
    }

    /// Create a note and return the home page that follows.
    pub async fn create_note(&self, content: &str) -> Page {
        self.post("/create", &[("create", "Create"), ("note", content)])
            .await
    }
}

/// The `Set-Cookie` header for the session cookie, if the response sent one.
#[must_use]
pub fn session_cookie(resp: &Response) -> Option<String> {
    resp.headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("myappcookies="))
        .map(str::to_string)
}

/// A fetched page after redirects.
pub struct Page {
    /// Path of the final URL.
    pub path: String,
    pub status: reqwest::StatusCode,
    pub body: String,
}

impl Page {
    async fn read(resp: Response) -> Self {
        let path = resp.url().path().to_string();
        let status = resp.status();
        let body = resp.text().await.expect("Failed to read body");
        Self { path, status, body }
    }

    /// IDs of every note linked from this page, in page order.
    #[must_use]
    pub fn note_ids(&self) -> Vec<String> {
        self.body
            .split("href=\"/read/")
            .skip(1)
            .filter_map(|rest| rest.split('"').next())
            .map(str::to_string)
            .collect()
    }

    /// Returns true if the page shows `text`.
    #[must_use]
    pub fn contains(&self, text: &str) -> bool {
        self.body.contains(text)
    }
}
