//! Registration, login and logout through the HTTP interface.

use reqwest::StatusCode;

use notetaker_integration_tests::{TestApp, session_cookie};

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::spawn().await;
    let browser = app.browser();

    let page = browser.get("/health").await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.body, "ok");

    let page = browser.get("/health/ready").await;
    assert_eq!(page.status, StatusCode::OK);
}

#[tokio::test]
async fn test_anonymous_home_goes_to_login() {
    let app = TestApp::spawn().await;
    let browser = app.browser();

    let page = browser.get("/").await;
    assert_eq!(page.path, "/login");
    assert!(page.contains(r#"name="login""#));
}

#[tokio::test]
async fn test_register_logs_in_and_redirects_home() {
    let app = TestApp::spawn().await;
    let browser = app.browser();

    let resp = browser
        .post_manual(
            "/register",
            &[("register", "Register"), ("username", "alice"), ("password", "pw1")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/");

    let page = browser.get("/").await;
    assert_eq!(page.path, "/");
    assert!(page.contains("alice's notes"));
}

#[tokio::test]
async fn test_session_cookie_is_http_only() {
    let app = TestApp::spawn().await;
    let browser = app.browser();

    let resp = browser
        .post_manual(
            "/register",
            &[("register", "Register"), ("username", "alice"), ("password", "pw1")],
        )
        .await;
    let cookie = session_cookie(&resp).expect("session cookie set");
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(!cookie.contains("Secure"));
}

#[tokio::test]
async fn test_expiry_window_restarts_only_when_identity_is_established() {
    let app = TestApp::spawn().await;
    let browser = app.browser();

    let resp = browser
        .post_manual(
            "/register",
            &[("register", "Register"), ("username", "alice"), ("password", "pw1")],
        )
        .await;
    let cookie = session_cookie(&resp).expect("session cookie set on registration");
    assert!(cookie.contains("Max-Age=900"));

    // Plain page loads leave the session untouched.
    let resp = browser.get_manual("/").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(session_cookie(&resp), None);

    // Logging out expires the cookie at once.
    let resp = browser.get_manual("/logout").await;
    let cookie = session_cookie(&resp).expect("session cookie cleared on logout");
    assert!(cookie.contains("Max-Age=0"));

    // Logging back in opens a fresh window.
    let resp = browser
        .post_manual(
            "/login",
            &[("login", "Login"), ("username", "alice"), ("password", "pw1")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let cookie = session_cookie(&resp).expect("session cookie set on login");
    assert!(cookie.contains("Max-Age=900"));
}

#[tokio::test]
async fn test_duplicate_username_is_reported_inline() {
    let app = TestApp::spawn().await;
    app.browser().register("alice", "pw1").await;

    let other = app.browser();
    let page = other.register("alice", "other").await;
    assert_eq!(page.path, "/register");
    assert!(page.contains("The username alice is already taken!"));

    // The first registration still holds.
    let page = other.login("alice", "pw1").await;
    assert_eq!(page.path, "/");
}

#[tokio::test]
async fn test_empty_username_is_reported_inline() {
    let app = TestApp::spawn().await;
    let page = app.browser().register("", "x").await;
    assert_eq!(page.path, "/register");
    assert!(page.contains("You must enter a username!"));
}

#[tokio::test]
async fn test_wrong_password_is_reported_inline() {
    let app = TestApp::spawn().await;
    app.browser().register("alice", "pw1").await;

    let browser = app.browser();
    let page = browser.login("alice", "pw2").await;
    assert_eq!(page.path, "/login");
    assert!(page.contains("Your login credentials are incorrect!"));

    let page = browser.login("nobody", "pw1").await;
    assert!(page.contains("Your login credentials are incorrect!"));

    // Still anonymous.
    let page = browser.get("/").await;
    assert_eq!(page.path, "/login");
}

#[tokio::test]
async fn test_login_from_second_browser() {
    let app = TestApp::spawn().await;
    app.browser().register("alice", "pw1").await;

    let browser = app.browser();
    let page = browser.login("alice", "pw1").await;
    assert_eq!(page.path, "/");
}

#[tokio::test]
async fn test_logged_in_user_skips_account_pages() {
    let app = TestApp::spawn().await;
    let browser = app.browser();
    browser.register("alice", "pw1").await;

    assert_eq!(browser.get("/login").await.path, "/");
    assert_eq!(browser.get("/register").await.path, "/");
}

#[tokio::test]
async fn test_account_page_buttons() {
    let app = TestApp::spawn().await;
    let browser = app.browser();

    let page = browser.post("/login", &[("register", "Register")]).await;
    assert_eq!(page.path, "/register");

    let page = browser.post("/register", &[("back", "Back")]).await;
    assert_eq!(page.path, "/login");
}

#[tokio::test]
async fn test_logout_ends_the_session() {
    let app = TestApp::spawn().await;
    let browser = app.browser();
    browser.register("alice", "pw1").await;

    let page = browser.post("/", &[("logout", "Logout")]).await;
    assert_eq!(page.path, "/login");

    assert_eq!(browser.get("/").await.path, "/login");
    assert_eq!(browser.get("/create").await.path, "/login");
}

#[tokio::test]
async fn test_logout_when_anonymous() {
    let app = TestApp::spawn().await;
    let resp = app.browser().get_manual("/logout").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/");
}

#[tokio::test]
async fn test_bare_post_renders_the_page() {
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    for path in ["/login", "/register"] {
        let resp = client
            .post(format!("{}{path}", app.base_url))
            .send()
            .await
            .expect("POST failed");
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
    }
}
