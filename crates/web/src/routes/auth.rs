//! Account route handlers.
//!
//! Handles registration, login and logout against the configured
//! [`CredentialStore`](crate::services::auth::CredentialStore).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{AppError, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::middleware::{CurrentIdentity, clear_identity, establish_identity};
use crate::routes::{fields_or_default, pressed};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Registration form data.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    pub register: Option<String>,
    pub back: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Login form data.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    pub login: Option<String>,
    pub register: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display and process the registration page.
///
/// # Errors
///
/// Returns an error if the credential store or the session fails.
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    session: Session,
    form: Result<Form<RegisterForm>, FormRejection>,
) -> Result<Response, AppError> {
    let form = fields_or_default(form);
    if identity.is_authenticated() {
        return Ok(Redirect::to("/").into_response());
    }

    if pressed(form.register.as_ref()) {
        let username = form.username.unwrap_or_default();
        let password = form.password.unwrap_or_default();

        let auth = AuthService::new(state.credentials());
        return match auth.register(&username, &password).await {
            Ok(username) => {
                establish_identity(&session, &username).await?;
                set_sentry_user(&username);
                add_breadcrumb("auth", "Registered", None);
                Ok(Redirect::to("/").into_response())
            }
            Err(e) => inline_failure(e, |error| RegisterTemplate { error }.into_response()),
        };
    }

    if pressed(form.back.as_ref()) {
        return Ok(Redirect::to("/login").into_response());
    }

    Ok(RegisterTemplate { error: None }.into_response())
}

/// Display and process the login page.
///
/// # Errors
///
/// Returns an error if the credential store or the session fails.
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    session: Session,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, AppError> {
    let form = fields_or_default(form);
    if identity.is_authenticated() {
        return Ok(Redirect::to("/").into_response());
    }

    if pressed(form.login.as_ref()) {
        let username = form.username.unwrap_or_default();
        let password = form.password.unwrap_or_default();

        let auth = AuthService::new(state.credentials());
        return match auth.login(&username, &password).await {
            Ok(username) => {
                establish_identity(&session, &username).await?;
                set_sentry_user(&username);
                add_breadcrumb("auth", "Logged in", None);
                tracing::info!(username = %username, "User logged in");
                Ok(Redirect::to("/").into_response())
            }
            Err(e) => inline_failure(e, |error| LoginTemplate { error }.into_response()),
        };
    }

    if pressed(form.register.as_ref()) {
        return Ok(Redirect::to("/register").into_response());
    }

    Ok(LoginTemplate { error: None }.into_response())
}

/// Log out and go home.
///
/// # Errors
///
/// Returns an error if the session record cannot be deleted.
#[tracing::instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_identity(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}

/// Re-render the form with a user-facing message, or escalate anything else.
fn inline_failure(
    error: AuthError,
    render: impl FnOnce(Option<String>) -> Response,
) -> Result<Response, AppError> {
    if error.is_user_facing() {
        tracing::debug!(error = %error, "Rejected account form");
        Ok(render(Some(error.to_string())))
    } else {
        Err(AppError::Auth(error))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_register_template_shows_error() {
        let html = RegisterTemplate {
            error: Some("The username alice is already taken!".to_string()),
        }
        .render()
        .unwrap();
        assert!(html.contains("The username alice is already taken!"));
        assert!(html.contains(r#"name="register""#));
    }

    #[test]
    fn test_login_template_without_error() {
        let html = LoginTemplate { error: None }.render().unwrap();
        assert!(html.contains(r#"name="login""#));
        assert!(!html.contains("incorrect"));
    }

    #[test]
    fn test_inline_failure_escalates_storage_errors() {
        let err = AuthError::Repository(crate::db::RepositoryError::DataCorruption("x".into()));
        assert!(inline_failure(err, |_| unreachable!()).is_err());

        let ok = inline_failure(AuthError::EmptyUsername, |error| {
            assert_eq!(error.as_deref(), Some("You must enter a username!"));
            Redirect::to("/").into_response()
        });
        assert!(ok.is_ok());
    }
}
