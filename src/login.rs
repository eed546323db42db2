#![cfg(not(tarpaulin_include))]

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::app::AppState;

/// The single account allowed to sign in
///
/// Credentials are compared as plain text; there is no hashing and no
/// server-side session.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    /// Username that must be supplied
    pub username: String,

    /// Password that must be supplied
    pub password: String,
}

impl Default for AdminCredentials {
    fn default() -> Self {
        AdminCredentials {
            username: "admin".to_string(),
            password: "password123".to_string(),
        }
    }
}

impl AdminCredentials {
    /// Check a username/password pair
    ///
    /// # Arguments
    /// * `username` - Username to verify
    /// * `password` - Password to verify
    ///
    /// # Returns
    /// * `bool` - True if both match exactly
    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

/// Credential data posted by the login page
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

/// Body of login and logout responses
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
}

impl AuthResponse {
    fn new(success: bool, message: &str) -> Self {
        AuthResponse {
            success,
            message: message.to_string(),
        }
    }
}

/// Serve the login page HTML
///
/// # Returns
/// * `Html<&'static str>` - The login page HTML
pub async fn serve_login_page() -> Html<&'static str> {
    Html(include_str!("./static/login.html"))
}

/// Handle user login requests
///
/// Compares the posted credentials with the configured pair.
///
/// # Arguments
/// * `state` - Shared application state holding the credentials
/// * `body` - JSON body containing the username and password; a missing or
///   unreadable body counts as empty credentials
///
/// # Returns
/// * `Response` - 200 with `success: true`, or 401 with `success: false`
pub async fn handle_login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let credentials = match body {
        Ok(Json(credentials)) => credentials,
        Err(rejection) => {
            log::debug!("Unreadable login body: {}", rejection.body_text());
            LoginRequest::default()
        }
    };

    if state
        .credentials
        .verify(&credentials.username, &credentials.password)
    {
        log::info!("User {} logged in", credentials.username);
        Json(AuthResponse::new(true, "Login successful")).into_response()
    } else {
        log::warn!("Failed login attempt for {:?}", credentials.username);
        (
            StatusCode::UNAUTHORIZED,
            Json(AuthResponse::new(false, "Invalid username or password")),
        )
            .into_response()
    }
}

/// Handle user logout
///
/// Nothing is held on the server, so this only acknowledges the request;
/// the browser clears its own flag.
pub async fn handle_logout() -> Json<AuthResponse> {
    Json(AuthResponse::new(true, "Logged out successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pair_is_admin() {
        let creds = AdminCredentials::default();
        assert!(creds.verify("admin", "password123"));
        assert!(!creds.verify("admin", "Password123"));
        assert!(!creds.verify("", ""));
    }
}
