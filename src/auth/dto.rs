use serde::{Deserialize, Serialize};

use crate::profiles::Profile;

/// Request body for sign-up.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    /// Generated from `name` when absent.
    #[serde(default)]
    pub username: Option<String>,
}

/// Request body for sign-in.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response returned after register, login or refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: Profile,
}

/// Current session as seen by the client.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: Profile,
    pub is_authenticated: bool,
}
