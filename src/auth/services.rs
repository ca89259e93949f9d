use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{
    dto::{AuthResponse, LoginRequest, RegisterRequest},
    jwt::JwtKeys,
    password::{hash_password, verify_password},
    repo_types::User,
    username,
};
use crate::{
    error::{is_unique_violation, AppError, AppResult},
    profiles::{services::is_valid_username, Profile},
};

pub const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trims and lower-cases the email, then checks the sign-up fields.
pub fn validate_registration(mut req: RegisterRequest) -> AppResult<RegisterRequest> {
    req.email = req.email.trim().to_lowercase();
    req.name = req.name.trim().to_string();
    req.username = req
        .username
        .map(|u| u.trim().to_lowercase())
        .filter(|u| !u.is_empty());

    if !is_valid_email(&req.email) {
        warn!(email = %req.email, "invalid email");
        return Err(AppError::bad_request("Invalid email"));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::bad_request("Password too short"));
    }
    if req.name.is_empty() {
        return Err(AppError::bad_request("Name is required"));
    }
    if let Some(u) = req.username.as_deref() {
        if !is_valid_username(u) {
            return Err(AppError::bad_request(
                "Username may only contain letters, digits and underscores",
            ));
        }
    }
    Ok(req)
}

pub async fn generate_username(db: &PgPool, full_name: &str) -> anyhow::Result<String> {
    username::generate_with(full_name, |candidate| async move {
        Profile::username_taken(db, &candidate, None).await
    })
    .await
}

pub async fn register(db: &PgPool, keys: &JwtKeys, req: RegisterRequest) -> AppResult<AuthResponse> {
    let req = validate_registration(req)?;

    if User::find_by_email(db, &req.email).await?.is_some() {
        warn!(email = %req.email, "email already registered");
        return Err(AppError::EmailTaken);
    }

    let username = match req.username {
        Some(u) => {
            if Profile::username_taken(db, &u, None).await? {
                return Err(AppError::UsernameTaken);
            }
            u
        }
        None => generate_username(db, &req.name).await?,
    };

    let hash = hash_password(&req.password)?;

    let mut tx = db.begin().await.map_err(anyhow::Error::from)?;
    let user = User::create_tx(&mut tx, &req.email, &hash)
        .await
        .map_err(|e| conflict_or_internal(e, AppError::EmailTaken))?;
    let profile = Profile::create_tx(&mut tx, user.id, &user.email, &req.name, &username)
        .await
        .map_err(|e| conflict_or_internal(e, AppError::UsernameTaken))?;
    tx.commit().await.map_err(anyhow::Error::from)?;

    let (access_token, refresh_token) = keys.sign_pair(user.id)?;

    info!(user_id = %user.id, email = %user.email, username = %username, "user registered");
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: profile,
    })
}

pub async fn login(db: &PgPool, keys: &JwtKeys, mut req: LoginRequest) -> AppResult<AuthResponse> {
    req.email = req.email.trim().to_lowercase();

    if !is_valid_email(&req.email) {
        warn!(email = %req.email, "invalid email");
        return Err(AppError::bad_request("Invalid email"));
    }

    let Some(user) = User::find_by_email(db, &req.email).await? else {
        warn!(email = %req.email, "login unknown email");
        return Err(invalid_credentials());
    };

    if !verify_password(&req.password, &user.password_hash)? {
        warn!(email = %req.email, user_id = %user.id, "login invalid password");
        return Err(invalid_credentials());
    }

    let profile = session_profile(db, user.id).await?;
    let (access_token, refresh_token) = keys.sign_pair(user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: profile,
    })
}

pub async fn refresh(db: &PgPool, keys: &JwtKeys, refresh_token: &str) -> AppResult<AuthResponse> {
    let claims = keys
        .verify_refresh(refresh_token)
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;

    let profile = session_profile(db, claims.sub).await?;
    let (access_token, refresh_token) = keys.sign_pair(claims.sub)?;

    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: profile,
    })
}

/// Profile behind a token; a token for a removed account is unauthorized.
pub async fn session_profile(db: &PgPool, user_id: Uuid) -> AppResult<Profile> {
    Profile::find_by_id(db, user_id).await?.ok_or_else(|| {
        error!(%user_id, "profile missing for authenticated user");
        AppError::Unauthorized("User not found".into())
    })
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".into())
}

fn conflict_or_internal(e: anyhow::Error, conflict: AppError) -> AppError {
    if is_unique_violation(&e) {
        conflict
    } else {
        AppError::Internal(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(email: &str, password: &str, name: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            password: password.into(),
            name: name.into(),
            username: None,
        }
    }

    #[test]
    fn email_format() {
        assert!(is_valid_email("ada@example.com"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada example.com"));
    }

    #[test]
    fn registration_normalizes_email_and_name() {
        let ok = validate_registration(req("  Ada@Example.COM ", "longenough", " Ada ")).unwrap();
        assert_eq!(ok.email, "ada@example.com");
        assert_eq!(ok.name, "Ada");
    }

    #[test]
    fn registration_rejects_short_password_and_blank_name() {
        assert!(matches!(
            validate_registration(req("a@b.co", "short", "Ada")),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            validate_registration(req("a@b.co", "longenough", "   ")),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn blank_username_falls_back_to_generation() {
        let mut r = req("a@b.co", "longenough", "Ada");
        r.username = Some("   ".into());
        assert!(validate_registration(r).unwrap().username.is_none());
    }
}
