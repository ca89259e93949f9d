use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use super::dto::UpdateProfileRequest;
use super::repo_types::{Profile, ProfileChanges};
use crate::error::{AppError, AppResult};

pub const MAX_LIST_LIMIT: i64 = 100;

pub async fn get_profile(db: &PgPool, id: Uuid) -> AppResult<Profile> {
    Profile::find_by_id(db, id)
        .await?
        .ok_or(AppError::NotFound("Profile"))
}

/// Trims input and drops blank optional fields; a blank name is rejected.
pub fn normalize_changes(req: UpdateProfileRequest) -> AppResult<ProfileChanges> {
    let name = match req.name.map(|n| n.trim().to_string()) {
        Some(n) if n.is_empty() => return Err(AppError::bad_request("Name cannot be empty")),
        other => other,
    };
    let username = match req.username.map(|u| u.trim().to_lowercase()) {
        Some(u) if u.is_empty() => return Err(AppError::bad_request("Username cannot be empty")),
        Some(u) if !is_valid_username(&u) => {
            return Err(AppError::bad_request(
                "Username may only contain letters, digits and underscores",
            ))
        }
        other => other,
    };
    Ok(ProfileChanges {
        name,
        username,
        bio: req.bio.map(|b| b.trim().to_string()),
        avatar_url: req.avatar_url.map(|a| a.trim().to_string()).filter(|a| !a.is_empty()),
        is_teacher: req.is_teacher,
    })
}

pub fn is_valid_username(username: &str) -> bool {
    (3..=30).contains(&username.len())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub async fn update_profile(
    db: &PgPool,
    user_id: Uuid,
    req: UpdateProfileRequest,
) -> AppResult<Profile> {
    let changes = normalize_changes(req)?;

    // the caller's own username never conflicts with itself
    if let Some(username) = changes.username.as_deref() {
        if Profile::username_taken(db, username, Some(user_id)).await? {
            warn!(%user_id, username, "username already taken");
            return Err(AppError::UsernameTaken);
        }
    }

    let profile = Profile::update(db, user_id, &changes)
        .await
        .map_err(|e| {
            if crate::error::is_unique_violation(&e) {
                AppError::UsernameTaken
            } else {
                AppError::Internal(e)
            }
        })?
        .ok_or(AppError::NotFound("Profile"))?;

    info!(%user_id, "profile updated");
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req() -> UpdateProfileRequest {
        UpdateProfileRequest {
            name: None,
            username: None,
            bio: None,
            avatar_url: None,
            is_teacher: None,
        }
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = normalize_changes(UpdateProfileRequest {
            name: Some("   ".into()),
            ..req()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn username_is_trimmed_and_lowercased() {
        let changes = normalize_changes(UpdateProfileRequest {
            username: Some("  Ada_L ".into()),
            ..req()
        })
        .unwrap();
        assert_eq!(changes.username.as_deref(), Some("ada_l"));
    }

    #[test]
    fn username_with_symbols_is_rejected() {
        let err = normalize_changes(UpdateProfileRequest {
            username: Some("ada!".into()),
            ..req()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn empty_avatar_is_ignored() {
        let changes = normalize_changes(UpdateProfileRequest {
            avatar_url: Some(" ".into()),
            is_teacher: Some(true),
            ..req()
        })
        .unwrap();
        assert!(changes.avatar_url.is_none());
        assert_eq!(changes.is_teacher, Some(true));
    }
}
