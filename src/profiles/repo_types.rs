use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub is_teacher: bool,
    pub is_onboarded: bool,
    pub role: Option<String>,
    pub contact_info: Option<serde_json::Value>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A profile as other users see it: no email and no contact details.
#[derive(Debug, Clone, Serialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub name: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub is_teacher: bool,
    pub role: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&Profile> for PublicProfile {
    fn from(p: &Profile) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            username: p.username.clone(),
            avatar_url: p.avatar_url.clone(),
            bio: p.bio.clone(),
            is_teacher: p.is_teacher,
            role: p.role.clone(),
            created_at: p.created_at,
        }
    }
}

impl From<Profile> for PublicProfile {
    fn from(p: Profile) -> Self {
        Self {
            id: p.id,
            name: p.name,
            username: p.username,
            avatar_url: p.avatar_url,
            bio: p.bio,
            is_teacher: p.is_teacher,
            role: p.role,
            created_at: p.created_at,
        }
    }
}

/// Fields a user may change on their own profile; `None` leaves a field as is.
#[derive(Debug, Default, Clone)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub is_teacher: Option<bool>,
}
