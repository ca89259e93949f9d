use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// A skill offered by a teacher.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Skill {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub level: Option<String>,
    pub duration: i32, // minutes
    pub price: f64,
    pub image_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A booked slot for a skill.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub skill_id: Uuid,
    pub teacher_id: Uuid,
    pub student_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub duration: i32,
    pub status: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewSkill {
    pub title: String,
    pub description: String,
    pub category: String,
    pub level: Option<String>,
    pub duration: i32,
    pub price: f64,
    pub image_url: Option<String>,
}
