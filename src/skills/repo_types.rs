use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SkillType {
    Teaching,
    Learning,
}

impl SkillType {
    pub fn as_str(self) -> &'static str {
        match self {
            SkillType::Teaching => "teaching",
            SkillType::Learning => "learning",
        }
    }
}

impl TryFrom<String> for SkillType {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "teaching" => Ok(SkillType::Teaching),
            "learning" => Ok(SkillType::Learning),
            other => anyhow::bail!("unknown skill type {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSkill {
    pub id: Uuid,
    pub user_id: Uuid,
    pub skill_name: String,
    #[sqlx(rename = "type", try_from = "String")]
    #[serde(rename = "type")]
    pub skill_type: SkillType,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
