use serde::{Deserialize, Serialize};

use super::repo_types::SkillType;

#[derive(Debug, Deserialize)]
pub struct SkillRequest {
    pub skill_name: String,
    #[serde(rename = "type")]
    pub skill_type: SkillType,
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct UserSkillsResponse {
    pub teaching: Vec<String>,
    pub learning: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct OnboardingRequest {
    #[serde(default)]
    pub teaching: Vec<String>,
    #[serde(default)]
    pub learning: Vec<String>,
}
