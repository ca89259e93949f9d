use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use super::{
    dto::{BookSessionRequest, CreateSkillRequest},
    repo_types::{NewSkill, Session, Skill},
};
use crate::{
    error::{AppError, AppResult},
    profiles::Profile,
    state::AppState,
};

pub fn validate_skill(req: CreateSkillRequest) -> AppResult<NewSkill> {
    let title = req.title.trim().to_string();
    let category = req.category.trim().to_string();
    if title.is_empty() || category.is_empty() {
        return Err(AppError::bad_request("Title and category are required"));
    }
    if req.duration <= 0 {
        return Err(AppError::bad_request("Duration must be positive"));
    }
    if !req.price.is_finite() || req.price < 0.0 {
        return Err(AppError::bad_request("Price cannot be negative"));
    }
    Ok(NewSkill {
        title,
        description: req.description.trim().to_string(),
        category,
        level: req.level.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()),
        duration: req.duration,
        price: req.price,
        image_url: req.image_url.filter(|u| !u.trim().is_empty()),
    })
}

pub fn check_booking(skill: &Skill, student_id: Uuid, date: OffsetDateTime, now: OffsetDateTime) -> AppResult<()> {
    if skill.teacher_id == student_id {
        return Err(AppError::bad_request("You cannot book your own skill"));
    }
    if date <= now {
        return Err(AppError::bad_request("Session date must be in the future"));
    }
    Ok(())
}

pub async fn create_skill(state: &AppState, teacher_id: Uuid, req: CreateSkillRequest) -> AppResult<Skill> {
    let new = validate_skill(req)?;
    let profile = Profile::find_by_id(&state.db, teacher_id)
        .await?
        .ok_or(AppError::NotFound("Profile"))?;
    if !profile.is_teacher {
        return Err(AppError::Forbidden("Only teachers can offer skills".into()));
    }
    let skill = Skill::create(&state.db, teacher_id, &new).await?;
    info!(skill_id = %skill.id, %teacher_id, "skill created");
    Ok(skill)
}

pub async fn book_session(state: &AppState, student_id: Uuid, req: BookSessionRequest) -> AppResult<Session> {
    let skill = Skill::find_by_id(&state.db, req.skill_id)
        .await?
        .ok_or(AppError::NotFound("Skill"))?;
    check_booking(&skill, student_id, req.date, OffsetDateTime::now_utc())?;
    let session = Session::book(&state.db, &skill, student_id, req.date).await?;
    info!(session_id = %session.id, skill_id = %skill.id, %student_id, "session booked");
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn skill_req() -> CreateSkillRequest {
        CreateSkillRequest {
            title: " Guitar basics ".into(),
            description: "Chords".into(),
            category: "Music".into(),
            level: Some("  ".into()),
            duration: 60,
            price: 25.0,
            image_url: None,
        }
    }

    fn skill(teacher_id: Uuid) -> Skill {
        let now = OffsetDateTime::now_utc();
        Skill {
            id: Uuid::new_v4(),
            teacher_id,
            title: "Guitar".into(),
            description: String::new(),
            category: "Music".into(),
            level: None,
            duration: 45,
            price: 0.0,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn skill_fields_are_cleaned() {
        let new = validate_skill(skill_req()).unwrap();
        assert_eq!(new.title, "Guitar basics");
        assert!(new.level.is_none());
    }

    #[test]
    fn skill_needs_positive_duration_and_price() {
        assert!(validate_skill(CreateSkillRequest { duration: 0, ..skill_req() }).is_err());
        assert!(validate_skill(CreateSkillRequest { price: -1.0, ..skill_req() }).is_err());
        assert!(validate_skill(CreateSkillRequest { price: f64::NAN, ..skill_req() }).is_err());
    }

    #[test]
    fn booking_rules() {
        let now = OffsetDateTime::now_utc();
        let teacher = Uuid::new_v4();
        let s = skill(teacher);
        assert!(check_booking(&s, teacher, now + Duration::days(1), now).is_err());
        assert!(check_booking(&s, Uuid::new_v4(), now - Duration::hours(1), now).is_err());
        assert!(check_booking(&s, Uuid::new_v4(), now + Duration::days(1), now).is_ok());
    }
}
