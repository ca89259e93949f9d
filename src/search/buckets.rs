use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::profiles::{Profile, PublicProfile};

/// Profiles fetched up front for bucketed search.
pub const PROFILE_POOL: i64 = 100;
/// Per-bucket cap.
pub const BUCKET_SIZE: usize = 5;

#[derive(Debug, Default, Serialize)]
pub struct SearchResults {
    pub username_matches: Vec<PublicProfile>,
    pub name_matches: Vec<PublicProfile>,
}

/// Substring match over `pool`, split into a username bucket and a name
/// bucket; the caller is excluded and no profile lands in both buckets.
pub fn bucket(pool: &[Profile], query: &str, caller: Uuid) -> SearchResults {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return SearchResults::default();
    }

    let contains = |field: Option<&str>| {
        field
            .map(|v| v.to_lowercase().contains(&needle))
            .unwrap_or(false)
    };

    let username_matches: Vec<PublicProfile> = pool
        .iter()
        .filter(|p| p.id != caller && contains(p.username.as_deref()))
        .take(BUCKET_SIZE)
        .map(PublicProfile::from)
        .collect();

    let taken: HashSet<Uuid> = username_matches.iter().map(|p| p.id).collect();
    let name_matches: Vec<PublicProfile> = pool
        .iter()
        .filter(|p| p.id != caller && !taken.contains(&p.id) && contains(Some(&p.name)))
        .take(BUCKET_SIZE)
        .map(PublicProfile::from)
        .collect();

    SearchResults {
        username_matches,
        name_matches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn profile(name: &str, username: Option<&str>) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            name: name.into(),
            username: username.map(String::from),
            avatar_url: None,
            bio: None,
            is_teacher: false,
            is_onboarded: true,
            role: None,
            contact_info: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn blank_query_returns_nothing() {
        let pool = vec![profile("Ann", Some("ann"))];
        let res = bucket(&pool, "   ", Uuid::new_v4());
        assert!(res.username_matches.is_empty());
        assert!(res.name_matches.is_empty());
    }

    #[test]
    fn username_hits_are_not_repeated_in_name_bucket() {
        let pool = vec![
            profile("Anna Smith", Some("anna")),
            profile("Joanna Lee", Some("jlee")),
        ];
        let res = bucket(&pool, "ANN", Uuid::new_v4());
        assert_eq!(res.username_matches.len(), 1);
        assert_eq!(res.username_matches[0].name, "Anna Smith");
        assert_eq!(res.name_matches.len(), 1);
        assert_eq!(res.name_matches[0].name, "Joanna Lee");
    }

    #[test]
    fn caller_is_excluded() {
        let me = profile("Sam Stone", Some("sam"));
        let other = profile("Sam Ray", Some("samr"));
        let pool = vec![me.clone(), other.clone()];
        let res = bucket(&pool, "sam", me.id);
        assert_eq!(res.username_matches.len(), 1);
        assert_eq!(res.username_matches[0].id, other.id);
        assert!(res.name_matches.is_empty());
    }

    #[test]
    fn results_leave_out_private_fields() {
        let mut other = profile("Lin Park", Some("lin"));
        other.contact_info = Some(serde_json::json!({ "phone": "555" }));
        let res = bucket(&[other], "lin", Uuid::new_v4());

        let json = serde_json::to_value(&res).unwrap();
        let hit = &json["username_matches"][0];
        assert_eq!(hit["username"], "lin");
        assert!(hit.get("email").is_none());
        assert!(hit.get("contact_info").is_none());
    }

    #[test]
    fn buckets_are_capped() {
        let pool: Vec<Profile> = (0..12)
            .map(|i| profile(&format!("Kim {i}"), Some(&format!("kim{i}"))))
            .chain((0..12).map(|i| profile(&format!("Kimberly {i}"), None)))
            .collect();
        let res = bucket(&pool, "kim", Uuid::new_v4());
        assert_eq!(res.username_matches.len(), BUCKET_SIZE);
        assert_eq!(res.name_matches.len(), BUCKET_SIZE);
    }
}
