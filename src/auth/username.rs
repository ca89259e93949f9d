use std::future::Future;

use lazy_static::lazy_static;
use regex::Regex;

const MAX_ATTEMPTS: u32 = 10_000;
const MIN_LEN: usize = 3;
const MAX_LEN: usize = 30;
/// Room for the largest counter suffix (`MAX_ATTEMPTS - 1`).
const SUFFIX_ROOM: usize = 4;

/// Lower-cases a full name and strips whitespace and non-word characters.
/// Short results are padded with `user`; long ones are cut so that a counter
/// suffix still fits the username length limit.
pub fn username_base(full_name: &str) -> String {
    lazy_static! {
        static ref NON_WORD: Regex = Regex::new(r"[^a-z0-9_]").unwrap();
    }
    let mut base = NON_WORD
        .replace_all(&full_name.to_lowercase(), "")
        .into_owned();
    if base.len() < MIN_LEN {
        base.push_str("user");
    }
    // only ASCII survives the filter, so byte truncation is safe
    base.truncate(MAX_LEN - SUFFIX_ROOM);
    base
}

/// `base`, then `base1`, `base2`, ...
pub fn candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{base}{attempt}")
    }
}

/// Returns the first candidate for which `is_taken` answers `false`.
pub async fn generate_with<F, Fut>(full_name: &str, mut is_taken: F) -> anyhow::Result<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = anyhow::Result<bool>>,
{
    let base = username_base(full_name);
    for attempt in 0..MAX_ATTEMPTS {
        let username = candidate(&base, attempt);
        if !is_taken(username.clone()).await? {
            return Ok(username);
        }
    }
    anyhow::bail!("no free username for base {base}")
}
