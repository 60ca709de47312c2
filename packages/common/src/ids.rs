//! Block id generation.
//!
//! Newly inserted blocks get `<timestamp>-<random>` ids. They only need to be
//! unique within the list they are inserted into.

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashSet;

const RANDOM_SUFFIX_LEN: usize = 9;

/// Generate a fresh block id
pub fn generate_block_id() -> String {
    let timestamp = chrono::Utc::now().timestamp_millis();
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_SUFFIX_LEN)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect();
    format!("{}-{}", timestamp, suffix)
}

/// Generate a block id that does not collide with any of `existing`
pub fn generate_unique_block_id<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    let taken: HashSet<&str> = existing.into_iter().collect();
    loop {
        let id = generate_block_id();
        if !taken.contains(id.as_str()) {
            return id;
        }
    }
}
