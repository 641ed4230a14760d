use std::fmt;

use sha2::{Digest, Sha256};
use sqlx::FromRow;
use subtle::ConstantTimeEq;

/// A challenge as stored. Not `Serialize`; `Debug` redacts the flag.
#[derive(Clone, FromRow)]
pub struct Task {
    pub task_id: String,
    pub name: String,
    pub category: String,
    pub author: String,
    pub description: Option<String>,
    pub flag: String,
    pub has_attachment: bool,
    pub is_open: bool,
    pub is_freezed: bool,
}

impl Task {
    /// Exact, constant-time comparison of a submitted flag with the stored one.
    pub fn flag_matches(&self, candidate: &str) -> bool {
        self.flag.as_bytes().ct_eq(candidate.as_bytes()).into()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("task_id", &self.task_id)
            .field("name", &self.name)
            .field("category", &self.category)
            .field("author", &self.author)
            .field("has_attachment", &self.has_attachment)
            .field("is_open", &self.is_open)
            .field("is_freezed", &self.is_freezed)
            .finish_non_exhaustive()
    }
}

/// Task ids are the lowercase hex SHA-256 of the task name, so re-importing
/// the same manifest always lands on the same row.
pub fn derive_task_id(name: &str) -> String {
    hex::encode(Sha256::digest(name.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(flag: &str) -> Task {
        Task {
            task_id: derive_task_id("welcome"),
            name: "welcome".to_string(),
            category: "misc".to_string(),
            author: "ptr-yudai".to_string(),
            description: None,
            flag: flag.to_string(),
            has_attachment: false,
            is_open: true,
            is_freezed: false,
        }
    }

    #[test]
    fn test_flag_matches_exactly() {
        let task = task("RTACON{speed}");
        assert!(task.flag_matches("RTACON{speed}"));
        assert!(!task.flag_matches("RTACON{speed} "));
        assert!(!task.flag_matches("rtacon{speed}"));
        assert!(!task.flag_matches("RTACON{spee"));
        assert!(!task.flag_matches(""));
    }

    #[test]
    fn test_debug_redacts_flag() {
        let rendered = format!("{:?}", task("RTACON{secret}"));
        assert!(!rendered.contains("RTACON{secret}"));
        assert!(rendered.contains("welcome"));
    }

    #[test]
    fn test_task_id_is_sha256_hex_of_name() {
        assert_eq!(
            derive_task_id("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(derive_task_id("welcome"), derive_task_id("welcome"));
        assert_ne!(derive_task_id("welcome"), derive_task_id("Welcome"));
    }
}
