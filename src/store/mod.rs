//! Key-value storage for student records.
//!
//! Each student is one hash stored under `student:<id>`. The store knows
//! nothing about which fields a student has; that lives in [`crate::record`].

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::Result;

pub mod memory;
pub mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// Prefix shared by every student key
pub const KEY_PREFIX: &str = "student:";

/// Pattern matching every student key
pub const KEY_PATTERN: &str = "student:*";

/// Store key for a student id
pub fn student_key(id: &str) -> String {
    format!("{}{}", KEY_PREFIX, id)
}

/// Student id encoded in a store key, if it is a student key
pub fn id_from_key(key: &str) -> Option<&str> {
    key.strip_prefix(KEY_PREFIX)
}

/// Backend holding one hash per student
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Set the given fields on a student's hash, creating it if needed
    ///
    /// Fields are written one at a time; there is no transaction around them.
    async fn put_fields(&self, id: &str, fields: &[(&'static str, String)]) -> Result<()>;

    /// Every field of a student's hash, or `None` when there is no such student
    async fn get(&self, id: &str) -> Result<Option<HashMap<String, String>>>;

    /// Every student as `(id, hash)`, in no particular order
    async fn list(&self) -> Result<Vec<(String, HashMap<String, String>)>>;

    /// Remove a student; removing an unknown id is not an error
    async fn delete(&self, id: &str) -> Result<()>;

    /// Short name of the backend, for logging
    fn backend_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_the_prefix() {
        assert_eq!(student_key("42"), "student:42");
        assert_eq!(id_from_key("student:42"), Some("42"));
        assert_eq!(id_from_key("student:a:b"), Some("a:b"));
        assert_eq!(id_from_key("course:1"), None);
    }
}
