use serde::{Deserialize, Serialize};

/// Lifecycle metadata of a record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// Creation time
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Time of the last update
    pub updated_at: chrono::DateTime<chrono::Utc>,
    /// Soft delete flag
    pub is_deleted: bool,
    /// Version for optimistic locking
    pub version: i32,
}

impl EntityMetadata {
    /// Metadata for a record that has not been stored yet
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            is_deleted: false,
            version: 0,
        }
    }

    /// Bump `updated_at`
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now();
    }

    /// Next optimistic-locking version
    pub fn increment_version(&mut self) {
        self.version += 1;
    }
}

impl Default for EntityMetadata {
    fn default() -> Self {
        Self::new()
    }
}
