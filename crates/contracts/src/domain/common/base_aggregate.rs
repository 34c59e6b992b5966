use serde::{Deserialize, Serialize};

use super::EntityMetadata;

/// Fields every aggregate carries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseAggregate<Id> {
    /// Unique record id
    pub id: Id,
    /// Business code (e.g. "STK-0001", "LOAN-2025-004")
    pub code: String,
    /// Name shown in lists
    pub description: String,
    /// Free-form note
    pub comment: Option<String>,
    /// Lifecycle metadata
    pub metadata: EntityMetadata,
}

impl<Id> BaseAggregate<Id> {
    /// New aggregate with fresh metadata
    pub fn new(id: Id, code: String, description: String) -> Self {
        Self {
            id,
            code,
            description,
            comment: None,
            metadata: EntityMetadata::new(),
        }
    }

    /// Rebuild an aggregate loaded from storage
    pub fn with_metadata(
        id: Id,
        code: String,
        description: String,
        comment: Option<String>,
        metadata: EntityMetadata,
    ) -> Self {
        Self {
            id,
            code,
            description,
            comment,
            metadata,
        }
    }

    /// Bump `updated_at`
    pub fn touch(&mut self) {
        self.metadata.touch();
    }

    /// Replace the comment
    pub fn set_comment(&mut self, comment: Option<String>) {
        self.comment = comment;
    }
}
