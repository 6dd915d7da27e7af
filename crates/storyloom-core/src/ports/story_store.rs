//! Story persistence port. Just enough to resume an existing story.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A story previously saved by the story service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredStory {
    pub story_id: String,
    #[serde(default)]
    pub theme: String,
    /// Full story text so far.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub improvisations: Vec<String>,
    /// How many improvisations the service still accepts.
    #[serde(default, rename = "remaining_improvs")]
    pub remaining_improvisations: u8,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Story '{0}' not found")]
    NotFound(String),

    #[error("Story service returned status {status}")]
    Status { status: u16 },

    #[error("Story service network error: {0}")]
    Network(String),

    #[error("Invalid story payload: {0}")]
    InvalidResponse(String),
}

/// Read access to saved stories.
#[async_trait]
pub trait StoryStore: Send + Sync {
    async fn fetch_story(&self, story_id: &str) -> Result<StoredStory, StoreError>;
}
