use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A short emoji-tagged label usable for fast entry creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickDetail {
    #[serde(rename = "_id")]
    pub id: String,
    pub emoji: String,
    pub text: String,
}

impl QuickDetail {
    pub fn new(emoji: String, text: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            emoji,
            text,
        }
    }
}
