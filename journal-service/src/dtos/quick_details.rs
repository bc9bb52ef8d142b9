use crate::models::QuickDetail;
use mongodb::bson::{doc, Document};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Payload for creating a quick detail, singly or inside a batch.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewQuickDetail {
    #[validate(length(min = 1, message = "emoji must not be empty"))]
    pub emoji: String,
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: String,
}

impl NewQuickDetail {
    pub fn into_model(self) -> QuickDetail {
        QuickDetail::new(self.emoji, self.text)
    }
}

/// Partial update for a single quick detail.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateQuickDetail {
    pub emoji: Option<String>,
    pub text: Option<String>,
}

impl UpdateQuickDetail {
    pub fn is_empty(&self) -> bool {
        self.emoji.is_none() && self.text.is_none()
    }

    pub fn to_update_doc(&self) -> Document {
        let mut update = doc! {};
        if let Some(ref emoji) = self.emoji {
            update.insert("emoji", emoji);
        }
        if let Some(ref text) = self.text {
            update.insert("text", text);
        }
        update
    }
}

/// One update member of a batch request. The `id` addresses the document;
/// only `emoji`/`text` become document content.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuickDetailChange {
    #[validate(length(min = 1, message = "id must not be empty"))]
    pub id: String,
    pub emoji: Option<String>,
    pub text: Option<String>,
}

impl QuickDetailChange {
    pub fn to_update_doc(&self) -> Document {
        let mut update = doc! {};
        if let Some(ref emoji) = self.emoji {
            update.insert("emoji", emoji);
        }
        if let Some(ref text) = self.text {
            update.insert("text", text);
        }
        update
    }
}

/// Request body for `/quick-details/batch`.
#[derive(Debug, Default, Deserialize)]
pub struct QuickDetailBatch {
    #[serde(default)]
    pub create: Vec<NewQuickDetail>,
    #[serde(default)]
    pub update: Vec<QuickDetailChange>,
    #[serde(default)]
    pub delete: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuickDetailResponse {
    pub id: String,
    pub emoji: String,
    pub text: String,
}

impl From<QuickDetail> for QuickDetailResponse {
    fn from(detail: QuickDetail) -> Self {
        Self {
            id: detail.id,
            emoji: detail.emoji,
            text: detail.text,
        }
    }
}
