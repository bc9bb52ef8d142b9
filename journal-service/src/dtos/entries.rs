use crate::models::{EventType, JournalEntry};
use chrono::{DateTime, Utc};
use mongodb::bson::{self, doc, Document};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use validator::Validate;

/// Payload for creating a journal entry.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewEntry {
    #[validate(length(min = 1, message = "plant_name must not be empty"))]
    pub plant_name: String,
    #[validate(length(min = 1, message = "plant_variety must not be empty"))]
    pub plant_variety: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    pub image_urls: Option<Vec<String>>,
    pub weather: Option<String>,
    #[validate(range(min = 0.0, max = 100.0, message = "humidity must be a percentage"))]
    pub humidity: Option<f64>,
    pub event_type: EventType,
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: Option<i64>,
}

impl NewEntry {
    pub fn into_model(self) -> JournalEntry {
        JournalEntry {
            id: JournalEntry::generate_id(),
            plant_name: self.plant_name,
            plant_variety: self.plant_variety,
            date: self.date,
            notes: self.notes,
            image_urls: self.image_urls,
            weather: self.weather,
            humidity: self.humidity,
            event_type: self.event_type,
            quantity: self.quantity,
        }
    }
}

/// Partial update: absent fields are never written.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateEntry {
    #[validate(length(min = 1, message = "plant_name must not be empty"))]
    pub plant_name: Option<String>,
    #[validate(length(min = 1, message = "plant_variety must not be empty"))]
    pub plant_variety: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub image_urls: Option<Vec<String>>,
    pub weather: Option<String>,
    #[validate(range(min = 0.0, max = 100.0, message = "humidity must be a percentage"))]
    pub humidity: Option<f64>,
    pub event_type: Option<EventType>,
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: Option<i64>,
}

impl UpdateEntry {
    /// Build the `$set` document from the supplied fields only.
    pub fn to_update_doc(&self) -> Result<Document, AppError> {
        let mut update = doc! {};
        if let Some(ref plant_name) = self.plant_name {
            update.insert("plant_name", plant_name);
        }
        if let Some(ref plant_variety) = self.plant_variety {
            update.insert("plant_variety", plant_variety);
        }
        if let Some(date) = self.date {
            update.insert("date", bson::DateTime::from_chrono(date));
        }
        if let Some(ref notes) = self.notes {
            update.insert("notes", notes);
        }
        if let Some(ref image_urls) = self.image_urls {
            update.insert("image_urls", image_urls.clone());
        }
        if let Some(ref weather) = self.weather {
            update.insert("weather", weather);
        }
        if let Some(humidity) = self.humidity {
            update.insert("humidity", humidity);
        }
        if let Some(event_type) = self.event_type {
            let value = bson::to_bson(&event_type).map_err(|e| {
                AppError::InternalError(anyhow::anyhow!("Failed to serialize event_type: {}", e))
            })?;
            update.insert("event_type", value);
        }
        if let Some(quantity) = self.quantity {
            update.insert("quantity", quantity);
        }
        Ok(update)
    }
}

/// Request body for `/journal/from-text`.
#[derive(Debug, Deserialize, Validate)]
pub struct FromTextRequest {
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EntryResponse {
    pub id: String,
    pub plant_name: String,
    pub plant_variety: String,
    pub date: String,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    pub event_type: EventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
}

impl From<JournalEntry> for EntryResponse {
    fn from(entry: JournalEntry) -> Self {
        Self {
            id: entry.id,
            plant_name: entry.plant_name,
            plant_variety: entry.plant_variety,
            date: entry.date.to_rfc3339(),
            notes: entry.notes,
            image_urls: entry.image_urls,
            weather: entry.weather,
            humidity: entry.humidity,
            event_type: entry.event_type,
            quantity: entry.quantity,
        }
    }
}
