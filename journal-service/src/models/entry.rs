use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of event a journal entry records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Harvest,
    Bloom,
    Snapshot,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Harvest => "harvest",
            EventType::Bloom => "bloom",
            EventType::Snapshot => "snapshot",
        }
    }
}

impl std::str::FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "harvest" => Ok(EventType::Harvest),
            "bloom" => Ok(EventType::Bloom),
            "snapshot" => Ok(EventType::Snapshot),
            _ => Err(format!("Unrecognized event type: {}", s)),
        }
    }
}

/// A stored journal entry. The document contains exactly the submitted
/// fields plus the generated `_id`; optional fields are absent rather
/// than null so partial updates never have to distinguish the two.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub plant_name: String,
    pub plant_variety: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub date: DateTime<Utc>,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    pub event_type: EventType,
    // Meaningful for harvest events only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
}

impl JournalEntry {
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }
}
