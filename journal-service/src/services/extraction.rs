//! Free-text to journal-entry extraction.
//!
//! Builds the instruction prompt, calls the completion provider with a
//! bounded retry, and validates the model's JSON before anything touches
//! the database. Model output is never persisted unchecked.

use crate::dtos::NewEntry;
use crate::models::{EventType, JournalEntry};
use crate::services::providers::CompletionProvider;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Duration;

pub struct EntryExtractor {
    provider: Arc<dyn CompletionProvider>,
}

impl EntryExtractor {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Extract a structured entry from free-form text.
    pub async fn extract(&self, text: &str) -> Result<ExtractedEntry, AppError> {
        let prompt = build_prompt(text);

        // Hosted completion endpoints are the least reliable dependency;
        // retry transport failures and rate limits, give up on the rest.
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        let raw = retry(backoff, || async {
            self.provider.complete_json(&prompt).await.map_err(|e| {
                if e.is_transient() {
                    tracing::warn!(error = %e, "Transient completion failure, retrying");
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        })
        .await
        .map_err(|e| AppError::BadGateway(format!("Completion request failed: {}", e)))?;

        let value: Value = serde_json::from_str(strip_code_fences(&raw)).map_err(|e| {
            tracing::warn!(error = %e, "Completion was not valid JSON");
            AppError::BadGateway(format!("Completion was not valid JSON: {}", e))
        })?;

        ExtractedEntry::from_value(&value)
            .map_err(|e| AppError::BadGateway(format!("Completion failed validation: {}", e)))
    }
}

/// Model output after validation and coercion. This is the only shape
/// the extraction path is allowed to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedEntry {
    pub plant_name: String,
    pub plant_variety: String,
    pub date: DateTime<Utc>,
    pub notes: String,
    pub image_urls: Option<Vec<String>>,
    pub weather: Option<String>,
    pub humidity: Option<f64>,
    pub event_type: EventType,
    pub quantity: Option<i64>,
}

impl ExtractedEntry {
    /// Validate and coerce a raw JSON object. Required strings must be
    /// present and non-empty (notes may be empty), the event type must be
    /// recognized, and numbers coerce from numeric strings. Anything
    /// else is an error.
    pub fn from_value(value: &Value) -> anyhow::Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| anyhow::anyhow!("expected a JSON object"))?;

        let plant_name = required_string(object, "plant_name")?;
        let plant_variety = required_string(object, "plant_variety")?;
        let notes = match object.get("notes") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => anyhow::bail!("notes must be a string, got {}", other),
        };

        let event_type: EventType = required_string(object, "event_type")?
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;

        let date = match object.get("date").and_then(Value::as_str) {
            Some(raw) => parse_date(raw).unwrap_or_else(Utc::now),
            None => Utc::now(),
        };

        let image_urls = match object.get("image_urls") {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => {
                let urls = items
                    .iter()
                    .map(|item| {
                        item.as_str()
                            .map(str::to_string)
                            .ok_or_else(|| anyhow::anyhow!("image_urls must contain strings"))
                    })
                    .collect::<anyhow::Result<Vec<_>>>()?;
                if urls.is_empty() { None } else { Some(urls) }
            }
            Some(other) => anyhow::bail!("image_urls must be a list, got {}", other),
        };

        let weather = match object.get("weather") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => anyhow::bail!("weather must be a string, got {}", other),
        };

        let humidity = coerce_f64(object.get("humidity"), "humidity")?;
        let quantity = coerce_i64(object.get("quantity"), "quantity")?;

        Ok(Self {
            plant_name,
            plant_variety,
            date,
            notes,
            image_urls,
            weather,
            humidity,
            event_type,
            quantity,
        })
    }

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

    /// Merge over a client-supplied entry: extracted fields win, optional
    /// extracted fields only when present.
    pub fn merge_over(self, base: NewEntry) -> NewEntry {
        NewEntry {
            plant_name: self.plant_name,
            plant_variety: self.plant_variety,
            date: self.date,
            notes: self.notes,
            image_urls: self.image_urls.or(base.image_urls),
            weather: self.weather.or(base.weather),
            humidity: self.humidity.or(base.humidity),
            event_type: self.event_type,
            quantity: self.quantity.or(base.quantity),
        }
    }
}

fn required_string(
    object: &serde_json::Map<String, Value>,
    field: &'static str,
) -> anyhow::Result<String> {
    match object.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => anyhow::bail!("{} must not be empty", field),
        Some(other) => anyhow::bail!("{} must be a string, got {}", field, other),
        None => anyhow::bail!("{} is missing", field),
    }
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    // Models often answer with a bare date.
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn coerce_f64(value: Option<&Value>, field: &'static str) -> anyhow::Result<Option<f64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("{} is not a number: {}", field, s)),
        Some(other) => anyhow::bail!("{} must be a number, got {}", field, other),
    }
}

fn coerce_i64(value: Option<&Value>, field: &'static str) -> anyhow::Result<Option<i64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return Ok(Some(i));
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 => Ok(Some(f as i64)),
                _ => anyhow::bail!("{} must be an integer, got {}", field, n),
            }
        }
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("{} is not an integer: {}", field, s)),
        Some(other) => anyhow::bail!("{} must be an integer, got {}", field, other),
    }
}

fn build_prompt(text: &str) -> String {
    format!(
        r#"Extract the following information from the text and return it as a JSON object:
- plant_name (string)
- plant_variety (string)
- date (datetime in ISO 8601 format, assume today if not specified)
- notes (string)
- image_urls (list of strings, optional)
- weather (string, optional)
- humidity (number, optional)
- event_type (string, one of: 'harvest', 'bloom', 'snapshot')
- quantity (integer, optional, only for harvest events, e.g., 3 for 3 harvested items)

Text: "{}"

JSON Output:
"#,
        text
    )
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
