//! Mock provider for deterministic tests.

use super::{CompletionProvider, ProviderError};
use async_trait::async_trait;

/// The fixed completion returned by [`MockCompletionProvider`]. Tests
/// assert against these values.
pub const MOCK_COMPLETION_JSON: &str = r#"{
  "plant_name": "Tomato",
  "plant_variety": "San Marzano",
  "date": "2024-08-02T09:30:00Z",
  "notes": "Picked three ripe tomatoes from the south bed.",
  "weather": "sunny",
  "humidity": "61.5",
  "event_type": "harvest",
  "quantity": "3"
}"#;

pub struct MockCompletionProvider {
    enabled: bool,
}

impl MockCompletionProvider {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete_json(&self, _prompt: &str) -> Result<String, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock completion provider not enabled".to_string(),
            ));
        }

        // Simulate some processing
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        Ok(MOCK_COMPLETION_JSON.to_string())
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.enabled {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock completion provider not enabled".to_string(),
            ))
        }
    }
}
