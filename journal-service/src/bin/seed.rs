//! Seeds the quick-detail vocabulary through the running HTTP API.
//!
//! Run with the service up: `cargo run -p journal-service --bin seed`.
//! Aborts when the collection already holds data.

use serde_json::{json, Value};

const QUICK_DETAILS_TO_SEED: [(&str, &str); 3] = [
    ("🍅", "Harvest"),
    ("📸", "Snapshot"),
    ("🌸", "Bloom"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let base_url =
        std::env::var("JOURNAL_API_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let client = reqwest::Client::new();

    println!("Checking for existing data at {}/quick-details...", base_url);
    let existing: Vec<Value> = client
        .get(format!("{}/quick-details", base_url))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    if !existing.is_empty() {
        println!("The quick_details collection is not empty. Aborting seed operation.");
        for detail in &existing {
            println!(
                "  - Found: {} (ID: {})",
                detail["text"].as_str().unwrap_or("N/A"),
                detail["id"].as_str().unwrap_or("N/A")
            );
        }
        return Ok(());
    }

    println!("Seeding {} documents via API...", QUICK_DETAILS_TO_SEED.len());
    for (emoji, text) in QUICK_DETAILS_TO_SEED {
        let response: Value = client
            .post(format!("{}/quick-details", base_url))
            .json(&json!({ "emoji": emoji, "text": text }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        println!(
            "  - Successfully added '{}' with ID: {}",
            text,
            response["id"].as_str().unwrap_or("N/A")
        );
    }

    println!("\nSeeding complete!");
    Ok(())
}
