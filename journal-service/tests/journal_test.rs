mod common;

use chrono::{DateTime, Utc};
use common::{skip_mongo_tests, TestApp};
use serde_json::json;

#[tokio::test]
async fn create_then_get_round_trips_exactly() {
    if skip_mongo_tests() {
        return;
    }

    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let payload = json!({
        "plant_name": "Tomato",
        "plant_variety": "San Marzano",
        "date": "2024-06-01T12:00:00Z",
        "notes": "Transplanted to the south bed",
        "weather": "sunny",
        "humidity": 58.5,
        "event_type": "snapshot"
    });

    let response = client
        .post(format!("{}/journal", app.address))
        .json(&payload)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    let entry_id = body["entry_id"].as_str().expect("entry_id missing");

    let response = client
        .get(format!("{}/journal/{}", app.address, entry_id))
        .send()
        .await
        .expect("Failed to execute request.");
    assert!(response.status().is_success());

    let entry: serde_json::Value = response.json().await.unwrap();
    assert_eq!(entry["id"], entry_id);
    assert_eq!(entry["plant_name"], "Tomato");
    assert_eq!(entry["plant_variety"], "San Marzano");
    assert_eq!(entry["notes"], "Transplanted to the south bed");
    assert_eq!(entry["weather"], "sunny");
    assert_eq!(entry["humidity"], 58.5);
    assert_eq!(entry["event_type"], "snapshot");

    let returned_date: DateTime<Utc> = entry["date"]
        .as_str()
        .unwrap()
        .parse()
        .expect("date is not RFC 3339");
    let submitted_date: DateTime<Utc> = "2024-06-01T12:00:00Z".parse().unwrap();
    assert_eq!(returned_date, submitted_date);

    // Exactly the submitted fields plus the generated id - nothing else.
    let keys: Vec<&String> = entry.as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), 8, "unexpected fields in {:?}", keys);

    app.cleanup().await;
}

#[tokio::test]
async fn create_rejects_unknown_event_type() {
    if skip_mongo_tests() {
        return;
    }

    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/journal", app.address))
        .json(&json!({
            "plant_name": "Tomato",
            "plant_variety": "Roma",
            "date": "2024-06-01T12:00:00Z",
            "notes": "",
            "event_type": "pruning"
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 422);

    app.cleanup().await;
}

#[tokio::test]
async fn get_nonexistent_entry_returns_not_found() {
    if skip_mongo_tests() {
        return;
    }

    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/journal/does-not-exist", app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Entry not found");

    app.cleanup().await;
}

#[tokio::test]
async fn partial_update_changes_only_supplied_fields() {
    if skip_mongo_tests() {
        return;
    }

    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let created: serde_json::Value = client
        .post(format!("{}/journal", app.address))
        .json(&json!({
            "plant_name": "Cucumber",
            "plant_variety": "Marketmore",
            "date": "2024-07-10T08:00:00Z",
            "notes": "First flowers",
            "weather": "overcast",
            "humidity": 70.0,
            "event_type": "bloom"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let entry_id = created["entry_id"].as_str().unwrap();

    let response = client
        .put(format!("{}/journal/{}", app.address, entry_id))
        .json(&json!({ "notes": "First fruit set", "humidity": 65.0 }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert!(response.status().is_success());

    let entry: serde_json::Value = client
        .get(format!("{}/journal/{}", app.address, entry_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Supplied fields changed
    assert_eq!(entry["notes"], "First fruit set");
    assert_eq!(entry["humidity"], 65.0);
    // Everything else kept its prior value
    assert_eq!(entry["plant_name"], "Cucumber");
    assert_eq!(entry["plant_variety"], "Marketmore");
    assert_eq!(entry["weather"], "overcast");
    assert_eq!(entry["event_type"], "bloom");

    app.cleanup().await;
}

#[tokio::test]
async fn update_nonexistent_entry_returns_not_found() {
    if skip_mongo_tests() {
        return;
    }

    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let response = client
        .put(format!("{}/journal/does-not-exist", app.address))
        .json(&json!({ "notes": "..." }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 404);

    app.cleanup().await;
}

#[tokio::test]
async fn list_returns_entries_newest_first() {
    if skip_mongo_tests() {
        return;
    }

    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    for (name, date) in [
        ("Older", "2024-05-01T08:00:00Z"),
        ("Newer", "2024-06-01T08:00:00Z"),
    ] {
        let response = client
            .post(format!("{}/journal", app.address))
            .json(&json!({
                "plant_name": name,
                "plant_variety": "Test",
                "date": date,
                "notes": "",
                "event_type": "snapshot"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 201);
    }

    let entries: Vec<serde_json::Value> = client
        .get(format!("{}/journal", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["plant_name"], "Newer");
    assert_eq!(entries[1]["plant_name"], "Older");
    assert!(entries.iter().all(|e| e["id"].is_string()));

    app.cleanup().await;
}

#[tokio::test]
async fn from_text_creates_a_validated_harvest_entry() {
    if skip_mongo_tests() {
        return;
    }

    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/journal/from-text", app.address))
        .json(&json!({ "text": "Picked three ripe San Marzanos this morning" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");

    // The mock provider answers with a harvest record whose quantity and
    // humidity arrive as strings; the extraction boundary coerces them.
    let entry = &body["entry"];
    assert_eq!(entry["event_type"], "harvest");
    assert_eq!(entry["quantity"], 3);
    assert_eq!(entry["humidity"], 61.5);
    assert_eq!(entry["plant_name"], "Tomato");

    // And the entry was persisted as returned.
    let entry_id = body["entry_id"].as_str().unwrap();
    let stored: serde_json::Value = client
        .get(format!("{}/journal/{}", app.address, entry_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stored["event_type"], "harvest");
    assert_eq!(stored["quantity"], 3);

    app.cleanup().await;
}
