mod common;

use common::{skip_mongo_tests, TestApp};
use mongodb::bson::{doc, Document};
use serde_json::json;

async fn create_detail(app: &TestApp, emoji: &str, text: &str) -> String {
    let response: serde_json::Value = reqwest::Client::new()
        .post(format!("{}/quick-details", app.address))
        .json(&json!({ "emoji": emoji, "text": text }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    response["id"].as_str().expect("id missing").to_string()
}

#[tokio::test]
async fn quick_detail_crud_works() {
    if skip_mongo_tests() {
        return;
    }

    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let id = create_detail(&app, "🍅", "Harvest").await;

    let details: Vec<serde_json::Value> = client
        .get(format!("{}/quick-details", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0]["id"], id.as_str());
    assert_eq!(details[0]["emoji"], "🍅");

    let response = client
        .put(format!("{}/quick-details/{}", app.address, id))
        .json(&json!({ "text": "Big harvest" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let details: Vec<serde_json::Value> = client
        .get(format!("{}/quick-details", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(details[0]["text"], "Big harvest");
    // emoji was not supplied, so it kept its prior value
    assert_eq!(details[0]["emoji"], "🍅");

    let response = client
        .delete(format!("{}/quick-details/{}", app.address, id))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let details: Vec<serde_json::Value> = client
        .get(format!("{}/quick-details", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(details.is_empty());

    app.cleanup().await;
}

#[tokio::test]
async fn update_with_no_fields_is_rejected() {
    if skip_mongo_tests() {
        return;
    }

    let app = TestApp::spawn().await;
    let id = create_detail(&app, "🌸", "Bloom").await;

    let response = reqwest::Client::new()
        .put(format!("{}/quick-details/{}", app.address, id))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    app.cleanup().await;
}

#[tokio::test]
async fn delete_nonexistent_detail_returns_not_found() {
    if skip_mongo_tests() {
        return;
    }

    let app = TestApp::spawn().await;

    let response = reqwest::Client::new()
        .delete(format!("{}/quick-details/does-not-exist", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    app.cleanup().await;
}

#[tokio::test]
async fn empty_batch_is_a_no_op() {
    if skip_mongo_tests() {
        return;
    }

    let app = TestApp::spawn().await;

    let response = reqwest::Client::new()
        .post(format!("{}/quick-details/batch", app.address))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    app.cleanup().await;
}

#[tokio::test]
async fn batch_applies_create_update_delete_as_one_commit() {
    if skip_mongo_tests() {
        return;
    }

    let app = TestApp::spawn().await;
    if !app.supports_transactions().await {
        eprintln!("Skipping test: MongoDB is not a replica set");
        app.cleanup().await;
        return;
    }
    let client = reqwest::Client::new();

    let x_id = create_detail(&app, "🍅", "Harvest").await;
    let y_id = create_detail(&app, "🥀", "Wilting").await;

    let response = client
        .post(format!("{}/quick-details/batch", app.address))
        .json(&json!({
            "create": [{ "emoji": "📸", "text": "Snapshot" }],
            "update": [{ "id": x_id, "text": "Big harvest" }],
            "delete": [y_id]
        }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let details: Vec<serde_json::Value> = client
        .get(format!("{}/quick-details", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(details.len(), 2);

    let created = details
        .iter()
        .find(|d| d["text"] == "Snapshot")
        .expect("created detail missing");
    assert!(created["id"].is_string());

    let updated = details
        .iter()
        .find(|d| d["id"] == x_id.as_str())
        .expect("updated detail missing");
    assert_eq!(updated["text"], "Big harvest");
    // emoji was not part of the update member
    assert_eq!(updated["emoji"], "🍅");

    assert!(!details.iter().any(|d| d["id"] == y_id.as_str()));

    // The update member's id is addressing metadata, never content.
    let raw: Document = app
        .db
        .database()
        .collection::<Document>("quick_details")
        .find_one(doc! { "_id": &x_id }, None)
        .await
        .unwrap()
        .expect("updated doc missing");
    let mut keys: Vec<&str> = raw.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["_id", "emoji", "text"]);

    app.cleanup().await;
}

#[tokio::test]
async fn batch_with_invalid_member_leaves_no_partial_state() {
    if skip_mongo_tests() {
        return;
    }

    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let existing_id = create_detail(&app, "🍅", "Harvest").await;

    // The update member's empty id fails validation, which must reject
    // the whole batch - including the otherwise-valid create.
    let response = client
        .post(format!("{}/quick-details/batch", app.address))
        .json(&json!({
            "create": [{ "emoji": "📸", "text": "Snapshot" }],
            "update": [{ "id": "", "text": "nope" }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 422);

    let details: Vec<serde_json::Value> = client
        .get(format!("{}/quick-details", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0]["id"], existing_id.as_str());
    assert_eq!(details[0]["text"], "Harvest");

    app.cleanup().await;
}
