use crate::dtos::{EntryResponse, FromTextRequest, NewEntry, UpdateEntry};
use crate::startup::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::FindOptions;
use serde_json::json;
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

pub async fn create_entry(
    State(state): State<AppState>,
    Json(payload): Json<NewEntry>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let entry = payload.into_model();
    state
        .db
        .entries()
        .insert_one(&entry, None)
        .await
        .map_err(AppError::from)?;

    tracing::info!(entry_id = %entry.id, event_type = %entry.event_type.as_str(), "Journal entry created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "success", "entry_id": entry.id })),
    ))
}

pub async fn list_entries(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let find_options = FindOptions::builder().sort(doc! { "date": -1 }).build();

    let mut cursor = state
        .db
        .entries()
        .find(doc! {}, find_options)
        .await
        .map_err(AppError::from)?;

    let mut entries = Vec::new();
    while let Some(entry) = cursor.try_next().await.map_err(AppError::from)? {
        entries.push(EntryResponse::from(entry));
    }

    Ok(Json(entries))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let entry = state
        .db
        .entries()
        .find_one(doc! { "_id": &entry_id }, None)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Entry not found")))?;

    Ok(Json(EntryResponse::from(entry)))
}

pub async fn update_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
    Json(payload): Json<UpdateEntry>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let update = payload.to_update_doc()?;
    if update.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "No fields to update"
        )));
    }

    let result = state
        .db
        .entries()
        .update_one(doc! { "_id": &entry_id }, doc! { "$set": update }, None)
        .await
        .map_err(AppError::from)?;

    if result.matched_count == 0 {
        return Err(AppError::NotFound(anyhow::anyhow!("Entry not found")));
    }

    Ok(Json(json!({ "status": "success", "entry_id": entry_id })))
}

pub async fn create_entry_from_text(
    State(state): State<AppState>,
    Json(payload): Json<FromTextRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let entry = state.extractor.extract(&payload.text).await?.into_model();

    state
        .db
        .entries()
        .insert_one(&entry, None)
        .await
        .map_err(AppError::from)?;

    tracing::info!(entry_id = %entry.id, "Journal entry extracted from text");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "entry_id": entry.id.clone(),
            "entry": EntryResponse::from(entry)
        })),
    ))
}

struct UploadedImage {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

pub async fn upload_entry(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut entry_data: Option<String> = None;
    let mut images: Vec<UploadedImage> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
    })? {
        match field.name() {
            Some("entry_data") => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Failed to read entry_data: {}", e))
                })?;
                entry_data = Some(text);
            }
            Some("images") => {
                let filename = field.file_name().unwrap_or("unnamed").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| {
                        AppError::BadRequest(anyhow::anyhow!("Failed to read image bytes: {}", e))
                    })?
                    .to_vec();
                images.push(UploadedImage {
                    filename,
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    // Parse the embedded entry before touching storage, so a malformed
    // request uploads nothing.
    let entry_data = entry_data
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Missing entry_data field")))?;
    let supplied: NewEntry = serde_json::from_str(&entry_data).map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("entry_data is not valid JSON: {}", e))
    })?;

    let merged = if supplied.notes.trim().is_empty() {
        supplied
    } else {
        let extracted = state.extractor.extract(&supplied.notes).await?;
        extracted.merge_over(supplied)
    };
    merged.validate()?;

    let mut image_urls = Vec::with_capacity(images.len());
    for image in images {
        // Uploaded names are untrusted; keep only the final component.
        let file_name = std::path::Path::new(&image.filename)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image");
        let storage_key = format!("{}/{}", Uuid::new_v4(), file_name);

        let url = state
            .storage
            .upload_public(&storage_key, image.bytes, &image.content_type)
            .await
            .map_err(|e| {
                tracing::error!(storage_key = %storage_key, error = %e, "Image upload failed");
                e
            })?;
        image_urls.push(url);
    }

    let mut entry = merged.into_model();
    // Server-resolved URLs replace anything the client supplied.
    entry.image_urls = if image_urls.is_empty() {
        None
    } else {
        Some(image_urls)
    };

    state
        .db
        .entries()
        .insert_one(&entry, None)
        .await
        .map_err(AppError::from)?;

    tracing::info!(
        entry_id = %entry.id,
        images = entry.image_urls.as_ref().map_or(0, |urls| urls.len()),
        "Journal entry created from upload"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "success", "entry": EntryResponse::from(entry) })),
    ))
}
