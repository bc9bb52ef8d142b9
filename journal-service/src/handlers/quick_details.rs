use crate::dtos::{NewQuickDetail, QuickDetailBatch, QuickDetailResponse, UpdateQuickDetail};
use crate::services::JournalDb;
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::ClientSession;
use serde_json::json;
use service_core::error::AppError;
use validator::Validate;

pub async fn list_quick_details(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let mut cursor = state
        .db
        .quick_details()
        .find(doc! {}, None)
        .await
        .map_err(AppError::from)?;

    let mut details = Vec::new();
    while let Some(detail) = cursor.try_next().await.map_err(AppError::from)? {
        details.push(QuickDetailResponse::from(detail));
    }

    Ok(Json(details))
}

pub async fn create_quick_detail(
    State(state): State<AppState>,
    Json(payload): Json<NewQuickDetail>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let detail = payload.into_model();
    state
        .db
        .quick_details()
        .insert_one(&detail, None)
        .await
        .map_err(AppError::from)?;

    tracing::info!(id = %detail.id, text = %detail.text, "Quick detail created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "success", "id": detail.id })),
    ))
}

pub async fn update_quick_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateQuickDetail>,
) -> Result<impl IntoResponse, AppError> {
    if payload.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "No fields to update"
        )));
    }

    let result = state
        .db
        .quick_details()
        .update_one(
            doc! { "_id": &id },
            doc! { "$set": payload.to_update_doc() },
            None,
        )
        .await
        .map_err(AppError::from)?;

    if result.matched_count == 0 {
        return Err(AppError::NotFound(anyhow::anyhow!("Quick detail not found")));
    }

    Ok(Json(json!({ "status": "success", "id": id })))
}

pub async fn delete_quick_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = state
        .db
        .quick_details()
        .delete_one(doc! { "_id": &id }, None)
        .await
        .map_err(AppError::from)?;

    if result.deleted_count == 0 {
        return Err(AppError::NotFound(anyhow::anyhow!("Quick detail not found")));
    }

    Ok(Json(json!({ "status": "success" })))
}

/// Apply a create/update/delete batch as one atomic commit. Members are
/// validated before the transaction opens, so a malformed member costs
/// no writes; a store failure mid-batch aborts the whole transaction.
pub async fn batch_quick_details(
    State(state): State<AppState>,
    Json(batch): Json<QuickDetailBatch>,
) -> Result<impl IntoResponse, AppError> {
    for create in &batch.create {
        create.validate()?;
    }
    for change in &batch.update {
        change.validate()?;
        if change.emoji.is_none() && change.text.is_none() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Batch update member {} has no fields",
                change.id
            )));
        }
    }
    for id in &batch.delete {
        if id.is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Batch delete member has an empty id"
            )));
        }
    }

    if batch.create.is_empty() && batch.update.is_empty() && batch.delete.is_empty() {
        return Ok(Json(json!({ "status": "success" })));
    }

    let mut session = state
        .db
        .client()
        .start_session(None)
        .await
        .map_err(AppError::from)?;
    session
        .start_transaction(None)
        .await
        .map_err(AppError::from)?;

    match apply_batch(&state.db, &mut session, &batch).await {
        Ok(()) => {
            session.commit_transaction().await.map_err(AppError::from)?;
        }
        Err(e) => {
            tracing::error!(error = %e, "Quick detail batch failed, aborting transaction");
            session.abort_transaction().await.ok();
            return Err(e);
        }
    }

    tracing::info!(
        created = batch.create.len(),
        updated = batch.update.len(),
        deleted = batch.delete.len(),
        "Quick detail batch committed"
    );

    Ok(Json(json!({ "status": "success" })))
}

async fn apply_batch(
    db: &JournalDb,
    session: &mut ClientSession,
    batch: &QuickDetailBatch,
) -> Result<(), AppError> {
    for create in &batch.create {
        let detail = create.clone().into_model();
        db.quick_details()
            .insert_one_with_session(&detail, None, session)
            .await
            .map_err(AppError::from)?;
    }

    for change in &batch.update {
        db.quick_details()
            .update_one_with_session(
                doc! { "_id": &change.id },
                doc! { "$set": change.to_update_doc() },
                None,
                session,
            )
            .await
            .map_err(AppError::from)?;
    }

    for id in &batch.delete {
        db.quick_details()
            .delete_one_with_session(doc! { "_id": id }, None, session)
            .await
            .map_err(AppError::from)?;
    }

    Ok(())
}
