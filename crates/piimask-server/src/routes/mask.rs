//! Masking routes for single texts and batches.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::info;

use crate::api::{ApiError, BatchMaskRequest, BatchMaskResponse, MaskRequest, MaskResponse};
use crate::pipeline::{mask_many, mask_single};
use crate::state::AppState;

// ---------------------------------------------------------------
// Route builder
// ---------------------------------------------------------------

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/mask-pii", post(mask_pii))
        .route("/mask-pii/batch", post(mask_pii_batch))
}

fn request_id() -> String {
    uuid::Uuid::new_v4().to_string()[..8].to_string()
}

// ---------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------

async fn mask_pii(
    State(state): State<Arc<AppState>>,
    body: Result<Json<MaskRequest>, JsonRejection>,
) -> Result<Json<MaskResponse>, ApiError> {
    let Json(req) = body?;
    req.pii_config.validate()?;
    if req.text.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Input text cannot be empty or whitespace only".into(),
        ));
    }

    let detector = state.detector()?;
    let id = request_id();
    let doc = mask_single(detector, &req.text, &req.pii_config).await?;

    info!(
        request_id = %id,
        "Masked text ({} chars) with {} PII types: {} resolved, {} rejected",
        req.text.len(),
        req.pii_config.len(),
        doc.resolved.len(),
        doc.rejected.len()
    );

    Ok(Json(MaskResponse::from_document(
        doc,
        state.config.unresolved_policy,
    )))
}

async fn mask_pii_batch(
    State(state): State<Arc<AppState>>,
    body: Result<Json<BatchMaskRequest>, JsonRejection>,
) -> Result<Json<BatchMaskResponse>, ApiError> {
    let Json(req) = body?;
    req.pii_config.validate()?;
    if req.texts.is_empty() {
        return Err(ApiError::BadRequest("Input texts cannot be empty".into()));
    }
    let limit = state.config.max_batch_size;
    if req.texts.len() > limit {
        return Err(ApiError::BadRequest(format!(
            "Batch of {} texts exceeds the maximum of {}",
            req.texts.len(),
            limit
        )));
    }

    let detector = state.detector()?;
    let id = request_id();
    let slots = mask_many(
        detector,
        &req.texts,
        &req.pii_config,
        state.config.batch_concurrency,
    )
    .await;

    let response = BatchMaskResponse::from_slots(req.texts, slots, state.config.unresolved_policy);
    let detected: usize = response.detected_pii.iter().map(Vec::len).sum();
    info!(
        request_id = %id,
        "Processed {} texts with {} PII types: {} PII items masked, {} failed slots",
        response.original_texts.len(),
        req.pii_config.len(),
        detected,
        response.errors.len()
    );

    Ok(Json(response))
}
