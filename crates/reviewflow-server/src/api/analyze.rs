//! POST /api/v1/analyze: classify free text without storing it.

use axum::{extract::State, Extension, Json};
use reviewflow_core::SentimentResult;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_pipeline_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct AnalyzeRequest {
    pub text: String,
}

pub(in crate::api) async fn analyze_text(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<ApiResponse<SentimentResult>>, ApiError> {
    let rid = &req_id.0;
    let text = body.text.trim();
    let max_chars = state.pipeline.validator().bounds().max_review_length;

    if text.is_empty() {
        return Err(
            ApiError::new(rid, "validation_error", "text must not be empty").with_field("text"),
        );
    }
    if text.chars().count() > max_chars {
        return Err(ApiError::new(
            rid,
            "validation_error",
            format!("text must be at most {max_chars} characters"),
        )
        .with_field("text"));
    }

    let result = state
        .pipeline
        .analyze(text)
        .await
        .map_err(|e| map_pipeline_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: result,
        meta: ResponseMeta::new(req_id.0),
    }))
}
