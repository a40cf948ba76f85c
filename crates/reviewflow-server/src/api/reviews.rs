//! Review handlers: submit, fetch, list per movie, patch, delete.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use reviewflow_core::{Review, ReviewDraft, ReviewPatch};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_pipeline_error, ApiError, ApiResponse, AppState, ResponseMeta};

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(in crate::api) struct CreateReviewRequest {
    pub movie_id: String,
    pub content: String,
    pub rating: i32,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct UpdateReviewRequest {
    pub content: Option<String>,
    pub rating: Option<i32>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/reviews
pub(in crate::api) async fn create_review(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Review>>), ApiError> {
    let draft = ReviewDraft {
        movie_id: body.movie_id,
        content: body.content,
        rating: body.rating,
    };

    let review = state
        .pipeline
        .submit(&draft)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: review,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// GET /api/v1/reviews/:id
pub(in crate::api) async fn get_review(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Review>>, ApiError> {
    let review = state
        .pipeline
        .get(id)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: review,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// GET /api/v1/movies/:movie_id/reviews, newest first.
pub(in crate::api) async fn list_movie_reviews(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(movie_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Review>>>, ApiError> {
    let reviews = state
        .pipeline
        .list_for_movie(&movie_id)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: reviews,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// PATCH /api/v1/reviews/:id (sparse; omitted fields keep their value).
pub(in crate::api) async fn update_review(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateReviewRequest>,
) -> Result<Json<ApiResponse<Review>>, ApiError> {
    let patch = ReviewPatch {
        content: body.content,
        rating: body.rating,
    };

    let review = state
        .pipeline
        .update(id, &patch)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: review,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// DELETE /api/v1/reviews/:id
pub(in crate::api) async fn delete_review(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .pipeline
        .delete(id)
        .await
        .map_err(|e| map_pipeline_error(req_id.0, &e))?;

    Ok(StatusCode::NO_CONTENT)
}
