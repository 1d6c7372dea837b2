//! Handlers for client reviews on legal-practice pages.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use yurist_core::error::CoreError;
use yurist_core::reviews::{average_rating, ClientReview, NewClientReview};
use yurist_core::types::DbId;
use yurist_db::repositories::{ClientReviewRepo, PageRepo};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct PublishedParams {
    pub limit: Option<i64>,
}

/// Reviews with their mean rating (one decimal, `0.0` when empty).
#[derive(Debug, Serialize)]
pub struct ReviewList {
    pub reviews: Vec<ClientReview>,
    pub average_rating: f64,
}

impl ReviewList {
    fn new(reviews: Vec<ClientReview>) -> Self {
        let refs: Vec<&ClientReview> = reviews.iter().collect();
        let average_rating = average_rating(&refs);
        Self {
            reviews,
            average_rating,
        }
    }
}

fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// GET /pages/{id}/reviews
///
/// Every review owned by the page, newest first.
pub async fn list_for_page(
    State(state): State<AppState>,
    Path(page_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    PageRepo::find_by_id(&state.pool, page_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "page",
            id: page_id,
        })?;
    let reviews = ClientReviewRepo::list_for_page(&state.pool, page_id).await?;
    Ok(Json(DataResponse {
        data: ReviewList::new(reviews),
    }))
}

/// POST /pages/{id}/reviews
pub async fn create_review(
    State(state): State<AppState>,
    Path(page_id): Path<DbId>,
    Json(input): Json<NewClientReview>,
) -> AppResult<impl IntoResponse> {
    let review = ClientReviewRepo::create(&state.pool, page_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: review })))
}

/// GET /reviews/published?limit=
///
/// Published reviews across the site. `limit` defaults to 20, capped at 100.
pub async fn list_published(
    State(state): State<AppState>,
    Query(params): Query<PublishedParams>,
) -> AppResult<impl IntoResponse> {
    let reviews = ClientReviewRepo::list_published(&state.pool, clamp_limit(params.limit)).await?;
    Ok(Json(DataResponse {
        data: ReviewList::new(reviews),
    }))
}

/// POST /reviews/{id}/publish
pub async fn publish_review(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let review = ClientReviewRepo::set_published(&state.pool, id, true).await?;
    Ok(Json(DataResponse { data: review }))
}

/// POST /reviews/{id}/unpublish
pub async fn unpublish_review(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let review = ClientReviewRepo::set_published(&state.pool, id, false).await?;
    Ok(Json(DataResponse { data: review }))
}

/// DELETE /reviews/{id}
pub async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !ClientReviewRepo::delete(&state.pool, id).await? {
        return Err(CoreError::NotFound {
            entity: "client_review",
            id,
        }
        .into());
    }
    Ok(StatusCode::NO_CONTENT)
}
