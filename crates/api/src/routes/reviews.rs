use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::reviews;
use crate::state::AppState;

/// Review moderation routes, nested under `/reviews`.
///
/// ```text
/// GET    /published        list_published
/// DELETE /{id}             delete_review
/// POST   /{id}/publish     publish_review
/// POST   /{id}/unpublish   unpublish_review
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/published", get(reviews::list_published))
        .route("/{id}", delete(reviews::delete_review))
        .route("/{id}/publish", post(reviews::publish_review))
        .route("/{id}/unpublish", post(reviews::unpublish_review))
}
