use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{pages, reviews};
use crate::state::AppState;

/// Page tree routes, nested under `/pages`.
///
/// ```text
/// GET    /                       list_pages
/// GET    /resolve                resolve_page
/// GET    /{id}                   get_page
/// PATCH  /{id}                   update_page
/// DELETE /{id}                   delete_page
/// GET    /{id}/children          list_children
/// POST   /{id}/children          create_child
/// POST   /{id}/move              move_page
/// POST   /{id}/publish           publish_page
/// POST   /{id}/unpublish         unpublish_page
/// GET    /{id}/context           get_context
/// GET    /{id}/structured-data   get_structured_data
/// GET    /{id}/reviews           reviews::list_for_page
/// POST   /{id}/reviews           reviews::create_review
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::list_pages))
        .route("/resolve", get(pages::resolve_page))
        .route(
            "/{id}",
            get(pages::get_page)
                .patch(pages::update_page)
                .delete(pages::delete_page),
        )
        .route(
            "/{id}/children",
            get(pages::list_children).post(pages::create_child),
        )
        .route("/{id}/move", post(pages::move_page))
        .route("/{id}/publish", post(pages::publish_page))
        .route("/{id}/unpublish", post(pages::unpublish_page))
        .route("/{id}/context", get(pages::get_context))
        .route("/{id}/structured-data", get(pages::get_structured_data))
        .route(
            "/{id}/reviews",
            get(reviews::list_for_page).post(reviews::create_review),
        )
}
