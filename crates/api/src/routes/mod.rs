pub mod health;
pub mod pages;
pub mod reviews;
pub mod site;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /pages                                 list (?kind=)
/// /pages/resolve                         page served at ?path=
/// /pages/{id}                            get, update (PATCH), delete
/// /pages/{id}/children                   list, create child (POST)
/// /pages/{id}/move                       move subtree (POST)
/// /pages/{id}/publish                    publish (POST)
/// /pages/{id}/unpublish                  unpublish (POST)
/// /pages/{id}/context                    render context
/// /pages/{id}/structured-data            JSON-LD document
/// /pages/{id}/reviews                    list with average, create (POST)
///
/// /reviews/published                     published reviews (?limit=)
/// /reviews/{id}                          delete
/// /reviews/{id}/publish                  publish (POST)
/// /reviews/{id}/unpublish                unpublish (POST)
///
/// /menu                                  nested navigation menu
/// /page-types                            page kind registry
/// /search/documents                      search-index feed
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/pages", pages::router())
        .nest("/reviews", reviews::router())
        .merge(site::api_router())
}
