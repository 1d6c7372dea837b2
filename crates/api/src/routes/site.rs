use axum::routing::get;
use axum::Router;

use crate::handlers::site;
use crate::state::AppState;

/// Crawler documents served at the host root.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/sitemap.xml", get(site::sitemap_xml))
        .route("/robots.txt", get(site::robots_txt))
}

/// Site-wide API reads, merged into `/api/v1`.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/menu", get(site::get_menu))
        .route("/page-types", get(site::list_page_types))
        .route("/search/documents", get(site::search_documents))
}
