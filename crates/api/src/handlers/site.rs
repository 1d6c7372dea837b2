//! Site-wide documents: sitemap, robots, menu, the page-type registry and
//! search-index feed.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;

use yurist_core::{menu, page_types, robots, search, sitemap};
use yurist_db::repositories::PageRepo;

use crate::error::AppResult;
use crate::handlers::SiteLinks;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /sitemap.xml
pub async fn sitemap_xml(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let tree = PageRepo::snapshot(&state.pool).await?;
    let links = SiteLinks::load(&state).await?;
    let entries = sitemap::entries(&tree, links.root_page(&tree), &links.base_url);
    Ok((
        [(header::CONTENT_TYPE, "application/xml")],
        sitemap::render(&entries),
    ))
}

/// GET /robots.txt
pub async fn robots_txt(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let links = SiteLinks::load(&state).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        robots::render(&links.base_url),
    ))
}

/// GET /api/v1/menu
pub async fn get_menu(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let tree = PageRepo::snapshot(&state.pool).await?;
    let links = SiteLinks::load(&state).await?;
    let items = menu::nested_menu(&tree, links.root_page(&tree));
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/page-types
pub async fn list_page_types() -> impl IntoResponse {
    Json(DataResponse {
        data: page_types::registry(),
    })
}

/// GET /api/v1/search/documents
///
/// One document per live, public page, for the external search indexer.
pub async fn search_documents(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let tree = PageRepo::snapshot(&state.pool).await?;
    Ok(Json(DataResponse {
        data: search::index_documents(&tree),
    }))
}
