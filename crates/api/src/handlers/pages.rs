//! Handlers for the page tree: reads, placement-checked mutations, render
//! context and structured metadata.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use yurist_core::context::{build_context, PageContext};
use yurist_core::error::CoreError;
use yurist_core::page_types::PageKind;
use yurist_core::pages::{NewPage, Page, PageUpdate};
use yurist_core::structured_data::{to_structured_metadata, Canonical};
use yurist_core::types::DbId;
use yurist_core::urls;
use yurist_db::repositories::PageRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::SiteLinks;
use crate::response::DataResponse;
use crate::state::AppState;

/* --------------------------------------------------------------------------
Request and response types
-------------------------------------------------------------------------- */

#[derive(Debug, Deserialize)]
pub struct ListPagesParams {
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub new_parent_id: DbId,
}

/// A page with its URL path relative to the host.
#[derive(Debug, Serialize)]
pub struct PageWithUrl<'a> {
    #[serde(flatten)]
    pub page: &'a Page,
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContextResponse<'t> {
    pub page: &'t Page,
    pub context: PageContext<'t>,
}

/* --------------------------------------------------------------------------
Helpers
-------------------------------------------------------------------------- */

fn parse_kind(raw: &str) -> AppResult<PageKind> {
    PageKind::from_str(raw).ok_or_else(|| AppError::BadRequest(format!("Unknown page kind '{raw}'")))
}

/* --------------------------------------------------------------------------
Reads
-------------------------------------------------------------------------- */

/// GET /pages
///
/// All pages in tree order, optionally filtered by `?kind=`.
pub async fn list_pages(
    State(state): State<AppState>,
    Query(params): Query<ListPagesParams>,
) -> AppResult<impl IntoResponse> {
    let kind = params.kind.as_deref().map(parse_kind).transpose()?;
    let pages = PageRepo::list(&state.pool, kind).await?;
    Ok(Json(DataResponse { data: pages }))
}

/// GET /pages/{id}
pub async fn get_page(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let page = PageRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "page", id })?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /pages/{id}/children
pub async fn list_children(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let tree = PageRepo::snapshot(&state.pool).await?;
    tree.page(id)?;
    let children: Vec<Page> = tree.children(id).into_iter().cloned().collect();
    Ok(Json(DataResponse { data: children }))
}

/// GET /pages/resolve?path=/yalta/divorce/
///
/// Find the page served at a URL path.
pub async fn resolve_page(
    State(state): State<AppState>,
    Query(params): Query<ResolveParams>,
) -> AppResult<impl IntoResponse> {
    let tree = PageRepo::snapshot(&state.pool).await?;
    let links = SiteLinks::load(&state).await?;
    let root = links.root_page(&tree);

    let page = urls::resolve_path(&tree, root, &params.path)
        .ok_or_else(|| CoreError::SlugNotFound(params.path.clone()))?;
    let data = PageWithUrl {
        page,
        url: urls::page_path(&tree, page.id, root),
    };
    Ok(Json(DataResponse { data }).into_response())
}

/// GET /pages/{id}/context
///
/// The page plus the related records it renders with.
pub async fn get_context(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let tree = PageRepo::snapshot(&state.pool).await?;
    let data = ContextResponse {
        page: tree.page(id)?,
        context: build_context(&tree, id)?,
    };
    Ok(Json(DataResponse { data }).into_response())
}

/// GET /pages/{id}/structured-data
///
/// JSON-LD document for the page; `data` is `null` for kinds without one.
pub async fn get_structured_data(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let tree = PageRepo::snapshot(&state.pool).await?;
    let links = SiteLinks::load(&state).await?;
    let canonical = Canonical {
        base_url: &links.base_url,
        site_root: links.root_page(&tree),
    };
    let document = to_structured_metadata(&tree, id, canonical)?;
    Ok(Json(DataResponse { data: document }))
}

/* --------------------------------------------------------------------------
Mutations
-------------------------------------------------------------------------- */

/// POST /pages/{id}/children
///
/// Create a page as the last child of `{id}`.
pub async fn create_child(
    State(state): State<AppState>,
    Path(parent_id): Path<DbId>,
    Json(input): Json<NewPage>,
) -> AppResult<impl IntoResponse> {
    let page = PageRepo::create_child(&state.pool, parent_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: page })))
}

/// PATCH /pages/{id}
pub async fn update_page(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<PageUpdate>,
) -> AppResult<impl IntoResponse> {
    let page = PageRepo::update(&state.pool, id, input).await?;
    Ok(Json(DataResponse { data: page }))
}

/// POST /pages/{id}/move
///
/// Move the page and its subtree under a new parent. Returns the new path
/// and depth of every page that moved.
pub async fn move_page(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<MoveRequest>,
) -> AppResult<impl IntoResponse> {
    let updates = PageRepo::move_page(&state.pool, id, input.new_parent_id).await?;
    Ok(Json(DataResponse { data: updates }))
}

/// POST /pages/{id}/publish
pub async fn publish_page(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let page = PageRepo::set_live(&state.pool, id, true).await?;
    Ok(Json(DataResponse { data: page }))
}

/// POST /pages/{id}/unpublish
pub async fn unpublish_page(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let page = PageRepo::set_live(&state.pool, id, false).await?;
    Ok(Json(DataResponse { data: page }))
}

/// DELETE /pages/{id}
///
/// Delete the page, its subtree and every review they own.
pub async fn delete_page(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = PageRepo::delete(&state.pool, id).await?;
    Ok(Json(DataResponse { data: deleted }))
}
