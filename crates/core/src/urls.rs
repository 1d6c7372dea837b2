//! Page URL paths and path resolution.
//!
//! The page bound to the site is served at `/`. Pages below it are addressed
//! by the slugs between the site root and the page, e.g. `/yalta/divorce/`.
//! Pages outside the site root (such as a practice gallery placed directly
//! under the tree root) are addressed by their slugs below the tree root.

use crate::pages::Page;
use crate::tree::PageTree;
use crate::types::DbId;

/// The page served at `/`: the site's root page if bound, else the home page.
pub fn site_root(tree: &PageTree, bound_root: Option<DbId>) -> Option<&Page> {
    bound_root
        .and_then(|id| tree.get(id))
        .or_else(|| tree.first_of_kind(crate::page_types::PageKind::HomePage))
}

/// Path of a page relative to the host, with leading and trailing slash.
///
/// Returns `None` for the tree root, which is never served.
pub fn page_path(tree: &PageTree, id: DbId, site_root: Option<DbId>) -> Option<String> {
    let page = tree.get(id)?;
    if page.depth <= 1 {
        return None;
    }
    if Some(id) == site_root {
        return Some("/".to_string());
    }

    let ancestors = tree.ancestors(id);
    let below = match ancestors.iter().position(|a| Some(a.id) == site_root) {
        Some(index) => &ancestors[index + 1..],
        None => ancestors.get(1..).unwrap_or_default(),
    };
    let segments: Vec<&str> = below
        .iter()
        .map(|p| p.slug.as_str())
        .chain(std::iter::once(page.slug.as_str()))
        .collect();
    Some(format!("/{}/", segments.join("/")))
}

/// Join a base URL and a page path.
pub fn absolute_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Find the page served at `path`.
///
/// Slugs are matched from the site root first, then from the tree root.
pub fn resolve_path<'t>(tree: &'t PageTree, site_root: Option<DbId>, path: &str) -> Option<&'t Page> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return site_root.and_then(|id| tree.get(id));
    }
    let walk = |start: DbId| {
        segments.iter().try_fold(start, |current, slug| {
            tree.children(current)
                .into_iter()
                .find(|child| child.slug == *slug)
                .map(|child| child.id)
        })
    };
    site_root
        .and_then(walk)
        .or_else(|| tree.root().and_then(|root| walk(root.id)))
        .and_then(|id| tree.get(id))
}
