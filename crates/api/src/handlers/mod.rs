pub mod fallback;
pub mod pages;
pub mod reviews;
pub mod site;

use yurist_core::site::Site;
use yurist_core::tree::PageTree;
use yurist_core::types::DbId;
use yurist_core::urls;
use yurist_db::repositories::SiteRepo;

use crate::error::AppResult;
use crate::state::AppState;

/// The default site binding and the base URL for absolute links.
pub(crate) struct SiteLinks {
    pub site: Option<Site>,
    pub base_url: String,
}

impl SiteLinks {
    pub async fn load(state: &AppState) -> AppResult<Self> {
        let site = SiteRepo::find_default(&state.pool).await?;
        let base_url = state.config.site.base_url(site.as_ref());
        Ok(Self { site, base_url })
    }

    /// The page served at `/`: the bound root page, else the home page.
    pub fn root_page(&self, tree: &PageTree) -> Option<DbId> {
        let bound = self.site.as_ref().map(|s| s.root_page_id);
        urls::site_root(tree, bound).map(|p| p.id)
    }
}
