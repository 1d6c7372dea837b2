//! Initial content: the tree root, the home page and the default site.
//!
//! Bootstrapping is idempotent. Each step looks for an existing record and
//! only creates what is missing, so running it at every start-up is safe.

use serde::Serialize;

use crate::error::CoreError;
use crate::page_types::PageKind;
use crate::pages::{NewPage, PageContent};
use crate::site::{Site, SiteSettings};
use crate::tree::PageTree;
use crate::types::{DbId, Timestamp};

pub const ROOT_TITLE: &str = "Root";
pub const HOME_TITLE: &str = "Home";
pub const HOME_SLUG: &str = "home";

/// Whether a record already exists or has to be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Existing(DbId),
    Create,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapPlan {
    pub root: Step,
    pub home: Step,
    pub create_site: bool,
}

impl BootstrapPlan {
    pub fn is_noop(&self) -> bool {
        !matches!(self.root, Step::Create) && !matches!(self.home, Step::Create) && !self.create_site
    }
}

/// What a bootstrap run found or created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    pub root_id: DbId,
    pub home_id: DbId,
    pub site_id: Option<DbId>,
    pub root_created: bool,
    pub home_created: bool,
    pub site_created: bool,
}

impl BootstrapReport {
    pub fn created_anything(&self) -> bool {
        self.root_created || self.home_created || self.site_created
    }
}

/// The home page: found by its slug, else any existing home page.
pub fn existing_home(tree: &PageTree) -> Option<DbId> {
    tree.find_by_slug(HOME_SLUG)
        .ok()
        .or_else(|| tree.first_of_kind(PageKind::HomePage))
        .map(|p| p.id)
}

pub fn plan(tree: &PageTree, sites: &[Site]) -> BootstrapPlan {
    BootstrapPlan {
        root: tree.root().map_or(Step::Create, |r| Step::Existing(r.id)),
        home: existing_home(tree).map_or(Step::Create, Step::Existing),
        create_site: sites.is_empty(),
    }
}

/// Input for the home page created on an empty tree. It is published.
pub fn home_page() -> NewPage {
    NewPage::draft(HOME_TITLE, PageContent::HomePage(Default::default()))
        .with_slug(HOME_SLUG)
        .published()
}

/// Bootstrap an in-memory tree and site list.
pub fn run(
    tree: &mut PageTree,
    sites: &mut Vec<Site>,
    settings: &SiteSettings,
    now: Timestamp,
) -> Result<BootstrapReport, CoreError> {
    let plan = plan(tree, sites);

    tree.transaction(|tx| {
        let root_id = match plan.root {
            Step::Existing(id) => id,
            Step::Create => {
                let id = tx.insert_root(ROOT_TITLE, now)?;
                tracing::info!(page_id = id, "Root page created");
                id
            }
        };
        let home_id = match plan.home {
            Step::Existing(id) => id,
            Step::Create => {
                let id = tx.add_child(root_id, home_page(), now)?;
                tracing::info!(page_id = id, "Home page created");
                id
            }
        };

        let site_id = if plan.create_site {
            let new_site = settings.new_site(home_id);
            let id = sites.iter().map(|s| s.id).max().unwrap_or(0) + 1;
            sites.push(Site {
                id,
                hostname: new_site.hostname,
                port: new_site.port,
                site_name: new_site.site_name,
                root_page_id: new_site.root_page_id,
                is_default_site: new_site.is_default_site,
            });
            tracing::info!(site_id = id, hostname = %settings.hostname, "Default site created");
            Some(id)
        } else {
            crate::site::default_site(sites).map(|s| s.id)
        };

        Ok(BootstrapReport {
            root_id,
            home_id,
            site_id,
            root_created: plan.root == Step::Create,
            home_created: plan.home == Step::Create,
            site_created: plan.create_site,
        })
    })
}
