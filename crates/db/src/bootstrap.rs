//! Start-up content bootstrap against the database.
//!
//! Runs the same plan as [`yurist_core::bootstrap`] inside one transaction,
//! with `pages` and `sites` locked so concurrent starts cannot both create
//! the home page or the default site.

use chrono::Utc;
use sqlx::PgPool;
use yurist_core::bootstrap::{self, BootstrapReport, Step, ROOT_TITLE};
use yurist_core::site::{default_site, SiteSettings};

use crate::error::DbResult;
use crate::repositories::{PageRepo, SiteRepo};

/// Ensure the root page, the home page and a default site exist.
pub async fn run(pool: &PgPool, settings: &SiteSettings) -> DbResult<BootstrapReport> {
    let mut tx = pool.begin().await?;
    PageRepo::lock(&mut tx).await?;
    sqlx::query("LOCK TABLE sites IN SHARE ROW EXCLUSIVE MODE")
        .execute(&mut *tx)
        .await?;

    let mut tree = PageRepo::load_tree(&mut *tx).await?;
    let sites = SiteRepo::list(&mut *tx).await?;
    let plan = bootstrap::plan(&tree, &sites);
    let now = Utc::now();

    let root_id = match plan.root {
        Step::Existing(id) => {
            tracing::debug!(page_id = id, "Root page already exists");
            id
        }
        Step::Create => {
            let root = PageRepo::insert_root(&mut tx, ROOT_TITLE, now).await?;
            tracing::info!(page_id = root.id, "Root page created");
            // Reload so the home page can be planned under the new root.
            tree = PageRepo::load_tree(&mut *tx).await?;
            root.id
        }
    };

    let home_id = match plan.home {
        Step::Existing(id) => {
            tracing::debug!(page_id = id, "Home page already exists");
            id
        }
        Step::Create => {
            let input = bootstrap::home_page();
            let placement = tree.plan_child(root_id, &input)?;
            let home = PageRepo::insert_planned(&mut tx, &placement, &input, now).await?;
            tracing::info!(page_id = home.id, "Home page created");
            home.id
        }
    };

    let site_id = if plan.create_site {
        let site = SiteRepo::create(&mut *tx, &settings.new_site(home_id)).await?;
        tracing::info!(site_id = site.id, hostname = %site.hostname, "Default site created");
        Some(site.id)
    } else {
        tracing::debug!(sites = sites.len(), "Site already exists");
        default_site(&sites).map(|s| s.id)
    };

    tx.commit().await?;

    Ok(BootstrapReport {
        root_id,
        home_id,
        site_id,
        root_created: plan.root == Step::Create,
        home_created: plan.home == Step::Create,
        site_created: plan.create_site,
    })
}
