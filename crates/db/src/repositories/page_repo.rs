//! Repository for the `pages` table.
//!
//! Reads return core [`Page`] values. Mutations lock the table, load the
//! whole tree, and let [`PageTree`] validate and plan before anything is
//! written, so a rejected change never reaches the database.

use chrono::Utc;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use yurist_core::error::CoreError;
use yurist_core::page_types::PageKind;
use yurist_core::pages::{NewPage, Page, PageUpdate};
use yurist_core::tree::{DeletedSubtree, PageTree, PathUpdate, Placement};
use yurist_core::tree_path;
use yurist_core::types::{DbId, Timestamp};

use crate::error::DbResult;
use crate::models::page::PageRow;
use crate::repositories::ClientReviewRepo;

/// Column list for pages queries.
const COLUMNS: &str = "id, kind, path, depth, slug, title, live, public, show_in_menus, \
    seo_title, search_description, fields, first_published_at, last_published_at, \
    created_at, updated_at";

fn into_pages(rows: Vec<PageRow>) -> Result<Vec<Page>, CoreError> {
    rows.into_iter().map(Page::try_from).collect()
}

/// Provides tree reads and transactional tree mutations.
pub struct PageRepo;

impl PageRepo {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Find a page by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> DbResult<Option<Page>> {
        let query = format!("SELECT {COLUMNS} FROM pages WHERE id = $1");
        let row = sqlx::query_as::<_, PageRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Page::try_from).transpose()?)
    }

    /// List pages in tree order, optionally only those of one kind.
    pub async fn list(pool: &PgPool, kind: Option<PageKind>) -> DbResult<Vec<Page>> {
        let query = format!(
            "SELECT {COLUMNS} FROM pages
             WHERE ($1::TEXT IS NULL OR kind = $1)
             ORDER BY path"
        );
        let rows = sqlx::query_as::<_, PageRow>(&query)
            .bind(kind.map(|k| k.as_str()))
            .fetch_all(pool)
            .await?;
        Ok(into_pages(rows)?)
    }

    /// Load a read-committed snapshot of the whole tree, reviews included.
    pub async fn snapshot(pool: &PgPool) -> DbResult<PageTree> {
        let mut conn = pool.acquire().await?;
        Self::load_tree(&mut *conn).await
    }

    /// Load every page and review over an existing connection.
    pub async fn load_tree(conn: &mut PgConnection) -> DbResult<PageTree> {
        let query = format!("SELECT {COLUMNS} FROM pages ORDER BY path");
        let rows = sqlx::query_as::<_, PageRow>(&query)
            .fetch_all(&mut *conn)
            .await?;
        let reviews = ClientReviewRepo::load_all(&mut *conn).await?;
        Ok(PageTree::from_parts(into_pages(rows)?, reviews)?)
    }

    /// Serialize tree mutations: readers proceed, other writers wait.
    pub async fn lock(tx: &mut Transaction<'_, Postgres>) -> Result<(), sqlx::Error> {
        sqlx::query("LOCK TABLE pages IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Begin a transaction, lock the tree, and load it.
    async fn begin_locked(pool: &PgPool) -> DbResult<(Transaction<'static, Postgres>, PageTree)> {
        let mut tx = pool.begin().await?;
        Self::lock(&mut tx).await?;
        let tree = Self::load_tree(&mut *tx).await?;
        Ok((tx, tree))
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create a page as the last child of `parent_id`.
    pub async fn create_child(pool: &PgPool, parent_id: DbId, input: &NewPage) -> DbResult<Page> {
        let (mut tx, tree) = Self::begin_locked(pool).await?;
        let placement = tree.plan_child(parent_id, input)?;
        let page = Self::insert_planned(&mut tx, &placement, input, Utc::now()).await?;
        tx.commit().await?;

        tracing::info!(page_id = page.id, parent_id, kind = %page.kind(), path = %page.path, "Page created");
        Ok(page)
    }

    /// Move a page and its subtree under `new_parent_id`.
    pub async fn move_page(
        pool: &PgPool,
        id: DbId,
        new_parent_id: DbId,
    ) -> DbResult<Vec<PathUpdate>> {
        let (mut tx, tree) = Self::begin_locked(pool).await?;
        let updates = tree.plan_move(id, new_parent_id)?;
        Self::apply_path_updates(&mut tx, &updates, Utc::now()).await?;
        tx.commit().await?;

        tracing::info!(page_id = id, new_parent_id, moved = updates.len(), "Subtree moved");
        Ok(updates)
    }

    /// Publish or unpublish a page.
    pub async fn set_live(pool: &PgPool, id: DbId, live: bool) -> DbResult<Page> {
        let (mut tx, mut tree) = Self::begin_locked(pool).await?;
        let page = tree.set_live(id, live, Utc::now())?;
        let page = Self::write_state(&mut tx, page).await?;
        tx.commit().await?;

        tracing::info!(page_id = id, live, "Page publication changed");
        Ok(page)
    }

    /// Apply a partial update to a page's editable fields.
    pub async fn update(pool: &PgPool, id: DbId, update: PageUpdate) -> DbResult<Page> {
        let (mut tx, mut tree) = Self::begin_locked(pool).await?;
        let page = tree.update_page(id, update, Utc::now())?;
        let page = Self::write_state(&mut tx, page).await?;
        tx.commit().await?;

        tracing::info!(page_id = id, "Page updated");
        Ok(page)
    }

    /// Delete a page and its subtree. Reviews go with them via the
    /// foreign-key cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> DbResult<DeletedSubtree> {
        let (mut tx, mut tree) = Self::begin_locked(pool).await?;
        let deleted = tree.delete_page(id)?;
        sqlx::query("DELETE FROM pages WHERE id = ANY($1)")
            .bind(&deleted.pages)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(
            page_id = id,
            pages = deleted.pages.len(),
            reviews = deleted.reviews.len(),
            "Subtree deleted"
        );
        Ok(deleted)
    }

    // -----------------------------------------------------------------------
    // Writes within an existing transaction
    // -----------------------------------------------------------------------

    /// Insert the depth-1 root page.
    pub async fn insert_root(
        tx: &mut Transaction<'_, Postgres>,
        title: &str,
        now: Timestamp,
    ) -> DbResult<Page> {
        let query = format!(
            "INSERT INTO pages (kind, path, depth, slug, title, live, created_at, updated_at)
             VALUES ($1, $2, 1, 'root', $3, true, $4, $4)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, PageRow>(&query)
            .bind(PageKind::Root.as_str())
            .bind(tree_path::root_path())
            .bind(title)
            .bind(now)
            .fetch_one(&mut **tx)
            .await?;
        Ok(Page::try_from(row)?)
    }

    /// Insert a page at a position already planned by [`PageTree::plan_child`].
    pub async fn insert_planned(
        tx: &mut Transaction<'_, Postgres>,
        placement: &Placement,
        input: &NewPage,
        now: Timestamp,
    ) -> DbResult<Page> {
        let published_at = input.live.then_some(now);
        let query = format!(
            "INSERT INTO pages
                (kind, path, depth, slug, title, live, public, show_in_menus,
                 seo_title, search_description, fields,
                 first_published_at, last_published_at, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12, $13, $13)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, PageRow>(&query)
            .bind(input.content.kind().as_str())
            .bind(&placement.path)
            .bind(placement.depth)
            .bind(&placement.slug)
            .bind(&input.title)
            .bind(input.live)
            .bind(input.public)
            .bind(input.show_in_menus)
            .bind(&input.seo_title)
            .bind(&input.search_description)
            .bind(input.content.fields_json())
            .bind(published_at)
            .bind(now)
            .fetch_one(&mut **tx)
            .await?;
        Ok(Page::try_from(row)?)
    }

    /// Write new paths and depths for a planned move.
    pub async fn apply_path_updates(
        tx: &mut Transaction<'_, Postgres>,
        updates: &[PathUpdate],
        now: Timestamp,
    ) -> Result<(), sqlx::Error> {
        for update in updates {
            sqlx::query("UPDATE pages SET path = $2, depth = $3, updated_at = $4 WHERE id = $1")
                .bind(update.id)
                .bind(&update.path)
                .bind(update.depth)
                .bind(now)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }

    /// Persist a page's flags, payload and timestamps as computed in memory.
    async fn write_state(tx: &mut Transaction<'_, Postgres>, page: &Page) -> DbResult<Page> {
        let query = format!(
            "UPDATE pages SET
                title = $2, live = $3, public = $4, show_in_menus = $5,
                seo_title = $6, search_description = $7, fields = $8,
                first_published_at = $9, last_published_at = $10, updated_at = $11
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, PageRow>(&query)
            .bind(page.id)
            .bind(&page.title)
            .bind(page.live)
            .bind(page.public)
            .bind(page.show_in_menus)
            .bind(&page.seo_title)
            .bind(&page.search_description)
            .bind(page.content.fields_json())
            .bind(page.first_published_at)
            .bind(page.last_published_at)
            .bind(page.updated_at)
            .fetch_one(&mut **tx)
            .await?;
        Ok(Page::try_from(row)?)
    }
}
