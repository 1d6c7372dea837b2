//! Repository for the `sites` table.

use sqlx::{PgConnection, PgPool};
use yurist_core::site::{NewSite, Site};

use crate::models::site::SiteRow;

/// Column list for sites queries.
const COLUMNS: &str = "id, hostname, port, site_name, root_page_id, is_default_site";

/// Provides reads and inserts for site bindings.
pub struct SiteRepo;

impl SiteRepo {
    /// All sites, default first.
    pub async fn list(conn: &mut PgConnection) -> Result<Vec<Site>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sites ORDER BY is_default_site DESC, id");
        let rows = sqlx::query_as::<_, SiteRow>(&query).fetch_all(conn).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// The default site, or the oldest site when none is flagged.
    pub async fn find_default(pool: &PgPool) -> Result<Option<Site>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sites ORDER BY is_default_site DESC, id LIMIT 1"
        );
        let row = sqlx::query_as::<_, SiteRow>(&query)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Into::into))
    }

    pub async fn create(conn: &mut PgConnection, input: &NewSite) -> Result<Site, sqlx::Error> {
        let query = format!(
            "INSERT INTO sites (hostname, port, site_name, root_page_id, is_default_site)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, SiteRow>(&query)
            .bind(&input.hostname)
            .bind(input.port)
            .bind(&input.site_name)
            .bind(input.root_page_id)
            .bind(input.is_default_site)
            .fetch_one(conn)
            .await?;
        Ok(row.into())
    }
}
