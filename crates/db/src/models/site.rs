use sqlx::FromRow;
use yurist_core::site::Site;
use yurist_core::types::DbId;

/// A row from the `sites` table.
#[derive(Debug, Clone, FromRow)]
pub struct SiteRow {
    pub id: DbId,
    pub hostname: String,
    pub port: i32,
    pub site_name: String,
    pub root_page_id: DbId,
    pub is_default_site: bool,
}

impl From<SiteRow> for Site {
    fn from(row: SiteRow) -> Self {
        Site {
            id: row.id,
            hostname: row.hostname,
            port: row.port,
            site_name: row.site_name,
            root_page_id: row.root_page_id,
            is_default_site: row.is_default_site,
        }
    }
}
