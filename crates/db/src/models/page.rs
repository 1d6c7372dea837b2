use sqlx::FromRow;
use yurist_core::error::CoreError;
use yurist_core::pages::{Page, PageContent};
use yurist_core::types::{DbId, Timestamp};

/// A row from the `pages` table.
#[derive(Debug, Clone, FromRow)]
pub struct PageRow {
    pub id: DbId,
    pub kind: String,
    pub path: String,
    pub depth: i32,
    pub slug: String,
    pub title: String,
    pub live: bool,
    pub public: bool,
    pub show_in_menus: bool,
    pub seo_title: Option<String>,
    pub search_description: Option<String>,
    pub fields: serde_json::Value,
    pub first_published_at: Option<Timestamp>,
    pub last_published_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<PageRow> for Page {
    type Error = CoreError;

    fn try_from(row: PageRow) -> Result<Self, Self::Error> {
        Ok(Page {
            content: PageContent::from_parts(&row.kind, row.fields)?,
            id: row.id,
            path: row.path,
            depth: row.depth,
            slug: row.slug,
            title: row.title,
            live: row.live,
            public: row.public,
            show_in_menus: row.show_in_menus,
            seo_title: row.seo_title,
            search_description: row.search_description,
            first_published_at: row.first_published_at,
            last_published_at: row.last_published_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
