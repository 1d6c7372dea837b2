use sqlx::FromRow;
use yurist_core::reviews::ClientReview;
use yurist_core::types::{DbId, Timestamp};

/// A row from the `client_reviews` table.
#[derive(Debug, Clone, FromRow)]
pub struct ClientReviewRow {
    pub id: DbId,
    pub page_id: DbId,
    pub client_name: String,
    pub client_initials: String,
    pub review_title: String,
    pub body: String,
    pub rating: i16,
    pub case_type: String,
    pub is_published: bool,
    pub created_at: Timestamp,
}

impl From<ClientReviewRow> for ClientReview {
    fn from(row: ClientReviewRow) -> Self {
        ClientReview {
            id: row.id,
            page_id: row.page_id,
            client_name: row.client_name,
            client_initials: row.client_initials,
            review_title: row.review_title,
            body: row.body,
            rating: row.rating,
            case_type: row.case_type,
            is_published: row.is_published,
            created_at: row.created_at,
        }
    }
}
