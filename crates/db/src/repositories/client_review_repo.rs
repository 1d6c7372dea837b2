//! Repository for the `client_reviews` table.

use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use yurist_core::error::CoreError;
use yurist_core::reviews::{ClientReview, NewClientReview};
use yurist_core::types::DbId;

use crate::error::DbResult;
use crate::models::client_review::ClientReviewRow;
use crate::repositories::PageRepo;

/// Column list for client_reviews queries.
const COLUMNS: &str = "id, page_id, client_name, client_initials, review_title, body, \
    rating, case_type, is_published, created_at";

/// Provides CRUD operations for client reviews.
pub struct ClientReviewRepo;

impl ClientReviewRepo {
    /// Attach a review to a legal-practice page.
    pub async fn create(
        pool: &PgPool,
        page_id: DbId,
        input: &NewClientReview,
    ) -> DbResult<ClientReview> {
        let mut tx = pool.begin().await?;
        PageRepo::lock(&mut tx).await?;
        let tree = PageRepo::load_tree(&mut *tx).await?;
        tree.check_review_owner(page_id)?;
        let initials = input.checked_initials()?;

        let query = format!(
            "INSERT INTO client_reviews
                (page_id, client_name, client_initials, review_title, body,
                 rating, case_type, is_published, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, ClientReviewRow>(&query)
            .bind(page_id)
            .bind(&input.client_name)
            .bind(&initials)
            .bind(&input.review_title)
            .bind(&input.body)
            .bind(input.rating)
            .bind(&input.case_type)
            .bind(input.is_published)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(review_id = row.id, page_id, rating = row.rating, "Client review created");
        Ok(row.into())
    }

    /// Find a review by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ClientReview>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM client_reviews WHERE id = $1");
        let row = sqlx::query_as::<_, ClientReviewRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// Every review owned by a page, most recent first.
    pub async fn list_for_page(
        pool: &PgPool,
        page_id: DbId,
    ) -> Result<Vec<ClientReview>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM client_reviews
             WHERE page_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, ClientReviewRow>(&query)
            .bind(page_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Published reviews across the site, most recent first.
    pub async fn list_published(pool: &PgPool, limit: i64) -> Result<Vec<ClientReview>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM client_reviews
             WHERE is_published
             ORDER BY created_at DESC, id DESC
             LIMIT $1"
        );
        let rows = sqlx::query_as::<_, ClientReviewRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Load every review, for building a tree snapshot.
    pub async fn load_all(conn: &mut PgConnection) -> Result<Vec<ClientReview>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM client_reviews ORDER BY id");
        let rows = sqlx::query_as::<_, ClientReviewRow>(&query)
            .fetch_all(conn)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Publish or hide a review.
    pub async fn set_published(pool: &PgPool, id: DbId, published: bool) -> DbResult<ClientReview> {
        let query = format!(
            "UPDATE client_reviews SET is_published = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, ClientReviewRow>(&query)
            .bind(id)
            .bind(published)
            .fetch_optional(pool)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "client_review",
                id,
            })?;
        Ok(row.into())
    }

    /// Delete a review. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM client_reviews WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
