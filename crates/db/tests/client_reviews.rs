use assert_matches::assert_matches;
use sqlx::PgPool;
use yurist_core::error::CoreError;
use yurist_core::pages::{NewPage, PageContent};
use yurist_core::reviews::NewClientReview;
use yurist_core::site::SiteSettings;
use yurist_core::types::DbId;
use yurist_db::repositories::{ClientReviewRepo, PageRepo};
use yurist_db::{bootstrap, DbError};

async fn seed_case(pool: &PgPool) -> DbId {
    let report = bootstrap::run(pool, &SiteSettings::default()).await.unwrap();
    let gallery = PageRepo::create_child(
        pool,
        report.root_id,
        &NewPage::draft("Practice", PageContent::PracticeGalleryPage(Default::default())),
    )
    .await
    .unwrap();
    PageRepo::create_child(
        pool,
        gallery.id,
        &NewPage::draft("Case", PageContent::LegalPracticePage(Default::default())),
    )
    .await
    .unwrap()
    .id
}

fn review(rating: i16, published: bool) -> NewClientReview {
    NewClientReview {
        client_name: "Анна Петрова".into(),
        client_initials: None,
        review_title: "Спасибо".into(),
        body: "<p>Всё отлично</p>".into(),
        rating,
        case_type: "family".into(),
        is_published: published,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_derives_initials(pool: PgPool) {
    let case = seed_case(&pool).await;
    let created = ClientReviewRepo::create(&pool, case, &review(5, false))
        .await
        .unwrap();
    assert_eq!(created.client_initials, "А.П.");
    assert_eq!(created.page_id, case);
    assert!(!created.is_published);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reviews_only_attach_to_cases(pool: PgPool) {
    let report = bootstrap::run(&pool, &SiteSettings::default()).await.unwrap();
    assert_matches!(
        ClientReviewRepo::create(&pool, report.home_id, &review(5, true)).await,
        Err(DbError::Core(CoreError::Validation(_)))
    );
    assert_matches!(
        ClientReviewRepo::create(&pool, 9_999, &review(5, true)).await,
        Err(DbError::Core(CoreError::NotFound { .. }))
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rating_out_of_range_is_rejected(pool: PgPool) {
    let case = seed_case(&pool).await;
    assert_matches!(
        ClientReviewRepo::create(&pool, case, &review(6, true)).await,
        Err(DbError::Core(CoreError::Validation(_)))
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_published_listing_is_newest_first(pool: PgPool) {
    let case = seed_case(&pool).await;
    let first = ClientReviewRepo::create(&pool, case, &review(5, true)).await.unwrap();
    ClientReviewRepo::create(&pool, case, &review(3, false)).await.unwrap();
    let last = ClientReviewRepo::create(&pool, case, &review(4, true)).await.unwrap();

    let published = ClientReviewRepo::list_published(&pool, 10).await.unwrap();
    let ids: Vec<_> = published.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![last.id, first.id]);

    let all = ClientReviewRepo::list_for_page(&pool, case).await.unwrap();
    assert_eq!(all.len(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_publish_toggle_and_delete(pool: PgPool) {
    let case = seed_case(&pool).await;
    let created = ClientReviewRepo::create(&pool, case, &review(5, false)).await.unwrap();

    let published = ClientReviewRepo::set_published(&pool, created.id, true).await.unwrap();
    assert!(published.is_published);

    assert!(ClientReviewRepo::delete(&pool, created.id).await.unwrap());
    assert!(!ClientReviewRepo::delete(&pool, created.id).await.unwrap());
    assert_matches!(
        ClientReviewRepo::set_published(&pool, created.id, true).await,
        Err(DbError::Core(CoreError::NotFound { .. }))
    );
}
