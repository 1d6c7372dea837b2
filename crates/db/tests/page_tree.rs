use assert_matches::assert_matches;
use sqlx::PgPool;
use yurist_core::blocks::{Block, ImageRef};
use yurist_core::error::CoreError;
use yurist_core::pages::{
    CityPageFields, HomePageFields, NewPage, PageContent, PageUpdate, ServicePageFields,
};
use yurist_core::site::SiteSettings;
use yurist_core::types::DbId;
use yurist_db::repositories::{ClientReviewRepo, PageRepo};
use yurist_db::{bootstrap, DbError};

struct Seeded {
    root: DbId,
    home: DbId,
}

async fn seed(pool: &PgPool) -> Seeded {
    let report = bootstrap::run(pool, &SiteSettings::default()).await.unwrap();
    Seeded {
        root: report.root_id,
        home: report.home_id,
    }
}

fn city(name: &str) -> NewPage {
    NewPage::draft(
        name,
        PageContent::CityPage(CityPageFields {
            city_name: name.into(),
            ..Default::default()
        }),
    )
    .published()
}

fn service(title: &str) -> NewPage {
    NewPage::draft(title, PageContent::ServicePage(ServicePageFields::default())).published()
}

async fn paths(pool: &PgPool) -> Vec<(DbId, String, i32)> {
    sqlx::query_as("SELECT id, path, depth FROM pages ORDER BY id")
        .fetch_all(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_child_appends_under_parent(pool: PgPool) {
    let s = seed(&pool).await;
    let yalta = PageRepo::create_child(&pool, s.home, &city("Yalta")).await.unwrap();
    let kerch = PageRepo::create_child(&pool, s.home, &city("Kerch")).await.unwrap();

    assert_eq!(yalta.depth, 3);
    assert_eq!(yalta.slug, "yalta");
    assert!(yalta.path < kerch.path);
    assert!(yalta.first_published_at.is_some());

    let draft = PageRepo::create_child(
        &pool,
        yalta.id,
        &NewPage::draft("Divorce", PageContent::ServicePage(Default::default())),
    )
    .await
    .unwrap();
    assert!(!draft.live);
    assert!(draft.first_published_at.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_home_page_is_rejected(pool: PgPool) {
    let s = seed(&pool).await;
    let err = PageRepo::create_child(
        &pool,
        s.root,
        &NewPage::draft("Home 2", PageContent::HomePage(HomePageFields::default())),
    )
    .await
    .unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::CardinalityExceeded { max: 1, .. }));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_placement_rules_are_enforced(pool: PgPool) {
    let s = seed(&pool).await;
    let yalta = PageRepo::create_child(&pool, s.home, &city("Yalta")).await.unwrap();
    let divorce = PageRepo::create_child(&pool, yalta.id, &service("Divorce"))
        .await
        .unwrap();

    assert_matches!(
        PageRepo::create_child(&pool, divorce.id, &service("Nested")).await,
        Err(DbError::Core(CoreError::InvalidChildType { .. }))
    );
    assert_matches!(
        PageRepo::create_child(&pool, s.root, &city("Kerch")).await,
        Err(DbError::Core(CoreError::InvalidParent { .. }))
    );
    assert_matches!(
        PageRepo::create_child(&pool, yalta.id, &service("Divorce")).await,
        Err(DbError::Core(CoreError::ConstraintViolation(_)))
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_move_rewrites_subtree_paths(pool: PgPool) {
    let s = seed(&pool).await;
    let yalta = PageRepo::create_child(&pool, s.home, &city("Yalta")).await.unwrap();
    let kerch = PageRepo::create_child(&pool, s.home, &city("Kerch")).await.unwrap();
    let divorce = PageRepo::create_child(&pool, yalta.id, &service("Divorce"))
        .await
        .unwrap();

    let updates = PageRepo::move_page(&pool, divorce.id, kerch.id).await.unwrap();
    assert_eq!(updates.len(), 1);

    let moved = PageRepo::find_by_id(&pool, divorce.id).await.unwrap().unwrap();
    assert!(moved.path.starts_with(&kerch.path));
    assert_eq!(moved.depth, 4);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_home_pages_admit_exactly_one(pool: PgPool) {
    let s = seed(&pool).await;
    sqlx::query("DELETE FROM sites").execute(&pool).await.unwrap();
    PageRepo::delete(&pool, s.home).await.unwrap();

    let first = NewPage::draft("Home A", PageContent::HomePage(HomePageFields::default()));
    let second = NewPage::draft("Home B", PageContent::HomePage(HomePageFields::default()));
    let (a, b) = tokio::join!(
        PageRepo::create_child(&pool, s.root, &first),
        PageRepo::create_child(&pool, s.root, &second),
    );

    let (created, rejected) = match (a, b) {
        (Ok(page), Err(err)) | (Err(err), Ok(page)) => (page, err),
        (a, b) => panic!("expected one success and one rejection, got {a:?} and {b:?}"),
    };
    assert_eq!(created.depth, 2);
    assert_matches!(
        rejected,
        DbError::Core(CoreError::CardinalityExceeded { max: 1, .. })
    );

    let homes: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pages WHERE kind = 'home_page'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(homes.0, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_move_rewrites_every_descendant(pool: PgPool) {
    let s = seed(&pool).await;
    let yalta = PageRepo::create_child(&pool, s.home, &city("Yalta")).await.unwrap();
    let kerch = PageRepo::create_child(&pool, s.home, &city("Kerch")).await.unwrap();
    let mut services = Vec::new();
    for title in ["Divorce", "Alimony", "Inheritance"] {
        let page = PageRepo::create_child(&pool, yalta.id, &service(title))
            .await
            .unwrap();
        services.push(page.id);
    }

    // Re-parenting under the same home sends Yalta to the end of the sibling list.
    let updates = PageRepo::move_page(&pool, yalta.id, s.home).await.unwrap();
    assert_eq!(updates.len(), 4);

    let moved = PageRepo::find_by_id(&pool, yalta.id).await.unwrap().unwrap();
    assert_ne!(moved.path, yalta.path);
    assert!(moved.path > kerch.path);
    assert_eq!(moved.depth, 3);

    let mut previous = moved.path.clone();
    for id in services {
        let page = PageRepo::find_by_id(&pool, id).await.unwrap().unwrap();
        assert!(page.path.starts_with(&moved.path), "{} not under {}", page.path, moved.path);
        assert_eq!(page.path.len(), moved.path.len() + 4);
        assert_eq!(page.depth, 4);
        assert!(page.path > previous);
        previous = page.path;
    }
    assert!(PageRepo::snapshot(&pool).await.is_ok());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_partial_path_updates_roll_back(pool: PgPool) {
    let s = seed(&pool).await;
    let yalta = PageRepo::create_child(&pool, s.home, &city("Yalta")).await.unwrap();
    PageRepo::create_child(&pool, s.home, &city("Kerch")).await.unwrap();
    PageRepo::create_child(&pool, yalta.id, &service("Divorce"))
        .await
        .unwrap();
    PageRepo::create_child(&pool, yalta.id, &service("Alimony"))
        .await
        .unwrap();
    let before = paths(&pool).await;

    let updates = PageRepo::snapshot(&pool)
        .await
        .unwrap()
        .plan_move(yalta.id, s.home)
        .unwrap();
    assert_eq!(updates.len(), 3);

    let mut tx = pool.begin().await.unwrap();
    PageRepo::apply_path_updates(&mut tx, &updates[..1], chrono::Utc::now())
        .await
        .unwrap();
    drop(tx);

    assert_eq!(paths(&pool).await, before);
    assert!(PageRepo::snapshot(&pool).await.is_ok());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rejected_move_changes_nothing(pool: PgPool) {
    let s = seed(&pool).await;
    let yalta = PageRepo::create_child(&pool, s.home, &city("Yalta")).await.unwrap();
    let divorce = PageRepo::create_child(&pool, yalta.id, &service("Divorce"))
        .await
        .unwrap();
    let before = paths(&pool).await;

    assert_matches!(
        PageRepo::move_page(&pool, yalta.id, divorce.id).await,
        Err(DbError::Core(CoreError::Validation(_)))
    );
    assert_matches!(
        PageRepo::move_page(&pool, divorce.id, s.home).await,
        Err(DbError::Core(CoreError::InvalidParent { .. }))
    );
    assert_eq!(paths(&pool).await, before);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_publish_stamps_timestamps(pool: PgPool) {
    let s = seed(&pool).await;
    let draft = PageRepo::create_child(&pool, s.home, &NewPage::draft("Yalta", city("Yalta").content))
        .await
        .unwrap();
    assert!(!draft.live);

    let published = PageRepo::set_live(&pool, draft.id, true).await.unwrap();
    assert!(published.live);
    let first = published.first_published_at.unwrap();

    PageRepo::set_live(&pool, draft.id, false).await.unwrap();
    let again = PageRepo::set_live(&pool, draft.id, true).await.unwrap();
    assert_eq!(again.first_published_at, Some(first));
    assert!(again.last_published_at.unwrap() >= first);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stream_field_round_trips_in_order(pool: PgPool) {
    let s = seed(&pool).await;
    let mut fields = CityPageFields::default();
    fields.content.push(Block::Heading("Семейное право".into()));
    fields.content.push(Block::Paragraph("<p>Развод</p>".into()));
    fields.content.push(Block::Image(ImageRef::new(42)));
    fields.content.push(Block::Paragraph("<p>Алименты</p>".into()));

    let page = PageRepo::create_child(
        &pool,
        s.home,
        &NewPage::draft("Yalta", PageContent::CityPage(fields.clone())),
    )
    .await
    .unwrap();

    let stored = PageRepo::find_by_id(&pool, page.id).await.unwrap().unwrap();
    let stored_fields = stored.as_city().unwrap();
    assert_eq!(
        stored_fields.content.kinds(),
        vec!["heading", "paragraph", "image", "paragraph"]
    );
    assert_eq!(stored_fields.content, fields.content);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_keeps_kind(pool: PgPool) {
    let s = seed(&pool).await;
    let yalta = PageRepo::create_child(&pool, s.home, &city("Yalta")).await.unwrap();

    let change_kind = PageUpdate {
        content: Some(PageContent::ServicePage(Default::default())),
        ..Default::default()
    };
    assert_matches!(
        PageRepo::update(&pool, yalta.id, change_kind).await,
        Err(DbError::Core(CoreError::Validation(_)))
    );

    let rename = PageUpdate {
        title: Some("Ялта".into()),
        show_in_menus: Some(true),
        ..Default::default()
    };
    let updated = PageRepo::update(&pool, yalta.id, rename).await.unwrap();
    assert_eq!(updated.title, "Ялта");
    assert!(updated.show_in_menus);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_cascades_to_reviews(pool: PgPool) {
    let s = seed(&pool).await;
    let gallery = PageRepo::create_child(
        &pool,
        s.root,
        &NewPage::draft("Practice", PageContent::PracticeGalleryPage(Default::default())),
    )
    .await
    .unwrap();
    let case = PageRepo::create_child(
        &pool,
        gallery.id,
        &NewPage::draft("Case", PageContent::LegalPracticePage(Default::default())),
    )
    .await
    .unwrap();
    for rating in [5, 4] {
        let input = yurist_core::reviews::NewClientReview {
            client_name: "Анна Петрова".into(),
            client_initials: None,
            review_title: String::new(),
            body: "Спасибо".into(),
            rating,
            case_type: String::new(),
            is_published: true,
        };
        ClientReviewRepo::create(&pool, case.id, &input).await.unwrap();
    }

    let deleted = PageRepo::delete(&pool, gallery.id).await.unwrap();
    assert_eq!(deleted.pages.len(), 2);
    assert_eq!(deleted.reviews.len(), 2);

    let remaining: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM client_reviews")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining.0, 0);
    assert!(PageRepo::find_by_id(&pool, case.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_root_cannot_be_deleted(pool: PgPool) {
    let s = seed(&pool).await;
    assert_matches!(
        PageRepo::delete(&pool, s.root).await,
        Err(DbError::Core(CoreError::Validation(_)))
    );
}
