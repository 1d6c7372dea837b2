//! Per-kind render context.
//!
//! Rendering a page needs more than its own record: a home page lists its
//! cities, a city lists its services, and so on. [`build_context`] gathers
//! those related records from the tree without modifying anything.

use serde::Serialize;

use crate::error::CoreError;
use crate::page_types::PageKind;
use crate::pages::{CityPageFields, Page};
use crate::reviews::{average_rating, ClientReview};
use crate::tree::PageTree;
use crate::types::DbId;

/// A service's parent city, with its fields already narrowed.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ParentCity<'t> {
    pub page: &'t Page,
    #[serde(skip)]
    pub fields: &'t CityPageFields,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageContext<'t> {
    Home {
        cities: Vec<&'t Page>,
    },
    City {
        services: Vec<&'t Page>,
    },
    Service {
        city: Option<ParentCity<'t>>,
    },
    PracticeGallery {
        cases: Vec<&'t Page>,
    },
    LegalPractice {
        reviews: Vec<&'t ClientReview>,
        average_rating: f64,
    },
    Empty,
}

/// Collect the related records a page renders with.
///
/// Zero matches yield empty lists, never an error.
pub fn build_context(tree: &PageTree, id: DbId) -> Result<PageContext<'_>, CoreError> {
    let page = tree.page(id)?;

    let children_of = |kind: PageKind, require_public: bool| -> Vec<&Page> {
        tree.children(id)
            .into_iter()
            .filter(|p| p.kind() == kind && p.live && (p.public || !require_public))
            .collect()
    };

    let context = match page.kind() {
        PageKind::HomePage => PageContext::Home {
            cities: children_of(PageKind::CityPage, true),
        },
        PageKind::CityPage => PageContext::City {
            services: children_of(PageKind::ServicePage, false),
        },
        PageKind::ServicePage => PageContext::Service {
            city: tree.parent(id).and_then(|parent| {
                parent
                    .as_city()
                    .map(|fields| ParentCity { page: parent, fields })
            }),
        },
        PageKind::PracticeGalleryPage => PageContext::PracticeGallery {
            cases: children_of(PageKind::LegalPracticePage, false),
        },
        PageKind::LegalPracticePage => {
            let reviews = tree.reviews_for(id);
            PageContext::LegalPractice {
                average_rating: average_rating(&reviews),
                reviews,
            }
        }
        PageKind::Root => PageContext::Empty,
    };
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::NewPage;
    use crate::reviews::NewClientReview;
    use crate::tree::fixtures::{city, site};
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    fn ids(pages: &[&Page]) -> Vec<DbId> {
        pages.iter().map(|p| p.id).collect()
    }

    #[test]
    fn home_lists_live_public_cities() {
        let mut s = site();
        let now = Utc::now();
        let mut hidden = NewPage::draft("Kerch", city("Керчь")).published();
        hidden.public = false;
        s.tree.add_child(s.home, hidden, now).unwrap();
        s.tree
            .add_child(s.home, NewPage::draft("Feodosia", city("Феодосия")), now)
            .unwrap();

        let ctx = build_context(&s.tree, s.home).unwrap();
        assert_matches!(ctx, PageContext::Home { cities } => {
            assert_eq!(ids(&cities), vec![s.yalta, s.simferopol]);
        });
    }

    #[test]
    fn city_lists_live_services_only() {
        let s = site();
        let ctx = build_context(&s.tree, s.yalta).unwrap();
        assert_matches!(ctx, PageContext::City { services } => {
            assert_eq!(ids(&services), vec![s.divorce]);
        });
    }

    #[test]
    fn city_without_services_has_empty_list() {
        let s = site();
        let ctx = build_context(&s.tree, s.simferopol).unwrap();
        assert_matches!(ctx, PageContext::City { services } if services.is_empty());
    }

    #[test]
    fn service_resolves_typed_parent_city() {
        let s = site();
        let ctx = build_context(&s.tree, s.divorce).unwrap();
        assert_matches!(ctx, PageContext::Service { city: Some(city) } => {
            assert_eq!(city.page.id, s.yalta);
            assert_eq!(city.fields.city_name, "Ялта");
        });
    }

    #[test]
    fn case_lists_reviews_newest_first_with_average() {
        let mut s = site();
        let now = Utc::now();
        for (rating, age) in [(5, 3), (4, 1), (4, 2)] {
            let input = NewClientReview {
                client_name: "Client".into(),
                client_initials: None,
                review_title: String::new(),
                body: "Thanks".into(),
                rating,
                case_type: String::new(),
                is_published: true,
            };
            s.tree
                .add_review(s.case, input, now - Duration::days(age))
                .unwrap();
        }

        let ctx = build_context(&s.tree, s.case).unwrap();
        assert_matches!(ctx, PageContext::LegalPractice { reviews, average_rating } => {
            let ratings: Vec<_> = reviews.iter().map(|r| r.rating).collect();
            assert_eq!(ratings, vec![4, 4, 5]);
            assert_eq!(average_rating, 4.3);
        });
    }

    #[test]
    fn case_without_reviews_is_not_an_error() {
        let s = site();
        let ctx = build_context(&s.tree, s.case).unwrap();
        assert_matches!(
            ctx,
            PageContext::LegalPractice { reviews, average_rating } if reviews.is_empty() && average_rating == 0.0
        );
    }

    #[test]
    fn gallery_lists_live_cases() {
        let mut s = site();
        s.tree
            .add_child(
                s.gallery,
                NewPage::draft(
                    "Draft case",
                    crate::pages::PageContent::LegalPracticePage(Default::default()),
                ),
                Utc::now(),
            )
            .unwrap();
        let ctx = build_context(&s.tree, s.gallery).unwrap();
        assert_matches!(ctx, PageContext::PracticeGallery { cases } => {
            assert_eq!(ids(&cases), vec![s.case]);
        });
    }

    #[test]
    fn root_has_empty_context_and_missing_page_fails() {
        let s = site();
        assert_matches!(build_context(&s.tree, s.root), Ok(PageContext::Empty));
        assert_matches!(
            build_context(&s.tree, 9_999),
            Err(CoreError::NotFound { .. })
        );
    }
}
