//! In-memory page tree.
//!
//! Pages live in an arena keyed by id, with an ordered path index and a
//! parent → children index. Every mutation either completes or leaves the
//! tree untouched: multi-step changes are staged on copies of the indexes
//! and swapped in only when they are complete, and [`PageTree::transaction`]
//! gives callers the same guarantee across several operations.
//!
//! The database layer loads a snapshot with [`PageTree::from_parts`], plans
//! mutations here, and writes the resulting rows inside one SQL transaction.

use std::collections::BTreeMap;

use serde::Serialize;
use validator::Validate;

use crate::error::CoreError;
use crate::page_types::{validate_containment, validate_placement, PageKind};
use crate::pages::{NewPage, Page, PageContent, PageUpdate};
use crate::reviews::{sort_newest_first, ClientReview, NewClientReview};
use crate::tree_path;
use crate::types::{DbId, Timestamp};

/// Where a new page will be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub path: String,
    pub depth: i32,
    pub slug: String,
}

/// New position of one page after a move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathUpdate {
    pub id: DbId,
    pub path: String,
    pub depth: i32,
}

/// Everything removed by a page deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletedSubtree {
    pub pages: Vec<DbId>,
    pub reviews: Vec<DbId>,
}

#[derive(Debug, Clone, Default)]
pub struct PageTree {
    pages: BTreeMap<DbId, Page>,
    by_path: BTreeMap<String, DbId>,
    children: BTreeMap<DbId, Vec<DbId>>,
    reviews: BTreeMap<DbId, ClientReview>,
    next_page_id: DbId,
    next_review_id: DbId,
}

impl PageTree {
    pub fn new() -> Self {
        Self {
            next_page_id: 1,
            next_review_id: 1,
            ..Default::default()
        }
    }

    /// Build a tree from stored rows, checking structural consistency.
    pub fn from_parts(pages: Vec<Page>, reviews: Vec<ClientReview>) -> Result<Self, CoreError> {
        let mut tree = Self::new();

        for page in pages {
            tree_path::validate_path(&page.path)?;
            if page.depth != tree_path::depth_of(&page.path) {
                return Err(CoreError::ConstraintViolation(format!(
                    "Page {} has depth {} but path '{}'",
                    page.id, page.depth, page.path
                )));
            }
            if tree.by_path.insert(page.path.clone(), page.id).is_some() {
                return Err(CoreError::ConstraintViolation(format!(
                    "Duplicate path '{}'",
                    page.path
                )));
            }
            tree.next_page_id = tree.next_page_id.max(page.id + 1);
            if let Some(existing) = tree.pages.insert(page.id, page) {
                return Err(CoreError::ConstraintViolation(format!(
                    "Duplicate page id {}",
                    existing.id
                )));
            }
        }

        let roots = tree.pages.values().filter(|p| p.depth == 1).count();
        if roots > 1 {
            return Err(CoreError::ConstraintViolation(format!(
                "Expected a single root page, found {roots}"
            )));
        }
        for page in tree.pages.values() {
            if let Some(parent) = tree_path::parent_path(&page.path) {
                if !tree.by_path.contains_key(parent) {
                    return Err(CoreError::ConstraintViolation(format!(
                        "Page {} has no parent at path '{parent}'",
                        page.id
                    )));
                }
            }
        }

        for review in reviews {
            match tree.pages.get(&review.page_id).map(Page::kind) {
                Some(PageKind::LegalPracticePage) => {}
                _ => {
                    return Err(CoreError::ConstraintViolation(format!(
                        "Review {} is not attached to a legal practice page",
                        review.id
                    )))
                }
            }
            tree.next_review_id = tree.next_review_id.max(review.id + 1);
            tree.reviews.insert(review.id, review);
        }

        tree.reindex();
        Ok(tree)
    }

    /// Rebuild the parent → children index from the path index.
    fn reindex(&mut self) {
        self.children.clear();
        for (path, id) in &self.by_path {
            if let Some(parent_id) =
                tree_path::parent_path(path).and_then(|p| self.by_path.get(p))
            {
                self.children.entry(*parent_id).or_default().push(*id);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, id: DbId) -> Option<&Page> {
        self.pages.get(&id)
    }

    pub fn page(&self, id: DbId) -> Result<&Page, CoreError> {
        self.pages
            .get(&id)
            .ok_or(CoreError::NotFound { entity: "page", id })
    }

    pub fn root(&self) -> Option<&Page> {
        self.by_path
            .values()
            .next()
            .and_then(|id| self.pages.get(id))
            .filter(|p| p.depth == 1)
    }

    /// All pages in tree (path) order.
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.by_path.values().filter_map(|id| self.pages.get(id))
    }

    pub fn children(&self, id: DbId) -> Vec<&Page> {
        self.children
            .get(&id)
            .map(|ids| ids.iter().filter_map(|c| self.pages.get(c)).collect())
            .unwrap_or_default()
    }

    pub fn parent(&self, id: DbId) -> Option<&Page> {
        let page = self.pages.get(&id)?;
        let parent_path = tree_path::parent_path(&page.path)?;
        self.by_path
            .get(parent_path)
            .and_then(|pid| self.pages.get(pid))
    }

    /// Ancestors from the root down, excluding the page itself.
    pub fn ancestors(&self, id: DbId) -> Vec<&Page> {
        let mut chain = Vec::new();
        let mut current = self.parent(id);
        while let Some(page) = current {
            chain.push(page);
            current = self.parent(page.id);
        }
        chain.reverse();
        chain
    }

    /// Descendants in tree order, excluding the page itself.
    pub fn descendants(&self, id: DbId) -> Vec<&Page> {
        let Some(page) = self.pages.get(&id) else {
            return Vec::new();
        };
        self.by_path
            .range::<str, _>((
                std::ops::Bound::Excluded(page.path.as_str()),
                std::ops::Bound::Unbounded,
            ))
            .take_while(|(path, _)| tree_path::is_descendant(path, &page.path))
            .filter_map(|(_, pid)| self.pages.get(pid))
            .collect()
    }

    /// Other children of the same parent, in order.
    pub fn siblings(&self, id: DbId) -> Vec<&Page> {
        match self.parent(id) {
            Some(parent) => self
                .children(parent.id)
                .into_iter()
                .filter(|p| p.id != id)
                .collect(),
            None => Vec::new(),
        }
    }

    /// First page (in tree order) with the given slug.
    pub fn find_by_slug(&self, slug: &str) -> Result<&Page, CoreError> {
        self.pages()
            .find(|p| p.slug == slug)
            .ok_or_else(|| CoreError::SlugNotFound(slug.to_string()))
    }

    pub fn first_of_kind(&self, kind: PageKind) -> Option<&Page> {
        self.pages().find(|p| p.kind() == kind)
    }

    pub fn count_kind(&self, kind: PageKind) -> usize {
        self.pages.values().filter(|p| p.kind() == kind).count()
    }

    pub fn review(&self, id: DbId) -> Result<&ClientReview, CoreError> {
        self.reviews.get(&id).ok_or(CoreError::NotFound {
            entity: "client_review",
            id,
        })
    }

    pub fn reviews(&self) -> impl Iterator<Item = &ClientReview> {
        self.reviews.values()
    }

    /// Reviews owned by a page, most recent first.
    pub fn reviews_for(&self, page_id: DbId) -> Vec<&ClientReview> {
        let mut owned: Vec<_> = self
            .reviews
            .values()
            .filter(|r| r.page_id == page_id)
            .collect();
        sort_newest_first(&mut owned);
        owned
    }

    // -----------------------------------------------------------------------
    // Validation helpers
    // -----------------------------------------------------------------------

    /// `cities_gallery` blocks may only reference existing city pages.
    pub fn validate_references(&self, content: &PageContent) -> Result<(), CoreError> {
        let Some(stream) = content.stream() else {
            return Ok(());
        };
        for id in stream.referenced_pages() {
            match self.pages.get(&id).map(Page::kind) {
                Some(PageKind::CityPage) => {}
                Some(other) => {
                    return Err(CoreError::Validation(format!(
                        "cities_gallery may only reference CityPage, page {id} is {other}"
                    )))
                }
                None => return Err(CoreError::NotFound { entity: "page", id }),
            }
        }
        Ok(())
    }

    fn ensure_unique_slug(
        &self,
        parent_id: DbId,
        slug: &str,
        except: Option<DbId>,
    ) -> Result<(), CoreError> {
        let clash = self
            .children(parent_id)
            .into_iter()
            .any(|p| p.slug == slug && Some(p.id) != except);
        if clash {
            return Err(CoreError::ConstraintViolation(format!(
                "Slug '{slug}' is already in use by a sibling page"
            )));
        }
        Ok(())
    }

    fn last_child_path(&self, parent_id: DbId, except: Option<DbId>) -> Option<&str> {
        self.children
            .get(&parent_id)?
            .iter()
            .rev()
            .filter(|id| Some(**id) != except)
            .find_map(|id| self.pages.get(id))
            .map(|p| p.path.as_str())
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Run several mutations as one unit: on error the tree is unchanged.
    pub fn transaction<T>(
        &mut self,
        f: impl FnOnce(&mut PageTree) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let mut staged = self.clone();
        let out = f(&mut staged)?;
        *self = staged;
        Ok(out)
    }

    /// Create the depth-1 root page.
    pub fn insert_root(&mut self, title: &str, now: Timestamp) -> Result<DbId, CoreError> {
        if self.root().is_some() {
            return Err(CoreError::CardinalityExceeded {
                kind: PageKind::Root,
                max: 1,
            });
        }
        let id = self.next_page_id;
        let page = Page {
            id,
            path: tree_path::root_path(),
            depth: 1,
            slug: "root".to_string(),
            title: title.to_string(),
            live: true,
            public: true,
            show_in_menus: false,
            seo_title: None,
            search_description: None,
            content: PageContent::Root,
            first_published_at: None,
            last_published_at: None,
            created_at: now,
            updated_at: now,
        };
        self.by_path.insert(page.path.clone(), id);
        self.pages.insert(id, page);
        self.next_page_id += 1;
        Ok(id)
    }

    /// Validate a new child of `parent_id` and compute its position.
    pub fn plan_child(&self, parent_id: DbId, input: &NewPage) -> Result<Placement, CoreError> {
        let parent = self.page(parent_id)?;
        let kind = input.content.kind();
        validate_placement(kind, parent.kind(), self.count_kind(kind))?;

        let slug = input.checked_slug()?;
        self.validate_references(&input.content)?;
        self.ensure_unique_slug(parent_id, &slug, None)?;

        let path = tree_path::next_child_path(
            &parent.path,
            self.last_child_path(parent_id, None),
        )?;
        Ok(Placement {
            depth: parent.depth + 1,
            path,
            slug,
        })
    }

    /// Create a page as the last child of `parent_id`.
    pub fn add_child(
        &mut self,
        parent_id: DbId,
        input: NewPage,
        now: Timestamp,
    ) -> Result<DbId, CoreError> {
        let placement = self.plan_child(parent_id, &input)?;
        let id = self.next_page_id;
        let published_at = input.live.then_some(now);
        let page = Page {
            id,
            path: placement.path,
            depth: placement.depth,
            slug: placement.slug,
            title: input.title,
            live: input.live,
            public: input.public,
            show_in_menus: input.show_in_menus,
            seo_title: input.seo_title,
            search_description: input.search_description,
            content: input.content,
            first_published_at: published_at,
            last_published_at: published_at,
            created_at: now,
            updated_at: now,
        };
        tracing::debug!(page_id = id, kind = %page.kind(), path = %page.path, "Page created");

        self.by_path.insert(page.path.clone(), id);
        self.pages.insert(id, page);
        self.children.entry(parent_id).or_default().push(id);
        self.next_page_id += 1;
        Ok(id)
    }

    /// Validate moving `id` (and its subtree) under `new_parent_id` and
    /// compute the new path and depth of every page that moves.
    pub fn plan_move(&self, id: DbId, new_parent_id: DbId) -> Result<Vec<PathUpdate>, CoreError> {
        let page = self.page(id)?;
        if page.depth == 1 {
            return Err(CoreError::Validation("The root page cannot be moved".into()));
        }
        let new_parent = self.page(new_parent_id)?;
        if new_parent.id == id || tree_path::is_descendant(&new_parent.path, &page.path) {
            return Err(CoreError::Validation(
                "A page cannot be moved under itself or its descendants".into(),
            ));
        }
        validate_containment(page.kind(), new_parent.kind())?;
        self.ensure_unique_slug(new_parent_id, &page.slug, Some(id))?;

        let old_base = page.path.as_str();
        let new_base = tree_path::next_child_path(
            &new_parent.path,
            self.last_child_path(new_parent_id, Some(id)),
        )?;
        let depth_delta = new_parent.depth + 1 - page.depth;

        let updates = std::iter::once(page)
            .chain(self.descendants(id))
            .map(|p| PathUpdate {
                id: p.id,
                path: tree_path::rebase(&p.path, old_base, &new_base),
                depth: p.depth + depth_delta,
            })
            .collect();
        Ok(updates)
    }

    /// Move a page and its whole subtree under a new parent.
    pub fn move_page(
        &mut self,
        id: DbId,
        new_parent_id: DbId,
        now: Timestamp,
    ) -> Result<Vec<PathUpdate>, CoreError> {
        let updates = self.plan_move(id, new_parent_id)?;
        self.apply_path_updates(&updates, now)?;
        tracing::debug!(page_id = id, new_parent_id, moved = updates.len(), "Subtree moved");
        Ok(updates)
    }

    /// Apply a batch of path updates all-or-nothing.
    pub fn apply_path_updates(
        &mut self,
        updates: &[PathUpdate],
        now: Timestamp,
    ) -> Result<(), CoreError> {
        let mut staged = self.by_path.clone();
        for update in updates {
            let page = self.page(update.id)?;
            staged.remove(&page.path);
        }
        for update in updates {
            if tree_path::depth_of(&update.path) != update.depth {
                return Err(CoreError::ConstraintViolation(format!(
                    "Depth {} does not match path '{}'",
                    update.depth, update.path
                )));
            }
            if staged.insert(update.path.clone(), update.id).is_some() {
                return Err(CoreError::ConstraintViolation(format!(
                    "Path '{}' is already taken",
                    update.path
                )));
            }
        }

        for update in updates {
            if let Some(page) = self.pages.get_mut(&update.id) {
                page.path = update.path.clone();
                page.depth = update.depth;
                page.updated_at = now;
            }
        }
        self.by_path = staged;
        self.reindex();
        Ok(())
    }

    /// Publish or unpublish a page.
    pub fn set_live(&mut self, id: DbId, live: bool, now: Timestamp) -> Result<&Page, CoreError> {
        let page = self
            .pages
            .get_mut(&id)
            .ok_or(CoreError::NotFound { entity: "page", id })?;
        page.live = live;
        page.updated_at = now;
        if live {
            page.first_published_at.get_or_insert(now);
            page.last_published_at = Some(now);
        }
        Ok(page)
    }

    /// Replace a page's kind-specific fields. The kind cannot change.
    pub fn update_content(
        &mut self,
        id: DbId,
        content: PageContent,
        now: Timestamp,
    ) -> Result<&Page, CoreError> {
        let current = self.page(id)?.kind();
        if content.kind() != current {
            return Err(CoreError::Validation(format!(
                "Cannot change page {id} from {current} to {}",
                content.kind()
            )));
        }
        content.validate()?;
        self.validate_references(&content)?;

        let page = self
            .pages
            .get_mut(&id)
            .ok_or(CoreError::NotFound { entity: "page", id })?;
        page.content = content;
        page.updated_at = now;
        Ok(page)
    }

    /// Apply a partial update. Either every field changes or none does.
    pub fn update_page(
        &mut self,
        id: DbId,
        update: PageUpdate,
        now: Timestamp,
    ) -> Result<&Page, CoreError> {
        update
            .validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        if update.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(CoreError::Validation("Title must not be empty".into()));
        }
        self.page(id)?;
        if let Some(content) = update.content {
            self.update_content(id, content, now)?;
        }

        let page = self
            .pages
            .get_mut(&id)
            .ok_or(CoreError::NotFound { entity: "page", id })?;
        if let Some(title) = update.title {
            page.title = title;
        }
        if let Some(public) = update.public {
            page.public = public;
        }
        if let Some(show) = update.show_in_menus {
            page.show_in_menus = show;
        }
        if update.seo_title.is_some() {
            page.seo_title = update.seo_title;
        }
        if update.search_description.is_some() {
            page.search_description = update.search_description;
        }
        page.updated_at = now;
        Ok(page)
    }

    /// Delete a page, its descendants, and every review they own.
    pub fn delete_page(&mut self, id: DbId) -> Result<DeletedSubtree, CoreError> {
        let page = self.page(id)?;
        if page.depth == 1 {
            return Err(CoreError::Validation("The root page cannot be deleted".into()));
        }
        let mut removed: Vec<DbId> = vec![id];
        removed.extend(self.descendants(id).into_iter().map(|p| p.id));

        let review_ids: Vec<DbId> = self
            .reviews
            .values()
            .filter(|r| removed.contains(&r.page_id))
            .map(|r| r.id)
            .collect();

        for review_id in &review_ids {
            self.reviews.remove(review_id);
        }
        for page_id in &removed {
            if let Some(page) = self.pages.remove(page_id) {
                self.by_path.remove(&page.path);
            }
        }
        self.reindex();
        tracing::debug!(
            page_id = id,
            pages = removed.len(),
            reviews = review_ids.len(),
            "Subtree deleted"
        );

        Ok(DeletedSubtree {
            pages: removed,
            reviews: review_ids,
        })
    }

    /// Check that a review may be attached to `page_id`.
    pub fn check_review_owner(&self, page_id: DbId) -> Result<(), CoreError> {
        let page = self.page(page_id)?;
        if page.kind() != PageKind::LegalPracticePage {
            return Err(CoreError::Validation(format!(
                "Reviews can only be attached to LegalPracticePage, page {page_id} is {}",
                page.kind()
            )));
        }
        Ok(())
    }

    pub fn add_review(
        &mut self,
        page_id: DbId,
        input: NewClientReview,
        now: Timestamp,
    ) -> Result<DbId, CoreError> {
        self.check_review_owner(page_id)?;
        let id = self.next_review_id;
        let review = input.into_review(id, page_id, now)?;
        self.reviews.insert(id, review);
        self.next_review_id += 1;
        Ok(id)
    }

    pub fn set_review_published(
        &mut self,
        id: DbId,
        published: bool,
    ) -> Result<&ClientReview, CoreError> {
        let review = self.reviews.get_mut(&id).ok_or(CoreError::NotFound {
            entity: "client_review",
            id,
        })?;
        review.is_published = published;
        Ok(review)
    }

    pub fn delete_review(&mut self, id: DbId) -> Result<ClientReview, CoreError> {
        self.reviews.remove(&id).ok_or(CoreError::NotFound {
            entity: "client_review",
            id,
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! A small site shared by the core test modules.

    use chrono::Utc;

    use super::PageTree;
    use crate::pages::*;
    use crate::types::DbId;

    pub struct SampleSite {
        pub tree: PageTree,
        pub root: DbId,
        pub home: DbId,
        pub yalta: DbId,
        pub simferopol: DbId,
        pub divorce: DbId,
        pub inheritance: DbId,
        pub gallery: DbId,
        pub case: DbId,
    }

    pub fn city(name: &str) -> PageContent {
        PageContent::CityPage(CityPageFields {
            city_name: name.into(),
            ..Default::default()
        })
    }

    pub fn service() -> PageContent {
        PageContent::ServicePage(ServicePageFields::default())
    }

    pub fn site() -> SampleSite {
        let now = Utc::now();
        let mut tree = PageTree::new();
        let root = tree.insert_root("Root", now).unwrap();
        let home = tree
            .add_child(
                root,
                NewPage::draft("Home", PageContent::HomePage(Default::default()))
                    .with_slug("home")
                    .published(),
                now,
            )
            .unwrap();
        let yalta = tree
            .add_child(home, NewPage::draft("Yalta", city("Ялта")).published(), now)
            .unwrap();
        let simferopol = tree
            .add_child(
                home,
                NewPage::draft("Simferopol", city("Симферополь")).published(),
                now,
            )
            .unwrap();
        let divorce = tree
            .add_child(yalta, NewPage::draft("Divorce", service()).published(), now)
            .unwrap();
        let inheritance = tree
            .add_child(yalta, NewPage::draft("Inheritance", service()), now)
            .unwrap();
        let gallery = tree
            .add_child(
                root,
                NewPage::draft(
                    "Practice",
                    PageContent::PracticeGalleryPage(Default::default()),
                )
                .published(),
                now,
            )
            .unwrap();
        let case = tree
            .add_child(
                gallery,
                NewPage::draft(
                    "Case one",
                    PageContent::LegalPracticePage(Default::default()),
                )
                .published(),
                now,
            )
            .unwrap();
        SampleSite {
            tree,
            root,
            home,
            yalta,
            simferopol,
            divorce,
            inheritance,
            gallery,
            case,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{city, service, site};
    use super::*;
    use crate::pages::{HomePageFields, PageUpdate};
    use crate::reviews::NewClientReview;
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn review(rating: i16) -> NewClientReview {
        NewClientReview {
            client_name: "Client Name".into(),
            client_initials: None,
            review_title: String::new(),
            body: "Good".into(),
            rating,
            case_type: String::new(),
            is_published: true,
        }
    }

    fn snapshot(tree: &PageTree) -> Vec<(DbId, String, i32)> {
        tree.pages()
            .map(|p| (p.id, p.path.clone(), p.depth))
            .collect()
    }

    #[test]
    fn children_follow_creation_order() {
        let s = site();
        let ids: Vec<_> = s.tree.children(s.home).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![s.yalta, s.simferopol]);
        assert_eq!(s.tree.page(s.divorce).unwrap().depth, 4);
    }

    #[test]
    fn new_pages_are_unpublished_by_default() {
        let s = site();
        assert!(!s.tree.page(s.inheritance).unwrap().live);
        assert!(s.tree.page(s.inheritance).unwrap().first_published_at.is_none());
        assert!(s.tree.page(s.divorce).unwrap().last_published_at.is_some());
    }

    #[test]
    fn second_home_page_is_rejected() {
        let mut s = site();
        let err = s
            .tree
            .add_child(
                s.root,
                NewPage::draft("Home 2", PageContent::HomePage(HomePageFields::default())),
                Utc::now(),
            )
            .unwrap_err();
        assert_matches!(err, CoreError::CardinalityExceeded { max: 1, .. });
        assert_eq!(s.tree.count_kind(PageKind::HomePage), 1);
    }

    #[test]
    fn leaf_pages_never_acquire_children() {
        let mut s = site();
        for leaf in [s.divorce, s.case] {
            let err = s
                .tree
                .add_child(leaf, NewPage::draft("Child", service()), Utc::now())
                .unwrap_err();
            assert_matches!(err, CoreError::InvalidChildType { .. });
        }
        assert!(s.tree.children(s.divorce).is_empty());
    }

    #[test]
    fn city_under_root_is_invalid_parent() {
        let mut s = site();
        let err = s
            .tree
            .add_child(s.root, NewPage::draft("Kerch", city("Керчь")), Utc::now())
            .unwrap_err();
        assert_matches!(err, CoreError::InvalidParent { .. });
    }

    #[test]
    fn every_page_satisfies_containment() {
        let s = site();
        for page in s.tree.pages().filter(|p| p.depth > 1) {
            let parent = s.tree.parent(page.id).unwrap();
            assert!(page.kind().allowed_parents().permits(parent.kind()));
            assert!(parent.kind().allowed_children().permits(page.kind()));
        }
    }

    #[test]
    fn duplicate_sibling_slug_is_a_constraint_violation() {
        let mut s = site();
        let err = s
            .tree
            .add_child(s.yalta, NewPage::draft("Divorce", service()), Utc::now())
            .unwrap_err();
        assert_matches!(err, CoreError::ConstraintViolation(_));
        // Same slug under a different parent is fine.
        assert!(s
            .tree
            .add_child(s.simferopol, NewPage::draft("Divorce", service()), Utc::now())
            .is_ok());
    }

    #[test]
    fn move_relocates_whole_subtree() {
        let mut s = site();
        let target = s.simferopol;
        let updates = s.tree.move_page(s.divorce, target, Utc::now()).unwrap();
        assert_eq!(updates.len(), 1);

        let moved = s.tree.page(s.divorce).unwrap();
        assert_eq!(s.tree.parent(s.divorce).unwrap().id, target);
        assert_eq!(moved.depth, 4);
        assert!(moved.path.starts_with(&s.tree.page(target).unwrap().path));
        assert!(s.tree.children(s.yalta).iter().all(|p| p.id != s.divorce));
    }

    #[test]
    fn move_recomputes_descendant_depths() {
        let mut s = site();
        let now = Utc::now();
        let second_gallery = s
            .tree
            .add_child(
                s.root,
                NewPage::draft("Archive", PageContent::PracticeGalleryPage(Default::default())),
                now,
            )
            .unwrap();
        // A gallery with its case cannot go under a city; validation fails first.
        assert_matches!(
            s.tree.move_page(s.gallery, s.yalta, now),
            Err(CoreError::InvalidChildType { .. })
        );
        // A case can move between galleries.
        s.tree.move_page(s.case, second_gallery, now).unwrap();
        assert_eq!(s.tree.parent(s.case).unwrap().id, second_gallery);
        assert_eq!(s.tree.page(s.case).unwrap().depth, 3);
    }

    #[test]
    fn moving_a_city_moves_its_services() {
        let mut s = site();
        let now = Utc::now();
        // Moving under the current parent sends the city to the end.
        let before_children: Vec<_> = s.tree.descendants(s.yalta).iter().map(|p| p.id).collect();
        let updates = s.tree.move_page(s.yalta, s.home, now).unwrap();
        assert_eq!(updates.len(), 1 + before_children.len());

        let city_path = s.tree.page(s.yalta).unwrap().path.clone();
        for id in before_children {
            let child = s.tree.page(id).unwrap();
            assert!(child.path.starts_with(&city_path));
            assert_eq!(child.depth, 4);
        }
        let order: Vec<_> = s.tree.children(s.home).iter().map(|p| p.id).collect();
        assert_eq!(order, vec![s.simferopol, s.yalta]);
    }

    #[test]
    fn failed_transaction_leaves_tree_unchanged() {
        let mut s = site();
        let before = snapshot(&s.tree);
        let now = Utc::now();

        let result: Result<(), CoreError> = s.tree.transaction(|tx| {
            tx.move_page(s.yalta, s.home, now)?;
            Err(CoreError::Internal("injected failure".into()))
        });

        assert!(result.is_err());
        assert_eq!(snapshot(&s.tree), before);
        assert_eq!(s.tree.parent(s.divorce).unwrap().id, s.yalta);
    }

    #[test]
    fn colliding_path_update_is_rejected_atomically() {
        let mut s = site();
        let before = snapshot(&s.tree);
        let yalta_path = s.tree.page(s.yalta).unwrap().path.clone();
        let divorce_path = s.tree.page(s.divorce).unwrap().path.clone();
        let updates = vec![
            PathUpdate {
                id: s.inheritance,
                path: format!("{yalta_path}0009"),
                depth: 4,
            },
            // Second update collides with an existing page mid-batch.
            PathUpdate {
                id: s.simferopol,
                path: divorce_path.clone(),
                depth: 4,
            },
        ];
        assert!(s.tree.apply_path_updates(&updates, Utc::now()).is_err());
        assert_eq!(snapshot(&s.tree), before);
    }

    #[test]
    fn cannot_move_under_own_descendant() {
        let mut s = site();
        assert_matches!(
            s.tree.move_page(s.yalta, s.divorce, Utc::now()),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            s.tree.move_page(s.root, s.home, Utc::now()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn publish_stamps_first_and_last_published() {
        let mut s = site();
        let now = Utc::now();
        let page = s.tree.set_live(s.inheritance, true, now).unwrap();
        assert!(page.live);
        assert_eq!(page.first_published_at, Some(now));

        let later = now + chrono::Duration::hours(1);
        s.tree.set_live(s.inheritance, false, later).unwrap();
        let page = s.tree.set_live(s.inheritance, true, later).unwrap();
        assert_eq!(page.first_published_at, Some(now));
        assert_eq!(page.last_published_at, Some(later));
    }

    #[test]
    fn deleting_a_case_cascades_to_its_reviews() {
        let mut s = site();
        let now = Utc::now();
        for rating in [5, 4, 3] {
            s.tree.add_review(s.case, review(rating), now).unwrap();
        }
        assert_eq!(s.tree.reviews_for(s.case).len(), 3);

        let deleted = s.tree.delete_page(s.case).unwrap();
        assert_eq!(deleted.reviews.len(), 3);
        assert!(s.tree.reviews().all(|r| r.page_id != s.case));
        assert!(s.tree.get(s.case).is_none());
    }

    #[test]
    fn deleting_a_subtree_removes_descendants() {
        let mut s = site();
        let deleted = s.tree.delete_page(s.yalta).unwrap();
        assert_eq!(deleted.pages.len(), 3);
        assert!(s.tree.get(s.divorce).is_none());
        assert_eq!(s.tree.children(s.home).len(), 1);
    }

    #[test]
    fn reviews_only_attach_to_cases() {
        let mut s = site();
        assert_matches!(
            s.tree.add_review(s.divorce, review(5), Utc::now()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn cities_gallery_must_reference_cities() {
        let s = site();
        let mut content = HomePageFields::default();
        content
            .content
            .push(crate::blocks::Block::CitiesGallery(vec![s.yalta, s.divorce]));
        assert_matches!(
            s.tree.validate_references(&PageContent::HomePage(content)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn update_content_cannot_change_kind() {
        let mut s = site();
        assert_matches!(
            s.tree.update_content(s.yalta, service(), Utc::now()),
            Err(CoreError::Validation(_))
        );
        assert!(s
            .tree
            .update_content(s.yalta, city("Yalta"), Utc::now())
            .is_ok());
    }

    #[test]
    fn update_page_is_all_or_nothing() {
        let mut s = site();
        let bad = PageUpdate {
            title: Some("Renamed".into()),
            content: Some(service()),
            ..Default::default()
        };
        assert!(s.tree.update_page(s.yalta, bad, Utc::now()).is_err());
        assert_eq!(s.tree.page(s.yalta).unwrap().title, "Yalta");

        let good = PageUpdate {
            title: Some("Ялта".into()),
            show_in_menus: Some(true),
            ..Default::default()
        };
        let page = s.tree.update_page(s.yalta, good, Utc::now()).unwrap();
        assert_eq!(page.title, "Ялта");
        assert!(page.show_in_menus);
        assert_eq!(page.slug, "yalta");
    }

    #[test]
    fn from_parts_rebuilds_the_same_tree() {
        let s = site();
        let pages: Vec<Page> = s.tree.pages().cloned().collect();
        let rebuilt = PageTree::from_parts(pages, Vec::new()).unwrap();
        assert_eq!(snapshot(&rebuilt), snapshot(&s.tree));
        assert_eq!(
            rebuilt.children(s.yalta).len(),
            s.tree.children(s.yalta).len()
        );
    }

    #[test]
    fn from_parts_rejects_orphans() {
        let s = site();
        let pages: Vec<Page> = s
            .tree
            .pages()
            .filter(|p| p.id != s.yalta)
            .cloned()
            .collect();
        assert_matches!(
            PageTree::from_parts(pages, Vec::new()),
            Err(CoreError::ConstraintViolation(_))
        );
    }

    #[test]
    fn from_parts_rejects_non_ascii_paths() {
        let s = site();
        let pages: Vec<Page> = s
            .tree
            .pages()
            .cloned()
            .map(|mut p| {
                if p.id == s.divorce {
                    p.path = format!("{}000Ж", &p.path[..p.path.len() - 4]);
                }
                p
            })
            .collect();
        assert_matches!(
            PageTree::from_parts(pages, Vec::new()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn slug_lookup_misses_with_slug_not_found() {
        let s = site();
        assert_eq!(s.tree.find_by_slug("home").unwrap().id, s.home);
        assert_matches!(s.tree.find_by_slug("nope"), Err(CoreError::SlugNotFound(_)));
    }

    #[test]
    fn siblings_and_ancestors() {
        let s = site();
        let siblings: Vec<_> = s.tree.siblings(s.yalta).iter().map(|p| p.id).collect();
        assert_eq!(siblings, vec![s.simferopol]);
        let ancestors: Vec<_> = s.tree.ancestors(s.divorce).iter().map(|p| p.id).collect();
        assert_eq!(ancestors, vec![s.root, s.home, s.yalta]);
    }
}
