//! Two-level navigation menu.
//!
//! Top-level entries are the depth-3 pages (the cities under the home page)
//! that are live, public and flagged for menus; each carries its own
//! children matching the same flags.

use serde::Serialize;

use crate::pages::Page;
use crate::tree::PageTree;
use crate::types::DbId;
use crate::urls::page_path;

pub const MENU_DEPTH: i32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuItem {
    pub id: DbId,
    pub title: String,
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuItem>,
}

fn in_menu(page: &Page) -> bool {
    page.is_visible() && page.show_in_menus
}

fn item(tree: &PageTree, page: &Page, site_root: Option<DbId>, children: Vec<MenuItem>) -> MenuItem {
    MenuItem {
        id: page.id,
        title: page.title.clone(),
        url: page_path(tree, page.id, site_root),
        children,
    }
}

pub fn nested_menu(tree: &PageTree, site_root: Option<DbId>) -> Vec<MenuItem> {
    tree.pages()
        .filter(|p| p.depth == MENU_DEPTH && in_menu(p))
        .map(|parent| {
            let children = tree
                .children(parent.id)
                .into_iter()
                .filter(|c| in_menu(c))
                .map(|c| item(tree, c, site_root, Vec::new()))
                .collect();
            item(tree, parent, site_root, children)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::NewPage;
    use crate::tree::fixtures::{city, service, site};
    use chrono::Utc;

    fn menu_page(title: &str, content: crate::pages::PageContent) -> NewPage {
        let mut input = NewPage::draft(title, content).published();
        input.show_in_menus = true;
        input
    }

    #[test]
    fn only_flagged_pages_appear() {
        let s = site();
        assert!(nested_menu(&s.tree, Some(s.home)).is_empty());
    }

    #[test]
    fn cities_carry_their_menu_services() {
        let mut s = site();
        let now = Utc::now();
        let kerch = s
            .tree
            .add_child(s.home, menu_page("Kerch", city("Керчь")), now)
            .unwrap();
        s.tree
            .add_child(kerch, menu_page("Labour", service()), now)
            .unwrap();
        s.tree
            .add_child(kerch, NewPage::draft("Hidden", service()).published(), now)
            .unwrap();

        let menu = nested_menu(&s.tree, Some(s.home));
        assert_eq!(menu.len(), 1);
        assert_eq!(menu[0].title, "Kerch");
        assert_eq!(menu[0].url.as_deref(), Some("/kerch/"));
        let children: Vec<_> = menu[0].children.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(children, vec!["Labour"]);
        assert_eq!(menu[0].children[0].url.as_deref(), Some("/kerch/labour/"));
    }
}
