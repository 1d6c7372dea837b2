//! Domain logic for the Yurist site: the page tree, its placement rules,
//! structured content blocks, render contexts, and the documents derived
//! from pages (structured metadata, sitemap, menu, search index).
//!
//! Nothing in this crate performs I/O. The `db` crate persists the tree and
//! the `api` crate serves it.

pub mod blocks;
pub mod bootstrap;
pub mod context;
pub mod error;
pub mod menu;
pub mod page_types;
pub mod pages;
pub mod reviews;
pub mod robots;
pub mod search;
pub mod site;
pub mod sitemap;
pub mod structured_data;
pub mod tree;
pub mod tree_path;
pub mod types;
pub mod urls;
