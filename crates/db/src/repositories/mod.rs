//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` (or an open transaction) as the first argument.

pub mod client_review_repo;
pub mod page_repo;
pub mod site_repo;

pub use client_review_repo::ClientReviewRepo;
pub use page_repo::PageRepo;
pub use site_repo::SiteRepo;
