//! Row structs.
//!
//! Each submodule holds a `FromRow` struct matching its table and the
//! conversion into the corresponding `yurist_core` type.

pub mod client_review;
pub mod page;
pub mod site;
