//! Search-index documents.
//!
//! The external search backend receives one flat document per visible page,
//! built from the fields each kind marks as searchable.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::page_types::PageKind;
use crate::pages::Page;
use crate::tree::PageTree;
use crate::types::DbId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexDocument {
    pub page_id: DbId,
    pub kind: PageKind,
    pub title: String,
    /// Searchable field name → plain text. Blank fields are left out.
    pub fields: BTreeMap<&'static str, String>,
}

/// Document for one page, or `None` when it is not publicly visible.
pub fn index_document(page: &Page) -> Option<IndexDocument> {
    if !page.is_visible() || page.depth == 1 {
        return None;
    }
    let fields = page
        .kind()
        .fields()
        .into_iter()
        .filter(|spec| spec.searchable)
        .filter_map(|spec| {
            let text = page.field_text(spec.name)?;
            (!text.trim().is_empty()).then_some((spec.name, text))
        })
        .collect();
    Some(IndexDocument {
        page_id: page.id,
        kind: page.kind(),
        title: page.title.clone(),
        fields,
    })
}

pub fn index_documents(tree: &PageTree) -> Vec<IndexDocument> {
    tree.pages().filter_map(index_document).collect()
}
