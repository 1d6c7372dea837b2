//! Page type registry.
//!
//! Every page kind declares which parent kinds it may live under, which
//! child kinds it accepts, an optional site-wide instance cap, and a
//! declarative field table (field → semantic type → admin panel →
//! search-indexed?). Placement validation and the search-index exporter are
//! driven entirely from this table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Page kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Root,
    HomePage,
    CityPage,
    ServicePage,
    PracticeGalleryPage,
    LegalPracticePage,
}

impl PageKind {
    /// Every kind, root first.
    pub const ALL: [PageKind; 6] = [
        Self::Root,
        Self::HomePage,
        Self::CityPage,
        Self::ServicePage,
        Self::PracticeGalleryPage,
        Self::LegalPracticePage,
    ];

    /// Return the kind name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::HomePage => "home_page",
            Self::CityPage => "city_page",
            Self::ServicePage => "service_page",
            Self::PracticeGalleryPage => "practice_gallery_page",
            Self::LegalPracticePage => "legal_practice_page",
        }
    }

    /// Parse a stored kind name. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// Human-readable name used in error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Root => "Root",
            Self::HomePage => "HomePage",
            Self::CityPage => "CityPage",
            Self::ServicePage => "ServicePage",
            Self::PracticeGalleryPage => "PracticeGalleryPage",
            Self::LegalPracticePage => "LegalPracticePage",
        }
    }

    pub fn allowed_parents(&self) -> KindRule {
        match self {
            // The root is created by bootstrap, never placed under a parent.
            Self::Root => KindRule::Only(&[]),
            Self::HomePage => KindRule::Only(&[Self::Root]),
            Self::CityPage => KindRule::Only(&[Self::HomePage]),
            Self::ServicePage => KindRule::Only(&[Self::CityPage]),
            Self::PracticeGalleryPage => KindRule::Any,
            Self::LegalPracticePage => KindRule::Only(&[Self::PracticeGalleryPage]),
        }
    }

    pub fn allowed_children(&self) -> KindRule {
        match self {
            Self::Root => KindRule::Any,
            Self::HomePage => KindRule::Only(&[Self::CityPage]),
            Self::CityPage => KindRule::Only(&[Self::ServicePage]),
            Self::ServicePage => KindRule::Only(&[]),
            Self::PracticeGalleryPage => KindRule::Only(&[Self::LegalPracticePage]),
            Self::LegalPracticePage => KindRule::Only(&[]),
        }
    }

    /// Site-wide cap on instances of this kind.
    pub fn max_count(&self) -> Option<usize> {
        match self {
            Self::Root | Self::HomePage => Some(1),
            _ => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.allowed_children() == KindRule::Only(&[])
    }

    /// Fields declared by this kind, base page fields first.
    pub fn fields(&self) -> Vec<&'static FieldSpec> {
        let specific: &'static [FieldSpec] = match self {
            Self::Root => &[],
            Self::HomePage => HOME_FIELDS,
            Self::CityPage => CITY_FIELDS,
            Self::ServicePage => SERVICE_FIELDS,
            Self::PracticeGalleryPage => GALLERY_FIELDS,
            Self::LegalPracticePage => LEGAL_PRACTICE_FIELDS,
        };
        BASE_FIELDS.iter().chain(specific).collect()
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A parent or child restriction.
///
/// `Only(&[])` means nothing is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindRule {
    Any,
    Only(&'static [PageKind]),
}

impl KindRule {
    pub fn permits(&self, kind: PageKind) -> bool {
        match self {
            Self::Any => true,
            Self::Only(kinds) => kinds.contains(&kind),
        }
    }
}

impl Serialize for KindRule {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Any => serializer.serialize_str("any"),
            Self::Only(kinds) => kinds.serialize(serializer),
        }
    }
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

/// Check whether a page of `kind` may be created under a page of `parent`,
/// given `existing` pages of `kind` already in the tree.
///
/// The parent's child restriction is checked first so that any attempt to
/// place a page under a leaf fails with `InvalidChildType`.
pub fn validate_placement(
    kind: PageKind,
    parent: PageKind,
    existing: usize,
) -> Result<(), CoreError> {
    validate_containment(kind, parent)?;
    if let Some(max) = kind.max_count() {
        if existing >= max {
            return Err(CoreError::CardinalityExceeded { kind, max });
        }
    }
    Ok(())
}

/// Parent/child checks without the cardinality cap (used when moving).
pub fn validate_containment(kind: PageKind, parent: PageKind) -> Result<(), CoreError> {
    if parent.is_leaf() {
        return Err(CoreError::InvalidChildType { kind, parent });
    }
    if !kind.allowed_parents().permits(parent) {
        return Err(CoreError::InvalidParent { kind, parent });
    }
    if !parent.allowed_children().permits(kind) {
        return Err(CoreError::InvalidChildType { kind, parent });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Field metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    RichText,
    Slug,
    Email,
    Phone,
    Url,
    Image,
    ImageGallery,
    Decimal,
    Date,
    Choice,
    StreamField,
    WorkingHours,
}

/// Admin panel a field is edited in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    Content,
    Hero,
    Contacts,
    Pricing,
    Case,
    Promote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
    pub panel: Panel,
    pub searchable: bool,
}

const fn field(
    name: &'static str,
    field_type: FieldType,
    panel: Panel,
    searchable: bool,
) -> FieldSpec {
    FieldSpec {
        name,
        field_type,
        panel,
        searchable,
    }
}

static BASE_FIELDS: &[FieldSpec] = &[
    field("title", FieldType::Text, Panel::Content, true),
    field("slug", FieldType::Slug, Panel::Promote, false),
    field("seo_title", FieldType::Text, Panel::Promote, false),
    field("search_description", FieldType::Text, Panel::Promote, true),
];

static HOME_FIELDS: &[FieldSpec] = &[
    field("hero_title", FieldType::Text, Panel::Hero, true),
    field("hero_image", FieldType::Image, Panel::Hero, false),
    field("street", FieldType::Text, Panel::Contacts, false),
    field("city", FieldType::Text, Panel::Contacts, true),
    field("region", FieldType::Text, Panel::Contacts, false),
    field("postal_code", FieldType::Text, Panel::Contacts, false),
    field("phone", FieldType::Phone, Panel::Contacts, false),
    field("email", FieldType::Email, Panel::Contacts, false),
    field("map_url", FieldType::Url, Panel::Contacts, false),
    field("description", FieldType::RichText, Panel::Content, true),
    field("content", FieldType::StreamField, Panel::Content, true),
    field("working_hours", FieldType::WorkingHours, Panel::Contacts, false),
];

static CITY_FIELDS: &[FieldSpec] = &[
    field("city_name", FieldType::Text, Panel::Content, true),
    field("hero_title", FieldType::Text, Panel::Hero, true),
    field("hero_image", FieldType::Image, Panel::Hero, false),
    field("street", FieldType::Text, Panel::Contacts, false),
    field("city", FieldType::Text, Panel::Contacts, true),
    field("region", FieldType::Text, Panel::Contacts, false),
    field("postal_code", FieldType::Text, Panel::Contacts, false),
    field("phone", FieldType::Phone, Panel::Contacts, false),
    field("email", FieldType::Email, Panel::Contacts, false),
    field("map_url", FieldType::Url, Panel::Contacts, false),
    field("description", FieldType::RichText, Panel::Content, true),
    field("content", FieldType::StreamField, Panel::Content, true),
    field("working_hours", FieldType::WorkingHours, Panel::Contacts, false),
];

static SERVICE_FIELDS: &[FieldSpec] = &[
    // No stored column; resolves to the page title.
    field("service_name", FieldType::Text, Panel::Content, true),
    field("hero_title", FieldType::Text, Panel::Hero, true),
    field("hero_image", FieldType::Image, Panel::Hero, false),
    field("short_description", FieldType::Text, Panel::Content, true),
    field("price", FieldType::Decimal, Panel::Pricing, false),
    field("price_qualifier", FieldType::Text, Panel::Pricing, false),
    field("street", FieldType::Text, Panel::Contacts, false),
    field("city", FieldType::Text, Panel::Contacts, true),
    field("region", FieldType::Text, Panel::Contacts, false),
    field("postal_code", FieldType::Text, Panel::Contacts, false),
    field("phone", FieldType::Phone, Panel::Contacts, false),
    field("email", FieldType::Email, Panel::Contacts, false),
    field("map_url", FieldType::Url, Panel::Contacts, false),
    field("description", FieldType::RichText, Panel::Content, true),
    field("content", FieldType::StreamField, Panel::Content, true),
];

static GALLERY_FIELDS: &[FieldSpec] = &[field(
    "description",
    FieldType::RichText,
    Panel::Content,
    true,
)];

static LEGAL_PRACTICE_FIELDS: &[FieldSpec] = &[
    field("case_title", FieldType::Text, Panel::Case, true),
    field("case_type", FieldType::Text, Panel::Case, true),
    field("description", FieldType::RichText, Panel::Content, true),
    field("challenge", FieldType::RichText, Panel::Content, true),
    field("solution", FieldType::RichText, Panel::Content, true),
    field("start_date", FieldType::Date, Panel::Case, false),
    field("end_date", FieldType::Date, Panel::Case, false),
    field("status", FieldType::Choice, Panel::Case, false),
    field("court_name", FieldType::Text, Panel::Case, true),
    field("gallery", FieldType::ImageGallery, Panel::Content, false),
];

/// Serializable description of a page kind, for the registry endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PageTypeInfo {
    pub kind: PageKind,
    pub name: &'static str,
    pub allowed_parents: KindRule,
    pub allowed_children: KindRule,
    pub max_count: Option<usize>,
    pub fields: Vec<&'static FieldSpec>,
}

pub fn describe(kind: PageKind) -> PageTypeInfo {
    PageTypeInfo {
        kind,
        name: kind.display_name(),
        allowed_parents: kind.allowed_parents(),
        allowed_children: kind.allowed_children(),
        max_count: kind.max_count(),
        fields: kind.fields(),
    }
}

/// Describe every kind that can be created through the page tree.
pub fn registry() -> Vec<PageTypeInfo> {
    PageKind::ALL
        .into_iter()
        .filter(|k| *k != PageKind::Root)
        .map(describe)
        .collect()
}
