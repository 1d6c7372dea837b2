//! Page records.
//!
//! A [`Page`] is the common base record (tree position, slug, flags,
//! timestamps) plus a [`PageContent`] payload that is one of a closed set of
//! kind-specific field structs.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail};

use crate::blocks::{plain_text, DayHours, ImageRef, StreamField};
use crate::error::CoreError;
use crate::page_types::PageKind;
use crate::types::{DbId, Timestamp};

/// Maximum length for a page title.
pub const MAX_TITLE_LENGTH: usize = 255;

/// Maximum length for a page slug.
pub const MAX_SLUG_LENGTH: usize = 255;

// ---------------------------------------------------------------------------
// Shared field groups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hero {
    pub hero_title: String,
    pub hero_image: Option<ImageRef>,
}

/// Postal address components. Blank strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
}

impl Address {
    pub fn is_blank(&self) -> bool {
        [&self.street, &self.city, &self.region, &self.postal_code]
            .iter()
            .all(|s| s.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contacts {
    pub phone: String,
    pub email: String,
    pub map_url: String,
}

impl Contacts {
    fn validate(&self) -> Result<(), CoreError> {
        let email = self.email.trim();
        if !email.is_empty() && !email.validate_email() {
            return Err(CoreError::Validation(format!(
                "Invalid email address '{email}'"
            )));
        }
        let map_url = self.map_url.trim();
        if !map_url.is_empty()
            && !(map_url.starts_with("https://") || map_url.starts_with("http://"))
        {
            return Err(CoreError::Validation(format!(
                "Map URL must be an http(s) URL, got '{map_url}'"
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Kind-specific payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomePageFields {
    #[serde(flatten)]
    pub hero: Hero,
    #[serde(flatten)]
    pub address: Address,
    #[serde(flatten)]
    pub contacts: Contacts,
    pub description: String,
    pub content: StreamField,
    pub working_hours: Vec<DayHours>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityPageFields {
    pub city_name: String,
    #[serde(flatten)]
    pub hero: Hero,
    #[serde(flatten)]
    pub address: Address,
    #[serde(flatten)]
    pub contacts: Contacts,
    pub description: String,
    pub content: StreamField,
    pub working_hours: Vec<DayHours>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicePageFields {
    #[serde(flatten)]
    pub hero: Hero,
    pub short_description: String,
    pub price: Option<Decimal>,
    pub price_qualifier: String,
    /// Overrides the parent city's address when set.
    #[serde(flatten)]
    pub address: Address,
    #[serde(flatten)]
    pub contacts: Contacts,
    pub description: String,
    pub content: StreamField,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PracticeGalleryFields {
    pub description: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    #[default]
    InProgress,
    Won,
    Settled,
    Closed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegalPracticeFields {
    pub case_title: String,
    pub case_type: String,
    pub description: String,
    pub challenge: String,
    pub solution: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: CaseStatus,
    pub court_name: String,
    /// Ordered image gallery.
    pub gallery: Vec<ImageRef>,
}

/// Kind-specific payload of a page.
///
/// Serialized as `{ "kind": "...", "fields": { ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "fields", rename_all = "snake_case")]
pub enum PageContent {
    Root,
    HomePage(HomePageFields),
    CityPage(CityPageFields),
    ServicePage(ServicePageFields),
    PracticeGalleryPage(PracticeGalleryFields),
    LegalPracticePage(LegalPracticeFields),
}

impl PageContent {
    pub fn kind(&self) -> PageKind {
        match self {
            Self::Root => PageKind::Root,
            Self::HomePage(_) => PageKind::HomePage,
            Self::CityPage(_) => PageKind::CityPage,
            Self::ServicePage(_) => PageKind::ServicePage,
            Self::PracticeGalleryPage(_) => PageKind::PracticeGalleryPage,
            Self::LegalPracticePage(_) => PageKind::LegalPracticePage,
        }
    }

    /// The `fields` object alone, as stored in the `pages.fields` column.
    pub fn fields_json(&self) -> serde_json::Value {
        let value = match self {
            Self::Root => return serde_json::Value::Object(Default::default()),
            Self::HomePage(f) => serde_json::to_value(f),
            Self::CityPage(f) => serde_json::to_value(f),
            Self::ServicePage(f) => serde_json::to_value(f),
            Self::PracticeGalleryPage(f) => serde_json::to_value(f),
            Self::LegalPracticePage(f) => serde_json::to_value(f),
        };
        value.unwrap_or_else(|_| serde_json::Value::Object(Default::default()))
    }

    /// Rebuild a payload from a stored kind name and `fields` object.
    pub fn from_parts(kind: &str, fields: serde_json::Value) -> Result<Self, CoreError> {
        let kind = PageKind::from_str(kind)
            .ok_or_else(|| CoreError::Validation(format!("Unknown page kind '{kind}'")))?;
        let invalid =
            |e: serde_json::Error| CoreError::Validation(format!("Invalid {kind} fields: {e}"));
        let content = match kind {
            PageKind::Root => Self::Root,
            PageKind::HomePage => Self::HomePage(serde_json::from_value(fields).map_err(invalid)?),
            PageKind::CityPage => Self::CityPage(serde_json::from_value(fields).map_err(invalid)?),
            PageKind::ServicePage => {
                Self::ServicePage(serde_json::from_value(fields).map_err(invalid)?)
            }
            PageKind::PracticeGalleryPage => {
                Self::PracticeGalleryPage(serde_json::from_value(fields).map_err(invalid)?)
            }
            PageKind::LegalPracticePage => {
                Self::LegalPracticePage(serde_json::from_value(fields).map_err(invalid)?)
            }
        };
        Ok(content)
    }

    /// The structured content field, for kinds that carry one.
    pub fn stream(&self) -> Option<&StreamField> {
        match self {
            Self::HomePage(f) => Some(&f.content),
            Self::CityPage(f) => Some(&f.content),
            Self::ServicePage(f) => Some(&f.content),
            _ => None,
        }
    }

    /// Checks that need no access to the rest of the tree.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::HomePage(f) => f.contacts.validate(),
            Self::CityPage(f) => f.contacts.validate(),
            Self::ServicePage(f) => {
                if f.price.is_some_and(|p| p.is_sign_negative()) {
                    return Err(CoreError::Validation("Price must not be negative".into()));
                }
                f.contacts.validate()
            }
            Self::LegalPracticePage(f) => match (f.start_date, f.end_date) {
                (Some(start), Some(end)) if end < start => Err(CoreError::Validation(
                    "Case end date must not precede its start date".into(),
                )),
                _ => Ok(()),
            },
            Self::Root | Self::PracticeGalleryPage(_) => Ok(()),
        }?;
        match self.stream() {
            Some(stream) => stream.validate(),
            None => Ok(()),
        }
    }

    /// Plain-text value of a declared field, looked up by name.
    ///
    /// Returns `None` for fields this payload does not carry or that hold no
    /// text (images, galleries).
    pub fn field_text(&self, name: &str) -> Option<String> {
        match (self, name) {
            (Self::HomePage(f), _) => common_text(&f.hero, &f.address, &f.contacts, name)
                .or_else(|| match name {
                    "description" => Some(plain_text(&f.description)),
                    "content" => Some(f.content.text()),
                    _ => None,
                }),
            (Self::CityPage(f), "city_name") => Some(f.city_name.clone()),
            (Self::CityPage(f), _) => common_text(&f.hero, &f.address, &f.contacts, name)
                .or_else(|| match name {
                    "description" => Some(plain_text(&f.description)),
                    "content" => Some(f.content.text()),
                    _ => None,
                }),
            (Self::ServicePage(f), _) => common_text(&f.hero, &f.address, &f.contacts, name)
                .or_else(|| match name {
                    "short_description" => Some(f.short_description.clone()),
                    "price" => f.price.map(|p| p.to_string()),
                    "price_qualifier" => Some(f.price_qualifier.clone()),
                    "description" => Some(plain_text(&f.description)),
                    "content" => Some(f.content.text()),
                    _ => None,
                }),
            (Self::PracticeGalleryPage(f), "description") => Some(plain_text(&f.description)),
            (Self::LegalPracticePage(f), _) => match name {
                "case_title" => Some(f.case_title.clone()),
                "case_type" => Some(f.case_type.clone()),
                "description" => Some(plain_text(&f.description)),
                "challenge" => Some(plain_text(&f.challenge)),
                "solution" => Some(plain_text(&f.solution)),
                "court_name" => Some(f.court_name.clone()),
                "start_date" => f.start_date.map(|d| d.to_string()),
                "end_date" => f.end_date.map(|d| d.to_string()),
                _ => None,
            },
            _ => None,
        }
    }
}

fn common_text(hero: &Hero, address: &Address, contacts: &Contacts, name: &str) -> Option<String> {
    let value = match name {
        "hero_title" => &hero.hero_title,
        "street" => &address.street,
        "city" => &address.city,
        "region" => &address.region,
        "postal_code" => &address.postal_code,
        "phone" => &contacts.phone,
        "email" => &contacts.email,
        "map_url" => &contacts.map_url,
        _ => return None,
    };
    Some(value.clone())
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub id: DbId,
    /// Materialized tree path; see [`crate::tree_path`].
    pub path: String,
    pub depth: i32,
    pub slug: String,
    pub title: String,
    pub live: bool,
    pub public: bool,
    pub show_in_menus: bool,
    pub seo_title: Option<String>,
    pub search_description: Option<String>,
    #[serde(flatten)]
    pub content: PageContent,
    pub first_published_at: Option<Timestamp>,
    pub last_published_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Page {
    pub fn kind(&self) -> PageKind {
        self.content.kind()
    }

    /// Live and publicly visible.
    pub fn is_visible(&self) -> bool {
        self.live && self.public
    }

    pub fn as_home(&self) -> Option<&HomePageFields> {
        match &self.content {
            PageContent::HomePage(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_city(&self) -> Option<&CityPageFields> {
        match &self.content {
            PageContent::CityPage(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_service(&self) -> Option<&ServicePageFields> {
        match &self.content {
            PageContent::ServicePage(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_legal_practice(&self) -> Option<&LegalPracticeFields> {
        match &self.content {
            PageContent::LegalPracticePage(f) => Some(f),
            _ => None,
        }
    }

    /// Plain-text value of any declared field, base fields included.
    pub fn field_text(&self, name: &str) -> Option<String> {
        match name {
            // `service_name` has no stored column; it is the page title.
            "title" | "service_name" => Some(self.title.clone()),
            "slug" => Some(self.slug.clone()),
            "seo_title" => self.seo_title.clone(),
            "search_description" => self.search_description.clone(),
            _ => self.content.field_text(name),
        }
    }
}

/// Input for creating a page under a parent.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewPage {
    /// Generated from the title when absent.
    pub slug: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    pub live: bool,
    #[serde(default = "default_true")]
    pub public: bool,
    #[serde(default)]
    pub show_in_menus: bool,
    #[validate(length(max = 255))]
    pub seo_title: Option<String>,
    pub search_description: Option<String>,
    #[serde(flatten)]
    pub content: PageContent,
}

fn default_true() -> bool {
    true
}

impl NewPage {
    /// Unpublished, public draft with the given payload.
    pub fn draft(title: &str, content: PageContent) -> Self {
        Self {
            slug: None,
            title: title.to_string(),
            live: false,
            public: true,
            show_in_menus: false,
            seo_title: None,
            search_description: None,
            content,
        }
    }

    pub fn with_slug(mut self, slug: &str) -> Self {
        self.slug = Some(slug.to_string());
        self
    }

    pub fn published(mut self) -> Self {
        self.live = true;
        self
    }

    /// Validate the input and resolve the slug to store.
    pub fn checked_slug(&self) -> Result<String, CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        if self.title.trim().is_empty() {
            return Err(CoreError::Validation("Title must not be empty".into()));
        }
        self.content.validate()?;
        let slug = match &self.slug {
            Some(slug) => slug.clone(),
            None => generate_slug(&self.title),
        };
        validate_slug(&slug)?;
        Ok(slug)
    }
}

/// Partial update of a page's editable fields. Absent fields are unchanged.
///
/// `content` replaces the whole payload and must keep the page's kind.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PageUpdate {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub public: Option<bool>,
    pub show_in_menus: Option<bool>,
    #[validate(length(max = 255))]
    pub seo_title: Option<String>,
    pub search_description: Option<String>,
    pub content: Option<PageContent>,
}

// ---------------------------------------------------------------------------
// Slugs
// ---------------------------------------------------------------------------

/// Generate a URL-safe slug from a title.
///
/// Lowercases, keeps alphanumerics (Cyrillic included), and joins the
/// remaining runs with single hyphens.
pub fn generate_slug(title: &str) -> String {
    title
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Validate a slug: non-empty, lowercase alphanumerics, `-` and `_`.
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.is_empty() {
        return Err(CoreError::Validation("Slug must not be empty".into()));
    }
    if slug.chars().count() > MAX_SLUG_LENGTH {
        return Err(CoreError::Validation(format!(
            "Slug must be at most {MAX_SLUG_LENGTH} characters"
        )));
    }
    if !slug
        .chars()
        .all(|c| (c.is_alphanumeric() && !c.is_uppercase()) || c == '-' || c == '_')
    {
        return Err(CoreError::Validation(format!(
            "Slug '{slug}' may contain only lowercase letters, digits, hyphens and underscores"
        )));
    }
    Ok(())
}
