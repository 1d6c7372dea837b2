//! schema.org JSON-LD documents derived from page fields.
//!
//! Home and city pages describe the practice as a `LegalService`; service
//! pages become a `Service` with an optional offer, service area and the
//! city that provides it. Other kinds have no document.
//!
//! Wherever a specific field and the page title both could name something,
//! the specific field wins unless it is blank.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::blocks::plain_text;
use crate::error::CoreError;
use crate::pages::{Address, Contacts, Hero, Page, PageContent};
use crate::tree::PageTree;
use crate::types::DbId;
use crate::urls::{absolute_url, page_path};

pub const SCHEMA_CONTEXT: &str = "https://schema.org";
pub const OFFER_CURRENCY: &str = "RUB";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredMetadata {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(flatten)]
    pub document: Document,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "@type")]
pub enum Document {
    LegalService(LegalService),
    Service(Service),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalService {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<PostalAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_map: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offers: Option<Offer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_served: Option<Place>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostalAddress {
    #[serde(rename = "@type")]
    pub schema_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_locality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

/// An offer carries a numeric price, or only a free-text qualifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    #[serde(rename = "@type")]
    pub schema_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_currency: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    #[serde(rename = "@type")]
    pub schema_type: &'static str,
    pub address: PostalAddress,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Provider {
    #[serde(rename = "@type")]
    pub schema_type: &'static str,
    pub name: String,
    pub url: String,
}

/// Where absolute URLs point: the base URL and the page served at `/`.
#[derive(Debug, Clone, Copy)]
pub struct Canonical<'a> {
    pub base_url: &'a str,
    pub site_root: Option<DbId>,
}

impl Canonical<'_> {
    fn url_of(&self, tree: &PageTree, id: DbId) -> String {
        let path = page_path(tree, id, self.site_root).unwrap_or_else(|| "/".to_string());
        absolute_url(self.base_url, &path)
    }
}

/// Derive the JSON-LD document for a page, if its kind has one.
pub fn to_structured_metadata(
    tree: &PageTree,
    id: DbId,
    canonical: Canonical<'_>,
) -> Result<Option<StructuredMetadata>, CoreError> {
    let page = tree.page(id)?;
    let document = match &page.content {
        PageContent::HomePage(f) => Some(Document::LegalService(legal_service(
            page,
            &f.hero,
            &f.description,
            &f.address,
            &f.contacts,
            canonical.url_of(tree, id),
        ))),
        PageContent::CityPage(f) => Some(Document::LegalService(legal_service(
            page,
            &f.hero,
            &f.description,
            &f.address,
            &f.contacts,
            canonical.url_of(tree, id),
        ))),
        PageContent::ServicePage(f) => {
            let description = non_blank(&f.short_description)
                .or_else(|| non_blank(&plain_text(&f.description)));
            let provider = tree.parent(id).and_then(|parent| {
                parent.as_city().map(|city| Provider {
                    schema_type: "LegalService",
                    name: name_or_title(&city.hero, parent),
                    url: canonical.url_of(tree, parent.id),
                })
            });
            Some(Document::Service(Service {
                name: name_or_title(&f.hero, page),
                description,
                url: canonical.url_of(tree, id),
                offers: offer(f.price, &f.price_qualifier),
                area_served: postal_address(&f.address).map(|address| Place {
                    schema_type: "Place",
                    address,
                }),
                provider,
            }))
        }
        _ => None,
    };

    Ok(document.map(|document| StructuredMetadata {
        context: SCHEMA_CONTEXT,
        document,
    }))
}

fn legal_service(
    page: &Page,
    hero: &Hero,
    description: &str,
    address: &Address,
    contacts: &Contacts,
    url: String,
) -> LegalService {
    LegalService {
        name: name_or_title(hero, page),
        description: non_blank(&plain_text(description)),
        telephone: non_blank(&contacts.phone),
        email: non_blank(&contacts.email),
        url,
        address: postal_address(address),
        has_map: non_blank(&contacts.map_url),
    }
}

fn name_or_title(hero: &Hero, page: &Page) -> String {
    non_blank(&hero.hero_title).unwrap_or_else(|| page.title.clone())
}

fn postal_address(address: &Address) -> Option<PostalAddress> {
    if address.is_blank() {
        return None;
    }
    Some(PostalAddress {
        schema_type: "PostalAddress",
        street_address: non_blank(&address.street),
        address_locality: non_blank(&address.city),
        address_region: non_blank(&address.region),
        postal_code: non_blank(&address.postal_code),
    })
}

fn offer(price: Option<Decimal>, qualifier: &str) -> Option<Offer> {
    let description = non_blank(qualifier);
    if price.is_none() && description.is_none() {
        return None;
    }
    Some(Offer {
        schema_type: "Offer",
        price,
        price_currency: price.map(|_| OFFER_CURRENCY),
        description,
    })
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
