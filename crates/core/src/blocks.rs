//! Structured content blocks.
//!
//! A [`StreamField`] is an ordered list of typed blocks attached to a page.
//! It is stored as a JSON array of `{ "type", "value", "id" }` objects.
//! Block kinds this crate does not know are kept as [`Block::Unknown`] so a
//! read-modify-write cycle never drops or reorders them; renderers and
//! exporters skip them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Block kind constants
// ---------------------------------------------------------------------------

pub const BLOCK_HEADING: &str = "heading";
pub const BLOCK_PARAGRAPH: &str = "paragraph";
pub const BLOCK_IMAGE: &str = "image";
pub const BLOCK_CITIES_GALLERY: &str = "cities_gallery";
pub const BLOCK_DAY_HOURS: &str = "day_hours";

/// Maximum length of a heading block.
pub const MAX_HEADING_LENGTH: usize = 255;

// ---------------------------------------------------------------------------
// Value types
// ---------------------------------------------------------------------------

/// Weak reference to an externally managed media asset.
///
/// Only the identifier is held; resolving it to bytes or a URL is the media
/// store's job, and dropping the reference never deletes the asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub id: DbId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl ImageRef {
    pub fn new(id: DbId) -> Self {
        Self { id, alt: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }
}

/// One row of a working-hours table, e.g. `monday` / `09:00–18:00`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub day: DayOfWeek,
    pub hours: String,
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// A single typed unit of structured content.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Short plain-text heading.
    Heading(String),
    /// Rich text (HTML fragment).
    Paragraph(String),
    Image(ImageRef),
    /// Ordered references to city pages.
    CitiesGallery(Vec<DbId>),
    DayHours(DayHours),
    /// A block kind this crate does not understand, kept verbatim.
    Unknown {
        kind: String,
        value: serde_json::Value,
    },
}

impl Block {
    /// The block kind as written to the `type` key.
    pub fn kind(&self) -> &str {
        match self {
            Self::Heading(_) => BLOCK_HEADING,
            Self::Paragraph(_) => BLOCK_PARAGRAPH,
            Self::Image(_) => BLOCK_IMAGE,
            Self::CitiesGallery(_) => BLOCK_CITIES_GALLERY,
            Self::DayHours(_) => BLOCK_DAY_HOURS,
            Self::Unknown { kind, .. } => kind,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown { .. })
    }

    /// Plain text carried by the block, if any.
    pub fn text(&self) -> Option<String> {
        match self {
            Self::Heading(text) => Some(text.clone()),
            Self::Paragraph(html) => Some(plain_text(html)),
            Self::DayHours(row) => Some(format!("{} {}", row.day.as_str(), row.hours)),
            _ => None,
        }
    }

    fn payload(&self) -> serde_json::Value {
        let value = match self {
            Self::Heading(text) | Self::Paragraph(text) => serde_json::to_value(text),
            Self::Image(image) => serde_json::to_value(image),
            Self::CitiesGallery(ids) => serde_json::to_value(ids),
            Self::DayHours(row) => serde_json::to_value(row),
            Self::Unknown { value, .. } => return value.clone(),
        };
        value.unwrap_or(serde_json::Value::Null)
    }

    fn from_payload(kind: &str, value: serde_json::Value) -> Result<Self, CoreError> {
        let invalid = |e: serde_json::Error| {
            CoreError::Validation(format!("Invalid '{kind}' block payload: {e}"))
        };
        let block = match kind {
            BLOCK_HEADING => Self::Heading(serde_json::from_value(value).map_err(invalid)?),
            BLOCK_PARAGRAPH => Self::Paragraph(serde_json::from_value(value).map_err(invalid)?),
            BLOCK_IMAGE => Self::Image(serde_json::from_value(value).map_err(invalid)?),
            BLOCK_CITIES_GALLERY => {
                Self::CitiesGallery(serde_json::from_value(value).map_err(invalid)?)
            }
            BLOCK_DAY_HOURS => Self::DayHours(serde_json::from_value(value).map_err(invalid)?),
            other => Self::Unknown {
                kind: other.to_string(),
                value,
            },
        };
        Ok(block)
    }

    /// Intrinsic checks that need no access to the page tree.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Heading(text) => {
                if text.trim().is_empty() {
                    return Err(CoreError::Validation(
                        "Heading block must not be empty".into(),
                    ));
                }
                if text.chars().count() > MAX_HEADING_LENGTH {
                    return Err(CoreError::Validation(format!(
                        "Heading block must be at most {MAX_HEADING_LENGTH} characters"
                    )));
                }
            }
            Self::DayHours(row) if row.hours.trim().is_empty() => {
                return Err(CoreError::Validation(format!(
                    "Working hours for {} must not be empty",
                    row.day.as_str()
                )));
            }
            _ => {}
        }
        Ok(())
    }
}

/// A block together with its stable identifier inside the stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBlock", into = "RawBlock")]
pub struct StreamBlock {
    pub id: String,
    pub block: Block,
}

impl StreamBlock {
    /// Wrap a block, assigning it a fresh identifier.
    pub fn new(block: Block) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            block,
        }
    }
}

/// On-disk shape of one block.
#[derive(Debug, Serialize, Deserialize)]
struct RawBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

impl TryFrom<RawBlock> for StreamBlock {
    type Error = CoreError;

    fn try_from(raw: RawBlock) -> Result<Self, Self::Error> {
        let block = Block::from_payload(&raw.kind, raw.value)?;
        Ok(Self {
            id: raw
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            block,
        })
    }
}

impl From<StreamBlock> for RawBlock {
    fn from(stream_block: StreamBlock) -> Self {
        Self {
            kind: stream_block.block.kind().to_string(),
            value: stream_block.block.payload(),
            id: Some(stream_block.id),
        }
    }
}

// ---------------------------------------------------------------------------
// StreamField
// ---------------------------------------------------------------------------

/// Ordered sequence of blocks. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamField(Vec<StreamBlock>);

impl StreamField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, block: Block) {
        self.0.push(StreamBlock::new(block));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StreamBlock> {
        self.0.iter()
    }

    /// Blocks a consumer should act on, in stored order.
    pub fn known_blocks(&self) -> impl Iterator<Item = &Block> {
        self.0.iter().map(|b| &b.block).filter(|b| b.is_known())
    }

    /// Block kinds in stored order, unknown kinds included.
    pub fn kinds(&self) -> Vec<&str> {
        self.0.iter().map(|b| b.block.kind()).collect()
    }

    /// Every page id referenced by `cities_gallery` blocks.
    pub fn referenced_pages(&self) -> Vec<DbId> {
        self.known_blocks()
            .filter_map(|b| match b {
                Block::CitiesGallery(ids) => Some(ids.iter().copied()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Concatenated plain text of all text-bearing blocks.
    pub fn text(&self) -> String {
        self.known_blocks()
            .filter_map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        self.0.iter().try_for_each(|b| b.block.validate())
    }
}

impl FromIterator<Block> for StreamField {
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        Self(iter.into_iter().map(StreamBlock::new).collect())
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Rich text
// ---------------------------------------------------------------------------

/// Tags that separate words when rendered. Inline tags (`b`, `i`, `a`, ...)
/// are dropped without a gap so markup inside a word keeps it whole.
const BREAKING_TAGS: &[&str] = &[
    "address", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "figure", "h1", "h2",
    "h3", "h4", "h5", "h6", "hr", "li", "ol", "p", "pre", "section", "table", "td", "th", "tr",
    "ul",
];

fn is_breaking_tag(tag: &str) -> bool {
    let name: String = tag
        .trim_start_matches('/')
        .chars()
        .take_while(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    BREAKING_TAGS.contains(&name.as_str())
}

/// Strip markup from a rich-text HTML fragment, decode character
/// references and collapse whitespace.
pub fn plain_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tag = &rest[start + 1..];
        let end = tag.find('>').unwrap_or(tag.len());
        if is_breaking_tag(&tag[..end]) {
            out.push(' ');
        }
        rest = tag.get(end + 1..).unwrap_or_default();
    }
    out.push_str(rest);

    html_escape::decode_html_entities(&out)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
