//! JSON:API 1.0 document model.
//!
//! The remote people API answers every request with a `{data, included,
//! links, meta}` document. Primary data is either a single resource or a
//! list; `included` carries the relationship resources requested via
//! `include=`. The model is deliberately tolerant: unknown fields are
//! ignored and every section defaults to empty.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A top-level JSON:API document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PrimaryData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
    #[serde(default, skip_serializing_if = "Meta::is_empty")]
    pub meta: Meta,
}

impl Document {
    /// View the primary data as a slice, regardless of arity.
    pub fn resources(&self) -> &[Resource] {
        match &self.data {
            Some(PrimaryData::Many(resources)) => resources,
            Some(PrimaryData::One(resource)) => std::slice::from_ref(resource.as_ref()),
            None => &[],
        }
    }

    /// Whether the document carried a single primary resource.
    pub fn is_single(&self) -> bool {
        matches!(self.data, Some(PrimaryData::One(_)))
    }

    /// Extract the next-page token, whichever pagination style the server
    /// used: a fully-qualified `links.next` URL (covers cursor-based
    /// servers, the link is opaque) or an offset in `meta.next.offset`.
    pub fn next_page(&self) -> Option<NextPage> {
        if let Some(url) = &self.links.next {
            return Some(NextPage::Url(url.clone()));
        }
        self.meta
            .next
            .as_ref()
            .map(|next| NextPage::Offset(next.offset))
    }
}

/// Primary data: one resource or many.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryData {
    Many(Vec<Resource>),
    One(Box<Resource>),
}

/// Token for fetching the page after this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// Opaque fully-qualified URL from `links.next`.
    Url(String),
    /// Offset into the collection from `meta.next.offset`.
    Offset(u64),
}

/// A typed, identified resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub attributes: serde_json::Map<String, Value>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub relationships: HashMap<String, Relationship>,
}

impl Resource {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            attributes: serde_json::Map::new(),
            relationships: HashMap::new(),
        }
    }

    /// The (type, id) pair that identifies this resource document-wide.
    pub fn key(&self) -> (String, String) {
        (self.kind.clone(), self.id.clone())
    }
}

/// A relationship entry under a resource's `relationships` map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<RelationshipData>,
}

/// Relationship linkage: a single reference or an ordered list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationshipData {
    Many(Vec<ResourceIdentifier>),
    One(ResourceIdentifier),
}

/// A `{type, id}` reference into `included`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

/// Top-level `links` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Links {
    #[serde(default, rename = "self", skip_serializing_if = "Option::is_none")]
    pub this: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

impl Links {
    pub fn is_empty(&self) -> bool {
        self.this.is_none() && self.next.is_none() && self.prev.is_none()
    }
}

/// Top-level `meta` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<NextOffset>,
}

impl Meta {
    pub fn is_empty(&self) -> bool {
        self.total_count.is_none() && self.count.is_none() && self.next.is_none()
    }
}

/// Offset-style next-page marker inside `meta`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextOffset {
    pub offset: u64,
}
