//! Read-only description of the book being encoded.
//!
//! The layout stage that produces these values lives outside this crate;
//! the fragment builders only read them.

use std::collections::BTreeMap;

/// Summary of the source document.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct BookSummary {
    pub title: String,
    pub authors: Vec<String>,
    /// BCP 47 language tag; empty means unknown
    pub language: String,
    /// Plain-text annotation
    pub description: String,
    /// Stable document identifier, the source of the content id
    pub document_id: String,
    /// Key into `resources` of the cover image
    pub cover_resource: Option<String>,
    /// Sections in reading order
    pub sections: Vec<SectionSummary>,
    /// External resources by source id; iterated in id order
    pub resources: BTreeMap<String, ResourceInfo>,
}

impl BookSummary {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_document_id(mut self, id: impl Into<String>) -> Self {
        self.document_id = id.into();
        self
    }

    pub fn with_section(mut self, section: SectionSummary) -> Self {
        self.sections.push(section);
        self
    }

    pub fn with_resource(mut self, id: impl Into<String>, resource: ResourceInfo) -> Self {
        self.resources.insert(id.into(), resource);
        self
    }

    /// Section names in reading order.
    pub fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }
}

/// One section of the reading order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
pub struct SectionSummary {
    /// Section name; becomes a local symbol
    pub name: String,
    /// Source ids of the resources this section displays
    #[cfg_attr(feature = "cli", serde(default))]
    pub resources: Vec<String>,
}

impl SectionSummary {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resources: Vec::new(),
        }
    }

    pub fn with_resource(mut self, id: impl Into<String>) -> Self {
        self.resources.push(id.into());
        self
    }
}

/// An external resource (image) referenced by the content.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct ResourceInfo {
    /// Location inside the container; generated when absent
    pub location: Option<String>,
    pub mime: String,
    pub width: u32,
    pub height: u32,
    /// Embedded bytes, emitted as a raw media fragment when present
    #[cfg_attr(feature = "cli", serde(deserialize_with = "base64_data::deserialize"))]
    pub data: Option<Vec<u8>>,
}

impl ResourceInfo {
    pub fn new(mime: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            mime: mime.into(),
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = Some(data);
        self
    }
}

/// A node of the table-of-contents tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
pub struct TocEntry {
    pub title: String,
    /// Element id the entry targets
    pub first_eid: i64,
    /// False for entries kept in the tree but left out of the rendered TOC
    #[cfg_attr(feature = "cli", serde(default = "default_true"))]
    pub include_in_toc: bool,
    #[cfg_attr(feature = "cli", serde(default))]
    pub children: Vec<TocEntry>,
}

impl TocEntry {
    pub fn new(title: impl Into<String>, first_eid: i64) -> Self {
        Self {
            title: title.into(),
            first_eid,
            include_in_toc: true,
            children: Vec::new(),
        }
    }

    /// Mark this entry as excluded from the rendered TOC.
    pub fn hidden(mut self) -> Self {
        self.include_in_toc = false;
        self
    }

    pub fn with_child(mut self, child: TocEntry) -> Self {
        self.children.push(child);
        self
    }

    /// Number of included entries in this subtree.
    pub fn included_count(&self) -> usize {
        usize::from(self.include_in_toc)
            + self
                .children
                .iter()
                .map(TocEntry::included_count)
                .sum::<usize>()
    }
}

#[cfg(feature = "cli")]
fn default_true() -> bool {
    true
}

/// One element of the linear reading order, with its renderable length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
pub struct PositionItem {
    pub eid: i64,
    pub length: i64,
}

impl PositionItem {
    pub fn new(eid: i64, length: i64) -> Self {
        Self { eid, length }
    }
}

#[cfg(feature = "cli")]
mod base64_data {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|s| STANDARD.decode(s.trim()).map_err(serde::de::Error::custom))
            .transpose()
    }
}
