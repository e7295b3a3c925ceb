//! # kfxbuild
//!
//! Encodes a laid-out book as a KFX (KF10) container: the Ion fragment
//! graph a Kindle reader expects, its document-local symbol table and the
//! `CONT` binary that packs them.
//!
//! ## Features
//!
//! - Document data, reading orders, sections and external resources
//! - Book metadata, conversion features and format capabilities
//! - Navigation: nested TOC, landmarks and an approximate page list
//! - CSS compiled into named KFX styles, with `::before`/`::after` content
//! - Deterministic output: the same input always gives the same bytes
//!
//! ## Quick Start
//!
//! ```
//! use kfxbuild::{BookSummary, KfxBookBuilder, KfxConfig, PositionItem, Stylesheet, TocEntry};
//! use kfxbuild::book::SectionSummary;
//!
//! let book = BookSummary::new("My Book")
//!     .with_author("Author Name")
//!     .with_language("en")
//!     .with_document_id("my-book")
//!     .with_section(SectionSummary::new("c0"));
//! let toc = vec![TocEntry::new("Chapter 1", 1001)];
//! let positions = vec![PositionItem::new(1001, 5000)];
//! let sheet = Stylesheet::parse("p { text-indent: 1.5em }");
//!
//! let output = KfxBookBuilder::new(&book)
//!     .with_toc(&toc)
//!     .with_positions(&positions)
//!     .with_stylesheet(&sheet)
//!     .with_config(KfxConfig::default().with_page_size(2300))
//!     .build()
//!     .unwrap();
//!
//! let bytes = output.to_bytes().unwrap();
//! assert_eq!(&bytes[0..4], b"CONT");
//! ```

pub mod book;
pub mod config;
pub mod css;
pub mod error;
pub mod kfx;

pub use book::{BookSummary, PositionItem, ResourceInfo, SectionSummary, TocEntry};
pub use config::{KfxConfig, LandmarkInfo};
pub use css::Stylesheet;
pub use error::{Error, Result};
pub use kfx::{BuildOutput, KfxBookBuilder};
