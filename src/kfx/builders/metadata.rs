//! `$490` book metadata.
//!
//! Categorised key/value metadata read by the Kindle library view. The reader
//! validates this fragment strictly, so missing values are replaced by
//! placeholders instead of being left empty.

use crate::kfx::ion::IonValue;
use crate::kfx::symbols::sym;

/// Width of the content id (and ASIN) field.
pub const CONTENT_ID_LEN: usize = 32;

/// Placeholder for a book without authors.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Placeholder for a book without a title.
pub const UNTITLED: &str = "Untitled";

/// Language used when the book does not declare one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Borrowed inputs of [`build_book_metadata`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BookMetadataInput<'a> {
    pub title: &'a str,
    pub authors: &'a [String],
    pub language: &'a str,
    pub description: &'a str,
    pub document_id: &'a str,
    /// Container id, reported as the asset id
    pub container_id: &'a str,
    /// Resource name of the cover image
    pub cover_resource: Option<&'a str>,
    /// Reported as the file creator; empty means this crate's name
    pub application_name: &'a str,
}

/// Derive the fixed-width content id from a document id.
///
/// Non-alphanumeric characters are dropped, the rest upper-cased, and the
/// result padded with `'0'` or truncated to exactly 32 characters.
pub fn content_id(document_id: &str) -> String {
    let mut id: String = document_id
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .take(CONTENT_ID_LEN)
        .collect();
    while id.len() < CONTENT_ID_LEN {
        id.push('0');
    }
    id
}

/// Build the `$490` value: `{$491: [title, audit, ebook, capability groups]}`.
pub fn build_book_metadata(input: &BookMetadataInput<'_>) -> IonValue {
    let content_id = content_id(input.document_id);

    let title = match input.title.trim() {
        "" => UNTITLED,
        t => t,
    };
    let language = match input.language.trim() {
        "" => DEFAULT_LANGUAGE,
        l => l,
    };

    let mut authors: Vec<&str> = input
        .authors
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .collect();
    if authors.is_empty() {
        authors.push(UNKNOWN_AUTHOR);
    }

    // Keys in ascending order.
    let mut title_items = vec![
        entry("ASIN", IonValue::from(content_id.as_str())),
        entry("asset_id", IonValue::from(input.container_id)),
    ];
    title_items.extend(authors.iter().map(|a| entry("author", IonValue::from(*a))));
    if !input.document_id.is_empty() {
        title_items.push(entry("book_id", IonValue::from(input.document_id)));
    }
    title_items.push(entry("cde_content_type", IonValue::from("PDOC")));
    title_items.push(entry("content_id", IonValue::from(content_id.as_str())));
    if let Some(cover) = input.cover_resource {
        title_items.push(entry("cover_image", IonValue::from(cover)));
    }
    if !input.description.trim().is_empty() {
        title_items.push(entry("description", IonValue::from(input.description.trim())));
    }
    title_items.push(entry("is_sample", IonValue::Bool(false)));
    title_items.push(entry("language", IonValue::from(language)));
    title_items.push(entry("override_kindle_font", IonValue::Bool(false)));
    title_items.push(entry("title", IonValue::from(title)));

    let creator = match input.application_name.trim() {
        "" => env!("CARGO_PKG_NAME"),
        name => name,
    };
    let audit_items = vec![
        entry("creator_version", IonValue::from(env!("CARGO_PKG_VERSION"))),
        entry("file_creator", IonValue::from(creator)),
    ];

    let ebook_items = vec![
        entry("nested_span", IonValue::from("enabled")),
        entry("selection", IonValue::from("enabled")),
    ];

    IonValue::structure()
        .set_list(
            sym::CATEGORISED_METADATA,
            vec![
                group("kindle_title_metadata", title_items),
                group("kindle_audit_metadata", audit_items),
                group("kindle_ebook_metadata", ebook_items),
                // Required even when empty.
                group("kindle_capability_metadata", Vec::new()),
            ],
        )
        .build()
}

/// `{$492: key, $307: value}`
fn entry(key: &str, value: IonValue) -> IonValue {
    IonValue::structure()
        .set_str(sym::KEY, key)
        .set(sym::VALUE, value)
        .build()
}

/// `{$495: category, $258: entries}`
fn group(category: &str, entries: Vec<IonValue>) -> IonValue {
    IonValue::structure()
        .set_str(sym::CATEGORY, category)
        .set_list(sym::METADATA, entries)
        .build()
}
