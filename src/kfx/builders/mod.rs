//! Fragment builders.
//!
//! One pure function per logical fragment. Each takes document-derived
//! inputs and returns an [`IonValue`](crate::kfx::ion::IonValue) or a
//! [`Fragment`](crate::kfx::fragment::Fragment); none of them touch the
//! fragment graph, the symbol table or the filesystem.
//!
//! ## Module structure
//!
//! - `metadata` - `$490` book metadata and the fixed-width content id
//! - `document` - `$538` document data, reading orders, `$258`, sections, `$395`
//! - `resource` - `$164` external resources and their names
//! - `entity_map` - `$419` container entity map
//! - `features` - `$585` conversion features and `$593` format capabilities

pub mod document;
pub mod entity_map;
pub mod features;
pub mod metadata;
pub mod resource;

pub use document::{
    build_document_data, build_metadata, build_reading_orders, build_resource_path, build_section,
};
pub use entity_map::{EntityDependency, build_entity_map};
pub use features::{build_content_features, build_format_capabilities};
pub use metadata::{BookMetadataInput, build_book_metadata, content_id};
pub use resource::{build_external_resource, image_format_symbol, resource_location, resource_name};

/// Uppercase base36 of a positive index, "0" for anything else.
pub(crate) fn to_base36(mut value: usize) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[value % 36]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
