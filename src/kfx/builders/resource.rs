//! `$164` external resource descriptors.

use super::to_base36;
use crate::kfx::ion::IonValue;
use crate::kfx::symbols::{SymbolId, sym};

/// Location of the `idx`-th resource (1-based): `resource/rsrc{BASE36}`.
pub fn resource_location(idx: usize) -> String {
    format!("resource/rsrc{}", to_base36(idx))
}

/// Name of the `idx`-th resource (1-based): `e{BASE36}`.
pub fn resource_name(idx: usize) -> String {
    format!("e{}", to_base36(idx))
}

/// Map an image MIME type to its format symbol.
pub fn image_format_symbol(mime: &str) -> Option<SymbolId> {
    match mime.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some(sym::JPG),
        "image/png" => Some(sym::PNG),
        "image/gif" => Some(sym::GIF),
        _ => None,
    }
}

/// Build a `$164` value.
///
/// Width and height are only written when positive.
pub fn build_external_resource(
    name: &str,
    location: &str,
    format: SymbolId,
    mime: &str,
    width: u32,
    height: u32,
) -> IonValue {
    let mut res = IonValue::structure()
        .set_symbol_name(sym::RESOURCE_NAME, name)
        .set_str(sym::LOCATION, location)
        .set_symbol(sym::FORMAT, format)
        .set_str(sym::MIME, mime);
    if width > 0 {
        res = res.set_int(sym::RESOURCE_WIDTH, i64::from(width));
    }
    if height > 0 {
        res = res.set_int(sym::RESOURCE_HEIGHT, i64::from(height));
    }
    res.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_naming() {
        assert_eq!(resource_location(1), "resource/rsrc1");
        assert_eq!(resource_location(46), "resource/rsrc1A");
        assert_eq!(resource_name(36), "e10");
    }

    #[test]
    fn test_image_format_symbol() {
        assert_eq!(image_format_symbol("image/jpeg"), Some(sym::JPG));
        assert_eq!(image_format_symbol(" IMAGE/PNG "), Some(sym::PNG));
        assert_eq!(image_format_symbol("image/gif"), Some(sym::GIF));
        assert_eq!(image_format_symbol("image/svg+xml"), None);
    }

    #[test]
    fn test_external_resource_dimensions() {
        let res = build_external_resource("e1", "resource/rsrc1", sym::PNG, "image/png", 600, 0);
        assert_eq!(
            res.get(sym::RESOURCE_NAME).and_then(|v| v.as_symbol_name()),
            Some("e1")
        );
        assert_eq!(res.get(sym::FORMAT), Some(&IonValue::Symbol(sym::PNG)));
        assert_eq!(res.get(sym::RESOURCE_WIDTH).and_then(|v| v.as_int()), Some(600));
        assert!(res.get(sym::RESOURCE_HEIGHT).is_none());
    }
}
