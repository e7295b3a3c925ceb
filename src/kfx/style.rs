//! Sparse KFX style records and CSS property compilation.
//!
//! A [`Style`] holds only the properties a rule actually sets; anything CSS
//! can say that has no `$157` field is dropped. Values that look like they
//! should convert but don't (an unknown unit, an unparsable color) produce a
//! warning string instead.

use std::collections::BTreeMap;

use crate::css::{CssRule, CssValue};
use crate::kfx::builders::document::dimension;
use crate::kfx::ion::{Decimal, IonValue};
use crate::kfx::symbols::{SymbolId, sym};

// ============================================================================
// Style values
// ============================================================================

/// One typed property value.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Symbol(SymbolId),
    /// `{$307: value, $306: unit}`
    Dimension {
        value: Decimal,
        unit: SymbolId,
    },
    /// Packed `0xAARRGGBB`
    Color(u32),
    Bool(bool),
    String(String),
}

impl StyleValue {
    pub fn dimension(value: f64, unit: SymbolId) -> Self {
        StyleValue::Dimension {
            value: Decimal::from_f64(value),
            unit,
        }
    }

    pub fn to_ion(&self) -> IonValue {
        match self {
            StyleValue::Symbol(id) => IonValue::Symbol(*id),
            StyleValue::Dimension { value, unit } => dimension(*value, *unit),
            StyleValue::Color(argb) => IonValue::Int(i64::from(*argb)),
            StyleValue::Bool(b) => IonValue::Bool(*b),
            StyleValue::String(s) => IonValue::String(s.clone()),
        }
    }
}

// ============================================================================
// Style
// ============================================================================

/// A sparse set of style properties keyed by their symbol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    properties: BTreeMap<SymbolId, StyleValue>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing any earlier value.
    pub fn set(&mut self, property: SymbolId, value: StyleValue) {
        self.properties.insert(property, value);
    }

    pub fn get(&self, property: SymbolId) -> Option<&StyleValue> {
        self.properties.get(&property)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Properties in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &StyleValue)> {
        self.properties.iter().map(|(k, v)| (*k, v))
    }

    /// Overlay `other` on top of this style; its values win.
    pub fn merge(&mut self, other: &Style) {
        for (property, value) in other.iter() {
            self.set(property, value.clone());
        }
    }

    /// Build the `$157` value: `$173` names the style, properties follow in
    /// symbol order.
    pub fn to_ion(&self, name: &str) -> IonValue {
        let mut builder = IonValue::structure().set_symbol_name(sym::STYLE_NAME, name);
        for (property, value) in self.iter() {
            builder = builder.set(property, value.to_ion());
        }
        builder.build()
    }
}

// ============================================================================
// CSS compilation
// ============================================================================

/// Compile the declarations of one rule.
pub fn compile_rule(rule: &CssRule, warnings: &mut Vec<String>) -> Style {
    let mut style = Style::new();
    for (name, value) in &rule.properties {
        apply_property(&mut style, name, value, warnings);
    }
    style
}

/// Apply one declaration to `style`.
pub fn apply_property(style: &mut Style, name: &str, value: &CssValue, warnings: &mut Vec<String>) {
    if matches!(value.keyword_str(), "inherit" | "initial" | "unset") {
        return;
    }

    if let Some(property) = length_property(name) {
        if let Some(converted) = length_value(name, value, warnings) {
            style.set(property, converted);
        }
        return;
    }

    match name {
        "font-weight" => {
            if let Some(weight) = font_weight(value) {
                style.set(sym::FONT_WEIGHT, StyleValue::Symbol(weight));
            }
        }
        "font-style" => match value.keyword_str() {
            "italic" | "oblique" => style.set(sym::FONT_STYLE, StyleValue::Symbol(sym::ITALIC)),
            "normal" => style.set(sym::FONT_STYLE, StyleValue::Symbol(sym::NORMAL)),
            _ => {}
        },
        "font-family" => {
            if let Some(family) = first_font_family(&value.raw) {
                style.set(sym::FONT_FAMILY, StyleValue::String(family));
            }
        }
        "text-align" => {
            let align = match value.keyword_str() {
                "left" => Some(sym::LEFT),
                "right" => Some(sym::RIGHT),
                "center" => Some(sym::CENTER),
                "justify" => Some(sym::JUSTIFY),
                "start" => Some(sym::START),
                "end" => Some(sym::END),
                _ => None,
            };
            if let Some(align) = align {
                style.set(sym::TEXT_ALIGNMENT, StyleValue::Symbol(align));
            }
        }
        "float" => {
            let float = match value.keyword_str() {
                "left" => Some(sym::LEFT),
                "right" => Some(sym::RIGHT),
                "none" => Some(sym::NONE),
                _ => None,
            };
            if let Some(float) = float {
                style.set(sym::FLOAT, StyleValue::Symbol(float));
            }
        }
        "color" => set_color(style, sym::TEXT_COLOR, value, warnings),
        "background-color" => set_color(style, sym::FILL_COLOR, value, warnings),
        "border-color" => set_color(style, sym::BORDER_COLOR, value, warnings),
        "border-style" => {
            if let Some(border) = border_style(value.keyword_str()) {
                style.set(sym::BORDER_STYLE, StyleValue::Symbol(border));
            }
        }
        "border-width" => {
            if let Some(width) = length_value(name, value, warnings) {
                style.set(sym::BORDER_WEIGHT, width);
            }
        }
        "border" => apply_border_shorthand(style, value, warnings),
        "text-decoration" | "text-decoration-line" => {
            let keyword = value.keyword_str();
            if keyword == "none" {
                style.set(sym::UNDERLINE, StyleValue::Bool(false));
                style.set(sym::STRIKETHROUGH, StyleValue::Bool(false));
            } else {
                for part in keyword.split_whitespace() {
                    match part {
                        "underline" => style.set(sym::UNDERLINE, StyleValue::Bool(true)),
                        "line-through" => style.set(sym::STRIKETHROUGH, StyleValue::Bool(true)),
                        _ => {}
                    }
                }
            }
        }
        "vertical-align" => match value.keyword_str() {
            "super" => style.set(sym::BASELINE_STYLE, StyleValue::Symbol(sym::SUPERSCRIPT)),
            "sub" => style.set(sym::BASELINE_STYLE, StyleValue::Symbol(sym::SUBSCRIPT)),
            "baseline" => style.set(sym::BASELINE_SHIFT, StyleValue::dimension(0.0, sym::UNIT_EM)),
            _ if value.is_numeric() => {
                if let Some(shift) = length_value(name, value, warnings) {
                    style.set(sym::BASELINE_SHIFT, shift);
                }
            }
            _ => {}
        },
        "display" => {
            if value.keyword_str() == "block" {
                style.set(sym::RENDER, StyleValue::Symbol(sym::BLOCK));
            }
        }
        "page-break-before" => {
            if let Some(keep) = page_break(value.keyword_str()) {
                style.set(sym::KEEP_FIRST, StyleValue::Symbol(keep));
            }
        }
        "page-break-after" => {
            if let Some(keep) = page_break(value.keyword_str()) {
                style.set(sym::KEEP_LAST, StyleValue::Symbol(keep));
            }
        }
        "page-break-inside" => {
            if value.keyword_str() == "avoid" {
                style.set(sym::KEEP_FIRST, StyleValue::Symbol(sym::AVOID));
                style.set(sym::KEEP_LAST, StyleValue::Symbol(sym::AVOID));
            }
        }
        "margin" => apply_box_shorthand(style, value, MARGIN_SIDES, warnings),
        "padding" => apply_box_shorthand(style, value, PADDING_SIDES, warnings),
        _ => {}
    }
}

/// Properties whose value is a single length.
fn length_property(name: &str) -> Option<SymbolId> {
    Some(match name {
        "font-size" => sym::FONT_SIZE,
        "line-height" => sym::LINE_HEIGHT,
        "letter-spacing" => sym::LETTERSPACING,
        "text-indent" => sym::TEXT_INDENT,
        "margin-top" => sym::MARGIN_TOP,
        "margin-bottom" => sym::MARGIN_BOTTOM,
        "margin-left" => sym::MARGIN_LEFT,
        "margin-right" => sym::MARGIN_RIGHT,
        "padding-top" => sym::PADDING_TOP,
        "padding-right" => sym::PADDING_RIGHT,
        "padding-bottom" => sym::PADDING_BOTTOM,
        "padding-left" => sym::PADDING_LEFT,
        "width" => sym::WIDTH,
        "height" => sym::HEIGHT,
        "min-height" => sym::MIN_HEIGHT,
        _ => return None,
    })
}

/// Convert a length value; `auto` maps to the auto symbol.
///
/// Non-numeric keywords are dropped silently.
fn length_value(name: &str, value: &CssValue, warnings: &mut Vec<String>) -> Option<StyleValue> {
    if value.keyword_str() == "auto" {
        return Some(StyleValue::Symbol(sym::AUTO));
    }
    if !value.is_numeric() {
        return None;
    }
    match convert_length(value.value, value.unit_str()) {
        Ok(converted) => Some(converted),
        Err(unit) => {
            warnings.push(format!("unable to convert {name}: unsupported unit: {unit}"));
            None
        }
    }
}

/// Map a number and CSS unit to a dimension. Returns the unit on failure.
pub fn convert_length(value: f64, unit: &str) -> Result<StyleValue, String> {
    let (value, unit) = match unit {
        "em" => (value, sym::UNIT_EM),
        "ex" => (value, sym::UNIT_EX),
        "%" => (value / 100.0, sym::UNIT_RATIO),
        "" => (value, sym::UNIT_RATIO),
        "px" => (value, sym::UNIT_PX),
        "pt" => (value, sym::UNIT_PT),
        "cm" => (value, sym::UNIT_CM),
        "mm" => (value, sym::UNIT_MM),
        "in" => (value, sym::UNIT_IN),
        "rem" => (value, sym::UNIT_REM),
        other => return Err(other.to_string()),
    };
    Ok(StyleValue::dimension(value, unit))
}

/// Split a length token like `1.5em` into number and lowercase unit.
fn split_length(token: &str) -> Option<(f64, String)> {
    let end = token
        .char_indices()
        .find(|&(_, c)| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+')))
        .map_or(token.len(), |(i, _)| i);
    if end == 0 {
        return None;
    }
    let number = token[..end].parse::<f64>().ok()?;
    Some((number, token[end..].to_ascii_lowercase()))
}

fn font_weight(value: &CssValue) -> Option<SymbolId> {
    match value.keyword_str() {
        "bold" | "bolder" => return Some(sym::BOLD),
        "lighter" => return Some(sym::LIGHT),
        "medium" => return Some(sym::MEDIUM),
        "normal" => return Some(sym::NORMAL),
        "" => {}
        _ => return None,
    }
    if value.unit.is_some() || !value.is_numeric() {
        return None;
    }
    let weight = value.value.round() as i64;
    Some(match weight {
        w if w >= 700 => sym::BOLD,
        600 => sym::SEMIBOLD,
        500 => sym::MEDIUM,
        w if w <= 300 => sym::LIGHT,
        _ => sym::NORMAL,
    })
}

fn first_font_family(raw: &str) -> Option<String> {
    let family = raw
        .split(',')
        .next()?
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim();
    (!family.is_empty()).then(|| family.to_string())
}

fn border_style(keyword: &str) -> Option<SymbolId> {
    match keyword {
        "solid" | "double" | "groove" | "ridge" | "inset" | "outset" => Some(sym::SOLID),
        "dashed" => Some(sym::DASHED),
        "dotted" => Some(sym::DOTTED),
        "none" | "hidden" => Some(sym::NONE),
        _ => None,
    }
}

fn page_break(keyword: &str) -> Option<SymbolId> {
    match keyword {
        "always" | "page" | "left" | "right" => Some(sym::ALWAYS),
        "avoid" => Some(sym::AVOID),
        "auto" => Some(sym::AUTO),
        _ => None,
    }
}

fn set_color(style: &mut Style, property: SymbolId, value: &CssValue, warnings: &mut Vec<String>) {
    let text = value.keyword.as_deref().unwrap_or(&value.raw);
    match parse_color(text) {
        Some(argb) => style.set(property, StyleValue::Color(argb)),
        None => warnings.push(format!("unable to parse color: {}", value.raw)),
    }
}

/// `border: 1px solid #000`, tokens in any order.
fn apply_border_shorthand(style: &mut Style, value: &CssValue, warnings: &mut Vec<String>) {
    for token in value.raw.split_whitespace() {
        let lower = token.to_ascii_lowercase();
        if let Some(border) = border_style(&lower) {
            style.set(sym::BORDER_STYLE, StyleValue::Symbol(border));
        } else if let Some((number, unit)) = split_length(&lower) {
            match convert_length(number, &unit) {
                Ok(width) => style.set(sym::BORDER_WEIGHT, width),
                Err(unit) => {
                    warnings.push(format!("unable to convert border: unsupported unit: {unit}"));
                }
            }
        } else if let Some(argb) = parse_color(token) {
            style.set(sym::BORDER_COLOR, StyleValue::Color(argb));
        }
    }
}

/// Top, right, bottom, left.
const MARGIN_SIDES: [SymbolId; 4] = [
    sym::MARGIN_TOP,
    sym::MARGIN_RIGHT,
    sym::MARGIN_BOTTOM,
    sym::MARGIN_LEFT,
];
const PADDING_SIDES: [SymbolId; 4] = [
    sym::PADDING_TOP,
    sym::PADDING_RIGHT,
    sym::PADDING_BOTTOM,
    sym::PADDING_LEFT,
];

/// `margin` or `padding` with 1 to 4 values, expanded the CSS way.
fn apply_box_shorthand(
    style: &mut Style,
    value: &CssValue,
    sides: [SymbolId; 4],
    warnings: &mut Vec<String>,
) {
    let mut parts = Vec::new();
    for token in value.raw.split_whitespace() {
        let converted = if token.eq_ignore_ascii_case("auto") {
            Some(StyleValue::Symbol(sym::AUTO))
        } else {
            split_length(token).and_then(|(number, unit)| convert_length(number, &unit).ok())
        };
        match converted {
            Some(v) => parts.push(v),
            None => {
                warnings.push(format!("invalid shorthand value: {}", value.raw));
                return;
            }
        }
    }

    let (top, right, bottom, left) = match parts.as_slice() {
        [all] => (all, all, all, all),
        [vertical, horizontal] => (vertical, horizontal, vertical, horizontal),
        [top, horizontal, bottom] => (top, horizontal, bottom, horizontal),
        [top, right, bottom, left] => (top, right, bottom, left),
        _ => {
            warnings.push(format!("invalid shorthand value: {}", value.raw));
            return;
        }
    };
    let [top_sym, right_sym, bottom_sym, left_sym] = sides;
    style.set(top_sym, top.clone());
    style.set(right_sym, right.clone());
    style.set(bottom_sym, bottom.clone());
    style.set(left_sym, left.clone());
}

// ============================================================================
// Colors
// ============================================================================

const NAMED_COLORS: &[(&str, (u8, u8, u8))] = &[
    ("black", (0, 0, 0)),
    ("white", (255, 255, 255)),
    ("red", (255, 0, 0)),
    ("green", (0, 128, 0)),
    ("blue", (0, 0, 255)),
    ("gray", (128, 128, 128)),
    ("grey", (128, 128, 128)),
    ("silver", (192, 192, 192)),
    ("maroon", (128, 0, 0)),
    ("navy", (0, 0, 128)),
    ("teal", (0, 128, 128)),
    ("olive", (128, 128, 0)),
    ("purple", (128, 0, 128)),
    ("fuchsia", (255, 0, 255)),
    ("magenta", (255, 0, 255)),
    ("aqua", (0, 255, 255)),
    ("cyan", (0, 255, 255)),
    ("lime", (0, 255, 0)),
    ("yellow", (255, 255, 0)),
    ("orange", (255, 165, 0)),
    ("brown", (165, 42, 42)),
    ("pink", (255, 192, 203)),
];

/// Parse `#rgb`, `#rrggbb`, `rgb()`/`rgba()` or a basic named color into
/// opaque ARGB.
pub fn parse_color(text: &str) -> Option<u32> {
    let text = text.trim().to_ascii_lowercase();
    let (r, g, b) = if let Some(hex) = text.strip_prefix('#') {
        parse_hex(hex)?
    } else if let Some(args) = text
        .strip_prefix("rgba(")
        .or_else(|| text.strip_prefix("rgb("))
    {
        parse_rgb_args(args.strip_suffix(')')?)?
    } else {
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == text)
            .map(|(_, rgb)| *rgb)?
    };
    Some(0xFF00_0000 | u32::from(r) << 16 | u32::from(g) << 8 | u32::from(b))
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digit = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
    match hex.len() {
        3 => Some((digit(0)? * 17, digit(1)? * 17, digit(2)? * 17)),
        6 => {
            let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
            Some((byte(0)?, byte(2)?, byte(4)?))
        }
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<(u8, u8, u8)> {
    let mut channels = args.split(',').map(|part| {
        let part = part.trim();
        match part.strip_suffix('%') {
            Some(pct) => pct
                .trim()
                .parse::<f64>()
                .ok()
                .map(|p| (p.clamp(0.0, 100.0) * 2.55).round() as u8),
            None => part.parse::<f64>().ok().map(|v| v.clamp(0.0, 255.0).round() as u8),
        }
    });
    let r = channels.next()??;
    let g = channels.next()??;
    let b = channels.next()??;
    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::Stylesheet;

    fn compile(css: &str) -> (Style, Vec<String>) {
        let sheet = Stylesheet::parse(css);
        let rules = sheet.kfx_rules();
        let mut warnings = Vec::new();
        let style = compile_rule(rules[0], &mut warnings);
        (style, warnings)
    }

    #[test]
    fn test_length_units() {
        let (style, warnings) = compile(
            ".x { font-size: 1.5em; line-height: 1.2; width: 50%; margin-top: 12pt; text-indent: 0 }",
        );
        assert!(warnings.is_empty());
        assert_eq!(
            style.get(sym::FONT_SIZE),
            Some(&StyleValue::Dimension {
                value: Decimal::new(15, -1),
                unit: sym::UNIT_EM
            })
        );
        assert_eq!(
            style.get(sym::LINE_HEIGHT),
            Some(&StyleValue::Dimension {
                value: Decimal::new(12, -1),
                unit: sym::UNIT_RATIO
            })
        );
        assert_eq!(
            style.get(sym::WIDTH),
            Some(&StyleValue::Dimension {
                value: Decimal::new(5, -1),
                unit: sym::UNIT_RATIO
            })
        );
        assert_eq!(
            style.get(sym::MARGIN_TOP),
            Some(&StyleValue::Dimension {
                value: Decimal::new(12, 0),
                unit: sym::UNIT_PT
            })
        );
        assert_eq!(
            style.get(sym::TEXT_INDENT),
            Some(&StyleValue::Dimension {
                value: Decimal::new(0, 0),
                unit: sym::UNIT_RATIO
            })
        );
    }

    #[test]
    fn test_unsupported_unit_warns() {
        let (style, warnings) = compile(".x { font-size: 2vw }");
        assert!(style.is_empty());
        assert_eq!(warnings, vec!["unable to convert font-size: unsupported unit: vw"]);
    }

    #[test]
    fn test_keywords() {
        let (style, _) = compile(
            ".x { font-weight: 600; font-style: oblique; text-align: justify; \
             float: right; display: block; margin-left: auto; line-height: normal }",
        );
        assert_eq!(style.get(sym::FONT_WEIGHT), Some(&StyleValue::Symbol(sym::SEMIBOLD)));
        assert_eq!(style.get(sym::FONT_STYLE), Some(&StyleValue::Symbol(sym::ITALIC)));
        assert_eq!(style.get(sym::TEXT_ALIGNMENT), Some(&StyleValue::Symbol(sym::JUSTIFY)));
        assert_eq!(style.get(sym::FLOAT), Some(&StyleValue::Symbol(sym::RIGHT)));
        assert_eq!(style.get(sym::RENDER), Some(&StyleValue::Symbol(sym::BLOCK)));
        assert_eq!(style.get(sym::MARGIN_LEFT), Some(&StyleValue::Symbol(sym::AUTO)));
        assert!(style.get(sym::LINE_HEIGHT).is_none());
    }

    #[test]
    fn test_font_weight_numbers() {
        for (css, expected) in [
            ("bold", sym::BOLD),
            ("900", sym::BOLD),
            ("500", sym::MEDIUM),
            ("400", sym::NORMAL),
            ("200", sym::LIGHT),
            ("lighter", sym::LIGHT),
        ] {
            let (style, _) = compile(&format!(".x {{ font-weight: {css} }}"));
            assert_eq!(
                style.get(sym::FONT_WEIGHT),
                Some(&StyleValue::Symbol(expected)),
                "font-weight: {css}"
            );
        }
    }

    #[test]
    fn test_colors() {
        assert_eq!(parse_color("#f00"), Some(0xFFFF_0000));
        assert_eq!(parse_color("#00FF80"), Some(0xFF00_FF80));
        assert_eq!(parse_color("rgb(1, 2, 3)"), Some(0xFF01_0203));
        assert_eq!(parse_color("rgba(255, 255, 255, 0.5)"), Some(0xFFFF_FFFF));
        assert_eq!(parse_color("Orange"), Some(0xFFFF_A500));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("chartreuse"), None);

        let (style, warnings) = compile(".x { color: navy; background-color: papayawhip }");
        assert_eq!(style.get(sym::TEXT_COLOR), Some(&StyleValue::Color(0xFF00_0080)));
        assert!(style.get(sym::FILL_COLOR).is_none());
        assert_eq!(warnings, vec!["unable to parse color: papayawhip"]);
    }

    #[test]
    fn test_border_shorthand() {
        let (style, warnings) = compile(".x { border: 2px dashed #000 }");
        assert!(warnings.is_empty());
        assert_eq!(style.get(sym::BORDER_STYLE), Some(&StyleValue::Symbol(sym::DASHED)));
        assert_eq!(
            style.get(sym::BORDER_WEIGHT),
            Some(&StyleValue::Dimension {
                value: Decimal::new(2, 0),
                unit: sym::UNIT_PX
            })
        );
        assert_eq!(style.get(sym::BORDER_COLOR), Some(&StyleValue::Color(0xFF00_0000)));
    }

    #[test]
    fn test_margin_shorthand() {
        let (style, _) = compile(".x { margin: 1em 2em }");
        let em = |v: i64| StyleValue::Dimension {
            value: Decimal::new(v, 0),
            unit: sym::UNIT_EM,
        };
        assert_eq!(style.get(sym::MARGIN_TOP), Some(&em(1)));
        assert_eq!(style.get(sym::MARGIN_BOTTOM), Some(&em(1)));
        assert_eq!(style.get(sym::MARGIN_LEFT), Some(&em(2)));
        assert_eq!(style.get(sym::MARGIN_RIGHT), Some(&em(2)));

        let (style, warnings) = compile(".x { margin: 1em 2em 3em 4em 5em }");
        assert!(style.is_empty());
        assert_eq!(warnings, vec!["invalid shorthand value: 1em 2em 3em 4em 5em"]);
    }

    #[test]
    fn test_shorthand_after_longhand_wins() {
        let zero = StyleValue::Dimension {
            value: Decimal::new(0, 0),
            unit: sym::UNIT_RATIO,
        };
        let (style, _) = compile(".x { margin-top: 2em; margin: 0 }");
        assert_eq!(style.get(sym::MARGIN_TOP), Some(&zero));
        assert_eq!(style.get(sym::MARGIN_LEFT), Some(&zero));

        let (style, _) = compile(".x { margin: 0; margin-top: 2em }");
        assert_eq!(style.get(sym::MARGIN_TOP), Some(&StyleValue::dimension(2.0, sym::UNIT_EM)));
        assert_eq!(style.get(sym::MARGIN_BOTTOM), Some(&zero));

        let (style, _) = compile(".x { border-color: red; border: 1px solid blue }");
        assert_eq!(style.get(sym::BORDER_COLOR), Some(&StyleValue::Color(0xFF00_00FF)));
    }

    #[test]
    fn test_padding() {
        let em = |v: f64| StyleValue::dimension(v, sym::UNIT_EM);
        let (style, warnings) = compile(".x { padding: 1em 2em }");
        assert!(warnings.is_empty());
        assert_eq!(style.get(sym::PADDING_TOP), Some(&em(1.0)));
        assert_eq!(style.get(sym::PADDING_RIGHT), Some(&em(2.0)));
        assert_eq!(style.get(sym::PADDING_BOTTOM), Some(&em(1.0)));
        assert_eq!(style.get(sym::PADDING_LEFT), Some(&em(2.0)));
        assert!(style.get(sym::MARGIN_TOP).is_none());

        let (style, _) = compile(".x { padding: 1em 2em 3em; padding-left: 5pt }");
        assert_eq!(style.get(sym::PADDING_BOTTOM), Some(&em(3.0)));
        assert_eq!(style.get(sym::PADDING_RIGHT), Some(&em(2.0)));
        assert_eq!(
            style.get(sym::PADDING_LEFT),
            Some(&StyleValue::dimension(5.0, sym::UNIT_PT))
        );

        let (style, _) = compile(".x { padding-top: 4px }");
        assert_eq!(style.len(), 1);
        assert_eq!(
            style.get(sym::PADDING_TOP),
            Some(&StyleValue::dimension(4.0, sym::UNIT_PX))
        );
    }

    #[test]
    fn test_decoration_and_breaks() {
        let (style, _) = compile(
            ".x { text-decoration: underline line-through; vertical-align: super; \
             page-break-before: always; page-break-after: avoid }",
        );
        assert_eq!(style.get(sym::UNDERLINE), Some(&StyleValue::Bool(true)));
        assert_eq!(style.get(sym::STRIKETHROUGH), Some(&StyleValue::Bool(true)));
        assert_eq!(style.get(sym::BASELINE_STYLE), Some(&StyleValue::Symbol(sym::SUPERSCRIPT)));
        assert_eq!(style.get(sym::KEEP_FIRST), Some(&StyleValue::Symbol(sym::ALWAYS)));
        assert_eq!(style.get(sym::KEEP_LAST), Some(&StyleValue::Symbol(sym::AVOID)));

        let (style, _) = compile(".x { text-decoration: none; page-break-inside: avoid }");
        assert_eq!(style.get(sym::UNDERLINE), Some(&StyleValue::Bool(false)));
        assert_eq!(style.get(sym::KEEP_FIRST), Some(&StyleValue::Symbol(sym::AVOID)));
    }

    #[test]
    fn test_inherit_and_unknown_dropped() {
        let (style, warnings) = compile(".x { color: inherit; cursor: pointer; font-family: \"Georgia\", serif }");
        assert!(warnings.is_empty());
        assert_eq!(style.len(), 1);
        assert_eq!(
            style.get(sym::FONT_FAMILY),
            Some(&StyleValue::String("Georgia".into()))
        );
    }

    #[test]
    fn test_to_ion_field_order() {
        let mut style = Style::new();
        style.set(sym::TEXT_ALIGNMENT, StyleValue::Symbol(sym::CENTER));
        style.set(sym::FONT_SIZE, StyleValue::dimension(2.0, sym::UNIT_EM));

        let ion = style.to_ion("title");
        let fields = ion.as_struct().unwrap();
        let keys: Vec<_> = fields.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![sym::STYLE_NAME, sym::FONT_SIZE, sym::TEXT_ALIGNMENT]);
        assert_eq!(fields[0].1.as_symbol_name(), Some("title"));
    }

    #[test]
    fn test_merge_later_wins() {
        let mut base = Style::new();
        base.set(sym::FONT_STYLE, StyleValue::Symbol(sym::NORMAL));
        base.set(sym::FLOAT, StyleValue::Symbol(sym::LEFT));
        let mut over = Style::new();
        over.set(sym::FONT_STYLE, StyleValue::Symbol(sym::ITALIC));
        base.merge(&over);
        assert_eq!(base.get(sym::FONT_STYLE), Some(&StyleValue::Symbol(sym::ITALIC)));
        assert_eq!(base.get(sym::FLOAT), Some(&StyleValue::Symbol(sym::LEFT)));
    }
}
