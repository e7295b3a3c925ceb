//! Stylesheet model consumed by the style registry.
//!
//! Only the CSS this format can express is modelled: simple, class and
//! descendant selectors with optional `::before`/`::after`, property values
//! reduced to number+unit or keyword, and `@media` blocks using the Kindle
//! media query dialect. [`Stylesheet::parse`] builds it with `cssparser`.

mod parser;

use std::fmt;

/// A parsed stylesheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stylesheet {
    /// Rules and media blocks in source order.
    pub items: Vec<CssItem>,
    /// Human-readable notes about CSS that was skipped.
    pub warnings: Vec<String>,
}

/// Top-level stylesheet item.
#[derive(Debug, Clone, PartialEq)]
pub enum CssItem {
    Rule(CssRule),
    Media(MediaBlock),
}

/// A `@media` block and the items nested in it.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaBlock {
    pub query: MediaQuery,
    pub items: Vec<CssItem>,
}

impl Stylesheet {
    /// Check if the stylesheet has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All rules that apply to a device, in source order.
    ///
    /// Media blocks are expanded when their query matches.
    pub fn flatten(&self, kf8: bool, et: bool) -> Vec<&CssRule> {
        let mut rules = Vec::new();
        flatten_into(&self.items, kf8, et, &mut rules);
        rules
    }

    /// Rules for a KFX reader: KF8 and enhanced typesetting are both on.
    pub fn kfx_rules(&self) -> Vec<&CssRule> {
        self.flatten(true, true)
    }
}

fn flatten_into<'a>(items: &'a [CssItem], kf8: bool, et: bool, out: &mut Vec<&'a CssRule>) {
    for item in items {
        match item {
            CssItem::Rule(rule) => out.push(rule),
            CssItem::Media(block) => {
                if block.query.evaluate(kf8, et) {
                    flatten_into(&block.items, kf8, et, out);
                }
            }
        }
    }
}

// ============================================================================
// Rules and selectors
// ============================================================================

/// A selector paired with its declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct CssRule {
    pub selector: Selector,
    /// Declarations in source order, property names lowercase. A repeated
    /// property keeps only its last declaration, at that position.
    pub properties: Vec<(String, CssValue)>,
}

impl CssRule {
    pub fn get(&self, name: &str) -> Option<&CssValue> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }
}

/// Append a declaration, dropping any earlier one for the same property.
pub(crate) fn push_declaration(
    properties: &mut Vec<(String, CssValue)>,
    name: String,
    value: CssValue,
) {
    properties.retain(|(n, _)| *n != name);
    properties.push((name, value));
}

/// Pseudo-element a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoElement {
    Before,
    After,
}

impl PseudoElement {
    /// Suffix appended to the style name.
    pub fn suffix(self) -> &'static str {
        match self {
            PseudoElement::Before => "--before",
            PseudoElement::After => "--after",
        }
    }
}

impl fmt::Display for PseudoElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PseudoElement::Before => f.write_str("::before"),
            PseudoElement::After => f.write_str("::after"),
        }
    }
}

/// A simple or descendant selector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selector {
    /// Selector text as written
    pub raw: String,
    pub element: Option<String>,
    pub class: Option<String>,
    pub pseudo: Option<PseudoElement>,
    /// Ancestor for descendant selectors (`p code` -> `p`)
    pub ancestor: Option<Box<Selector>>,
}

impl Selector {
    /// True when the selector names an element or a class.
    pub fn is_simple(&self) -> bool {
        self.element.is_some() || self.class.is_some()
    }

    pub fn is_descendant(&self) -> bool {
        self.ancestor.is_some()
    }

    /// Style name for this selector.
    ///
    /// `.foo` -> `foo`, `p.foo` -> `foo`, `p code` -> `p--code`,
    /// `.x::before` -> `x--before`.
    pub fn style_name(&self) -> String {
        let base = self.base_name();
        let mut name = match &self.ancestor {
            Some(ancestor) => format!("{}--{}", ancestor.style_name(), base),
            None => base.to_string(),
        };
        if let Some(pseudo) = self.pseudo {
            name.push_str(pseudo.suffix());
        }
        name
    }

    /// Class, else element, else the raw text.
    fn base_name(&self) -> &str {
        self.class
            .as_deref()
            .or(self.element.as_deref())
            .unwrap_or(&self.raw)
    }
}

// ============================================================================
// Values
// ============================================================================

/// A parsed property value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CssValue {
    /// Value text as written (`1.2em`, `"["`, `#ff0000`)
    pub raw: String,
    /// Numeric part, 0 when absent
    pub value: f64,
    /// Unit of a dimension (`em`, `px`, `%`)
    pub unit: Option<String>,
    /// Lowercased identifier, unquoted string, hash, or the raw text of
    /// function and multi-token values
    pub keyword: Option<String>,
}

impl CssValue {
    pub fn keyword(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            keyword: Some(raw.to_ascii_lowercase()),
            ..Default::default()
        }
    }

    pub fn dimension(value: f64, unit: &str) -> Self {
        Self {
            raw: format!("{value}{unit}"),
            value,
            unit: (!unit.is_empty()).then(|| unit.to_string()),
            keyword: None,
        }
    }

    /// True for values with a numeric component, including a bare `0`.
    pub fn is_numeric(&self) -> bool {
        if self.unit.is_some() {
            return true;
        }
        if self.keyword.is_some() {
            return false;
        }
        self.value != 0.0
            || self
                .raw
                .starts_with(|c: char| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
    }

    /// True for keyword values without a unit.
    pub fn is_keyword(&self) -> bool {
        self.keyword.is_some() && self.unit.is_none()
    }

    pub fn keyword_str(&self) -> &str {
        self.keyword.as_deref().unwrap_or("")
    }

    pub fn unit_str(&self) -> &str {
        self.unit.as_deref().unwrap_or("")
    }
}

// ============================================================================
// Media queries
// ============================================================================

/// `not? type (and not? feature)*`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaQuery {
    pub raw: String,
    pub negated: bool,
    pub media_type: String,
    pub features: Vec<MediaFeature>,
}

/// One `and [not] feature` condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFeature {
    pub name: String,
    pub negated: bool,
}

impl MediaQuery {
    /// Build a query from its identifiers, in order.
    pub fn from_idents<S: AsRef<str>>(raw: &str, idents: &[S]) -> Self {
        let mut query = MediaQuery {
            raw: raw.trim().to_string(),
            ..Default::default()
        };
        let mut idents = idents.iter().map(|s| s.as_ref().to_ascii_lowercase()).peekable();

        if idents.peek().is_some_and(|i| i == "not") {
            query.negated = true;
            idents.next();
        }
        if let Some(media_type) = idents.next() {
            query.media_type = media_type;
        }
        while let Some(ident) = idents.next() {
            if ident != "and" {
                continue;
            }
            let mut negated = false;
            let mut name = idents.next();
            if name.as_deref() == Some("not") {
                negated = true;
                name = idents.next();
            }
            match name {
                Some(name) => query.features.push(MediaFeature { name, negated }),
                None => break,
            }
        }
        query
    }

    /// Parse a query from whitespace-separated text.
    pub fn parse(raw: &str) -> Self {
        let idents: Vec<&str> = raw
            .split(|c: char| c.is_whitespace() || c == '(' || c == ')')
            .filter(|s| !s.is_empty())
            .collect();
        Self::from_idents(raw, &idents)
    }

    /// Evaluate for a reader. `amzn-mobi` never matches; unknown types and
    /// features do not match either.
    pub fn evaluate(&self, kf8: bool, et: bool) -> bool {
        let type_matches = match self.media_type.as_str() {
            "amzn-kf8" => kf8,
            "amzn-et" => et,
            "all" | "screen" => true,
            _ => false,
        };
        if type_matches == self.negated {
            return false;
        }

        self.features.iter().all(|feature| {
            let matches = match feature.name.as_str() {
                "amzn-kf8" => kf8,
                "amzn-et" => et,
                _ => false,
            };
            matches != feature.negated
        })
    }
}
