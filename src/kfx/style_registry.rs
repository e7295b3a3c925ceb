//! Style registry for KFX export.
//!
//! Built once from a stylesheet:
//! - ordinary rules compile into named [`Style`]s, merged by style name in
//!   source order so a later rule overrides an earlier one
//! - `::before`/`::after` rules contribute literal `content` strings, looked
//!   up later by class name
//!
//! Nothing here fails. Problems become warning strings returned alongside the
//! registry, which stays usable with whatever could be understood.

use std::collections::{BTreeMap, HashMap};

use crate::css::{CssRule, PseudoElement, Stylesheet};
use crate::kfx::fragment::Fragment;
use crate::kfx::style::{Style, compile_rule};
use crate::kfx::symbols::sym;

// ============================================================================
// Pseudo-element content
// ============================================================================

/// Generated text for one class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PseudoContent {
    pub before: Option<String>,
    pub after: Option<String>,
}

impl PseudoContent {
    pub fn is_empty(&self) -> bool {
        self.before.is_none() && self.after.is_none()
    }
}

/// Literal text of a `content` value.
///
/// Only non-empty quoted strings are supported; `""`, `none`, `normal`,
/// `attr()`, `counter()` and friends give `None`.
pub fn parse_content(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("none") || raw.eq_ignore_ascii_case("normal") {
        return None;
    }
    let quote = raw.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let inner = raw.strip_prefix(quote)?.strip_suffix(quote)?;
    if inner.is_empty() {
        return None;
    }
    Some(inner.to_string())
}

// ============================================================================
// Registry
// ============================================================================

/// Compiled styles plus pseudo-element content.
#[derive(Debug, Clone, Default)]
pub struct StyleRegistry {
    /// Styles in first-registration order
    styles: Vec<(String, Style)>,
    index: HashMap<String, usize>,
    pseudo: BTreeMap<String, PseudoContent>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from every rule that applies to a KFX reader.
    ///
    /// The returned warnings start with the stylesheet's own parse warnings.
    pub fn from_stylesheet(sheet: &Stylesheet) -> (Self, Vec<String>) {
        let mut registry = Self::new();
        let mut warnings = sheet.warnings.clone();

        for rule in sheet.kfx_rules() {
            match rule.selector.pseudo {
                Some(_) => registry.ingest_pseudo_rule(rule, &mut warnings),
                None => {
                    let style = compile_rule(rule, &mut warnings);
                    registry.register(&rule.selector.style_name(), style);
                }
            }
        }

        tracing::debug!(
            styles = registry.styles.len(),
            pseudo = registry.pseudo.len(),
            warnings = warnings.len(),
            "built style registry"
        );
        (registry, warnings)
    }

    fn ingest_pseudo_rule(&mut self, rule: &CssRule, warnings: &mut Vec<String>) {
        let Some(content) = rule.get("content") else {
            return;
        };

        for (property, _) in rule.properties.iter().filter(|(p, _)| p != "content") {
            let warning = format!(
                "pseudo-element {:?} has property {:?} which will be ignored (only 'content' is supported)",
                rule.selector.raw, property
            );
            tracing::warn!("{warning}");
            warnings.push(warning);
        }

        if let Some(text) = parse_content(&content.raw) {
            self.register_pseudo_content(&rule.selector.style_name(), &text);
        }
    }

    /// Record generated text under a `name--before` / `name--after` key.
    ///
    /// Names without either suffix are ignored.
    pub fn register_pseudo_content(&mut self, style_name: &str, content: &str) {
        let (base, pseudo) = if let Some(base) = style_name.strip_suffix(PseudoElement::Before.suffix()) {
            (base, PseudoElement::Before)
        } else if let Some(base) = style_name.strip_suffix(PseudoElement::After.suffix()) {
            (base, PseudoElement::After)
        } else {
            return;
        };

        let entry = self.pseudo.entry(base.to_string()).or_default();
        match pseudo {
            PseudoElement::Before => entry.before = Some(content.to_string()),
            PseudoElement::After => entry.after = Some(content.to_string()),
        }
    }

    /// Content registered for exactly this class.
    pub fn get_pseudo_content_for_class(&self, class: &str) -> Option<&PseudoContent> {
        self.pseudo.get(class)
    }

    /// Content for an element with several classes; the first class with an
    /// entry wins.
    pub fn get_pseudo_content(&self, classes: &str) -> Option<&PseudoContent> {
        classes
            .split_whitespace()
            .find_map(|class| self.get_pseudo_content_for_class(class))
    }

    pub fn has_pseudo_content(&self) -> bool {
        !self.pseudo.is_empty()
    }

    /// Register a style, merging into an existing one with the same name.
    ///
    /// Empty styles are ignored.
    pub fn register(&mut self, name: &str, style: Style) {
        if style.is_empty() {
            return;
        }
        match self.index.get(name) {
            Some(&idx) => self.styles[idx].1.merge(&style),
            None => {
                self.index.insert(name.to_string(), self.styles.len());
                self.styles.push((name.to_string(), style));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Style> {
        self.index.get(name).map(|&idx| &self.styles[idx].1)
    }

    /// Styles in first-registration order.
    pub fn styles(&self) -> impl Iterator<Item = (&str, &Style)> {
        self.styles.iter().map(|(name, style)| (name.as_str(), style))
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// One `$157` fragment per style, named by its style name.
    pub fn to_fragments(&self) -> Vec<Fragment> {
        self.styles()
            .map(|(name, style)| Fragment::named(sym::STYLE, name, style.to_ion(name)))
            .collect()
    }
}
