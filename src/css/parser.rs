//! `cssparser` front end producing a [`Stylesheet`].
//!
//! Parsing is lenient: anything that cannot be represented is skipped and,
//! when the author would care, noted in [`Stylesheet::warnings`].

use cssparser::{
    AtRuleParser, CowRcStr, ParseError, Parser, ParserInput, QualifiedRuleParser,
    RuleBodyItemParser, RuleBodyParser, StyleSheetParser, Token,
};

use super::{
    CssItem, CssRule, CssValue, MediaBlock, MediaQuery, PseudoElement, Selector, Stylesheet,
    push_declaration,
};

impl Stylesheet {
    /// Parse a CSS stylesheet from a string.
    pub fn parse(css: &str) -> Self {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let mut items = Vec::new();
        let mut warnings = Vec::new();

        let mut rule_parser = TopLevelRuleParser {
            items: &mut items,
            warnings: &mut warnings,
        };
        for result in StyleSheetParser::new(&mut parser, &mut rule_parser) {
            // Ignore errors - lenient parsing
            let _ = result;
        }

        Self { items, warnings }
    }
}

/// Parser for stylesheet rules, also used inside `@media` blocks.
struct TopLevelRuleParser<'a> {
    items: &'a mut Vec<CssItem>,
    warnings: &'a mut Vec<String>,
}

enum AtRulePrelude {
    Media(MediaQuery),
}

impl<'i> AtRuleParser<'i> for TopLevelRuleParser<'_> {
    type Prelude = AtRulePrelude;
    type AtRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        if name.eq_ignore_ascii_case("media") {
            let start = input.position();
            let mut idents = Vec::new();
            collect_idents(input, &mut idents);
            let raw = input.slice_from(start);
            return Ok(AtRulePrelude::Media(MediaQuery::from_idents(raw, &idents)));
        }

        if !name.eq_ignore_ascii_case("charset") {
            self.warnings.push(format!("unsupported at-rule: @{name}"));
        }
        tracing::debug!(rule = %name, "skipping at-rule");
        Err(input.new_custom_error(()))
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &cssparser::ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        let AtRulePrelude::Media(query) = prelude;
        let mut items = Vec::new();
        let mut nested = TopLevelRuleParser {
            items: &mut items,
            warnings: &mut *self.warnings,
        };
        for result in StyleSheetParser::new(input, &mut nested) {
            let _ = result;
        }
        self.items.push(CssItem::Media(MediaBlock { query, items }));
        Ok(())
    }
}

impl<'i> QualifiedRuleParser<'i> for TopLevelRuleParser<'_> {
    type Prelude = Vec<Selector>;
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next_including_whitespace_and_comments().is_ok() {}
        let raw = input.slice_from(start);

        let selectors = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| parse_selector(s, self.warnings))
            .filter(Selector::is_simple)
            .collect();
        Ok(selectors)
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &cssparser::ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        let mut properties = Vec::new();
        let mut decl_parser = DeclarationListParser {
            properties: &mut properties,
        };
        for result in RuleBodyParser::new(input, &mut decl_parser) {
            let _ = result;
        }

        // One rule per selector in a group
        for selector in prelude {
            self.items.push(CssItem::Rule(CssRule {
                selector,
                properties: properties.clone(),
            }));
        }
        Ok(())
    }
}

/// Identifiers of a media query prelude, including those inside parentheses.
fn collect_idents<'i>(input: &mut Parser<'i, '_>, idents: &mut Vec<String>) {
    loop {
        let token = match input.next() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        match token {
            Token::Ident(ident) => idents.push(ident.to_ascii_lowercase()),
            Token::ParenthesisBlock => {
                let _ = input.parse_nested_block(|nested| {
                    collect_idents(nested, idents);
                    Ok::<_, ParseError<'i, ()>>(())
                });
            }
            _ => {}
        }
    }
}

// ============================================================================
// Declarations
// ============================================================================

struct DeclarationListParser<'a> {
    properties: &'a mut Vec<(String, CssValue)>,
}

impl<'i> AtRuleParser<'i> for DeclarationListParser<'_> {
    type Prelude = ();
    type AtRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        _name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }
}

impl<'i> QualifiedRuleParser<'i> for DeclarationListParser<'_> {
    type Prelude = ();
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }
}

impl<'i> cssparser::DeclarationParser<'i> for DeclarationListParser<'_> {
    type Declaration = ();
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _start: &cssparser::ParserState,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let name = name.to_ascii_lowercase();
        let value = input.parse_until_before(cssparser::Delimiter::Bang, |input| {
            Ok::<_, ParseError<'i, ()>>(parse_value(input))
        })?;
        // `!important` carries no meaning for a single-origin cascade
        let _ = input.try_parse(cssparser::parse_important);

        if name.starts_with("--") || value.raw.is_empty() {
            return Ok(());
        }
        push_declaration(self.properties, name, value);
        Ok(())
    }
}

impl<'i> RuleBodyItemParser<'i, (), ()> for DeclarationListParser<'_> {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Reduce a declaration value to number+unit or keyword.
fn parse_value(input: &mut Parser<'_, '_>) -> CssValue {
    let start = input.position();
    let mut tokens = Vec::new();
    while let Ok(token) = input.next() {
        tokens.push(token.clone());
    }
    let raw = input.slice_from(start).trim().to_string();

    let mut value = CssValue {
        raw,
        ..Default::default()
    };

    match tokens.as_slice() {
        [Token::Dimension {
            value: number,
            unit,
            ..
        }] => {
            value.value = f64::from(*number);
            value.unit = Some(unit.to_ascii_lowercase());
        }
        [Token::Percentage { unit_value, .. }] => {
            value.value = f64::from(*unit_value) * 100.0;
            value.unit = Some("%".to_string());
        }
        [Token::Number { value: number, .. }] => value.value = f64::from(*number),
        [Token::Ident(ident)] => value.keyword = Some(ident.to_ascii_lowercase()),
        [Token::QuotedString(s)] => value.keyword = Some(s.to_string()),
        [Token::Hash(hash) | Token::IDHash(hash)] => value.keyword = Some(format!("#{hash}")),
        [_] => {
            // Functions and anything else are kept as written
            value.keyword = Some(value.raw.clone());
        }
        [] => {}
        _ => value.keyword = Some(value.raw.clone()),
    }

    // f32 tokens leave noise like 1.2000000476837158
    value.value = round_token_value(value.value);
    value
}

fn round_token_value(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}

// ============================================================================
// Selectors
// ============================================================================

/// Parse one selector of a group.
///
/// Unsupported shapes produce a warning and a selector that is not simple,
/// so the caller drops it.
fn parse_selector(text: &str, warnings: &mut Vec<String>) -> Selector {
    let text = text.trim();
    let unsupported = Selector {
        raw: text.to_string(),
        ..Default::default()
    };

    if text.contains(['+', '~', '>']) {
        warnings.push(format!("unsupported combinator selector: {text}"));
        tracing::debug!(selector = text, "skipping combinator selector");
        return unsupported;
    }
    if text.contains('[') {
        warnings.push(format!("unsupported attribute selector: {text}"));
        tracing::debug!(selector = text, "skipping attribute selector");
        return unsupported;
    }

    if text.contains(char::is_whitespace) {
        let parts: Vec<&str> = text.split_whitespace().collect();
        return parse_descendant(text, &parts, warnings);
    }
    parse_simple_selector(text, warnings)
}

/// `a b c`: `c` is the subject and `a b` its ancestor chain.
fn parse_descendant(raw: &str, parts: &[&str], warnings: &mut Vec<String>) -> Selector {
    let mut selector = Selector {
        raw: raw.to_string(),
        ..Default::default()
    };
    let Some((last, ancestors)) = parts.split_last() else {
        return selector;
    };
    if ancestors.is_empty() {
        return parse_simple_selector(last, warnings);
    }

    let subject = parse_simple_selector(last, warnings);
    if !subject.is_simple() {
        return selector;
    }
    selector.element = subject.element;
    selector.class = subject.class;
    selector.pseudo = subject.pseudo;

    let ancestor = if let [single] = ancestors {
        parse_simple_selector(single, warnings)
    } else {
        parse_descendant(&ancestors.join(" "), ancestors, warnings)
    };
    if ancestor.is_simple() || ancestor.is_descendant() {
        selector.ancestor = Some(Box::new(ancestor));
    }
    selector
}

/// `element`, `.class`, `element.class`, each with an optional
/// `::before`/`::after` (or the legacy single-colon form).
fn parse_simple_selector(text: &str, warnings: &mut Vec<String>) -> Selector {
    let text = text.trim();
    let mut selector = Selector {
        raw: text.to_string(),
        ..Default::default()
    };

    let mut remaining = text;
    if let Some((head, pseudo)) = text.split_once("::") {
        match pseudo.to_ascii_lowercase().as_str() {
            "before" => selector.pseudo = Some(PseudoElement::Before),
            "after" => selector.pseudo = Some(PseudoElement::After),
            _ => {
                warnings.push(format!("unsupported pseudo-element: {text}"));
                tracing::debug!(selector = text, "skipping pseudo-element");
                return selector;
            }
        }
        remaining = head;
    } else if let Some((head, pseudo)) = text.split_once(':') {
        match pseudo.to_ascii_lowercase().as_str() {
            "before" => selector.pseudo = Some(PseudoElement::Before),
            "after" => selector.pseudo = Some(PseudoElement::After),
            _ => {
                warnings.push(format!("unsupported pseudo-class: {text}"));
                tracing::debug!(selector = text, "skipping pseudo-class selector");
                return selector;
            }
        }
        remaining = head;
    }

    if remaining.is_empty() {
        return selector;
    }
    match remaining.split_once('.') {
        Some((element, class)) => {
            if !element.is_empty() {
                selector.element = Some(element.to_string());
            }
            selector.class = Some(class.to_string());
        }
        None => selector.element = Some(remaining.to_string()),
    }
    selector
}
