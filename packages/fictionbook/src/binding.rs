//! Fixed-field binding: leaf sinks for non-polymorphic elements.
//!
//! These nodes are handed out by a parent's `on_child_open` when it wants a
//! scalar value rather than structural content. They run on the same driver
//! as everything else and convert their text when the element closes.

use std::fmt::Write as _;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::NaiveDate;

use crate::config::parse_date;
use crate::error::ParseError;
use crate::node::{is_lang, node_identity, unexpected_attribute, unexpected_element, Node};
use crate::xml::{Attribute, OpenTag, QName};

/// Plain text with an optional language (`textFieldType`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    pub name: QName,
    pub lang: Option<String>,
    pub value: String,
}

impl TextField {
    /// The text content.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl Node for TextField {
    node_identity!();

    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        if is_lang(attr) {
            self.lang = Some(attr.value.clone());
            Ok(())
        } else {
            Err(unexpected_attribute(attr))
        }
    }

    fn on_text(&mut self, run: &str) -> Result<(), ParseError> {
        self.value.push_str(run);
        Ok(())
    }
}

/// Numeric text, converted when the element closes.
///
/// The raw text is kept even when conversion fails.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberField<T> {
    pub name: QName,
    pub raw: String,
    pub value: Option<T>,
}

impl<T> Node for NumberField<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    node_identity!();

    fn on_text(&mut self, run: &str) -> Result<(), ParseError> {
        self.raw.push_str(run);
        Ok(())
    }

    fn on_close(&mut self) -> Result<(), ParseError> {
        match self.raw.trim().parse() {
            Ok(value) => {
                self.value = Some(value);
                Ok(())
            }
            Err(err) => Err(ParseError::InvalidNumber {
                tag: self.name.clone(),
                value: self.raw.clone(),
                reason: err.to_string(),
            }),
        }
    }
}

/// Human readable date with an optional machine readable `value` attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateField {
    pub name: QName,
    pub lang: Option<String>,
    /// Free-form date text, e.g. "1863-1867".
    pub text: String,
    /// The `value` attribute exactly as written.
    pub raw_value: Option<String>,
    /// The `value` attribute, when it is a valid `YYYY-MM-DD` date.
    pub value: Option<NaiveDate>,
}

impl Node for DateField {
    node_identity!();

    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        match attr.name.local() {
            "value" => {
                self.raw_value = Some(attr.value.clone());
                self.value = parse_date(&attr.value);
                if self.value.is_none() {
                    return Err(ParseError::InvalidDate {
                        name: attr.name.clone(),
                        value: attr.value.clone(),
                    });
                }
            }
            _ if is_lang(attr) => self.lang = Some(attr.value.clone()),
            _ => return Err(unexpected_attribute(attr)),
        }
        Ok(())
    }

    fn on_text(&mut self, run: &str) -> Result<(), ParseError> {
        self.text.push_str(run);
        Ok(())
    }
}

/// Base64 payload referenced from images by `#id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binary {
    pub name: QName,
    pub id: String,
    pub content_type: String,
    /// Decoded bytes; empty when the payload was malformed.
    pub data: Vec<u8>,
    encoded: String,
}

impl Node for Binary {
    node_identity!();

    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        match attr.name.local() {
            "id" => self.id = attr.value.clone(),
            "content-type" => self.content_type = attr.value.clone(),
            _ => return Err(unexpected_attribute(attr)),
        }
        Ok(())
    }

    fn on_text(&mut self, run: &str) -> Result<(), ParseError> {
        self.encoded
            .extend(run.chars().filter(|c| !c.is_ascii_whitespace()));
        Ok(())
    }

    fn on_close(&mut self) -> Result<(), ParseError> {
        let encoded = std::mem::take(&mut self.encoded);
        self.data = STANDARD.decode(encoded)?;
        Ok(())
    }
}

/// Piece of verbatim markup inside a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RawPart {
    Text(String),
    Element(RawElement),
}

/// Element captured verbatim; never interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct RawElement {
    name: QName,
    attributes: Vec<Attribute>,
    parts: Vec<RawPart>,
}

impl RawElement {
    fn render(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.name);
        for attr in &self.attributes {
            let _ = write!(out, " {}=\"", attr.name);
            escape_into(out, &attr.value, true);
            out.push('"');
        }
        if self.parts.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        render_parts(&self.parts, out);
        let _ = write!(out, "</{}>", self.name);
    }
}

impl Node for RawElement {
    node_identity!();

    fn on_child_open(&mut self, tag: &OpenTag) -> Result<&mut dyn Node, ParseError> {
        open_raw(&mut self.parts, tag)
    }

    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        self.attributes.push(attr.clone());
        Ok(())
    }

    fn on_text(&mut self, run: &str) -> Result<(), ParseError> {
        self.parts.push(RawPart::Text(run.to_string()));
        Ok(())
    }
}

fn open_raw<'a>(parts: &'a mut Vec<RawPart>, tag: &OpenTag) -> Result<&'a mut dyn Node, ParseError> {
    parts.push(RawPart::Element(RawElement::default()));
    match parts.last_mut() {
        Some(RawPart::Element(element)) => Ok(element),
        _ => Err(unexpected_element(tag)),
    }
}

fn render_parts(parts: &[RawPart], out: &mut String) {
    for part in parts {
        match part {
            RawPart::Text(text) => escape_into(out, text, false),
            RawPart::Element(element) => element.render(out),
        }
    }
}

fn escape_into(out: &mut String, text: &str, attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// Opaque stylesheet kept as inner markup text.
///
/// Nested elements are captured through the driver like any other node and
/// rendered back to markup when the stylesheet closes; namespace prefixes
/// are not reproduced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub name: QName,
    /// The `type` attribute, e.g. `text/css`.
    pub content_type: Option<String>,
    /// Inner markup.
    pub markup: String,
    parts: Vec<RawPart>,
}

impl Node for Stylesheet {
    node_identity!();

    fn on_child_open(&mut self, tag: &OpenTag) -> Result<&mut dyn Node, ParseError> {
        open_raw(&mut self.parts, tag)
    }

    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        if attr.name.local() == "type" {
            self.content_type = Some(attr.value.clone());
            Ok(())
        } else {
            Err(unexpected_attribute(attr))
        }
    }

    fn on_text(&mut self, run: &str) -> Result<(), ParseError> {
        self.parts.push(RawPart::Text(run.to_string()));
        Ok(())
    }

    fn on_close(&mut self) -> Result<(), ParseError> {
        let parts = std::mem::take(&mut self.parts);
        render_parts(&parts, &mut self.markup);
        Ok(())
    }
}
