//! Mixed-content elements: paragraphs, style markup, links and inline images.

use crate::content::{entries, Content};
use crate::error::ParseError;
use crate::node::{is_lang, node_identity, unexpected_attribute, unexpected_element, Node};
use crate::schema::xlink_attribute;
use crate::xml::{Attribute, OpenTag, QName};

/// One entry of mixed content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Markup(Markup),
    Link(Link),
    Image(InlineImage),
}

impl Inline {
    fn node_mut(&mut self) -> Option<&mut dyn Node> {
        match self {
            Self::Text(_) => None,
            Self::Markup(markup) => Some(markup),
            Self::Link(link) => Some(link),
            Self::Image(image) => Some(image),
        }
    }
}

impl Content for Inline {
    fn name(&self) -> Option<&QName> {
        match self {
            Self::Text(_) => None,
            Self::Markup(markup) => markup.name(),
            Self::Link(link) => link.name(),
            Self::Image(image) => image.name(),
        }
    }

    fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            _ => "",
        }
    }

    fn children(&self) -> Vec<&dyn Content> {
        match self {
            Self::Text(_) | Self::Image(_) => Vec::new(),
            Self::Markup(markup) => markup.children(),
            Self::Link(link) => link.children(),
        }
    }
}

/// Append a text run, merging it into a preceding one.
fn push_text(content: &mut Vec<Inline>, run: &str) {
    if let Some(Inline::Text(last)) = content.last_mut() {
        last.push_str(run);
    } else {
        content.push(Inline::Text(run.to_string()));
    }
}

/// Dispatch an open tag inside mixed content.
///
/// `allow_links` is false anywhere below a link.
fn open_inline<'a>(
    content: &'a mut Vec<Inline>,
    tag: &OpenTag,
    allow_links: bool,
) -> Result<&'a mut dyn Node, ParseError> {
    let entry = match tag.name.local() {
        "a" if allow_links => Inline::Link(Link::default()),
        "image" => Inline::Image(InlineImage::default()),
        local => match MarkupKind::from_local(local) {
            Some(kind) => Inline::Markup(Markup::new(kind, !allow_links)),
            None => return Err(unexpected_element(tag)),
        },
    };
    content.push(entry);
    content
        .last_mut()
        .and_then(Inline::node_mut)
        .ok_or_else(|| unexpected_element(tag))
}

/// Style markup family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MarkupKind {
    #[default]
    Strong,
    Emphasis,
    Strikethrough,
    Sub,
    Sup,
    Code,
    /// Named style (`<style name="...">`).
    Style,
}

impl MarkupKind {
    /// Map an element local name to its markup kind.
    #[must_use]
    pub fn from_local(local: &str) -> Option<Self> {
        match local {
            "strong" => Some(Self::Strong),
            "emphasis" => Some(Self::Emphasis),
            "strikethrough" => Some(Self::Strikethrough),
            "sub" => Some(Self::Sub),
            "sup" => Some(Self::Sup),
            "code" => Some(Self::Code),
            "style" => Some(Self::Style),
            _ => None,
        }
    }
}

/// Recursive style markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup {
    pub name: QName,
    pub kind: MarkupKind,
    /// Style name, only on named styles.
    pub style_name: Option<String>,
    pub lang: Option<String>,
    pub content: Vec<Inline>,
    in_link: bool,
}

impl Markup {
    fn new(kind: MarkupKind, in_link: bool) -> Self {
        Self {
            kind,
            in_link,
            ..Self::default()
        }
    }
}

impl Node for Markup {
    node_identity!();

    fn on_child_open(&mut self, tag: &OpenTag) -> Result<&mut dyn Node, ParseError> {
        open_inline(&mut self.content, tag, !self.in_link)
    }

    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        match attr.name.local() {
            "name" if self.kind == MarkupKind::Style => self.style_name = Some(attr.value.clone()),
            _ if is_lang(attr) => self.lang = Some(attr.value.clone()),
            _ => return Err(unexpected_attribute(attr)),
        }
        Ok(())
    }

    fn on_text(&mut self, run: &str) -> Result<(), ParseError> {
        push_text(&mut self.content, run);
        Ok(())
    }
}

impl Content for Markup {
    fn name(&self) -> Option<&QName> {
        Some(&self.name)
    }

    fn children(&self) -> Vec<&dyn Content> {
        entries(&self.content)
    }
}

/// Hyperlink. Nothing below a link may be another link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    pub name: QName,
    /// `xlink:type`.
    pub xlink_type: Option<String>,
    /// `xlink:href`, the link target.
    pub href: Option<String>,
    /// Plain `type`, e.g. `note`.
    pub link_type: Option<String>,
    pub content: Vec<Inline>,
}

impl Link {
    /// Whether this link points at a footnote.
    #[must_use]
    pub fn is_note(&self) -> bool {
        self.link_type.as_deref() == Some("note")
    }
}

impl Node for Link {
    node_identity!();

    fn on_child_open(&mut self, tag: &OpenTag) -> Result<&mut dyn Node, ParseError> {
        open_inline(&mut self.content, tag, false)
    }

    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        if xlink_attribute(attr, &mut self.xlink_type, &mut self.href) {
            return Ok(());
        }
        if attr.name.is(None, "type") {
            self.link_type = Some(attr.value.clone());
            return Ok(());
        }
        Err(unexpected_attribute(attr))
    }

    fn on_text(&mut self, run: &str) -> Result<(), ParseError> {
        push_text(&mut self.content, run);
        Ok(())
    }
}

impl Content for Link {
    fn name(&self) -> Option<&QName> {
        Some(&self.name)
    }

    fn children(&self) -> Vec<&dyn Content> {
        entries(&self.content)
    }
}

/// Image inside text or on a cover page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineImage {
    pub name: QName,
    pub xlink_type: Option<String>,
    /// `xlink:href`, usually `#binary-id`.
    pub href: Option<String>,
    pub alt: Option<String>,
}

impl Node for InlineImage {
    node_identity!();

    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        if xlink_attribute(attr, &mut self.xlink_type, &mut self.href) {
            return Ok(());
        }
        if attr.name.is(None, "alt") {
            self.alt = Some(attr.value.clone());
            return Ok(());
        }
        Err(unexpected_attribute(attr))
    }
}

impl Content for InlineImage {
    fn name(&self) -> Option<&QName> {
        Some(&self.name)
    }
}

/// Paragraph-like mixed content: `p`, `subtitle`, `v`, `text-author`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub name: QName,
    pub id: Option<String>,
    pub style: Option<String>,
    pub lang: Option<String>,
    pub content: Vec<Inline>,
}

impl Node for Paragraph {
    node_identity!();

    fn on_child_open(&mut self, tag: &OpenTag) -> Result<&mut dyn Node, ParseError> {
        open_inline(&mut self.content, tag, true)
    }

    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        match attr.name.local() {
            "id" => self.id = Some(attr.value.clone()),
            "style" => self.style = Some(attr.value.clone()),
            _ if is_lang(attr) => self.lang = Some(attr.value.clone()),
            _ => return Err(unexpected_attribute(attr)),
        }
        Ok(())
    }

    fn on_text(&mut self, run: &str) -> Result<(), ParseError> {
        push_text(&mut self.content, run);
        Ok(())
    }
}

impl Content for Paragraph {
    fn name(&self) -> Option<&QName> {
        Some(&self.name)
    }

    fn children(&self) -> Vec<&dyn Content> {
        entries(&self.content)
    }
}
