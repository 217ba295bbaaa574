//! Structural elements: bodies, sections and their block-level children.

use crate::content::{entries, Content};
use crate::error::ParseError;
use crate::node::{
    fill_slot, is_lang, node_identity, push_default, unexpected_attribute, unexpected_element,
    Node,
};
use crate::schema::{push_block, xlink_attribute, Block, Paragraph, Poem, Table};
use crate::xml::{Attribute, OpenTag, QName};

/// Consume `id` and `xml:lang`, rejecting anything else.
fn id_or_lang(
    attr: &Attribute,
    id: &mut Option<String>,
    lang: &mut Option<String>,
) -> Result<(), ParseError> {
    if attr.name.local() == "id" {
        *id = Some(attr.value.clone());
    } else if is_lang(attr) {
        *lang = Some(attr.value.clone());
    } else {
        return Err(unexpected_attribute(attr));
    }
    Ok(())
}

/// Block-level image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Image {
    pub name: QName,
    pub id: Option<String>,
    pub xlink_type: Option<String>,
    /// `xlink:href`, usually `#binary-id`.
    pub href: Option<String>,
    pub alt: Option<String>,
    pub title: Option<String>,
}

impl Node for Image {
    node_identity!();

    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        if xlink_attribute(attr, &mut self.xlink_type, &mut self.href) {
            return Ok(());
        }
        match attr.name.local() {
            "id" => self.id = Some(attr.value.clone()),
            "alt" => self.alt = Some(attr.value.clone()),
            "title" => self.title = Some(attr.value.clone()),
            _ => return Err(unexpected_attribute(attr)),
        }
        Ok(())
    }
}

impl Content for Image {
    fn name(&self) -> Option<&QName> {
        Some(&self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmptyLine {
    pub name: QName,
}

impl Node for EmptyLine {
    node_identity!();
}

impl Content for EmptyLine {
    fn name(&self) -> Option<&QName> {
        Some(&self.name)
    }
}

/// Title of a body, section, poem or stanza.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Title {
    pub name: QName,
    pub lang: Option<String>,
    /// Paragraphs and empty lines.
    pub content: Vec<Block>,
}

impl Node for Title {
    node_identity!();

    fn on_child_open(&mut self, tag: &OpenTag) -> Result<&mut dyn Node, ParseError> {
        let block = match tag.name.local() {
            "p" => Block::Paragraph(Paragraph::default()),
            "empty-line" => Block::EmptyLine(EmptyLine::default()),
            _ => return Err(unexpected_element(tag)),
        };
        Ok(push_block(&mut self.content, block))
    }

    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        if is_lang(attr) {
            self.lang = Some(attr.value.clone());
            Ok(())
        } else {
            Err(unexpected_attribute(attr))
        }
    }
}

impl Content for Title {
    fn name(&self) -> Option<&QName> {
        Some(&self.name)
    }

    fn children(&self) -> Vec<&dyn Content> {
        entries(&self.content)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Epigraph {
    pub name: QName,
    pub id: Option<String>,
    /// Paragraphs, poems, citations and empty lines.
    pub content: Vec<Block>,
    pub text_authors: Vec<Paragraph>,
}

impl Node for Epigraph {
    node_identity!();

    fn on_child_open(&mut self, tag: &OpenTag) -> Result<&mut dyn Node, ParseError> {
        let block = match tag.name.local() {
            "p" => Block::Paragraph(Paragraph::default()),
            "poem" => Block::Poem(Poem::default()),
            "cite" => Block::Cite(Cite::default()),
            "empty-line" => Block::EmptyLine(EmptyLine::default()),
            "text-author" => return Ok(push_default(&mut self.text_authors)),
            _ => return Err(unexpected_element(tag)),
        };
        Ok(push_block(&mut self.content, block))
    }

    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        if attr.name.local() == "id" {
            self.id = Some(attr.value.clone());
            Ok(())
        } else {
            Err(unexpected_attribute(attr))
        }
    }
}

impl Content for Epigraph {
    fn name(&self) -> Option<&QName> {
        Some(&self.name)
    }

    fn children(&self) -> Vec<&dyn Content> {
        entries(&self.content)
    }
}

/// Annotation of a section or of the book itself; also used for
/// the document history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotation {
    pub name: QName,
    pub id: Option<String>,
    pub lang: Option<String>,
    pub content: Vec<Block>,
}

impl Node for Annotation {
    node_identity!();

    fn on_child_open(&mut self, tag: &OpenTag) -> Result<&mut dyn Node, ParseError> {
        let block = match tag.name.local() {
            "p" => Block::Paragraph(Paragraph::default()),
            "subtitle" => Block::Subtitle(Paragraph::default()),
            "empty-line" => Block::EmptyLine(EmptyLine::default()),
            "poem" => Block::Poem(Poem::default()),
            "cite" => Block::Cite(Cite::default()),
            "table" => Block::Table(Table::default()),
            _ => return Err(unexpected_element(tag)),
        };
        Ok(push_block(&mut self.content, block))
    }

    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        id_or_lang(attr, &mut self.id, &mut self.lang)
    }
}

impl Content for Annotation {
    fn name(&self) -> Option<&QName> {
        Some(&self.name)
    }

    fn children(&self) -> Vec<&dyn Content> {
        entries(&self.content)
    }
}

/// Citation. The text authors are a fixed slot and not part of `children()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cite {
    pub name: QName,
    pub id: Option<String>,
    pub lang: Option<String>,
    pub content: Vec<Block>,
    pub text_authors: Vec<Paragraph>,
}

impl Node for Cite {
    node_identity!();

    fn on_child_open(&mut self, tag: &OpenTag) -> Result<&mut dyn Node, ParseError> {
        let block = match tag.name.local() {
            "p" => Block::Paragraph(Paragraph::default()),
            "subtitle" => Block::Subtitle(Paragraph::default()),
            "empty-line" => Block::EmptyLine(EmptyLine::default()),
            "poem" => Block::Poem(Poem::default()),
            "table" => Block::Table(Table::default()),
            "text-author" => return Ok(push_default(&mut self.text_authors)),
            _ => return Err(unexpected_element(tag)),
        };
        Ok(push_block(&mut self.content, block))
    }

    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        id_or_lang(attr, &mut self.id, &mut self.lang)
    }
}

impl Content for Cite {
    fn name(&self) -> Option<&QName> {
        Some(&self.name)
    }

    fn children(&self) -> Vec<&dyn Content> {
        entries(&self.content)
    }
}

/// Section of a body. Nested sections are kept in `content` in document
/// order alongside the other blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    pub name: QName,
    pub id: Option<String>,
    pub lang: Option<String>,
    pub title: Option<Title>,
    pub epigraphs: Vec<Epigraph>,
    /// Leading image, before any annotation or content.
    pub image: Option<Image>,
    pub annotation: Option<Annotation>,
    pub content: Vec<Block>,
}

impl Section {
    /// Nested sections in document order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.content.iter().filter_map(|block| match block {
            Block::Section(section) => Some(section),
            _ => None,
        })
    }
}

impl Node for Section {
    node_identity!();

    fn on_child_open(&mut self, tag: &OpenTag) -> Result<&mut dyn Node, ParseError> {
        let block = match tag.name.local() {
            "title" => return fill_slot(&mut self.title, tag),
            "epigraph" => return Ok(push_default(&mut self.epigraphs)),
            "annotation" => return fill_slot(&mut self.annotation, tag),
            "image"
                if self.image.is_none() && self.annotation.is_none() && self.content.is_empty() =>
            {
                return fill_slot(&mut self.image, tag);
            }
            "image" => Block::Image(Image::default()),
            "section" => Block::Section(Section::default()),
            "p" => Block::Paragraph(Paragraph::default()),
            "subtitle" => Block::Subtitle(Paragraph::default()),
            "empty-line" => Block::EmptyLine(EmptyLine::default()),
            "poem" => Block::Poem(Poem::default()),
            "cite" => Block::Cite(Cite::default()),
            "table" => Block::Table(Table::default()),
            _ => return Err(unexpected_element(tag)),
        };
        Ok(push_block(&mut self.content, block))
    }

    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        id_or_lang(attr, &mut self.id, &mut self.lang)
    }
}

impl Content for Section {
    fn name(&self) -> Option<&QName> {
        Some(&self.name)
    }

    fn children(&self) -> Vec<&dyn Content> {
        entries(&self.content)
    }
}

/// Main or notes body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    pub name: QName,
    /// The `name` attribute; `notes` marks the footnote body.
    pub body_name: Option<String>,
    pub lang: Option<String>,
    pub image: Option<Image>,
    pub title: Option<Title>,
    pub epigraphs: Vec<Epigraph>,
    pub sections: Vec<Section>,
}

impl Body {
    /// Find a section anywhere in this body by its `id`.
    #[must_use]
    pub fn find_section(&self, id: &str) -> Option<&Section> {
        fn find<'a>(section: &'a Section, id: &str) -> Option<&'a Section> {
            if section.id.as_deref() == Some(id) {
                return Some(section);
            }
            section.sections().find_map(|nested| find(nested, id))
        }
        self.sections.iter().find_map(|section| find(section, id))
    }
}

impl Node for Body {
    node_identity!();

    fn on_child_open(&mut self, tag: &OpenTag) -> Result<&mut dyn Node, ParseError> {
        match tag.name.local() {
            "image" => fill_slot(&mut self.image, tag),
            "title" => fill_slot(&mut self.title, tag),
            "epigraph" => Ok(push_default(&mut self.epigraphs)),
            "section" => Ok(push_default(&mut self.sections)),
            _ => Err(unexpected_element(tag)),
        }
    }

    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        if attr.name.local() == "name" {
            self.body_name = Some(attr.value.clone());
            Ok(())
        } else if is_lang(attr) {
            self.lang = Some(attr.value.clone());
            Ok(())
        } else {
            Err(unexpected_attribute(attr))
        }
    }
}

impl Content for Body {
    fn name(&self) -> Option<&QName> {
        Some(&self.name)
    }

    fn children(&self) -> Vec<&dyn Content> {
        entries(&self.sections)
    }
}
