//! Typed FictionBook schema.
//!
//! Structural elements keep their fixed slots as public fields and their
//! polymorphic children in an ordered list of one of the closed variant
//! types below. Each `on_child_open` only admits the families legal at that
//! position.
//!
//! - [`inline`]: paragraphs and mixed-content markup
//! - [`section`]: bodies, sections and the blocks that live in them
//! - [`poem`]: poems and stanzas
//! - [`table`]: tables, rows and cells
//! - [`description`]: the metadata block
//! - [`book`]: the top-level container and document entry points

pub mod book;
pub mod description;
pub mod inline;
pub mod poem;
pub mod section;
pub mod table;

pub use book::{parse_description, FictionBook, Parsed};
pub use description::{
    Author, Coverpage, CustomInfo, Description, DocumentInfo, Genre, OutputDocumentClass,
    PartInstruction, PublishInfo, Sequence, ShareInstruction, TitleInfo,
};
pub use inline::{Inline, InlineImage, Link, Markup, MarkupKind, Paragraph};
pub use poem::{Poem, PoemPart, Stanza};
pub use section::{Annotation, Body, Cite, EmptyLine, Epigraph, Image, Section, Title};
pub use table::{Cell, Row, Table};

use crate::config::XLINK_NAMESPACE;
use crate::content::Content;
use crate::node::Node;
use crate::xml::{Attribute, QName};

/// Free content of structural elements.
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::large_enum_variant)]
pub enum Block {
    Paragraph(Paragraph),
    Subtitle(Paragraph),
    EmptyLine(EmptyLine),
    Poem(Poem),
    Cite(Cite),
    Table(Table),
    Image(Image),
    Section(Section),
}

impl Block {
    /// The entry as a node, for attaching it to the driver.
    pub(crate) fn node_mut(&mut self) -> &mut dyn Node {
        match self {
            Self::Paragraph(p) | Self::Subtitle(p) => p,
            Self::EmptyLine(line) => line,
            Self::Poem(poem) => poem,
            Self::Cite(cite) => cite,
            Self::Table(table) => table,
            Self::Image(image) => image,
            Self::Section(section) => section,
        }
    }

    fn content(&self) -> &dyn Content {
        match self {
            Self::Paragraph(p) | Self::Subtitle(p) => p,
            Self::EmptyLine(line) => line,
            Self::Poem(poem) => poem,
            Self::Cite(cite) => cite,
            Self::Table(table) => table,
            Self::Image(image) => image,
            Self::Section(section) => section,
        }
    }
}

impl Content for Block {
    fn name(&self) -> Option<&QName> {
        self.content().name()
    }

    fn children(&self) -> Vec<&dyn Content> {
        self.content().children()
    }
}

/// Append a block to a content list and return it as the new active node.
pub(crate) fn push_block(content: &mut Vec<Block>, block: Block) -> &mut dyn Node {
    let index = content.len();
    content.push(block);
    content[index].node_mut()
}

/// Consume `xlink:type` / `xlink:href` into the given slots.
///
/// Returns `false` when the attribute is neither; a plain `type` or `href`
/// is not an xlink attribute.
pub(crate) fn xlink_attribute(
    attr: &Attribute,
    xlink_type: &mut Option<String>,
    href: &mut Option<String>,
) -> bool {
    if attr.name.is(Some(XLINK_NAMESPACE), "type") {
        *xlink_type = Some(attr.value.clone());
    } else if attr.name.is(Some(XLINK_NAMESPACE), "href") {
        *href = Some(attr.value.clone());
    } else {
        return false;
    }
    true
}
