//! Poems and stanzas.

use crate::binding::DateField;
use crate::content::{entries, Content};
use crate::error::ParseError;
use crate::node::{
    fill_slot, is_lang, node_identity, push_default, unexpected_attribute, unexpected_element,
    Node,
};
use crate::schema::{Epigraph, Paragraph, Title};
use crate::xml::{Attribute, OpenTag, QName};

/// Free content of a poem.
#[derive(Debug, Clone, PartialEq)]
pub enum PoemPart {
    Subtitle(Paragraph),
    Stanza(Stanza),
}

impl Content for PoemPart {
    fn name(&self) -> Option<&QName> {
        match self {
            Self::Subtitle(subtitle) => subtitle.name(),
            Self::Stanza(stanza) => stanza.name(),
        }
    }

    fn children(&self) -> Vec<&dyn Content> {
        match self {
            Self::Subtitle(subtitle) => subtitle.children(),
            Self::Stanza(stanza) => stanza.children(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Poem {
    pub name: QName,
    pub id: Option<String>,
    pub lang: Option<String>,
    pub title: Option<Title>,
    pub epigraphs: Vec<Epigraph>,
    /// Subtitles and stanzas in document order.
    pub content: Vec<PoemPart>,
    pub text_authors: Vec<Paragraph>,
    pub date: Option<DateField>,
}

impl Poem {
    /// Stanzas in document order.
    pub fn stanzas(&self) -> impl Iterator<Item = &Stanza> {
        self.content.iter().filter_map(|part| match part {
            PoemPart::Stanza(stanza) => Some(stanza),
            PoemPart::Subtitle(_) => None,
        })
    }
}

impl Node for Poem {
    node_identity!();

    fn on_child_open(&mut self, tag: &OpenTag) -> Result<&mut dyn Node, ParseError> {
        let part = match tag.name.local() {
            "title" => return fill_slot(&mut self.title, tag),
            "epigraph" => return Ok(push_default(&mut self.epigraphs)),
            "text-author" => return Ok(push_default(&mut self.text_authors)),
            "date" => return fill_slot(&mut self.date, tag),
            "subtitle" => PoemPart::Subtitle(Paragraph::default()),
            "stanza" => PoemPart::Stanza(Stanza::default()),
            _ => return Err(unexpected_element(tag)),
        };
        let index = self.content.len();
        self.content.push(part);
        let node: &mut dyn Node = match &mut self.content[index] {
            PoemPart::Subtitle(subtitle) => subtitle,
            PoemPart::Stanza(stanza) => stanza,
        };
        Ok(node)
    }

    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        match attr.name.local() {
            "id" => self.id = Some(attr.value.clone()),
            _ if is_lang(attr) => self.lang = Some(attr.value.clone()),
            _ => return Err(unexpected_attribute(attr)),
        }
        Ok(())
    }
}

impl Content for Poem {
    fn name(&self) -> Option<&QName> {
        Some(&self.name)
    }

    fn children(&self) -> Vec<&dyn Content> {
        entries(&self.content)
    }
}

/// Stanza; its lines are the content, whatever the title slots hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stanza {
    pub name: QName,
    pub lang: Option<String>,
    pub title: Option<Title>,
    pub subtitle: Option<Paragraph>,
    /// `v` lines.
    pub lines: Vec<Paragraph>,
}

impl Node for Stanza {
    node_identity!();

    fn on_child_open(&mut self, tag: &OpenTag) -> Result<&mut dyn Node, ParseError> {
        match tag.name.local() {
            "title" => fill_slot(&mut self.title, tag),
            "subtitle" => fill_slot(&mut self.subtitle, tag),
            "v" => Ok(push_default(&mut self.lines)),
            _ => Err(unexpected_element(tag)),
        }
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

impl Content for Stanza {
    fn name(&self) -> Option<&QName> {
        Some(&self.name)
    }

    fn children(&self) -> Vec<&dyn Content> {
        entries(&self.lines)
    }
}
