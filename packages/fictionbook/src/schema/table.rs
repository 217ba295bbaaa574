//! Tables: rows of header and data cells with inline content.

use crate::content::{entries, Content};
use crate::error::ParseError;
use crate::node::{
    is_lang, node_identity, parse_number_attr, push_default, unexpected_attribute,
    unexpected_element, Node,
};
use crate::schema::inline::Inline;
use crate::schema::Paragraph;
use crate::xml::{Attribute, OpenTag, QName};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub name: QName,
    pub id: Option<String>,
    pub style: Option<String>,
    pub rows: Vec<Row>,
}

impl Node for Table {
    node_identity!();

    fn on_child_open(&mut self, tag: &OpenTag) -> Result<&mut dyn Node, ParseError> {
        match tag.name.local() {
            "tr" => Ok(push_default(&mut self.rows)),
            _ => Err(unexpected_element(tag)),
        }
    }

    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        match attr.name.local() {
            "id" => self.id = Some(attr.value.clone()),
            "style" => self.style = Some(attr.value.clone()),
            _ => return Err(unexpected_attribute(attr)),
        }
        Ok(())
    }
}

impl Content for Table {
    fn name(&self) -> Option<&QName> {
        Some(&self.name)
    }

    fn children(&self) -> Vec<&dyn Content> {
        entries(&self.rows)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub name: QName,
    pub align: Option<String>,
    pub cells: Vec<Cell>,
}

impl Node for Row {
    node_identity!();

    fn on_child_open(&mut self, tag: &OpenTag) -> Result<&mut dyn Node, ParseError> {
        match tag.name.local() {
            "th" | "td" => Ok(push_default(&mut self.cells)),
            _ => Err(unexpected_element(tag)),
        }
    }

    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        if attr.name.local() == "align" {
            self.align = Some(attr.value.clone());
            Ok(())
        } else {
            Err(unexpected_attribute(attr))
        }
    }
}

impl Content for Row {
    fn name(&self) -> Option<&QName> {
        Some(&self.name)
    }

    fn children(&self) -> Vec<&dyn Content> {
        entries(&self.cells)
    }
}

/// Header (`th`) or data (`td`) cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub name: QName,
    pub id: Option<String>,
    pub style: Option<String>,
    pub colspan: Option<u32>,
    pub rowspan: Option<u32>,
    pub align: Option<String>,
    pub valign: Option<String>,
    pub lang: Option<String>,
    /// Mixed content; the paragraph carries the runs.
    body: Paragraph,
}

impl Cell {
    /// Whether this is a header cell.
    #[must_use]
    pub fn is_header(&self) -> bool {
        self.name.local() == "th"
    }

    /// Mixed content of the cell.
    #[must_use]
    pub fn content(&self) -> &[Inline] {
        &self.body.content
    }
}

impl Node for Cell {
    node_identity!();

    fn on_child_open(&mut self, tag: &OpenTag) -> Result<&mut dyn Node, ParseError> {
        self.body.on_child_open(tag)
    }

    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        match attr.name.local() {
            "id" => self.id = Some(attr.value.clone()),
            "style" => self.style = Some(attr.value.clone()),
            "colspan" => self.colspan = Some(parse_number_attr(attr)?),
            "rowspan" => self.rowspan = Some(parse_number_attr(attr)?),
            "align" => self.align = Some(attr.value.clone()),
            "valign" => self.valign = Some(attr.value.clone()),
            _ if is_lang(attr) => self.lang = Some(attr.value.clone()),
            _ => return Err(unexpected_attribute(attr)),
        }
        Ok(())
    }

    fn on_text(&mut self, run: &str) -> Result<(), ParseError> {
        self.body.on_text(run)
    }
}

impl Content for Cell {
    fn name(&self) -> Option<&QName> {
        Some(&self.name)
    }

    fn children(&self) -> Vec<&dyn Content> {
        self.body.children()
    }
}
