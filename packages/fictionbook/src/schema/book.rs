//! The `<FictionBook>` container and the document entry points.

use roxmltree::Document;

use crate::binding::{Binary, Stylesheet};
use crate::config::{NOTES_BODY_NAME, ROOT_ELEMENT};
use crate::content::Content;
use crate::driver::Driver;
use crate::error::{Fb2Error, ParseError, ParseErrors, Result};
use crate::node::{fill_slot, node_identity, push_default, unexpected_element, Node};
use crate::schema::{Body, Description};
use crate::xml::{OpenTag, QName, ReaderTokens, Token, TokenSource, TokenSourceExt, XmlTokens};

/// A parsed tree together with the issues found while building it.
#[derive(Debug)]
pub struct Parsed<T> {
    pub tree: T,
    /// Empty when the input was parsed without issues.
    pub errors: ParseErrors,
}

impl<T> Parsed<T> {
    /// Whether no issue was recorded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// The tree when no issue was recorded, the issues otherwise.
    ///
    /// # Errors
    /// Returns the aggregate when at least one issue was recorded.
    pub fn into_result(self) -> std::result::Result<T, ParseErrors> {
        self.errors.into_result().map(|()| self.tree)
    }
}

/// A whole FictionBook document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FictionBook {
    pub name: QName,
    /// Stylesheets in document order.
    pub stylesheets: Vec<Stylesheet>,
    pub description: Option<Description>,
    /// The unnamed main body.
    pub body: Option<Body>,
    /// The `name="notes"` body.
    pub notes: Option<Body>,
    pub binaries: Vec<Binary>,
}

impl FictionBook {
    /// Parse a UTF-8 FictionBook document.
    ///
    /// Malformed XML and a foreign root element are hard errors; every
    /// other problem is collected in [`Parsed::errors`] next to the tree.
    ///
    /// # Errors
    /// Returns `Fb2Error::Xml` for malformed XML and
    /// `Fb2Error::UnexpectedRoot` when the root is not `<FictionBook>`.
    pub fn parse_str(xml: &str) -> Result<Parsed<Self>> {
        let doc = parse_document(xml)?;
        Ok(Self::from_tokens(&mut XmlTokens::new(&doc)))
    }

    /// Run the parser over any token source.
    pub fn from_tokens<S: TokenSource>(source: &mut S) -> Parsed<Self> {
        let mut book = Self::default();
        let errors = match Driver::new(source).parse_root(&mut book) {
            Ok(()) => ParseErrors::new(book.name.clone()),
            Err(errors) => errors,
        };
        Parsed { tree: book, errors }
    }

    /// Binary referenced by an `xlink:href` such as `#cover.jpg`.
    #[must_use]
    pub fn binary(&self, href: &str) -> Option<&Binary> {
        let id = href.strip_prefix('#').unwrap_or(href);
        self.binaries.iter().find(|binary| binary.id == id)
    }

    /// Book title from the title info, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.description
            .as_ref()?
            .title_info
            .as_ref()?
            .book_title
            .as_ref()
            .map(|title| title.as_str())
    }

    fn open_body(&mut self, tag: &OpenTag) -> std::result::Result<&mut dyn Node, ParseError> {
        match tag.attribute("name") {
            None if self.body.is_some() => Err(ParseError::DuplicateBody { name: None }),
            None => fill_slot(&mut self.body, tag),
            Some(NOTES_BODY_NAME) if self.notes.is_some() => Err(ParseError::DuplicateBody {
                name: Some(NOTES_BODY_NAME.to_string()),
            }),
            Some(NOTES_BODY_NAME) => fill_slot(&mut self.notes, tag),
            Some(other) => Err(ParseError::UnexpectedBody {
                name: other.to_string(),
            }),
        }
    }
}

impl Node for FictionBook {
    node_identity!();

    fn on_child_open(&mut self, tag: &OpenTag) -> std::result::Result<&mut dyn Node, ParseError> {
        match tag.name.local() {
            "stylesheet" => Ok(push_default(&mut self.stylesheets)),
            "description" => fill_slot(&mut self.description, tag),
            "body" => self.open_body(tag),
            "binary" => Ok(push_default(&mut self.binaries)),
            _ => Err(unexpected_element(tag)),
        }
    }
}

/// The main body, then the notes body.
impl Content for FictionBook {
    fn name(&self) -> Option<&QName> {
        Some(&self.name)
    }

    fn children(&self) -> Vec<&dyn Content> {
        self.body
            .iter()
            .chain(self.notes.iter())
            .map(|body| body as &dyn Content)
            .collect()
    }
}

/// Parse only the metadata: tokens stop right after `</description>`.
///
/// The input is read as a stream, so nothing after `</description>` is
/// looked at; a document that is damaged or cut off inside its bodies still
/// yields its metadata. Malformed XML before that point is reported as a
/// source issue in [`Parsed::errors`].
///
/// The returned book holds the stylesheets and the description and no
/// bodies or binaries.
///
/// # Errors
/// Returns `Fb2Error::UnexpectedRoot` when the root is not `<FictionBook>`.
pub fn parse_description(xml: &str) -> Result<Parsed<FictionBook>> {
    let mut source = ReaderTokens::from_str(xml).peekable();
    while let Some(Ok(Token::Text(_))) = source.peek() {
        source.next();
    }
    if let Some(Ok(Token::Open(root))) = source.peek() {
        check_root(&root.name)?;
    }
    Ok(FictionBook::from_tokens(
        &mut source.until_close("description"),
    ))
}

fn parse_document(xml: &str) -> Result<Document<'_>> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element().tag_name();
    check_root(&QName {
        namespace: root.namespace().map(str::to_string),
        local: root.name().to_string(),
    })?;
    Ok(doc)
}

fn check_root(name: &QName) -> Result<()> {
    if name.local() != ROOT_ELEMENT {
        return Err(Fb2Error::UnexpectedRoot {
            found: name.clone(),
        });
    }
    Ok(())
}
