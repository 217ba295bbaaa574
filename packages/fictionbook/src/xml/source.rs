//! Token sources: a walk over a parsed `roxmltree` document and a streaming
//! `quick_xml` reader.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use roxmltree::{Document, ExpandedName, Node};

use super::token::{Attribute, OpenTag, QName, Token};
use crate::error::SourceError;

/// Streams open/close/text events out of a `roxmltree` document.
///
/// Comments and processing instructions are dropped. Namespace
/// declarations are not reported as attributes.
///
/// # Examples
/// ```
/// use fictionbook::xml::{Token, XmlTokens};
///
/// let doc = roxmltree::Document::parse("<p>hi<strong>there</strong></p>").unwrap();
/// let tokens: Vec<Token> = XmlTokens::new(&doc).map(Result::unwrap).collect();
///
/// assert_eq!(tokens[0], Token::open("p"));
/// assert_eq!(tokens[1], Token::text("hi"));
/// assert_eq!(tokens.len(), 6);
/// ```
pub struct XmlTokens<'a, 'input> {
    /// Node to visit next; `None` means the innermost open element closes.
    next: Option<Node<'a, 'input>>,
    /// Elements opened and not yet closed.
    open: Vec<Node<'a, 'input>>,
}

impl<'a, 'input> XmlTokens<'a, 'input> {
    /// Stream the whole document.
    #[must_use]
    pub fn new(doc: &'a Document<'input>) -> Self {
        Self {
            next: Some(doc.root_element()),
            open: Vec::new(),
        }
    }
}

impl Iterator for XmlTokens<'_, '_> {
    type Item = Result<Token, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(node) = self.next.take() else {
                let element = self.open.pop()?;
                // Siblings of the root element are not part of the stream
                if !self.open.is_empty() {
                    self.next = element.next_sibling();
                }
                return Some(Ok(Token::Close(qname(element.tag_name()))));
            };

            if node.is_element() {
                self.next = node.first_child();
                self.open.push(node);
                return Some(Ok(Token::Open(open_tag(node))));
            }

            self.next = node.next_sibling();
            if node.is_text() {
                return Some(Ok(Token::Text(node.text().unwrap_or_default().to_string())));
            }
        }
    }
}

/// Streams open/close/text events straight from XML text, one event at a
/// time.
///
/// Nothing past the last pulled token is read, so a bounded parse stops
/// before damaged or truncated input further on. Reader failures surface as
/// [`SourceError::Xml`] and end the stream. Close tags are not checked
/// against open tags here; the driver reports mismatches.
///
/// # Examples
/// ```
/// use fictionbook::xml::{ReaderTokens, Token};
///
/// let tokens: Vec<Token> = ReaderTokens::from_str("<p>hi<br/></p>")
///     .map(Result::unwrap)
///     .collect();
///
/// assert_eq!(tokens[2], Token::open("br"));
/// assert_eq!(tokens[3], Token::close("br"));
/// assert_eq!(tokens.len(), 5);
/// ```
pub struct ReaderTokens<'input> {
    reader: NsReader<&'input [u8]>,
    /// Close half of a self-closing tag.
    pending_close: Option<QName>,
    done: bool,
}

impl<'input> ReaderTokens<'input> {
    /// Stream events from an XML string.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(xml: &'input str) -> Self {
        let mut reader = NsReader::from_str(xml);
        reader.config_mut().check_end_names = false;
        Self {
            reader,
            pending_close: None,
            done: false,
        }
    }

    fn read(&mut self) -> Result<Option<Token>, SourceError> {
        loop {
            let (ns, event) = self.reader.read_resolved_event()?;
            let namespace = namespace_of(ns);
            let token = match event {
                Event::Start(start) => Token::Open(self.start_tag(namespace, &start)?),
                Event::Empty(start) => {
                    let tag = self.start_tag(namespace, &start)?;
                    self.pending_close = Some(tag.name.clone());
                    Token::Open(tag)
                }
                Event::End(end) => Token::Close(QName {
                    namespace,
                    local: String::from_utf8_lossy(end.local_name().as_ref()).into_owned(),
                }),
                Event::Text(text) => Token::Text(text.unescape()?.into_owned()),
                Event::CData(cdata) => Token::Text(String::from_utf8_lossy(&cdata).into_owned()),
                Event::Eof => return Ok(None),
                _ => continue,
            };
            return Ok(Some(token));
        }
    }

    fn start_tag(
        &self,
        namespace: Option<String>,
        start: &BytesStart<'_>,
    ) -> Result<OpenTag, SourceError> {
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = attr.key.as_ref();
            if key == b"xmlns" || key.starts_with(b"xmlns:") {
                continue;
            }
            let (attr_ns, local) = self.reader.resolve_attribute(attr.key);
            attributes.push(Attribute {
                name: QName {
                    namespace: namespace_of(attr_ns),
                    local: String::from_utf8_lossy(local.as_ref()).into_owned(),
                },
                value: attr.unescape_value()?.into_owned(),
            });
        }
        Ok(OpenTag {
            name: QName {
                namespace,
                local: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            },
            attributes,
        })
    }
}

impl Iterator for ReaderTokens<'_> {
    type Item = Result<Token, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(name) = self.pending_close.take() {
            return Some(Ok(Token::Close(name)));
        }
        if self.done {
            return None;
        }
        match self.read() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

fn namespace_of(ns: ResolveResult<'_>) -> Option<String> {
    match ns {
        ResolveResult::Bound(namespace) => {
            Some(String::from_utf8_lossy(namespace.as_ref()).into_owned())
        }
        _ => None,
    }
}

fn qname(name: ExpandedName<'_, '_>) -> QName {
    QName {
        namespace: name.namespace().map(str::to_string),
        local: name.name().to_string(),
    }
}

fn open_tag(node: Node<'_, '_>) -> OpenTag {
    OpenTag {
        name: qname(node.tag_name()),
        attributes: node
            .attributes()
            .map(|attr| Attribute {
                name: QName {
                    namespace: attr.namespace().map(str::to_string),
                    local: attr.name().to_string(),
                },
                value: attr.value().to_string(),
            })
            .collect(),
    }
}
