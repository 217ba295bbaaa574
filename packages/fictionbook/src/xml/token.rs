//! Token stream types consumed by the driver.
//!
//! A token source turns raw document bytes into a flat sequence of
//! open-tag, close-tag and text-run events in document order. Names are
//! namespace-qualified so that identically named attributes from different
//! namespaces (`type` vs `xlink:type`) stay distinguishable.

use std::fmt;

use crate::config::{XLINK_NAMESPACE, XML_NAMESPACE};
use crate::error::SourceError;

/// A namespace-qualified element or attribute name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI, `None` for unqualified names.
    pub namespace: Option<String>,
    /// Local part of the name.
    pub local: String,
}

impl QName {
    /// Create an unqualified name.
    #[must_use]
    pub fn new(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local: local.into(),
        }
    }

    /// Create a name in the given namespace.
    #[must_use]
    pub fn namespaced(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local: local.into(),
        }
    }

    /// Local part of the name.
    #[must_use]
    pub fn local(&self) -> &str {
        &self.local
    }

    /// Namespace URI, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Check whether the name has the given namespace and local part.
    #[must_use]
    pub fn is(&self, namespace: Option<&str>, local: &str) -> bool {
        self.namespace() == namespace && self.local == local
    }
}

/// Names render with the conventional prefix for the xlink and xml
/// namespaces and as the bare local name otherwise.
impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.namespace() {
            Some(XLINK_NAMESPACE) => write!(f, "xlink:{}", self.local),
            Some(XML_NAMESPACE) => write!(f, "xml:{}", self.local),
            _ => f.write_str(&self.local),
        }
    }
}

/// A single attribute of an open tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

impl Attribute {
    /// Create an unqualified attribute.
    #[must_use]
    pub fn new(local: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: QName::new(local),
            value: value.into(),
        }
    }

    /// Create an attribute in the given namespace.
    #[must_use]
    pub fn namespaced(
        namespace: impl Into<String>,
        local: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: QName::namespaced(namespace, local),
            value: value.into(),
        }
    }
}

/// An open-tag event: element name plus its attributes in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenTag {
    pub name: QName,
    pub attributes: Vec<Attribute>,
}

impl OpenTag {
    /// Create an open tag with an unqualified name and no attributes.
    #[must_use]
    pub fn new(local: impl Into<String>) -> Self {
        Self {
            name: QName::new(local),
            attributes: Vec::new(),
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attribute(mut self, attr: Attribute) -> Self {
        self.attributes.push(attr);
        self
    }

    /// Value of the first attribute with the given local name, any namespace.
    #[must_use]
    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name.local == local)
            .map(|attr| attr.value.as_str())
    }
}

/// One event of the token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Open(OpenTag),
    Close(QName),
    Text(String),
}

impl Token {
    /// Open tag with an unqualified name and no attributes.
    #[must_use]
    pub fn open(local: impl Into<String>) -> Self {
        Self::Open(OpenTag::new(local))
    }

    /// Close tag with an unqualified name.
    #[must_use]
    pub fn close(local: impl Into<String>) -> Self {
        Self::Close(QName::new(local))
    }

    /// Text run.
    #[must_use]
    pub fn text(run: impl Into<String>) -> Self {
        Self::Text(run.into())
    }
}

/// Anything that yields tokens in document order.
///
/// `None` means the input was consumed cleanly; `Some(Err(_))` is a read
/// failure which stops the current call.
pub trait TokenSource: Iterator<Item = Result<Token, SourceError>> {}

impl<I> TokenSource for I where I: Iterator<Item = Result<Token, SourceError>> {}

/// Adapters for bounded parsing on top of any token source.
pub trait TokenSourceExt: TokenSource + Sized {
    /// Stop yielding tokens right after the first close tag with the given
    /// local name.
    fn until_close(self, local: impl Into<String>) -> UntilClose<Self> {
        UntilClose {
            inner: self,
            local: local.into(),
            done: false,
        }
    }
}

impl<S: TokenSource> TokenSourceExt for S {}

/// Token source that ends cleanly after a chosen close tag.
///
/// Created by [`TokenSourceExt::until_close`].
#[derive(Debug)]
pub struct UntilClose<S> {
    inner: S,
    local: String,
    done: bool,
}

impl<S: TokenSource> Iterator for UntilClose<S> {
    type Item = Result<Token, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.inner.next()?;
        if let Ok(Token::Close(name)) = &item {
            if name.local == self.local {
                self.done = true;
            }
        }
        Some(item)
    }
}
