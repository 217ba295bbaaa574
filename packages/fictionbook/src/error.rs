//! Error types for the parser.
//!
//! Uses the dual-error pattern: `ParseError` describes a single issue found
//! while dispatching tokens and is collected into a `ParseErrors` aggregate
//! per parse call, while `Fb2Error` covers the hard failures of the
//! document-level entry points.

use std::fmt;

use thiserror::Error;

use crate::xml::QName;

/// Error reported by a token source while reading input.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The streaming XML reader failed.
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Any other read failure.
    #[error("{0}")]
    Read(String),
}

/// Class of a parse issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unknown or misplaced element, mismatched close tag.
    Structural,
    /// Unknown attribute or malformed attribute value.
    Attribute,
    /// Malformed element content (numeric text, base64).
    Content,
    /// The token source failed.
    Source,
}

/// A single issue found while parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Element not allowed at this position.
    #[error("unexpected element <{tag}>")]
    UnexpectedElement { tag: QName },

    /// Second occurrence of a single-valued slot.
    #[error("duplicate element <{tag}>")]
    DuplicateElement { tag: QName },

    /// A second main body, or a second notes body.
    #[error("duplicate body{}", .name.as_ref().map(|n| format!(" with name=\"{n}\"")).unwrap_or_default())]
    DuplicateBody { name: Option<String> },

    /// Body with a name other than the notes marker.
    #[error("unexpected body with name=\"{name}\"")]
    UnexpectedBody { name: String },

    /// Close tag does not match the active element. Fatal for the call.
    #[error("unexpected close tag </{found}>, expected </{expected}>")]
    MismatchedClose { expected: QName, found: QName },

    /// Element nested deeper than the configured limit.
    #[error("element <{tag}> exceeds the maximum nesting depth of {limit}")]
    TooDeep { tag: QName, limit: usize },

    /// The token stream ended before any element was opened.
    #[error("no root element")]
    MissingRoot,

    /// Attribute not allowed on this element.
    #[error("unexpected attribute {name}=\"{value}\"")]
    UnexpectedAttribute { name: QName, value: String },

    /// Attribute value is not a valid number.
    #[error("invalid numeric attribute {name}=\"{value}\": {reason}")]
    InvalidNumberAttribute {
        name: QName,
        value: String,
        reason: String,
    },

    /// Attribute value is not a `YYYY-MM-DD` calendar date.
    #[error("invalid date {name}=\"{value}\", expected YYYY-MM-DD")]
    InvalidDate { name: QName, value: String },

    /// Element text is not a valid number.
    #[error("invalid numeric content '{value}' in <{tag}>: {reason}")]
    InvalidNumber {
        tag: QName,
        value: String,
        reason: String,
    },

    /// Binary payload is not valid base64.
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// The token source failed.
    #[error("token source failed: {0}")]
    Source(#[from] SourceError),
}

impl ParseError {
    /// Classify the issue.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnexpectedElement { .. }
            | Self::DuplicateElement { .. }
            | Self::DuplicateBody { .. }
            | Self::UnexpectedBody { .. }
            | Self::MismatchedClose { .. }
            | Self::TooDeep { .. }
            | Self::MissingRoot => ErrorKind::Structural,
            Self::UnexpectedAttribute { .. }
            | Self::InvalidNumberAttribute { .. }
            | Self::InvalidDate { .. } => ErrorKind::Attribute,
            Self::InvalidNumber { .. } | Self::InvalidBase64(_) => ErrorKind::Content,
            Self::Source(_) => ErrorKind::Source,
        }
    }

    /// Whether this issue stops dispatch for the enclosing call.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MismatchedClose { .. })
    }
}

/// A parse issue together with the element path where it was found.
#[derive(Debug)]
pub struct Issue {
    /// Slash-separated local names from the call root, e.g. `body/section/p`.
    pub path: String,
    pub error: ParseError,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.error)
        } else {
            write!(f, "{}: {}", self.path, self.error)
        }
    }
}

/// Aggregate of every issue found during one bounded parse call.
///
/// A non-empty aggregate means the tree was built with noted defects; it is
/// up to the caller to decide whether that is acceptable.
#[derive(Debug, Default)]
pub struct ParseErrors {
    element: QName,
    issues: Vec<Issue>,
}

impl ParseErrors {
    /// Create an empty aggregate for a call rooted at `element`.
    #[must_use]
    pub fn new(element: QName) -> Self {
        Self {
            element,
            issues: Vec::new(),
        }
    }

    /// Record an issue.
    pub fn push(&mut self, path: impl Into<String>, error: ParseError) {
        self.issues.push(Issue {
            path: path.into(),
            error,
        });
    }

    /// Root element of the call this aggregate belongs to.
    #[must_use]
    pub fn element(&self) -> &QName {
        &self.element
    }

    /// All recorded issues in detection order.
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Iterate over the recorded issues.
    pub fn iter(&self) -> std::slice::Iter<'_, Issue> {
        self.issues.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Whether dispatch stopped early because of a fatal issue.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.issues.iter().any(|issue| issue.error.is_fatal())
    }

    /// Number of issues of the given class.
    #[must_use]
    pub fn count(&self, kind: ErrorKind) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.error.kind() == kind)
            .count()
    }

    /// `Ok(())` when no issue was recorded, the aggregate otherwise.
    pub fn into_result(self) -> std::result::Result<(), ParseErrors> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error while parsing {}: [", self.element)?;
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{issue}")?;
        }
        f.write_str("]")
    }
}

impl std::error::Error for ParseErrors {}

impl<'a> IntoIterator for &'a ParseErrors {
    type Item = &'a Issue;
    type IntoIter = std::slice::Iter<'a, Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.iter()
    }
}

/// Main error type for the document-level entry points.
#[derive(Debug, Error)]
pub enum Fb2Error {
    /// The input is not well-formed XML.
    #[error("XML parsing failed: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The document root is not a `FictionBook` element.
    #[error("Expected <FictionBook> root element, found <{found}>")]
    UnexpectedRoot { found: QName },
}

/// Result type alias for document-level operations.
pub type Result<T> = std::result::Result<T, Fb2Error>;
