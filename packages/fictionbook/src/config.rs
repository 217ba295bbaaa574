//! Configuration constants and validation functions for the parser.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

/// Namespace of the FictionBook 2.0 vocabulary.
pub const FB2_NAMESPACE: &str = "http://www.gribuser.ru/xml/fictionbook/2.0";

/// XLink namespace used by `href`/`type` on links and images.
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

/// The reserved `xml:` namespace (`xml:lang`).
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Calendar date format of `value` attributes on date elements.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Local name of the document element.
pub const ROOT_ELEMENT: &str = "FictionBook";

/// Value of the `name` attribute that marks the secondary (footnotes) body.
pub const NOTES_BODY_NAME: &str = "notes";

/// Default maximum element nesting depth.
///
/// Real books nest sections a dozen levels deep at most; anything far beyond
/// this is treated as hostile input and skipped.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Date pattern: YYYY-MM-DD.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// Options for a single parse call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum element nesting depth, the root element included.
    pub max_depth: usize,
}

impl ParseOptions {
    /// Create options with the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a calendar date in the fixed `YYYY-MM-DD` format.
///
/// # Returns
/// * `Some(date)` if the value has the expected shape and is a real date
/// * `None` otherwise
///
/// # Examples
/// ```
/// use fictionbook::config::parse_date;
///
/// assert!(parse_date("2007-03-21").is_some());
/// assert!(parse_date("21.03.2007").is_none());
/// assert!(parse_date("2007-13-01").is_none()); // Invalid month
/// ```
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if !DATE_PATTERN.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}
