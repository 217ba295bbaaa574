//! FictionBook - Parse FB2 e-books into typed, navigable document trees.
//!
//! This crate turns FictionBook 2 XML into a tree of typed schema nodes.
//! Parsing is tolerant: recoverable problems (unknown elements, bad
//! attribute values, broken base64) are collected next to the tree instead
//! of aborting.
//!
//! # Example
//!
//! ```
//! use fictionbook::{content, FictionBook};
//!
//! let xml = r#"<FictionBook xmlns="http://www.gribuser.ru/xml/fictionbook/2.0">
//!   <description><title-info><book-title>Tales</book-title></title-info></description>
//!   <body><section><p>Once upon a <emphasis>time</emphasis>.</p></section></body>
//! </FictionBook>"#;
//!
//! let parsed = FictionBook::parse_str(xml).unwrap();
//! assert!(parsed.is_clean());
//!
//! let book = parsed.tree;
//! assert_eq!(book.title(), Some("Tales"));
//! let body = book.body.as_ref().unwrap();
//! assert_eq!(content::plain_text(body), "Once upon a time.");
//! ```
//!
//! # Architecture
//!
//! The parser is organized into several modules:
//!
//! - [`config`]: Constants, date validation and parse options
//! - [`error`]: Error types, the per-call issue aggregate and Result alias
//! - [`xml`]: Token stream types, a roxmltree document walk and a streaming
//!   quick-xml reader
//! - [`node`]: The contract every schema type implements for dispatch
//! - [`driver`]: Stack machine feeding tokens into nodes
//! - [`content`]: Uniform read interface over the parsed tree
//! - [`binding`]: Leaf sinks for fixed-field elements
//! - [`schema`]: The FictionBook element types

pub mod binding;
pub mod config;
pub mod content;
pub mod driver;
pub mod error;
pub mod node;
pub mod schema;
pub mod xml;

// Re-export main entry points
pub use schema::{parse_description, FictionBook, Parsed};

// Re-export commonly used items
pub use config::ParseOptions;
pub use content::Content;
pub use driver::Driver;
pub use error::{ErrorKind, Fb2Error, ParseError, ParseErrors, Result};
pub use node::Node;
