//! Token stream abstraction and the token sources over XML text.

mod source;
mod token;

pub use source::{ReaderTokens, XmlTokens};
pub use token::{Attribute, OpenTag, QName, Token, TokenSource, TokenSourceExt, UntilClose};
