//! Stack machine that feeds a token stream into a tree of nodes.
//!
//! The driver owns nothing but the stack of open identities; the nodes
//! themselves are borrowed from the caller's tree. Every open tag asks the
//! active node for a child, every close tag seals the active node, and every
//! problem on the way is recorded instead of aborting, except a close tag
//! that does not match the active element.

use crate::config::ParseOptions;
use crate::error::{ParseError, ParseErrors};
use crate::node::Node;
use crate::xml::{OpenTag, QName, Token, TokenSource};

/// How a bounded run over a subtree ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// The element closed normally.
    Closed,
    /// Input ended, the source failed or a fatal issue was hit.
    Stopped,
}

/// Drives one bounded parse call over a token source.
///
/// A driver is consumed by its parse call; run a new one for every
/// element that should get its own error aggregate.
///
/// # Examples
/// ```
/// use fictionbook::driver::Driver;
/// use fictionbook::error::SourceError;
/// use fictionbook::schema::Paragraph;
/// use fictionbook::xml::{OpenTag, Token};
/// use fictionbook::Content;
///
/// let mut source = vec![Token::text("Hello"), Token::close("p")]
///     .into_iter()
///     .map(Ok::<Token, SourceError>);
/// let mut paragraph = Paragraph::default();
///
/// Driver::new(&mut source)
///     .parse(&mut paragraph, &OpenTag::new("p"))
///     .unwrap();
/// assert_eq!(paragraph.children()[0].text(), "Hello");
/// ```
pub struct Driver<'s, S> {
    source: &'s mut S,
    options: ParseOptions,
    stack: Vec<QName>,
    errors: ParseErrors,
}

impl<'s, S: TokenSource> Driver<'s, S> {
    /// Create a driver with default options.
    #[must_use]
    pub fn new(source: &'s mut S) -> Self {
        Self::with_options(source, ParseOptions::default())
    }

    /// Create a driver with explicit options.
    #[must_use]
    pub fn with_options(source: &'s mut S, options: ParseOptions) -> Self {
        Self {
            source,
            options,
            stack: Vec::new(),
            errors: ParseErrors::default(),
        }
    }

    /// Parse the element opened by `start` into `root`.
    ///
    /// The source must be positioned right after `start`. Dispatch ends at
    /// the matching close tag, at the end of input, or at the first fatal
    /// issue; tokens after that point are left in the source.
    ///
    /// # Errors
    /// Returns every issue recorded for the element and its subtree.
    pub fn parse(mut self, root: &mut dyn Node, start: &OpenTag) -> Result<(), ParseErrors> {
        self.errors = ParseErrors::new(start.name.clone());
        self.enter(root, start);
        self.drive(root);
        self.finish()
    }

    /// Pull tokens up to the first open tag and parse that element into
    /// `root`. Leading text is ignored.
    ///
    /// # Errors
    /// Returns every issue recorded for the element and its subtree, or a
    /// single `MissingRoot` issue when the stream holds no element.
    pub fn parse_root(mut self, root: &mut dyn Node) -> Result<(), ParseErrors> {
        loop {
            match self.next_token() {
                Some(Token::Open(start)) => return self.parse(root, &start),
                Some(Token::Text(_)) => {}
                Some(Token::Close(found)) => {
                    self.errors = ParseErrors::new(found.clone());
                    self.halt(ParseError::MismatchedClose {
                        expected: root.identity().clone(),
                        found,
                    });
                    return self.finish();
                }
                None => {
                    if self.errors.is_empty() {
                        self.record(ParseError::MissingRoot);
                    }
                    return self.finish();
                }
            }
        }
    }

    /// Make `node` the active element for `tag`.
    fn enter(&mut self, node: &mut dyn Node, tag: &OpenTag) {
        self.stack.push(tag.name.clone());
        node.set_identity(tag.name.clone());
        for attr in &tag.attributes {
            if let Err(err) = node.on_attribute(attr) {
                self.record(err);
            }
        }
    }

    fn drive(&mut self, node: &mut dyn Node) -> Flow {
        loop {
            let Some(token) = self.next_token() else {
                return Flow::Stopped;
            };

            match token {
                Token::Open(tag) => {
                    if self.stack.len() >= self.options.max_depth {
                        self.record(ParseError::TooDeep {
                            tag: tag.name.clone(),
                            limit: self.options.max_depth,
                        });
                        if self.skip(&tag.name) == Flow::Stopped {
                            return Flow::Stopped;
                        }
                        continue;
                    }

                    let flow = match node.on_child_open(&tag) {
                        Ok(child) => {
                            self.enter(child, &tag);
                            self.drive(child)
                        }
                        Err(err) => {
                            self.record(err);
                            self.skip(&tag.name)
                        }
                    };
                    if flow == Flow::Stopped {
                        return Flow::Stopped;
                    }
                }
                Token::Close(found) => {
                    if *node.identity() != found {
                        self.halt(ParseError::MismatchedClose {
                            expected: node.identity().clone(),
                            found,
                        });
                        return Flow::Stopped;
                    }
                    if let Err(err) = node.on_close() {
                        self.record(err);
                    }
                    self.stack.pop();
                    return Flow::Closed;
                }
                Token::Text(run) => {
                    if let Err(err) = node.on_text(&run) {
                        self.record(err);
                    }
                }
            }
        }
    }

    /// Consume the subtree of an element that was not attached.
    ///
    /// Close tags inside it are still checked against their open tags.
    fn skip(&mut self, name: &QName) -> Flow {
        let mut open = vec![name.clone()];
        while let Some(expected) = open.last() {
            match self.next_token() {
                None => return Flow::Stopped,
                Some(Token::Open(tag)) => open.push(tag.name),
                Some(Token::Text(_)) => {}
                Some(Token::Close(found)) => {
                    if *expected != found {
                        let expected = expected.clone();
                        self.halt(ParseError::MismatchedClose { expected, found });
                        return Flow::Stopped;
                    }
                    open.pop();
                }
            }
        }
        Flow::Closed
    }

    fn next_token(&mut self) -> Option<Token> {
        match self.source.next()? {
            Ok(token) => Some(token),
            Err(err) => {
                self.record(err.into());
                None
            }
        }
    }

    fn path(&self) -> String {
        self.stack
            .iter()
            .map(QName::local)
            .collect::<Vec<_>>()
            .join("/")
    }

    fn record(&mut self, error: ParseError) {
        let path = self.path();
        tracing::debug!(path = %path, error = %error, "Recorded parse issue");
        self.errors.push(path, error);
    }

    fn halt(&mut self, error: ParseError) {
        tracing::warn!(path = %self.path(), error = %error, "Fatal parse issue, stopping");
        self.record(error);
    }

    fn finish(self) -> Result<(), ParseErrors> {
        tracing::debug!(
            element = %self.errors.element(),
            issues = self.errors.len(),
            "Finished parse call"
        );
        self.errors.into_result()
    }
}
