//! The `<description>` metadata block.
//!
//! Everything in here is fixed-field: each element maps to a typed slot
//! filled by a binding sink, nothing is polymorphic except the book
//! annotation and the document history, which reuse [`Annotation`].

use crate::binding::{DateField, NumberField, TextField};
use crate::error::ParseError;
use crate::node::{
    fill_slot, is_lang, node_identity, parse_number_attr, push_default, unexpected_attribute,
    unexpected_element, Node,
};
use crate::schema::{xlink_attribute, Annotation, InlineImage};
use crate::xml::{Attribute, OpenTag, QName};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Description {
    pub name: QName,
    pub title_info: Option<TitleInfo>,
    /// Title info of the source book, for translations.
    pub src_title_info: Option<TitleInfo>,
    pub document_info: Option<DocumentInfo>,
    pub publish_info: Option<PublishInfo>,
    pub custom_info: Vec<CustomInfo>,
    pub output: Vec<ShareInstruction>,
}

impl Node for Description {
    node_identity!();

    fn on_child_open(&mut self, tag: &OpenTag) -> Result<&mut dyn Node, ParseError> {
        match tag.name.local() {
            "title-info" => fill_slot(&mut self.title_info, tag),
            "src-title-info" => fill_slot(&mut self.src_title_info, tag),
            "document-info" => fill_slot(&mut self.document_info, tag),
            "publish-info" => fill_slot(&mut self.publish_info, tag),
            "custom-info" => Ok(push_default(&mut self.custom_info)),
            "output" => Ok(push_default(&mut self.output)),
            _ => Err(unexpected_element(tag)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TitleInfo {
    pub name: QName,
    pub genres: Vec<Genre>,
    pub authors: Vec<Author>,
    pub book_title: Option<TextField>,
    pub annotation: Option<Annotation>,
    pub keywords: Option<TextField>,
    pub date: Option<DateField>,
    pub coverpage: Option<Coverpage>,
    pub lang: Option<TextField>,
    pub src_lang: Option<TextField>,
    pub translators: Vec<Author>,
    pub sequences: Vec<Sequence>,
}

impl Node for TitleInfo {
    node_identity!();

    fn on_child_open(&mut self, tag: &OpenTag) -> Result<&mut dyn Node, ParseError> {
        match tag.name.local() {
            "genre" => Ok(push_default(&mut self.genres)),
            "author" => Ok(push_default(&mut self.authors)),
            "book-title" => fill_slot(&mut self.book_title, tag),
            "annotation" => fill_slot(&mut self.annotation, tag),
            "keywords" => fill_slot(&mut self.keywords, tag),
            "date" => fill_slot(&mut self.date, tag),
            "coverpage" => fill_slot(&mut self.coverpage, tag),
            "lang" => fill_slot(&mut self.lang, tag),
            "src-lang" => fill_slot(&mut self.src_lang, tag),
            "translator" => Ok(push_default(&mut self.translators)),
            "sequence" => Ok(push_default(&mut self.sequences)),
            _ => Err(unexpected_element(tag)),
        }
    }
}

/// Genre code with an optional match percentage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Genre {
    pub name: QName,
    /// The `match` attribute; the format's default is 100.
    pub match_percent: Option<u32>,
    pub value: String,
}

impl Node for Genre {
    node_identity!();

    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        if attr.name.local() == "match" {
            self.match_percent = Some(parse_number_attr(attr)?);
            Ok(())
        } else {
            Err(unexpected_attribute(attr))
        }
    }

    fn on_text(&mut self, run: &str) -> Result<(), ParseError> {
        self.value.push_str(run.trim());
        Ok(())
    }
}

/// Cover images.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coverpage {
    pub name: QName,
    pub images: Vec<InlineImage>,
}

impl Node for Coverpage {
    node_identity!();

    fn on_child_open(&mut self, tag: &OpenTag) -> Result<&mut dyn Node, ParseError> {
        match tag.name.local() {
            "image" => Ok(push_default(&mut self.images)),
            _ => Err(unexpected_element(tag)),
        }
    }
}

/// Author, translator or document author.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Author {
    pub name: QName,
    pub first_name: Option<TextField>,
    pub middle_name: Option<TextField>,
    pub last_name: Option<TextField>,
    pub nickname: Option<TextField>,
    pub home_pages: Vec<TextField>,
    pub emails: Vec<TextField>,
    pub id: Option<TextField>,
}

impl Author {
    /// Name parts joined by spaces, falling back to the nickname.
    #[must_use]
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [&self.first_name, &self.middle_name, &self.last_name]
            .into_iter()
            .flatten()
            .map(|field| field.as_str().trim())
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            return self
                .nickname
                .as_ref()
                .map(|nick| nick.as_str().trim().to_string())
                .unwrap_or_default();
        }
        parts.join(" ")
    }
}

impl Node for Author {
    node_identity!();

    fn on_child_open(&mut self, tag: &OpenTag) -> Result<&mut dyn Node, ParseError> {
        match tag.name.local() {
            "first-name" => fill_slot(&mut self.first_name, tag),
            "middle-name" => fill_slot(&mut self.middle_name, tag),
            "last-name" => fill_slot(&mut self.last_name, tag),
            "nickname" => fill_slot(&mut self.nickname, tag),
            "home-page" => Ok(push_default(&mut self.home_pages)),
            "email" => Ok(push_default(&mut self.emails)),
            "id" => fill_slot(&mut self.id, tag),
            _ => Err(unexpected_element(tag)),
        }
    }
}

/// Book series, possibly nested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequence {
    pub name: QName,
    /// The series name (`name` attribute).
    pub sequence_name: Option<String>,
    pub number: Option<u32>,
    pub lang: Option<String>,
    pub sequences: Vec<Sequence>,
}

impl Node for Sequence {
    node_identity!();

    fn on_child_open(&mut self, tag: &OpenTag) -> Result<&mut dyn Node, ParseError> {
        match tag.name.local() {
            "sequence" => Ok(push_default(&mut self.sequences)),
            _ => Err(unexpected_element(tag)),
        }
    }

    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        match attr.name.local() {
            "name" => self.sequence_name = Some(attr.value.clone()),
            "number" => self.number = Some(parse_number_attr(attr)?),
            _ if is_lang(attr) => self.lang = Some(attr.value.clone()),
            _ => return Err(unexpected_attribute(attr)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentInfo {
    pub name: QName,
    pub authors: Vec<Author>,
    pub program_used: Option<TextField>,
    pub date: Option<DateField>,
    pub src_urls: Vec<TextField>,
    pub src_ocr: Option<TextField>,
    pub id: Option<TextField>,
    pub version: Option<NumberField<f64>>,
    pub history: Option<Annotation>,
    pub publishers: Vec<Author>,
}

impl Node for DocumentInfo {
    node_identity!();

    fn on_child_open(&mut self, tag: &OpenTag) -> Result<&mut dyn Node, ParseError> {
        match tag.name.local() {
            "author" => Ok(push_default(&mut self.authors)),
            "program-used" => fill_slot(&mut self.program_used, tag),
            "date" => fill_slot(&mut self.date, tag),
            "src-url" => Ok(push_default(&mut self.src_urls)),
            "src-ocr" => fill_slot(&mut self.src_ocr, tag),
            "id" => fill_slot(&mut self.id, tag),
            "version" => fill_slot(&mut self.version, tag),
            "history" => fill_slot(&mut self.history, tag),
            "publisher" => Ok(push_default(&mut self.publishers)),
            _ => Err(unexpected_element(tag)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishInfo {
    pub name: QName,
    pub book_name: Option<TextField>,
    pub publisher: Option<TextField>,
    pub city: Option<TextField>,
    pub year: Option<TextField>,
    pub isbn: Option<TextField>,
    pub sequences: Vec<Sequence>,
}

impl Node for PublishInfo {
    node_identity!();

    fn on_child_open(&mut self, tag: &OpenTag) -> Result<&mut dyn Node, ParseError> {
        match tag.name.local() {
            "book-name" => fill_slot(&mut self.book_name, tag),
            "publisher" => fill_slot(&mut self.publisher, tag),
            "city" => fill_slot(&mut self.city, tag),
            "year" => fill_slot(&mut self.year, tag),
            "isbn" => fill_slot(&mut self.isbn, tag),
            "sequence" => Ok(push_default(&mut self.sequences)),
            _ => Err(unexpected_element(tag)),
        }
    }
}

/// Free-form metadata with a caller-defined type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomInfo {
    pub name: QName,
    pub info_type: Option<String>,
    pub lang: Option<String>,
    pub value: String,
}

impl Node for CustomInfo {
    node_identity!();

    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        match attr.name.local() {
            "info-type" => self.info_type = Some(attr.value.clone()),
            _ if is_lang(attr) => self.lang = Some(attr.value.clone()),
            _ => return Err(unexpected_attribute(attr)),
        }
        Ok(())
    }

    fn on_text(&mut self, run: &str) -> Result<(), ParseError> {
        self.value.push_str(run);
        Ok(())
    }
}

/// Sharing and licensing instructions (`<output>`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShareInstruction {
    pub name: QName,
    pub mode: Option<String>,
    pub include_all: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub parts: Vec<PartInstruction>,
    pub document_classes: Vec<OutputDocumentClass>,
}

impl Node for ShareInstruction {
    node_identity!();

    fn on_child_open(&mut self, tag: &OpenTag) -> Result<&mut dyn Node, ParseError> {
        match tag.name.local() {
            "part" => Ok(push_default(&mut self.parts)),
            "output-document-class" => Ok(push_default(&mut self.document_classes)),
            _ => Err(unexpected_element(tag)),
        }
    }

    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        match attr.name.local() {
            "mode" => self.mode = Some(attr.value.clone()),
            "include-all" => self.include_all = Some(attr.value.clone()),
            "price" => self.price = Some(parse_number_attr(attr)?),
            "currency" => self.currency = Some(attr.value.clone()),
            _ => return Err(unexpected_attribute(attr)),
        }
        Ok(())
    }
}

/// Reference to a part of the book in a share instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartInstruction {
    pub name: QName,
    pub xlink_type: Option<String>,
    pub href: Option<String>,
    pub include: Option<String>,
}

impl Node for PartInstruction {
    node_identity!();

    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        if xlink_attribute(attr, &mut self.xlink_type, &mut self.href) {
            return Ok(());
        }
        if attr.name.local() == "include" {
            self.include = Some(attr.value.clone());
            return Ok(());
        }
        Err(unexpected_attribute(attr))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputDocumentClass {
    pub name: QName,
    /// The document class name (`name` attribute).
    pub class_name: Option<String>,
    pub create: Option<String>,
    pub price: Option<f64>,
    pub parts: Vec<PartInstruction>,
}

impl Node for OutputDocumentClass {
    node_identity!();

    fn on_child_open(&mut self, tag: &OpenTag) -> Result<&mut dyn Node, ParseError> {
        match tag.name.local() {
            "part" => Ok(push_default(&mut self.parts)),
            _ => Err(unexpected_element(tag)),
        }
    }

    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        match attr.name.local() {
            "name" => self.class_name = Some(attr.value.clone()),
            "create" => self.create = Some(attr.value.clone()),
            "price" => self.price = Some(parse_number_attr(attr)?),
            _ => return Err(unexpected_attribute(attr)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::XLINK_NAMESPACE;
    use crate::driver::Driver;
    use crate::error::{ErrorKind, ParseErrors, SourceError};
    use crate::xml::Token;

    fn field(tag: &str, text: &str) -> Vec<Token> {
        vec![Token::open(tag), Token::text(text), Token::close(tag)]
    }

    fn parse<N: Node + Default>(start: &str, mut tokens: Vec<Token>) -> (N, Option<ParseErrors>) {
        tokens.push(Token::close(start));
        let mut source = tokens.into_iter().map(Ok::<Token, SourceError>);
        let mut node = N::default();
        let result = Driver::new(&mut source).parse(&mut node, &OpenTag::new(start));
        (node, result.err())
    }

    #[test]
    fn test_author_fields() {
        let mut tokens = field("first-name", "Lev");
        tokens.extend(field("middle-name", "Nikolayevich"));
        tokens.extend(field("last-name", "Tolstoy"));
        tokens.extend(field("home-page", "https://a.example"));
        tokens.extend(field("home-page", "https://b.example"));
        tokens.extend(field("email", "lev@example.org"));
        let (author, errors) = parse::<Author>("author", tokens);

        assert!(errors.is_none());
        assert_eq!(author.display_name(), "Lev Nikolayevich Tolstoy");
        assert_eq!(author.home_pages.len(), 2);
        assert_eq!(author.emails[0].as_str(), "lev@example.org");
    }

    #[test]
    fn test_author_nickname_fallback() {
        let (author, _) = parse::<Author>("author", field("nickname", " anon "));
        assert_eq!(author.display_name(), "anon");
    }

    #[test]
    fn test_duplicate_single_field() {
        let mut tokens = field("last-name", "One");
        tokens.extend(field("last-name", "Two"));
        let (author, errors) = parse::<Author>("author", tokens);

        let errors = errors.unwrap();
        assert!(matches!(errors.issues()[0].error, ParseError::DuplicateElement { .. }));
        assert_eq!(errors.issues()[0].path, "author");
        assert_eq!(author.last_name.unwrap().as_str(), "One");
    }

    #[test]
    fn test_title_info() {
        let mut tokens = vec![
            Token::Open(OpenTag::new("genre").with_attribute(Attribute::new("match", "80"))),
            Token::text("prose_classic"),
            Token::close("genre"),
            Token::open("author"),
        ];
        tokens.extend(field("last-name", "Tolstoy"));
        tokens.push(Token::close("author"));
        tokens.extend(field("book-title", "War and Peace"));
        tokens.extend([
            Token::open("annotation"),
            Token::open("p"),
            Token::text("About war."),
            Token::close("p"),
            Token::close("annotation"),
            Token::Open(OpenTag::new("date").with_attribute(Attribute::new("value", "1869-01-01"))),
            Token::text("1869"),
            Token::close("date"),
            Token::open("coverpage"),
            Token::Open(
                OpenTag::new("image")
                    .with_attribute(Attribute::namespaced(XLINK_NAMESPACE, "href", "#cover.jpg")),
            ),
            Token::close("image"),
            Token::close("coverpage"),
        ]);
        tokens.extend(field("lang", "ru"));
        tokens.push(Token::Open(
            OpenTag::new("sequence")
                .with_attribute(Attribute::new("name", "Epics"))
                .with_attribute(Attribute::new("number", "3")),
        ));
        tokens.push(Token::close("sequence"));

        let (info, errors) = parse::<TitleInfo>("title-info", tokens);

        assert!(errors.is_none());
        assert_eq!(info.genres[0].value, "prose_classic");
        assert_eq!(info.genres[0].match_percent, Some(80));
        assert_eq!(info.authors[0].display_name(), "Tolstoy");
        assert_eq!(info.book_title.as_ref().map(TextField::as_str), Some("War and Peace"));
        assert_eq!(info.annotation.as_ref().map(|a| a.content.len()), Some(1));
        assert_eq!(info.date.as_ref().and_then(|d| d.value).map(|d| d.to_string()), Some("1869-01-01".to_string()));
        let cover = info.coverpage.as_ref().unwrap();
        assert_eq!(cover.images[0].href.as_deref(), Some("#cover.jpg"));
        assert_eq!(info.lang.as_ref().map(TextField::as_str), Some("ru"));
        assert_eq!(info.sequences[0].sequence_name.as_deref(), Some("Epics"));
        assert_eq!(info.sequences[0].number, Some(3));
    }

    #[test]
    fn test_invalid_sequence_number() {
        let start = OpenTag::new("sequence")
            .with_attribute(Attribute::new("name", "S"))
            .with_attribute(Attribute::new("number", "III"));
        let mut source = vec![Token::close("sequence")]
            .into_iter()
            .map(Ok::<Token, SourceError>);
        let mut sequence = Sequence::default();
        let errors = Driver::new(&mut source)
            .parse(&mut sequence, &start)
            .unwrap_err();

        assert_eq!(errors.count(ErrorKind::Attribute), 1);
        assert_eq!(sequence.sequence_name.as_deref(), Some("S"));
        assert_eq!(sequence.number, None);
    }

    #[test]
    fn test_document_info_version() {
        let mut tokens = field("program-used", "FictionBook Editor 2.6");
        tokens.extend(field("id", "doc-1"));
        tokens.extend(field("version", "1.1"));
        tokens.extend(field("src-url", "https://a.example"));
        tokens.extend([
            Token::open("history"),
            Token::open("p"),
            Token::text("v1.1 fixed typos"),
            Token::close("p"),
            Token::close("history"),
        ]);
        let (info, errors) = parse::<DocumentInfo>("document-info", tokens);

        assert!(errors.is_none());
        assert_eq!(info.version.and_then(|v| v.value), Some(1.1));
        assert_eq!(info.src_urls.len(), 1);
        assert!(info.history.is_some());
    }

    #[test]
    fn test_invalid_version_is_content_error() {
        let (info, errors) = parse::<DocumentInfo>("document-info", field("version", "v2"));

        let errors = errors.unwrap();
        assert_eq!(errors.count(ErrorKind::Content), 1);
        assert_eq!(errors.issues()[0].path, "document-info/version");
        let version = info.version.unwrap();
        assert_eq!(version.raw, "v2");
        assert_eq!(version.value, None);
    }

    #[test]
    fn test_publish_info() {
        let mut tokens = field("book-name", "War and Peace");
        tokens.extend(field("publisher", "Penguin"));
        tokens.extend(field("city", "London"));
        tokens.extend(field("year", "2006"));
        tokens.extend(field("isbn", "978-0-14-303999-0"));
        let (info, errors) = parse::<PublishInfo>("publish-info", tokens);

        assert!(errors.is_none());
        assert_eq!(info.year.as_ref().map(TextField::as_str), Some("2006"));
        assert_eq!(info.isbn.as_ref().map(TextField::as_str), Some("978-0-14-303999-0"));
    }

    #[test]
    fn test_custom_info_and_output() {
        let tokens = vec![
            Token::Open(OpenTag::new("custom-info").with_attribute(Attribute::new("info-type", "source"))),
            Token::text("scanned"),
            Token::close("custom-info"),
            Token::Open(
                OpenTag::new("output")
                    .with_attribute(Attribute::new("mode", "paid"))
                    .with_attribute(Attribute::new("include-all", "require"))
                    .with_attribute(Attribute::new("price", "4.99"))
                    .with_attribute(Attribute::new("currency", "EUR")),
            ),
            Token::Open(
                OpenTag::new("part")
                    .with_attribute(Attribute::namespaced(XLINK_NAMESPACE, "href", "#ch1"))
                    .with_attribute(Attribute::new("include", "allow")),
            ),
            Token::close("part"),
            Token::Open(
                OpenTag::new("output-document-class")
                    .with_attribute(Attribute::new("name", "preview"))
                    .with_attribute(Attribute::new("create", "allow")),
            ),
            Token::close("output-document-class"),
            Token::close("output"),
        ];
        let (description, errors) = parse::<Description>("description", tokens);

        assert!(errors.is_none());
        assert_eq!(description.custom_info[0].info_type.as_deref(), Some("source"));
        assert_eq!(description.custom_info[0].value, "scanned");

        let output = &description.output[0];
        assert_eq!(output.mode.as_deref(), Some("paid"));
        assert_eq!(output.price, Some(4.99));
        assert_eq!(output.parts[0].href.as_deref(), Some("#ch1"));
        assert_eq!(output.parts[0].include.as_deref(), Some("allow"));
        assert_eq!(output.document_classes[0].class_name.as_deref(), Some("preview"));
    }
}
