//! End-to-end integration tests for the FictionBook parser.
//!
//! Parses a complete FB2 fixture (an excerpt of The Mysterious Island with
//! metadata, a notes body and a cover binary) and a set of damaged documents.

use std::fs;
use std::path::Path;
use std::sync::Once;

use pretty_assertions::assert_eq;

use fictionbook::content::{plain_text, walk};
use fictionbook::error::SourceError;
use fictionbook::schema::{Block, Inline, Section};
use fictionbook::xml::{ReaderTokens, Token, XmlTokens};
use fictionbook::{
    parse_description, Content, Driver, ErrorKind, Fb2Error, FictionBook, ParseError,
    ParseOptions,
};

static TRACING: Once = Once::new();

/// Route parser logs to the test output; `RUST_LOG=fictionbook=debug` shows issues.
fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Load fixture file content.
fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

fn sample() -> FictionBook {
    init_tracing();
    let parsed = FictionBook::parse_str(&load_fixture("sample.fb2")).expect("fixture is well-formed");
    assert!(parsed.is_clean(), "unexpected issues: {}", parsed.errors);
    parsed.tree
}

/// The chapter section `ch1` inside `part1`.
fn chapter(book: &FictionBook) -> &Section {
    book.body
        .as_ref()
        .and_then(|body| body.find_section("ch1"))
        .expect("chapter present")
}

/// Describe an entry as `name` or `"text"`.
fn label(entry: &dyn Content) -> String {
    match entry.name() {
        Some(name) => name.to_string(),
        None => format!("{:?}", entry.text()),
    }
}

#[test]
fn test_description_metadata() {
    let book = sample();
    let description = book.description.as_ref().unwrap();

    let title_info = description.title_info.as_ref().unwrap();
    let genres: Vec<_> = title_info
        .genres
        .iter()
        .map(|g| (g.value.as_str(), g.match_percent))
        .collect();
    assert_eq!(genres, vec![("prose_classic", Some(90)), ("adventure", None)]);
    assert_eq!(title_info.authors[0].display_name(), "Jules Verne");
    assert_eq!(title_info.translators[0].display_name(), "W. H. G. Kingston");
    assert_eq!(book.title(), Some("The Mysterious Island"));
    assert_eq!(
        plain_text(title_info.annotation.as_ref().unwrap()),
        "Five castaways build a colony on an uncharted island."
    );
    let date = title_info.date.as_ref().unwrap();
    assert_eq!(date.text, "1874-1875");
    assert_eq!(date.value.map(|d| d.to_string()), Some("1875-01-01".to_string()));
    assert_eq!(
        title_info.coverpage.as_ref().unwrap().images[0].href.as_deref(),
        Some("#cover.png")
    );
    assert_eq!(title_info.sequences[0].sequence_name.as_deref(), Some("Extraordinary Voyages"));
    assert_eq!(title_info.sequences[0].number, Some(12));

    let document_info = description.document_info.as_ref().unwrap();
    assert_eq!(document_info.authors[0].display_name(), "scanner");
    assert_eq!(document_info.version.as_ref().and_then(|v| v.value), Some(1.2));
    assert_eq!(document_info.history.as_ref().unwrap().content.len(), 2);

    let publish_info = description.publish_info.as_ref().unwrap();
    assert_eq!(publish_info.city.as_ref().unwrap().as_str(), "London");

    assert_eq!(description.custom_info[0].info_type.as_deref(), Some("scan"));
}

#[test]
fn test_bodies_and_structure() {
    let book = sample();
    let body = book.body.as_ref().unwrap();
    let notes = book.notes.as_ref().unwrap();

    assert_eq!(body.body_name, None);
    assert_eq!(notes.body_name.as_deref(), Some("notes"));
    assert_eq!(plain_text(body.title.as_ref().unwrap()), "The Mysterious Island");
    assert_eq!(body.epigraphs[0].text_authors.len(), 1);

    let names: Vec<_> = book.children().into_iter().map(label).collect();
    assert_eq!(names, vec!["body", "body"]);

    let chapter = chapter(&book);
    assert_eq!(chapter.image.as_ref().unwrap().alt.as_deref(), Some("balloon"));
    let blocks: Vec<_> = chapter.children().into_iter().map(label).collect();
    assert_eq!(
        blocks,
        vec!["p", "empty-line", "subtitle", "poem", "cite", "table", "p"]
    );
}

#[test]
fn test_mixed_content_in_document_order() {
    let book = sample();
    let Block::Paragraph(paragraph) = &chapter(&book).content[0] else {
        panic!("first block is not a paragraph");
    };

    let mut seen = Vec::new();
    walk(paragraph, &mut |entry, depth| seen.push(format!("{depth}:{}", label(entry))));
    assert_eq!(
        seen,
        vec![
            "0:p",
            r#"1:"\"Are we rising again?\" \"No. ""#,
            "1:strong",
            r#"2:"On the contrary.""#,
            r#"1:"\"""#,
            "1:a",
            r#"2:"[1]""#,
        ]
    );
}

#[test]
fn test_reads_are_idempotent() {
    let book = sample();
    let chapter = chapter(&book);

    let first: Vec<_> = chapter.children().into_iter().map(label).collect();
    let second: Vec<_> = chapter.children().into_iter().map(label).collect();
    assert_eq!(first, second);
    assert_eq!(plain_text(chapter), plain_text(chapter));
}

#[test]
fn test_footnote_link_resolves() {
    let book = sample();
    let Block::Paragraph(paragraph) = &chapter(&book).content[0] else {
        panic!("first block is not a paragraph");
    };
    let link = paragraph
        .content
        .iter()
        .find_map(|entry| match entry {
            Inline::Link(link) => Some(link),
            _ => None,
        })
        .unwrap();

    assert!(link.is_note());
    assert_eq!(link.xlink_type, None);
    assert_eq!(link.href.as_deref(), Some("#n1"));

    let id = link.href.as_deref().unwrap().trim_start_matches('#');
    let note = book.notes.as_ref().unwrap().find_section(id).unwrap();
    assert_eq!(note.content.len(), 1);
    assert_eq!(plain_text(&note.content[0]), "The balloon was filled with coal gas.");
}

#[test]
fn test_table_shape() {
    let book = sample();
    let Some(Block::Table(table)) = chapter(&book).content.get(5) else {
        panic!("sixth block is not a table");
    };

    let rows = table.children();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row.children().len() == 3));
    assert!(table.rows[0].cells[0].is_header());
    assert_eq!(table.rows[1].cells[1].colspan, Some(1));
    assert_eq!(plain_text(&table.rows[1].cells[1]), "engineer");
}

#[test]
fn test_binary_and_stylesheet() {
    let book = sample();

    let cover = book.binary("#cover.png").unwrap();
    assert_eq!(cover.content_type, "image/png");
    assert_eq!(cover.data, b"\x89PNG\r\n\x1a\n".to_vec());

    assert_eq!(book.stylesheets.len(), 1);
    assert_eq!(book.stylesheets[0].content_type.as_deref(), Some("text/css"));
    assert_eq!(
        book.stylesheets[0].markup,
        "p { text-indent: 1em } cite > p { margin: 0 }"
    );
}

#[test]
fn test_parse_description_only() {
    init_tracing();
    let parsed = parse_description(&load_fixture("sample.fb2")).unwrap();

    assert!(parsed.is_clean());
    let book = parsed.tree;
    assert!(book.description.is_some());
    assert!(book.body.is_none());
    assert!(book.notes.is_none());
    assert!(book.binaries.is_empty());
    assert_eq!(book.title(), Some("The Mysterious Island"));
}

#[test]
fn test_parse_description_of_truncated_document() {
    init_tracing();
    let full = load_fixture("sample.fb2");
    let end = full.find("</description>").unwrap() + "</description>".len();
    let truncated = format!("{}\n  <body>\n    <section><p>cut off mid-downlo", &full[..end]);

    assert!(matches!(
        FictionBook::parse_str(&truncated),
        Err(Fb2Error::Xml(_))
    ));

    let parsed = parse_description(&truncated).unwrap();
    assert!(parsed.is_clean());
    assert_eq!(parsed.tree.description, sample().description);
    assert_eq!(parsed.tree.stylesheets.len(), 1);
    assert!(parsed.tree.body.is_none());
}

#[test]
fn test_streamed_parse_matches_document_parse() {
    init_tracing();
    let xml = load_fixture("sample.fb2");
    let parsed = FictionBook::from_tokens(&mut ReaderTokens::from_str(&xml));

    assert!(parsed.is_clean());
    assert_eq!(parsed.tree, sample());
}

#[test]
fn test_damaged_document_collects_every_issue() {
    init_tracing();
    let xml = r#"<FictionBook xmlns="http://www.gribuser.ru/xml/fictionbook/2.0">
  <description>
    <title-info>
      <date value="March 1875">March 1875</date>
      <book-title>Broken</book-title>
    </title-info>
  </description>
  <body>
    <section>
      <p>first</p>
      <marquee><p>hidden</p></marquee>
      <table><tr><td colspan="wide">cell</td></tr></table>
      <p>last</p>
    </section>
  </body>
  <body><section><p>second main body</p></section></body>
  <binary id="x" content-type="image/png">!!!not base64!!!</binary>
</FictionBook>"#;

    let parsed = FictionBook::parse_str(xml).unwrap();
    let errors = &parsed.errors;

    assert_eq!(errors.len(), 5);
    assert!(!errors.is_fatal());
    assert_eq!(errors.count(ErrorKind::Structural), 2);
    assert_eq!(errors.count(ErrorKind::Attribute), 2);
    assert_eq!(errors.count(ErrorKind::Content), 1);

    let paths: Vec<_> = errors.iter().map(|issue| issue.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "FictionBook/description/title-info/date",
            "FictionBook/body/section",
            "FictionBook/body/section/table/tr/td",
            "FictionBook",
            "FictionBook/binary",
        ]
    );

    let book = &parsed.tree;
    let title_info = book.description.as_ref().unwrap().title_info.as_ref().unwrap();
    let date = title_info.date.as_ref().unwrap();
    assert_eq!(date.raw_value.as_deref(), Some("March 1875"));
    assert_eq!(date.value, None);
    assert_eq!(book.title(), Some("Broken"));

    let section = &book.body.as_ref().unwrap().sections[0];
    assert_eq!(plain_text(section), "firstcelllast");
    assert!(book.binaries[0].data.is_empty());
}

#[test]
fn test_mismatched_close_stops_dispatch() {
    init_tracing();
    let tokens = vec![
        Token::open("FictionBook"),
        Token::open("body"),
        Token::open("section"),
        Token::open("p"),
        Token::text("cut short"),
        Token::close("div"),
        Token::open("binary"),
        Token::close("binary"),
        Token::close("FictionBook"),
    ];
    let mut source = tokens.into_iter().map(Ok::<Token, SourceError>);
    let parsed = FictionBook::from_tokens(&mut source);

    assert!(parsed.errors.is_fatal());
    assert_eq!(parsed.errors.len(), 1);
    assert!(matches!(
        parsed.errors.issues()[0].error,
        ParseError::MismatchedClose { .. }
    ));
    assert_eq!(
        plain_text(&parsed.tree.body.as_ref().unwrap().sections[0]),
        "cut short"
    );
    assert!(parsed.tree.binaries.is_empty());
    assert_eq!(source.count(), 3);
}

#[test]
fn test_depth_limit_skips_deep_subtrees() {
    init_tracing();
    let xml = "<FictionBook><body><section><section><section><p>deep</p></section></section>\
               <p>shallow</p></section></body></FictionBook>";
    let doc = roxmltree::Document::parse(xml).unwrap();
    let mut source = XmlTokens::new(&doc);
    let mut book = FictionBook::default();

    let errors = Driver::with_options(&mut source, ParseOptions::new().with_max_depth(4))
        .parse_root(&mut book)
        .unwrap_err();

    assert_eq!(errors.len(), 1);
    assert!(matches!(errors.issues()[0].error, ParseError::TooDeep { limit: 4, .. }));
    let outer = &book.body.as_ref().unwrap().sections[0];
    assert_eq!(plain_text(outer), "shallow");
}

#[test]
fn test_bounded_parse_of_a_single_element() {
    init_tracing();
    let xml = "<FictionBook><body><section><p>inside</p></section></body></FictionBook>";
    let doc = roxmltree::Document::parse(xml).unwrap();
    let mut source = XmlTokens::new(&doc);

    // Advance to the section open tag, then parse just that element.
    let start = source
        .by_ref()
        .find_map(|token| match token {
            Ok(Token::Open(tag)) if tag.name.local() == "section" => Some(tag),
            _ => None,
        })
        .unwrap();
    let mut section = Section::default();
    Driver::new(&mut source).parse(&mut section, &start).unwrap();

    assert_eq!(section.name.local(), "section");
    assert_eq!(plain_text(&section), "inside");
    assert_eq!(source.next().unwrap().unwrap(), Token::close("body"));
}
