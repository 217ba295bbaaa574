//! Uniform read interface over the parsed tree.
//!
//! Every entry of the tree, from a bare text run to the whole book,
//! implements [`Content`]. Fixed slots (titles, epigraphs, annotations) are
//! public fields on the concrete types; `children()` only walks the ordered
//! free content.

use crate::xml::QName;

/// Read access shared by text runs and elements.
pub trait Content {
    /// Element identity, `None` for a text run.
    fn name(&self) -> Option<&QName>;

    /// Text of a text run, empty for elements.
    fn text(&self) -> &str {
        ""
    }

    /// Ordered free content, empty for leaves.
    fn children(&self) -> Vec<&dyn Content> {
        Vec::new()
    }

    /// Whether this entry is a text run.
    fn is_text(&self) -> bool {
        self.name().is_none()
    }
}

/// Visit `root` and everything below it depth-first, in document order.
///
/// The callback receives each entry with its depth relative to `root`.
///
/// # Examples
/// ```
/// use fictionbook::{content, Content, FictionBook};
///
/// let book = FictionBook::parse_str(
///     "<FictionBook><body><section><p>a<emphasis>b</emphasis></p></section></body></FictionBook>",
/// )
/// .unwrap()
/// .tree;
///
/// let mut names = Vec::new();
/// content::walk(&book, &mut |entry, _depth| {
///     names.push(entry.name().map_or("#text".to_string(), |n| n.to_string()));
/// });
/// assert_eq!(
///     names,
///     ["FictionBook", "body", "section", "p", "#text", "emphasis", "#text"]
/// );
/// ```
pub fn walk(root: &dyn Content, visit: &mut dyn FnMut(&dyn Content, usize)) {
    walk_at(root, 0, visit);
}

fn walk_at(entry: &dyn Content, depth: usize, visit: &mut dyn FnMut(&dyn Content, usize)) {
    visit(entry, depth);
    for child in entry.children() {
        walk_at(child, depth + 1, visit);
    }
}

/// Concatenate every text run below `root`.
#[must_use]
pub fn plain_text(root: &dyn Content) -> String {
    let mut out = String::new();
    walk(root, &mut |entry, _| out.push_str(entry.text()));
    out
}

/// Borrow a slice of entries as trait objects.
pub(crate) fn entries<T: Content>(items: &[T]) -> Vec<&dyn Content> {
    items.iter().map(|item| item as &dyn Content).collect()
}
