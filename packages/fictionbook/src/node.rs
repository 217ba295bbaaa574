//! The node contract every schema type implements to take part in dispatch.
//!
//! The driver calls these hooks as tokens arrive. A node decides which
//! concrete child type an open tag becomes at its position, attaches the
//! child to one of its slots and hands it back so the driver can keep
//! feeding it. The shared fallback for anything a node does not recognize
//! is delegated to [`unexpected_element`] and [`unexpected_attribute`].

use crate::error::ParseError;
use crate::xml::{Attribute, OpenTag, QName};

/// Capability set of a schema type.
pub trait Node {
    /// Record the tag identity. Called once, right after creation.
    fn set_identity(&mut self, name: QName);

    /// The identity recorded by [`Node::set_identity`].
    fn identity(&self) -> &QName;

    /// Create, attach and return the child for a nested open tag.
    ///
    /// The default rejects every child.
    fn on_child_open(&mut self, tag: &OpenTag) -> Result<&mut dyn Node, ParseError> {
        Err(unexpected_element(tag))
    }

    /// Consume one attribute of this element.
    ///
    /// The default rejects every attribute.
    fn on_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        Err(unexpected_attribute(attr))
    }

    /// Consume a text run. The default ignores text.
    fn on_text(&mut self, _run: &str) -> Result<(), ParseError> {
        Ok(())
    }

    /// Finish the element just before it is sealed.
    fn on_close(&mut self) -> Result<(), ParseError> {
        Ok(())
    }
}

/// Fallback for an open tag a node does not recognize.
#[must_use]
pub fn unexpected_element(tag: &OpenTag) -> ParseError {
    ParseError::UnexpectedElement {
        tag: tag.name.clone(),
    }
}

/// Fallback for an attribute a node does not recognize.
#[must_use]
pub fn unexpected_attribute(attr: &Attribute) -> ParseError {
    ParseError::UnexpectedAttribute {
        name: attr.name.clone(),
        value: attr.value.clone(),
    }
}

/// Whether the attribute is `xml:lang` (or an unqualified `lang`).
pub(crate) fn is_lang(attr: &Attribute) -> bool {
    attr.name.local == "lang"
}

/// Parse a numeric attribute value.
pub(crate) fn parse_number_attr<T>(attr: &Attribute) -> Result<T, ParseError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    attr.value
        .trim()
        .parse()
        .map_err(|err: T::Err| ParseError::InvalidNumberAttribute {
            name: attr.name.clone(),
            value: attr.value.clone(),
            reason: err.to_string(),
        })
}

/// Fill a single-valued slot, rejecting a second occurrence.
pub(crate) fn fill_slot<'a, T: Node + Default>(
    slot: &'a mut Option<T>,
    tag: &OpenTag,
) -> Result<&'a mut dyn Node, ParseError> {
    if slot.is_some() {
        return Err(ParseError::DuplicateElement {
            tag: tag.name.clone(),
        });
    }
    Ok(slot.insert(T::default()))
}

/// Append a fresh default child to a list slot and return it.
pub(crate) fn push_default<T: Node + Default>(list: &mut Vec<T>) -> &mut dyn Node {
    let index = list.len();
    list.push(T::default());
    &mut list[index]
}

/// Implements the identity half of [`Node`] for a struct with a `name` field.
macro_rules! node_identity {
    () => {
        fn set_identity(&mut self, name: $crate::xml::QName) {
            self.name = name;
        }

        fn identity(&self) -> &$crate::xml::QName {
            &self.name
        }
    };
}

pub(crate) use node_identity;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Leaf {
        name: QName,
    }

    impl Node for Leaf {
        node_identity!();
    }

    #[test]
    fn test_default_fallbacks() {
        let mut leaf = Leaf::default();
        leaf.set_identity(QName::new("empty-line"));
        assert_eq!(leaf.identity(), &QName::new("empty-line"));

        let err = leaf.on_child_open(&OpenTag::new("p")).err().unwrap();
        assert_eq!(err.to_string(), "unexpected element <p>");

        let err = leaf.on_attribute(&Attribute::new("id", "x")).unwrap_err();
        assert_eq!(err.to_string(), "unexpected attribute id=\"x\"");

        assert!(leaf.on_text("ignored").is_ok());
        assert!(leaf.on_close().is_ok());
    }

    #[test]
    fn test_fill_slot_rejects_duplicate() {
        let mut slot: Option<Leaf> = None;
        let tag = OpenTag::new("title");
        assert!(fill_slot(&mut slot, &tag).is_ok());
        assert!(slot.is_some());

        let err = fill_slot(&mut slot, &tag).err().unwrap();
        assert!(matches!(err, ParseError::DuplicateElement { .. }));
    }

    #[test]
    fn test_push_default_appends() {
        let mut list: Vec<Leaf> = Vec::new();
        push_default(&mut list).set_identity(QName::new("a"));
        push_default(&mut list).set_identity(QName::new("b"));
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].name, QName::new("b"));
    }

    #[test]
    fn test_parse_number_attr() {
        let value: u32 = parse_number_attr(&Attribute::new("colspan", "12")).unwrap();
        assert_eq!(value, 12);

        let err = parse_number_attr::<u32>(&Attribute::new("colspan", "wide")).unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumberAttribute { .. }));
    }
}
