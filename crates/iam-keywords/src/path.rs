//! Field paths that survive array reordering.
//!
//! A path is a list of segments. Mapping keys address fields; element
//! locators (`[field=value]`) address the array element whose identifier
//! field equals `value`, wherever it sits in the array.

use std::fmt;

use crate::document::Document;
use crate::mapping::IdentifierTable;

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    /// A mapping key.
    Key(String),
    /// An array element located by identifier.
    Element {
        /// Identifier field path inside the element (may be dotted).
        field: String,
        /// Identifier value.
        value: String,
    },
}

impl PathSegment {
    /// Creates a key segment.
    pub fn key(name: impl Into<String>) -> Self {
        Self::Key(name.into())
    }

    /// Creates an element locator.
    pub fn element(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Element {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Parses `[field=value]` as a locator and anything else as a key.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        text.strip_prefix('[')
            .and_then(|inner| inner.strip_suffix(']'))
            .and_then(|inner| inner.split_once('='))
            .map_or_else(|| Self::key(text), |(field, value)| Self::element(field, value))
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(name) => f.write_str(name),
            Self::Element { field, value } => write!(f, "[{field}={value}]"),
        }
    }
}

/// Location of a node inside a [`Document`].
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// The document root.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Returns this path extended by one segment.
    #[must_use]
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    /// Segments from the root.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Parses the dotted textual form.
    ///
    /// Element locators may contain dots
    /// (`claimMappings.[localClaim.claimUri=http://wso2.org/claims/email]`);
    /// a segment opened with `[` runs until the part that closes it.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::root();
        }

        let mut segments = Vec::new();
        let mut parts = text.split('.');

        while let Some(part) = parts.next() {
            if part.starts_with('[') && !part.ends_with(']') {
                let mut grouped = part.to_string();
                for next in parts.by_ref() {
                    grouped.push('.');
                    grouped.push_str(next);
                    if next.ends_with(']') {
                        break;
                    }
                }
                segments.push(PathSegment::parse(&grouped));
            } else {
                segments.push(PathSegment::parse(part));
            }
        }

        Self { segments }
    }
}

impl FromIterator<PathSegment> for Path {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Builds the locator for `element` of the array stored under `array_field`.
///
/// Returns `None` when the element has no usable identifier; such elements
/// cannot be addressed independently of their position.
#[must_use]
pub fn resolve_path_segment(
    array_field: &str,
    element: &Document,
    identifiers: &IdentifierTable,
) -> Option<PathSegment> {
    if !element.is_mapping() {
        return None;
    }
    let field = identifiers.get(array_field);
    let value = element.get(&Path::parse(field))?.render();
    if value.is_empty() {
        return None;
    }
    Some(PathSegment::element(field, value))
}

/// Finds the first element matched by `segment`.
///
/// Key segments never match array elements.
#[must_use]
pub fn locate_array_element(items: &[Document], segment: &PathSegment) -> Option<usize> {
    let PathSegment::Element { field, value } = segment else {
        return None;
    };
    let field_path = Path::parse(field);
    items.iter().position(|item| {
        item.is_mapping() && item.get(&field_path).is_some_and(|node| node.render() == *value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(yaml: &str) -> Document {
        Document::from_yaml(yaml).unwrap()
    }

    #[test]
    fn parse_groups_dotted_locators() {
        let path = Path::parse("claimMappings.[localClaim.claimUri=http://wso2.org/claims/email].remoteClaim");
        assert_eq!(
            path.segments(),
            &[
                PathSegment::key("claimMappings"),
                PathSegment::element("localClaim.claimUri", "http://wso2.org/claims/email"),
                PathSegment::key("remoteClaim"),
            ]
        );
        assert_eq!(
            path.to_string(),
            "claimMappings.[localClaim.claimUri=http://wso2.org/claims/email].remoteClaim"
        );
    }

    #[test]
    fn malformed_locator_is_a_key() {
        assert_eq!(PathSegment::parse("[noequals]"), PathSegment::key("[noequals]"));
        assert_eq!(PathSegment::parse("[a=b=c]"), PathSegment::element("a", "b=c"));
    }

    #[test]
    fn resolve_uses_configured_identifier() {
        let element = doc("stepOrder: 2\noptions: []\n");
        let table = IdentifierTable::builtin();
        assert_eq!(
            resolve_path_segment("authenticationSteps", &element, &table),
            Some(PathSegment::element("stepOrder", "2"))
        );
    }

    #[test]
    fn resolve_reads_nested_identifier() {
        let element = doc("localClaim:\n  claimUri: http://wso2.org/claims/email\n");
        let table = IdentifierTable::builtin();
        assert_eq!(
            resolve_path_segment("claimMappings", &element, &table),
            Some(PathSegment::element(
                "localClaim.claimUri",
                "http://wso2.org/claims/email"
            ))
        );
    }

    #[test]
    fn resolve_defaults_to_name_and_rejects_empty() {
        let table = IdentifierTable::default();
        assert_eq!(
            resolve_path_segment("unknown", &doc("name: a\n"), &table),
            Some(PathSegment::element("name", "a"))
        );
        assert_eq!(resolve_path_segment("unknown", &doc("name: ''\n"), &table), None);
        assert_eq!(resolve_path_segment("unknown", &doc("value: 1\n"), &table), None);
        assert_eq!(resolve_path_segment("unknown", &doc("plain"), &table), None);
    }

    #[test]
    fn locate_finds_element_regardless_of_position() {
        let list = doc("- name: b\n- name: a\n");
        let Document::Sequence(items) = list else {
            panic!("expected sequence");
        };
        assert_eq!(locate_array_element(&items, &PathSegment::element("name", "a")), Some(1));
        assert_eq!(locate_array_element(&items, &PathSegment::element("name", "c")), None);
        assert_eq!(locate_array_element(&items, &PathSegment::key("name")), None);
    }
}
