//! Keyword location scanning.

use std::collections::BTreeSet;

use crate::document::{Document, Scalar};
use crate::mapping::{IdentifierTable, KeywordMapping};
use crate::path::{resolve_path_segment, Path, PathSegment};
use crate::substitute::contains_any_keyword;

/// Finds every field of `document` holding a mapped keyword.
///
/// Array elements are addressed by identifier, so the returned paths stay
/// valid when the same arrays are reordered in another document. Elements
/// without an identifier are skipped. A list made only of scalars is a
/// single value and is reported as one location.
#[must_use]
pub fn find_keyword_locations(
    document: &Document,
    mapping: &KeywordMapping,
    identifiers: &IdentifierTable,
) -> BTreeSet<Path> {
    let mut locations = BTreeSet::new();
    if !mapping.is_empty() {
        scan(document, &Path::root(), "", mapping, identifiers, &mut locations);
    }
    locations
}

fn scan(
    node: &Document,
    path: &Path,
    field: &str,
    mapping: &KeywordMapping,
    identifiers: &IdentifierTable,
    locations: &mut BTreeSet<Path>,
) {
    match node {
        Document::Tagged { value, .. } => {
            scan(value, path, field, mapping, identifiers, locations);
        }
        Document::Mapping(map) => {
            for (key, value) in map {
                let child = path.child(PathSegment::key(key.as_str()));
                scan(value, &child, key, mapping, identifiers, locations);
            }
        }
        Document::Sequence(items) if items.iter().all(Document::is_scalar) => {
            if contains_any_keyword(&node.render(), mapping) {
                locations.insert(path.clone());
            }
        }
        Document::Sequence(items) => {
            for item in items.iter().filter(|item| !item.is_scalar()) {
                match resolve_path_segment(field, item, identifiers) {
                    Some(segment) => {
                        scan(item, &path.child(segment), "", mapping, identifiers, locations);
                    }
                    None => tracing::debug!(
                        "Skipping element of {path} without identifier {}",
                        identifiers.get(field)
                    ),
                }
            }
        }
        Document::Scalar(Scalar::String(value)) => {
            if contains_any_keyword(value, mapping) {
                locations.insert(path.clone());
            }
        }
        Document::Scalar(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_yaml(yaml: &str) -> Vec<String> {
        let document = Document::from_yaml(yaml).unwrap();
        let mapping = KeywordMapping::new().with("ENV", "prod").with("SECRET", "s");
        find_keyword_locations(&document, &mapping, &IdentifierTable::builtin())
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn finds_nested_fields() {
        let found = scan_yaml(
            "applicationName: app\n\
             inboundAuthenticationConfig:\n  \
               inboundAuthenticationRequestConfigs:\n  \
               - inboundAuthKey: key\n    \
                 properties:\n    \
                 - name: callbackUrl\n      \
                   value: https://{{ENV}}.example.com\n    \
                 - name: secret\n      \
                   value: '{{SECRET}}'\n",
        );
        assert_eq!(
            found,
            vec![
                "inboundAuthenticationConfig.inboundAuthenticationRequestConfigs.[inboundAuthKey=key].properties.[name=callbackUrl].value",
                "inboundAuthenticationConfig.inboundAuthenticationRequestConfigs.[inboundAuthKey=key].properties.[name=secret].value",
            ]
        );
    }

    #[test]
    fn unmapped_and_non_string_values_are_ignored() {
        let found = scan_yaml("a: '{{OTHER}}'\nb: 42\nc: true\nd: ~\n");
        assert!(found.is_empty());
    }

    #[test]
    fn elements_without_identifier_are_skipped() {
        let found = scan_yaml(
            "properties:\n- value: '{{ENV}}'\n- name: host\n  value: '{{ENV}}'\n",
        );
        assert_eq!(found, vec!["properties.[name=host].value"]);
    }

    #[test]
    fn scalar_lists_are_one_location() {
        let found = scan_yaml("callbacks:\n- https://a\n- https://{{ENV}}\n");
        assert_eq!(found, vec!["callbacks"]);
    }

    #[test]
    fn nothing_found_with_empty_mapping() {
        let document = Document::from_yaml("a: '{{ENV}}'\n").unwrap();
        let found = find_keyword_locations(
            &document,
            &KeywordMapping::new(),
            &IdentifierTable::builtin(),
        );
        assert!(found.is_empty());
    }
}
