//! Keyword placeholder substitution.
//!
//! Placeholders are written `{{NAME}}` and name a key of a
//! [`KeywordMapping`]. Substitution is a single left-to-right pass, so
//! replacement values are never scanned for further placeholders.

use crate::mapping::KeywordMapping;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Name and byte length of a well-formed token at the start of `text`.
fn token_at(text: &str) -> Option<(&str, usize)> {
    let body = text.strip_prefix(OPEN)?;
    let end = body.find(CLOSE)?;
    let name = &body[..end];
    if name.is_empty() || name.contains('{') || name.contains('}') {
        return None;
    }
    Some((name, OPEN.len() + end + CLOSE.len()))
}

/// Walks `value`, letting `on_token` decide what replaces each token.
fn replace_tokens<'a, F>(value: &'a str, mut on_token: F) -> String
where
    F: FnMut(&'a str) -> Option<Option<&'a str>>,
{
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];

        let replaced = token_at(candidate)
            .and_then(|(name, len)| on_token(name).map(|replacement| (replacement, len)));

        match replaced {
            Some((replacement, len)) => {
                if let Some(text) = replacement {
                    out.push_str(text);
                }
                rest = &candidate[len..];
            }
            None => {
                out.push('{');
                rest = &candidate[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Replaces every mapped placeholder. Unknown placeholders stay as
/// literal text.
#[must_use]
pub fn substitute(value: &str, mapping: &KeywordMapping) -> String {
    replace_tokens(value, |name| mapping.get(name).map(Some))
}

/// Replaces mapped placeholders and removes unknown ones.
///
/// Used when rendering templates whose leftover placeholders must not
/// reach the output.
#[must_use]
pub fn substitute_stripping_unknown(value: &str, mapping: &KeywordMapping) -> String {
    replace_tokens(value, |name| match mapping.get(name) {
        Some(text) => Some(Some(text)),
        None => {
            tracing::warn!("No value mapped for keyword {name}, removing it");
            Some(None)
        }
    })
}

/// Returns whether `value` contains `{{NAME}}` for any mapped name.
#[must_use]
pub fn contains_any_keyword(value: &str, mapping: &KeywordMapping) -> bool {
    mapping
        .names()
        .any(|name| value.contains(&format!("{OPEN}{name}{CLOSE}")))
}

/// Names of all well-formed placeholders in `value`, in order.
#[must_use]
pub fn referenced_keywords(value: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = value;

    while let Some(start) = rest.find(OPEN) {
        let candidate = &rest[start..];
        match token_at(candidate) {
            Some((name, len)) => {
                names.push(name);
                rest = &candidate[len..];
            }
            None => rest = &candidate[1..],
        }
    }
    names
}
