//! Type tag handle conversion.
//!
//! Exported resources carry global type tags written with the secondary
//! handle (`!!org.wso2.carbon...`). The YAML parser only reports local tags,
//! so secondary tags outside the core schema are rewritten to local form
//! before parsing and restored after serialization.

use std::collections::BTreeSet;

/// Core schema tags the parser resolves itself.
const CORE_TAGS: &[&str] = &[
    "str", "int", "float", "bool", "null", "binary", "timestamp", "map", "seq", "set", "omap",
    "pairs", "merge", "value", "yaml",
];

/// Rewrites `!!name` to `!name` and returns the rewritten names.
pub(crate) fn demote_secondary_tags(text: &str) -> (String, BTreeSet<String>) {
    let mut names = BTreeSet::new();
    let out = rewrite_tags(text, |token| {
        let name = token.strip_prefix("!!")?;
        let first = name.chars().next()?;
        if !first.is_ascii_alphabetic() || CORE_TAGS.contains(&name) {
            return None;
        }
        names.insert(name.to_string());
        Some(format!("!{name}"))
    });
    (out, names)
}

/// Rewrites `!name` back to `!!name` for each of `names`.
pub(crate) fn promote_secondary_tags(text: &str, names: &BTreeSet<String>) -> String {
    if names.is_empty() {
        return text.to_string();
    }
    rewrite_tags(text, |token| {
        if token.starts_with("!!") {
            return None;
        }
        let name = token.strip_prefix('!')?;
        names.contains(name).then(|| format!("!!{name}"))
    })
}

/// Applies `rewrite` to every tag token outside quoted scalars.
fn rewrite_tags<F>(text: &str, mut rewrite: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::with_capacity(text.len() + 16);

    for line in text.split_inclusive('\n') {
        let mut quote: Option<char> = None;
        let mut prev: Option<char> = None;
        let mut idx = 0;

        while let Some(c) = line[idx..].chars().next() {
            let starts_token = prev.map_or(true, char::is_whitespace);

            if let Some(q) = quote {
                if c == q && prev != Some('\\') {
                    quote = None;
                }
            } else if (c == '"' || c == '\'') && starts_token {
                quote = Some(c);
            } else if c == '!' && starts_token {
                let rest = &line[idx..];
                let len = rest
                    .find(|ch: char| ch.is_whitespace() || matches!(ch, ',' | '[' | ']' | '{' | '}'))
                    .unwrap_or(rest.len());
                let token = &rest[..len];
                if let Some(replacement) = rewrite(token) {
                    out.push_str(&replacement);
                    idx += len;
                    prev = token.chars().last();
                    continue;
                }
            }

            out.push(c);
            prev = Some(c);
            idx += c.len_utf8();
        }
    }
    out
}
