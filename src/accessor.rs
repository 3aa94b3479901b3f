//! Element Accessors
//!
//! Lookup helpers over a `roxmltree` node. Paths are relative, slash-separated tag
//! names (`"xwhat/leakedbytes"`, `"./vargv"`). Absence is never an error at this
//! layer: optional lookups return `None` (or an empty `Vec`), and only a present tag
//! with unparseable content is reported as a format violation.

use std::str::FromStr;

use roxmltree::Node;

use crate::error::{ParseError, Result};

fn path_steps(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|step| !step.is_empty() && *step != ".")
}

/// Element children of `node` tagged `tag`, in document order
pub fn children_named<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && child.tag_name().name() == tag)
}

/// Every descendant matching `path`, in document order
pub fn find_all<'a, 'input>(node: Node<'a, 'input>, path: &str) -> Vec<Node<'a, 'input>> {
    let mut matches = vec![node];
    for step in path_steps(path) {
        matches = matches
            .into_iter()
            .flat_map(|parent| children_named(parent, step))
            .collect();
    }
    matches
}

/// First descendant matching `path`
pub fn find<'a, 'input>(node: Node<'a, 'input>, path: &str) -> Option<Node<'a, 'input>> {
    find_all(node, path).into_iter().next()
}

/// Text of the first match, `None` when nothing matches or the tag is empty
pub fn find_text(node: Node<'_, '_>, path: &str) -> Option<String> {
    find(node, path).and_then(|m| m.text()).map(str::to_string)
}

/// Parsed content of the first match.
///
/// `Ok(None)` when the tag is absent; a present tag whose text does not parse is a
/// [`ParseError::Format`].
pub fn find_parsed<T: FromStr>(node: Node<'_, '_>, path: &str) -> Result<Option<T>> {
    let Some(found) = find(node, path) else {
        return Ok(None);
    };

    let text = found.text().unwrap_or_default().trim();
    text.parse::<T>().map(Some).map_err(|_| {
        ParseError::format(format!(
            "Invalid integer in <{}>: '{}'",
            found.tag_name().name(),
            text
        ))
    })
}

/// Text of every match in document order; empty when nothing matches
pub fn find_all_text(node: Node<'_, '_>, path: &str) -> Vec<String> {
    find_all(node, path)
        .into_iter()
        .map(|m| m.text().unwrap_or_default().to_string())
        .collect()
}

/// Like [`find_text`] but a missing tag is a format violation inside `context`
pub fn require_text(node: Node<'_, '_>, path: &str, context: &str) -> Result<String> {
    find_text(node, path)
        .ok_or_else(|| ParseError::format(format!("Missing <{}> in <{}>.", path, context)))
}

/// Like [`find_parsed`] but a missing tag is a format violation inside `context`
pub fn require_parsed<T: FromStr>(node: Node<'_, '_>, path: &str, context: &str) -> Result<T> {
    find_parsed(node, path)?
        .ok_or_else(|| ParseError::format(format!("Missing <{}> in <{}>.", path, context)))
}
