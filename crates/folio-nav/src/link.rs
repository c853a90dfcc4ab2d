//! Navigation links and collections.
//!
//! Raw link configuration is normalized once at construction: every link has
//! a `children` sequence (possibly empty) and a derived `has_children` flag,
//! so templates never branch on field presence.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::NavError;

/// Depth of grandchild links (top level is 0).
///
/// Active-parent lookup never looks below this depth.
const MAX_LOOKUP_DEPTH: usize = 2;

/// A node in a navigation tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavLink {
    url: String,
    label: String,
    has_children: bool,
    children: Vec<NavLink>,
}

impl NavLink {
    /// Create a link, deriving `has_children` from `children`.
    #[must_use]
    pub fn new(url: impl Into<String>, label: impl Into<String>, children: Vec<NavLink>) -> Self {
        Self {
            url: url.into(),
            label: label.into(),
            has_children: !children.is_empty(),
            children,
        }
    }

    /// Link target URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// True if the link has at least one child.
    #[must_use]
    pub fn has_children(&self) -> bool {
        self.has_children
    }

    /// Child links in declaration order.
    #[must_use]
    pub fn children(&self) -> &[NavLink] {
        &self.children
    }

    /// Check whether `url` is this link, one of its children or grandchildren.
    fn subtree_contains(&self, url: &str) -> bool {
        self.url == url
            || self.children.iter().any(|child| {
                child.url == url || child.children.iter().any(|grandchild| grandchild.url == url)
            })
    }
}

/// A named set of top-level navigation links.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavCollection {
    name: String,
    links: Vec<NavLink>,
}

impl NavCollection {
    /// Create an empty collection.
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            links: Vec::new(),
        }
    }

    /// Build a collection from raw link configuration.
    ///
    /// `raw` is either a sequence of link objects or an object whose `links`
    /// field is that sequence. Each link object has a string `url`, a string
    /// `label` and an optional `children` sequence. The input is not modified.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::Malformed`] naming the offending entry if the
    /// configuration has the wrong shape.
    pub fn build(name: &str, raw: &Value) -> Result<Self, NavError> {
        let (items, location) = match raw {
            Value::Array(items) => (items, name.to_owned()),
            Value::Object(map) => match map.get("links") {
                Some(Value::Array(items)) => (items, format!("{name}.links")),
                Some(other) => {
                    return Err(malformed(
                        format!("{name}.links"),
                        format!("expected an array of links, found {}", kind(other)),
                    ));
                }
                None => {
                    return Err(malformed(
                        name,
                        "expected an array of links or an object with a `links` array",
                    ));
                }
            },
            other => {
                return Err(malformed(
                    name,
                    format!("expected an array of links, found {}", kind(other)),
                ));
            }
        };

        let links = parse_links(items, &location, 0)?;

        Ok(Self {
            name: name.to_owned(),
            links,
        })
    }

    /// Collection name (e.g., "main").
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Top-level links in declaration order.
    #[must_use]
    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    /// True if the collection has no links.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Find the top-level link whose subtree contains `url`.
    ///
    /// Matches the top-level url, then child urls, then grandchild urls,
    /// top-level link by top-level link in declaration order. Returns the
    /// top-level ancestor regardless of match depth, or `None` when no link
    /// matches (e.g. the home page).
    #[must_use]
    pub fn get_active_parent_link(&self, url: &str) -> Option<&NavLink> {
        self.links.iter().find(|link| link.subtree_contains(url))
    }
}

fn parse_links(items: &[Value], location: &str, depth: usize) -> Result<Vec<NavLink>, NavError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_link(item, &format!("{location}[{i}]"), depth))
        .collect()
}

fn parse_link(value: &Value, location: &str, depth: usize) -> Result<NavLink, NavError> {
    let Value::Object(map) = value else {
        return Err(malformed(
            location,
            format!("expected a link object, found {}", kind(value)),
        ));
    };

    let url = required_str(map, "url", location)?;
    let label = required_str(map, "label", location)?;

    let children = match map.get("children") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => {
            if depth == MAX_LOOKUP_DEPTH && !items.is_empty() {
                tracing::warn!(
                    location,
                    "Navigation links nested below grandchildren are never marked active"
                );
            }
            parse_links(items, &format!("{location}.children"), depth + 1)?
        }
        Some(other) => {
            return Err(malformed(
                format!("{location}.children"),
                format!("expected an array, found {}", kind(other)),
            ));
        }
    };

    Ok(NavLink::new(url, label, children))
}

fn required_str<'a>(
    map: &'a Map<String, Value>,
    field: &str,
    location: &str,
) -> Result<&'a str, NavError> {
    match map.get(field) {
        Some(Value::String(s)) => Ok(s),
        None | Some(Value::Null) => Err(malformed(location, format!("missing `{field}`"))),
        Some(other) => Err(malformed(
            location,
            format!("`{field}` must be a string, found {}", kind(other)),
        )),
    }
}

fn malformed(location: impl Into<String>, message: impl Into<String>) -> NavError {
    NavError::Malformed {
        location: location.into(),
        message: message.into(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
