//! YAML front matter at the top of markdown sources.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fence line opening and closing a front matter block.
const FENCE: &str = "---";

/// Page metadata declared in front matter.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FrontMatter {
    /// Page title.
    pub title: Option<String>,
    /// Section the page belongs to.
    pub section: Option<String>,
    /// Subsection within the section.
    pub subsection: Option<String>,
    /// Sort key within the page's group.
    pub order: Option<i64>,
    /// Any other keys, kept as JSON values.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FrontMatter {
    /// Look up a key as a JSON value.
    ///
    /// Known keys are returned when set; anything else comes from `extra`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        match key {
            "title" => self.title.clone().map(Value::String),
            "section" => self.section.clone().map(Value::String),
            "subsection" => self.subsection.clone().map(Value::String),
            "order" => self.order.map(Value::from),
            _ => self.extra.get(key).cloned(),
        }
    }
}

/// Split a markdown source into front matter and body.
///
/// Front matter is a YAML block between `---` lines at the very start of the
/// file. A source without an opening fence, or with an opening fence that is
/// never closed, has empty front matter and is returned whole as the body.
///
/// # Errors
///
/// Returns the YAML parser message if the block is not valid front matter.
pub fn split(source: &str) -> Result<(FrontMatter, &str), String> {
    let Some((yaml, body)) = fenced_block(source) else {
        return Ok((FrontMatter::default(), source));
    };

    if yaml.trim().is_empty() {
        return Ok((FrontMatter::default(), body));
    }
    let front_matter = serde_yaml::from_str(yaml).map_err(|e| e.to_string())?;
    Ok((front_matter, body))
}

/// Find the fenced block. Returns the YAML text and the rest of the source.
fn fenced_block(source: &str) -> Option<(&str, &str)> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let first_end = source.find('\n')?;
    if source[..first_end].trim_end() != FENCE {
        return None;
    }

    let yaml_start = first_end + 1;
    let mut offset = yaml_start;
    for line in source[yaml_start..].split_inclusive('\n') {
        if line.trim_end() == FENCE {
            let body = &source[offset + line.len()..];
            return Some((&source[yaml_start..offset], body));
        }
        offset += line.len();
    }
    None
}
