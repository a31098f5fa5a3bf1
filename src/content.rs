//! Content-region extraction from raw response markup.

use html_parser::{Dom, Element, Node};

use crate::error::LoadError;

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// The swappable subtree of a response, identified by the configured class
/// marker, together with the attributes the router reads off it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentRegion {
    /// Serialized markup of the region, ready to be handed to the document.
    pub html: String,
    /// The region element's `id`, used as the page name.
    pub name: Option<String>,
    /// Value of the configured type attribute (`data-node-type` by default).
    pub node_type: Option<String>,
    /// Value of `data-meta-title`, the new document title. Empty values are
    /// treated as absent.
    pub meta_title: Option<String>,
    /// Classes carried by the region element.
    pub classes: Vec<String>,
}

impl ContentRegion {
    /// Extract the designated content region from `raw`.
    ///
    /// If the response root itself carries the `page_class` marker it is used
    /// whole; otherwise the first matching descendant is used. Responses with
    /// no match fail with [`LoadError::ContentMissing`] rather than yielding
    /// an empty region.
    pub fn extract(raw: &str, page_class: &str, type_attr: &str) -> Result<Self, LoadError> {
        let dom = Dom::parse(raw.trim()).map_err(|err| LoadError::Parse(err.to_string()))?;

        let roots: Vec<&Element> = dom
            .children
            .iter()
            .filter_map(|node| match node {
                Node::Element(el) => Some(el),
                _ => None,
            })
            .collect();

        let region = roots
            .iter()
            .copied()
            .find(|el| has_class(el, page_class))
            .or_else(|| roots.iter().copied().find_map(|el| find_in(el, page_class)))
            .ok_or_else(|| LoadError::ContentMissing {
                marker: page_class.to_owned(),
            })?;

        Ok(Self::from_element(region, type_attr))
    }

    fn from_element(el: &Element, type_attr: &str) -> Self {
        Self {
            html: serialize_element(el),
            name: el.id.clone(),
            node_type: attribute(el, type_attr),
            meta_title: attribute(el, "data-meta-title").filter(|t| !t.is_empty()),
            classes: el.classes.clone(),
        }
    }
}

fn has_class(el: &Element, class: &str) -> bool {
    el.classes.iter().any(|c| c == class)
}

fn attribute(el: &Element, name: &str) -> Option<String> {
    el.attributes.get(name).cloned().flatten()
}

/// Depth-first search for the first descendant carrying `class`.
fn find_in<'a>(el: &'a Element, class: &str) -> Option<&'a Element> {
    for child in &el.children {
        let Node::Element(child) = child else {
            continue;
        };
        if has_class(child, class) {
            return Some(child);
        }
        if let Some(found) = find_in(child, class) {
            return Some(found);
        }
    }
    None
}

fn serialize_element(el: &Element) -> String {
    let mut out = String::new();
    write_element(&mut out, el);
    out
}

fn write_element(out: &mut String, el: &Element) {
    out.push('<');
    out.push_str(&el.name);

    if let Some(id) = &el.id {
        out.push_str(&format!(" id=\"{id}\""));
    }
    if !el.classes.is_empty() {
        out.push_str(&format!(" class=\"{}\"", el.classes.join(" ")));
    }
    // stable attribute order regardless of map iteration
    let mut attributes: Vec<_> = el.attributes.iter().collect();
    attributes.sort_by_key(|(name, _)| name.as_str());
    for (name, value) in attributes {
        match value {
            Some(value) => out.push_str(&format!(" {name}=\"{value}\"")),
            None => out.push_str(&format!(" {name}")),
        }
    }

    if VOID_ELEMENTS.contains(&el.name.as_str()) && el.children.is_empty() {
        out.push_str(" />");
        return;
    }
    out.push('>');

    for child in &el.children {
        match child {
            Node::Element(child) => write_element(out, child),
            Node::Text(text) => out.push_str(text),
            Node::Comment(_) => {}
        }
    }

    out.push_str(&format!("</{}>", el.name));
}
