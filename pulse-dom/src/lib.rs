//! Virtual node tree and the components that present a [`pulse_core::Store`].

use std::collections::BTreeMap;
use std::fmt;

pub mod app;
pub mod controls;
pub mod diff;
pub mod display;

pub use app::App;
pub use controls::{ControlEvent, ControlScript, Controls, ScriptError, Trigger};
pub use display::{DisplayNode, DisplaySource};

#[derive(Debug, Clone, PartialEq)]
pub enum VNode {
    Element {
        tag: String,
        props: Props,
        children: Vec<VNode>,
    },
    Text(String),
}

impl VNode {
    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        match self {
            VNode::Text(t) => t.clone(),
            VNode::Element { children, .. } => {
                children.iter().map(VNode::text_content).collect()
            }
        }
    }

    /// Depth-first search for the first element whose `id` attribute matches.
    pub fn find_by_id(&self, id: &str) -> Option<&VNode> {
        match self {
            VNode::Text(_) => None,
            VNode::Element {
                props, children, ..
            } => {
                if props.get("id") == Some(id) {
                    return Some(self);
                }
                children.iter().find_map(|c| c.find_by_id(id))
            }
        }
    }
}

impl fmt::Display for VNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VNode::Text(t) => f.write_str(t),
            VNode::Element {
                tag,
                props,
                children,
            } => {
                write!(f, "<{tag}")?;
                for (k, v) in &props.attrs {
                    write!(f, " {k}=\"{v}\"")?;
                }
                f.write_str(">")?;
                for child in children {
                    write!(f, "{child}")?;
                }
                write!(f, "</{tag}>")
            }
        }
    }
}

/// Element attributes, kept sorted so rendering and diffing are stable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Props {
    pub attrs: BTreeMap<String, String>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, k: impl Into<String>, v: impl Into<String>) -> Self {
        self.attrs.insert(k.into(), v.into());
        self
    }

    pub fn get(&self, k: &str) -> Option<&str> {
        self.attrs.get(k).map(String::as_str)
    }
}

// Allow concise props creation
impl From<()> for Props {
    fn from(_: ()) -> Self {
        Props::default()
    }
}

impl From<Vec<(&str, &str)>> for Props {
    fn from(v: Vec<(&str, &str)>) -> Self {
        v.into_iter().fold(Props::new(), |p, (k, v)| p.set(k, v))
    }
}

pub fn h(tag: impl Into<String>, props: impl Into<Props>, children: Vec<VNode>) -> VNode {
    VNode::Element {
        tag: tag.into(),
        props: props.into(),
        children,
    }
}

pub fn text(t: impl Into<String>) -> VNode {
    VNode::Text(t.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_tree() {
        let node = h(
            "section",
            vec![("id", "cheap"), ("class", "display")],
            vec![text("cheap: "), h("time", (), vec![text("now")])],
        );
        assert_eq!(node.text_content(), "cheap: now");
        assert!(node.find_by_id("cheap").is_some());
        assert!(node.find_by_id("missing").is_none());
        assert_eq!(
            node.to_string(),
            "<section class=\"display\" id=\"cheap\">cheap: <time>now</time></section>"
        );
    }
}
