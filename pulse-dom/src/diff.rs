//! Structural diff between two renders of the same tree.
//!
//! Patches are flat: each one carries the child-index path from the root to
//! the node it applies to, so a frame can be logged one line per change.

use std::fmt;

use crate::{Props, VNode};

#[derive(Debug, Clone, PartialEq)]
pub enum PatchOp {
    Replace(VNode),
    SetAttr(String, String),
    RemoveAttr(String),
    Insert(VNode),
    Remove,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub path: Vec<usize>,
    pub op: PatchOp,
}

impl Patch {
    fn at(path: &[usize], op: PatchOp) -> Self {
        Self {
            path: path.to_vec(),
            op,
        }
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        let path: Vec<String> = self.path.iter().map(usize::to_string).collect();
        f.write_str(&path.join("/"))?;
        match &self.op {
            PatchOp::Replace(node) => write!(f, " replace {node}"),
            PatchOp::SetAttr(k, v) => write!(f, " set {k}={v}"),
            PatchOp::RemoveAttr(k) => write!(f, " unset {k}"),
            PatchOp::Insert(node) => write!(f, " insert {node}"),
            PatchOp::Remove => f.write_str(" remove"),
        }
    }
}

pub fn diff(old: &VNode, new: &VNode) -> Vec<Patch> {
    let mut patches = Vec::new();
    let mut path = Vec::new();
    diff_node(old, new, &mut path, &mut patches);
    patches
}

fn diff_node(old: &VNode, new: &VNode, path: &mut Vec<usize>, out: &mut Vec<Patch>) {
    match (old, new) {
        (VNode::Text(a), VNode::Text(b)) => {
            if a != b {
                out.push(Patch::at(path, PatchOp::Replace(new.clone())));
            }
        }
        (
            VNode::Element {
                tag: tag_a,
                props: props_a,
                children: children_a,
            },
            VNode::Element {
                tag: tag_b,
                props: props_b,
                children: children_b,
            },
        ) if tag_a == tag_b => {
            diff_props(props_a, props_b, path, out);
            diff_children(children_a, children_b, path, out);
        }
        _ => out.push(Patch::at(path, PatchOp::Replace(new.clone()))),
    }
}

fn diff_props(a: &Props, b: &Props, path: &[usize], out: &mut Vec<Patch>) {
    for (k, v_new) in &b.attrs {
        if a.attrs.get(k) != Some(v_new) {
            out.push(Patch::at(path, PatchOp::SetAttr(k.clone(), v_new.clone())));
        }
    }
    for k in a.attrs.keys().filter(|k| !b.attrs.contains_key(*k)) {
        out.push(Patch::at(path, PatchOp::RemoveAttr(k.clone())));
    }
}

fn diff_children(a: &[VNode], b: &[VNode], path: &mut Vec<usize>, out: &mut Vec<Patch>) {
    for (i, (old, new)) in a.iter().zip(b).enumerate() {
        path.push(i);
        diff_node(old, new, path, out);
        path.pop();
    }
    for (i, node) in b.iter().enumerate().skip(a.len()) {
        path.push(i);
        out.push(Patch::at(path, PatchOp::Insert(node.clone())));
        path.pop();
    }
    // Highest index first so earlier removals don't shift later ones.
    for i in (b.len()..a.len()).rev() {
        path.push(i);
        out.push(Patch::at(path, PatchOp::Remove));
        path.pop();
    }
}
