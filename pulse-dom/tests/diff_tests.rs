use pulse_dom::diff::{Patch, PatchOp, diff};
use pulse_dom::{Props, h, text};

#[test]
fn props_set_and_remove() {
    let a = h("div", vec![("class", "a"), ("id", "x")], vec![]);
    let b = h("div", vec![("class", "b")], vec![]);

    let patches = diff(&a, &b);

    assert!(patches.contains(&Patch {
        path: vec![],
        op: PatchOp::SetAttr("class".into(), "b".into()),
    }));
    assert!(patches.contains(&Patch {
        path: vec![],
        op: PatchOp::RemoveAttr("id".into()),
    }));
}

#[test]
fn nested_text_change_carries_path() {
    let a = h(
        "main",
        (),
        vec![
            h("div", (), vec![text("same")]),
            h("div", (), vec![text("old")]),
        ],
    );
    let b = h(
        "main",
        (),
        vec![
            h("div", (), vec![text("same")]),
            h("div", (), vec![text("new")]),
        ],
    );

    let patches = diff(&a, &b);
    assert_eq!(
        patches,
        vec![Patch {
            path: vec![1, 0],
            op: PatchOp::Replace(text("new")),
        }]
    );
    assert_eq!(patches[0].to_string(), "/1/0 replace new");
}

#[test]
fn insert_and_remove_children() {
    let empty = h("ul", Props::new(), vec![]);
    let one = h("ul", Props::new(), vec![text("item")]);
    let two = h("ul", Props::new(), vec![text("a"), text("b")]);

    assert_eq!(
        diff(&empty, &one),
        vec![Patch {
            path: vec![0],
            op: PatchOp::Insert(text("item")),
        }]
    );

    let patches = diff(&two, &empty);
    let removed: Vec<Vec<usize>> = patches
        .iter()
        .filter(|p| p.op == PatchOp::Remove)
        .map(|p| p.path.clone())
        .collect();
    assert_eq!(removed, vec![vec![1], vec![0]]);
}

#[test]
fn replace_on_tag_change() {
    let a = h("div", Props::new(), vec![]);
    let b = h("span", Props::new(), vec![]);

    let patches = diff(&a, &b);
    assert_eq!(
        patches,
        vec![Patch {
            path: vec![],
            op: PatchOp::Replace(b.clone()),
        }]
    );
}

#[test]
fn identical_trees_produce_no_patches() {
    let tree = h("div", vec![("id", "x")], vec![text("hello")]);
    assert!(diff(&tree, &tree.clone()).is_empty());
}
