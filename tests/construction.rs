//! Integration tests for node construction: absorption and child extraction.

use tokenfold::fold::node::{NodeKind, SequenceNode};
use tokenfold::fold::registry::NodeRegistry;
use tokenfold::fold::sequence::{LinkId, LinkState, Sequence};
use tokenfold::fold::testing::{assert_node, reachable, sequence_of};

fn id(index: usize) -> LinkId {
    LinkId::from_index(index)
}

fn values(sequence: &Sequence, from: LinkId) -> Vec<String> {
    reachable(sequence, from)
        .into_iter()
        .map(|(value, _)| value)
        .collect()
}

fn registry_with(kinds: Vec<NodeKind>) -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    for kind in kinds {
        registry.register_kind(kind).expect("kind to register");
    }
    registry
}

#[test]
fn test_previous_absorption_keeps_document_order() {
    let mut seq = sequence_of(&[("p", "a"), ("p", "b"), ("p", "c")]);
    let kind = NodeKind::new("p").absorb_previous("p");

    let node = SequenceNode::construct(&mut seq, id(2), &kind, &NodeRegistry::new());

    assert_node(&node).payload(&["a", "b", "c"]);
    // Absorbed links stay in place as inert placeholders.
    assert_eq!(values(&seq, id(0)), vec!["", "", "p"]);
}

#[test]
fn test_next_absorption_keeps_document_order() {
    let mut seq = sequence_of(&[("p", "c"), ("p", "d"), ("p", "e")]);
    let kind = NodeKind::new("p").absorb_next("p");

    let node = SequenceNode::construct(&mut seq, id(0), &kind, &NodeRegistry::new());

    assert_node(&node).payload(&["c", "d", "e"]);
}

#[test]
fn test_absorption_in_both_directions() {
    let mut seq = sequence_of(&[
        ("note", "before"),
        ("text", "main"),
        ("note", "after"),
        ("note", ""),
        ("note", "unreached"),
    ]);
    let kind = NodeKind::new("text")
        .absorb_previous("note")
        .absorb_next("note");

    let node = SequenceNode::construct(&mut seq, id(1), &kind, &NodeRegistry::new());

    assert_node(&node).payload(&["before", "main", "after"]);
    assert_eq!(seq.state(id(3)), LinkState::Live);
    assert_eq!(seq.state(id(4)), LinkState::Live);
}

#[test]
fn test_extraction_removes_child_from_sequence() {
    let registry = registry_with(vec![
        NodeKind::new("A").child("child"),
        NodeKind::new("child").secondary(),
    ]);
    let mut seq = sequence_of(&[("A", "a"), ("child", "b"), ("C", "c")]);

    let node = registry.create("A", &mut seq, id(0)).expect("node");

    assert_eq!(seq.next(id(0)), Some(id(2)));
    assert_eq!(seq.previous(id(2)), Some(id(0)));
    assert_eq!(values(&seq, id(0)), vec!["A", "C"]);
    assert_node(&node)
        .child_count("child", 1)
        .child("child", 0, |child| {
            child.name("child").payload(&["b"]);
        });
}

#[test]
fn test_same_kind_children_keep_order() {
    let registry = registry_with(vec![NodeKind::new("P").child("k"), NodeKind::new("k")]);
    let mut seq = sequence_of(&[("P", "p"), ("k", "x1"), ("k", "x2"), ("Q", "q")]);

    let node = registry.create("P", &mut seq, id(0)).expect("node");

    assert_node(&node)
        .child_count("k", 2)
        .child("k", 0, |child| {
            child.payload(&["x1"]);
        })
        .child("k", 1, |child| {
            child.payload(&["x2"]);
        });
    assert_eq!(values(&seq, id(0)), vec!["P", "Q"]);
}

#[test]
fn test_unregistered_child_kind_is_dropped_silently() {
    let registry = registry_with(vec![NodeKind::new("P").child("k")]);
    let mut seq = sequence_of(&[("P", "p"), ("k", "x"), ("Q", "q")]);

    let node = registry.create("P", &mut seq, id(0)).expect("node");

    assert_node(&node).no_slot("k");
    assert_eq!(seq.state(id(1)), LinkState::Removed);
    assert_eq!(values(&seq, id(0)), vec!["P", "Q"]);
}

#[test]
fn test_extraction_rewinds_to_head() {
    let registry = registry_with(vec![NodeKind::new("P").child("k"), NodeKind::new("k")]);
    let mut seq = sequence_of(&[("k", "before"), ("P", "p"), ("k", "after")]);

    let node = registry.create("P", &mut seq, id(1)).expect("node");

    assert_node(&node)
        .child_count("k", 2)
        .child("k", 0, |child| {
            child.payload(&["before"]);
        });
    assert_eq!(seq.previous(id(1)), None);
    assert_eq!(values(&seq, id(1)), vec!["P"]);
}

#[test]
fn test_child_kinds_are_searched_in_declared_order() {
    let registry = registry_with(vec![
        NodeKind::new("fn").child("returns").child("@param"),
        NodeKind::new("returns"),
        NodeKind::new("@param"),
    ]);
    let mut seq = sequence_of(&[
        ("fn", "f"),
        ("@param", "a"),
        ("returns", "r"),
        ("@param", "b"),
    ]);

    let node = registry.create("fn", &mut seq, id(0)).expect("node");

    let slots: Vec<_> = node.children.keys().cloned().collect();
    assert_eq!(slots, vec!["param", "returns"]);
    assert_node(&node)
        .child_count("param", 2)
        .child_count("returns", 1);
    assert_eq!(values(&seq, id(0)), vec!["fn"]);
}

#[test]
fn test_children_absorb_their_own_continuations() {
    let registry = registry_with(vec![
        NodeKind::new("fn").child("param"),
        NodeKind::new("param").secondary().absorb_next("text"),
    ]);
    let mut seq = sequence_of(&[
        ("fn", "f"),
        ("param", "a"),
        ("text", "more about a"),
        ("param", "b"),
    ]);

    let node = registry.create("fn", &mut seq, id(0)).expect("node");

    assert_node(&node)
        .child_count("param", 2)
        .child("param", 0, |child| {
            child.payload(&["a", "more about a"]).primary(false);
        })
        .child("param", 1, |child| {
            child.payload(&["b"]);
        });
    assert_eq!(values(&seq, id(0)), vec!["fn", ""]);
}

#[test]
fn test_node_extracting_its_own_kind() {
    let registry = registry_with(vec![NodeKind::new("item").child("item")]);
    let mut seq = sequence_of(&[("item", "one"), ("item", "two")]);

    let node = registry.create("item", &mut seq, id(0)).expect("node");

    // A node never extracts the link it was built from.
    assert_node(&node)
        .payload(&["one"])
        .child_count("item", 1)
        .child("item", 0, |child| {
            child.payload(&["two"]).no_slot("item");
        });
    assert_eq!(seq.state(id(0)), LinkState::Claimed);
    assert_eq!(seq.state(id(1)), LinkState::Removed);
}

#[test]
fn test_mutually_extracting_kinds_terminate() {
    let registry = registry_with(vec![
        NodeKind::new("a").child("b"),
        NodeKind::new("b").child("a"),
    ]);
    let mut seq = sequence_of(&[("a", "1"), ("b", "2"), ("a", "3")]);

    let node = registry.create("a", &mut seq, id(0)).expect("node");

    assert_node(&node)
        .child_count("b", 1)
        .child("b", 0, |b| {
            b.child_count("a", 1).child("a", 0, |a| {
                a.payload(&["3"]);
            });
        });
    assert_eq!(values(&seq, id(0)), vec!["a"]);
}

#[test]
fn test_no_child_kinds_leaves_sequence_alone() {
    let mut seq = sequence_of(&[("P", "p"), ("k", "x")]);

    let node = SequenceNode::construct(&mut seq, id(0), &NodeKind::new("P"), &NodeRegistry::new());

    assert!(node.children.is_empty());
    assert_eq!(values(&seq, id(0)), vec!["P", "k"]);
}

#[test]
fn test_unchecked_empty_child_kind_leaves_placeholders() {
    let mut seq = sequence_of(&[("", ""), ("P", "p"), ("", "kept")]);
    let kind = NodeKind::new("P").child("");

    let node = SequenceNode::construct(&mut seq, id(1), &kind, &NodeRegistry::new());

    assert!(node.children.is_empty());
    assert_eq!(
        reachable(&seq, id(0)),
        vec![
            (String::new(), String::new()),
            ("P".to_string(), "p".to_string()),
            (String::new(), "kept".to_string()),
        ]
    );
}

#[test]
fn test_emptied_links_are_not_extracted() {
    let registry = registry_with(vec![
        NodeKind::new("text").absorb_next("text"),
        NodeKind::new("P").child("text"),
    ]);
    let mut seq = sequence_of(&[("text", "a"), ("text", "b"), ("P", "p")]);

    registry.create("text", &mut seq, id(0)).expect("node");
    let node = registry.create("P", &mut seq, id(2)).expect("node");

    // The claimed source and the emptied placeholder both stay in the chain.
    assert_node(&node).no_slot("text");
    assert_eq!(values(&seq, id(0)), vec!["text", "", "P"]);
    assert_eq!(seq.state(id(1)), LinkState::Emptied);
}
