//! Property tests for error-tree flattening.

use exval_core::{NormalizedPath, PathElement};
use exval_schema::{flatten, ErrorNode};
use proptest::prelude::*;

const COMPOSITE: &str = "composite";

fn arb_tree() -> impl Strategy<Value = ErrorNode> {
    let leaf = ("[a-z]{1,6}", 0usize..4).prop_map(|(message, index)| {
        ErrorNode::leaf(message, NormalizedPath::root().child(PathElement::Index(index)))
    });
    leaf.prop_recursive(5, 64, 4, |inner| {
        prop::collection::vec(inner, 1..4).prop_map(|children| ErrorNode {
            message: COMPOSITE.to_string(),
            instance_path: NormalizedPath::root(),
            children,
        })
    })
}

fn leaves_recursive(node: &ErrorNode, out: &mut Vec<(String, String)>) {
    if node.is_leaf() {
        out.push((node.message.clone(), node.instance_path.to_string()));
    } else {
        for child in &node.children {
            leaves_recursive(child, out);
        }
    }
}

proptest! {
    #[test]
    fn flatten_matches_recursive_leaf_walk(forest in prop::collection::vec(arb_tree(), 0..4)) {
        let mut expected = Vec::new();
        for tree in &forest {
            leaves_recursive(tree, &mut expected);
        }
        let actual: Vec<(String, String)> = flatten(&forest)
            .into_iter()
            .map(|e| (e.message, e.json_path))
            .collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn composite_messages_never_surface(forest in prop::collection::vec(arb_tree(), 0..4)) {
        prop_assert!(flatten(&forest).iter().all(|e| e.message != COMPOSITE));
    }
}
