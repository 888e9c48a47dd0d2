//! Random edit sequences against the pane tree algebra.

use panefm::ids::SequentialIds;
use panefm::layout::{self, Orientation, PaneNode};
use panefm::tab::Tab;
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Split(usize, bool),
    Close(usize),
    AddTab(usize),
    CloseTab(usize, usize),
    Activate(usize, usize),
    Navigate(usize, usize),
    Resize(usize, u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<usize>(), any::<bool>()).prop_map(|(p, h)| Op::Split(p, h)),
        any::<usize>().prop_map(Op::Close),
        any::<usize>().prop_map(Op::AddTab),
        (any::<usize>(), any::<usize>()).prop_map(|(p, t)| Op::CloseTab(p, t)),
        (any::<usize>(), any::<usize>()).prop_map(|(p, t)| Op::Activate(p, t)),
        (any::<usize>(), any::<usize>()).prop_map(|(p, t)| Op::Navigate(p, t)),
        (any::<usize>(), 1u8..20).prop_map(|(p, w)| Op::Resize(p, w)),
    ]
}

const PATHS: [&str; 4] = ["/", "/usr", "/usr/lib", "/tmp"];

fn initial() -> Vec<PaneNode> {
    vec![PaneNode::leaf(
        "root".to_string(),
        Tab::with_name("t1".to_string(), "/", "Home"),
    )]
}

fn all_pane_ids(forest: &[PaneNode]) -> Vec<String> {
    fn walk(node: &PaneNode, out: &mut Vec<String>) {
        out.push(node.id().to_string());
        if let PaneNode::Container { children, .. } = node {
            for child in children {
                walk(child, out);
            }
        }
    }
    let mut out = Vec::new();
    for root in forest {
        walk(root, &mut out);
    }
    out
}

fn tab_ids(forest: &[PaneNode], pane_id: &str) -> Vec<String> {
    match layout::find_pane(forest, pane_id) {
        Some(PaneNode::Leaf { tabs, .. }) => tabs.iter().map(|t| t.id.clone()).collect(),
        _ => Vec::new(),
    }
}

fn pick(items: &[String], index: usize) -> String {
    items[index % items.len()].clone()
}

fn apply(forest: &[PaneNode], op: &Op, ids: &mut SequentialIds) -> Vec<PaneNode> {
    let leaves = layout::leaf_ids(forest);
    let panes = all_pane_ids(forest);
    match *op {
        Op::Split(p, horizontal) => {
            let orientation = if horizontal {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            layout::split_pane(forest, &pick(&leaves, p), orientation, "/", ids)
        }
        Op::Close(p) => layout::close_pane(forest, &pick(&panes, p)).0,
        Op::AddTab(p) => layout::add_tab(forest, &pick(&leaves, p), PATHS[p % PATHS.len()], ids),
        Op::CloseTab(p, t) => {
            let pane = pick(&leaves, p);
            let tab = pick(&tab_ids(forest, &pane), t);
            layout::close_tab(forest, &pane, &tab)
        }
        Op::Activate(p, t) => {
            let pane = pick(&leaves, p);
            let tab = pick(&tab_ids(forest, &pane), t);
            layout::activate_tab(forest, &pane, &tab)
        }
        Op::Navigate(p, t) => {
            let pane = pick(&leaves, p);
            let tab = pick(&tab_ids(forest, &pane), t);
            layout::navigate_tab(forest, &pane, &tab, PATHS[t % PATHS.len()])
        }
        Op::Resize(p, w) => layout::resize_pane(forest, &pick(&panes, p), f64::from(w) / 2.0),
    }
}

fn build(ops: &[Op]) -> (Vec<PaneNode>, SequentialIds) {
    let mut ids = SequentialIds::new();
    let mut forest = initial();
    for op in ops {
        forest = apply(&forest, op, &mut ids);
    }
    (forest, ids)
}

proptest! {
    #[test]
    fn edits_preserve_invariants(ops in prop::collection::vec(op_strategy(), 0..48)) {
        let mut ids = SequentialIds::new();
        let mut forest = initial();
        for op in &ops {
            let before = forest.clone();
            forest = apply(&forest, op, &mut ids);
            prop_assert!(
                layout::validate_forest(&forest).is_ok(),
                "{:?} broke {:?}: {:?}",
                op,
                before,
                layout::validate_forest(&forest)
            );
            prop_assert!(!forest.is_empty());
            prop_assert!(layout::find_first_leaf(&forest).is_some());
        }
    }

    #[test]
    fn close_pane_focus_is_a_live_leaf(
        ops in prop::collection::vec(op_strategy(), 0..32),
        target in any::<usize>(),
    ) {
        let (forest, _) = build(&ops);
        let panes = all_pane_ids(&forest);
        let (next, focus) = layout::close_pane(&forest, &pick(&panes, target));
        match focus {
            Some(id) => {
                prop_assert!(layout::find_pane(&next, &id).is_some_and(|p| p.is_leaf()));
                prop_assert_eq!(layout::find_first_leaf(&next).map(|p| p.id().to_string()), Some(id));
            }
            None => prop_assert_eq!(next, forest),
        }
    }

    #[test]
    fn closing_a_lone_tab_is_identity(ops in prop::collection::vec(op_strategy(), 0..32)) {
        let (forest, _) = build(&ops);
        for pane in layout::leaf_ids(&forest) {
            let tabs = tab_ids(&forest, &pane);
            if tabs.len() == 1 {
                prop_assert_eq!(layout::close_tab(&forest, &pane, &tabs[0]), forest.clone());
            }
        }
    }

    #[test]
    fn split_then_close_new_leaf_restores_forest(
        ops in prop::collection::vec(op_strategy(), 0..32),
        target in any::<usize>(),
        horizontal in any::<bool>(),
    ) {
        let (forest, mut ids) = build(&ops);
        let leaf = pick(&layout::leaf_ids(&forest), target);
        let orientation = if horizontal { Orientation::Horizontal } else { Orientation::Vertical };

        let split = layout::split_pane(&forest, &leaf, orientation, "/tmp", &mut ids);
        let new_leaf = match layout::find_pane(&split, &leaf) {
            Some(PaneNode::Container { children, .. }) => children[1].id().to_string(),
            other => panic!("split did not produce a container: {:?}", other),
        };
        let (closed, _) = layout::close_pane(&split, &new_leaf);
        // The collapsed slot takes the survivor's fresh unit weight
        let expected = layout::resize_pane(&forest, &leaf, 1.0);
        prop_assert_eq!(closed, expected);
    }
}
