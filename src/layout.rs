use std::collections::HashSet;

use serde::Serialize;

use crate::ids::IdGenerator;
use crate::tab::{Tab, TabId};

pub type PaneId = String;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A node of the pane tree.
///
/// Leaves own the tabs; containers own the children and one proportional
/// weight per child. A node can never be both.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PaneNode {
    Leaf {
        id: PaneId,
        tabs: Vec<Tab>,
        active_tab_id: TabId,
    },
    Container {
        id: PaneId,
        orientation: Orientation,
        children: Vec<PaneNode>,
        sizes: Vec<f64>,
    },
}

/// Outcome of removing a child from a container.
enum Removal {
    Missing,
    Removed,
    /// The container collapsed into its survivor, which had this weight.
    Collapsed { weight: f64 },
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("container {0} has fewer than two children")]
    UnderfilledContainer(PaneId),
    #[error("container {0} has {1} sizes for {2} children")]
    SizeMismatch(PaneId, usize, usize),
    #[error("container {0} has a non-positive weight")]
    InvalidWeight(PaneId),
    #[error("leaf {0} has no tabs")]
    EmptyLeaf(PaneId),
    #[error("leaf {pane} points at missing tab {tab}")]
    DanglingActiveTab { pane: PaneId, tab: TabId },
    #[error("pane id {0} appears more than once")]
    DuplicatePaneId(PaneId),
    #[error("tab id {0} appears more than once")]
    DuplicateTabId(TabId),
}

impl PaneNode {
    /// A leaf holding a single, active tab.
    pub fn leaf(id: PaneId, tab: Tab) -> Self {
        let active_tab_id = tab.id.clone();
        PaneNode::Leaf {
            id,
            tabs: vec![tab],
            active_tab_id,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            PaneNode::Leaf { id, .. } | PaneNode::Container { id, .. } => id,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, PaneNode::Leaf { .. })
    }

    /// The active tab of a leaf. Always `None` for containers.
    pub fn active_tab(&self) -> Option<&Tab> {
        match self {
            PaneNode::Leaf {
                tabs, active_tab_id, ..
            } => tabs.iter().find(|t| t.id == *active_tab_id),
            PaneNode::Container { .. } => None,
        }
    }

    /// Check if this subtree contains the given pane.
    pub fn contains(&self, target: &str) -> bool {
        self.find(target).is_some()
    }

    /// Get the first leaf in this subtree (pre-order, left to right).
    pub fn first_leaf(&self) -> Option<&PaneNode> {
        match self {
            PaneNode::Leaf { .. } => Some(self),
            PaneNode::Container { children, .. } => children.iter().find_map(|c| c.first_leaf()),
        }
    }

    fn find(&self, target: &str) -> Option<&PaneNode> {
        if self.id() == target {
            return Some(self);
        }
        match self {
            PaneNode::Leaf { .. } => None,
            PaneNode::Container { children, .. } => children.iter().find_map(|c| c.find(target)),
        }
    }

    fn find_mut(&mut self, target: &str) -> Option<&mut PaneNode> {
        if self.id() == target {
            return Some(self);
        }
        match self {
            PaneNode::Leaf { .. } => None,
            PaneNode::Container { children, .. } => {
                children.iter_mut().find_map(|c| c.find_mut(target))
            }
        }
    }

    fn parent_of(&self, child_id: &str) -> Option<&PaneNode> {
        match self {
            PaneNode::Leaf { .. } => None,
            PaneNode::Container { children, .. } => {
                if children.iter().any(|c| c.id() == child_id) {
                    Some(self)
                } else {
                    children.iter().find_map(|c| c.parent_of(child_id))
                }
            }
        }
    }

    fn parent_of_mut(&mut self, child_id: &str) -> Option<&mut PaneNode> {
        let is_parent = match self {
            PaneNode::Leaf { .. } => return None,
            PaneNode::Container { children, .. } => children.iter().any(|c| c.id() == child_id),
        };
        if is_parent {
            return Some(self);
        }
        match self {
            PaneNode::Leaf { .. } => None,
            PaneNode::Container { children, .. } => children
                .iter_mut()
                .find_map(|c| c.parent_of_mut(child_id)),
        }
    }

    fn with_id(mut self, new_id: PaneId) -> Self {
        match &mut self {
            PaneNode::Leaf { id, .. } | PaneNode::Container { id, .. } => *id = new_id,
        }
        self
    }

    /// Remove a direct child (and its weight). A container left with a single
    /// child takes on that child's variant and contents but keeps its own id.
    fn remove_child(&mut self, child_id: &str) -> Removal {
        let PaneNode::Container {
            id,
            children,
            sizes,
            ..
        } = self
        else {
            return Removal::Missing;
        };
        let Some(index) = children.iter().position(|c| c.id() == child_id) else {
            return Removal::Missing;
        };
        children.remove(index);
        if index < sizes.len() {
            sizes.remove(index);
        }
        if children.len() != 1 {
            return Removal::Removed;
        }
        let slot_id = id.clone();
        let weight = sizes.first().copied().unwrap_or(1.0);
        match children.pop() {
            Some(survivor) => {
                *self = survivor.with_id(slot_id);
                Removal::Collapsed { weight }
            }
            None => Removal::Removed,
        }
    }

    fn collect_leaf_ids(&self, ids: &mut Vec<PaneId>) {
        match self {
            PaneNode::Leaf { id, .. } => ids.push(id.clone()),
            PaneNode::Container { children, .. } => {
                for child in children {
                    child.collect_leaf_ids(ids);
                }
            }
        }
    }

    fn validate_into(
        &self,
        panes: &mut HashSet<PaneId>,
        tabs_seen: &mut HashSet<TabId>,
    ) -> Result<(), InvariantViolation> {
        if !panes.insert(self.id().to_string()) {
            return Err(InvariantViolation::DuplicatePaneId(self.id().to_string()));
        }
        match self {
            PaneNode::Leaf {
                id,
                tabs,
                active_tab_id,
            } => {
                if tabs.is_empty() {
                    return Err(InvariantViolation::EmptyLeaf(id.clone()));
                }
                for tab in tabs {
                    if !tabs_seen.insert(tab.id.clone()) {
                        return Err(InvariantViolation::DuplicateTabId(tab.id.clone()));
                    }
                }
                if !tabs.iter().any(|t| t.id == *active_tab_id) {
                    return Err(InvariantViolation::DanglingActiveTab {
                        pane: id.clone(),
                        tab: active_tab_id.clone(),
                    });
                }
                Ok(())
            }
            PaneNode::Container {
                id,
                children,
                sizes,
                ..
            } => {
                if children.len() < 2 {
                    return Err(InvariantViolation::UnderfilledContainer(id.clone()));
                }
                if sizes.len() != children.len() {
                    return Err(InvariantViolation::SizeMismatch(
                        id.clone(),
                        sizes.len(),
                        children.len(),
                    ));
                }
                if sizes.iter().any(|w| !w.is_finite() || *w <= 0.0) {
                    return Err(InvariantViolation::InvalidWeight(id.clone()));
                }
                children
                    .iter()
                    .try_for_each(|c| c.validate_into(panes, tabs_seen))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// Depth-first search for a pane by id across all roots.
pub fn find_pane<'a>(forest: &'a [PaneNode], id: &str) -> Option<&'a PaneNode> {
    forest.iter().find_map(|root| root.find(id))
}

fn find_pane_mut<'a>(forest: &'a mut [PaneNode], id: &str) -> Option<&'a mut PaneNode> {
    forest.iter_mut().find_map(|root| root.find_mut(id))
}

/// The container whose immediate children include `child_id`.
/// `None` for roots and unknown ids.
pub fn find_parent<'a>(forest: &'a [PaneNode], child_id: &str) -> Option<&'a PaneNode> {
    forest.iter().find_map(|root| root.parent_of(child_id))
}

pub fn find_first_leaf(forest: &[PaneNode]) -> Option<&PaneNode> {
    forest.iter().find_map(|root| root.first_leaf())
}

/// All leaf ids in pre-order.
pub fn leaf_ids(forest: &[PaneNode]) -> Vec<PaneId> {
    let mut ids = Vec::new();
    for root in forest {
        root.collect_leaf_ids(&mut ids);
    }
    ids
}

/// Check the shape invariants of a whole forest.
pub fn validate_forest(forest: &[PaneNode]) -> Result<(), InvariantViolation> {
    let mut panes = HashSet::new();
    let mut tabs = HashSet::new();
    forest
        .iter()
        .try_for_each(|root| root.validate_into(&mut panes, &mut tabs))
}

// ---------------------------------------------------------------------------
// Edits
//
// Every edit clones the input and works on the clone, so the caller's forest
// is never observed mid-change. A target that does not resolve leaves the
// clone untouched; callers detect no-ops by comparing with the input.
// ---------------------------------------------------------------------------

fn edit_leaf<F>(forest: &[PaneNode], pane_id: &str, edit: F) -> Vec<PaneNode>
where
    F: FnOnce(&mut Vec<Tab>, &mut TabId),
{
    let mut next = forest.to_vec();
    if let Some(PaneNode::Leaf {
        tabs,
        active_tab_id,
        ..
    }) = find_pane_mut(&mut next, pane_id)
    {
        edit(tabs, active_tab_id);
    }
    next
}

/// Append a tab for `path` to a leaf and make it active.
pub fn add_tab(
    forest: &[PaneNode],
    pane_id: &str,
    path: &str,
    ids: &mut dyn IdGenerator,
) -> Vec<PaneNode> {
    edit_leaf(forest, pane_id, |tabs, active| {
        let tab = Tab::new(ids.next_tab_id(), path);
        *active = tab.id.clone();
        tabs.push(tab);
    })
}

/// Remove a tab. The last tab of a leaf is never removed.
pub fn close_tab(forest: &[PaneNode], pane_id: &str, tab_id: &str) -> Vec<PaneNode> {
    edit_leaf(forest, pane_id, |tabs, active| {
        if tabs.len() <= 1 {
            return;
        }
        let Some(index) = tabs.iter().position(|t| t.id == tab_id) else {
            return;
        };
        tabs.remove(index);
        if active.as_str() == tab_id {
            // Same position if possible, otherwise the new last tab
            let next = index.min(tabs.len() - 1);
            *active = tabs[next].id.clone();
        }
    })
}

pub fn activate_tab(forest: &[PaneNode], pane_id: &str, tab_id: &str) -> Vec<PaneNode> {
    edit_leaf(forest, pane_id, |tabs, active| {
        if tabs.iter().any(|t| t.id == tab_id) {
            *active = tab_id.to_string();
        }
    })
}

/// Point an existing tab at another directory. The tab keeps its id.
pub fn navigate_tab(
    forest: &[PaneNode],
    pane_id: &str,
    tab_id: &str,
    path: &str,
) -> Vec<PaneNode> {
    edit_leaf(forest, pane_id, |tabs, _| {
        if let Some(tab) = tabs.iter_mut().find(|t| t.id == tab_id) {
            *tab = tab.navigated(path);
        }
    })
}

/// Split a leaf in two.
///
/// The leaf's slot becomes a container that keeps the original id. Its first
/// child is a fresh leaf carrying the original tabs; the second is a fresh leaf
/// with one tab at `default_path`. Both children start with weight 1.
pub fn split_pane(
    forest: &[PaneNode],
    pane_id: &str,
    orientation: Orientation,
    default_path: &str,
    ids: &mut dyn IdGenerator,
) -> Vec<PaneNode> {
    let mut next = forest.to_vec();
    let Some(node) = find_pane_mut(&mut next, pane_id) else {
        return next;
    };
    let PaneNode::Leaf {
        id,
        tabs,
        active_tab_id,
    } = node
    else {
        return next;
    };

    let slot_id = std::mem::take(id);
    let original = PaneNode::Leaf {
        id: ids.next_pane_id(),
        tabs: std::mem::take(tabs),
        active_tab_id: std::mem::take(active_tab_id),
    };
    let fresh = PaneNode::leaf(ids.next_pane_id(), Tab::new(ids.next_tab_id(), default_path));

    *node = PaneNode::Container {
        id: slot_id,
        orientation,
        children: vec![original, fresh],
        sizes: vec![1.0, 1.0],
    };
    next
}

/// Close a pane.
///
/// Returns the new forest and, when something was removed, the first leaf of
/// the result (for focusing). The only root of a forest cannot be closed.
/// A parent left with one child collapses into it: the slot keeps the
/// parent's id and takes the survivor's weight.
pub fn close_pane(forest: &[PaneNode], pane_id: &str) -> (Vec<PaneNode>, Option<PaneId>) {
    let mut next = forest.to_vec();

    if let Some(index) = next.iter().position(|root| root.id() == pane_id) {
        if next.len() == 1 {
            return (next, None);
        }
        next.remove(index);
    } else {
        let Some(parent_id) = find_parent(&next, pane_id).map(|p| p.id().to_string()) else {
            return (next, None);
        };
        let removal = match find_pane_mut(&mut next, &parent_id) {
            Some(parent) => parent.remove_child(pane_id),
            None => Removal::Missing,
        };
        match removal {
            Removal::Missing => return (next, None),
            Removal::Removed => {}
            Removal::Collapsed { weight } => set_slot_weight(&mut next, &parent_id, weight),
        }
    }

    let focus = find_first_leaf(&next).map(|leaf| leaf.id().to_string());
    (next, focus)
}

/// Set the proportional weight of a pane within its parent container.
pub fn resize_pane(forest: &[PaneNode], pane_id: &str, weight: f64) -> Vec<PaneNode> {
    let mut next = forest.to_vec();
    if weight.is_finite() && weight > 0.0 {
        set_slot_weight(&mut next, pane_id, weight);
    }
    next
}

fn set_slot_weight(forest: &mut [PaneNode], pane_id: &str, weight: f64) {
    if let Some(PaneNode::Container {
        children, sizes, ..
    }) = forest.iter_mut().find_map(|root| root.parent_of_mut(pane_id))
    {
        if let Some(index) = children.iter().position(|c| c.id() == pane_id) {
            if let Some(size) = sizes.get_mut(index) {
                *size = weight;
            }
        }
    }
}
