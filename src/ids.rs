use crate::layout::PaneId;
use crate::tab::TabId;

/// Source of fresh pane and tab ids.
///
/// The tree algebra never invents ids on its own; every edit that creates a
/// node or a tab draws from one of these so tests can assert exact structure.
pub trait IdGenerator {
    fn next_pane_id(&mut self) -> PaneId;
    fn next_tab_id(&mut self) -> TabId;
}

/// Random v4 UUID ids, used by the binary.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_pane_id(&mut self) -> PaneId {
        format!("pane-{}", uuid::Uuid::new_v4())
    }

    fn next_tab_id(&mut self) -> TabId {
        format!("tab-{}", uuid::Uuid::new_v4())
    }
}

/// Deterministic `pane-N` / `tab-N` ids. Counters are independent.
#[derive(Clone, Debug, Default)]
pub struct SequentialIds {
    next_pane: u32,
    next_tab: u32,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_pane_id(&mut self) -> PaneId {
        self.next_pane += 1;
        format!("pane-{}", self.next_pane)
    }

    fn next_tab_id(&mut self) -> TabId {
        self.next_tab += 1;
        format!("tab-{}", self.next_tab)
    }
}
