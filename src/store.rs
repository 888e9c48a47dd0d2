use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{Behavior, Theme};
use crate::error::GatewayError;
use crate::gateway::DirectoryListing;
use crate::ids::IdGenerator;
use crate::layout::{self, Orientation, PaneId, PaneNode};
use crate::tab::{Tab, TabId};

pub const ROOT_PANE_ID: &str = "root";
pub const DEFAULT_TAB_ID: &str = "default";

/// One complete, consistent snapshot of the shell.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AppState {
    pub panes: Vec<PaneNode>,
    pub active_pane_id: PaneId,
    /// Path of the active tab of the active pane.
    pub current_directory: String,
    pub sidebar_collapsed: bool,
    pub theme: Theme,
    /// Last accepted listing for the active tab.
    pub listing: Option<DirectoryListing>,
    /// Last gateway failure, until dismissed or superseded.
    pub notification: Option<String>,
}

impl AppState {
    /// A single root pane with one `Home` tab.
    pub fn initial(behavior: &Behavior) -> Self {
        let tab = Tab::with_name(DEFAULT_TAB_ID.to_string(), behavior.home.clone(), "Home");
        Self {
            panes: vec![PaneNode::leaf(ROOT_PANE_ID.to_string(), tab)],
            active_pane_id: ROOT_PANE_ID.to_string(),
            current_directory: behavior.home.clone(),
            sidebar_collapsed: behavior.sidebar_collapsed,
            theme: behavior.theme,
            listing: None,
            notification: None,
        }
    }

    pub fn active_pane(&self) -> Option<&PaneNode> {
        layout::find_pane(&self.panes, &self.active_pane_id)
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.active_pane().and_then(|p| p.active_tab())
    }

    fn active_key(&self) -> Option<(&str, &str)> {
        self.active_tab().map(|t| (t.id.as_str(), t.path.as_str()))
    }
}

/// A directory listing to run for a tab, tagged at dispatch time so a late
/// response can be recognised as stale. `seq` increases with every dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingRequest {
    pub seq: u64,
    pub tab_id: TabId,
    pub path: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Listener = Box<dyn FnMut(&AppState)>;

/// Owner of the application state.
///
/// Commands run the pure pane algebra against the current snapshot, commit
/// the result as a new snapshot and notify subscribers in subscription order.
/// A command that changes nothing commits nothing and notifies nobody.
pub struct AppStore {
    state: Arc<AppState>,
    home: String,
    ids: Box<dyn IdGenerator>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    last_dispatched: Option<ListingRequest>,
    next_listing_seq: u64,
}

impl AppStore {
    pub fn new(behavior: &Behavior, ids: Box<dyn IdGenerator>) -> Self {
        Self {
            state: Arc::new(AppState::initial(behavior)),
            home: behavior.home.clone(),
            ids,
            listeners: Vec::new(),
            next_subscription: 0,
            last_dispatched: None,
            next_listing_seq: 0,
        }
    }

    pub fn snapshot(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    pub fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    // --- Pane commands ---

    /// Split the active pane and focus the new (second) pane.
    pub fn split_active_pane(&mut self, orientation: Orientation) -> bool {
        let target = self.state.active_pane_id.clone();
        let forest = layout::split_pane(
            &self.state.panes,
            &target,
            orientation,
            &self.home,
            self.ids.as_mut(),
        );
        let focus = match layout::find_pane(&forest, &target) {
            Some(PaneNode::Container { children, .. }) => {
                children.last().map(|c| c.id().to_string())
            }
            _ => None,
        };
        self.commit_forest("split_active_pane", forest, focus)
    }

    pub fn close_active_pane(&mut self) -> bool {
        let target = self.state.active_pane_id.clone();
        self.close_pane(&target)
    }

    /// Close any pane. If the active pane was the survivor of a collapse,
    /// focus follows it into the collapsed slot. Otherwise focus moves to the
    /// first leaf only when the active pane did not survive the edit.
    pub fn close_pane(&mut self, pane_id: &str) -> bool {
        let active = self.state.active_pane_id.clone();
        let collapsed_slot = match layout::find_parent(&self.state.panes, pane_id) {
            Some(PaneNode::Container { id, children, .. })
                if pane_id != active
                    && children.len() == 2
                    && children.iter().any(|c| c.id() == active) =>
            {
                Some(id.clone())
            }
            _ => None,
        };

        let (forest, focus) = layout::close_pane(&self.state.panes, pane_id);
        let active_survives =
            layout::find_pane(&forest, &active).is_some_and(|p| p.is_leaf());
        let focus = if active_survives {
            None
        } else {
            collapsed_slot.or(focus)
        };
        self.commit_forest("close_pane", forest, focus)
    }

    pub fn focus_pane(&mut self, pane_id: &str) -> bool {
        match layout::find_pane(&self.state.panes, pane_id) {
            Some(pane) if pane.is_leaf() => {
                let mut next = (*self.state).clone();
                next.active_pane_id = pane_id.to_string();
                self.commit("focus_pane", next)
            }
            _ => {
                debug!(pane = pane_id, "focus target is not a leaf");
                false
            }
        }
    }

    pub fn resize_pane(&mut self, pane_id: &str, weight: f64) -> bool {
        let forest = layout::resize_pane(&self.state.panes, pane_id, weight);
        self.commit_forest("resize_pane", forest, None)
    }

    // --- Tab commands ---

    /// Open `path` in a new tab of the active pane.
    pub fn open_tab(&mut self, path: &str) -> bool {
        let forest = layout::add_tab(
            &self.state.panes,
            &self.state.active_pane_id,
            path,
            self.ids.as_mut(),
        );
        self.commit_forest("open_tab", forest, None)
    }

    pub fn close_tab(&mut self, pane_id: &str, tab_id: &str) -> bool {
        let forest = layout::close_tab(&self.state.panes, pane_id, tab_id);
        self.commit_forest("close_tab", forest, None)
    }

    pub fn close_active_tab(&mut self) -> bool {
        let pane_id = self.state.active_pane_id.clone();
        match self.state.active_tab().map(|t| t.id.clone()) {
            Some(tab_id) => self.close_tab(&pane_id, &tab_id),
            None => false,
        }
    }

    pub fn activate_tab(&mut self, pane_id: &str, tab_id: &str) -> bool {
        let forest = layout::activate_tab(&self.state.panes, pane_id, tab_id);
        self.commit_forest("activate_tab", forest, None)
    }

    /// Point the active tab of the active pane at `path`.
    pub fn navigate(&mut self, path: &str) -> bool {
        let pane_id = self.state.active_pane_id.clone();
        let Some(tab_id) = self.state.active_tab().map(|t| t.id.clone()) else {
            return false;
        };
        let forest = layout::navigate_tab(&self.state.panes, &pane_id, &tab_id, path);
        self.commit_forest("navigate", forest, None)
    }

    // --- Chrome ---

    pub fn toggle_sidebar(&mut self) -> bool {
        let mut next = (*self.state).clone();
        next.sidebar_collapsed = !next.sidebar_collapsed;
        self.commit("toggle_sidebar", next)
    }

    pub fn set_theme(&mut self, theme: Theme) -> bool {
        let mut next = (*self.state).clone();
        next.theme = theme;
        self.commit("set_theme", next)
    }

    pub fn dismiss_notification(&mut self) -> bool {
        let mut next = (*self.state).clone();
        next.notification = None;
        self.commit("dismiss_notification", next)
    }

    /// Surface a failed gateway call. The pane tree is left alone.
    pub fn report_error(&mut self, error: &GatewayError) -> bool {
        warn!(error = %error, "gateway call failed");
        let mut next = (*self.state).clone();
        next.notification = Some(error.to_string());
        self.commit("report_error", next)
    }

    // --- Listings ---

    /// A tagged request for the active tab's directory, if it has not been
    /// requested since it last changed.
    pub fn dispatch_listing(&mut self) -> Option<ListingRequest> {
        let (tab_id, path) = self.state.active_key()?;
        if let Some(last) = &self.last_dispatched {
            if last.tab_id == tab_id && last.path == path {
                return None;
            }
        }
        self.next_listing_seq += 1;
        let request = ListingRequest {
            seq: self.next_listing_seq,
            tab_id: tab_id.to_string(),
            path: path.to_string(),
        };
        debug!(seq = request.seq, tab = %request.tab_id, path = %request.path, "dispatching listing");
        self.last_dispatched = Some(request.clone());
        Some(request)
    }

    /// Request the active directory again, e.g. after a file operation. Any
    /// listing still in flight becomes stale.
    pub fn refresh_listing(&mut self) -> Option<ListingRequest> {
        self.last_dispatched = None;
        self.dispatch_listing()
    }

    /// Apply a completed listing. Only the latest dispatched request is
    /// accepted, and only while its tab and path are still active.
    pub fn apply_listing(
        &mut self,
        request: &ListingRequest,
        result: Result<DirectoryListing, GatewayError>,
    ) -> bool {
        let latest = self.last_dispatched.as_ref() == Some(request);
        if !latest
            || self.state.active_key() != Some((request.tab_id.as_str(), request.path.as_str()))
        {
            debug!(seq = request.seq, tab = %request.tab_id, path = %request.path, "dropping stale listing");
            return false;
        }
        let mut next = (*self.state).clone();
        match result {
            Ok(listing) => {
                next.listing = Some(listing);
                next.notification = None;
            }
            Err(e) => {
                warn!(path = %request.path, error = %e, "listing failed");
                next.notification = Some(e.to_string());
            }
        }
        self.commit("apply_listing", next)
    }

    // --- Commit ---

    fn commit_forest(
        &mut self,
        command: &str,
        forest: Vec<PaneNode>,
        focus: Option<PaneId>,
    ) -> bool {
        if forest == self.state.panes {
            debug!(command, "no-op");
            return false;
        }
        let mut next = (*self.state).clone();
        next.panes = forest;
        if let Some(focus) = focus {
            next.active_pane_id = focus;
        }
        self.commit(command, next)
    }

    fn commit(&mut self, command: &str, mut next: AppState) -> bool {
        self.reanchor(&mut next);
        if next == *self.state {
            debug!(command, "no-op");
            return false;
        }
        debug_assert!(
            layout::validate_forest(&next.panes).is_ok(),
            "{} broke the pane tree",
            command
        );

        self.state = Arc::new(next);
        info!(
            command,
            active_pane = %self.state.active_pane_id,
            directory = %self.state.current_directory,
            "state committed"
        );
        self.notify();
        true
    }

    /// Keep the active pane a live leaf and derive the fields that follow it.
    fn reanchor(&self, next: &mut AppState) {
        let active_is_leaf = layout::find_pane(&next.panes, &next.active_pane_id)
            .is_some_and(|p| p.is_leaf());
        if !active_is_leaf {
            let fallback = layout::find_pane(&next.panes, &self.state.active_pane_id)
                .filter(|p| p.is_leaf())
                .or_else(|| layout::find_first_leaf(&next.panes));
            if let Some(leaf) = fallback {
                next.active_pane_id = leaf.id().to_string();
            }
        }

        if next.active_key() != self.state.active_key() {
            next.listing = None;
        }
        if let Some(tab) = next.active_tab() {
            next.current_directory = tab.path.clone();
        }
    }

    fn notify(&mut self) {
        let state = Arc::clone(&self.state);
        for (_, listener) in self.listeners.iter_mut() {
            listener(&state);
        }
    }
}
