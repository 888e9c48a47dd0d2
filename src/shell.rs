use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info};

use crate::command::{self, Command, HELP};
use crate::config::Config;
use crate::error::GatewayError;
use crate::format;
use crate::gateway::{DirectoryListing, FileSystemGateway, LocalFs};
use crate::ids::UuidIds;
use crate::store::{AppState, AppStore, ListingRequest};

/// Everything the shell loop reacts to, in arrival order.
#[derive(Debug)]
pub enum ShellEvent {
    Input(String),
    InputClosed,
    Listing {
        request: ListingRequest,
        result: Result<DirectoryListing, GatewayError>,
    },
    FileOp {
        label: String,
        result: Result<(), GatewayError>,
    },
}

/// Single writer for the store: every event is applied to completion before
/// the next one is taken. Gateway calls run on blocking workers and come back
/// as events.
pub struct Shell {
    pub store: AppStore,
    gateway: Arc<dyn FileSystemGateway>,
    events: UnboundedSender<ShellEvent>,
    pub should_quit: bool,
}

pub async fn run(config: Config) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ShellEvent>();

    let mut store = AppStore::new(&config.behavior, Box::new(UuidIds));
    store.subscribe(Box::new(|state: &AppState| println!("{}", status_line(state))));
    let mut shell = Shell::new(store, Arc::new(LocalFs), event_tx.clone());

    // Stdin reader
    let input_tx = event_tx;
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if input_tx.send(ShellEvent::Input(line)).is_err() {
                        break;
                    }
                }
                Ok(None) | Err(_) => {
                    let _ = input_tx.send(ShellEvent::InputClosed);
                    break;
                }
            }
        }
    });

    println!("{}", status_line(&shell.store.snapshot()));
    shell.dispatch_listing();

    while let Some(event) = event_rx.recv().await {
        for line in shell.handle_event(event) {
            println!("{}", line);
        }
        if shell.should_quit {
            break;
        }
    }

    info!("shell exited");
    Ok(())
}

/// One-line summary printed after every committed state change.
pub fn status_line(state: &AppState) -> String {
    let mut line = format!("[{}] {}", state.active_pane_id, state.current_directory);
    if let Some(listing) = &state.listing {
        line.push_str(&format!(" ({} entries)", listing.entries.len()));
    }
    if let Some(message) = &state.notification {
        line.push_str(&format!(" ! {}", message));
    }
    line
}

impl Shell {
    pub fn new(
        store: AppStore,
        gateway: Arc<dyn FileSystemGateway>,
        events: UnboundedSender<ShellEvent>,
    ) -> Self {
        Self {
            store,
            gateway,
            events,
            should_quit: false,
        }
    }

    /// Apply one event and return the lines to print.
    pub fn handle_event(&mut self, event: ShellEvent) -> Vec<String> {
        let output = match event {
            ShellEvent::Input(line) => {
                if line.trim().is_empty() {
                    Vec::new()
                } else {
                    match command::parse(&line) {
                        Ok(cmd) => self.execute(cmd),
                        Err(e) => vec![format!("error: {}", e)],
                    }
                }
            }
            ShellEvent::InputClosed => {
                self.should_quit = true;
                Vec::new()
            }
            ShellEvent::Listing { request, result } => {
                self.store.apply_listing(&request, result);
                Vec::new()
            }
            ShellEvent::FileOp { label, result } => match result {
                Ok(()) => {
                    if let Some(request) = self.store.refresh_listing() {
                        self.spawn_listing(request);
                    }
                    vec![format!("{}: done", label)]
                }
                Err(e) => {
                    self.store.report_error(&e);
                    vec![format!("{}: {}", label, e)]
                }
            },
        };
        self.dispatch_listing();
        output
    }

    /// Start a listing if the active tab's directory changed.
    pub fn dispatch_listing(&mut self) {
        if let Some(request) = self.store.dispatch_listing() {
            self.spawn_listing(request);
        }
    }

    fn execute(&mut self, cmd: Command) -> Vec<String> {
        let state = self.store.snapshot();
        let resolve = |name: &str| command::resolve_path(&state.current_directory, name);

        match cmd {
            Command::Split(orientation) => changed(self.store.split_active_pane(orientation)),
            Command::Close(target) => changed(match target {
                Some(pane_id) => self.store.close_pane(&pane_id),
                None => self.store.close_active_pane(),
            }),
            Command::OpenTab(path) => {
                changed(self.store.open_tab(&resolve(&path).to_string_lossy()))
            }
            Command::CloseTab(target) => changed(match target {
                Some(tab_id) => self.store.close_tab(&state.active_pane_id, &tab_id),
                None => self.store.close_active_tab(),
            }),
            Command::ActivateTab(tab_id) => {
                changed(self.store.activate_tab(&state.active_pane_id, &tab_id))
            }
            Command::Focus(pane_id) => changed(self.store.focus_pane(&pane_id)),
            Command::Cd(path) => changed(self.store.navigate(&resolve(&path).to_string_lossy())),
            Command::Resize { pane, weight } => changed(self.store.resize_pane(&pane, weight)),
            Command::Sidebar => changed(self.store.toggle_sidebar()),
            Command::Theme(theme) => changed(self.store.set_theme(theme)),
            Command::Dismiss => changed(self.store.dismiss_notification()),
            Command::Mkdir(name) => {
                let path = resolve(&name);
                self.spawn_file_op(format!("mkdir {}", name), move |gw| {
                    gw.create_directory(&path)
                });
                Vec::new()
            }
            Command::Rm(name) => {
                let path = resolve(&name);
                self.spawn_file_op(format!("rm {}", name), move |gw| gw.delete(&path));
                Vec::new()
            }
            Command::Cp { source, dest } => {
                let (from, to) = (resolve(&source), resolve(&dest));
                self.spawn_file_op(format!("cp {} {}", source, dest), move |gw| {
                    gw.copy(&from, &to)
                });
                Vec::new()
            }
            Command::Mv { source, dest } => {
                let (from, to) = (resolve(&source), resolve(&dest));
                self.spawn_file_op(format!("mv {} {}", source, dest), move |gw| {
                    gw.move_entry(&from, &to)
                });
                Vec::new()
            }
            Command::Rename { name, new_name } => {
                let path = resolve(&name);
                let label = format!("rename {} {}", name, new_name);
                self.spawn_file_op(label, move |gw| gw.rename(&path, &new_name));
                Vec::new()
            }
            Command::Tree => format::tree_outline(&state.panes, &state.active_pane_id),
            Command::Dump => match serde_json::to_string_pretty(&*state) {
                Ok(json) => vec![json],
                Err(e) => vec![format!("error: {}", e)],
            },
            Command::Ls => listing_lines(&state),
            Command::Help => HELP.lines().map(str::to_string).collect(),
            Command::Quit => {
                self.should_quit = true;
                Vec::new()
            }
        }
    }

    fn spawn_listing(&self, request: ListingRequest) {
        let gateway = Arc::clone(&self.gateway);
        let events = self.events.clone();
        tokio::task::spawn_blocking(move || {
            let result = gateway.list(Path::new(&request.path));
            let _ = events.send(ShellEvent::Listing { request, result });
        });
    }

    fn spawn_file_op<F>(&self, label: String, op: F)
    where
        F: FnOnce(&dyn FileSystemGateway) -> Result<(), GatewayError> + Send + 'static,
    {
        debug!(op = %label, "starting file operation");
        let gateway = Arc::clone(&self.gateway);
        let events = self.events.clone();
        tokio::task::spawn_blocking(move || {
            let result = op(gateway.as_ref());
            let _ = events.send(ShellEvent::FileOp { label, result });
        });
    }
}

fn changed(committed: bool) -> Vec<String> {
    if committed {
        Vec::new()
    } else {
        vec!["nothing to do".to_string()]
    }
}

fn listing_lines(state: &AppState) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(message) = &state.notification {
        lines.push(format!("! {}", message));
    }
    match &state.listing {
        Some(listing) if listing.entries.is_empty() => lines.push("(empty)".to_string()),
        Some(listing) => lines.extend(listing.entries.iter().map(format::entry_row)),
        None => lines.push("(loading)".to_string()),
    }
    lines
}

/// Used by `panefm ls`.
pub fn list_once(gateway: &dyn FileSystemGateway, path: PathBuf) -> Result<Vec<String>> {
    let listing = gateway.list(&path)?;
    Ok(listing.entries.iter().map(format::entry_row).collect())
}
