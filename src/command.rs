use std::path::{Component, Path, PathBuf};

use anyhow::{anyhow, bail, Result};

use crate::config::Theme;
use crate::layout::{Orientation, PaneId};
use crate::tab::TabId;

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Split(Orientation),
    /// Close a pane; the active one when no target is given.
    Close(Option<PaneId>),
    OpenTab(String),
    /// Close a tab of the active pane; the active tab when no target is given.
    CloseTab(Option<TabId>),
    ActivateTab(TabId),
    Focus(PaneId),
    Cd(String),
    Resize { pane: PaneId, weight: f64 },
    Sidebar,
    Theme(Theme),
    Mkdir(String),
    Rm(String),
    Cp { source: String, dest: String },
    Mv { source: String, dest: String },
    Rename { name: String, new_name: String },
    Tree,
    Dump,
    Ls,
    Dismiss,
    Help,
    Quit,
}

pub const HELP: &str = "\
split h|v            split the active pane
close [PANE]         close a pane (default: active)
tab PATH             open PATH in a new tab
close-tab [TAB]      close a tab of the active pane
activate TAB         switch the active pane to TAB
focus PANE           make PANE the active pane
cd PATH              navigate the active tab
resize PANE WEIGHT   set a pane's proportional weight
sidebar              toggle the sidebar
theme light|dark     switch theme
mkdir NAME | rm NAME | cp SRC DST | mv SRC DST | rename NAME NEW
ls | tree | dump | dismiss | help | quit";

/// Parse one shell line into a `Command`.
///
/// Examples:
/// - `split v`
/// - `tab "/home/me/My Documents"`
/// - `resize pane-2 2.5`
pub fn parse(input: &str) -> Result<Command> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        bail!("empty command");
    }

    let cmd_name = tokens[0].as_str();
    let args = &tokens[1..];

    match cmd_name {
        "split" | "sp" => parse_split(args),
        "close" => Ok(Command::Close(args.first().cloned())),
        "tab" | "new-tab" => Ok(Command::OpenTab(required(args, 0, "tab requires a path")?)),
        "close-tab" => Ok(Command::CloseTab(args.first().cloned())),
        "activate" => Ok(Command::ActivateTab(required(args, 0, "activate requires a tab id")?)),
        "focus" => Ok(Command::Focus(required(args, 0, "focus requires a pane id")?)),
        "cd" => Ok(Command::Cd(required(args, 0, "cd requires a path")?)),
        "resize" => parse_resize(args),
        "sidebar" => Ok(Command::Sidebar),
        "theme" => {
            let name = required(args, 0, "theme requires light or dark")?;
            Ok(Command::Theme(name.parse().map_err(|e: String| anyhow!(e))?))
        }
        "mkdir" => Ok(Command::Mkdir(required(args, 0, "mkdir requires a name")?)),
        "rm" => Ok(Command::Rm(required(args, 0, "rm requires a name")?)),
        "cp" => {
            let source = required(args, 0, "cp requires SRC DST")?;
            let dest = required(args, 1, "cp requires SRC DST")?;
            Ok(Command::Cp { source, dest })
        }
        "mv" => {
            let source = required(args, 0, "mv requires SRC DST")?;
            let dest = required(args, 1, "mv requires SRC DST")?;
            Ok(Command::Mv { source, dest })
        }
        "rename" => {
            let name = required(args, 0, "rename requires NAME NEW")?;
            let new_name = required(args, 1, "rename requires NAME NEW")?;
            Ok(Command::Rename { name, new_name })
        }
        "tree" => Ok(Command::Tree),
        "dump" => Ok(Command::Dump),
        "ls" => Ok(Command::Ls),
        "dismiss" => Ok(Command::Dismiss),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        _ => bail!("unknown command: {}", cmd_name),
    }
}

fn required(args: &[String], index: usize, message: &str) -> Result<String> {
    args.get(index).cloned().ok_or_else(|| anyhow!("{}", message))
}

fn parse_split(args: &[String]) -> Result<Command> {
    let orientation = match args.first().map(|s| s.as_str()) {
        Some("h") | Some("horizontal") | Some("-h") => Orientation::Horizontal,
        Some("v") | Some("vertical") | Some("-v") | None => Orientation::Vertical,
        Some(other) => bail!("invalid split orientation: {}", other),
    };
    Ok(Command::Split(orientation))
}

fn parse_resize(args: &[String]) -> Result<Command> {
    let pane = required(args, 0, "resize requires PANE WEIGHT")?;
    let raw = required(args, 1, "resize requires PANE WEIGHT")?;
    let weight: f64 = raw
        .parse()
        .map_err(|_| anyhow!("invalid weight: {}", raw))?;
    if !weight.is_finite() || weight <= 0.0 {
        bail!("weight must be positive: {}", raw);
    }
    Ok(Command::Resize { pane, weight })
}

/// Tokenize a command string, respecting quoted strings.
fn tokenize(input: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();
    let mut in_quote = false;
    let mut quote_char = '"';

    while let Some(ch) = chars.next() {
        if in_quote {
            if ch == quote_char {
                in_quote = false;
            } else if ch == '\\' && quote_char == '"' {
                if let Some(&next) = chars.peek() {
                    chars.next();
                    match next {
                        '\\' => current.push('\\'),
                        '"' => current.push('"'),
                        _ => {
                            current.push('\\');
                            current.push(next);
                        }
                    }
                }
            } else {
                current.push(ch);
            }
        } else if ch == '"' || ch == '\'' {
            in_quote = true;
            quote_char = ch;
        } else if ch.is_whitespace() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else {
            current.push(ch);
        }
    }

    if in_quote {
        bail!("unterminated quote in command: {}", input);
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    Ok(tokens)
}

/// Resolve `name` against `base` and fold `.` and `..` lexically.
pub fn resolve_path(base: &str, name: &str) -> PathBuf {
    let joined = Path::new(base).join(name);
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
