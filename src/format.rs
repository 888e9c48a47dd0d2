use chrono::{DateTime, NaiveDateTime};

use crate::gateway::FileEntry;
use crate::layout::{Orientation, PaneNode};

const FOLDER_ICON: &str = "📁";
const FILE_ICON: &str = "📄";

/// Human readable size in 1024-based units, up to two decimals.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let units = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < units.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rendered = format!("{:.2}", value);
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, units[unit])
}

/// Render a timestamp as `YYYY-MM-DD`. Unparseable input is returned as is.
pub fn format_date(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return dt.format("%Y-%m-%d").to_string();
    }
    raw.to_string()
}

/// Lowercased extension, or empty when the name has none.
pub fn extension(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

pub fn icon_for(name: &str, is_dir: bool) -> &'static str {
    if is_dir {
        return FOLDER_ICON;
    }
    match extension(name).as_str() {
        // Documents
        "txt" => "📄",
        "md" => "📝",
        "pdf" => "📕",
        "doc" | "docx" => "📘",
        // Images
        "jpg" | "jpeg" | "png" | "gif" | "svg" => "🖼️",
        // Code
        "js" | "ts" | "rs" => "📜",
        "html" => "🌐",
        "css" => "🎨",
        "json" | "xml" | "toml" => "📋",
        // Archives
        "zip" | "rar" | "tar" | "gz" => "📦",
        // Audio/Video
        "mp3" | "wav" => "🎵",
        "mp4" | "avi" | "mov" => "🎬",
        _ => FILE_ICON,
    }
}

/// One display row per entry: icon, name, size, date.
pub fn entry_row(entry: &FileEntry) -> String {
    let size = if entry.is_dir {
        "-".to_string()
    } else {
        format_size(entry.size)
    };
    format!(
        "{} {:<40} {:>10}  {}",
        icon_for(&entry.name, entry.is_dir),
        entry.name,
        size,
        format_date(&entry.modified)
    )
}

/// Indented outline of a forest. The active leaf is marked with `*` and each
/// leaf's active tab with `>`.
pub fn tree_outline(forest: &[PaneNode], active_pane_id: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for root in forest {
        outline_node(root, active_pane_id, 0, None, &mut lines);
    }
    lines
}

fn outline_node(
    node: &PaneNode,
    active_pane_id: &str,
    depth: usize,
    weight: Option<f64>,
    lines: &mut Vec<String>,
) {
    let indent = "  ".repeat(depth);
    let weight = weight.map(|w| format!(" ({})", w)).unwrap_or_default();
    match node {
        PaneNode::Leaf {
            id,
            tabs,
            active_tab_id,
        } => {
            let marker = if id == active_pane_id { "*" } else { " " };
            lines.push(format!("{}{}leaf {}{}", indent, marker, id, weight));
            for tab in tabs {
                let pointer = if tab.id == *active_tab_id { ">" } else { " " };
                lines.push(format!(
                    "{}  {} {} [{}] {}",
                    indent, pointer, tab.name, tab.id, tab.path
                ));
            }
        }
        PaneNode::Container {
            id,
            orientation,
            children,
            sizes,
        } => {
            let kind = match orientation {
                Orientation::Horizontal => "horizontal",
                Orientation::Vertical => "vertical",
            };
            lines.push(format!("{} {} {}{}", indent, kind, id, weight));
            for (i, child) in children.iter().enumerate() {
                outline_node(child, active_pane_id, depth + 1, sizes.get(i).copied(), lines);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tab::Tab;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1_048_576), "1 MB");
        assert_eq!(format_size(1_288_490_189), "1.2 GB");
    }

    #[test]
    fn test_format_size_caps_at_terabytes() {
        assert_eq!(format_size(2048 * 1024u64.pow(4)), "2048 TB");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-03-05T10:20:30+00:00"), "2024-03-05");
        assert_eq!(format_date("2024-03-05 10:20:30"), "2024-03-05");
        assert_eq!(format_date("SystemTime { tv_sec: 1 }"), "SystemTime { tv_sec: 1 }");
    }

    #[test]
    fn test_icon_for() {
        assert_eq!(icon_for("photos", true), FOLDER_ICON);
        assert_eq!(icon_for("README.MD", false), "📝");
        assert_eq!(icon_for("archive.tar.gz", false), "📦");
        assert_eq!(icon_for("Makefile", false), FILE_ICON);
        assert_eq!(icon_for("weird.xyz", false), FILE_ICON);
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("a.TXT"), "txt");
        assert_eq!(extension("noext"), "");
    }

    #[test]
    fn test_tree_outline_marks_active() {
        let forest = vec![PaneNode::Container {
            id: "root".to_string(),
            orientation: Orientation::Vertical,
            children: vec![
                PaneNode::leaf("a".to_string(), Tab::new("t1".to_string(), "/usr")),
                PaneNode::leaf("b".to_string(), Tab::new("t2".to_string(), "/tmp")),
            ],
            sizes: vec![1.0, 2.0],
        }];
        let lines = tree_outline(&forest, "b");
        assert_eq!(lines[0], " vertical root");
        assert_eq!(lines[1], "   leaf a (1)");
        assert_eq!(lines[3], "  *leaf b (2)");
        assert!(lines[4].contains("> tmp [t2] /tmp"));
    }
}
