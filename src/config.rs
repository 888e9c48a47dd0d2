use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme: {}", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Behavior
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Behavior {
    /// Directory of the initial tab and of tabs created by a split.
    pub home: String,
    pub sidebar_collapsed: bool,
    pub theme: Theme,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            home: dirs::home_dir()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_else(|| "/".to_string()),
            sidebar_collapsed: false,
            theme: Theme::Light,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Write to a daily log file instead of stderr.
    pub log_file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            log_file: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Raw (on-disk) config
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    behavior: Option<RawBehavior>,
    logging: Option<RawLogging>,
}

#[derive(Debug, Default, Deserialize)]
struct RawBehavior {
    home: Option<String>,
    sidebar_collapsed: Option<bool>,
    theme: Option<Theme>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLogging {
    level: Option<String>,
    log_file: Option<bool>,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct Config {
    pub behavior: Behavior,
    pub logging: LoggingConfig,
}

impl Config {
    /// `$PANEFM_CONFIG_DIR` if set, otherwise `<config_dir>/panefm`.
    pub fn config_dir() -> PathBuf {
        if let Some(dir) = std::env::var_os("PANEFM_CONFIG_DIR") {
            return PathBuf::from(dir);
        }
        dirs::config_dir()
            .map(|d| d.join("panefm"))
            .unwrap_or_default()
    }

    pub fn load() -> Self {
        Self::load_from(&Self::config_dir().join("config.toml"))
    }

    /// Missing or invalid files fall back to defaults.
    pub fn load_from(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };

        match Self::parse(&content) {
            Ok(config) => config,
            Err(e) => {
                // Logging is not up yet; it is configured from this file.
                eprintln!("panefm: invalid config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let raw: RawConfig = toml::from_str(content)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawConfig) -> Self {
        let mut config = Self::default();

        if let Some(b) = raw.behavior {
            if let Some(v) = b.home {
                config.behavior.home = v;
            }
            if let Some(v) = b.sidebar_collapsed {
                config.behavior.sidebar_collapsed = v;
            }
            if let Some(v) = b.theme {
                config.behavior.theme = v;
            }
        }

        if let Some(l) = raw.logging {
            if let Some(v) = l.level {
                config.logging.level = v;
            }
            if let Some(v) = l.log_file {
                config.logging.log_file = v;
            }
        }

        config
    }
}
