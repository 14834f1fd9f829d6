use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::common::collections::{HashMap, HashSet};

/// Rendered in place of a window whose app name the query did not include.
pub const FALLBACK_GLYPH: &str = "?";

/// Built-in app-name-to-label table. Keys are lowercase; lookups are
/// case-insensitive. User config entries shadow these.
static DEFAULT_ICONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("slack", "Slack"),
        ("spotify", "Spotify"),
        ("code", "VSCode"),
        ("terminal", "Terminal"),
        ("alacritty", "Alacritty"),
        ("vivaldi", "Vivaldi"),
        ("notion", "Notion"),
        ("tableplus", "TablePlus"),
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub poll: PollSettings,
    pub grid: GridSettings,
    pub yabai: YabaiSettings,
    pub note: NoteSettings,
    icons: HashMap<String, String>,
    detail_apps: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    /// Tick period for the focus probe, in milliseconds.
    pub period_ms: u64,
    /// Per-tick probability that a full space refresh runs. Deliberately
    /// probabilistic instead of a second fixed interval; expected refresh
    /// spacing is `period_ms / sample_rate`.
    pub sample_rate: f64,
}

impl Default for PollSettings {
    fn default() -> Self { PollSettings { period_ms: 100, sample_rate: 0.06 } }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub columns: usize,
}

impl Default for GridSettings {
    fn default() -> Self { GridSettings { columns: 4 } }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct YabaiSettings {
    pub program: PathBuf,
}

impl Default for YabaiSettings {
    fn default() -> Self { YabaiSettings { program: PathBuf::from("/opt/homebrew/bin/yabai") } }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NoteSettings {
    path: Option<PathBuf>,
}

impl NoteSettings {
    pub fn file(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join("desktop/note.text")
        })
    }
}

pub fn config_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("spacegrid/config.toml")
}

impl Config {
    /// Reads the config from `path`. A missing file is not an error; it just
    /// means defaults.
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Config::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("could not read {}", path.display()));
            }
        };
        let mut config: Config =
            toml::from_str(&raw).with_context(|| format!("could not parse {}", path.display()))?;
        config.normalize();
        Ok(config)
    }

    pub fn normalize(&mut self) {
        self.poll.sample_rate = self.poll.sample_rate.clamp(0.0, 1.0);
        self.poll.period_ms = self.poll.period_ms.max(10);
        self.grid.columns = self.grid.columns.max(1);
    }

    /// Lowercased app-name-to-label table, user entries over the defaults.
    pub fn icon_map(&self) -> HashMap<String, String> {
        let mut map: HashMap<String, String> = DEFAULT_ICONS
            .iter()
            .map(|(app, label)| (app.to_string(), label.to_string()))
            .collect();
        for (app, label) in &self.icons {
            map.insert(app.to_lowercase(), label.clone());
        }
        map
    }

    /// Apps whose window title is appended to the label.
    pub fn detail_apps(&self) -> HashSet<String> {
        match &self.detail_apps {
            Some(apps) => apps.iter().map(|app| app.to_lowercase()).collect(),
            None => ["code", "vivaldi"].into_iter().map(str::to_string).collect(),
        }
    }
}
