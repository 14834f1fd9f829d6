//! Pure presentation: widget state in, text frame out.

use std::hash::{Hash, Hasher};

use crate::common::collections::{HashMap, HashSet};
use crate::common::config::{Config, FALLBACK_GLYPH};
use crate::model::{Space, SpaceId, WidgetState, WindowInfo};

/// Window titles longer than this are cut for the detail suffix.
const DETAIL_WIDTH: usize = 24;

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub lines: Vec<String>,
}

impl Frame {
    pub fn signature(&self) -> u64 {
        let mut hasher = rustc_hash::FxHasher::default();
        self.lines.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Debug, Clone)]
pub struct GridOptions {
    pub columns: usize,
    icons: HashMap<String, String>,
    detail_apps: HashSet<String>,
}

impl From<&Config> for GridOptions {
    fn from(config: &Config) -> GridOptions {
        GridOptions {
            columns: config.grid.columns,
            icons: config.icon_map(),
            detail_apps: config.detail_apps(),
        }
    }
}

/// Lays the spaces out as a fixed-width grid of cells, one line per row.
pub fn render(state: &WidgetState, options: &GridOptions) -> Frame {
    let cells: Vec<String> = state
        .spaces
        .iter()
        .map(|space| space_cell(space, state.focused_space, options))
        .collect();
    let width = cells.iter().map(|cell| cell.chars().count()).max().unwrap_or(0);

    let lines = cells
        .chunks(options.columns.max(1))
        .map(|row| {
            row.iter()
                .map(|cell| pad(cell, width))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        })
        .collect();
    Frame { lines }
}

fn space_cell(space: &Space, focused: Option<SpaceId>, options: &GridOptions) -> String {
    let marker = if focused == Some(space.id) { "*" } else { " " };
    let labels: Vec<String> =
        visible_windows(space).map(|info| window_label(info, options)).collect();
    format!("[{}{}] {}", space.index, marker, labels.join(" ")).trim_end().to_string()
}

/// Windows that make it onto the grid: resolved and neither hidden nor
/// minimized. Unresolved and failed slots carry no flags and are dropped.
fn visible_windows(space: &Space) -> impl Iterator<Item = &WindowInfo> {
    space
        .windows
        .iter()
        .filter_map(|slot| slot.as_resolved())
        .filter(|info| !info.is_hidden && !info.is_minimized)
}

/// Label for one window: icon lookup by lowercased app name, the literal app
/// name when unmapped, a placeholder when the app field is absent. Apps on
/// the detail list get the window title appended.
pub fn window_label(info: &WindowInfo, options: &GridOptions) -> String {
    let Some(app) = info.app.as_deref() else {
        return FALLBACK_GLYPH.to_string();
    };
    let key = app.to_lowercase();
    let mut label = options.icons.get(&key).cloned().unwrap_or_else(|| app.to_string());
    if options.detail_apps.contains(&key) && !info.title.is_empty() {
        label.push(':');
        label.push_str(&truncate(&info.title, DETAIL_WIDTH));
    }
    label
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

fn pad(cell: &str, width: usize) -> String {
    let mut padded = cell.to_string();
    padded.extend(std::iter::repeat_n(' ', width.saturating_sub(cell.chars().count())));
    padded
}
