use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct SpaceId(u64);

impl SpaceId {
    pub fn new(id: u64) -> SpaceId { SpaceId(id) }

    pub fn get(&self) -> u64 { self.0 }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct WindowId(u32);

impl WindowId {
    pub fn new(id: u32) -> WindowId { WindowId(id) }

    pub fn get(&self) -> u32 { self.0 }
}

/// Window detail as reported by the window manager. Only the fields the
/// widget consumes are kept; everything else in the query output is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowInfo {
    pub id: WindowId,
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "is-hidden")]
    pub is_hidden: bool,
    #[serde(rename = "is-minimized")]
    pub is_minimized: bool,
}

/// Outcome of one window-detail lookup. A space's window list starts out as
/// bare identifiers and is upgraded slot by slot; consumers must tolerate a
/// mixed list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WindowSlot {
    Unresolved(WindowId),
    Resolved(WindowInfo),
    Failed(WindowId),
}

impl WindowSlot {
    pub fn window_id(&self) -> WindowId {
        match self {
            WindowSlot::Unresolved(id) | WindowSlot::Failed(id) => *id,
            WindowSlot::Resolved(info) => info.id,
        }
    }

    pub fn as_resolved(&self) -> Option<&WindowInfo> {
        match self {
            WindowSlot::Resolved(info) => Some(info),
            _ => None,
        }
    }
}

/// A space as it comes off the wire: windows are opaque identifiers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpaceInfo {
    pub id: SpaceId,
    pub index: u64,
    pub display: u32,
    #[serde(default)]
    pub windows: Vec<WindowId>,
}

impl SpaceInfo {
    /// Starting point for resolution: every window is an unresolved slot.
    pub fn into_unresolved(self) -> Space {
        Space {
            id: self.id,
            index: self.index,
            display: self.display,
            windows: self.windows.into_iter().map(WindowSlot::Unresolved).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Space {
    pub id: SpaceId,
    pub index: u64,
    pub display: u32,
    pub windows: Vec<WindowSlot>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DisplayInfo {
    pub index: u32,
}

/// The whole widget state. Each reducer op replaces exactly one top-level
/// field and leaves the other untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WidgetState {
    pub spaces: Vec<Space>,
    pub focused_space: Option<SpaceId>,
}

impl WidgetState {
    pub fn apply_spaces(&mut self, spaces: Vec<Space>) { self.spaces = spaces; }

    pub fn apply_focus(&mut self, focused: SpaceId) { self.focused_space = Some(focused); }
}
