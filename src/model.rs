pub mod state;
pub use state::{
    DisplayInfo, Space, SpaceId, SpaceInfo, WidgetState, WindowId, WindowInfo, WindowSlot,
};
