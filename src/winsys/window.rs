use crate::geometry::Region;

pub type Window = u32;

#[derive(Debug, Copy, Clone, PartialOrd, Ord, PartialEq, Eq)]
pub enum IcccmWindowState {
    Withdrawn,
    Normal,
    Iconic,
}

#[derive(Debug, Copy, Clone, PartialOrd, Ord, PartialEq, Eq)]
pub enum WindowType {
    Desktop,
    Dock,
    Toolbar,
    Menu,
    Utility,
    Splash,
    Dialog,
    Notification,
    Normal,
}

/// Snapshot of the server-side attributes the manager consults before
/// taking a window under management or docking it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WindowAttributes {
    pub region: Region,
    pub border_width: i32,
    pub override_redirect: bool,
    pub viewable: bool,
}
