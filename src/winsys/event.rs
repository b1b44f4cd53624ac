pub use crate::Result;

use crate::geometry::Dim;
use crate::geometry::Region;
use crate::input::KeyCode;
use crate::input::MouseEvent;
use crate::window::Window;

#[derive(Debug, Clone)]
pub enum Event {
    Mouse {
        event: MouseEvent,
    },
    Key {
        key_code: KeyCode,
    },
    MapRequest {
        window: Window,
    },
    Enter {
        window: Window,
        on_root: bool,
        normal: bool,
    },
    FocusIn {
        window: Window,
    },
    Destroy {
        window: Window,
    },
    Expose {
        window: Window,
        count: u16,
    },
    Unmap {
        window: Window,
        synthetic: bool,
    },
    ConfigureRequest {
        request: ConfigureRequest,
    },
    Configure {
        window: Window,
        region: Region,
        on_root: bool,
    },
    ResizeRequest {
        window: Window,
        dim: Dim,
    },
    Property {
        window: Window,
        kind: PropertyKind,
        deleted: bool,
        on_root: bool,
    },
    FullscreenRequest {
        window: Window,
        action: ToggleAction,
    },
    FocusRequest {
        window: Window,
    },
    DockRequest {
        tray: Window,
        window: Window,
    },
    Mapping {
        request: MappingKind,
    },
    ProtocolError {
        request: u8,
        error: u8,
    },
}

impl Event {
    /// Whether the event may be handled while the pointer is grabbed for
    /// an interactive move or resize.
    pub fn is_drag_passthrough(&self) -> bool {
        match self {
            Event::ConfigureRequest {
                ..
            }
            | Event::Expose {
                ..
            }
            | Event::MapRequest {
                ..
            } => true,
            _ => false,
        }
    }
}

/// A `ConfigureRequest` as received, with every field the sender did not
/// set left as `None`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ConfigureRequest {
    pub window: Window,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub border_width: Option<i32>,
    pub sibling: Option<Window>,
    pub stack_mode: Option<StackMode>,
}

impl ConfigureRequest {
    #[inline]
    pub fn has_pos(&self) -> bool {
        self.x.is_some() || self.y.is_some()
    }

    #[inline]
    pub fn has_dim(&self) -> bool {
        self.width.is_some() || self.height.is_some()
    }
}

#[derive(Debug, Copy, Clone, PartialOrd, Ord, PartialEq, Eq)]
pub enum StackMode {
    Above,
    Below,
    TopIf,
    BottomIf,
    Opposite,
}

#[derive(Debug, Copy, Clone, PartialOrd, Ord, PartialEq, Eq)]
pub enum ToggleAction {
    Toggle,
    Add,
    Remove,
}

#[derive(Debug, Copy, Clone, PartialOrd, Ord, PartialEq, Eq)]
pub enum PropertyKind {
    Name,
    Size,
    Hints,
    TransientFor,
    WindowType,
    XembedInfo,
}

#[derive(Debug, Copy, Clone, PartialOrd, Ord, PartialEq, Eq)]
pub enum MappingKind {
    Modifier,
    Keyboard,
    Pointer,
}
