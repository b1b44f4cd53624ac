use crate::model::Model;

use winsys::input::KeyCode;
use winsys::input::MouseShortcut;
use winsys::window::Window;

use strum_macros::ToString;

use std::collections::HashMap;

/// Where a button press landed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, ToString)]
pub enum ClickKind {
    TagBar,
    StatusBar,
    ClientWindow,
    Root,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Click {
    pub kind: ClickKind,
    pub window: Option<Window>,
    pub tag: Option<usize>,
}

pub type KeyAction = Box<dyn FnMut(&mut Model<'_>)>;
pub type MouseAction = Box<dyn FnMut(&mut Model<'_>, Click)>;
pub type KeyBindings = HashMap<KeyCode, KeyAction>;
pub type MouseBindings = HashMap<(ClickKind, MouseShortcut), MouseAction>;
