pub use crate::Result;

use crate::geometry::Pos;
use crate::window::Window;

use std::collections::HashMap;
use std::convert::TryFrom;
use std::vec::Vec;

use anyhow::anyhow;
use strum::EnumIter;
use strum::IntoEnumIterator;

pub type CodeMap = HashMap<String, u8>;

#[repr(u8)]
#[derive(Debug, PartialEq, EnumIter, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub enum Modifier {
    Ctrl = 1 << 0,
    Shift = 1 << 1,
    Alt = 1 << 2,
    AltGr = 1 << 3,
    Super = 1 << 4,
    NumLock = 1 << 5,
    ScrollLock = 1 << 6,
}

impl Modifier {
    /// Modifiers that are stripped before bindings are matched.
    pub fn is_lock(&self) -> bool {
        *self == Modifier::NumLock
    }

    pub fn from_mask(
        mask: u16,
        to_mask: impl Fn(Modifier) -> u16,
    ) -> Vec<Modifier> {
        let mut modifiers = Modifier::iter()
            .filter(|m| !m.is_lock())
            .filter(|&m| mask & to_mask(m) != 0)
            .collect::<Vec<Modifier>>();

        modifiers.sort();
        modifiers
    }
}

impl TryFrom<&str> for Modifier {
    type Error = anyhow::Error;

    fn try_from(val: &str) -> Result<Self> {
        match val {
            "C" | "Ctrl" | "Control" => Ok(Self::Ctrl),
            "A" | "Alt" | "Meta" => Ok(Self::Alt),
            "S" | "Shift" => Ok(Self::Shift),
            "M" | "Super" => Ok(Self::Super),
            "AGr" | "AltGr" => Ok(Self::AltGr),
            "N" | "NumLock" => Ok(Self::NumLock),
            "L" | "ScrollLock" => Ok(Self::ScrollLock),
            _ => Err(anyhow!("unable to resolve \"{}\" to modifier", val)),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Button {
    Left,
    Middle,
    Right,
    ScrollUp,
    ScrollDown,
    Backward,
    Forward,
}

impl TryFrom<&str> for Button {
    type Error = anyhow::Error;

    fn try_from(val: &str) -> Result<Self> {
        match val {
            "1" | "Left" => Ok(Self::Left),
            "2" | "Middle" => Ok(Self::Middle),
            "3" | "Right" => Ok(Self::Right),
            "4" | "ScrollUp" => Ok(Self::ScrollUp),
            "5" | "ScrollDown" => Ok(Self::ScrollDown),
            "8" | "Backward" => Ok(Self::Backward),
            "9" | "Forward" => Ok(Self::Forward),
            _ => Err(anyhow!("unable to resolve \"{}\" to button", val)),
        }
    }
}

/// A physical key together with its lock-free modifier mask.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct KeyCode {
    pub mask: u16,
    pub code: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MouseShortcut {
    pub button: Button,
    pub modifiers: Vec<Modifier>,
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum MouseEventKind {
    Press,
    Release,
    Motion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub shortcut: MouseShortcut,
    pub window: Window,
    pub on_root: bool,
    pub root_rpos: Pos,
    pub window_rpos: Pos,
    pub time: u32,
}
