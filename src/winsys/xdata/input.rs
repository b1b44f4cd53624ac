use super::super::input::Result;
pub use super::super::input::*;

use std::convert::TryFrom;

use anyhow::anyhow;

use x11rb::protocol::xproto::ModMask;

impl From<Modifier> for u16 {
    fn from(modifier: Modifier) -> u16 {
        u16::from(match modifier {
            Modifier::Ctrl => ModMask::CONTROL,
            Modifier::Shift => ModMask::SHIFT,
            Modifier::Alt => ModMask::M1,
            Modifier::Super => ModMask::M4,
            Modifier::AltGr => ModMask::M3,
            Modifier::NumLock => ModMask::M2,
            Modifier::ScrollLock => ModMask::M5,
        })
    }
}

impl From<Button> for u8 {
    fn from(button: Button) -> u8 {
        match button {
            Button::Left => 1,
            Button::Middle => 2,
            Button::Right => 3,
            Button::ScrollUp => 4,
            Button::ScrollDown => 5,
            Button::Backward => 8,
            Button::Forward => 9,
        }
    }
}

impl TryFrom<u8> for Button {
    type Error = anyhow::Error;

    fn try_from(val: u8) -> Result<Self> {
        match val {
            1 => Ok(Self::Left),
            2 => Ok(Self::Middle),
            3 => Ok(Self::Right),
            4 => Ok(Self::ScrollUp),
            5 => Ok(Self::ScrollDown),
            8 => Ok(Self::Backward),
            9 => Ok(Self::Forward),
            _ => Err(anyhow!("no matching button for value {}", val)),
        }
    }
}

/// Strips Num-Lock and Caps-Lock from a protocol modifier state, keeping
/// only the bits bindings are declared with.
pub fn clean_mask(
    state: u16,
    numlock: u16,
) -> u16 {
    let relevant = u16::from(ModMask::SHIFT)
        | u16::from(ModMask::CONTROL)
        | u16::from(ModMask::M1)
        | u16::from(ModMask::M2)
        | u16::from(ModMask::M3)
        | u16::from(ModMask::M4)
        | u16::from(ModMask::M5);

    state & !(numlock | u16::from(ModMask::LOCK)) & relevant
}

/// Every lock combination a binding must be grabbed with to fire
/// regardless of Num-Lock and Caps-Lock.
pub fn lock_variants(numlock: u16) -> [u16; 4] {
    let lock = u16::from(ModMask::LOCK);
    [0, lock, numlock, numlock | lock]
}

pub fn mask_of(modifiers: &[Modifier]) -> u16 {
    modifiers.iter().fold(0u16, |acc, &m| acc | u16::from(m))
}
