use winsys::input::Button;
use winsys::input::CodeMap;
use winsys::input::KeyCode;
use winsys::input::Modifier;
use winsys::input::MouseShortcut;
use winsys::Result;

use std::convert::TryFrom;
use std::os::unix::process::CommandExt;
use std::process::Command;
use std::process::Stdio;

use nix::sys::signal;
use nix::sys::signal::SaFlags;
use nix::sys::signal::SigAction;
use nix::sys::signal::SigHandler;
use nix::sys::signal::SigSet;
use nix::sys::signal::Signal;
use nix::sys::wait::waitpid;
use nix::sys::wait::WaitPidFlag;
use nix::sys::wait::WaitStatus;
use nix::unistd;

use x11rb::protocol::xproto::ModMask;

pub struct Util;

impl Util {
    /// Stops terminated children from lingering as zombies and reaps any
    /// that were inherited from before the manager took over.
    pub fn init_process() -> Result<()> {
        let ignore = SigAction::new(
            SigHandler::SigIgn,
            SaFlags::SA_NOCLDSTOP | SaFlags::SA_NOCLDWAIT | SaFlags::SA_RESTART,
            SigSet::empty(),
        );

        unsafe {
            signal::sigaction(Signal::SIGCHLD, &ignore)?;
        }

        while let Ok(status) = waitpid(unistd::Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
            if status == WaitStatus::StillAlive {
                break;
            }
        }

        Ok(())
    }

    fn detach(command: &mut Command) -> &mut Command {
        let command = command.stdout(Stdio::null()).stderr(Stdio::null());

        // the display connection is close-on-exec, so only the session
        // and the inherited signal disposition need resetting
        unsafe {
            command.pre_exec(|| {
                unistd::setsid()
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

                signal::signal(Signal::SIGCHLD, SigHandler::SigDfl)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

                Ok(())
            })
        }
    }

    pub fn spawn<S: Into<String>>(cmd: S) {
        let cmd = cmd.into();
        let args: Vec<&str> = cmd.split_whitespace().collect();

        if let Some((program, args)) = args.split_first() {
            if let Err(e) = Self::detach(Command::new(program).args(args)).spawn() {
                warn!("unable to spawn {}: {}", program, e);
            }
        }
    }

    pub fn spawn_shell<S: Into<String>>(cmd: S) {
        let cmd = cmd.into();

        if let Err(e) = Self::detach(Command::new("sh").arg("-c").arg(&cmd)).spawn() {
            warn!("unable to spawn shell command \"{}\": {}", cmd, e);
        }
    }

    pub fn system_keycodes() -> CodeMap {
        match Command::new("xmodmap").arg("-pke").output() {
            Err(e) => {
                error!("unable to fetch keycodes via xmodmap: {}", e);
                CodeMap::new()
            },
            Ok(o) => match String::from_utf8(o.stdout) {
                Err(e) => {
                    error!("invalid utf8 from xmodmap: {}", e);
                    CodeMap::new()
                },
                Ok(s) => Self::parse_keycodes(&s),
            },
        }
    }

    /// Reads `keycode  38 = a A a A` lines into a keysym-name lookup.
    pub fn parse_keycodes(keymap: &str) -> CodeMap {
        keymap
            .lines()
            .flat_map(|line| {
                let mut words = line.split_whitespace();
                let key_code = words.nth(1).and_then(|code| code.parse::<u8>().ok());

                words
                    .skip(1)
                    .filter(move |_| key_code.is_some())
                    .filter_map(move |name| key_code.map(|code| (name.to_owned(), code)))
            })
            .collect::<CodeMap>()
    }

    pub fn parse_key_binding(
        key_binding: impl Into<String>,
        keycodes: &CodeMap,
    ) -> Option<KeyCode> {
        let s = key_binding.into();
        let mut constituents: Vec<&str> = s.split('-').collect();
        let key = constituents.pop()?;
        let code = *keycodes.get(key)?;

        let mut mask = 0u16;
        for modifier in constituents {
            mask |= match modifier {
                "A" | "Alt" | "Meta" => u16::from(ModMask::M1),
                "M" | "Super" => u16::from(ModMask::M4),
                "S" | "Shift" => u16::from(ModMask::SHIFT),
                "C" | "Ctrl" | "Control" => u16::from(ModMask::CONTROL),
                "1" | "Mod" => u16::from(if cfg!(debug_assertions) {
                    ModMask::M1
                } else {
                    ModMask::M4
                }),
                "2" | "Sec" => u16::from(if cfg!(debug_assertions) {
                    ModMask::M4
                } else {
                    ModMask::M1
                }),
                _ => return None,
            };
        }

        Some(KeyCode {
            mask,
            code,
        })
    }

    pub fn parse_mouse_binding(mouse_binding: impl Into<String>) -> Option<MouseShortcut> {
        let s = mouse_binding.into();
        let mut constituents: Vec<&str> = s.split('-').collect();
        let button = Button::try_from(constituents.pop()?).ok()?;

        let mut modifiers = constituents
            .iter()
            .map(|&modifier| match modifier {
                "1" | "Mod" => Some(if cfg!(debug_assertions) {
                    Modifier::Alt
                } else {
                    Modifier::Super
                }),
                "2" | "Sec" => Some(if cfg!(debug_assertions) {
                    Modifier::Super
                } else {
                    Modifier::Alt
                }),
                modifier => Modifier::try_from(modifier).ok(),
            })
            .collect::<Option<Vec<Modifier>>>()?;

        modifiers.sort();
        modifiers.dedup();

        Some(MouseShortcut {
            button,
            modifiers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keycodes() -> CodeMap {
        Util::parse_keycodes(
            "keycode  36 = Return NoSymbol Return\n\
             keycode  38 = a A a A\n\
             keycode 255 =\n\
             keycode   x = broken",
        )
    }

    #[test]
    fn keymap_lines_are_indexed_by_name() {
        let keycodes = keycodes();

        assert_eq!(keycodes.get("Return"), Some(&36));
        assert_eq!(keycodes.get("A"), Some(&38));
        assert_eq!(keycodes.get("broken"), None);
    }

    #[test]
    fn key_bindings_resolve_modifiers() {
        let keycodes = keycodes();
        let binding = Util::parse_key_binding("M-S-Return", &keycodes);

        assert_eq!(
            binding,
            Some(KeyCode {
                mask: u16::from(ModMask::M4) | u16::from(ModMask::SHIFT),
                code: 36,
            })
        );

        assert_eq!(Util::parse_key_binding("Q-a", &keycodes), None);
        assert_eq!(Util::parse_key_binding("M-unknown", &keycodes), None);
    }

    #[test]
    fn mouse_bindings_sort_modifiers() {
        let shortcut = Util::parse_mouse_binding("S-M-Left");

        assert_eq!(
            shortcut,
            Some(MouseShortcut {
                button: Button::Left,
                modifiers: vec![Modifier::Shift, Modifier::Super],
            })
        );

        assert_eq!(Util::parse_mouse_binding("M-Nope"), None);
    }
}
