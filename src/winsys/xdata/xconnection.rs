use crate::connection::Connection;
use crate::connection::CursorKind;
use crate::event::ConfigureRequest;
use crate::event::Event;
use crate::event::MappingKind;
use crate::event::PropertyKind;
use crate::event::StackMode;
use crate::event::ToggleAction;
use crate::geometry::Dim;
use crate::geometry::Pos;
use crate::geometry::Region;
use crate::hints::Hints;
use crate::hints::SizeHints;
use crate::hints::XembedInfo;
use crate::hints::XembedMessage;
use crate::window::IcccmWindowState;
use crate::window::Window;
use crate::window::WindowAttributes;
use crate::window::WindowType;
use crate::xdata::error::is_benign_error;
use crate::xdata::input::*;
use crate::Result;

use std::cell::Cell;
use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::convert::TryFrom;

use x11rb::connection;
use x11rb::cursor::Handle as CursorHandle;
use x11rb::errors::ReplyError;
use x11rb::properties;
use x11rb::protocol::xproto;
use x11rb::protocol::xproto::ConnectionExt;
use x11rb::protocol::xproto::EventMask;
use x11rb::protocol::xproto::ModMask;
use x11rb::protocol::xproto::CLIENT_MESSAGE_EVENT;
use x11rb::protocol::xproto::CONFIGURE_NOTIFY_EVENT;
use x11rb::protocol::ErrorKind;
use x11rb::protocol::Event as XEvent;
use x11rb::resource_manager::Database;
use x11rb::wrapper::ConnectionExt as _;

use anyhow::anyhow;

type Atom = u32;

const SYSTEM_TRAY_REQUEST_DOCK: u32 = 0;
const XK_NUM_LOCK: u32 = 0xff7f;

x11rb::atom_manager! {
    pub Atoms: AtomsCookie {
        ATOM,
        CARDINAL,
        WINDOW,
        UTF8_STRING,

        // ICCCM
        WM_NAME,
        WM_HINTS,
        WM_PROTOCOLS,
        WM_NORMAL_HINTS,
        WM_DELETE_WINDOW,
        WM_TRANSIENT_FOR,
        WM_TAKE_FOCUS,
        WM_STATE,

        // EWMH
        _NET_SUPPORTED,
        _NET_CLIENT_LIST,
        _NET_ACTIVE_WINDOW,
        _NET_SUPPORTING_WM_CHECK,
        _NET_WM_NAME,
        _NET_WM_STATE,
        _NET_WM_STATE_FULLSCREEN,
        _NET_WM_WINDOW_TYPE,
        _NET_WM_WINDOW_TYPE_DESKTOP,
        _NET_WM_WINDOW_TYPE_DOCK,
        _NET_WM_WINDOW_TYPE_TOOLBAR,
        _NET_WM_WINDOW_TYPE_MENU,
        _NET_WM_WINDOW_TYPE_UTILITY,
        _NET_WM_WINDOW_TYPE_SPLASH,
        _NET_WM_WINDOW_TYPE_DIALOG,
        _NET_WM_WINDOW_TYPE_NOTIFICATION,
        _NET_WM_WINDOW_TYPE_NORMAL,

        // System tray and embedding
        _NET_SYSTEM_TRAY_S0,
        _NET_SYSTEM_TRAY_OPCODE,
        _NET_SYSTEM_TRAY_ORIENTATION,
        _NET_SYSTEM_TRAY_ORIENTATION_HORZ,
        MANAGER,
        _XEMBED,
        _XEMBED_INFO,
    }
}

pub struct XConnection<'conn, Conn: connection::Connection> {
    conn: &'conn Conn,
    atoms: Atoms,
    type_map: HashMap<Atom, WindowType>,
    screen: xproto::Screen,
    check_window: Window,
    gc: xproto::Gcontext,
    cursors: HashMap<CursorKind, xproto::Cursor>,
    numlock: Cell<u16>,
    pending: RefCell<VecDeque<XEvent>>,
    client_event_mask: EventMask,
    icon_event_mask: EventMask,
    button_event_mask: EventMask,
    drag_event_mask: EventMask,
}

impl<'conn, Conn: connection::Connection> XConnection<'conn, Conn> {
    pub fn new(
        conn: &'conn Conn,
        screen_num: usize,
    ) -> Result<Self> {
        let screen = conn.setup().roots[screen_num].clone();
        let root = screen.root;

        let aux = xproto::ChangeWindowAttributesAux::default()
            .event_mask(EventMask::SUBSTRUCTURE_REDIRECT);

        let res = conn.change_window_attributes(root, &aux)?.check();
        if let Err(ReplyError::X11Error(err)) = res {
            if err.error_kind == ErrorKind::Access {
                return Err(anyhow!("another window manager is already running"));
            } else {
                return Err(anyhow!("unable to set up window manager"));
            }
        }

        let atoms = Atoms::new(conn)?.reply()?;
        let check_window = conn.generate_id()?;

        let type_map: HashMap<Atom, WindowType> = map!(
            atoms._NET_WM_WINDOW_TYPE_DESKTOP => WindowType::Desktop,
            atoms._NET_WM_WINDOW_TYPE_DOCK => WindowType::Dock,
            atoms._NET_WM_WINDOW_TYPE_TOOLBAR => WindowType::Toolbar,
            atoms._NET_WM_WINDOW_TYPE_MENU => WindowType::Menu,
            atoms._NET_WM_WINDOW_TYPE_UTILITY => WindowType::Utility,
            atoms._NET_WM_WINDOW_TYPE_SPLASH => WindowType::Splash,
            atoms._NET_WM_WINDOW_TYPE_DIALOG => WindowType::Dialog,
            atoms._NET_WM_WINDOW_TYPE_NOTIFICATION => WindowType::Notification,
            atoms._NET_WM_WINDOW_TYPE_NORMAL => WindowType::Normal,
        );

        conn.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            check_window,
            root,
            0,
            0,
            1,
            1,
            0,
            xproto::WindowClass::INPUT_ONLY,
            x11rb::COPY_FROM_PARENT,
            &xproto::CreateWindowAux::default().override_redirect(1),
        )?;

        let gc = conn.generate_id()?;
        conn.create_gc(gc, root, &xproto::CreateGCAux::default())?;

        let mut cursors = HashMap::new();
        if let Ok(database) = Database::new_from_default(conn) {
            if let Ok(handle) = CursorHandle::new(conn, screen_num, &database)
                .map_err(anyhow::Error::from)
                .and_then(|cookie| cookie.reply().map_err(anyhow::Error::from))
            {
                for &(kind, name) in &[
                    (CursorKind::Normal, "left_ptr"),
                    (CursorKind::Move, "fleur"),
                    (CursorKind::Resize, "sizing"),
                ] {
                    if let Ok(cursor) = handle.load_cursor(conn, name) {
                        cursors.insert(kind, cursor);
                    }
                }
            }
        }

        let root_event_mask: EventMask = EventMask::SUBSTRUCTURE_REDIRECT
            | EventMask::SUBSTRUCTURE_NOTIFY
            | EventMask::BUTTON_PRESS
            | EventMask::POINTER_MOTION
            | EventMask::ENTER_WINDOW
            | EventMask::LEAVE_WINDOW
            | EventMask::STRUCTURE_NOTIFY
            | EventMask::PROPERTY_CHANGE;

        let mut aux = xproto::ChangeWindowAttributesAux::default().event_mask(root_event_mask);
        if let Some(&cursor) = cursors.get(&CursorKind::Normal) {
            aux = aux.cursor(cursor);
        }

        conn.change_window_attributes(root, &aux)?;

        let client_event_mask: EventMask = EventMask::ENTER_WINDOW
            | EventMask::FOCUS_CHANGE
            | EventMask::PROPERTY_CHANGE
            | EventMask::STRUCTURE_NOTIFY;

        let icon_event_mask: EventMask =
            EventMask::STRUCTURE_NOTIFY | EventMask::PROPERTY_CHANGE | EventMask::RESIZE_REDIRECT;

        let button_event_mask: EventMask = EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE;

        let drag_event_mask: EventMask =
            EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE | EventMask::POINTER_MOTION;

        let connection = Self {
            conn,
            atoms,
            type_map,
            screen,
            check_window,
            gc,
            cursors,
            numlock: Cell::new(0),
            pending: RefCell::new(VecDeque::new()),
            client_event_mask,
            icon_event_mask,
            button_event_mask,
            drag_event_mask,
        };

        connection.refresh_modifiers();
        Ok(connection)
    }

    #[inline]
    fn root(&self) -> Window {
        self.screen.root
    }

    fn get_property32(
        &self,
        window: Window,
        property: Atom,
        type_: Atom,
    ) -> Vec<u32> {
        self.conn
            .get_property(false, window, property, type_, 0, std::u32::MAX)
            .map_or(Vec::with_capacity(0), |cookie| {
                cookie.reply().map_or(Vec::with_capacity(0), |reply| {
                    reply
                        .value32()
                        .map_or(Vec::with_capacity(0), |values| values.collect())
                })
            })
    }

    fn get_text_property(
        &self,
        window: Window,
        property: Atom,
        type_: Atom,
    ) -> Option<String> {
        let reply = self
            .conn
            .get_property(false, window, property, type_, 0, std::u32::MAX)
            .ok()?
            .reply()
            .ok()?;

        let bytes: Vec<u8> = reply.value8()?.collect();
        let text = String::from_utf8_lossy(&bytes)
            .trim_end_matches('\0')
            .to_owned();

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    pub fn window_has_any_of_protocols(
        &self,
        window: Window,
        protocols: &[Atom],
    ) -> bool {
        self.get_property32(window, self.atoms.WM_PROTOCOLS, self.atoms.ATOM)
            .iter()
            .any(|protocol| protocols.contains(protocol))
    }

    #[inline]
    fn send_client_message(
        &self,
        window: Window,
        type_: Atom,
        data: [u32; 5],
        mask: EventMask,
    ) -> Result<()> {
        let event = xproto::ClientMessageEvent {
            response_type: CLIENT_MESSAGE_EVENT,
            format: 32,
            sequence: 0,
            window,
            type_,
            data: data.into(),
        };

        self.conn.send_event(false, window, mask, &event)?;
        Ok(())
    }

    #[inline]
    fn send_protocol_client_message(
        &self,
        window: Window,
        atom: Atom,
    ) -> Result<()> {
        self.send_client_message(
            window,
            self.atoms.WM_PROTOCOLS,
            [atom, x11rb::CURRENT_TIME, 0, 0, 0],
            EventMask::NO_EVENT,
        )
    }

    fn next_event(&self) -> Option<XEvent> {
        if let Some(event) = self.pending.borrow_mut().pop_front() {
            return Some(event);
        }

        match self.conn.wait_for_event() {
            Ok(event) => Some(event),
            Err(err) => {
                error!("lost connection to the display server: {}", err);
                None
            },
        }
    }

    #[inline]
    fn mouse_modifiers(
        &self,
        state: u16,
    ) -> Vec<Modifier> {
        Modifier::from_mask(clean_mask(state, self.numlock.get()), u16::from)
    }

    #[inline]
    fn on_button_press(
        &self,
        event: &xproto::ButtonPressEvent,
    ) -> Option<Event> {
        Some(Event::Mouse {
            event: MouseEvent {
                kind: MouseEventKind::Press,
                shortcut: MouseShortcut {
                    button: Button::try_from(event.detail).ok()?,
                    modifiers: self.mouse_modifiers(event.state),
                },
                window: event.event,
                on_root: event.event == self.root(),
                root_rpos: Pos {
                    x: event.root_x as i32,
                    y: event.root_y as i32,
                },
                window_rpos: Pos {
                    x: event.event_x as i32,
                    y: event.event_y as i32,
                },
                time: event.time,
            },
        })
    }

    #[inline]
    fn on_button_release(
        &self,
        event: &xproto::ButtonReleaseEvent,
    ) -> Option<Event> {
        Some(Event::Mouse {
            event: MouseEvent {
                kind: MouseEventKind::Release,
                shortcut: MouseShortcut {
                    button: Button::try_from(event.detail).ok()?,
                    modifiers: self.mouse_modifiers(event.state),
                },
                window: event.event,
                on_root: event.event == self.root(),
                root_rpos: Pos {
                    x: event.root_x as i32,
                    y: event.root_y as i32,
                },
                window_rpos: Pos {
                    x: event.event_x as i32,
                    y: event.event_y as i32,
                },
                time: event.time,
            },
        })
    }

    #[inline]
    fn on_motion_notify(
        &self,
        event: &xproto::MotionNotifyEvent,
    ) -> Option<Event> {
        Some(Event::Mouse {
            event: MouseEvent {
                kind: MouseEventKind::Motion,
                shortcut: MouseShortcut {
                    button: Button::Left,
                    modifiers: self.mouse_modifiers(event.state),
                },
                window: event.event,
                on_root: event.event == self.root(),
                root_rpos: Pos {
                    x: event.root_x as i32,
                    y: event.root_y as i32,
                },
                window_rpos: Pos {
                    x: event.event_x as i32,
                    y: event.event_y as i32,
                },
                time: event.time,
            },
        })
    }

    #[inline]
    fn on_key_press(
        &self,
        event: &xproto::KeyPressEvent,
    ) -> Option<Event> {
        Some(Event::Key {
            key_code: KeyCode {
                mask: clean_mask(event.state, self.numlock.get()),
                code: event.detail,
            },
        })
    }

    #[inline]
    fn on_map_request(
        &self,
        event: &xproto::MapRequestEvent,
    ) -> Option<Event> {
        Some(Event::MapRequest {
            window: event.window,
        })
    }

    #[inline]
    fn on_enter_notify(
        &self,
        event: &xproto::EnterNotifyEvent,
    ) -> Option<Event> {
        Some(Event::Enter {
            window: event.event,
            on_root: event.event == self.root(),
            normal: event.mode == xproto::NotifyMode::NORMAL
                && event.detail != xproto::NotifyDetail::INFERIOR,
        })
    }

    #[inline]
    fn on_focus_in(
        &self,
        event: &xproto::FocusInEvent,
    ) -> Option<Event> {
        Some(Event::FocusIn {
            window: event.event,
        })
    }

    #[inline]
    fn on_destroy_notify(
        &self,
        event: &xproto::DestroyNotifyEvent,
    ) -> Option<Event> {
        Some(Event::Destroy {
            window: event.window,
        })
    }

    #[inline]
    fn on_expose(
        &self,
        event: &xproto::ExposeEvent,
    ) -> Option<Event> {
        Some(Event::Expose {
            window: event.window,
            count: event.count,
        })
    }

    #[inline]
    fn on_unmap_notify(
        &self,
        event: &xproto::UnmapNotifyEvent,
    ) -> Option<Event> {
        Some(Event::Unmap {
            window: event.window,
            synthetic: event.response_type & 0x80 != 0,
        })
    }

    #[inline]
    fn on_configure_request(
        &self,
        event: &xproto::ConfigureRequestEvent,
    ) -> Option<Event> {
        let has = |flag: xproto::ConfigWindow| event.value_mask & u16::from(flag) != 0;

        Some(Event::ConfigureRequest {
            request: ConfigureRequest {
                window: event.window,
                x: if has(xproto::ConfigWindow::X) {
                    Some(event.x as i32)
                } else {
                    None
                },
                y: if has(xproto::ConfigWindow::Y) {
                    Some(event.y as i32)
                } else {
                    None
                },
                width: if has(xproto::ConfigWindow::WIDTH) {
                    Some(event.width as i32)
                } else {
                    None
                },
                height: if has(xproto::ConfigWindow::HEIGHT) {
                    Some(event.height as i32)
                } else {
                    None
                },
                border_width: if has(xproto::ConfigWindow::BORDER_WIDTH) {
                    Some(event.border_width as i32)
                } else {
                    None
                },
                sibling: if has(xproto::ConfigWindow::SIBLING) {
                    Some(event.sibling)
                } else {
                    None
                },
                stack_mode: if has(xproto::ConfigWindow::STACK_MODE) {
                    Some(match event.stack_mode {
                        xproto::StackMode::ABOVE => StackMode::Above,
                        xproto::StackMode::BELOW => StackMode::Below,
                        xproto::StackMode::TOP_IF => StackMode::TopIf,
                        xproto::StackMode::BOTTOM_IF => StackMode::BottomIf,
                        _ => StackMode::Opposite,
                    })
                } else {
                    None
                },
            },
        })
    }

    #[inline]
    fn on_configure_notify(
        &self,
        event: &xproto::ConfigureNotifyEvent,
    ) -> Option<Event> {
        Some(Event::Configure {
            window: event.window,
            region: Region::new(
                event.x as i32,
                event.y as i32,
                event.width as i32,
                event.height as i32,
            ),
            on_root: event.window == self.root(),
        })
    }

    #[inline]
    fn on_resize_request(
        &self,
        event: &xproto::ResizeRequestEvent,
    ) -> Option<Event> {
        Some(Event::ResizeRequest {
            window: event.window,
            dim: Dim {
                w: event.width as i32,
                h: event.height as i32,
            },
        })
    }

    #[inline]
    fn on_property_notify(
        &self,
        event: &xproto::PropertyNotifyEvent,
    ) -> Option<Event> {
        let kind = if event.atom == self.atoms.WM_NAME || event.atom == self.atoms._NET_WM_NAME {
            PropertyKind::Name
        } else if event.atom == self.atoms.WM_NORMAL_HINTS {
            PropertyKind::Size
        } else if event.atom == self.atoms.WM_HINTS {
            PropertyKind::Hints
        } else if event.atom == self.atoms.WM_TRANSIENT_FOR {
            PropertyKind::TransientFor
        } else if event.atom == self.atoms._NET_WM_WINDOW_TYPE {
            PropertyKind::WindowType
        } else if event.atom == self.atoms._XEMBED_INFO {
            PropertyKind::XembedInfo
        } else {
            return None;
        };

        Some(Event::Property {
            window: event.window,
            kind,
            deleted: event.state == xproto::Property::DELETE,
            on_root: event.window == self.root(),
        })
    }

    #[inline]
    fn on_client_message(
        &self,
        event: &xproto::ClientMessageEvent,
    ) -> Option<Event> {
        if event.format != 32 {
            return None;
        }

        let data = event.data.as_data32();

        if event.type_ == self.atoms._NET_SYSTEM_TRAY_OPCODE {
            if data[1] == SYSTEM_TRAY_REQUEST_DOCK {
                return Some(Event::DockRequest {
                    tray: event.window,
                    window: data[2],
                });
            }
        } else if event.type_ == self.atoms._NET_WM_STATE {
            let fullscreen = self.atoms._NET_WM_STATE_FULLSCREEN;

            if data[1] == fullscreen || data[2] == fullscreen {
                return Some(Event::FullscreenRequest {
                    window: event.window,
                    action: match data[0] {
                        0 => ToggleAction::Remove,
                        1 => ToggleAction::Add,
                        2 => ToggleAction::Toggle,
                        _ => return None,
                    },
                });
            }
        } else if event.type_ == self.atoms._NET_ACTIVE_WINDOW {
            return Some(Event::FocusRequest {
                window: event.window,
            });
        }

        None
    }

    #[inline]
    fn on_mapping_notify(
        &self,
        event: &xproto::MappingNotifyEvent,
    ) -> Option<Event> {
        Some(Event::Mapping {
            request: match event.request {
                xproto::Mapping::MODIFIER => MappingKind::Modifier,
                xproto::Mapping::KEYBOARD => MappingKind::Keyboard,
                _ => MappingKind::Pointer,
            },
        })
    }

    #[inline]
    fn on_error(
        &self,
        error: &x11rb::x11_utils::X11Error,
    ) -> Option<Event> {
        if is_benign_error(error) {
            trace!(
                "ignoring benign error {:?} from request {}",
                error.error_kind,
                error.major_opcode
            );

            return None;
        }

        Some(Event::ProtocolError {
            request: error.major_opcode,
            error: error.error_code,
        })
    }
}

impl<'conn, Conn: connection::Connection> Connection for XConnection<'conn, Conn> {
    #[inline]
    fn flush(&self) -> bool {
        self.conn.flush().is_ok()
    }

    #[inline]
    fn sync(&self) {
        drop(
            self.conn
                .get_input_focus()
                .map(|cookie| cookie.reply()),
        );
    }

    fn step(&self) -> Option<Event> {
        self.next_event().and_then(|event| match event {
            XEvent::ButtonPress(e) => self.on_button_press(&e),
            XEvent::ButtonRelease(e) => self.on_button_release(&e),
            XEvent::MotionNotify(e) => self.on_motion_notify(&e),
            XEvent::KeyPress(e) => self.on_key_press(&e),
            XEvent::MapRequest(e) => self.on_map_request(&e),
            XEvent::EnterNotify(e) => self.on_enter_notify(&e),
            XEvent::FocusIn(e) => self.on_focus_in(&e),
            XEvent::DestroyNotify(e) => self.on_destroy_notify(&e),
            XEvent::Expose(e) => self.on_expose(&e),
            XEvent::UnmapNotify(e) => self.on_unmap_notify(&e),
            XEvent::ConfigureRequest(e) => self.on_configure_request(&e),
            XEvent::ConfigureNotify(e) => self.on_configure_notify(&e),
            XEvent::ResizeRequest(e) => self.on_resize_request(&e),
            XEvent::PropertyNotify(e) => self.on_property_notify(&e),
            XEvent::ClientMessage(e) => self.on_client_message(&e),
            XEvent::MappingNotify(e) => self.on_mapping_notify(&e),
            XEvent::Error(e) => self.on_error(&e),
            _ => None,
        })
    }

    #[inline]
    fn screen_region(&self) -> Region {
        Region::new(
            0,
            0,
            self.screen.width_in_pixels as i32,
            self.screen.height_in_pixels as i32,
        )
    }

    fn top_level_windows(&self) -> Vec<Window> {
        self.conn
            .query_tree(self.root())
            .map_or(Vec::with_capacity(0), |cookie| {
                cookie
                    .reply()
                    .map_or(Vec::with_capacity(0), |reply| reply.children)
            })
    }

    #[inline]
    fn get_pointer_position(&self) -> Option<Pos> {
        let reply = self.conn.query_pointer(self.root()).ok()?.reply().ok()?;

        Some(Pos {
            x: reply.root_x as i32,
            y: reply.root_y as i32,
        })
    }

    fn discard_enter_events(&self) {
        self.sync();

        let mut pending = self.pending.borrow_mut();
        pending.retain(|event| !matches!(event, XEvent::EnterNotify(_)));

        while let Ok(Some(event)) = self.conn.poll_for_event() {
            match event {
                XEvent::EnterNotify(_) => {},
                event => pending.push_back(event),
            }
        }
    }

    fn cleanup(&self) {
        drop(
            self.conn
                .ungrab_key(xproto::Grab::ANY, self.root(), xproto::ModMask::ANY),
        );

        drop(self.conn.destroy_window(self.check_window));
        drop(self.conn.free_gc(self.gc));

        drop(self.conn.set_input_focus(
            xproto::InputFocus::POINTER_ROOT,
            xproto::InputFocus::POINTER_ROOT,
            x11rb::CURRENT_TIME,
        ));

        drop(
            self.conn
                .delete_property(self.root(), self.atoms._NET_ACTIVE_WINDOW),
        );

        self.sync();
        self.flush();
    }

    fn create_bar(
        &self,
        region: Region,
        background: u32,
    ) -> Result<Window> {
        let bar = self.conn.generate_id()?;
        let aux = xproto::CreateWindowAux::new()
            .override_redirect(1)
            .background_pixel(background)
            .event_mask(EventMask::BUTTON_PRESS | EventMask::EXPOSURE);

        self.conn.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            bar,
            self.root(),
            region.pos.x as i16,
            region.pos.y as i16,
            region.dim.w as u16,
            region.dim.h as u16,
            0,
            xproto::WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &aux,
        )?;

        if let Some(&cursor) = self.cursors.get(&CursorKind::Normal) {
            self.conn.change_window_attributes(
                bar,
                &xproto::ChangeWindowAttributesAux::default().cursor(cursor),
            )?;
        }

        self.map_window_raised(bar);
        Ok(bar)
    }

    fn create_systray(
        &self,
        region: Region,
        background: u32,
    ) -> Result<Window> {
        let tray = self.conn.generate_id()?;
        let aux = xproto::CreateWindowAux::new()
            .override_redirect(1)
            .background_pixel(background)
            .event_mask(EventMask::SUBSTRUCTURE_NOTIFY);

        self.conn.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            tray,
            self.root(),
            region.pos.x as i16,
            region.pos.y as i16,
            region.dim.w as u16,
            region.dim.h as u16,
            0,
            xproto::WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &aux,
        )?;

        self.conn.change_property32(
            xproto::PropMode::REPLACE,
            tray,
            self.atoms._NET_SYSTEM_TRAY_ORIENTATION,
            self.atoms.CARDINAL,
            &[self.atoms._NET_SYSTEM_TRAY_ORIENTATION_HORZ],
        )?;

        self.map_window_raised(tray);
        Ok(tray)
    }

    fn claim_systray_selection(
        &self,
        window: Window,
    ) -> bool {
        let selection = self.atoms._NET_SYSTEM_TRAY_S0;

        drop(
            self.conn
                .set_selection_owner(window, selection, x11rb::CURRENT_TIME),
        );

        let owner = self
            .conn
            .get_selection_owner(selection)
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .map(|reply| reply.owner);

        if owner != Some(window) {
            return false;
        }

        let root = self.root();
        self.send_client_message(
            root,
            self.atoms.MANAGER,
            [x11rb::CURRENT_TIME, selection, window, 0, 0],
            EventMask::STRUCTURE_NOTIFY,
        )
        .map_or(false, |_| {
            self.sync();
            true
        })
    }

    #[inline]
    fn init_window(
        &self,
        window: Window,
    ) {
        drop(self.conn.change_window_attributes(
            window,
            &xproto::ChangeWindowAttributesAux::default().event_mask(self.client_event_mask),
        ));
    }

    #[inline]
    fn init_icon(
        &self,
        window: Window,
    ) {
        drop(self.conn.change_window_attributes(
            window,
            &xproto::ChangeWindowAttributesAux::default().event_mask(self.icon_event_mask),
        ));
    }

    fn release_window(
        &self,
        window: Window,
        border_width: u32,
    ) {
        drop(self.conn.grab_server());

        drop(self.conn.change_window_attributes(
            window,
            &xproto::ChangeWindowAttributesAux::default().event_mask(EventMask::NO_EVENT),
        ));

        self.set_window_border_width(window, border_width);
        self.ungrab_buttons(window);
        self.set_icccm_window_state(window, IcccmWindowState::Withdrawn);

        self.sync();
        drop(self.conn.ungrab_server());
    }

    #[inline]
    fn map_window(
        &self,
        window: Window,
    ) {
        drop(self.conn.map_window(window));
    }

    #[inline]
    fn map_window_raised(
        &self,
        window: Window,
    ) {
        drop(self.conn.map_window(window));
        self.raise_window(window);
    }

    #[inline]
    fn map_subwindows(
        &self,
        window: Window,
    ) {
        drop(self.conn.map_subwindows(window));
    }

    #[inline]
    fn unmap_window(
        &self,
        window: Window,
    ) {
        drop(self.conn.unmap_window(window));
    }

    #[inline]
    fn reparent_window(
        &self,
        window: Window,
        parent: Window,
        pos: Pos,
    ) {
        drop(
            self.conn
                .reparent_window(window, parent, pos.x as i16, pos.y as i16),
        );
    }

    #[inline]
    fn destroy_window(
        &self,
        window: Window,
    ) {
        drop(self.conn.destroy_window(window));
    }

    fn kill_window(
        &self,
        window: Window,
    ) -> bool {
        let protocols = &[self.atoms.WM_DELETE_WINDOW];

        if self.window_has_any_of_protocols(window, protocols) {
            self.send_protocol_client_message(window, self.atoms.WM_DELETE_WINDOW)
                .map_or(false, |_| self.flush())
        } else {
            drop(self.conn.grab_server());
            drop(
                self.conn
                    .set_close_down_mode(xproto::CloseDown::DESTROY_ALL),
            );

            let killed = self.conn.kill_client(window).is_ok();

            self.sync();
            drop(self.conn.ungrab_server());

            killed && self.flush()
        }
    }

    #[inline]
    fn place_window(
        &self,
        window: Window,
        region: &Region,
    ) {
        drop(
            self.conn.configure_window(
                window,
                &xproto::ConfigureWindowAux::default()
                    .x(region.pos.x)
                    .y(region.pos.y)
                    .width(region.dim.w as u32)
                    .height(region.dim.h as u32),
            ),
        );
    }

    #[inline]
    fn configure_window(
        &self,
        window: Window,
        region: &Region,
        border_width: u32,
    ) {
        drop(
            self.conn.configure_window(
                window,
                &xproto::ConfigureWindowAux::default()
                    .x(region.pos.x)
                    .y(region.pos.y)
                    .width(region.dim.w as u32)
                    .height(region.dim.h as u32)
                    .border_width(border_width),
            ),
        );
    }

    #[inline]
    fn move_window(
        &self,
        window: Window,
        pos: Pos,
    ) {
        drop(self.conn.configure_window(
            window,
            &xproto::ConfigureWindowAux::default().x(pos.x).y(pos.y),
        ));
    }

    #[inline]
    fn raise_window(
        &self,
        window: Window,
    ) {
        drop(self.conn.configure_window(
            window,
            &xproto::ConfigureWindowAux::default().stack_mode(xproto::StackMode::ABOVE),
        ));
    }

    #[inline]
    fn stack_window_above(
        &self,
        window: Window,
        sibling: Option<Window>,
    ) {
        let mut aux = xproto::ConfigureWindowAux::default().stack_mode(xproto::StackMode::ABOVE);

        if let Some(sibling) = sibling {
            aux = aux.sibling(sibling);
        }

        drop(self.conn.configure_window(window, &aux));
    }

    #[inline]
    fn stack_window_below(
        &self,
        window: Window,
        sibling: Option<Window>,
    ) {
        let mut aux = xproto::ConfigureWindowAux::default().stack_mode(xproto::StackMode::BELOW);

        if let Some(sibling) = sibling {
            aux = aux.sibling(sibling);
        }

        drop(self.conn.configure_window(window, &aux));
    }

    fn forward_configure_request(
        &self,
        request: &ConfigureRequest,
    ) {
        let aux = xproto::ConfigureWindowAux::default()
            .x(request.x)
            .y(request.y)
            .width(request.width.map(|w| w as u32))
            .height(request.height.map(|h| h as u32))
            .border_width(request.border_width.map(|bw| bw as u32))
            .sibling(request.sibling)
            .stack_mode(request.stack_mode.map(|mode| match mode {
                StackMode::Above => xproto::StackMode::ABOVE,
                StackMode::Below => xproto::StackMode::BELOW,
                StackMode::TopIf => xproto::StackMode::TOP_IF,
                StackMode::BottomIf => xproto::StackMode::BOTTOM_IF,
                StackMode::Opposite => xproto::StackMode::OPPOSITE,
            }));

        drop(self.conn.configure_window(request.window, &aux));
    }

    fn send_configure_notify(
        &self,
        window: Window,
        region: &Region,
        border_width: u32,
    ) {
        let event = xproto::ConfigureNotifyEvent {
            response_type: CONFIGURE_NOTIFY_EVENT,
            sequence: 0,
            event: window,
            window,
            above_sibling: x11rb::NONE,
            x: region.pos.x as i16,
            y: region.pos.y as i16,
            width: region.dim.w as u16,
            height: region.dim.h as u16,
            border_width: border_width as u16,
            override_redirect: false,
        };

        drop(
            self.conn
                .send_event(false, window, EventMask::STRUCTURE_NOTIFY, &event),
        );
    }

    #[inline]
    fn insert_window_in_save_set(
        &self,
        window: Window,
    ) {
        drop(self.conn.change_save_set(xproto::SetMode::INSERT, window));
    }

    #[inline]
    fn set_window_border_width(
        &self,
        window: Window,
        width: u32,
    ) {
        drop(self.conn.configure_window(
            window,
            &xproto::ConfigureWindowAux::default().border_width(width),
        ));
    }

    #[inline]
    fn set_window_border_color(
        &self,
        window: Window,
        color: u32,
    ) {
        drop(self.conn.change_window_attributes(
            window,
            &xproto::ChangeWindowAttributesAux::default().border_pixel(color),
        ));
    }

    #[inline]
    fn set_window_background_color(
        &self,
        window: Window,
        color: u32,
    ) {
        drop(self.conn.change_window_attributes(
            window,
            &xproto::ChangeWindowAttributesAux::default().background_pixel(color),
        ));
    }

    fn fill_rectangle(
        &self,
        window: Window,
        color: u32,
        region: &Region,
    ) {
        drop(
            self.conn
                .change_gc(self.gc, &xproto::ChangeGCAux::new().foreground(color)),
        );

        drop(self.conn.poly_fill_rectangle(window, self.gc, &[
            xproto::Rectangle {
                x: region.pos.x as i16,
                y: region.pos.y as i16,
                width: region.dim.w as u16,
                height: region.dim.h as u16,
            },
        ]));
    }

    fn get_window_attributes(
        &self,
        window: Window,
    ) -> Option<WindowAttributes> {
        let attributes = self
            .conn
            .get_window_attributes(window)
            .ok()?
            .reply()
            .ok()?;

        let geometry = self.conn.get_geometry(window).ok()?.reply().ok()?;

        Some(WindowAttributes {
            region: Region::new(
                geometry.x as i32,
                geometry.y as i32,
                geometry.width as i32,
                geometry.height as i32,
            ),
            border_width: geometry.border_width as i32,
            override_redirect: attributes.override_redirect,
            viewable: attributes.map_state == xproto::MapState::VIEWABLE,
        })
    }

    fn grab_keys(
        &self,
        key_codes: &[KeyCode],
    ) {
        let root = self.root();

        drop(
            self.conn
                .ungrab_key(xproto::Grab::ANY, root, xproto::ModMask::ANY),
        );

        for &m in &lock_variants(self.numlock.get()) {
            for key_code in key_codes {
                drop(self.conn.grab_key(
                    true,
                    root,
                    key_code.mask | m,
                    key_code.code,
                    xproto::GrabMode::ASYNC,
                    xproto::GrabMode::ASYNC,
                ));
            }
        }

        self.flush();
    }

    fn grab_buttons(
        &self,
        window: Window,
        shortcuts: &[&MouseShortcut],
        focused: bool,
    ) {
        self.ungrab_buttons(window);

        if !focused {
            drop(self.conn.grab_button(
                false,
                window,
                u32::from(self.button_event_mask) as u16,
                xproto::GrabMode::SYNC,
                xproto::GrabMode::SYNC,
                x11rb::NONE,
                x11rb::NONE,
                xproto::ButtonIndex::ANY,
                xproto::ModMask::ANY,
            ));
        }

        for &m in &lock_variants(self.numlock.get()) {
            for shortcut in shortcuts {
                if let Ok(button) = xproto::ButtonIndex::try_from(u8::from(shortcut.button)) {
                    drop(self.conn.grab_button(
                        false,
                        window,
                        u32::from(self.button_event_mask) as u16,
                        xproto::GrabMode::ASYNC,
                        xproto::GrabMode::SYNC,
                        x11rb::NONE,
                        x11rb::NONE,
                        button,
                        mask_of(&shortcut.modifiers) | m,
                    ));
                }
            }
        }
    }

    #[inline]
    fn ungrab_buttons(
        &self,
        window: Window,
    ) {
        drop(
            self.conn
                .ungrab_button(xproto::ButtonIndex::ANY, window, xproto::ModMask::ANY),
        );
    }

    #[inline]
    fn replay_pointer(&self) {
        drop(
            self.conn
                .allow_events(xproto::Allow::REPLAY_POINTER, x11rb::CURRENT_TIME),
        );
    }

    fn grab_pointer(
        &self,
        cursor: CursorKind,
    ) -> bool {
        let cursor = self.cursors.get(&cursor).copied().unwrap_or(x11rb::NONE);

        self.conn
            .grab_pointer(
                false,
                self.root(),
                u32::from(self.drag_event_mask) as u16,
                xproto::GrabMode::ASYNC,
                xproto::GrabMode::ASYNC,
                x11rb::NONE,
                cursor,
                x11rb::CURRENT_TIME,
            )
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .map_or(false, |reply| reply.status == xproto::GrabStatus::SUCCESS)
    }

    #[inline]
    fn release_pointer(&self) {
        drop(self.conn.ungrab_pointer(x11rb::CURRENT_TIME));
    }

    #[inline]
    fn warp_pointer_rpos(
        &self,
        window: Window,
        pos: Pos,
    ) {
        drop(
            self.conn
                .warp_pointer(x11rb::NONE, window, 0, 0, 0, 0, pos.x as i16, pos.y as i16),
        );
    }

    fn refresh_modifiers(&self) {
        let setup = self.conn.setup();
        let min_keycode = setup.min_keycode;
        let count = setup.max_keycode - min_keycode + 1;

        let modifiers = self
            .conn
            .get_modifier_mapping()
            .ok()
            .and_then(|cookie| cookie.reply().ok());

        let keyboard = self
            .conn
            .get_keyboard_mapping(min_keycode, count)
            .ok()
            .and_then(|cookie| cookie.reply().ok());

        let mut numlock = 0;

        if let (Some(modifiers), Some(keyboard)) = (modifiers, keyboard) {
            let per_modifier = modifiers.keycodes_per_modifier() as usize;
            let per_keycode = keyboard.keysyms_per_keycode as usize;

            for (i, keycodes) in modifiers.keycodes.chunks(per_modifier.max(1)).enumerate() {
                let is_numlock = keycodes.iter().any(|&keycode| {
                    if keycode < min_keycode {
                        return false;
                    }

                    let start = (keycode - min_keycode) as usize * per_keycode;
                    keyboard
                        .keysyms
                        .get(start..start + per_keycode)
                        .map_or(false, |keysyms| keysyms.contains(&XK_NUM_LOCK))
                });

                if is_numlock && i < 8 {
                    numlock = 1 << i;
                }
            }
        }

        self.numlock.set(numlock);
    }

    #[inline]
    fn focus_window(
        &self,
        window: Window,
    ) {
        drop(self.conn.set_input_focus(
            xproto::InputFocus::POINTER_ROOT,
            window,
            x11rb::CURRENT_TIME,
        ));

        drop(self.conn.change_property32(
            xproto::PropMode::REPLACE,
            self.root(),
            self.atoms._NET_ACTIVE_WINDOW,
            xproto::AtomEnum::WINDOW,
            &[window],
        ));
    }

    #[inline]
    fn unfocus(&self) {
        drop(self.conn.set_input_focus(
            xproto::InputFocus::POINTER_ROOT,
            self.root(),
            x11rb::CURRENT_TIME,
        ));

        drop(
            self.conn
                .delete_property(self.root(), self.atoms._NET_ACTIVE_WINDOW),
        );
    }

    fn take_focus(
        &self,
        window: Window,
    ) -> bool {
        let protocols = &[self.atoms.WM_TAKE_FOCUS];

        self.window_has_any_of_protocols(window, protocols)
            && self
                .send_protocol_client_message(window, self.atoms.WM_TAKE_FOCUS)
                .is_ok()
    }

    fn get_icccm_window_state(
        &self,
        window: Window,
    ) -> Option<IcccmWindowState> {
        let state = self.get_property32(window, self.atoms.WM_STATE, self.atoms.WM_STATE);

        match state.first()? {
            0 => Some(IcccmWindowState::Withdrawn),
            1 => Some(IcccmWindowState::Normal),
            3 => Some(IcccmWindowState::Iconic),
            _ => None,
        }
    }

    #[inline]
    fn set_icccm_window_state(
        &self,
        window: Window,
        state: IcccmWindowState,
    ) {
        drop(self.conn.change_property32(
            xproto::PropMode::REPLACE,
            window,
            self.atoms.WM_STATE,
            self.atoms.WM_STATE,
            &[
                match state {
                    IcccmWindowState::Withdrawn => 0,
                    IcccmWindowState::Normal => 1,
                    IcccmWindowState::Iconic => 3,
                },
                x11rb::NONE,
            ],
        ));
    }

    fn get_icccm_window_name(
        &self,
        window: Window,
    ) -> Option<String> {
        self.get_text_property(window, self.atoms._NET_WM_NAME, self.atoms.UTF8_STRING)
            .or_else(|| {
                self.get_text_property(
                    window,
                    self.atoms.WM_NAME,
                    u32::from(xproto::AtomEnum::ANY),
                )
            })
    }

    #[inline]
    fn get_root_window_name(&self) -> Option<String> {
        self.get_text_property(
            self.root(),
            self.atoms.WM_NAME,
            u32::from(xproto::AtomEnum::ANY),
        )
    }

    fn get_icccm_window_transient_for(
        &self,
        window: Window,
    ) -> Option<Window> {
        self.get_property32(window, self.atoms.WM_TRANSIENT_FOR, self.atoms.WINDOW)
            .first()
            .copied()
            .filter(|&transient_for| transient_for != x11rb::NONE)
    }

    fn get_icccm_window_hints(
        &self,
        window: Window,
    ) -> Option<Hints> {
        let hints = properties::WmHints::get(self.conn, window)
            .ok()?
            .reply()
            .ok()?;

        Some(Hints {
            urgent: hints.urgent,
            input: hints.input,
            group: hints.window_group,
        })
    }

    fn set_icccm_window_urgency(
        &self,
        window: Window,
        urgent: bool,
    ) {
        let hints = properties::WmHints::get(self.conn, window)
            .ok()
            .and_then(|cookie| cookie.reply().ok());

        if let Some(mut hints) = hints {
            hints.urgent = urgent;
            drop(hints.set(self.conn, window));
        }
    }

    fn get_icccm_window_size_hints(
        &self,
        window: Window,
    ) -> SizeHints {
        properties::WmSizeHints::get_normal_hints(self.conn, window)
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .map_or(SizeHints::default(), |hints| {
                SizeHints::new(
                    hints.base_size,
                    hints.min_size,
                    hints.max_size,
                    hints.size_increment,
                    hints.aspect.map(|(min, max)| {
                        (
                            (min.numerator, min.denominator),
                            (max.numerator, max.denominator),
                        )
                    }),
                )
            })
    }

    fn init_wm_properties(
        &self,
        wm_name: &str,
    ) {
        let root = self.root();

        drop(self.conn.change_property32(
            xproto::PropMode::REPLACE,
            self.check_window,
            self.atoms._NET_SUPPORTING_WM_CHECK,
            self.atoms.WINDOW,
            &[self.check_window],
        ));

        drop(self.conn.change_property8(
            xproto::PropMode::REPLACE,
            self.check_window,
            self.atoms._NET_WM_NAME,
            self.atoms.UTF8_STRING,
            wm_name.as_bytes(),
        ));

        drop(self.conn.change_property32(
            xproto::PropMode::REPLACE,
            root,
            self.atoms._NET_SUPPORTING_WM_CHECK,
            self.atoms.WINDOW,
            &[self.check_window],
        ));

        drop(self.conn.change_property32(
            xproto::PropMode::REPLACE,
            root,
            self.atoms._NET_SUPPORTED,
            self.atoms.ATOM,
            &[
                self.atoms._NET_SUPPORTED,
                self.atoms._NET_WM_NAME,
                self.atoms._NET_WM_STATE,
                self.atoms._NET_SUPPORTING_WM_CHECK,
                self.atoms._NET_WM_STATE_FULLSCREEN,
                self.atoms._NET_ACTIVE_WINDOW,
                self.atoms._NET_WM_WINDOW_TYPE,
                self.atoms._NET_WM_WINDOW_TYPE_DIALOG,
                self.atoms._NET_CLIENT_LIST,
            ],
        ));

        drop(
            self.conn
                .delete_property(root, self.atoms._NET_CLIENT_LIST),
        );
    }

    #[inline]
    fn append_client_list(
        &self,
        window: Window,
    ) {
        drop(self.conn.change_property32(
            xproto::PropMode::APPEND,
            self.root(),
            self.atoms._NET_CLIENT_LIST,
            xproto::AtomEnum::WINDOW,
            &[window],
        ));
    }

    #[inline]
    fn update_client_list(
        &self,
        clients: &[Window],
    ) {
        drop(self.conn.change_property32(
            xproto::PropMode::REPLACE,
            self.root(),
            self.atoms._NET_CLIENT_LIST,
            xproto::AtomEnum::WINDOW,
            clients,
        ));
    }

    fn set_window_fullscreen(
        &self,
        window: Window,
        on: bool,
    ) {
        let states: &[u32] = if on {
            &[self.atoms._NET_WM_STATE_FULLSCREEN]
        } else {
            &[]
        };

        drop(self.conn.change_property32(
            xproto::PropMode::REPLACE,
            window,
            self.atoms._NET_WM_STATE,
            xproto::AtomEnum::ATOM,
            states,
        ));
    }

    #[inline]
    fn window_is_fullscreen(
        &self,
        window: Window,
    ) -> bool {
        self.get_property32(window, self.atoms._NET_WM_STATE, self.atoms.ATOM)
            .contains(&self.atoms._NET_WM_STATE_FULLSCREEN)
    }

    fn get_window_preferred_type(
        &self,
        window: Window,
    ) -> WindowType {
        self.get_property32(window, self.atoms._NET_WM_WINDOW_TYPE, self.atoms.ATOM)
            .iter()
            .find_map(|atom| self.type_map.get(atom).copied())
            .unwrap_or(WindowType::Normal)
    }

    fn get_xembed_info(
        &self,
        window: Window,
    ) -> Option<XembedInfo> {
        let info = self.get_property32(window, self.atoms._XEMBED_INFO, self.atoms._XEMBED_INFO);

        if info.len() < 2 {
            return None;
        }

        Some(XembedInfo {
            version: info[0],
            flags: info[1],
        })
    }

    fn send_xembed_message(
        &self,
        window: Window,
        message: XembedMessage,
        embedder: Window,
    ) {
        drop(self.send_client_message(
            window,
            self.atoms._XEMBED,
            [
                x11rb::CURRENT_TIME,
                message.opcode(),
                0,
                embedder,
                XembedMessage::PROTOCOL_VERSION,
            ],
            EventMask::STRUCTURE_NOTIFY,
        ));
    }
}
