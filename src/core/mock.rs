use winsys::connection::Connection;
use winsys::connection::CursorKind;
use winsys::event::ConfigureRequest;
use winsys::event::Event;
use winsys::geometry::Pos;
use winsys::geometry::Region;
use winsys::hints::Hints;
use winsys::hints::SizeHints;
use winsys::hints::XembedInfo;
use winsys::hints::XembedMessage;
use winsys::input::KeyCode;
use winsys::input::MouseShortcut;
use winsys::window::IcccmWindowState;
use winsys::window::Window;
use winsys::window::WindowAttributes;
use winsys::window::WindowType;
use winsys::Result;

use std::cell::Cell;
use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::VecDeque;

/// Requests the model issued that tests assert on.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    InitWmProperties,
    CreateBar,
    CreateSystray,
    ClaimSystray(Window),
    DestroyWindow(Window),
    MapWindow(Window),
    UnmapWindow(Window),
    ConfigureWindow(Window, Region, u32),
    PlaceWindow(Window, Region),
    ReleaseWindow(Window, u32),
    ConfigureNotify(Window, Region, u32),
    ForwardConfigure(Window),
    SetState(Window, IcccmWindowState),
    Urgency(Window, bool),
    Reparent(Window, Window),
    Focus(Window),
    Unfocus,
    UpdateClientList(Vec<Window>),
    Xembed(Window, XembedMessage, Window),
    Kill(Window),
    Cleanup,
}

/// An in-memory display server: answers queries from canned window
/// attributes and records every state-changing request.
pub struct MockConnection {
    screen: Region,
    windows: RefCell<HashMap<Window, WindowAttributes>>,
    events: RefCell<VecDeque<Event>>,
    calls: RefCell<Vec<Call>>,
    hints: RefCell<HashMap<Window, Hints>>,
    size_hints: RefCell<HashMap<Window, SizeHints>>,
    xembed_info: RefCell<HashMap<Window, XembedInfo>>,
    next_window: Cell<Window>,
    refuse_systray: Cell<bool>,
}

impl MockConnection {
    pub fn new(screen: Region) -> Self {
        Self {
            screen,
            windows: RefCell::new(HashMap::new()),
            events: RefCell::new(VecDeque::new()),
            calls: RefCell::new(Vec::new()),
            hints: RefCell::new(HashMap::new()),
            size_hints: RefCell::new(HashMap::new()),
            xembed_info: RefCell::new(HashMap::new()),
            next_window: Cell::new(0x1000),
            refuse_systray: Cell::new(false),
        }
    }

    pub fn add_window(
        &self,
        window: Window,
        attrs: WindowAttributes,
    ) {
        self.windows.borrow_mut().insert(window, attrs);
    }

    pub fn set_hints(
        &self,
        window: Window,
        hints: Hints,
    ) {
        self.hints.borrow_mut().insert(window, hints);
    }

    pub fn set_size_hints(
        &self,
        window: Window,
        size_hints: SizeHints,
    ) {
        self.size_hints.borrow_mut().insert(window, size_hints);
    }

    pub fn set_xembed_info(
        &self,
        window: Window,
        info: XembedInfo,
    ) {
        self.xembed_info.borrow_mut().insert(window, info);
    }

    pub fn push_event(
        &self,
        event: Event,
    ) {
        self.events.borrow_mut().push_back(event);
    }

    pub fn refuse_systray(&self) {
        self.refuse_systray.set(true);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn called(
        &self,
        predicate: impl Fn(&Call) -> bool,
    ) -> bool {
        self.calls.borrow().iter().any(predicate)
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    fn record(
        &self,
        call: Call,
    ) {
        self.calls.borrow_mut().push(call);
    }

    fn fresh_window(&self) -> Window {
        let window = self.next_window.get();
        self.next_window.set(window + 1);
        window
    }
}

impl Connection for MockConnection {
    fn flush(&self) -> bool {
        true
    }

    fn sync(&self) {}

    fn step(&self) -> Option<Event> {
        self.events.borrow_mut().pop_front()
    }

    fn screen_region(&self) -> Region {
        self.screen
    }

    fn top_level_windows(&self) -> Vec<Window> {
        Vec::new()
    }

    fn get_pointer_position(&self) -> Option<Pos> {
        Some(Pos::default())
    }

    fn discard_enter_events(&self) {}

    fn cleanup(&self) {
        self.record(Call::Cleanup);
    }

    fn create_bar(
        &self,
        _region: Region,
        _background: u32,
    ) -> Result<Window> {
        self.record(Call::CreateBar);
        Ok(self.fresh_window())
    }

    fn create_systray(
        &self,
        _region: Region,
        _background: u32,
    ) -> Result<Window> {
        self.record(Call::CreateSystray);
        Ok(self.fresh_window())
    }

    fn claim_systray_selection(
        &self,
        window: Window,
    ) -> bool {
        self.record(Call::ClaimSystray(window));
        !self.refuse_systray.get()
    }

    fn init_window(
        &self,
        _window: Window,
    ) {
    }

    fn init_icon(
        &self,
        _window: Window,
    ) {
    }

    fn release_window(
        &self,
        window: Window,
        border_width: u32,
    ) {
        self.record(Call::ReleaseWindow(window, border_width));
    }

    fn map_window(
        &self,
        window: Window,
    ) {
        self.record(Call::MapWindow(window));
    }

    fn map_window_raised(
        &self,
        window: Window,
    ) {
        self.record(Call::MapWindow(window));
    }

    fn map_subwindows(
        &self,
        _window: Window,
    ) {
    }

    fn unmap_window(
        &self,
        window: Window,
    ) {
        self.record(Call::UnmapWindow(window));
    }

    fn reparent_window(
        &self,
        window: Window,
        parent: Window,
        _pos: Pos,
    ) {
        self.record(Call::Reparent(window, parent));
    }

    fn destroy_window(
        &self,
        window: Window,
    ) {
        self.record(Call::DestroyWindow(window));
    }

    fn kill_window(
        &self,
        window: Window,
    ) -> bool {
        self.record(Call::Kill(window));
        true
    }

    fn place_window(
        &self,
        window: Window,
        region: &Region,
    ) {
        self.record(Call::PlaceWindow(window, *region));
    }

    fn configure_window(
        &self,
        window: Window,
        region: &Region,
        border_width: u32,
    ) {
        self.record(Call::ConfigureWindow(window, *region, border_width));
    }

    fn move_window(
        &self,
        _window: Window,
        _pos: Pos,
    ) {
    }

    fn raise_window(
        &self,
        _window: Window,
    ) {
    }

    fn stack_window_above(
        &self,
        _window: Window,
        _sibling: Option<Window>,
    ) {
    }

    fn stack_window_below(
        &self,
        _window: Window,
        _sibling: Option<Window>,
    ) {
    }

    fn forward_configure_request(
        &self,
        request: &ConfigureRequest,
    ) {
        self.record(Call::ForwardConfigure(request.window));
    }

    fn send_configure_notify(
        &self,
        window: Window,
        region: &Region,
        border_width: u32,
    ) {
        self.record(Call::ConfigureNotify(window, *region, border_width));
    }

    fn insert_window_in_save_set(
        &self,
        _window: Window,
    ) {
    }

    fn set_window_border_width(
        &self,
        _window: Window,
        _width: u32,
    ) {
    }

    fn set_window_border_color(
        &self,
        _window: Window,
        _color: u32,
    ) {
    }

    fn set_window_background_color(
        &self,
        _window: Window,
        _color: u32,
    ) {
    }

    fn fill_rectangle(
        &self,
        _window: Window,
        _color: u32,
        _region: &Region,
    ) {
    }

    fn get_window_attributes(
        &self,
        window: Window,
    ) -> Option<WindowAttributes> {
        self.windows.borrow().get(&window).copied()
    }

    fn grab_keys(
        &self,
        _key_codes: &[KeyCode],
    ) {
    }

    fn grab_buttons(
        &self,
        _window: Window,
        _shortcuts: &[&MouseShortcut],
        _focused: bool,
    ) {
    }

    fn ungrab_buttons(
        &self,
        _window: Window,
    ) {
    }

    fn replay_pointer(&self) {}

    fn grab_pointer(
        &self,
        _cursor: CursorKind,
    ) -> bool {
        true
    }

    fn release_pointer(&self) {}

    fn warp_pointer_rpos(
        &self,
        _window: Window,
        _pos: Pos,
    ) {
    }

    fn refresh_modifiers(&self) {}

    fn focus_window(
        &self,
        window: Window,
    ) {
        self.record(Call::Focus(window));
    }

    fn unfocus(&self) {
        self.record(Call::Unfocus);
    }

    fn take_focus(
        &self,
        _window: Window,
    ) -> bool {
        false
    }

    fn get_icccm_window_state(
        &self,
        _window: Window,
    ) -> Option<IcccmWindowState> {
        None
    }

    fn set_icccm_window_state(
        &self,
        window: Window,
        state: IcccmWindowState,
    ) {
        self.record(Call::SetState(window, state));
    }

    fn get_icccm_window_name(
        &self,
        _window: Window,
    ) -> Option<String> {
        None
    }

    fn get_root_window_name(&self) -> Option<String> {
        None
    }

    fn get_icccm_window_transient_for(
        &self,
        _window: Window,
    ) -> Option<Window> {
        None
    }

    fn get_icccm_window_hints(
        &self,
        window: Window,
    ) -> Option<Hints> {
        self.hints.borrow().get(&window).copied()
    }

    fn set_icccm_window_urgency(
        &self,
        window: Window,
        urgent: bool,
    ) {
        self.record(Call::Urgency(window, urgent));
    }

    fn get_icccm_window_size_hints(
        &self,
        window: Window,
    ) -> SizeHints {
        self.size_hints
            .borrow()
            .get(&window)
            .copied()
            .unwrap_or_default()
    }

    fn init_wm_properties(
        &self,
        _wm_name: &str,
    ) {
        self.record(Call::InitWmProperties);
    }

    fn append_client_list(
        &self,
        _window: Window,
    ) {
    }

    fn update_client_list(
        &self,
        clients: &[Window],
    ) {
        self.record(Call::UpdateClientList(clients.to_vec()));
    }

    fn set_window_fullscreen(
        &self,
        _window: Window,
        _on: bool,
    ) {
    }

    fn window_is_fullscreen(
        &self,
        _window: Window,
    ) -> bool {
        false
    }

    fn get_window_preferred_type(
        &self,
        _window: Window,
    ) -> WindowType {
        WindowType::Normal
    }

    fn get_xembed_info(
        &self,
        window: Window,
    ) -> Option<XembedInfo> {
        self.xembed_info.borrow().get(&window).copied()
    }

    fn send_xembed_message(
        &self,
        window: Window,
        message: XembedMessage,
        embedder: Window,
    ) {
        self.record(Call::Xembed(window, message, embedder));
    }
}
