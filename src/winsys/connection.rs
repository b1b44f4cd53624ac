use crate::event::ConfigureRequest;
use crate::event::Event;
use crate::geometry::Pos;
use crate::geometry::Region;
use crate::hints::Hints;
use crate::hints::SizeHints;
use crate::hints::XembedInfo;
use crate::hints::XembedMessage;
use crate::input::KeyCode;
use crate::input::MouseShortcut;
use crate::window::IcccmWindowState;
use crate::window::Window;
use crate::window::WindowAttributes;
use crate::window::WindowType;
use crate::Result;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CursorKind {
    Normal,
    Move,
    Resize,
}

pub trait Connection {
    fn flush(&self) -> bool;
    fn sync(&self);
    fn step(&self) -> Option<Event>;
    fn screen_region(&self) -> Region;
    fn top_level_windows(&self) -> Vec<Window>;
    fn get_pointer_position(&self) -> Option<Pos>;
    fn discard_enter_events(&self);
    fn cleanup(&self);

    // Window manipulation
    fn create_bar(
        &self,
        region: Region,
        background: u32,
    ) -> Result<Window>;
    fn create_systray(
        &self,
        region: Region,
        background: u32,
    ) -> Result<Window>;
    fn claim_systray_selection(
        &self,
        window: Window,
    ) -> bool;
    fn init_window(
        &self,
        window: Window,
    );
    fn init_icon(
        &self,
        window: Window,
    );
    fn release_window(
        &self,
        window: Window,
        border_width: u32,
    );
    fn map_window(
        &self,
        window: Window,
    );
    fn map_window_raised(
        &self,
        window: Window,
    );
    fn map_subwindows(
        &self,
        window: Window,
    );
    fn unmap_window(
        &self,
        window: Window,
    );
    fn reparent_window(
        &self,
        window: Window,
        parent: Window,
        pos: Pos,
    );
    fn destroy_window(
        &self,
        window: Window,
    );
    fn kill_window(
        &self,
        window: Window,
    ) -> bool;
    fn place_window(
        &self,
        window: Window,
        region: &Region,
    );
    fn configure_window(
        &self,
        window: Window,
        region: &Region,
        border_width: u32,
    );
    fn move_window(
        &self,
        window: Window,
        pos: Pos,
    );
    fn raise_window(
        &self,
        window: Window,
    );
    fn stack_window_above(
        &self,
        window: Window,
        sibling: Option<Window>,
    );
    fn stack_window_below(
        &self,
        window: Window,
        sibling: Option<Window>,
    );
    fn forward_configure_request(
        &self,
        request: &ConfigureRequest,
    );
    fn send_configure_notify(
        &self,
        window: Window,
        region: &Region,
        border_width: u32,
    );
    fn insert_window_in_save_set(
        &self,
        window: Window,
    );
    fn set_window_border_width(
        &self,
        window: Window,
        width: u32,
    );
    fn set_window_border_color(
        &self,
        window: Window,
        color: u32,
    );
    fn set_window_background_color(
        &self,
        window: Window,
        color: u32,
    );
    fn fill_rectangle(
        &self,
        window: Window,
        color: u32,
        region: &Region,
    );
    fn get_window_attributes(
        &self,
        window: Window,
    ) -> Option<WindowAttributes>;

    // Input
    fn grab_keys(
        &self,
        key_codes: &[KeyCode],
    );
    fn grab_buttons(
        &self,
        window: Window,
        shortcuts: &[&MouseShortcut],
        focused: bool,
    );
    fn ungrab_buttons(
        &self,
        window: Window,
    );
    fn replay_pointer(&self);
    fn grab_pointer(
        &self,
        cursor: CursorKind,
    ) -> bool;
    fn release_pointer(&self);
    fn warp_pointer_rpos(
        &self,
        window: Window,
        pos: Pos,
    );
    fn refresh_modifiers(&self);
    fn focus_window(
        &self,
        window: Window,
    );
    fn unfocus(&self);
    fn take_focus(
        &self,
        window: Window,
    ) -> bool;

    // ICCCM
    fn get_icccm_window_state(
        &self,
        window: Window,
    ) -> Option<IcccmWindowState>;
    fn set_icccm_window_state(
        &self,
        window: Window,
        state: IcccmWindowState,
    );
    fn get_icccm_window_name(
        &self,
        window: Window,
    ) -> Option<String>;
    fn get_root_window_name(&self) -> Option<String>;
    fn get_icccm_window_transient_for(
        &self,
        window: Window,
    ) -> Option<Window>;
    fn get_icccm_window_hints(
        &self,
        window: Window,
    ) -> Option<Hints>;
    fn set_icccm_window_urgency(
        &self,
        window: Window,
        urgent: bool,
    );
    fn get_icccm_window_size_hints(
        &self,
        window: Window,
    ) -> SizeHints;

    // EWMH
    fn init_wm_properties(
        &self,
        wm_name: &str,
    );
    fn append_client_list(
        &self,
        window: Window,
    );
    fn update_client_list(
        &self,
        clients: &[Window],
    );
    fn set_window_fullscreen(
        &self,
        window: Window,
        on: bool,
    );
    fn window_is_fullscreen(
        &self,
        window: Window,
    ) -> bool;
    fn get_window_preferred_type(
        &self,
        window: Window,
    ) -> WindowType;

    // XEMBED
    fn get_xembed_info(
        &self,
        window: Window,
    ) -> Option<XembedInfo>;
    fn send_xembed_message(
        &self,
        window: Window,
        message: XembedMessage,
        embedder: Window,
    );
}
