use crate::bar::Bar;
use crate::bar::BarContent;
use crate::bar::BlockBar;
use crate::binding::Click;
use crate::binding::ClickKind;
use crate::binding::KeyBindings;
use crate::binding::MouseBindings;
use crate::client::Client;
use crate::config::Config;
use crate::constrain::constrain;
use crate::defaults::TAGS_LEN;
use crate::defaults::TAG_MASK;
use crate::drag::Drag;
use crate::drag::DragKind;
use crate::layout;
use crate::monitor;
use crate::monitor::Monitor;
use crate::registry::ClientId;
use crate::registry::Registry;
use crate::systray::fit_icon_geometry;
use crate::systray::Icon;
use crate::systray::Systray;

use winsys::connection::Connection;
use winsys::connection::CursorKind;
use winsys::event::ConfigureRequest;
use winsys::event::Event;
use winsys::event::MappingKind;
use winsys::event::PropertyKind;
use winsys::event::ToggleAction;
use winsys::geometry::Dim;
use winsys::geometry::Pos;
use winsys::geometry::Region;
use winsys::hints::XembedMessage;
use winsys::input::KeyCode;
use winsys::input::MouseEvent;
use winsys::input::MouseEventKind;
use winsys::input::MouseShortcut;
use winsys::window::IcccmWindowState;
use winsys::window::Window;
use winsys::window::WindowAttributes;
use winsys::window::WindowType;
use winsys::Result;

use anyhow::anyhow;

use std::collections::VecDeque;

/// Lifecycle of the system tray. The tray is created on first use and
/// stays disabled for the rest of the session if it cannot be set up.
#[derive(Debug)]
enum TrayState {
    Pending,
    Active(Systray),
    Disabled,
}

pub struct Model<'a> {
    conn: &'a dyn Connection,
    config: Config,
    registry: Registry,
    monitor: Monitor,
    tray: TrayState,
    bar_window: Window,
    bar: Box<dyn Bar>,
    status: String,
    key_codes: Vec<KeyCode>,
    client_shortcuts: Vec<MouseShortcut>,
    drag: Option<Drag>,
    deferred: VecDeque<Event>,
    failure: Option<(u8, u8)>,
    running: bool,
}

impl<'a> Model<'a> {
    pub fn new(
        conn: &'a dyn Connection,
        config: Config,
        key_bindings: &KeyBindings,
        mouse_bindings: &MouseBindings,
    ) -> Result<Self> {
        let monitor = Monitor::new(
            conn.screen_region(),
            config.bar_height,
            config.top_bar,
            config.master_factor,
        );

        let bar_window = conn.create_bar(monitor.bar_region(), config.normal.background)?;
        let bar = Box::new(BlockBar::new(
            config.bar_height,
            config.normal,
            config.selected,
            config.show_title,
        ));

        let tray = if config.show_systray {
            TrayState::Pending
        } else {
            TrayState::Disabled
        };

        let model = Self {
            conn,
            config,
            registry: Registry::new(),
            monitor,
            tray,
            bar_window,
            bar,
            status: String::from(WM_NAME!()),
            key_codes: key_bindings.keys().copied().collect(),
            client_shortcuts: mouse_bindings
                .keys()
                .filter(|(kind, _)| *kind == ClickKind::ClientWindow)
                .map(|(_, shortcut)| shortcut.clone())
                .collect(),
            drag: None,
            deferred: VecDeque::new(),
            failure: None,
            running: true,
        };

        Ok(Self::init(model))
    }

    fn init(mut model: Self) -> Self {
        info!("initializing window manager");

        model.update_systray();
        model.update_status();

        model.conn.init_wm_properties(WM_NAME!());
        model.conn.grab_keys(&model.key_codes);

        model.focus(None);
        model.scan();

        model
    }

    pub fn run(
        &mut self,
        mut key_bindings: KeyBindings,
        mut mouse_bindings: MouseBindings,
    ) -> Result<()> {
        while self.running {
            let event = if self.drag.is_none() {
                self.deferred.pop_front()
            } else {
                None
            };

            if let Some(event) = event.or_else(|| self.conn.step()) {
                trace!("received event: {:?}", event);
                self.dispatch(event, &mut key_bindings, &mut mouse_bindings);
            }

            if !self.conn.flush() {
                error!("lost connection to the display server");
                self.running = false;
            }
        }

        self.cleanup();

        match self.failure {
            Some((request, error)) => Err(anyhow!(
                "fatal protocol error: request code={}, error code={}",
                request,
                error
            )),
            None => Ok(()),
        }
    }

    fn dispatch(
        &mut self,
        event: Event,
        key_bindings: &mut KeyBindings,
        mouse_bindings: &mut MouseBindings,
    ) {
        if self.drag.is_some() {
            match event {
                Event::Mouse {
                    event,
                } => return self.handle_drag_mouse(event),
                Event::ProtocolError {
                    ..
                } => {},
                ref event if event.is_drag_passthrough() => {},
                event => return self.deferred.push_back(event),
            }
        }

        match event {
            Event::Mouse {
                event,
            } => self.handle_mouse(event, mouse_bindings),
            Event::Key {
                key_code,
            } => self.handle_key(key_code, key_bindings),
            Event::MapRequest {
                window,
            } => self.handle_map_request(window),
            Event::Enter {
                window,
                on_root,
                normal,
            } => self.handle_enter(window, on_root, normal),
            Event::FocusIn {
                window,
            } => self.handle_focus_in(window),
            Event::Destroy {
                window,
            } => self.handle_destroy(window),
            Event::Expose {
                window,
                count,
            } => self.handle_expose(window, count),
            Event::Unmap {
                window,
                synthetic,
            } => self.handle_unmap(window, synthetic),
            Event::ConfigureRequest {
                request,
            } => self.handle_configure_request(request),
            Event::Configure {
                window,
                region,
                on_root,
            } => self.handle_configure(window, region, on_root),
            Event::ResizeRequest {
                window,
                dim,
            } => self.handle_resize_request(window, dim),
            Event::Property {
                window,
                kind,
                deleted,
                on_root,
            } => self.handle_property(window, kind, deleted, on_root),
            Event::FullscreenRequest {
                window,
                action,
            } => self.handle_fullscreen_request(window, action),
            Event::FocusRequest {
                window,
            } => self.handle_focus_request(window),
            Event::DockRequest {
                tray,
                window,
            } => self.handle_dock_request(tray, window),
            Event::Mapping {
                request,
            } => self.handle_mapping(request),
            Event::ProtocolError {
                request,
                error,
            } => self.handle_protocol_error(request, error),
        }
    }

    fn cleanup(&mut self) {
        info!("shutting down window manager");

        self.drag = None;
        self.deferred.clear();
        self.view(TAG_MASK);

        let stack = self.registry.stack().to_vec();
        for id in stack {
            self.unmanage(id, false);
        }

        if let TrayState::Active(tray) = std::mem::replace(&mut self.tray, TrayState::Disabled) {
            for icon in tray.icons() {
                self.conn.unmap_window(icon.window());
            }

            self.conn.unmap_window(tray.window());
            self.conn.destroy_window(tray.window());
        }

        self.conn.unmap_window(self.bar_window);
        self.conn.destroy_window(self.bar_window);

        self.conn.cleanup();
        self.conn.flush();
    }

    fn scan(&mut self) {
        let mut transients = Vec::new();

        for window in self.conn.top_level_windows() {
            let attrs = match self.conn.get_window_attributes(window) {
                Some(attrs) if !attrs.override_redirect => attrs,
                _ => continue,
            };

            let restorable = attrs.viewable
                || self.conn.get_icccm_window_state(window) == Some(IcccmWindowState::Iconic);

            if !restorable {
                continue;
            }

            if self.conn.get_icccm_window_transient_for(window).is_some() {
                transients.push((window, attrs));
            } else {
                self.manage(window, attrs);
            }
        }

        for (window, attrs) in transients {
            self.manage(window, attrs);
        }
    }

    #[inline]
    pub fn selected(&self) -> Option<ClientId> {
        self.monitor.selected()
    }

    #[inline]
    pub fn client(
        &self,
        id: ClientId,
    ) -> Option<&Client> {
        self.registry.get(id)
    }

    #[inline]
    fn window_of(
        &self,
        id: ClientId,
    ) -> Option<Window> {
        self.registry.get(id).map(Client::window)
    }

    #[inline]
    fn is_visible(
        &self,
        id: ClientId,
    ) -> bool {
        let tagset = self.monitor.active_tagset();
        self.registry
            .get(id)
            .map_or(false, |client| client.is_visible(tagset))
    }

    fn icon_window(
        &self,
        window: Window,
    ) -> bool {
        match &self.tray {
            TrayState::Active(tray) => tray.contains(window),
            _ => false,
        }
    }

    fn tray_window(&self) -> Option<Window> {
        match &self.tray {
            TrayState::Active(tray) => Some(tray.window()),
            _ => None,
        }
    }

    fn tray_width(&self) -> i32 {
        match &self.tray {
            TrayState::Active(tray) => tray.width(self.config.systray_spacing),
            _ => 0,
        }
    }

    fn grab_client_buttons(
        &self,
        window: Window,
        focused: bool,
    ) {
        let shortcuts: Vec<&MouseShortcut> = self.client_shortcuts.iter().collect();
        self.conn.grab_buttons(window, &shortcuts, focused);
    }

    fn manage(
        &mut self,
        window: Window,
        attrs: WindowAttributes,
    ) {
        if self.registry.find_by_window(window).is_some() {
            return;
        }

        info!("managing client with window {:#0x}", window);

        let border = self.config.border_width as i32;
        let area = self.monitor.window_area();
        let screen = self.monitor.screen();

        let mut client = Client::new(window, attrs.region, 0);
        client.set_old_border(attrs.border_width);

        let transient = self.conn.get_icccm_window_transient_for(window);
        let parent = transient.and_then(|parent| self.registry.find_by_window(parent));

        match parent.and_then(|parent| self.registry.get(parent)) {
            Some(parent) => client.set_tags(parent.tags()),
            None => client.set_tags(self.monitor.active_tagset()),
        }

        let mut region = client.region();
        if region.right() > area.right() {
            region.pos.x = area.right() - region.dim.w;
        }

        if region.bottom() > area.bottom() {
            region.pos.y = area.bottom() - region.dim.h;
        }

        region.pos.x = std::cmp::max(region.pos.x, area.pos.x);
        region.pos.y = std::cmp::max(region.pos.y, area.pos.y);

        client.replace_region(region);
        client.set_border(border);

        self.conn.set_window_border_width(window, border as u32);
        self.conn
            .set_window_border_color(window, self.config.normal.border);
        self.conn.send_configure_notify(window, &region, border as u32);

        let id = self.registry.insert(client);

        self.update_title(id);
        self.update_window_type(id);
        self.update_size_hints(id);
        self.update_wm_hints(id);

        if let Some(client) = self.registry.get_mut(id) {
            let region = client.region();
            let centered = region.with_pos(screen.center_of(region.dim, client.border()));

            client.replace_region(centered);
            client.set_float_region(centered);

            if !client.is_floating() {
                let floating = transient.is_some() || client.is_fixed();
                client.set_floating(floating);
                client.set_old_floating(floating);
            }
        }

        self.conn.init_window(window);
        self.grab_client_buttons(window, false);

        let (region, floating) = match self.registry.get(id) {
            Some(client) => (client.region(), client.is_floating()),
            None => return,
        };

        if floating {
            self.conn.raise_window(window);
        }

        self.registry.attach(id);
        self.registry.attach_stack(id);
        self.conn.append_client_list(window);

        // placed off-screen until the first arrange decides where it goes
        self.conn.place_window(
            window,
            &region.with_pos(Pos {
                x: region.pos.x + 2 * screen.dim.w,
                y: region.pos.y,
            }),
        );
        self.conn
            .set_icccm_window_state(window, IcccmWindowState::Normal);

        if let Some(selected) = self.monitor.selected() {
            self.unfocus(selected);
        }

        self.monitor.set_selected(Some(id));
        self.arrange();
        self.conn.map_window(window);
        self.focus(None);
    }

    fn unmanage(
        &mut self,
        id: ClientId,
        destroyed: bool,
    ) {
        if self.drag.as_ref().map_or(false, |drag| drag.client() == id) {
            self.drag = None;
            self.conn.release_pointer();
        }

        self.detach_stack(id);

        let client = match self.registry.remove(id) {
            Some(client) => client,
            None => return,
        };

        info!("unmanaging client with window {:#0x}", client.window());

        if !destroyed {
            self.conn
                .release_window(client.window(), client.old_border() as u32);
        }

        self.focus(None);
        self.conn.update_client_list(&self.registry.windows());
        self.arrange();
    }

    /// Removes `id` from the focus history, handing the selection to the
    /// most recently focused visible client if `id` held it.
    fn detach_stack(
        &mut self,
        id: ClientId,
    ) {
        self.registry.detach_stack(id);

        if self.monitor.selected() == Some(id) {
            let tagset = self.monitor.active_tagset();
            let next = self.registry.first_visible_in_stack(tagset);
            self.monitor.set_selected(next);
        }
    }

    fn update_title(
        &mut self,
        id: ClientId,
    ) {
        let window = match self.window_of(id) {
            Some(window) => window,
            None => return,
        };

        let name = self
            .conn
            .get_icccm_window_name(window)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.status.clone());

        if let Some(client) = self.registry.get_mut(id) {
            client.set_name(name);
        }
    }

    fn update_size_hints(
        &mut self,
        id: ClientId,
    ) {
        if let Some(window) = self.window_of(id) {
            let size_hints = self.conn.get_icccm_window_size_hints(window);

            if let Some(client) = self.registry.get_mut(id) {
                client.set_size_hints(size_hints);
            }
        }
    }

    fn update_wm_hints(
        &mut self,
        id: ClientId,
    ) {
        let window = match self.window_of(id) {
            Some(window) => window,
            None => return,
        };

        let hints = match self.conn.get_icccm_window_hints(window) {
            Some(hints) => hints,
            None => return,
        };

        let selected = self.monitor.selected() == Some(id);

        if selected && hints.urgent {
            self.conn.set_icccm_window_urgency(window, false);
        }

        if let Some(client) = self.registry.get_mut(id) {
            if !selected || !hints.urgent {
                client.set_urgent(hints.urgent);
            }

            client.set_never_focus(hints.input == Some(false));
        }
    }

    fn update_window_type(
        &mut self,
        id: ClientId,
    ) {
        let window = match self.window_of(id) {
            Some(window) => window,
            None => return,
        };

        if self.conn.window_is_fullscreen(window) {
            self.set_fullscreen(id, true);
        }

        if self.conn.get_window_preferred_type(window) == WindowType::Dialog {
            if let Some(client) = self.registry.get_mut(id) {
                client.set_floating(true);
            }
        }
    }

    fn update_status(&mut self) {
        self.status = self
            .conn
            .get_root_window_name()
            .unwrap_or_else(|| String::from(WM_NAME!()));

        self.draw_bar();
        self.update_systray();
    }

    fn set_urgent(
        &mut self,
        id: ClientId,
        urgent: bool,
    ) {
        if let Some(client) = self.registry.get_mut(id) {
            client.set_urgent(urgent);
            self.conn.set_icccm_window_urgency(client.window(), urgent);
        }
    }

    /// Gives input focus to the client, or to the most recently focused
    /// visible client when `target` is absent or hidden.
    pub fn focus(
        &mut self,
        target: Option<ClientId>,
    ) {
        let target = target
            .filter(|&id| self.is_visible(id))
            .or_else(|| self.focus_fallback());

        if let Some(selected) = self.monitor.selected() {
            if Some(selected) != target {
                self.unfocus(selected);
            }
        }

        match target {
            Some(id) => {
                if self.registry.get(id).map_or(false, Client::is_urgent) {
                    self.set_urgent(id, false);
                }

                self.registry.detach_stack(id);
                self.registry.attach_stack(id);

                if let Some(window) = self.window_of(id) {
                    debug!("focusing client with window {:#0x}", window);

                    self.grab_client_buttons(window, true);
                    self.conn
                        .set_window_border_color(window, self.config.selected.border);
                }

                self.set_focus(id);
            },
            None => self.conn.unfocus(),
        }

        self.monitor.set_selected(target);
        self.draw_bar();
    }

    /// The most recently focused visible client, preferring those that
    /// accept input focus.
    fn focus_fallback(&self) -> Option<ClientId> {
        let tagset = self.monitor.active_tagset();

        self.registry
            .stack()
            .iter()
            .copied()
            .find(|&id| {
                self.registry.get(id).map_or(false, |client| {
                    client.is_visible(tagset) && !client.never_focus()
                })
            })
            .or_else(|| self.registry.first_visible_in_stack(tagset))
    }

    fn set_focus(
        &self,
        id: ClientId,
    ) {
        if let Some(client) = self.registry.get(id) {
            if !client.never_focus() {
                self.conn.focus_window(client.window());
            }

            self.conn.take_focus(client.window());
        }
    }

    fn unfocus(
        &self,
        id: ClientId,
    ) {
        if let Some(window) = self.window_of(id) {
            debug!("unfocusing client with window {:#0x}", window);

            self.grab_client_buttons(window, false);
            self.conn
                .set_window_border_color(window, self.config.normal.border);
        }
    }

    pub fn arrange(&mut self) {
        self.show_hide();
        self.apply_layout();
        self.restack();
    }

    fn show_hide(&mut self) {
        let tagset = self.monitor.active_tagset();
        let stack = self.registry.stack().to_vec();

        for &id in stack.iter() {
            let (window, region, floating, fullscreen) = match self.registry.get(id) {
                Some(client) if client.is_visible(tagset) => (
                    client.window(),
                    client.region(),
                    client.is_floating(),
                    client.is_fullscreen(),
                ),
                _ => continue,
            };

            self.conn.move_window(window, region.pos);

            if floating && !fullscreen {
                self.resize(id, region, false);
            }
        }

        for &id in stack.iter().rev() {
            if let Some(client) = self.registry.get(id) {
                if !client.is_visible(tagset) {
                    self.conn.move_window(client.window(), Pos {
                        x: -2 * client.outer_dim().w,
                        y: client.region().pos.y,
                    });
                }
            }
        }
    }

    fn apply_layout(&mut self) {
        let tagset = self.monitor.active_tagset();
        let tiled = self.registry.tiled(tagset);

        let borders: Vec<i32> = tiled
            .iter()
            .filter_map(|&id| self.registry.get(id).map(Client::border))
            .collect();

        let regions = layout::tile(self.monitor.window_area(), self.monitor.mfact(), &borders);

        for (id, region) in tiled.into_iter().zip(regions.into_iter()) {
            self.resize(id, region, false);
        }
    }

    fn restack(&mut self) {
        self.draw_bar();

        let selected = match self.monitor.selected() {
            Some(selected) => selected,
            None => return,
        };

        if let Some(client) = self.registry.get(selected) {
            if client.is_floating() {
                self.conn.raise_window(client.window());
            }
        }

        let tagset = self.monitor.active_tagset();
        let mut sibling = self.bar_window;

        for &id in self.registry.stack() {
            if let Some(client) = self.registry.get(id) {
                if client.is_tiled(tagset) {
                    self.conn
                        .stack_window_below(client.window(), Some(sibling));
                    sibling = client.window();
                }
            }
        }

        self.conn.discard_enter_events();
    }

    fn resize(
        &mut self,
        id: ClientId,
        region: Region,
        interactive: bool,
    ) {
        let (region, changed) = match self.registry.get(id) {
            Some(client) => constrain(&self.monitor, client, region, interactive),
            None => return,
        };

        if changed {
            self.resize_client(id, region);
        }
    }

    fn resize_client(
        &mut self,
        id: ClientId,
        region: Region,
    ) {
        let tagset = self.monitor.active_tagset();
        let tiled = self.registry.tiled(tagset);
        let lone = tiled.len() == 1 && tiled[0] == id;

        let client = match self.registry.get_mut(id) {
            Some(client) => client,
            None => return,
        };

        client.set_region(region);

        let mut region = region;
        let mut border = client.border();

        if lone && !client.is_fullscreen() && !client.is_floating() {
            region = region.with_border(border);
            border = 0;
            client.replace_region(region);
        }

        let window = client.window();
        self.conn.configure_window(window, &region, border as u32);
        self.conn.send_configure_notify(window, &region, border as u32);
    }

    fn set_fullscreen(
        &mut self,
        id: ClientId,
        on: bool,
    ) {
        let (window, fullscreen) = match self.registry.get(id) {
            Some(client) => (client.window(), client.is_fullscreen()),
            None => return,
        };

        if on && !fullscreen {
            info!("enabling fullscreen for client with window {:#0x}", window);

            self.conn.set_window_fullscreen(window, true);

            if let Some(client) = self.registry.get_mut(id) {
                client.set_fullscreen(true);
                client.set_old_floating(client.is_floating());
                client.set_old_border(client.border());
                client.set_border(0);
                client.set_floating(true);
            }

            self.resize_client(id, self.monitor.screen());
            self.conn.raise_window(window);
        } else if !on && fullscreen {
            info!("disabling fullscreen for client with window {:#0x}", window);

            self.conn.set_window_fullscreen(window, false);

            let region = match self.registry.get_mut(id) {
                Some(client) => {
                    client.set_fullscreen(false);
                    client.set_floating(client.old_floating());
                    client.set_border(client.old_border());
                    client.old_region()
                },
                None => return,
            };

            self.resize_client(id, region);
            self.arrange();
        }
    }

    fn toggle_client_floating(
        &mut self,
        id: ClientId,
    ) {
        let client = match self.registry.get_mut(id) {
            Some(client) if !client.is_fullscreen() => client,
            _ => return,
        };

        let floating = !client.is_floating() || client.is_fixed();
        client.set_floating(floating);

        if floating {
            let float_region = client.float_region();
            self.resize(id, float_region, false);
        } else {
            let region = client.region();
            client.set_float_region(region);
        }

        self.arrange();
    }

    fn draw_bar(&mut self) {
        let tray_width = self.tray_width();
        let mut region = self.monitor.bar_region();
        region.dim.w -= tray_width;

        self.conn.place_window(self.bar_window, &region);

        let (occupied, urgent) = self.registry.iter().fold((0, 0), |(occupied, urgent), (_, client)| {
            let urgent = if client.is_urgent() {
                urgent | client.tags()
            } else {
                urgent
            };

            (occupied | client.tags(), urgent)
        });

        let registry = &self.registry;
        let selected = self.monitor.selected().and_then(|id| registry.get(id));

        let content = BarContent {
            tag_names: &self.config.tag_names,
            tagset: self.monitor.active_tagset(),
            occupied,
            urgent,
            selected_tags: selected.map_or(0, Client::tags),
            title: selected.map(Client::name),
            floating: selected.map_or(false, Client::is_floating),
            fixed: selected.map_or(false, Client::is_fixed),
            status: &self.status,
            systray_width: tray_width,
        };

        self.bar.draw(self.conn, self.bar_window, region, &content);
    }

    fn update_systray(&mut self) {
        if let TrayState::Pending = self.tray {
            let region = Region::new(
                self.monitor.screen().right(),
                self.monitor.bar_y(),
                Systray::MIN_WIDTH,
                self.monitor.bar_height(),
            );

            self.tray = match self
                .conn
                .create_systray(region, self.config.selected.background)
            {
                Ok(window) if self.conn.claim_systray_selection(window) => {
                    info!("acquired system tray selection with window {:#0x}", window);
                    TrayState::Active(Systray::new(window))
                },
                Ok(window) => {
                    warn!("unable to obtain system tray selection");
                    self.conn.destroy_window(window);
                    TrayState::Disabled
                },
                Err(e) => {
                    warn!("unable to create system tray: {}", e);
                    TrayState::Disabled
                },
            };
        }

        let conn = self.conn;
        let background = self.config.normal.background;
        let spacing = self.config.systray_spacing;

        let tray = match &mut self.tray {
            TrayState::Active(tray) => tray,
            _ => return,
        };

        let region = tray.layout(&self.monitor, spacing);

        for icon in tray.icons() {
            conn.set_window_background_color(icon.window(), background);

            if icon.mapped {
                conn.map_window_raised(icon.window());
            }

            conn.place_window(icon.window(), &icon.client.region());
        }

        conn.place_window(tray.window(), &region);
        conn.stack_window_above(tray.window(), Some(self.bar_window));
        conn.map_window(tray.window());
        conn.map_subwindows(tray.window());
        conn.fill_rectangle(
            tray.window(),
            background,
            &Region::new(0, 0, region.dim.w, region.dim.h),
        );
        conn.sync();

        let mut bar_region = self.monitor.bar_region();
        bar_region.dim.w -= region.dim.w;
        conn.place_window(self.bar_window, &bar_region);
    }

    fn update_icon_state(
        &mut self,
        window: Window,
    ) {
        let info = match self.conn.get_xembed_info(window) {
            Some(info) => info,
            None => return,
        };

        let conn = self.conn;
        let tray = match &mut self.tray {
            TrayState::Active(tray) => tray,
            _ => return,
        };

        let tray_window = tray.window();
        let icon = match tray.icon_mut(window) {
            Some(icon) => icon,
            None => return,
        };

        let message = if info.is_mapped() && !icon.mapped {
            icon.mapped = true;
            conn.map_window_raised(window);
            conn.set_icccm_window_state(window, IcccmWindowState::Normal);
            XembedMessage::WindowActivate
        } else if !info.is_mapped() && icon.mapped {
            icon.mapped = false;
            conn.unmap_window(window);
            conn.set_icccm_window_state(window, IcccmWindowState::Withdrawn);
            XembedMessage::WindowDeactivate
        } else {
            return;
        };

        conn.send_xembed_message(window, message, tray_window);
    }

    fn fit_icon(
        &mut self,
        window: Window,
        dim: Option<Dim>,
        refresh_hints: bool,
    ) {
        let size_hints = if refresh_hints {
            Some(self.conn.get_icccm_window_size_hints(window))
        } else {
            None
        };

        if let TrayState::Active(tray) = &mut self.tray {
            if let Some(icon) = tray.icon_mut(window) {
                if let Some(size_hints) = size_hints {
                    icon.client.set_size_hints(size_hints);
                }

                let dim = dim.unwrap_or(icon.client.region().dim);
                fit_icon_geometry(&self.monitor, &mut icon.client, dim);
            }
        }
    }

    fn handle_mouse(
        &mut self,
        event: MouseEvent,
        mouse_bindings: &mut MouseBindings,
    ) {
        if event.kind != MouseEventKind::Press {
            return;
        }

        let mut click = Click {
            kind: ClickKind::Root,
            window: None,
            tag: None,
        };

        if event.window == self.bar_window {
            click.tag = self.bar.tag_at(event.window_rpos.x, TAGS_LEN);
            click.kind = if click.tag.is_some() {
                ClickKind::TagBar
            } else {
                ClickKind::StatusBar
            };
        } else if let Some(id) = self.registry.find_by_window(event.window) {
            self.focus(Some(id));
            self.restack();
            self.conn.replay_pointer();

            click.kind = ClickKind::ClientWindow;
            click.window = Some(event.window);
        }

        debug!("processing {} click with {:?}", click.kind.to_string(), event.shortcut);

        if let Some(action) = mouse_bindings.get_mut(&(click.kind, event.shortcut)) {
            action(self, click);
        }
    }

    fn handle_drag_mouse(
        &mut self,
        event: MouseEvent,
    ) {
        match event.kind {
            MouseEventKind::Motion => self.handle_drag_motion(event.root_rpos, event.time),
            MouseEventKind::Release => self.stop_drag(),
            MouseEventKind::Press => {},
        }
    }

    fn handle_drag_motion(
        &mut self,
        pos: Pos,
        time: u32,
    ) {
        let throttle = self.config.motion_throttle_ms;
        let drag = match &mut self.drag {
            Some(drag) => drag,
            None => return,
        };

        if !drag.accept_motion(time, throttle) {
            return;
        }

        let id = drag.client();
        let (border, floating) = match self.registry.get(id) {
            Some(client) => (client.border(), client.is_floating()),
            None => return,
        };

        let kind = drag.kind();
        let moved = drag.moved_pos(pos);
        let dim = drag.resized_dim(pos, border);

        if kind == DragKind::Resize && !floating {
            let area = self.monitor.window_area();

            if dim.w > area.dim.w || dim.h > area.dim.h {
                return;
            }
        }

        if !floating {
            self.toggle_client_floating(id);
        }

        // floating geometry is only known once the toggle has restored it
        let region = match self.registry.get(id) {
            Some(client) if client.is_floating() => client.region(),
            _ => return,
        };

        let target = match kind {
            DragKind::Move => region.with_pos(moved),
            DragKind::Resize => region.with_dim(dim),
        };

        self.resize(id, target, true);
    }

    fn stop_drag(&mut self) {
        let drag = match self.drag.take() {
            Some(drag) => drag,
            None => return,
        };

        if drag.kind() == DragKind::Resize {
            if let Some(client) = self.registry.get(drag.client()) {
                self.conn.warp_pointer_rpos(client.window(), Self::resize_grip(client));
            }
        }

        self.conn.release_pointer();

        if drag.kind() == DragKind::Resize {
            self.conn.discard_enter_events();
            self.deferred.retain(|event| {
                !matches!(event, Event::Enter {
                    ..
                })
            });
        }
    }

    #[inline]
    fn resize_grip(client: &Client) -> Pos {
        let region = client.region();

        Pos {
            x: region.dim.w + client.border() - 1,
            y: region.dim.h + client.border() - 1,
        }
    }

    fn handle_key(
        &mut self,
        key_code: KeyCode,
        key_bindings: &mut KeyBindings,
    ) {
        if let Some(action) = key_bindings.get_mut(&key_code) {
            debug!("processing key binding: {:?}", key_code);
            action(self);
        }
    }

    fn handle_map_request(
        &mut self,
        window: Window,
    ) {
        debug!("MAP_REQUEST for window {:#0x}", window);

        if let Some(tray) = self.tray_window() {
            if self.icon_window(window) {
                self.conn
                    .send_xembed_message(window, XembedMessage::WindowActivate, tray);
                self.update_systray();
                return;
            }
        }

        match self.conn.get_window_attributes(window) {
            Some(attrs) if !attrs.override_redirect => self.manage(window, attrs),
            _ => {},
        }
    }

    fn handle_enter(
        &mut self,
        window: Window,
        on_root: bool,
        normal: bool,
    ) {
        if !normal && !on_root {
            return;
        }

        debug!("ENTER for window {:#0x}", window);

        if let Some(id) = self.registry.find_by_window(window) {
            if self.monitor.selected() != Some(id) {
                self.focus(Some(id));
            }
        }
    }

    fn handle_focus_in(
        &mut self,
        window: Window,
    ) {
        if let Some(selected) = self.monitor.selected() {
            if self.window_of(selected) != Some(window) {
                self.set_focus(selected);
            }
        }
    }

    fn handle_destroy(
        &mut self,
        window: Window,
    ) {
        debug!("DESTROY for window {:#0x}", window);

        if let Some(id) = self.registry.find_by_window(window) {
            return self.unmanage(id, true);
        }

        let removed = match &mut self.tray {
            TrayState::Active(tray) => tray.remove(window).is_some(),
            _ => false,
        };

        if removed {
            info!("removing tray icon with window {:#0x}", window);
            self.update_systray();
        }
    }

    fn handle_expose(
        &mut self,
        window: Window,
        count: u16,
    ) {
        if count == 0 {
            debug!("EXPOSE for window {:#0x}", window);

            self.draw_bar();
            self.update_systray();
        }
    }

    fn handle_unmap(
        &mut self,
        window: Window,
        synthetic: bool,
    ) {
        debug!("UNMAP for window {:#0x}", window);

        if let Some(id) = self.registry.find_by_window(window) {
            if synthetic {
                self.conn
                    .set_icccm_window_state(window, IcccmWindowState::Withdrawn);
            } else {
                self.unmanage(id, false);
            }
        } else if self.icon_window(window) {
            self.conn.map_window_raised(window);
            self.update_systray();
        }
    }

    fn handle_configure_request(
        &mut self,
        request: ConfigureRequest,
    ) {
        debug!("CONFIGURE_REQUEST for window {:#0x}", request.window);

        let id = match self.registry.find_by_window(request.window) {
            Some(id) => id,
            None => return self.conn.forward_configure_request(&request),
        };

        let visible = self.is_visible(id);
        let screen = self.monitor.screen();

        let client = match self.registry.get_mut(id) {
            Some(client) => client,
            None => return,
        };

        if let Some(border) = request.border_width {
            client.set_border(border);
        } else if client.is_floating() {
            let mut region = client.region();

            if let Some(x) = request.x {
                region.pos.x = screen.pos.x + x;
            }

            if let Some(y) = request.y {
                region.pos.y = screen.pos.y + y;
            }

            if let Some(width) = request.width {
                region.dim.w = width;
            }

            if let Some(height) = request.height {
                region.dim.h = height;
            }

            let border = client.border();
            let outer = region.with_border(border);

            if region.pos.x + outer.dim.w > screen.right() {
                region.pos.x = screen.pos.x + (screen.dim.w / 2 - outer.dim.w / 2);
            }

            if region.pos.y + outer.dim.h > screen.bottom() {
                region.pos.y = screen.pos.y + (screen.dim.h / 2 - outer.dim.h / 2);
            }

            client.set_region(region);

            if request.has_pos() && !request.has_dim() {
                self.conn
                    .send_configure_notify(request.window, &region, border as u32);
            }

            if visible {
                self.conn.place_window(request.window, &region);
            }
        } else {
            let region = client.region();
            let border = client.border();

            self.conn
                .send_configure_notify(request.window, &region, border as u32);
        }
    }

    fn handle_configure(
        &mut self,
        window: Window,
        region: Region,
        on_root: bool,
    ) {
        if !on_root || !self.monitor.update_geometry(region) {
            return;
        }

        debug!("CONFIGURE for root window {:#0x}: {:?}", window, region);

        let mut bar_region = self.monitor.bar_region();
        bar_region.dim.w -= self.tray_width();
        self.conn.place_window(self.bar_window, &bar_region);

        let fullscreen: Vec<ClientId> = self
            .registry
            .iter()
            .filter(|(_, client)| client.is_fullscreen())
            .map(|(id, _)| id)
            .collect();

        for id in fullscreen {
            self.resize_client(id, self.monitor.screen());
        }

        self.focus(None);
        self.arrange();
    }

    fn handle_resize_request(
        &mut self,
        window: Window,
        dim: Dim,
    ) {
        if self.icon_window(window) {
            debug!("RESIZE_REQUEST for tray icon {:#0x}: {:?}", window, dim);

            self.fit_icon(window, Some(dim), false);
            self.update_systray();
        }
    }

    fn handle_property(
        &mut self,
        window: Window,
        kind: PropertyKind,
        deleted: bool,
        on_root: bool,
    ) {
        debug!("PROPERTY for window {:#0x} of kind {:?}", window, kind);

        if self.icon_window(window) {
            match kind {
                PropertyKind::Size => self.fit_icon(window, None, true),
                PropertyKind::XembedInfo => self.update_icon_state(window),
                _ => {},
            }

            self.update_systray();
        }

        if on_root && kind == PropertyKind::Name {
            return self.update_status();
        }

        if deleted {
            return;
        }

        let id = match self.registry.find_by_window(window) {
            Some(id) => id,
            None => return,
        };

        match kind {
            PropertyKind::TransientFor => {
                let floating = self.registry.get(id).map_or(true, Client::is_floating);
                let parent_managed = self
                    .conn
                    .get_icccm_window_transient_for(window)
                    .and_then(|parent| self.registry.find_by_window(parent))
                    .is_some();

                if !floating && parent_managed {
                    if let Some(client) = self.registry.get_mut(id) {
                        client.set_floating(true);
                    }

                    self.arrange();
                }
            },
            PropertyKind::Size => self.update_size_hints(id),
            PropertyKind::Hints => {
                self.update_wm_hints(id);
                self.draw_bar();
            },
            PropertyKind::Name => {
                self.update_title(id);

                if self.monitor.selected() == Some(id) {
                    self.draw_bar();
                }
            },
            PropertyKind::WindowType => self.update_window_type(id),
            PropertyKind::XembedInfo => {},
        }
    }

    fn handle_fullscreen_request(
        &mut self,
        window: Window,
        action: ToggleAction,
    ) {
        debug!("FULLSCREEN_REQUEST for window {:#0x}: {:?}", window, action);

        if let Some(id) = self.registry.find_by_window(window) {
            let fullscreen = self.registry.get(id).map_or(false, Client::is_fullscreen);

            self.set_fullscreen(id, match action {
                ToggleAction::Add => true,
                ToggleAction::Remove => false,
                ToggleAction::Toggle => !fullscreen,
            });
        }
    }

    fn handle_focus_request(
        &mut self,
        window: Window,
    ) {
        debug!("FOCUS_REQUEST for window {:#0x}", window);

        let id = match self.registry.find_by_window(window) {
            Some(id) => id,
            None => return,
        };

        let tags = self.registry.get(id).map_or(0, Client::tags) & TAG_MASK;

        if tags != 0 {
            self.view(1 << tags.trailing_zeros());
        }

        self.focus(Some(id));
        self.restack();
    }

    fn handle_dock_request(
        &mut self,
        tray: Window,
        window: Window,
    ) {
        if window == 0 || self.tray_window() != Some(tray) {
            return;
        }

        info!("docking tray icon with window {:#0x}", window);

        let bar_height = self.monitor.bar_height();
        let (dim, old_border) = match self.conn.get_window_attributes(window) {
            Some(attrs) => (attrs.region.dim, attrs.border_width),
            None => (
                Dim {
                    w: bar_height,
                    h: bar_height,
                },
                0,
            ),
        };

        let mut client = Client::new(window, Region::new(0, 0, dim.w, dim.h), 0);
        client.set_old_border(old_border);
        client.set_floating(true);
        client.set_size_hints(self.conn.get_icccm_window_size_hints(window));
        fit_icon_geometry(&self.monitor, &mut client, dim);

        self.conn.insert_window_in_save_set(window);
        self.conn.set_window_border_width(window, 0);
        self.conn.init_icon(window);
        self.conn.reparent_window(window, tray, Pos::default());
        self.conn
            .set_window_background_color(window, self.config.normal.background);

        for &message in [
            XembedMessage::EmbeddedNotify,
            XembedMessage::FocusIn,
            XembedMessage::WindowActivate,
            XembedMessage::ModalityOn,
        ]
        .iter()
        {
            self.conn.send_xembed_message(window, message, tray);
        }

        self.conn.sync();

        if let TrayState::Active(tray) = &mut self.tray {
            tray.insert(Icon::new(client));
        }

        self.update_systray();
        self.conn
            .set_icccm_window_state(window, IcccmWindowState::Normal);
    }

    fn handle_mapping(
        &mut self,
        request: MappingKind,
    ) {
        debug!("MAPPING for {:?}", request);

        self.conn.refresh_modifiers();

        if request == MappingKind::Keyboard {
            self.conn.grab_keys(&self.key_codes);
        }
    }

    fn handle_protocol_error(
        &mut self,
        request: u8,
        error: u8,
    ) {
        error!(
            "fatal protocol error: request code={}, error code={}",
            request, error
        );

        self.failure = Some((request, error));
        self.running = false;
    }

    pub fn view(
        &mut self,
        mask: u32,
    ) {
        if self.monitor.view(mask) {
            info!("viewing tagset {:#b}", self.monitor.active_tagset());

            self.focus(None);
            self.arrange();
        }
    }

    pub fn tag(
        &mut self,
        mask: u32,
    ) {
        let selected = match self.monitor.selected() {
            Some(selected) if mask & TAG_MASK != 0 => selected,
            _ => return,
        };

        if let Some(client) = self.registry.get_mut(selected) {
            client.set_tags(mask & TAG_MASK);
        }

        self.focus(None);
        self.arrange();
    }

    pub fn go_to_left_tag(&mut self) {
        self.view(monitor::shift_left(self.monitor.active_tagset()));
    }

    pub fn go_to_right_tag(&mut self) {
        self.view(monitor::shift_right(self.monitor.active_tagset()));
    }

    pub fn move_client_to_left_tag(&mut self) {
        self.tag(monitor::shift_left(self.monitor.active_tagset()));
    }

    pub fn move_client_to_right_tag(&mut self) {
        self.tag(monitor::shift_right(self.monitor.active_tagset()));
    }

    pub fn focus_next(&mut self) {
        let selected = match self.monitor.selected() {
            Some(selected) => selected,
            None => return,
        };

        let clients = self.registry.clients();
        let index = match clients.iter().position(|&id| id == selected) {
            Some(index) => index,
            None => return,
        };

        let next = clients[index + 1..]
            .iter()
            .chain(clients.iter())
            .copied()
            .find(|&id| self.is_visible(id));

        if next.is_some() {
            self.focus(next);
            self.restack();
        }
    }

    pub fn focus_previous(&mut self) {
        let selected = match self.monitor.selected() {
            Some(selected) => selected,
            None => return,
        };

        let clients = self.registry.clients();
        let index = match clients.iter().position(|&id| id == selected) {
            Some(index) => index,
            None => return,
        };

        let previous = clients[..index]
            .iter()
            .rev()
            .chain(clients[index..].iter().rev())
            .copied()
            .find(|&id| self.is_visible(id));

        if previous.is_some() {
            self.focus(previous);
            self.restack();
        }
    }

    pub fn make_master(&mut self) {
        let tagset = self.monitor.active_tagset();

        let selected = match self.monitor.selected() {
            Some(selected) => selected,
            None => return,
        };

        match self.registry.get(selected) {
            Some(client) if !client.is_floating() && !client.is_fullscreen() => {},
            _ => return,
        }

        if self.registry.tiled(tagset).first() == Some(&selected) {
            return;
        }

        self.registry.detach(selected);
        self.registry.attach(selected);
        self.focus(Some(selected));
        self.arrange();
    }

    pub fn move_client_next(&mut self) {
        let tagset = self.monitor.active_tagset();

        let selected = match self.monitor.selected() {
            Some(selected) => selected,
            None => return,
        };

        match self.registry.next_tiled_after(selected, tagset) {
            Some(next) => self.registry.attach_after(selected, next),
            None => {
                self.registry.detach(selected);
                self.registry.attach(selected);
            },
        }

        self.focus(Some(selected));
        self.arrange();
    }

    pub fn rotate_clients(&mut self) {
        let tagset = self.monitor.active_tagset();

        if self.monitor.selected().is_none() {
            return;
        }

        let last = match self.registry.tiled(tagset).last() {
            Some(&last) => last,
            None => return,
        };

        self.registry.detach(last);
        self.registry.attach(last);
        self.registry.detach_stack(last);
        self.registry.attach_stack(last);

        self.arrange();
        self.focus(Some(last));
    }

    pub fn increase_master_width(&mut self) {
        self.change_master_width(self.config.master_factor_step);
    }

    pub fn decrease_master_width(&mut self) {
        self.change_master_width(-self.config.master_factor_step);
    }

    fn change_master_width(
        &mut self,
        delta: f32,
    ) {
        let (min, max) = self.config.master_factor_bounds;
        let mfact = self.monitor.mfact() + delta;

        if mfact < min || mfact > max {
            return;
        }

        self.monitor.set_mfact(mfact);
        self.arrange();
    }

    pub fn toggle_floating(&mut self) {
        if let Some(selected) = self.monitor.selected() {
            self.toggle_client_floating(selected);
        }
    }

    pub fn toggle_fullscreen(&mut self) {
        if let Some(selected) = self.monitor.selected() {
            let fullscreen = self.registry.get(selected).map_or(false, Client::is_fullscreen);
            self.set_fullscreen(selected, !fullscreen);
        }
    }

    pub fn destroy_client(&mut self) {
        if let Some(window) = self.monitor.selected().and_then(|id| self.window_of(id)) {
            info!("killing client with window {:#0x}", window);
            self.conn.kill_window(window);
        }
    }

    pub fn move_with_mouse(&mut self) {
        self.start_drag(DragKind::Move);
    }

    pub fn resize_with_mouse(&mut self) {
        self.start_drag(DragKind::Resize);
    }

    fn start_drag(
        &mut self,
        kind: DragKind,
    ) {
        if self.drag.is_some() {
            return;
        }

        let selected = match self.monitor.selected() {
            Some(selected) => selected,
            None => return,
        };

        match self.registry.get(selected) {
            Some(client) if !client.is_fullscreen() => {},
            _ => return,
        }

        self.restack();

        let cursor = match kind {
            DragKind::Move => CursorKind::Move,
            DragKind::Resize => CursorKind::Resize,
        };

        if !self.conn.grab_pointer(cursor) {
            return;
        }

        let (window, origin, grip) = match self.registry.get(selected) {
            Some(client) => (client.window(), client.region(), Self::resize_grip(client)),
            None => return,
        };

        let grip_pos = match kind {
            DragKind::Move => match self.conn.get_pointer_position() {
                Some(pos) => pos,
                None => return self.conn.release_pointer(),
            },
            DragKind::Resize => {
                self.conn.warp_pointer_rpos(window, grip);
                origin.pos
            },
        };

        debug!("starting {:?} of client with window {:#0x}", kind, window);
        self.drag = Some(Drag::new(kind, selected, grip_pos, origin));
    }

    pub fn quit(&mut self) {
        info!("exit called, shutting down {}", WM_NAME!());
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::mock::Call;
    use crate::mock::MockConnection;

    use winsys::hints::Hints;
    use winsys::hints::SizeHints;
    use winsys::hints::XembedInfo;
    use winsys::input::Button;

    use std::collections::HashMap;

    fn attrs(region: Region) -> WindowAttributes {
        WindowAttributes {
            region,
            border_width: 0,
            override_redirect: false,
            viewable: true,
        }
    }

    fn model(conn: &MockConnection) -> Model<'_> {
        Model::new(conn, Config::default(), &HashMap::new(), &HashMap::new())
            .expect("model construction")
    }

    fn region_of(
        model: &Model<'_>,
        window: Window,
    ) -> Region {
        let id = model.registry.find_by_window(window).expect("managed window");
        model.registry.get(id).expect("client").region()
    }

    fn client_of<'m>(
        model: &'m Model<'_>,
        window: Window,
    ) -> &'m Client {
        let id = model.registry.find_by_window(window).expect("managed window");
        model.registry.get(id).expect("client")
    }

    fn selected_window(model: &Model<'_>) -> Option<Window> {
        model.selected().and_then(|id| model.window_of(id))
    }

    fn dispatch(
        model: &mut Model<'_>,
        event: Event,
    ) {
        model.dispatch(event, &mut HashMap::new(), &mut HashMap::new());
    }

    fn property(
        window: Window,
        kind: PropertyKind,
    ) -> Event {
        Event::Property {
            window,
            kind,
            deleted: false,
            on_root: false,
        }
    }

    fn pointer(
        kind: MouseEventKind,
        pos: Pos,
        time: u32,
    ) -> Event {
        Event::Mouse {
            event: MouseEvent {
                kind,
                shortcut: MouseShortcut {
                    button: Button::Left,
                    modifiers: Vec::new(),
                },
                window: 0,
                on_root: true,
                root_rpos: pos,
                window_rpos: pos,
                time,
            },
        }
    }

    fn configure_request(window: Window) -> ConfigureRequest {
        ConfigureRequest {
            window,
            x: None,
            y: None,
            width: None,
            height: None,
            border_width: None,
            sibling: None,
            stack_mode: None,
        }
    }

    fn icon_mapped(
        model: &Model<'_>,
        window: Window,
    ) -> bool {
        match &model.tray {
            TrayState::Active(tray) => tray
                .icons()
                .iter()
                .find(|icon| icon.window() == window)
                .map_or(false, |icon| icon.mapped),
            _ => false,
        }
    }

    fn two_clients(conn: &MockConnection) -> Model<'_> {
        conn.add_window(0x100, attrs(Region::new(0, 0, 300, 200)));
        conn.add_window(0x200, attrs(Region::new(0, 0, 300, 200)));

        let mut model = model(conn);
        model.handle_map_request(0x100);
        model.handle_map_request(0x200);
        model
    }

    #[test]
    fn startup_creates_bar_and_tray() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        let model = model(&conn);

        assert!(model.tray_window().is_some());
        assert!(conn.called(|call| matches!(call, Call::InitWmProperties)));
        assert!(conn.called(|call| matches!(call, Call::ClaimSystray(_))));
    }

    #[test]
    fn unknown_window_destruction_is_ignored() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        let mut model = model(&conn);

        conn.clear();
        model.handle_destroy(0xdead);

        assert!(model.registry.is_empty());
        assert_eq!(model.selected(), None);
        assert!(conn.calls().is_empty());
    }

    #[test]
    fn viewing_active_tagset_is_a_noop() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        let mut model = model(&conn);

        model.view(1 << 2);
        let mfact = model.monitor.mfact();

        conn.clear();
        model.view(1 << 2);

        assert_eq!(model.monitor.active_tagset(), 1 << 2);
        assert_eq!(model.monitor.mfact(), mfact);
        assert!(conn.calls().is_empty());
    }

    #[test]
    fn two_clients_tile_side_by_side() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        conn.add_window(0x100, attrs(Region::new(0, 0, 300, 200)));
        conn.add_window(0x200, attrs(Region::new(0, 0, 300, 200)));

        let mut model = model(&conn);
        model.handle_map_request(0x100);
        model.handle_map_request(0x200);

        // newest client takes the master slot
        assert_eq!(region_of(&model, 0x200), Region::new(0, 20, 514, 794));
        assert_eq!(region_of(&model, 0x100), Region::new(520, 20, 474, 794));

        let selected = model.selected().and_then(|id| model.window_of(id));
        assert_eq!(selected, Some(0x200));
    }

    #[test]
    fn lone_tiled_client_loses_its_border() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        conn.add_window(0x100, attrs(Region::new(0, 0, 300, 200)));

        let mut model = model(&conn);
        model.handle_map_request(0x100);

        assert_eq!(region_of(&model, 0x100), Region::new(0, 20, 1000, 800));
        assert!(conn.called(|call| {
            *call == Call::ConfigureWindow(0x100, Region::new(0, 20, 1000, 800), 0)
        }));
    }

    #[test]
    fn focus_skips_clients_on_hidden_tags() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        conn.add_window(0x100, attrs(Region::new(0, 0, 300, 200)));
        conn.add_window(0x200, attrs(Region::new(0, 0, 300, 200)));

        let mut model = model(&conn);
        model.handle_map_request(0x100);
        model.handle_map_request(0x200);

        model.tag(1 << 1);
        let selected = model.selected().and_then(|id| model.window_of(id));
        assert_eq!(selected, Some(0x100));

        let hidden = model.registry.find_by_window(0x200);
        model.focus(hidden);
        let selected = model.selected().and_then(|id| model.window_of(id));
        assert_eq!(selected, Some(0x100));
    }

    #[test]
    fn destroyed_client_hands_focus_back() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        conn.add_window(0x100, attrs(Region::new(0, 0, 300, 200)));
        conn.add_window(0x200, attrs(Region::new(0, 0, 300, 200)));

        let mut model = model(&conn);
        model.handle_map_request(0x100);
        model.handle_map_request(0x200);

        conn.clear();
        model.handle_destroy(0x200);

        let selected = model.selected().and_then(|id| model.window_of(id));
        assert_eq!(selected, Some(0x100));
        assert!(!conn.called(|call| matches!(call, Call::ReleaseWindow(0x200, _))));
        assert!(conn.called(|call| *call == Call::UpdateClientList(vec![0x100])));
    }

    #[test]
    fn override_redirect_windows_are_not_managed() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        conn.add_window(0x100, WindowAttributes {
            override_redirect: true,
            ..attrs(Region::new(0, 0, 300, 200))
        });

        let mut model = model(&conn);
        model.handle_map_request(0x100);

        assert!(model.registry.is_empty());
    }

    #[test]
    fn docked_icon_is_scaled_to_bar_height() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        conn.add_window(0x300, attrs(Region::new(0, 0, 24, 24)));

        let mut model = model(&conn);
        let tray = model.tray_window().expect("tray");
        model.handle_dock_request(tray, 0x300);

        let icon = match &model.tray {
            TrayState::Active(tray) => tray.icons()[0].client.region(),
            _ => panic!("tray is not active"),
        };

        assert_eq!(icon.dim, Dim {
            w: 20,
            h: 20
        });
        assert_eq!(model.tray_width(), 24);
        assert!(conn.called(|call| *call == Call::Reparent(0x300, tray)));
        assert!(conn.called(|call| {
            *call == Call::Xembed(0x300, XembedMessage::EmbeddedNotify, tray)
        }));
    }

    #[test]
    fn failed_tray_claim_disables_tray() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        conn.refuse_systray();

        let mut model = model(&conn);
        assert!(matches!(model.tray, TrayState::Disabled));

        conn.clear();
        model.update_systray();

        assert!(matches!(model.tray, TrayState::Disabled));
        assert!(!conn.called(|call| matches!(call, Call::CreateSystray)));
    }

    #[test]
    fn fullscreen_covers_screen_and_restores() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        conn.add_window(0x100, attrs(Region::new(0, 0, 300, 200)));
        conn.add_window(0x200, attrs(Region::new(0, 0, 300, 200)));

        let mut model = model(&conn);
        model.handle_map_request(0x100);
        model.handle_map_request(0x200);

        let before = region_of(&model, 0x200);
        model.handle_fullscreen_request(0x200, ToggleAction::Add);
        assert_eq!(region_of(&model, 0x200), Region::new(0, 0, 1000, 820));

        model.handle_fullscreen_request(0x200, ToggleAction::Toggle);
        assert_eq!(region_of(&model, 0x200), before);
    }

    #[test]
    fn master_width_stays_within_bounds() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        let mut model = model(&conn);

        for _ in 0..100 {
            model.increase_master_width();
        }

        let (min, max) = model.config.master_factor_bounds;
        assert!(model.monitor.mfact() <= max);

        for _ in 0..100 {
            model.decrease_master_width();
        }

        assert!(model.monitor.mfact() >= min);
    }

    #[test]
    fn protocol_error_stops_the_loop() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        conn.push_event(Event::ProtocolError {
            request: 12,
            error: 8,
        });

        let mut model = model(&conn);
        let result = model.run(HashMap::new(), HashMap::new());

        assert!(result.is_err());
        assert!(conn.called(|call| matches!(call, Call::Cleanup)));
    }

    #[test]
    fn dragging_tiled_client_restores_floating_geometry() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        let mut model = two_clients(&conn);

        assert_eq!(region_of(&model, 0x200), Region::new(0, 20, 514, 794));

        model.move_with_mouse();
        dispatch(&mut model, pointer(MouseEventKind::Motion, Pos { x: 5, y: 5 }, 100));

        let client = client_of(&model, 0x200);
        assert!(client.is_floating());
        assert_eq!(client.region(), Region::new(5, 25, 300, 200));

        // the remaining client takes over the whole window area
        assert_eq!(region_of(&model, 0x100), Region::new(0, 20, 1000, 800));
    }

    #[test]
    fn drag_motion_is_throttled() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        let mut model = two_clients(&conn);

        model.move_with_mouse();
        dispatch(&mut model, pointer(MouseEventKind::Motion, Pos { x: 5, y: 5 }, 100));
        dispatch(&mut model, pointer(MouseEventKind::Motion, Pos { x: 50, y: 50 }, 110));

        assert_eq!(region_of(&model, 0x200).pos, Pos { x: 5, y: 25 });

        dispatch(&mut model, pointer(MouseEventKind::Motion, Pos { x: 50, y: 50 }, 120));
        assert_eq!(region_of(&model, 0x200).pos, Pos { x: 50, y: 70 });
    }

    #[test]
    fn drag_defers_unrelated_events() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        conn.add_window(0x300, attrs(Region::new(0, 0, 300, 200)));
        let mut model = two_clients(&conn);

        model.move_with_mouse();
        assert!(model.drag.is_some());

        dispatch(&mut model, Event::Destroy {
            window: 0x100,
        });

        assert!(model.registry.find_by_window(0x100).is_some());
        assert_eq!(model.deferred.len(), 1);

        conn.clear();
        dispatch(&mut model, Event::ConfigureRequest {
            request: configure_request(0x999),
        });
        dispatch(&mut model, Event::MapRequest {
            window: 0x300,
        });

        assert!(conn.called(|call| *call == Call::ForwardConfigure(0x999)));
        assert!(model.registry.find_by_window(0x300).is_some());
        assert_eq!(model.deferred.len(), 1);
    }

    #[test]
    fn deferred_events_replay_after_release() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        let mut model = two_clients(&conn);

        model.move_with_mouse();
        dispatch(&mut model, Event::Destroy {
            window: 0x100,
        });

        conn.push_event(pointer(MouseEventKind::Release, Pos { x: 5, y: 5 }, 100));
        conn.push_event(Event::ProtocolError {
            request: 12,
            error: 8,
        });

        assert!(model.run(HashMap::new(), HashMap::new()).is_err());
        assert!(model.drag.is_none());
        assert!(model.deferred.is_empty());

        // handled as a destruction before cleanup could release it
        assert!(!conn.called(|call| matches!(call, Call::ReleaseWindow(0x100, _))));
        assert!(conn.called(|call| matches!(call, Call::ReleaseWindow(0x200, _))));
    }

    #[test]
    fn focus_cycling_wraps_around() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        conn.add_window(0x300, attrs(Region::new(0, 0, 300, 200)));
        let mut model = two_clients(&conn);
        model.handle_map_request(0x300);

        assert_eq!(selected_window(&model), Some(0x300));

        model.focus_previous();
        assert_eq!(selected_window(&model), Some(0x100));

        model.focus_next();
        assert_eq!(selected_window(&model), Some(0x300));

        model.focus_next();
        assert_eq!(selected_window(&model), Some(0x200));
    }

    #[test]
    fn synthetic_unmap_only_withdraws() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        let mut model = two_clients(&conn);

        conn.clear();
        dispatch(&mut model, Event::Unmap {
            window: 0x100,
            synthetic: true,
        });

        assert!(model.registry.find_by_window(0x100).is_some());
        assert!(conn.called(|call| {
            *call == Call::SetState(0x100, IcccmWindowState::Withdrawn)
        }));

        dispatch(&mut model, Event::Unmap {
            window: 0x100,
            synthetic: false,
        });

        assert!(model.registry.find_by_window(0x100).is_none());
        assert!(conn.called(|call| *call == Call::ReleaseWindow(0x100, 0)));
    }

    #[test]
    fn unmanaged_configure_requests_are_forwarded() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        let mut model = model(&conn);

        conn.clear();
        model.handle_configure_request(ConfigureRequest {
            width: Some(640),
            ..configure_request(0x999)
        });

        assert_eq!(conn.calls(), vec![Call::ForwardConfigure(0x999)]);
    }

    #[test]
    fn tiled_configure_requests_get_current_geometry() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        let mut model = two_clients(&conn);
        let region = region_of(&model, 0x100);

        conn.clear();
        model.handle_configure_request(ConfigureRequest {
            x: Some(40),
            width: Some(640),
            ..configure_request(0x100)
        });

        assert_eq!(region_of(&model, 0x100), region);
        assert_eq!(conn.calls(), vec![Call::ConfigureNotify(0x100, region, 3)]);
    }

    #[test]
    fn floating_configure_requests_are_kept_on_screen() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        conn.add_window(0x100, attrs(Region::new(0, 0, 300, 200)));

        let mut model = model(&conn);
        model.handle_map_request(0x100);
        model.toggle_floating();

        assert_eq!(region_of(&model, 0x100), Region::new(347, 307, 300, 200));

        // overflowing the right edge re-centres horizontally
        conn.clear();
        model.handle_configure_request(ConfigureRequest {
            x: Some(900),
            ..configure_request(0x100)
        });

        let centered = Region::new(347, 307, 300, 200);
        assert_eq!(region_of(&model, 0x100), centered);
        assert!(conn.called(|call| *call == Call::ConfigureNotify(0x100, centered, 3)));
        assert!(conn.called(|call| *call == Call::PlaceWindow(0x100, centered)));

        conn.clear();
        model.handle_configure_request(ConfigureRequest {
            x: Some(10),
            y: Some(40),
            ..configure_request(0x100)
        });

        let moved = Region::new(10, 40, 300, 200);
        assert_eq!(region_of(&model, 0x100), moved);
        assert!(conn.called(|call| *call == Call::ConfigureNotify(0x100, moved, 3)));

        // a size change is answered by the real configure alone
        conn.clear();
        model.handle_configure_request(ConfigureRequest {
            width: Some(400),
            ..configure_request(0x100)
        });

        let resized = Region::new(10, 40, 400, 200);
        assert_eq!(region_of(&model, 0x100), resized);
        assert!(!conn.called(|call| matches!(call, Call::ConfigureNotify(..))));
        assert!(conn.called(|call| *call == Call::PlaceWindow(0x100, resized)));
    }

    #[test]
    fn urgency_hint_marks_unselected_clients_only() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        let mut model = two_clients(&conn);

        let urgent = Hints {
            urgent: true,
            input: None,
            group: None,
        };

        conn.set_hints(0x100, urgent);
        dispatch(&mut model, property(0x100, PropertyKind::Hints));
        assert!(client_of(&model, 0x100).is_urgent());

        conn.clear();
        conn.set_hints(0x200, urgent);
        dispatch(&mut model, property(0x200, PropertyKind::Hints));

        assert!(!client_of(&model, 0x200).is_urgent());
        assert!(conn.called(|call| *call == Call::Urgency(0x200, false)));

        // focusing clears the flag on the client and the window
        conn.clear();
        let id = model.registry.find_by_window(0x100);
        model.focus(id);

        assert!(!client_of(&model, 0x100).is_urgent());
        assert!(conn.called(|call| *call == Call::Urgency(0x100, false)));
    }

    #[test]
    fn fixed_size_clients_float_centred() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        conn.add_window(0x100, attrs(Region::new(0, 0, 300, 200)));
        conn.set_size_hints(
            0x100,
            SizeHints::new(None, Some((300, 200)), Some((300, 200)), None, None),
        );

        let mut model = model(&conn);
        model.handle_map_request(0x100);

        let client = client_of(&model, 0x100);
        assert!(client.is_fixed());
        assert!(client.is_floating());
        assert_eq!(client.region(), Region::new(347, 307, 300, 200));
    }

    #[test]
    fn never_focus_clients_are_passed_over() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        conn.add_window(0x100, attrs(Region::new(0, 0, 300, 200)));
        conn.add_window(0x200, attrs(Region::new(0, 0, 300, 200)));
        conn.set_hints(0x200, Hints {
            urgent: false,
            input: Some(false),
            group: None,
        });

        let mut model = model(&conn);
        model.handle_map_request(0x100);
        model.handle_map_request(0x200);

        assert!(client_of(&model, 0x200).never_focus());
        assert_eq!(selected_window(&model), Some(0x100));
        assert!(!conn.called(|call| *call == Call::Focus(0x200)));

        // with nothing else visible it is still selected, without input focus
        conn.clear();
        model.handle_destroy(0x100);

        assert_eq!(selected_window(&model), Some(0x200));
        assert!(!conn.called(|call| *call == Call::Focus(0x200)));
    }

    #[test]
    fn xembed_info_maps_and_unmaps_icons() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        conn.add_window(0x300, attrs(Region::new(0, 0, 24, 24)));

        let mut model = model(&conn);
        let tray = model.tray_window().expect("tray");
        model.handle_dock_request(tray, 0x300);
        assert!(icon_mapped(&model, 0x300));

        conn.set_xembed_info(0x300, XembedInfo {
            version: 0,
            flags: 0,
        });

        conn.clear();
        dispatch(&mut model, property(0x300, PropertyKind::XembedInfo));

        assert!(!icon_mapped(&model, 0x300));
        assert!(conn.called(|call| *call == Call::UnmapWindow(0x300)));
        assert!(conn.called(|call| {
            *call == Call::SetState(0x300, IcccmWindowState::Withdrawn)
        }));
        assert!(conn.called(|call| {
            *call == Call::Xembed(0x300, XembedMessage::WindowDeactivate, tray)
        }));

        conn.set_xembed_info(0x300, XembedInfo {
            version: 0,
            flags: XembedInfo::MAPPED,
        });

        conn.clear();
        dispatch(&mut model, property(0x300, PropertyKind::XembedInfo));

        assert!(icon_mapped(&model, 0x300));
        assert!(conn.called(|call| *call == Call::MapWindow(0x300)));
        assert!(conn.called(|call| *call == Call::SetState(0x300, IcccmWindowState::Normal)));
        assert!(conn.called(|call| {
            *call == Call::Xembed(0x300, XembedMessage::WindowActivate, tray)
        }));
    }

    #[test]
    fn unrelated_icon_properties_leave_mapping_alone() {
        let conn = MockConnection::new(Region::new(0, 0, 1000, 820));
        conn.add_window(0x300, attrs(Region::new(0, 0, 24, 24)));

        let mut model = model(&conn);
        let tray = model.tray_window().expect("tray");
        model.handle_dock_request(tray, 0x300);

        conn.set_xembed_info(0x300, XembedInfo {
            version: 0,
            flags: 0,
        });

        conn.clear();
        dispatch(&mut model, property(0x300, PropertyKind::Name));

        assert!(icon_mapped(&model, 0x300));
        assert!(!conn.called(|call| *call == Call::UnmapWindow(0x300)));
        assert!(!conn.called(|call| matches!(call, Call::Xembed(0x300, ..))));
    }
}
