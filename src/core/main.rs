#![deny(clippy::all)]

#[macro_use]
extern crate log;

#[allow(unused_imports)]
use simplelog::LevelFilter;
#[allow(unused_imports)]
use simplelog::SimpleLogger;

use winsys::xdata::xconnection::XConnection;
pub use winsys::Result;

#[macro_use]
mod macros;

#[macro_use]
mod defaults;

mod bar;
mod binding;
mod client;
mod config;
mod constrain;
mod drag;
mod layout;
mod model;
mod monitor;
mod registry;
mod systray;
mod util;

#[cfg(test)]
mod mock;

use binding::KeyBindings;
use binding::MouseBindings;
use config::Config;
use model::Model;
use util::Util;

pub fn main() -> Result<()> {
    #[cfg(debug_assertions)]
    SimpleLogger::init(LevelFilter::Debug, simplelog::Config::default())?;
    #[cfg(not(debug_assertions))]
    SimpleLogger::init(LevelFilter::Info, simplelog::Config::default())?;

    Util::init_process()?;

    let (conn, screen_num) = x11rb::connect(None)?;
    let xconn = XConnection::new(&conn, screen_num)?;

    let config = Config::default();
    let (mouse_bindings, key_bindings) = init_bindings(&config);

    Model::new(&xconn, config, &key_bindings, &mouse_bindings)?
        .run(key_bindings, mouse_bindings)
}

fn init_bindings(config: &Config) -> (MouseBindings, KeyBindings) {
    let terminal = config.terminal;
    let launcher = config.launcher;

    // (click): "[modifiers]-button" => action
    let mouse_bindings = build_mouse_bindings!(
        (ClientWindow): "M-Left" => do_internal_mouse!(move_with_mouse),
        (ClientWindow): "M-Middle" => do_internal_mouse!(toggle_floating),
        (ClientWindow): "M-Right" => do_internal_mouse!(resize_with_mouse),

        (TagBar): "Left" => do_internal_mouse_block!(model, click, {
            if let Some(tag) = click.tag {
                model.view(1 << tag);
            }
        }),
    );

    // "[modifiers]-key" => action
    let key_bindings = build_key_bindings!(
        "M-S-r" => do_internal!(quit),

        // client state modifiers
        "M-q" => do_internal!(destroy_client),
        "M-f" => do_internal!(toggle_fullscreen),
        "M-space" => do_internal!(toggle_floating),

        // client order modifiers
        "M-j" => do_internal!(focus_next),
        "M-k" => do_internal!(focus_previous),
        "M-v" => do_internal!(move_client_next),
        "M-r" => do_internal!(rotate_clients),
        "M-z" => do_internal!(make_master),

        // layout-data modifiers
        "M-l" => do_internal!(increase_master_width),
        "M-h" => do_internal!(decrease_master_width),

        // tag activators
        "M-Left" => do_internal!(go_to_left_tag),
        "M-Right" => do_internal!(go_to_right_tag),
        "M-1" => do_internal!(view, 1 << 0),
        "M-2" => do_internal!(view, 1 << 1),
        "M-3" => do_internal!(view, 1 << 2),
        "M-4" => do_internal!(view, 1 << 3),
        "M-5" => do_internal!(view, 1 << 4),
        "M-6" => do_internal!(view, 1 << 5),
        "M-7" => do_internal!(view, 1 << 6),
        "M-8" => do_internal!(view, 1 << 7),
        "M-9" => do_internal!(view, 1 << 8),

        // tag client movement
        "M-S-Left" => do_internal!(move_client_to_left_tag),
        "M-S-Right" => do_internal!(move_client_to_right_tag),
        "M-S-1" => do_internal!(tag, 1 << 0),
        "M-S-2" => do_internal!(tag, 1 << 1),
        "M-S-3" => do_internal!(tag, 1 << 2),
        "M-S-4" => do_internal!(tag, 1 << 3),
        "M-S-5" => do_internal!(tag, 1 << 4),
        "M-S-6" => do_internal!(tag, 1 << 5),
        "M-S-7" => do_internal!(tag, 1 << 6),
        "M-S-8" => do_internal!(tag, 1 << 7),
        "M-S-9" => do_internal!(tag, 1 << 8),

        // external spawn commands
        "M-Return" => spawn_external!(terminal),
        "M-d" => spawn_from_shell!(launcher),

        "XF86AudioMute" => spawn_from_shell!(
            "amixer sset Master toggle; pkill -RTMIN+10 sblocks"
        ),
        "XF86AudioRaiseVolume" => spawn_from_shell!(
            "amixer set Master 2%+; pkill -RTMIN+10 sblocks"
        ),
        "XF86AudioLowerVolume" => spawn_from_shell!(
            "amixer set Master 2%-; pkill -RTMIN+10 sblocks"
        ),
        "XF86MonBrightnessUp" => spawn_from_shell!("brightnessctl set +10%"),
        "XF86MonBrightnessDown" => spawn_from_shell!("brightnessctl set 10%-"),
    );

    (mouse_bindings, key_bindings)
}
