use crate::client::Client;
use crate::systray::Systray;

use winsys::geometry::Dim;

#[macro_export]
macro_rules! WM_NAME (
    () => { "ndwm" };
);

pub const TAGS_LEN: usize = 9;
pub const TAG_MASK: u32 = (1 << TAGS_LEN) - 1;

pub const TAG_NAMES: [&str; TAGS_LEN] = ["1", "2", "3", "4", "5", "6", "7", "8", "9"];

pub const BORDER_WIDTH: u32 = 3;
pub const BAR_HEIGHT: i32 = 20;
pub const SYSTRAY_SPACING: i32 = 2;

pub const MASTER_FACTOR: f32 = 0.52;
pub const MASTER_FACTOR_MIN: f32 = 0.05;
pub const MASTER_FACTOR_MAX: f32 = 0.95;
pub const MASTER_FACTOR_STEP: f32 = 0.02;

/// Pointer motion during a drag is processed at most this often.
pub const MOTION_THROTTLE_MS: u32 = 1000 / 60;

pub const BAR_BACKGROUND: &str = "#1d2021";
pub const BAR_FOREGROUND: &str = "#bbbbbb";
pub const SELECTED_FOREGROUND: &str = "#eeeeee";
pub const SELECTED_BACKGROUND: &str = "#fe347e";
pub const NORMAL_BORDER: &str = "#572649";
pub const SELECTED_BORDER: &str = "#fe347e";

pub const TERMINAL: &str = "st";
pub const LAUNCHER: &str = "dmenu_run";

impl Client {
    pub const MIN_CLIENT_DIM: Dim = Dim {
        w: 1,
        h: 1,
    };
}

impl Systray {
    pub const MIN_WIDTH: i32 = 1;
}
