use crate::defaults::*;

use winsys::Result;

use anyhow::anyhow;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ColorScheme {
    pub foreground: u32,
    pub background: u32,
    pub border: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub border_width: u32,
    pub normal: ColorScheme,
    pub selected: ColorScheme,
    pub tag_names: [&'static str; TAGS_LEN],
    pub top_bar: bool,
    pub show_title: bool,
    pub show_systray: bool,
    pub bar_height: i32,
    pub systray_spacing: i32,
    pub master_factor: f32,
    pub master_factor_bounds: (f32, f32),
    pub master_factor_step: f32,
    pub motion_throttle_ms: u32,
    pub terminal: &'static str,
    pub launcher: &'static str,
}

impl Default for Config {
    fn default() -> Self {
        let color = |hex: &str| parse_color(hex).unwrap_or(0);

        Self {
            border_width: BORDER_WIDTH,
            normal: ColorScheme {
                foreground: color(BAR_FOREGROUND),
                background: color(BAR_BACKGROUND),
                border: color(NORMAL_BORDER),
            },
            selected: ColorScheme {
                foreground: color(SELECTED_FOREGROUND),
                background: color(SELECTED_BACKGROUND),
                border: color(SELECTED_BORDER),
            },
            tag_names: TAG_NAMES,
            top_bar: true,
            show_title: true,
            show_systray: true,
            bar_height: BAR_HEIGHT,
            systray_spacing: SYSTRAY_SPACING,
            master_factor: MASTER_FACTOR,
            master_factor_bounds: (MASTER_FACTOR_MIN, MASTER_FACTOR_MAX),
            master_factor_step: MASTER_FACTOR_STEP,
            motion_throttle_ms: MOTION_THROTTLE_MS,
            terminal: TERMINAL,
            launcher: LAUNCHER,
        }
    }
}

/// Parses a `#rrggbb` color into a 24-bit pixel value.
pub fn parse_color(hex: &str) -> Result<u32> {
    let digits = hex
        .strip_prefix('#')
        .ok_or_else(|| anyhow!("color \"{}\" must start with '#'", hex))?;

    if digits.len() != 6 {
        return Err(anyhow!("color \"{}\" must have six hex digits", hex));
    }

    u32::from_str_radix(digits, 16).map_err(|e| anyhow!("invalid color \"{}\": {}", hex, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_color("#fe347e").ok(), Some(0xfe347e));
        assert!(parse_color("fe347e").is_err());
        assert!(parse_color("#fff").is_err());
        assert!(parse_color("#gggggg").is_err());
    }

    #[test]
    fn default_configuration_is_consistent() {
        let config = Config::default();
        let (min, max) = config.master_factor_bounds;

        assert!(config.master_factor >= min && config.master_factor <= max);
        assert_eq!(config.normal.background, 0x1d2021);
        assert_eq!(config.tag_names.len(), TAGS_LEN);
        assert_eq!(config.terminal, TERMINAL);
        assert!(!config.launcher.trim().is_empty());
    }
}
