use crate::client::Client;
use crate::constrain::constrain;
use crate::monitor::Monitor;

use winsys::geometry::Dim;
use winsys::geometry::Region;
use winsys::window::Window;

/// A window docked in the tray. Icons reuse the client record for their
/// geometry and size hints.
#[derive(Debug, Clone)]
pub struct Icon {
    pub client: Client,
    pub mapped: bool,
}

impl Icon {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            mapped: true,
        }
    }

    #[inline]
    pub fn window(&self) -> Window {
        self.client.window()
    }
}

/// The docking container and the icons it owns, most recent first.
#[derive(Debug)]
pub struct Systray {
    window: Window,
    icons: Vec<Icon>,
}

impl Systray {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            icons: Vec::new(),
        }
    }

    #[inline]
    pub fn window(&self) -> Window {
        self.window
    }

    #[inline]
    pub fn icons(&self) -> &[Icon] {
        &self.icons
    }

    pub fn insert(
        &mut self,
        icon: Icon,
    ) {
        self.remove(icon.window());
        self.icons.insert(0, icon);
    }

    pub fn remove(
        &mut self,
        window: Window,
    ) -> Option<Icon> {
        let index = self.icons.iter().position(|icon| icon.window() == window)?;
        Some(self.icons.remove(index))
    }

    pub fn contains(
        &self,
        window: Window,
    ) -> bool {
        self.icons.iter().any(|icon| icon.window() == window)
    }

    pub fn icon_mut(
        &mut self,
        window: Window,
    ) -> Option<&mut Icon> {
        self.icons.iter_mut().find(|icon| icon.window() == window)
    }

    /// Horizontal room the tray claims from the bar.
    pub fn width(
        &self,
        spacing: i32,
    ) -> i32 {
        tray_width(self.icons.iter().map(|icon| icon.client.region().dim.w), spacing)
    }

    /// Lines the icons up left to right inside the tray window, leaving
    /// `spacing` pixels around each, and returns the tray's own region
    /// anchored to the right edge of the screen in the bar's slot.
    pub fn layout(
        &mut self,
        monitor: &Monitor,
        spacing: i32,
    ) -> Region {
        let mut x = 0;

        for icon in self.icons.iter_mut() {
            x += spacing;

            let region = icon.client.region();
            icon.client.replace_region(Region::new(x, 0, region.dim.w, region.dim.h));

            x += region.dim.w;
        }

        let width = if x > 0 {
            x + spacing
        } else {
            Self::MIN_WIDTH
        };

        let screen = monitor.screen();
        Region::new(
            screen.right() - width,
            monitor.bar_y(),
            width,
            monitor.bar_height(),
        )
    }
}

pub fn tray_width(
    widths: impl Iterator<Item = i32>,
    spacing: i32,
) -> i32 {
    let total: i32 = widths.map(|w| w + spacing).sum();

    if total > 0 {
        total + spacing
    } else {
        Systray::MIN_WIDTH
    }
}

/// Scales an icon to the bar's height, keeping its aspect ratio, and
/// forces it back into the bar when its size hints push it taller.
pub fn fit_icon_geometry(
    monitor: &Monitor,
    client: &mut Client,
    dim: Dim,
) {
    let bar_height = monitor.bar_height();
    let scaled = |w: i32, h: i32| {
        if w == h || h <= 0 {
            bar_height
        } else {
            (bar_height as f32 * (w as f32 / h as f32)) as i32
        }
    };

    let width = if dim.h == bar_height && dim.w != dim.h {
        dim.w
    } else {
        scaled(dim.w, dim.h)
    };

    let requested = client.region().with_dim(Dim {
        w: width,
        h: bar_height,
    });

    let (mut region, _) = constrain(monitor, client, requested, false);

    if region.dim.h > bar_height {
        region.dim.w = scaled(region.dim.w, region.dim.h);
        region.dim.h = bar_height;
    }

    client.replace_region(region);
}

#[cfg(test)]
mod tests {
    use super::*;

    use winsys::hints::SizeHints;

    fn monitor() -> Monitor {
        Monitor::new(Region::new(0, 0, 1000, 820), 20, true, 0.52)
    }

    fn icon_client(window: Window) -> Client {
        let mut client = Client::new(window, Region::default(), 0);
        client.set_floating(true);
        client
    }

    fn fitted(
        dim: Dim,
        hints: SizeHints,
    ) -> Region {
        let mut client = icon_client(1);
        client.set_size_hints(hints);
        fit_icon_geometry(&monitor(), &mut client, dim);
        client.region()
    }

    #[test]
    fn square_icon_becomes_bar_square() {
        let region = fitted(Dim { w: 24, h: 24 }, SizeHints::default());

        assert_eq!(region.dim, Dim { w: 20, h: 20 });
    }

    // wide icons keep their aspect ratio and so end up wider than the bar
    // is high; only the height is forced down to the bar
    #[test]
    fn wide_icon_keeps_aspect() {
        let region = fitted(Dim { w: 48, h: 24 }, SizeHints::default());

        assert_eq!(region.dim, Dim { w: 40, h: 20 });
    }

    #[test]
    fn bar_height_icon_keeps_width() {
        let region = fitted(Dim { w: 33, h: 20 }, SizeHints::default());

        assert_eq!(region.dim, Dim { w: 33, h: 20 });
    }

    #[test]
    fn zero_height_falls_back_to_square() {
        let region = fitted(Dim { w: 30, h: 0 }, SizeHints::default());

        assert_eq!(region.dim, Dim { w: 20, h: 20 });
    }

    #[test]
    fn oversized_hints_are_forced_into_the_bar() {
        let hints = SizeHints::new(None, Some((32, 32)), None, None, None);

        for &(w, h) in &[(16, 16), (64, 16), (10, 90), (1, 1)] {
            let region = fitted(Dim { w, h }, hints);
            assert!(region.dim.h <= 20);
        }
    }

    #[test]
    fn layout_spaces_icons_from_the_right_edge() {
        let mut tray = Systray::new(99);

        for window in 1..=2 {
            let mut client = icon_client(window);
            client.replace_region(Region::new(0, 0, 20, 20));
            tray.insert(Icon::new(client));
        }

        let region = tray.layout(&monitor(), 2);

        assert_eq!(region, Region::new(954, 0, 46, 20));
        assert_eq!(tray.width(2), 46);
        assert_eq!(tray.icons()[0].window(), 2);
        assert_eq!(tray.icons()[1].client.region().pos.x, 24);
    }

    #[test]
    fn empty_tray_is_one_pixel_wide() {
        let tray = Systray::new(99);

        assert_eq!(tray.width(2), 1);
    }
}
