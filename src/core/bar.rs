use crate::config::ColorScheme;

use winsys::connection::Connection;
use winsys::geometry::Region;
use winsys::window::Window;

/// Everything the bar shows, computed by the model on each redraw.
#[derive(Debug, Clone, PartialEq)]
pub struct BarContent<'a> {
    pub tag_names: &'a [&'static str],
    pub tagset: u32,
    pub occupied: u32,
    pub urgent: u32,
    pub selected_tags: u32,
    pub title: Option<&'a str>,
    pub floating: bool,
    pub fixed: bool,
    pub status: &'a str,
    pub systray_width: i32,
}

pub trait Bar {
    fn draw(
        &mut self,
        conn: &dyn Connection,
        window: Window,
        region: Region,
        content: &BarContent,
    );

    /// The tag whose indicator lies under horizontal offset `x`.
    fn tag_at(
        &self,
        x: i32,
        tag_count: usize,
    ) -> Option<usize>;
}

/// Paints the bar as flat blocks: one square cell per tag, followed by a
/// title strip. Glyph rendering is left to external bars.
pub struct BlockBar {
    cell_width: i32,
    normal: ColorScheme,
    selected: ColorScheme,
    show_title: bool,
}

impl BlockBar {
    pub fn new(
        cell_width: i32,
        normal: ColorScheme,
        selected: ColorScheme,
        show_title: bool,
    ) -> Self {
        Self {
            cell_width: std::cmp::max(cell_width, 1),
            normal,
            selected,
            show_title,
        }
    }

    fn marker(&self) -> i32 {
        std::cmp::max(self.cell_width / 6, 2)
    }
}

impl Bar for BlockBar {
    fn draw(
        &mut self,
        conn: &dyn Connection,
        window: Window,
        region: Region,
        content: &BarContent,
    ) {
        let width = region.dim.w;
        let height = region.dim.h;
        let marker = self.marker();

        conn.fill_rectangle(window, self.normal.background, &Region::new(0, 0, width, height));

        let mut x = 0;
        for i in 0..content.tag_names.len() {
            let bit = 1 << i;
            let scheme = if content.tagset & bit != 0 {
                &self.selected
            } else {
                &self.normal
            };

            let (background, foreground) = if content.urgent & bit != 0 {
                (scheme.foreground, scheme.background)
            } else {
                (scheme.background, scheme.foreground)
            };

            conn.fill_rectangle(window, background, &Region::new(x, 0, self.cell_width, height));

            if content.occupied & bit != 0 {
                let size = if content.selected_tags & bit != 0 {
                    marker + 2
                } else {
                    marker
                };

                conn.fill_rectangle(window, foreground, &Region::new(x + 1, 1, size, size));
            }

            x += self.cell_width;
        }

        if !self.show_title || x >= width {
            return;
        }

        if content.title.is_some() {
            conn.fill_rectangle(
                window,
                self.selected.background,
                &Region::new(x, 0, width - x, height),
            );

            if content.floating {
                let size = if content.fixed {
                    marker + 2
                } else {
                    marker
                };

                conn.fill_rectangle(
                    window,
                    self.selected.foreground,
                    &Region::new(x + marker, marker, size, size),
                );
            }
        }
    }

    fn tag_at(
        &self,
        x: i32,
        tag_count: usize,
    ) -> Option<usize> {
        if x < 0 {
            return None;
        }

        let index = (x / self.cell_width) as usize;

        if index < tag_count {
            Some(index)
        } else {
            None
        }
    }
}
