use crate::defaults::TAGS_LEN;
use crate::defaults::TAG_MASK;
use crate::registry::ClientId;

use winsys::geometry::Region;

/// Layout parameters remembered per tag, indexed by tag number plus one;
/// slot zero stands for the empty selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Pertag {
    pub current: usize,
    pub previous: usize,
    pub mfacts: [f32; TAGS_LEN + 1],
}

impl Pertag {
    fn new(mfact: f32) -> Self {
        Self {
            current: 1,
            previous: 1,
            mfacts: [mfact; TAGS_LEN + 1],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Monitor {
    screen: Region,
    window_area: Region,
    bar_y: i32,
    bar_height: i32,
    top_bar: bool,
    tagset: [u32; 2],
    seltags: usize,
    mfact: f32,
    pertag: Pertag,
    selected: Option<ClientId>,
}

impl Monitor {
    pub fn new(
        screen: Region,
        bar_height: i32,
        top_bar: bool,
        mfact: f32,
    ) -> Self {
        let mut monitor = Self {
            screen: Region::default(),
            window_area: Region::default(),
            bar_y: 0,
            bar_height,
            top_bar,
            tagset: [1, 1],
            seltags: 0,
            mfact,
            pertag: Pertag::new(mfact),
            selected: None,
        };

        monitor.update_geometry(screen);
        monitor
    }

    /// Adopts a new screen rectangle, returning whether it changed. The
    /// window area is the screen minus the bar on its configured side.
    pub fn update_geometry(
        &mut self,
        screen: Region,
    ) -> bool {
        if self.screen.dim == screen.dim && self.screen.pos == screen.pos {
            return false;
        }

        self.screen = screen;

        let mut area = screen;
        area.dim.h -= self.bar_height;
        self.bar_y = if self.top_bar {
            area.pos.y
        } else {
            area.pos.y + area.dim.h
        };

        if self.top_bar {
            area.pos.y += self.bar_height;
        }

        self.window_area = area;
        true
    }

    #[inline]
    pub fn screen(&self) -> Region {
        self.screen
    }

    #[inline]
    pub fn window_area(&self) -> Region {
        self.window_area
    }

    #[inline]
    pub fn bar_height(&self) -> i32 {
        self.bar_height
    }

    #[inline]
    pub fn bar_y(&self) -> i32 {
        self.bar_y
    }

    /// The strip the bar occupies, before any room is taken by the tray.
    pub fn bar_region(&self) -> Region {
        Region::new(
            self.window_area.pos.x,
            self.bar_y,
            self.window_area.dim.w,
            self.bar_height,
        )
    }

    #[inline]
    pub fn active_tagset(&self) -> u32 {
        self.tagset[self.seltags]
    }

    #[inline]
    pub fn mfact(&self) -> f32 {
        self.mfact
    }

    #[inline]
    pub fn pertag(&self) -> &Pertag {
        &self.pertag
    }

    /// Stores the master factor for the current view and its tag slot.
    pub fn set_mfact(
        &mut self,
        mfact: f32,
    ) {
        self.mfact = mfact;
        self.pertag.mfacts[self.pertag.current] = mfact;
    }

    #[inline]
    pub fn selected(&self) -> Option<ClientId> {
        self.selected
    }

    #[inline]
    pub fn set_selected(
        &mut self,
        selected: Option<ClientId>,
    ) {
        self.selected = selected;
    }

    /// Switches the visible tagset. An empty mask toggles back to the
    /// previous view. Returns false when the request names the view that
    /// is already active.
    pub fn view(
        &mut self,
        mask: u32,
    ) -> bool {
        let mask = mask & TAG_MASK;

        if mask == self.active_tagset() {
            return false;
        }

        self.seltags ^= 1;

        if mask != 0 {
            self.tagset[self.seltags] = mask;
            self.pertag.previous = self.pertag.current;
            // multi-tag views share the layout memory of their lowest tag
            self.pertag.current = mask.trailing_zeros() as usize + 1;
        } else {
            std::mem::swap(&mut self.pertag.current, &mut self.pertag.previous);
        }

        self.mfact = self.pertag.mfacts[self.pertag.current];
        true
    }
}

/// Rotates a tagset one tag to the left, wrapping around the tag count.
pub fn shift_left(tagset: u32) -> u32 {
    ((tagset >> 1) | (tagset << (TAGS_LEN - 1))) & TAG_MASK
}

/// Rotates a tagset one tag to the right, wrapping around the tag count.
pub fn shift_right(tagset: u32) -> u32 {
    ((tagset << 1) | (tagset >> (TAGS_LEN - 1))) & TAG_MASK
}
