use winsys::geometry::Dim;
use winsys::geometry::Region;
use winsys::hints::SizeHints;
use winsys::window::Window;

/// A managed top-level window and everything the manager remembers
/// about it between events.
#[derive(Debug, Clone)]
pub struct Client {
    window: Window,
    name: String,
    region: Region,
    old_region: Region,
    float_region: Region,
    border: i32,
    old_border: i32,
    size_hints: SizeHints,
    tags: u32,
    floating: bool,
    old_floating: bool,
    fixed: bool,
    urgent: bool,
    fullscreen: bool,
    never_focus: bool,
}

impl Client {
    pub fn new(
        window: Window,
        region: Region,
        border: i32,
    ) -> Self {
        Self {
            window,
            name: String::new(),
            region,
            old_region: region,
            float_region: region,
            border,
            old_border: border,
            size_hints: SizeHints::default(),
            tags: 0,
            floating: false,
            old_floating: false,
            fixed: false,
            urgent: false,
            fullscreen: false,
            never_focus: false,
        }
    }

    #[inline]
    pub fn window(&self) -> Window {
        self.window
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn set_name(
        &mut self,
        name: impl Into<String>,
    ) {
        self.name = name.into();
    }

    #[inline]
    pub fn region(&self) -> Region {
        self.region
    }

    /// Stores a new geometry, keeping the current one as the previous.
    #[inline]
    pub fn set_region(
        &mut self,
        region: Region,
    ) {
        self.old_region = self.region;
        self.region = region;
    }

    /// Overwrites the geometry without touching the previous one.
    #[inline]
    pub fn replace_region(
        &mut self,
        region: Region,
    ) {
        self.region = region;
    }

    #[inline]
    pub fn old_region(&self) -> Region {
        self.old_region
    }

    #[inline]
    pub fn float_region(&self) -> Region {
        self.float_region
    }

    #[inline]
    pub fn set_float_region(
        &mut self,
        region: Region,
    ) {
        self.float_region = region;
    }

    #[inline]
    pub fn border(&self) -> i32 {
        self.border
    }

    #[inline]
    pub fn set_border(
        &mut self,
        border: i32,
    ) {
        self.border = border;
    }

    #[inline]
    pub fn old_border(&self) -> i32 {
        self.old_border
    }

    #[inline]
    pub fn set_old_border(
        &mut self,
        border: i32,
    ) {
        self.old_border = border;
    }

    #[inline]
    pub fn size_hints(&self) -> &SizeHints {
        &self.size_hints
    }

    pub fn set_size_hints(
        &mut self,
        size_hints: SizeHints,
    ) {
        self.fixed = size_hints.is_fixed();
        self.size_hints = size_hints;
    }

    #[inline]
    pub fn tags(&self) -> u32 {
        self.tags
    }

    #[inline]
    pub fn set_tags(
        &mut self,
        tags: u32,
    ) {
        self.tags = tags;
    }

    #[inline]
    pub fn is_floating(&self) -> bool {
        self.floating
    }

    #[inline]
    pub fn set_floating(
        &mut self,
        floating: bool,
    ) {
        self.floating = floating;
    }

    #[inline]
    pub fn old_floating(&self) -> bool {
        self.old_floating
    }

    #[inline]
    pub fn set_old_floating(
        &mut self,
        floating: bool,
    ) {
        self.old_floating = floating;
    }

    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    #[inline]
    pub fn is_urgent(&self) -> bool {
        self.urgent
    }

    #[inline]
    pub fn set_urgent(
        &mut self,
        urgent: bool,
    ) {
        self.urgent = urgent;
    }

    #[inline]
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    #[inline]
    pub fn set_fullscreen(
        &mut self,
        fullscreen: bool,
    ) {
        self.fullscreen = fullscreen;
    }

    #[inline]
    pub fn never_focus(&self) -> bool {
        self.never_focus
    }

    #[inline]
    pub fn set_never_focus(
        &mut self,
        never_focus: bool,
    ) {
        self.never_focus = never_focus;
    }

    #[inline]
    pub fn is_visible(
        &self,
        tagset: u32,
    ) -> bool {
        self.tags & tagset != 0
    }

    #[inline]
    pub fn is_tiled(
        &self,
        tagset: u32,
    ) -> bool {
        self.is_visible(tagset) && !self.floating
    }

    /// Size including the border on both sides.
    #[inline]
    pub fn outer_dim(&self) -> Dim {
        Dim {
            w: self.region.dim.w + 2 * self.border,
            h: self.region.dim.h + 2 * self.border,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_follows_tag_intersection() {
        let mut client = Client::new(1, Region::new(0, 0, 100, 100), 3);
        client.set_tags(0b0110);

        assert!(client.is_visible(0b0010));
        assert!(client.is_visible(0b1100));
        assert!(!client.is_visible(0b1001));
    }

    #[test]
    fn setting_region_remembers_previous() {
        let mut client = Client::new(1, Region::new(0, 0, 100, 100), 3);
        client.set_region(Region::new(10, 10, 50, 50));

        assert_eq!(client.old_region(), Region::new(0, 0, 100, 100));
        assert_eq!(client.outer_dim(), Dim { w: 56, h: 56 });
    }

    #[test]
    fn fixed_size_tracks_hints() {
        let mut client = Client::new(1, Region::default(), 0);
        client.set_size_hints(SizeHints::new(None, Some((10, 10)), Some((10, 10)), None, None));

        assert!(client.is_fixed());
    }
}
