use crate::window::Window;

/// ICCCM `WM_NORMAL_HINTS`, resolved so that unset fields are zero.
///
/// Base and minimum sizes stand in for each other when only one of the
/// two is supplied; aspect bounds are stored as `min = y/x` and
/// `max = x/y` of the respective ratios.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SizeHints {
    pub base_width: i32,
    pub base_height: i32,
    pub inc_width: i32,
    pub inc_height: i32,
    pub max_width: i32,
    pub max_height: i32,
    pub min_width: i32,
    pub min_height: i32,
    pub min_aspect: f32,
    pub max_aspect: f32,
}

impl Default for SizeHints {
    fn default() -> Self {
        Self {
            base_width: 0,
            base_height: 0,
            inc_width: 0,
            inc_height: 0,
            max_width: 0,
            max_height: 0,
            min_width: 0,
            min_height: 0,
            min_aspect: 0.0,
            max_aspect: 0.0,
        }
    }
}

impl SizeHints {
    pub fn new(
        base: Option<(i32, i32)>,
        min: Option<(i32, i32)>,
        max: Option<(i32, i32)>,
        inc: Option<(i32, i32)>,
        aspect: Option<((i32, i32), (i32, i32))>,
    ) -> Self {
        // negative sizes are malformed and count as unset
        let sane = |(w, h): (i32, i32)| (std::cmp::max(w, 0), std::cmp::max(h, 0));

        let (base_width, base_height) = base.or(min).map_or((0, 0), sane);
        let (min_width, min_height) = min.or(base).map_or((0, 0), sane);
        let (max_width, max_height) = max.map_or((0, 0), sane);
        let (inc_width, inc_height) = inc.map_or((0, 0), sane);

        let (min_aspect, max_aspect) = aspect.map_or((0.0, 0.0), |((min_x, min_y), (max_x, max_y))| {
            (
                if min_x > 0 {
                    min_y as f32 / min_x as f32
                } else {
                    0.0
                },
                if max_y > 0 {
                    max_x as f32 / max_y as f32
                } else {
                    0.0
                },
            )
        });

        Self {
            base_width,
            base_height,
            inc_width,
            inc_height,
            max_width,
            max_height,
            min_width,
            min_height,
            min_aspect,
            max_aspect,
        }
    }

    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.max_width > 0
            && self.max_height > 0
            && self.max_width == self.min_width
            && self.max_height == self.min_height
    }

    #[inline]
    pub fn base_is_min(&self) -> bool {
        self.base_width == self.min_width && self.base_height == self.min_height
    }
}

#[derive(Debug, Copy, Clone, PartialOrd, Ord, PartialEq, Eq)]
pub struct Hints {
    pub urgent: bool,
    pub input: Option<bool>,
    pub group: Option<Window>,
}

/// Flags advertised through `_XEMBED_INFO`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct XembedInfo {
    pub version: u32,
    pub flags: u32,
}

impl XembedInfo {
    pub const MAPPED: u32 = 1 << 0;

    #[inline]
    pub fn is_mapped(&self) -> bool {
        self.flags & Self::MAPPED != 0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum XembedMessage {
    EmbeddedNotify,
    WindowActivate,
    WindowDeactivate,
    FocusIn,
    ModalityOn,
}

impl XembedMessage {
    pub const PROTOCOL_VERSION: u32 = 0;

    pub fn opcode(&self) -> u32 {
        match self {
            Self::EmbeddedNotify => 0,
            Self::WindowActivate => 1,
            Self::WindowDeactivate => 2,
            Self::FocusIn => 4,
            Self::ModalityOn => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_and_min_stand_in_for_each_other() {
        let only_min = SizeHints::new(None, Some((40, 30)), None, None, None);
        assert_eq!((only_min.base_width, only_min.base_height), (40, 30));
        assert!(only_min.base_is_min());

        let only_base = SizeHints::new(Some((12, 8)), None, None, None, None);
        assert_eq!((only_base.min_width, only_base.min_height), (12, 8));
    }

    #[test]
    fn fixed_requires_equal_nonzero_bounds() {
        let fixed = SizeHints::new(None, Some((200, 100)), Some((200, 100)), None, None);
        assert!(fixed.is_fixed());

        let unbounded = SizeHints::new(None, Some((200, 100)), None, None, None);
        assert!(!unbounded.is_fixed());
    }

    #[test]
    fn negative_sizes_are_treated_as_unset() {
        let hints = SizeHints::new(
            Some((i32::MIN, i32::MIN)),
            None,
            Some((-5, 10)),
            Some((-3, -3)),
            None,
        );

        assert_eq!((hints.base_width, hints.base_height), (0, 0));
        assert_eq!((hints.min_width, hints.min_height), (0, 0));
        assert_eq!((hints.max_width, hints.max_height), (0, 10));
        assert_eq!((hints.inc_width, hints.inc_height), (0, 0));
    }

    #[test]
    fn degenerate_aspect_is_ignored() {
        let hints = SizeHints::new(None, None, None, None, Some(((0, 1), (4, 0))));
        assert_eq!(hints.min_aspect, 0.0);
        assert_eq!(hints.max_aspect, 0.0);
    }
}
