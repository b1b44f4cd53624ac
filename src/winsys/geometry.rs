use std::ops::Add;
use std::ops::Sub;

#[derive(Debug, Copy, Clone, Hash, PartialOrd, Ord, PartialEq, Eq)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Default for Pos {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
        }
    }
}

impl Add<Pos> for Pos {
    type Output = Self;

    fn add(
        self,
        other: Pos,
    ) -> Self::Output {
        Self::Output {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Pos {
    type Output = Pos;

    fn sub(
        self,
        other: Self,
    ) -> Self::Output {
        Self::Output {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

#[derive(Debug, Copy, Clone, Hash, PartialOrd, Ord, PartialEq, Eq)]
pub struct Dim {
    pub w: i32,
    pub h: i32,
}

impl Default for Dim {
    fn default() -> Self {
        Self {
            w: 0,
            h: 0,
        }
    }
}

impl Dim {
    pub fn values(&self) -> (i32, i32) {
        (self.w, self.h)
    }
}

#[derive(Debug, Copy, Clone, Hash, PartialOrd, Ord, PartialEq, Eq)]
pub struct Region {
    pub pos: Pos,
    pub dim: Dim,
}

impl Default for Region {
    fn default() -> Self {
        Self {
            pos: Default::default(),
            dim: Default::default(),
        }
    }
}

impl Region {
    pub fn new(
        x: i32,
        y: i32,
        w: i32,
        h: i32,
    ) -> Self {
        Self {
            pos: Pos {
                x,
                y,
            },
            dim: Dim {
                w,
                h,
            },
        }
    }

    pub fn values(&self) -> (Pos, Dim) {
        (self.pos, self.dim)
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.pos.x + self.dim.w
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.pos.y + self.dim.h
    }

    /// Position that centers `dim`, including a border of `border` on
    /// each side, within this region.
    pub fn center_of(
        &self,
        dim: Dim,
        border: i32,
    ) -> Pos {
        Pos {
            x: self.pos.x + (self.dim.w - (dim.w + 2 * border)) / 2,
            y: self.pos.y + (self.dim.h - (dim.h + 2 * border)) / 2,
        }
    }

    pub fn split_at_width(
        &self,
        width: i32,
    ) -> (Self, Self) {
        let width = std::cmp::min(width, self.dim.w);

        (
            Self {
                dim: Dim {
                    w: width,
                    ..self.dim
                },
                ..*self
            },
            Self {
                pos: Pos {
                    x: self.pos.x + width,
                    ..self.pos
                },
                dim: Dim {
                    w: self.dim.w - width,
                    ..self.dim
                },
            },
        )
    }

    pub fn with_pos(
        self,
        pos: Pos,
    ) -> Self {
        Self {
            pos,
            dim: self.dim,
        }
    }

    pub fn with_dim(
        self,
        dim: Dim,
    ) -> Self {
        Self {
            pos: self.pos,
            dim,
        }
    }

    /// Grows the region outward by `border` pixels on every side.
    pub fn with_border(
        self,
        border: i32,
    ) -> Self {
        Self {
            pos: self.pos,
            dim: Dim {
                w: self.dim.w + 2 * border,
                h: self.dim.h + 2 * border,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centering_accounts_for_border() {
        let screen = Region::new(0, 0, 1000, 800);
        let pos = screen.center_of(
            Dim {
                w: 196,
                h: 96,
            },
            2,
        );

        assert_eq!(pos, Pos { x: 400, y: 350 });
    }

    #[test]
    fn splitting_never_exceeds_width() {
        let region = Region::new(10, 0, 100, 50);
        let (left, right) = region.split_at_width(150);

        assert_eq!(left, region);
        assert_eq!(right.dim.w, 0);
        assert_eq!(right.pos.x, 110);
    }
}
