use crate::registry::ClientId;

use winsys::geometry::Dim;
use winsys::geometry::Pos;
use winsys::geometry::Region;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DragKind {
    Move,
    Resize,
}

/// An interactive move or resize in progress. While one exists the model
/// only reacts to pointer motion and release, defers ordinary input, and
/// keeps serving requests from other clients.
#[derive(Debug, Clone)]
pub struct Drag {
    kind: DragKind,
    client: ClientId,
    grip_pos: Pos,
    origin: Region,
    last_motion: Option<u32>,
}

impl Drag {
    pub fn new(
        kind: DragKind,
        client: ClientId,
        grip_pos: Pos,
        origin: Region,
    ) -> Self {
        Self {
            kind,
            client,
            grip_pos,
            origin,
            last_motion: None,
        }
    }

    #[inline]
    pub fn kind(&self) -> DragKind {
        self.kind
    }

    #[inline]
    pub fn client(&self) -> ClientId {
        self.client
    }

    /// Records a motion timestamp, returning false when it arrives within
    /// `throttle_ms` of the last accepted one.
    pub fn accept_motion(
        &mut self,
        time: u32,
        throttle_ms: u32,
    ) -> bool {
        if let Some(last) = self.last_motion {
            if time.wrapping_sub(last) <= throttle_ms {
                return false;
            }
        }

        self.last_motion = Some(time);
        true
    }

    /// Where the client's origin goes when the pointer is at `pos`.
    pub fn moved_pos(
        &self,
        pos: Pos,
    ) -> Pos {
        self.origin.pos + (pos - self.grip_pos)
    }

    /// The size that puts the client's bottom-right corner under `pos`.
    pub fn resized_dim(
        &self,
        pos: Pos,
        border: i32,
    ) -> Dim {
        Dim {
            w: std::cmp::max(pos.x - self.origin.pos.x - 2 * border + 1, 1),
            h: std::cmp::max(pos.y - self.origin.pos.y - 2 * border + 1, 1),
        }
    }
}
