use crate::client::Client;
use crate::monitor::Monitor;

use winsys::geometry::Region;

/// Fits a requested geometry to the monitor and, for floating clients,
/// to the client's ICCCM size hints. Returns the adjusted geometry and
/// whether it differs from the client's current one.
///
/// Interactive requests stem from pointer drags and are kept on the
/// screen; programmatic ones are kept within the window area.
pub fn constrain(
    monitor: &Monitor,
    client: &Client,
    mut region: Region,
    interactive: bool,
) -> (Region, bool) {
    let current = client.region();
    let outer = client.outer_dim();
    let border = client.border();

    region.dim.w = std::cmp::max(Client::MIN_CLIENT_DIM.w, region.dim.w);
    region.dim.h = std::cmp::max(Client::MIN_CLIENT_DIM.h, region.dim.h);

    let bounds = if interactive {
        monitor.screen()
    } else {
        monitor.window_area()
    };

    {
        let pos = &mut region.pos;
        let dim = region.dim;

        if interactive {
            if pos.x > bounds.right() {
                pos.x = bounds.right() - outer.w;
            }

            if pos.y > bounds.bottom() {
                pos.y = bounds.bottom() - outer.h;
            }

            if pos.x + dim.w + 2 * border < 0 {
                pos.x = 0;
            }

            if pos.y + dim.h + 2 * border < 0 {
                pos.y = 0;
            }
        } else {
            if pos.x >= bounds.right() {
                pos.x = bounds.right() - outer.w;
            }

            if pos.y >= bounds.bottom() {
                pos.y = bounds.bottom() - outer.h;
            }

            if pos.x + dim.w + 2 * border <= bounds.pos.x {
                pos.x = bounds.pos.x;
            }

            if pos.y + dim.h + 2 * border <= bounds.pos.y {
                pos.y = bounds.pos.y;
            }
        }
    }

    region.dim.w = std::cmp::max(region.dim.w, monitor.bar_height());
    region.dim.h = std::cmp::max(region.dim.h, monitor.bar_height());

    if client.is_floating() {
        apply_size_hints(client, &mut region);
    }

    (region, region != current)
}

fn apply_size_hints(
    client: &Client,
    region: &mut Region,
) {
    let hints = client.size_hints();
    let base_is_min = hints.base_is_min();
    let (mut w, mut h) = region.dim.values();

    // ICCCM 4.1.2.3: base size only counts towards aspect when it is not
    // also the minimum size
    if !base_is_min {
        w = w.saturating_sub(hints.base_width);
        h = h.saturating_sub(hints.base_height);
    }

    if hints.min_aspect > 0.0 && hints.max_aspect > 0.0 && w > 0 && h > 0 {
        if hints.max_aspect < w as f32 / h as f32 {
            w = (h as f32 * hints.max_aspect + 0.5) as i32;
        } else if hints.min_aspect < h as f32 / w as f32 {
            h = (w as f32 * hints.min_aspect + 0.5) as i32;
        }
    }

    if base_is_min {
        w = w.saturating_sub(hints.base_width);
        h = h.saturating_sub(hints.base_height);
    }

    // bounding before rounding keeps the result on the increment grid
    if hints.max_width > 0 {
        w = std::cmp::min(w, hints.max_width.saturating_sub(hints.base_width));
    }

    if hints.max_height > 0 {
        h = std::cmp::min(h, hints.max_height.saturating_sub(hints.base_height));
    }

    if hints.inc_width > 0 {
        w -= w % hints.inc_width;
    }

    if hints.inc_height > 0 {
        h -= h % hints.inc_height;
    }

    w = std::cmp::max(w.saturating_add(hints.base_width), hints.min_width);
    h = std::cmp::max(h.saturating_add(hints.base_height), hints.min_height);

    if hints.max_width > 0 {
        w = std::cmp::min(w, hints.max_width);
    }

    if hints.max_height > 0 {
        h = std::cmp::min(h, hints.max_height);
    }

    region.dim.w = w;
    region.dim.h = h;
}
