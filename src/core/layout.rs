use winsys::geometry::Region;

/// Master/stack tiling. The first client takes the master column at full
/// height; the others split the remaining column's height evenly from the
/// top down. `borders` holds each tiled client's border width, in order,
/// and the returned regions exclude those borders.
pub fn tile(
    area: Region,
    mfact: f32,
    borders: &[i32],
) -> Vec<Region> {
    let n = borders.len() as i32;

    if n == 0 {
        return Vec::new();
    }

    let (pos, dim) = area.values();
    let master_width = if n > 1 {
        // absorb representation error so 1000 * 0.52 yields 520
        (dim.w as f32 * mfact + 1e-3).floor() as i32
    } else {
        dim.w
    };

    let mut stack_y = 0;

    borders
        .iter()
        .enumerate()
        .map(|(i, &border)| {
            let i = i as i32;

            if i == 0 {
                Region::new(
                    pos.x,
                    pos.y,
                    master_width - 2 * border,
                    dim.h - 2 * border,
                )
            } else {
                let h = (dim.h - stack_y) / (n - i);
                let region = Region::new(
                    pos.x + master_width,
                    pos.y + stack_y,
                    dim.w - master_width - 2 * border,
                    h - 2 * border,
                );

                if stack_y + h < dim.h {
                    stack_y += h;
                }

                region
            }
        })
        .collect()
}
