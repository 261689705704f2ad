use crate::braille::BrailleCanvas;

/// Bresenham line
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);

    loop {
        canvas.set_pixel_signed(x, y);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Small plus-shaped marker
pub fn draw_marker(canvas: &mut BrailleCanvas, x: i32, y: i32, size: i32) {
    for i in -size..=size {
        canvas.set_pixel_signed(x + i, y);
        canvas.set_pixel_signed(x, y + i);
    }
}

/// Filled disc
pub fn draw_circle(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32) {
    for dy in -radius..=radius {
        let half = ((radius * radius - dy * dy) as f64).sqrt() as i32;
        canvas.fill_span(cy + dy, cx - half, cx + half);
    }
}

/// Outline of a closed ring given in pixel coordinates
pub fn draw_ring(canvas: &mut BrailleCanvas, ring: &[(i32, i32)]) {
    for pair in ring.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        draw_line(canvas, x0, y0, x1, y1);
    }
}

/// Scanline fill of a polygon set with the even-odd rule, so hole rings
/// punch through their exterior. Rows outside the canvas are skipped.
pub fn fill_polygon(canvas: &mut BrailleCanvas, rings: &[Vec<(i32, i32)>]) {
    let (_, height) = canvas.pixel_size();
    let Some((min_y, max_y)) = rings
        .iter()
        .flatten()
        .fold(None, |acc: Option<(i32, i32)>, &(_, y)| match acc {
            Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
            None => Some((y, y)),
        })
    else {
        return;
    };

    let mut crossings = Vec::new();
    for y in min_y.max(0)..=max_y.min(height as i32 - 1) {
        // sample at the pixel centre so shared vertices are not counted twice
        let sy = y as f64 + 0.5;
        crossings.clear();
        for ring in rings {
            if ring.len() < 3 {
                continue;
            }
            let mut prev = ring[ring.len() - 1];
            for &cur in ring {
                let (y0, y1) = (prev.1 as f64, cur.1 as f64);
                if (y0 <= sy) != (y1 <= sy) {
                    let t = (sy - y0) / (y1 - y0);
                    crossings.push(prev.0 as f64 + t * (cur.0 - prev.0) as f64);
                }
                prev = cur;
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));
        for span in crossings.chunks_exact(2) {
            canvas.fill_span(y, span[0].round() as i32, span[1].round() as i32);
        }
    }
}

/// Even-odd point-in-polygon over every ring of a province
pub fn contains_point(rings: &[Vec<(f64, f64)>], x: f64, y: f64) -> bool {
    let mut inside = false;
    for ring in rings {
        let Some(&last) = ring.last() else {
            continue;
        };
        let mut prev = last;
        for &cur in ring {
            if (cur.1 > y) != (prev.1 > y) {
                let cross = (prev.0 - cur.0) * (y - cur.1) / (prev.1 - cur.1) + cur.0;
                if x < cross {
                    inside = !inside;
                }
            }
            prev = cur;
        }
    }
    inside
}
