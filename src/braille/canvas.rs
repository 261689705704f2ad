/// Bit of each dot inside one braille cell, indexed by `[y % 4][x % 2]`.
/// ```text
/// (0,0) (1,0)   bits: 0x01 0x08
/// (0,1) (1,1)   bits: 0x02 0x10
/// (0,2) (1,2)   bits: 0x04 0x20
/// (0,3) (1,3)   bits: 0x40 0x80
/// ```
const DOT_BITS: [[u8; 2]; 4] = [[0x01, 0x08], [0x02, 0x10], [0x04, 0x20], [0x40, 0x80]];

const BRAILLE_BASE: u32 = 0x2800;

/// Off-screen drawing surface of braille cells. Each terminal cell holds a
/// 2x4 dot grid, so a `w x h` canvas has `2w x 4h` addressable pixels.
#[derive(Debug, Clone)]
pub struct BrailleCanvas {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl BrailleCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel dimensions (braille dots)
    pub fn pixel_size(&self) -> (usize, usize) {
        (self.width * 2, self.height * 4)
    }

    pub fn set_pixel(&mut self, x: usize, y: usize) {
        let (cx, cy) = (x / 2, y / 4);
        if cx >= self.width || cy >= self.height {
            return;
        }
        self.cells[cy * self.width + cx] |= DOT_BITS[y % 4][x % 2];
    }

    /// Signed variant; negative coordinates are clipped
    pub fn set_pixel_signed(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize);
        }
    }

    /// Set every pixel of row `y` between `x0` and `x1` inclusive
    pub fn fill_span(&mut self, y: i32, x0: i32, x1: i32) {
        let (max_x, max_y) = self.pixel_size();
        if y < 0 || y as usize >= max_y || max_x == 0 {
            return;
        }
        let start = x0.min(x1).max(0);
        let end = x0.max(x1).min(max_x as i32 - 1);
        for x in start..=end {
            self.set_pixel(x as usize, y as usize);
        }
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|&b| b == 0)
    }

    /// Braille glyph at a cell, `None` when no dot is set
    pub fn glyph(&self, cx: usize, cy: usize) -> Option<char> {
        if cx >= self.width || cy >= self.height {
            return None;
        }
        match self.cells[cy * self.width + cx] {
            0 => None,
            bits => char::from_u32(BRAILLE_BASE + bits as u32),
        }
    }

    /// Iterate non-empty cells as `(cx, cy, glyph)`
    pub fn glyphs(&self) -> impl Iterator<Item = (usize, usize, char)> + '_ {
        self.cells.iter().enumerate().filter_map(|(idx, &bits)| {
            if bits == 0 {
                return None;
            }
            let glyph = char::from_u32(BRAILLE_BASE + bits as u32)?;
            Some((idx % self.width, idx / self.width, glyph))
        })
    }

    /// One row as text, blank cells included
    pub fn row_to_string(&self, row: usize) -> String {
        if row >= self.height {
            return String::new();
        }
        self.cells[row * self.width..(row + 1) * self.width]
            .iter()
            .map(|&b| char::from_u32(BRAILLE_BASE + b as u32).unwrap_or(' '))
            .collect()
    }

    #[cfg(test)]
    pub fn to_text(&self) -> String {
        (0..self.height)
            .map(|row| self.row_to_string(row))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pixel() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.set_pixel(0, 0);
        assert_eq!(canvas.to_text(), "⠁");
    }

    #[test]
    fn test_all_dots() {
        let mut canvas = BrailleCanvas::new(1, 1);
        for y in 0..4 {
            canvas.fill_span(y, 0, 1);
        }
        assert_eq!(canvas.to_text(), "⣿");
    }

    #[test]
    fn test_diagonal() {
        let mut canvas = BrailleCanvas::new(2, 1);
        for i in 0..4 {
            canvas.set_pixel(i, i);
        }
        assert_eq!(canvas.to_text(), "⠑⢄");
    }

    #[test]
    fn test_out_of_bounds_is_clipped() {
        let mut canvas = BrailleCanvas::new(2, 2);
        canvas.set_pixel_signed(-1, 0);
        canvas.set_pixel(4, 0);
        canvas.fill_span(-3, 0, 3);
        canvas.fill_span(8, 0, 3);
        assert!(canvas.is_blank());

        canvas.fill_span(0, -10, 10);
        assert_eq!(canvas.glyphs().count(), 2);
        assert_eq!(canvas.glyph(1, 0), Some('⠉'));
        assert_eq!(canvas.glyph(0, 1), None);
    }
}
