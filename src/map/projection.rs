use std::f64::consts::PI;

/// Centre of the default view, roughly the middle of Anatolia
pub const TURKEY_CENTER: (f64, f64) = (35.2, 39.0);
/// Zoom at which the whole country fits a typical terminal
pub const TURKEY_ZOOM: f64 = 16.0;

const MIN_ZOOM: f64 = 2.0;
const MAX_ZOOM: f64 = 2048.0;
const ZOOM_STEP: f64 = 1.5;

/// Normalised Web Mercator y for a latitude
fn mercator_y(lat: f64) -> f64 {
    let lat_rad = lat.clamp(-85.0, 85.0) * PI / 180.0;
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0
}

fn lat_from_mercator_y(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan() * 180.0 / PI
}

/// Visible map area: centre, zoom and canvas size in braille pixels
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub center_lon: f64,
    pub center_lat: f64,
    /// Canvas widths per full world width
    pub zoom: f64,
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            width,
            height,
        }
    }

    /// Whole-country view
    pub fn turkey(width: usize, height: usize) -> Self {
        Self::new(TURKEY_CENTER.0, TURKEY_CENTER.1, TURKEY_ZOOM, width, height)
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    /// Pan by a pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = self.scale().max(1.0);
        self.center_lon = (self.center_lon + dx as f64 * 360.0 / scale).clamp(-180.0, 180.0);
        let y = mercator_y(self.center_lat) + dy as f64 / scale;
        self.center_lat = lat_from_mercator_y(y).clamp(-85.0, 85.0);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
    }

    /// Zoom in keeping the point under `(px, py)` fixed
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, ZOOM_STEP);
    }

    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / ZOOM_STEP);
    }

    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        let (lon, lat) = self.unproject(px, py);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    fn scale(&self) -> f64 {
        self.zoom * self.width as f64
    }

    /// Pixel to (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let scale = self.scale();
        let center_x = (self.center_lon + 180.0) / 360.0;
        let center_y = mercator_y(self.center_lat);

        let x = (px as f64 - self.width as f64 / 2.0) / scale + center_x;
        let y = (py as f64 - self.height as f64 / 2.0) / scale + center_y;

        (x * 360.0 - 180.0, lat_from_mercator_y(y))
    }

    /// (lon, lat) to pixel, Web Mercator
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon + 180.0) / 360.0;
        let y = mercator_y(lat);
        let center_x = (self.center_lon + 180.0) / 360.0;
        let center_y = mercator_y(self.center_lat);
        let scale = self.scale();

        let px = ((x - center_x) * scale + self.width as f64 / 2.0) as i32;
        let py = ((y - center_y) * scale + self.height as f64 / 2.0) as i32;
        (px, py)
    }

    /// Inside the canvas with a small margin for marker glyphs
    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= -10 && px < self.width as i32 + 10 && py >= -10 && py < self.height as i32 + 10
    }

    /// Rough bounding-box test for a segment
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        p1.0.max(p2.0) >= 0
            && p1.0.min(p2.0) < self.width as i32
            && p1.1.max(p2.1) >= 0
            && p1.1.min(p2.1) < self.height as i32
    }

    /// (min_lon, min_lat, max_lon, max_lat) currently on screen
    pub fn visible_bbox(&self) -> (f64, f64, f64, f64) {
        let (min_lon, max_lat) = self.unproject(0, 0);
        let (max_lon, min_lat) = self.unproject(self.width as i32, self.height as i32);
        (min_lon, min_lat, max_lon, max_lat)
    }

    /// Whether a geographic bbox intersects the screen
    pub fn bbox_visible(&self, bbox: (f64, f64, f64, f64)) -> bool {
        let (min_lon, min_lat, max_lon, max_lat) = self.visible_bbox();
        bbox.0 <= max_lon && bbox.2 >= min_lon && bbox.1 <= max_lat && bbox.3 >= min_lat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_center() {
        let vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        assert_eq!(vp.project(0.0, 0.0), (50, 50));
    }

    #[test]
    fn test_pan() {
        let mut vp = Viewport::new(0.0, 0.0, 4.0, 100, 100);
        vp.pan(10, 0);
        assert!(vp.center_lon > 0.0);
        vp.pan(0, 10);
        assert!(vp.center_lat < 0.0);
    }

    #[test]
    fn test_unproject_inverts_project() {
        let vp = Viewport::turkey(200, 100);
        let (px, py) = vp.project(32.85, 39.93);
        let (lon, lat) = vp.unproject(px, py);
        assert!((lon - 32.85).abs() < 0.2);
        assert!((lat - 39.93).abs() < 0.2);
    }

    #[test]
    fn test_turkey_view_contains_the_country() {
        let vp = Viewport::turkey(240, 120);
        for (lon, lat) in [(26.0, 41.0), (44.5, 39.5), (36.0, 36.2), (32.85, 39.93)] {
            let (px, py) = vp.project(lon, lat);
            assert!(px >= 0 && px < 240 && py >= 0 && py < 120, "{lon},{lat} -> {px},{py}");
        }
        assert!(vp.bbox_visible((32.0, 39.0, 33.0, 40.0)));
        assert!(!vp.bbox_visible((-80.0, 30.0, -70.0, 40.0)));
    }

    #[test]
    fn test_zoom_at_keeps_point_fixed() {
        let mut vp = Viewport::turkey(200, 100);
        let before = vp.unproject(50, 30);
        vp.zoom_in_at(50, 30);
        let after = vp.unproject(50, 30);
        assert!((before.0 - after.0).abs() < 0.1);
        assert!((before.1 - after.1).abs() < 0.1);
        assert!(vp.zoom > TURKEY_ZOOM);
    }
}
