use std::collections::HashMap;

/// Uniform hash grid over 2D points for nearest-item lookups. Coordinates
/// can be degrees or pixels; only the cell size has to match.
pub struct SpatialGrid<T> {
    cells: HashMap<(i32, i32), Vec<usize>>,
    items: Vec<(f64, f64, T)>,
    cell_size: f64,
}

impl<T> SpatialGrid<T> {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            items: Vec::new(),
            cell_size,
        }
    }

    #[inline(always)]
    fn to_cell(&self, x: f64, y: f64) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    pub fn insert(&mut self, x: f64, y: f64, item: T) {
        let idx = self.items.len();
        self.items.push((x, y, item));
        let cell = self.to_cell(x, y);
        self.cells.entry(cell).or_default().push(idx);
    }

    /// Indices of items in every cell touching the radius (may include
    /// items slightly outside it)
    pub fn query_radius(&self, x: f64, y: f64, radius: f64) -> Vec<usize> {
        let (cx, cy) = self.to_cell(x, y);
        let reach = (radius / self.cell_size).ceil() as i32;
        let mut results = Vec::new();
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                if let Some(indices) = self.cells.get(&(cx + dx, cy + dy)) {
                    results.extend_from_slice(indices);
                }
            }
        }
        results
    }

    /// Closest item within `radius`, ties broken by insertion order
    pub fn nearest(&self, x: f64, y: f64, radius: f64) -> Option<&T> {
        let mut best: Option<(f64, usize)> = None;
        for idx in self.query_radius(x, y, radius) {
            let (ix, iy, _) = &self.items[idx];
            let dist = (ix - x).hypot(iy - y);
            if dist > radius {
                continue;
            }
            let better = match best {
                Some((d, i)) => dist < d || (dist == d && idx < i),
                None => true,
            };
            if better {
                best = Some((dist, idx));
            }
        }
        best.map(|(_, idx)| &self.items[idx].2)
    }

    #[inline(always)]
    pub fn get(&self, idx: usize) -> Option<&T> {
        self.items.get(idx).map(|(_, _, item)| item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Index of feature bounding boxes. Each feature is inserted into every
/// cell its bbox overlaps, so queries have no false negatives; callers
/// run the exact test on the candidates.
pub struct FeatureGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    cell_size: f64,
}

impl FeatureGrid {
    #[inline(always)]
    fn to_cell(cell_size: f64, lon: f64, lat: f64) -> (i32, i32) {
        (
            (lon / cell_size).floor() as i32,
            (lat / cell_size).floor() as i32,
        )
    }

    /// Build from `(min_lon, min_lat, max_lon, max_lat)` boxes in feature order
    pub fn build(bboxes: impl Iterator<Item = (f64, f64, f64, f64)>, cell_size: f64) -> Self {
        let mut cells: HashMap<(i32, i32), Vec<usize>> = HashMap::new();
        for (idx, (min_lon, min_lat, max_lon, max_lat)) in bboxes.enumerate() {
            let min_cell = Self::to_cell(cell_size, min_lon, min_lat);
            let max_cell = Self::to_cell(cell_size, max_lon, max_lat);
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        Self { cells, cell_size }
    }

    /// Candidate features whose bbox may contain the point
    pub fn candidates(&self, lon: f64, lat: f64) -> &[usize] {
        self.cells
            .get(&Self::to_cell(self.cell_size, lon, lat))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
