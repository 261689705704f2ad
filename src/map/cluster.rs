use std::collections::BTreeMap;

use crate::adapters::Marker;
use crate::map::projection::Viewport;

/// Grid step for grouping markers, in braille pixels
pub const CLUSTER_CELL: i32 = 10;
/// From this zoom on every marker is drawn on its own
pub const CLUSTER_OFF_ZOOM: f64 = 512.0;

/// Markers sharing one screen cell
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Pixel position: the member centroid
    pub px: i32,
    pub py: i32,
    /// Indices into the marker slice
    pub members: Vec<usize>,
    pub children: usize,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_single(&self) -> bool {
        self.members.len() == 1
    }
}

/// Group the visible markers. Below `CLUSTER_OFF_ZOOM` markers falling in
/// the same `CLUSTER_CELL` square merge; above it each marker stands alone.
pub fn cluster_markers(markers: &[Marker], viewport: &Viewport) -> Vec<Cluster> {
    let visible = markers.iter().enumerate().filter_map(|(idx, m)| {
        let (px, py) = viewport.project(m.lon, m.lat);
        viewport.is_visible(px, py).then_some((idx, px, py, m.child))
    });

    if viewport.zoom >= CLUSTER_OFF_ZOOM {
        return visible
            .map(|(idx, px, py, child)| Cluster {
                px,
                py,
                members: vec![idx],
                children: usize::from(child),
            })
            .collect();
    }

    let mut cells: BTreeMap<(i32, i32), (i64, i64, Vec<usize>, usize)> = BTreeMap::new();
    for (idx, px, py, child) in visible {
        let key = (px.div_euclid(CLUSTER_CELL), py.div_euclid(CLUSTER_CELL));
        let entry = cells.entry(key).or_default();
        entry.0 += px as i64;
        entry.1 += py as i64;
        entry.2.push(idx);
        entry.3 += usize::from(child);
    }

    cells
        .into_values()
        .map(|(sum_x, sum_y, members, children)| {
            let n = members.len() as i64;
            Cluster {
                px: (sum_x / n) as i32,
                py: (sum_y / n) as i32,
                members,
                children,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(record: usize, lon: f64, lat: f64, child: bool) -> Marker {
        Marker {
            record,
            lat,
            lon,
            child,
        }
    }

    #[test]
    fn test_nearby_markers_merge() {
        let viewport = Viewport::turkey(240, 120);
        let markers = vec![
            marker(0, 32.85, 39.93, false),
            marker(1, 32.86, 39.94, true),
            marker(2, 27.14, 38.42, false),
        ];
        let clusters = cluster_markers(&markers, &viewport);
        assert_eq!(clusters.len(), 2);
        let ankara = clusters.iter().find(|c| c.len() == 2).unwrap();
        assert_eq!(ankara.children, 1);
        assert_eq!(clusters.iter().map(Cluster::len).sum::<usize>(), 3);
    }

    #[test]
    fn test_clustering_disabled_when_zoomed_in() {
        let mut viewport = Viewport::turkey(240, 120);
        viewport.center_lon = 32.85;
        viewport.center_lat = 39.93;
        viewport.zoom = CLUSTER_OFF_ZOOM;
        let markers = vec![marker(0, 32.85, 39.93, false), marker(1, 32.85, 39.93, false)];
        let clusters = cluster_markers(&markers, &viewport);
        assert_eq!(clusters.len(), 2);
        assert!(clusters.iter().all(Cluster::is_single));
    }

    #[test]
    fn test_offscreen_markers_dropped() {
        let viewport = Viewport::turkey(240, 120);
        let markers = vec![marker(0, -74.0, 40.7, false)];
        assert!(cluster_markers(&markers, &viewport).is_empty());
    }
}
