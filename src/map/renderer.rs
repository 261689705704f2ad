use std::collections::HashMap;

use rayon::prelude::*;
use tracing::warn;

use crate::braille::BrailleCanvas;
use crate::data::{Geography, Province};
use crate::map::cluster::Cluster;
use crate::map::geometry::{contains_point, draw_circle, draw_line, fill_polygon};
use crate::map::projection::Viewport;
use crate::map::spatial::FeatureGrid;
use crate::query::Tier;

/// Province bbox index granularity, degrees
const GRID_CELL_DEG: f64 = 0.5;
/// Province names are drawn from this zoom on
const PROVINCE_LABEL_ZOOM: f64 = 48.0;

/// What to draw on top of the province outlines
pub enum Overlay<'a> {
    None,
    Markers(&'a [Cluster]),
    Choropleth(&'a HashMap<String, Tier>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    ClusterCount,
    Province,
}

/// Text placed over the braille layers, in cell coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub x: u16,
    pub y: u16,
    pub text: String,
    pub kind: LabelKind,
}

/// Rendered layers, composed back to front by the map widget
pub struct MapLayers {
    pub fills: Vec<(Tier, BrailleCanvas)>,
    pub outlines: BrailleCanvas,
    pub markers: BrailleCanvas,
    pub child_markers: BrailleCanvas,
    pub labels: Vec<Label>,
}

#[derive(Debug, Clone)]
pub struct DisplaySettings {
    pub show_outlines: bool,
    pub show_labels: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_outlines: true,
            show_labels: true,
        }
    }
}

/// Draws province geometry, clustered markers and choropleth fills
pub struct MapRenderer {
    geography: Geography,
    grid: FeatureGrid,
    pub settings: DisplaySettings,
}

impl MapRenderer {
    pub fn new(geography: Geography) -> Self {
        if geography.is_empty() {
            warn!("no province geometry, map shows markers only");
        }
        let grid = FeatureGrid::build(geography.provinces.iter().map(|p| p.bbox), GRID_CELL_DEG);
        Self {
            geography,
            grid,
            settings: DisplaySettings::default(),
        }
    }

    pub fn has_data(&self) -> bool {
        !self.geography.is_empty()
    }

    pub fn geography(&self) -> &Geography {
        &self.geography
    }

    /// Province under a geographic point
    pub fn province_at(&self, lon: f64, lat: f64) -> Option<&Province> {
        self.grid
            .candidates(lon, lat)
            .iter()
            .filter_map(|&idx| self.geography.provinces.get(idx))
            .find(|p| contains_point(&p.rings, lon, lat))
    }

    pub fn toggle_outlines(&mut self) {
        self.settings.show_outlines = !self.settings.show_outlines;
    }

    pub fn toggle_labels(&mut self) {
        self.settings.show_labels = !self.settings.show_labels;
    }

    /// Render every layer for a `width x height` cell area
    pub fn render(&self, width: usize, height: usize, viewport: &Viewport, overlay: &Overlay) -> MapLayers {
        let mut layers = MapLayers {
            fills: Vec::new(),
            outlines: BrailleCanvas::new(width, height),
            markers: BrailleCanvas::new(width, height),
            child_markers: BrailleCanvas::new(width, height),
            labels: Vec::new(),
        };

        if let Overlay::Choropleth(tiers) = overlay {
            layers.fills = self.fill_tiers(width, height, viewport, tiers);
        }

        let visible: Vec<&Province> = self
            .geography
            .provinces
            .iter()
            .filter(|p| viewport.bbox_visible(p.bbox))
            .collect();

        if self.settings.show_outlines {
            for province in &visible {
                for ring in &province.rings {
                    draw_ring_geo(&mut layers.outlines, ring, viewport);
                }
            }
        }

        if self.settings.show_labels && viewport.zoom >= PROVINCE_LABEL_ZOOM {
            for province in &visible {
                let (min_lon, min_lat, max_lon, max_lat) = province.bbox;
                let (px, py) = viewport.project((min_lon + max_lon) / 2.0, (min_lat + max_lat) / 2.0);
                if let Some((x, y)) = cell_of(px, py, width, height) {
                    let x = x.saturating_sub((province.name.chars().count() / 2) as u16);
                    layers.labels.push(Label {
                        x,
                        y,
                        text: province.name.clone(),
                        kind: LabelKind::Province,
                    });
                }
            }
        }

        if let Overlay::Markers(clusters) = overlay {
            for cluster in clusters.iter() {
                if cluster.is_single() {
                    let canvas = if cluster.children > 0 {
                        &mut layers.child_markers
                    } else {
                        &mut layers.markers
                    };
                    draw_circle(canvas, cluster.px, cluster.py, 1);
                } else {
                    draw_circle(&mut layers.markers, cluster.px, cluster.py, 3);
                    if let Some((x, y)) = cell_of(cluster.px, cluster.py, width, height) {
                        layers.labels.push(Label {
                            x: x.saturating_add(2),
                            y,
                            text: cluster.len().to_string(),
                            kind: LabelKind::ClusterCount,
                        });
                    }
                }
            }
        }

        layers
    }

    /// One canvas per tier, rasterised in parallel
    fn fill_tiers(
        &self,
        width: usize,
        height: usize,
        viewport: &Viewport,
        tiers: &HashMap<String, Tier>,
    ) -> Vec<(Tier, BrailleCanvas)> {
        Tier::ALL
            .par_iter()
            .map(|&tier| {
                let mut canvas = BrailleCanvas::new(width, height);
                let members = self.geography.provinces.iter().filter(|p| {
                    tiers.get(&p.name).copied().unwrap_or(Tier::Zero) == tier
                        && viewport.bbox_visible(p.bbox)
                });
                for province in members {
                    let rings: Vec<Vec<(i32, i32)>> = province
                        .rings
                        .iter()
                        .map(|ring| ring.iter().map(|&(lon, lat)| viewport.project(lon, lat)).collect())
                        .collect();
                    fill_polygon(&mut canvas, &rings);
                }
                (tier, canvas)
            })
            .collect()
    }
}

/// Project and stroke a ring, skipping segments that are off screen or
/// implausibly long
fn draw_ring_geo(canvas: &mut BrailleCanvas, ring: &[(f64, f64)], viewport: &Viewport) {
    let mut prev: Option<(i32, i32)> = None;
    for &(lon, lat) in ring {
        let (px, py) = viewport.project(lon, lat);
        if let Some((prev_x, prev_y)) = prev {
            let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
            if dist < viewport.width.max(1) * 2
                && viewport.line_might_be_visible((prev_x, prev_y), (px, py))
            {
                draw_line(canvas, prev_x, prev_y, px, py);
            }
        }
        prev = Some((px, py));
    }
}

/// Braille pixel to cell, `None` when outside the area
fn cell_of(px: i32, py: i32, width: usize, height: usize) -> Option<(u16, u16)> {
    if px < 0 || py < 0 {
        return None;
    }
    let (cx, cy) = ((px / 2) as usize, (py / 4) as usize);
    (cx < width && cy < height).then_some((cx as u16, cy as u16))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Province;

    fn square(name: &str, lon: f64, lat: f64) -> Province {
        let ring = vec![
            (lon, lat),
            (lon + 1.0, lat),
            (lon + 1.0, lat + 1.0),
            (lon, lat + 1.0),
            (lon, lat),
        ];
        Province {
            name: name.into(),
            rings: vec![ring],
            bbox: (lon, lat, lon + 1.0, lat + 1.0),
        }
    }

    fn renderer() -> MapRenderer {
        MapRenderer::new(Geography {
            provinces: vec![square("Ankara", 32.0, 39.0), square("Konya", 32.0, 37.0)],
        })
    }

    #[test]
    fn test_province_at() {
        let renderer = renderer();
        assert_eq!(renderer.province_at(32.5, 39.5).map(|p| p.name.as_str()), Some("Ankara"));
        assert_eq!(renderer.province_at(32.5, 37.2).map(|p| p.name.as_str()), Some("Konya"));
        assert!(renderer.province_at(32.5, 38.5).is_none());
    }

    #[test]
    fn test_outlines_and_choropleth_layers() {
        let renderer = renderer();
        let viewport = Viewport::turkey(240, 120);
        let mut tiers = HashMap::new();
        tiers.insert("Ankara".to_string(), Tier::Top);

        let layers = renderer.render(120, 30, &viewport, &Overlay::Choropleth(&tiers));
        assert!(!layers.outlines.is_blank());
        assert_eq!(layers.fills.len(), Tier::ALL.len());
        let filled = |t: Tier| {
            layers
                .fills
                .iter()
                .find(|(tier, _)| *tier == t)
                .is_some_and(|(_, c)| !c.is_blank())
        };
        assert!(filled(Tier::Top));
        // Konya has no count and lands in the zero tier
        assert!(filled(Tier::Zero));
        assert!(!filled(Tier::Low));
    }

    #[test]
    fn test_cluster_labels() {
        let renderer = renderer();
        let viewport = Viewport::turkey(240, 120);
        let clusters = vec![
            Cluster {
                px: 100,
                py: 40,
                members: vec![0, 1, 2],
                children: 0,
            },
            Cluster {
                px: 20,
                py: 20,
                members: vec![3],
                children: 1,
            },
        ];
        let layers = renderer.render(120, 30, &viewport, &Overlay::Markers(&clusters));
        assert_eq!(layers.labels.len(), 1);
        assert_eq!(layers.labels[0].text, "3");
        assert!(!layers.child_markers.is_blank());
        assert!(!layers.markers.is_blank());
    }
}
