use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

use crate::adapters::{hex_rgb, ACCENT_COLOR, CHILD_COLOR};
use crate::braille::BrailleCanvas;
use crate::map::{LabelKind, MapLayers};
use crate::query::Tier;

pub fn rgb(hex: &str) -> Color {
    let (r, g, b) = hex_rgb(hex);
    Color::Rgb(r, g, b)
}

pub fn tier_color(tier: Tier) -> Color {
    rgb(tier.color())
}

/// Braille map with labels and the mouse cursor overlaid
pub struct MapWidget {
    pub layers: MapLayers,
    pub cursor: Option<(u16, u16)>,
}

impl MapWidget {
    pub fn new(layers: MapLayers) -> Self {
        Self {
            layers,
            cursor: None,
        }
    }

    pub fn cursor(mut self, cursor: Option<(u16, u16)>) -> Self {
        self.cursor = cursor;
        self
    }

    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for (cx, cy, ch) in canvas.glyphs() {
            if cx >= area.width as usize || cy >= area.height as usize {
                continue;
            }
            buf[(area.x + cx as u16, area.y + cy as u16)]
                .set_char(ch)
                .set_fg(color);
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (tier, canvas) in &self.layers.fills {
            Self::render_layer(canvas, tier_color(*tier), area, buf);
        }
        Self::render_layer(&self.layers.outlines, Color::DarkGray, area, buf);
        Self::render_layer(&self.layers.markers, rgb(ACCENT_COLOR), area, buf);
        Self::render_layer(&self.layers.child_markers, rgb(CHILD_COLOR), area, buf);

        for label in &self.layers.labels {
            if label.y >= area.height || label.x >= area.width {
                continue;
            }
            let style = match label.kind {
                LabelKind::ClusterCount => Style::default()
                    .fg(Color::White)
                    .bg(rgb(ACCENT_COLOR))
                    .add_modifier(Modifier::BOLD),
                LabelKind::Province => Style::default().fg(Color::Gray),
            };
            let room = (area.width - label.x) as usize;
            let y = area.y + label.y;
            for (i, ch) in label.text.chars().take(room.min(24)).enumerate() {
                buf[(area.x + label.x + i as u16, y)].set_char(ch).set_style(style);
            }
        }

        if let Some((cx, cy)) = self.cursor {
            if cx < area.width && cy < area.height {
                buf[(area.x + cx, area.y + cy)].set_char('╋').set_fg(Color::Yellow);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Label, LabelKind};

    fn layers(width: usize, height: usize) -> MapLayers {
        MapLayers {
            fills: Vec::new(),
            outlines: BrailleCanvas::new(width, height),
            markers: BrailleCanvas::new(width, height),
            child_markers: BrailleCanvas::new(width, height),
            labels: Vec::new(),
        }
    }

    #[test]
    fn test_blank_cells_left_untouched() {
        let mut layers = layers(4, 2);
        layers.markers.set_pixel(0, 0);
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        MapWidget::new(layers).render(area, &mut buf);
        assert_eq!(buf[(0, 0)].symbol(), "⠁");
        assert_eq!(buf[(0, 0)].fg, rgb(ACCENT_COLOR));
        assert_eq!(buf[(1, 0)].symbol(), " ");
    }

    #[test]
    fn test_child_layer_over_markers_and_labels_clipped() {
        let mut layers = layers(4, 1);
        layers.markers.set_pixel(2, 0);
        layers.child_markers.set_pixel(2, 0);
        layers.labels.push(Label {
            x: 2,
            y: 0,
            text: "12345".into(),
            kind: LabelKind::ClusterCount,
        });
        let area = Rect::new(0, 0, 4, 1);
        let mut buf = Buffer::empty(area);
        MapWidget::new(layers).cursor(Some((0, 0))).render(area, &mut buf);
        assert_eq!(buf[(1, 0)].fg, rgb(CHILD_COLOR));
        assert_eq!(buf[(2, 0)].symbol(), "1");
        assert_eq!(buf[(3, 0)].symbol(), "2");
        assert_eq!(buf[(0, 0)].symbol(), "╋");
    }
}
