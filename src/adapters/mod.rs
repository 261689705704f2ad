//! Translate filtered records and aggregates into the shapes the widgets and
//! export files expect. No filtering decisions are made here.

pub mod export;
pub mod markup;
pub mod profile;
pub mod series;

pub use export::{export_filename, export_to_dir, markers_geojson, sort_newest_first, write_csv};
pub use markup::{escape_html, Popup};
pub use profile::{format_long_date, ProfileCard};
pub use series::{
    age_bars, hex_rgb, month_axis_labels, monthly_bars, sector_bars, yearly_lines, BarPoint,
    Marker, TableRow, YearLine, ACCENT_COLOR, CHILD_COLOR, TABLE_HEADERS,
};
