mod cluster;
mod geometry;
mod projection;
mod renderer;
mod spatial;

pub use cluster::{cluster_markers, Cluster, CLUSTER_OFF_ZOOM};
pub use projection::{Viewport, TURKEY_ZOOM};
pub use renderer::{Label, LabelKind, MapLayers, MapRenderer, Overlay};
pub use spatial::SpatialGrid;
