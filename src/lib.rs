pub mod config;
pub mod geometry;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod text_metrics;

pub use config::{LayoutConfig, load_config};
pub use geometry::{NodeGeometry, Outline};
pub use ir::{Bounds, Edge, Graph, GraphError, LineStyle, NodeId, ShapeKind};
pub use layout::{
    MarchAxis, axis_for, boundary_along_ray, boundary_at_height, contains_point, route_edges,
    route_layer, tweak,
};
pub use layout_dump::{LayoutDump, write_layout_dump};
pub use text_metrics::{FixedMetrics, FontMetrics, TextMetrics};
