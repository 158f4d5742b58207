//! Incremental layout repair and edge routing.
//!
//! [`tweak`] is the entry point: it moves one node and restores the layer
//! ordering and spacing invariants around it, touching as little of the
//! diagram as possible. [`routing`] holds the boundary queries the router
//! clips edges with.

pub mod routing;
pub mod tweak;

pub use routing::{
    MarchAxis, axis_for, boundary_along_ray, boundary_at_height, contains_point, route_edges,
    route_layer,
};
pub use tweak::tweak;
