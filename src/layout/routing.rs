use tracing::trace;

use crate::geometry::Outline;
use crate::ir::{Graph, NodeId};

/// Marching axis for the approximate boundary query. The caller picks the
/// axis closer to the ray direction so the step count stays bounded and the
/// near-axis-aligned slope never degenerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarchAxis {
    /// Step along y; the ray must not be horizontal.
    VerticalMajor,
    /// Step along x; the ray must not be vertical.
    HorizontalMajor,
}

/// Picks the marching axis for a ray along `(dx, dy)`.
pub fn axis_for(dx: f64, dy: f64) -> MarchAxis {
    if dy.abs() >= dx.abs() {
        MarchAxis::VerticalMajor
    } else {
        MarchAxis::HorizontalMajor
    }
}

/// Whether `(x, y)` in diagram coordinates falls inside the node. Always
/// false for dummy nodes.
pub fn contains_point(graph: &mut Graph, id: NodeId, x: f64, y: f64) -> bool {
    let (cx, cy) = (f64::from(graph.x(id)), f64::from(graph.y(id)));
    let geom = graph.geometry(id);
    match &geom.outline {
        Some(outline) => outline.contains(x - cx, y - cy),
        None => false,
    }
}

/// Boundary point where the ray from the node's center through `(tx, ty)`
/// exits the node, in diagram coordinates.
///
/// The circle family is solved exactly from its radius. Every other shape
/// marches outward in unit steps until containment fails, which bounds the
/// error by one geometric unit. Dummy nodes return their center.
pub fn boundary_along_ray(
    graph: &mut Graph,
    id: NodeId,
    tx: f64,
    ty: f64,
    axis: MarchAxis,
) -> (f64, f64) {
    let (cx, cy) = (f64::from(graph.x(id)), f64::from(graph.y(id)));
    let rx = tx - cx;
    let ry = ty - cy;
    let geom = graph.geometry(id);

    if let Some(radius) = geom.circle_radius {
        let radius = f64::from(radius);
        return match axis {
            MarchAxis::VerticalMajor => {
                let slope = rx / ry;
                let mut y = (radius * radius / (1.0 + slope * slope)).sqrt();
                if ry < 0.0 {
                    y = -y;
                }
                (y * slope + cx, y + cy)
            }
            MarchAxis::HorizontalMajor => {
                let slope = ry / rx;
                let mut x = (radius * radius / (1.0 + slope * slope)).sqrt();
                if rx < 0.0 {
                    x = -x;
                }
                (x + cx, x * slope + cy)
            }
        };
    }

    let Some(outline) = &geom.outline else {
        return (cx, cy);
    };
    let (x, y) = match axis {
        MarchAxis::VerticalMajor => march(outline, rx / ry, if ry < 0.0 { -1.0 } else { 1.0 }, true),
        MarchAxis::HorizontalMajor => {
            march(outline, ry / rx, if rx < 0.0 { -1.0 } else { 1.0 }, false)
        }
    };
    (x + cx, y + cy)
}

/// Unit-step march from the center along a ray in node-local coordinates.
/// `vertical` selects which coordinate advances by `step`; the other follows
/// via `slope`. Returns the first point past the outline.
pub(crate) fn march(outline: &Outline, slope: f64, step: f64, vertical: bool) -> (f64, f64) {
    let mut major = 0.0f64;
    loop {
        let minor = major * slope;
        let (x, y) = if vertical { (minor, major) } else { (major, minor) };
        if !outline.contains(x, y) {
            return (x, y);
        }
        major += step;
    }
}

/// Rightward boundary offset of the node at height `y` (diagram
/// coordinates), used to anchor self-loop routing. Analytic for the circle
/// family, unit-step marching otherwise; zero for dummy nodes.
pub fn boundary_at_height(graph: &mut Graph, id: NodeId, y: f64) -> f64 {
    let (cx, cy) = (f64::from(graph.x(id)), f64::from(graph.y(id)));
    let local_y = y - cy;
    let geom = graph.geometry(id);
    if let Some(radius) = geom.circle_radius {
        let radius = f64::from(radius);
        return (radius * radius - local_y * local_y).sqrt() + cx;
    }
    let Some(outline) = &geom.outline else {
        return 0.0;
    };
    let mut x = 0.0f64;
    while outline.contains(x, local_y) {
        x += 1.0;
    }
    x + cx
}

/// Re-routes every edge touching `layer`.
pub fn route_layer(graph: &mut Graph, layer: usize) {
    trace!(layer, "re-routing layer edges");
    for idx in 0..graph.edges().len() {
        let edge = &graph.edges()[idx];
        let touches = graph.layer_of(edge.from) == layer || graph.layer_of(edge.to) == layer;
        if touches {
            route_edge(graph, idx);
        }
    }
    graph.mark_bounds_dirty();
}

/// Re-routes every edge in the graph.
pub fn route_edges(graph: &mut Graph) {
    trace!("re-routing all edges");
    for idx in 0..graph.edges().len() {
        route_edge(graph, idx);
    }
    graph.mark_bounds_dirty();
}

fn route_edge(graph: &mut Graph, idx: usize) {
    let (from, to) = {
        let edge = &graph.edges()[idx];
        (edge.from, edge.to)
    };
    let points = if from == to {
        route_self_loop(graph, from, self_loop_ordinal(graph, idx))
    } else {
        route_straight(graph, from, to)
    };
    graph.edges_mut()[idx].points = points;
}

/// Position of this edge among the node's self-loops, outermost last.
fn self_loop_ordinal(graph: &Graph, idx: usize) -> i32 {
    let id = graph.edges()[idx].from;
    graph.edges()[..idx]
        .iter()
        .filter(|edge| edge.is_self_loop() && edge.from == id)
        .count() as i32
}

/// A self-loop leaves the right side of the node, swings out into the
/// reserved margin, and comes back below its departure point.
fn route_self_loop(graph: &mut Graph, id: NodeId, ordinal: i32) -> Vec<(f64, f64)> {
    let cy = f64::from(graph.y(id));
    let cx = f64::from(graph.x(id));
    let hh = f64::from(graph.half_height(id));
    let hw = f64::from(graph.half_width(id));
    let y_out = cy - hh / 2.0;
    let y_in = cy + hh / 2.0;
    let x_out = boundary_at_height(graph, id, y_out);
    let x_in = boundary_at_height(graph, id, y_in);
    let base = f64::from(graph.config().self_loop_min_width);
    let gap = f64::from(graph.config().self_loop_x_gap);
    let x_apex = cx + hw + base + gap * f64::from(ordinal);
    vec![(x_out, y_out), (x_apex, y_out), (x_apex, y_in), (x_in, y_in)]
}

/// A regular edge is a straight segment clipped to both shape boundaries.
fn route_straight(graph: &mut Graph, from: NodeId, to: NodeId) -> Vec<(f64, f64)> {
    let (fx, fy) = (f64::from(graph.x(from)), f64::from(graph.y(from)));
    let (tx, ty) = (f64::from(graph.x(to)), f64::from(graph.y(to)));
    if fx == tx && fy == ty {
        return vec![(fx, fy), (tx, ty)];
    }
    let axis = axis_for(tx - fx, ty - fy);
    let start = boundary_along_ray(graph, from, tx, ty, axis);
    let end = boundary_along_ray(graph, to, fx, fy, axis);
    vec![start, end]
}
