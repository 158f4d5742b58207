use tracing::{debug, trace};

use crate::ir::{Graph, NodeId};
use crate::layout::routing::{route_edges, route_layer};

/// Moves `id` to `(x, y)` and incrementally repairs the layout around it.
///
/// Horizontal motion reorders the node within its layer by swapping past
/// neighbors it has crossed, shoving displaced neighbors just far enough to
/// clear it. Vertical motion drags the whole layer and cascades the shift
/// through any layers it would collide with. Only the affected edges are
/// re-routed.
pub fn tweak(graph: &mut Graph, id: NodeId, x: i32, y: i32) {
    let cx = graph.x(id);
    let cy = graph.y(id);
    if cx == x && cy == y {
        return;
    }
    debug!(node = id.index(), from_x = cx, from_y = cy, to_x = x, to_y = y, "tweak");
    let layer = graph.layer_of(id);
    let pos = match graph.position_in_layer(id) {
        Some(pos) => pos,
        None => return,
    };
    if cx > x {
        swap_left(graph, layer, pos, x);
    } else if cx < x {
        swap_right(graph, layer, pos, x);
    }
    if cy > y {
        shift_up(graph, layer, y);
    } else if cy < y {
        shift_down(graph, layer, y);
    } else {
        route_layer(graph, layer);
    }
    graph.bounds();
}

/// Half-width used when deciding whether two nodes have crossed. Dummy
/// nodes get a small slab so edges passing through them keep clearance.
fn swap_half_width(graph: &mut Graph, id: NodeId) -> i32 {
    if graph.is_dummy(id) {
        2
    } else {
        graph.half_width(id)
    }
}

/// Half-width used when shoving neighbors along a layer. Dummy nodes take
/// no room of their own here.
fn walk_half_width(graph: &mut Graph, id: NodeId) -> i32 {
    if graph.is_dummy(id) {
        0
    } else {
        graph.half_width(id)
    }
}

/// Walks `id` leftward from index `i`, swapping past each neighbor whose
/// right edge it has crossed and shoving the displaced neighbor to the
/// right of the moved node's reserved span.
fn swap_left(graph: &mut Graph, layer: usize, mut i: usize, x: i32) {
    let id = graph.layer(layer)[i];
    let side = swap_half_width(graph, id);
    let left = x - side;
    loop {
        if i == 0 {
            graph.set_x(id, x);
            return;
        }
        let other = graph.layer(layer)[i - 1];
        let other_side = swap_half_width(graph, other);
        if graph.x(other) + other_side + graph.reserved(other) < left {
            graph.set_x(id, x);
            return;
        }
        trace!(moved = id.index(), past = other.index(), "swap left");
        graph.swap_nodes(layer, i, i - 1);
        i -= 1;
        let reserved = graph.reserved(id);
        shift_right(graph, layer, i + 1, x + side + reserved + other_side);
    }
}

/// Mirror of [`swap_left`] for rightward motion. The crossing test uses
/// the moved node's right edge including its own reserved span.
fn swap_right(graph: &mut Graph, layer: usize, mut i: usize, x: i32) {
    let id = graph.layer(layer)[i];
    let side = swap_half_width(graph, id);
    let right = x + side + graph.reserved(id);
    loop {
        if i + 1 == graph.layer(layer).len() {
            graph.set_x(id, x);
            return;
        }
        let other = graph.layer(layer)[i + 1];
        let other_side = swap_half_width(graph, other);
        if graph.x(other) - other_side > right {
            graph.set_x(id, x);
            return;
        }
        trace!(moved = id.index(), past = other.index(), "swap right");
        graph.swap_nodes(layer, i, i + 1);
        i += 1;
        let reserved = graph.reserved(other);
        shift_left(graph, layer, i - 1, x - side - reserved - other_side);
    }
}

/// Places the node at index `i` at `x`, then walks rightward shoving each
/// neighbor that would overlap the running right edge.
fn shift_right(graph: &mut Graph, layer: usize, i: usize, x: i32) {
    let id = graph.layer(layer)[i];
    graph.set_x(id, x);
    let mut edge = x + walk_half_width(graph, id) + graph.reserved(id);
    let gap = graph.config().x_gap();
    for j in i + 1..graph.layer(layer).len() {
        let nid = graph.layer(layer)[j];
        let side = walk_half_width(graph, nid);
        if graph.x(nid) - side - gap < edge {
            graph.set_x(nid, edge + side + gap);
        }
        edge = graph.x(nid) + side + graph.reserved(nid);
    }
}

/// Mirror of [`shift_right`], walking leftward.
fn shift_left(graph: &mut Graph, layer: usize, i: usize, x: i32) {
    let id = graph.layer(layer)[i];
    graph.set_x(id, x);
    let mut edge = x - walk_half_width(graph, id);
    let gap = graph.config().x_gap();
    for j in (0..i).rev() {
        let nid = graph.layer(layer)[j];
        let side = walk_half_width(graph, nid);
        let reserved = graph.reserved(nid);
        if graph.x(nid) + side + reserved + gap > edge {
            graph.set_x(nid, edge - side - reserved - gap);
        }
        edge = graph.x(nid) - side;
    }
}

/// Moves `layer` up to `y` and cascades the shift through every layer
/// above that would collide, then re-routes all edges.
fn shift_up(graph: &mut Graph, layer: usize, y: i32) {
    trace!(layer, y, "shift up");
    let gap = graph.config().y_gap();
    graph.set_layer_y(layer, y);
    let mut top = y - graph.layer_half_height(layer);
    for k in (0..layer).rev() {
        let half = graph.layer_half_height(k);
        if graph.layer_y(k) + half + gap > top {
            graph.set_layer_y(k, top - half - gap);
        }
        top = graph.layer_y(k) - half;
    }
    route_edges(graph);
}

/// Mirror of [`shift_up`] for downward motion.
fn shift_down(graph: &mut Graph, layer: usize, y: i32) {
    trace!(layer, y, "shift down");
    let gap = graph.config().y_gap();
    graph.set_layer_y(layer, y);
    let mut bottom = y + graph.layer_half_height(layer);
    for k in layer + 1..graph.layer_count() {
        let half = graph.layer_half_height(k);
        if graph.layer_y(k) - half - gap < bottom {
            graph.set_layer_y(k, bottom + half + gap);
        }
        bottom = graph.layer_y(k) + half;
    }
    route_edges(graph);
}
