//! End-to-end drag scenarios against the public API.

use layerflow::{
    Graph, LayoutConfig, NodeId, ShapeKind, layout_dump::LayoutDump, route_edges,
    text_metrics::FixedMetrics, tweak,
};

fn graph() -> Graph {
    Graph::new(LayoutConfig::default(), Box::new(FixedMetrics::default()))
}

fn grid(g: &mut Graph, layers: usize, per_layer: usize) -> Vec<Vec<NodeId>> {
    (0..layers)
        .map(|layer| {
            (0..per_layer)
                .map(|col| {
                    let label = format!("n{layer}_{col}");
                    let id = g
                        .add_node(layer, Some(ShapeKind::Box), &[label.as_str()])
                        .expect("node");
                    g.set_x(id, col as i32 * 90);
                    g.set_y(id, layer as i32 * 60);
                    id
                })
                .collect()
        })
        .collect()
}

/// Non-overlap along each layer: every node's right edge plus its reserved
/// self-loop margin must not pass the next node's left edge.
fn assert_layers_packed(g: &mut Graph) {
    for layer in 0..g.layer_count() {
        let ids = g.layer(layer).to_vec();
        for pair in ids.windows(2) {
            let right = g.x(pair[0]) + g.half_width(pair[0]) + g.reserved(pair[0]);
            let left = g.x(pair[1]) - g.half_width(pair[1]);
            assert!(
                right <= left,
                "layer {layer}: node {} right {right} passes node {} left {left}",
                pair[0].index(),
                pair[1].index()
            );
        }
    }
}

/// Layers keep their top-to-bottom order with at least the vertical gap.
fn assert_layers_ordered(g: &mut Graph) {
    let gap = g.config().y_gap();
    for layer in 1..g.layer_count() {
        let above = g.layer_y(layer - 1) + g.layer_half_height(layer - 1);
        let below = g.layer_y(layer) - g.layer_half_height(layer);
        assert!(
            above + gap <= below,
            "layer {layer} crowds the layer above: {above} vs {below}"
        );
    }
}

#[test]
fn drag_sequence_preserves_order_and_spacing() {
    let mut g = graph();
    let rows = grid(&mut g, 3, 4);
    g.add_edge(rows[0][0], rows[1][1]);
    g.add_edge(rows[1][1], rows[2][2]);
    route_edges(&mut g);

    tweak(&mut g, rows[1][0], 400, 60);
    tweak(&mut g, rows[1][3], -50, 60);
    tweak(&mut g, rows[0][2], 180, -40);
    assert_layers_packed(&mut g);
    assert_layers_ordered(&mut g);
}

#[test]
fn random_drags_never_break_the_invariants() {
    // Splitmix-style generator keeps the walk deterministic.
    let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as i64
    };
    let mut g = graph();
    let rows = grid(&mut g, 4, 5);
    let flat: Vec<NodeId> = rows.iter().flatten().copied().collect();
    for _ in 0..200 {
        let id = flat[(next() as usize) % flat.len()];
        let x = (next() % 1200 - 600) as i32;
        let y = (next() % 800 - 200) as i32;
        tweak(&mut g, id, x, y);
        assert_layers_packed(&mut g);
        assert_layers_ordered(&mut g);
    }
}

#[test]
fn drag_updates_the_diagram_bounds() {
    let mut g = graph();
    let rows = grid(&mut g, 2, 2);
    let before = g.bounds();
    tweak(&mut g, rows[0][1], 900, 0);
    let after = g.bounds();
    assert!(after.right > before.right);
    assert!(after.right >= 900);
}

#[test]
fn edges_follow_the_dragged_node() {
    let mut g = graph();
    let rows = grid(&mut g, 2, 2);
    g.add_edge(rows[0][0], rows[1][0]);
    route_edges(&mut g);
    let before = g.edges()[0].points.clone();
    tweak(&mut g, rows[0][0], 30, -20);
    let after = &g.edges()[0].points;
    assert_ne!(&before, after);
    // The start point tracks the moved node's new center.
    assert!((after[0].0 - 30.0).abs() <= g.half_width(rows[0][0]) as f64 + 1.0);
}

#[test]
fn self_loop_margin_survives_a_drag() {
    let mut g = graph();
    let rows = grid(&mut g, 1, 3);
    g.add_edge(rows[0][1], rows[0][1]);
    route_edges(&mut g);
    tweak(&mut g, rows[0][1], 170, 0);
    assert_layers_packed(&mut g);
    let apex = g.edges()[0]
        .points
        .iter()
        .map(|p| p.0)
        .fold(f64::MIN, f64::max);
    let cx = f64::from(g.x(rows[0][1]));
    let hw = f64::from(g.half_width(rows[0][1]));
    assert!(apex > cx + hw);
}

#[test]
fn dump_reflects_tweaked_positions() {
    let mut g = graph();
    let rows = grid(&mut g, 2, 2);
    tweak(&mut g, rows[0][0], 45, -10);
    let dump = LayoutDump::from_graph(&mut g);
    let node = dump
        .nodes
        .iter()
        .find(|n| n.id == rows[0][0].index())
        .expect("dumped node");
    assert_eq!(node.x, 45);
    assert_eq!(node.y, -10);
}
