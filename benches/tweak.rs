use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use layerflow::config::LayoutConfig;
use layerflow::ir::{Graph, NodeId, ShapeKind};
use layerflow::layout::{boundary_along_ray, axis_for, route_edges, tweak};
use layerflow::text_metrics::FixedMetrics;
use std::hint::black_box;

fn layered_graph(layers: usize, per_layer: usize) -> (Graph, Vec<NodeId>) {
    let mut graph = Graph::new(LayoutConfig::default(), Box::new(FixedMetrics::default()));
    let mut ids = Vec::with_capacity(layers * per_layer);
    for layer in 0..layers {
        for col in 0..per_layer {
            let label = format!("node{layer}x{col}");
            let id = graph
                .add_node(layer, Some(ShapeKind::Box), &[label.as_str()])
                .expect("node");
            graph.set_x(id, col as i32 * 90);
            graph.set_y(id, layer as i32 * 60);
            ids.push(id);
        }
    }
    for pair in ids.windows(per_layer + 1) {
        graph.add_edge(pair[0], pair[per_layer]);
    }
    route_edges(&mut graph);
    (graph, ids)
}

fn drag_targets(count: usize) -> Vec<(usize, i32, i32)> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    (0..count)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let bits = state >> 33;
            (
                (bits % 1024) as usize,
                ((bits >> 10) % 1000) as i32 - 500,
                ((bits >> 20) % 600) as i32 - 100,
            )
        })
        .collect()
}

fn bench_tweak(c: &mut Criterion) {
    let mut group = c.benchmark_group("tweak");
    for (layers, per_layer) in [(4usize, 8usize), (8, 16), (16, 32)] {
        let name = format!("grid_{}x{}", layers, per_layer);
        let targets = drag_targets(50);
        group.bench_with_input(BenchmarkId::from_parameter(name), &targets, |b, targets| {
            b.iter(|| {
                let (mut graph, ids) = layered_graph(layers, per_layer);
                for &(pick, x, y) in targets {
                    let id = ids[pick % ids.len()];
                    tweak(&mut graph, black_box(id), black_box(x), black_box(y));
                }
                black_box(graph.bounds());
            });
        });
    }
    group.finish();
}

fn bench_boundary_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("boundary_query");
    for shape in [
        ShapeKind::Box,
        ShapeKind::Diamond,
        ShapeKind::Circle,
        ShapeKind::TripleOctagon,
        ShapeKind::Ellipse,
    ] {
        let mut graph = Graph::new(LayoutConfig::default(), Box::new(FixedMetrics::default()));
        let id = graph
            .add_node(0, Some(shape), &["benchmark label"])
            .expect("node");
        group.bench_with_input(
            BenchmarkId::from_parameter(shape.as_str()),
            &id,
            |b, &id| {
                b.iter(|| {
                    let mut acc = 0.0f64;
                    for step in 1..64 {
                        let tx = f64::from(step * 7 - 200);
                        let ty = f64::from(step * 11 - 300);
                        let axis = axis_for(tx, ty);
                        let (x, y) =
                            boundary_along_ray(&mut graph, id, black_box(tx), black_box(ty), axis);
                        acc += x + y;
                    }
                    black_box(acc);
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_tweak, bench_boundary_queries);
criterion_main!(benches);
