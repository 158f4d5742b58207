//! JSON snapshot of a laid-out graph, for golden tests and debugging.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::ir::{Bounds, Graph};

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub bounds: Bounds,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: usize,
    pub layer: usize,
    pub shape: Option<&'static str>,
    pub labels: Vec<String>,
    pub x: i32,
    pub y: i32,
    pub half_width: i32,
    pub half_height: i32,
    pub reserved: i32,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub from: usize,
    pub to: usize,
    pub points: Vec<(f64, f64)>,
}

impl LayoutDump {
    pub fn from_graph(graph: &mut Graph) -> Self {
        let bounds = graph.bounds();
        let ids: Vec<_> = graph.node_ids().collect();
        let nodes = ids
            .into_iter()
            .map(|id| NodeDump {
                id: id.index(),
                layer: graph.layer_of(id),
                shape: graph.shape(id).map(|shape| shape.as_str()),
                labels: graph.labels(id).to_vec(),
                x: graph.x(id),
                y: graph.y(id),
                half_width: graph.half_width(id),
                half_height: graph.half_height(id),
                reserved: graph.reserved(id),
            })
            .collect();
        let edges = graph
            .edges()
            .iter()
            .map(|edge| EdgeDump {
                from: edge.from.index(),
                to: edge.to.index(),
                points: edge.points.clone(),
            })
            .collect();
        Self { bounds, nodes, edges }
    }
}

pub fn write_layout_dump(path: &Path, graph: &mut Graph) -> anyhow::Result<()> {
    let dump = LayoutDump::from_graph(graph);
    let file = File::create(path)
        .with_context(|| format!("failed to create dump file {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &dump)
        .with_context(|| format!("failed to write layout dump {}", path.display()))?;
    Ok(())
}
