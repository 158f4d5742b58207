use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::geometry::{self, NodeGeometry, ShapeInput};
use crate::text_metrics::TextMetrics;

/// Opaque handle into a graph's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// The closed set of node shapes. Geometry dispatch matches exhaustively, so
/// adding a shape is a compile-time-checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Box,
    Text,
    House,
    InvHouse,
    Triangle,
    InvTriangle,
    Hexagon,
    Trapezoid,
    InvTrapezoid,
    Parallelogram,
    Diamond,
    MDiamond,
    Square,
    MSquare,
    Octagon,
    DoubleOctagon,
    TripleOctagon,
    Circle,
    MCircle,
    DoubleCircle,
    Egg,
    Ellipse,
}

impl ShapeKind {
    /// The family with an exact analytic ray intersection.
    pub fn is_circle_family(self) -> bool {
        matches!(self, Self::Circle | Self::MCircle | Self::DoubleCircle)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::Text => "text",
            Self::House => "house",
            Self::InvHouse => "inv_house",
            Self::Triangle => "triangle",
            Self::InvTriangle => "inv_triangle",
            Self::Hexagon => "hexagon",
            Self::Trapezoid => "trapezoid",
            Self::InvTrapezoid => "inv_trapezoid",
            Self::Parallelogram => "parallelogram",
            Self::Diamond => "diamond",
            Self::MDiamond => "m_diamond",
            Self::Square => "square",
            Self::MSquare => "m_square",
            Self::Octagon => "octagon",
            Self::DoubleOctagon => "double_octagon",
            Self::TripleOctagon => "triple_octagon",
            Self::Circle => "circle",
            Self::MCircle => "m_circle",
            Self::DoubleCircle => "double_circle",
            Self::Egg => "egg",
            Self::Ellipse => "ellipse",
        }
    }
}

/// Border line style. Affects drawing only, never geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
    Bold,
}

#[derive(Debug, Clone)]
pub struct Node {
    shape: Option<ShapeKind>,
    labels: Vec<String>,
    color: String,
    style: LineStyle,
    bold: bool,
    layer: usize,
    x: i32,
    y: i32,
    geom: Option<NodeGeometry>,
}

/// A routed connection. `points` is refreshed by the edge routing pass and
/// is empty until the first route.
#[derive(Debug, Clone)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub points: Vec<(f64, f64)>,
}

impl Edge {
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// Overall diagram extent, node shapes and routed edges included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("layer index {index} out of range for a graph with {layers} layers")]
    LayerOutOfRange { index: usize, layers: usize },
}

/// Layered diagram graph: a node arena plus per-layer ordered sequences.
///
/// Layer 0 is the topmost band; y grows downward. Within a layer the node
/// sequence is the left-to-right visual order, kept sorted by center x.
///
/// Every operation is synchronous and bounded by node/layer count; the
/// geometry cache is invalidated in the same call that mutates its inputs.
pub struct Graph {
    nodes: Vec<Node>,
    layers: Vec<Vec<NodeId>>,
    edges: Vec<Edge>,
    config: LayoutConfig,
    metrics: Box<dyn TextMetrics>,
    bounds: Option<Bounds>,
}

impl Graph {
    pub fn new(config: LayoutConfig, metrics: Box<dyn TextMetrics>) -> Self {
        Self {
            nodes: Vec::new(),
            layers: Vec::new(),
            edges: Vec::new(),
            config,
            metrics,
            bounds: None,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Creates a node in `layer`, appended at the right end of the sequence.
    /// `layer` may equal the current layer count, which opens a new layer.
    pub fn add_node(
        &mut self,
        layer: usize,
        shape: Option<ShapeKind>,
        labels: &[&str],
    ) -> Result<NodeId, GraphError> {
        if layer > self.layers.len() {
            return Err(GraphError::LayerOutOfRange {
                index: layer,
                layers: self.layers.len(),
            });
        }
        if layer == self.layers.len() {
            self.layers.push(Vec::new());
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            shape,
            labels: labels
                .iter()
                .filter(|label| !label.is_empty())
                .map(|label| label.to_string())
                .collect(),
            color: "#ffffff".to_string(),
            style: LineStyle::Solid,
            bold: false,
            layer,
            x: 0,
            y: 0,
            geom: None,
        });
        self.layers[layer].push(id);
        self.bounds = None;
        Ok(id)
    }

    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        self.edges.push(Edge {
            from,
            to,
            points: Vec::new(),
        });
        self.bounds = None;
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Left-to-right node sequence of one layer.
    pub fn layer(&self, layer: usize) -> &[NodeId] {
        &self.layers[layer]
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub(crate) fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    pub fn x(&self, id: NodeId) -> i32 {
        self.nodes[id.index()].x
    }

    pub fn y(&self, id: NodeId) -> i32 {
        self.nodes[id.index()].y
    }

    /// Moves the node center directly, bypassing overlap repair. Used by the
    /// initial layout pass; interactive moves go through `tweak`.
    pub fn set_x(&mut self, id: NodeId, x: i32) {
        self.nodes[id.index()].x = x;
        self.bounds = None;
    }

    pub fn set_y(&mut self, id: NodeId, y: i32) {
        self.nodes[id.index()].y = y;
        self.bounds = None;
    }

    pub fn shape(&self, id: NodeId) -> Option<ShapeKind> {
        self.nodes[id.index()].shape
    }

    pub fn labels(&self, id: NodeId) -> &[String] {
        &self.nodes[id.index()].labels
    }

    pub fn color(&self, id: NodeId) -> &str {
        &self.nodes[id.index()].color
    }

    pub fn style(&self, id: NodeId) -> LineStyle {
        self.nodes[id.index()].style
    }

    pub fn is_bold(&self, id: NodeId) -> bool {
        self.nodes[id.index()].bold
    }

    pub fn layer_of(&self, id: NodeId) -> usize {
        self.nodes[id.index()].layer
    }

    /// Changes the shape (`None` turns the node into a dummy placeholder)
    /// and drops the cached geometry.
    pub fn set_shape(&mut self, id: NodeId, shape: Option<ShapeKind>) {
        let node = &mut self.nodes[id.index()];
        if node.shape != shape {
            node.shape = shape;
            node.geom = None;
            self.bounds = None;
        }
    }

    pub fn set_style(&mut self, id: NodeId, style: LineStyle) {
        let node = &mut self.nodes[id.index()];
        if node.style != style {
            node.style = style;
            node.geom = None;
        }
    }

    pub fn set_color(&mut self, id: NodeId, color: &str) {
        let node = &mut self.nodes[id.index()];
        if node.color != color {
            node.color = color.to_string();
            node.geom = None;
        }
    }

    pub fn set_bold(&mut self, id: NodeId, bold: bool) {
        let node = &mut self.nodes[id.index()];
        if node.bold != bold {
            node.bold = bold;
            node.geom = None;
            self.bounds = None;
        }
    }

    /// Prepends a label; empty strings are treated as absent.
    pub fn add_label_front(&mut self, id: NodeId, label: &str) {
        if label.is_empty() {
            return;
        }
        let node = &mut self.nodes[id.index()];
        node.labels.insert(0, label.to_string());
        node.geom = None;
        self.bounds = None;
    }

    /// Appends a label; empty strings are treated as absent.
    pub fn add_label_back(&mut self, id: NodeId, label: &str) {
        if label.is_empty() {
            return;
        }
        let node = &mut self.nodes[id.index()];
        node.labels.push(label.to_string());
        node.geom = None;
        self.bounds = None;
    }

    /// Compute-if-absent accessor for the node's geometry snapshot.
    pub fn geometry(&mut self, id: NodeId) -> &NodeGeometry {
        let idx = id.index();
        if self.nodes[idx].geom.is_none() {
            let node = &self.nodes[idx];
            let geom = geometry::compute_bounds(
                ShapeInput {
                    shape: node.shape,
                    labels: &node.labels,
                    bold: node.bold,
                },
                self.metrics.as_ref(),
                &self.config,
            );
            self.nodes[idx].geom = Some(geom);
        }
        match &self.nodes[idx].geom {
            Some(geom) => geom,
            None => unreachable!("geometry computed above"),
        }
    }

    pub fn half_width(&mut self, id: NodeId) -> i32 {
        self.geometry(id).half_width
    }

    pub fn half_height(&mut self, id: NodeId) -> i32 {
        self.geometry(id).half_height
    }

    /// Whether the node is a shapeless placeholder on a long edge's path.
    pub fn is_dummy(&self, id: NodeId) -> bool {
        self.nodes[id.index()].shape.is_none()
    }

    /// Number of edges looping from this node back to itself.
    pub fn self_loop_count(&self, id: NodeId) -> usize {
        self.edges
            .iter()
            .filter(|edge| edge.is_self_loop() && edge.from == id)
            .count()
    }

    /// Horizontal space reserved on the right-hand side for self-loops.
    /// Zero without self-loops, and always zero for dummy nodes.
    pub fn reserved(&self, id: NodeId) -> i32 {
        if self.nodes[id.index()].shape.is_none() {
            return 0;
        }
        let loops = self.self_loop_count(id) as i32;
        if loops == 0 {
            0
        } else {
            self.config.self_loop_min_width + self.config.self_loop_x_gap * (loops - 1)
        }
    }

    /// Exchanges two nodes' sequence order within a layer.
    pub fn swap_nodes(&mut self, layer: usize, i: usize, j: usize) {
        self.layers[layer].swap(i, j);
    }

    pub(crate) fn position_in_layer(&self, id: NodeId) -> Option<usize> {
        self.layers[self.layer_of(id)]
            .iter()
            .position(|&node| node == id)
    }

    /// Half-height of a layer: the tallest member node.
    pub fn layer_half_height(&mut self, layer: usize) -> i32 {
        let mut max = 0;
        for idx in 0..self.layers[layer].len() {
            let id = self.layers[layer][idx];
            let hh = self.half_height(id);
            if hh > max {
                max = hh;
            }
        }
        max
    }

    /// All nodes in a layer share one y; the first node is authoritative.
    pub fn layer_y(&self, layer: usize) -> i32 {
        self.layers[layer].first().map_or(0, |&id| self.y(id))
    }

    pub(crate) fn set_layer_y(&mut self, layer: usize, y: i32) {
        for idx in 0..self.layers[layer].len() {
            let id = self.layers[layer][idx];
            self.nodes[id.index()].y = y;
        }
        self.bounds = None;
    }

    pub(crate) fn mark_bounds_dirty(&mut self) {
        self.bounds = None;
    }

    /// Overall diagram bounds, recomputed only when marked dirty.
    pub fn bounds(&mut self) -> Bounds {
        if let Some(bounds) = self.bounds {
            return bounds;
        }
        let mut left = i32::MAX;
        let mut top = i32::MAX;
        let mut right = i32::MIN;
        let mut bottom = i32::MIN;
        for idx in 0..self.nodes.len() {
            let id = NodeId(idx);
            let (x, y) = (self.x(id), self.y(id));
            let geom = self.geometry(id);
            let (hw, hh) = (geom.half_width, geom.half_height);
            let reserved = self.reserved(id);
            left = left.min(x - hw);
            top = top.min(y - hh);
            right = right.max(x + hw + reserved);
            bottom = bottom.max(y + hh);
        }
        for edge in &self.edges {
            for &(x, y) in &edge.points {
                left = left.min(x.floor() as i32);
                top = top.min(y.floor() as i32);
                right = right.max(x.ceil() as i32);
                bottom = bottom.max(y.ceil() as i32);
            }
        }
        let bounds = if left > right {
            Bounds {
                left: 0,
                top: 0,
                right: 0,
                bottom: 0,
            }
        } else {
            Bounds {
                left,
                top,
                right,
                bottom,
            }
        };
        self.bounds = Some(bounds);
        bounds
    }
}
