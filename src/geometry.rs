use crate::config::LayoutConfig;
use crate::ir::ShapeKind;
use crate::text_metrics::TextMetrics;

// Extra digits are truncated by the compiler.
const SQRT3: f64 = 1.7320508075688772935274463415058723669428052538103806280558;
const SIN36: f64 = 0.5877852522924731291687059546390727685976524376431459910723;
const COS36: f64 = 0.8090169943749474241022934171828190588601545899028814310677;
const COS18: f64 = 0.9510565162951535721164393333793821434056986341257502224473;
const TAN18: f64 = 0.3249196962329063261558714122151344649549034715214751003078;

/// Segments each quadratic arc is flattened into for containment tests.
const ARC_STEPS: usize = 8;

/// The inputs geometry is a pure function of. Identical inputs always yield
/// an identical [`NodeGeometry`].
#[derive(Debug, Clone, Copy)]
pub struct ShapeInput<'a> {
    /// `None` marks a dummy placeholder node.
    pub shape: Option<ShapeKind>,
    pub labels: &'a [String],
    pub bold: bool,
}

/// A closed boundary in node-local coordinates (origin at the node center).
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    points: Vec<(f64, f64)>,
}

impl Outline {
    #[cfg(test)]
    pub(crate) fn from_points(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    fn polygon(points: &[(i32, i32)]) -> Self {
        Self {
            points: points
                .iter()
                .map(|&(x, y)| (f64::from(x), f64::from(y)))
                .collect(),
        }
    }

    /// Builds a closed outline from quadratic arcs given as (control, end)
    /// pairs, starting at `start`. The arcs are flattened; the documented
    /// boundary-query error bound absorbs the flattening error.
    fn from_quads(start: (f64, f64), arcs: &[((f64, f64), (f64, f64))]) -> Self {
        let mut points = Vec::with_capacity(arcs.len() * ARC_STEPS);
        let mut from = start;
        for &(ctrl, to) in arcs {
            for step in 1..=ARC_STEPS {
                let t = step as f64 / ARC_STEPS as f64;
                let u = 1.0 - t;
                let x = u * u * from.0 + 2.0 * u * t * ctrl.0 + t * t * to.0;
                let y = u * u * from.1 + 2.0 * u * t * ctrl.1 + t * t * to.1;
                points.push((x, y));
            }
            from = to;
        }
        Self { points }
    }

    /// Vertices of the (possibly flattened) boundary, in drawing order.
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Even-odd containment test in node-local coordinates.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        if self.points.len() < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = self.points.len() - 1;
        for i in 0..self.points.len() {
            let (xi, yi) = self.points[i];
            let (xj, yj) = self.points[j];
            if (yi > y) != (yj > y) {
                let t = (y - yi) / (yj - yi);
                if x < xi + t * (xj - xi) {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

/// Immutable geometry snapshot for one node, produced by [`compute_bounds`]
/// and memoized by the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeGeometry {
    /// Distance from the center to the left/right edge.
    pub half_width: i32,
    /// Distance from the center to the top/bottom edge.
    pub half_height: i32,
    /// Vertical offset between the label block center and the node center.
    pub y_shift: i32,
    /// Set for the circle family only; enables the analytic ray solution.
    pub circle_radius: Option<i32>,
    /// Bounding outline; `None` for dummy nodes, which never intersect.
    pub outline: Option<Outline>,
    /// Up to two nested outlines (double/triple octagon rings), innermost
    /// first. Decorative; the primary outline is the node boundary.
    pub rings: Vec<Outline>,
}

impl NodeGeometry {
    fn dummy(config: &LayoutConfig) -> Self {
        Self {
            half_width: config.dummy_width / 2,
            half_height: config.dummy_height / 2,
            y_shift: 0,
            circle_radius: None,
            outline: None,
            rings: Vec::new(),
        }
    }
}

/// Radius used by the circle family, from the padded label half-extents.
fn circle_radius(shape: ShapeKind, hw: i32, hh: i32) -> i32 {
    let base = (f64::from(hw) * f64::from(hw) + f64::from(hh) * f64::from(hh)).sqrt() as i32 + 2;
    if shape == ShapeKind::DoubleCircle {
        base + 5
    } else {
        base
    }
}

/// Computes a node's bounding geometry from its shape kind, labels and font
/// metrics. Deterministic and recomputed fully on each call; callers memoize.
pub fn compute_bounds(
    input: ShapeInput<'_>,
    metrics: &dyn TextMetrics,
    config: &LayoutConfig,
) -> NodeGeometry {
    let Some(shape) = input.shape else {
        return NodeGeometry::dummy(config);
    };

    let ad = metrics.max_ascent_descent();
    let mut width = 2 * config.label_padding;
    let mut height = width;
    for label in input.labels {
        if label.is_empty() {
            continue;
        }
        let w = metrics.string_width(input.bold, label);
        if width < w {
            width = w;
        }
        height += ad;
    }
    let mut hw = (width + 1) / 2 + config.label_padding;
    if hw < ad / 2 {
        hw = ad / 2;
    }
    let mut hh = (height + 1) / 2 + config.label_padding;
    if hh < ad / 2 {
        hh = ad / 2;
    }
    width = hw * 2;
    height = hh * 2;

    let mut side = hw;
    let mut updown = hh;
    let mut y_shift = 0;
    let mut radius = None;
    let mut rings = Vec::new();

    let outline = match shape {
        ShapeKind::House => {
            y_shift = ad / 2;
            updown += y_shift;
            Outline::polygon(&[
                (-hw, y_shift - hh),
                (0, -updown),
                (hw, y_shift - hh),
                (hw, y_shift + hh),
                (-hw, y_shift + hh),
            ])
        }
        ShapeKind::InvHouse => {
            y_shift = -(ad / 2);
            updown -= y_shift;
            Outline::polygon(&[
                (-hw, y_shift - hh),
                (hw, y_shift - hh),
                (hw, y_shift + hh),
                (0, updown),
                (-hw, y_shift + hh),
            ])
        }
        ShapeKind::Triangle | ShapeKind::InvTriangle => {
            // Expand until the isosceles triangle circumscribes the label box.
            let mut dx = (f64::from(height) / SQRT3) as i32 + 1;
            if dx < 6 {
                dx = 6;
            }
            let mut dy = (f64::from(hw) * SQRT3) as i32 + 1;
            if dy < 6 {
                dy = 6;
            }
            dy = (dy / 2) * 2;
            side += dx;
            updown += dy / 2;
            if shape == ShapeKind::Triangle {
                y_shift = dy / 2;
                Outline::polygon(&[(0, -updown), (hw + dx, updown), (-hw - dx, updown)])
            } else {
                y_shift = -(dy / 2);
                Outline::polygon(&[(0, updown), (hw + dx, -updown), (-hw - dx, -updown)])
            }
        }
        ShapeKind::Hexagon => {
            side += ad;
            Outline::polygon(&[
                (-hw - ad, 0),
                (-hw, -hh),
                (hw, -hh),
                (hw + ad, 0),
                (hw, hh),
                (-hw, hh),
            ])
        }
        ShapeKind::Trapezoid => {
            side += ad;
            Outline::polygon(&[(-hw, -hh), (hw, -hh), (hw + ad, hh), (-hw - ad, hh)])
        }
        ShapeKind::InvTrapezoid => {
            side += ad;
            Outline::polygon(&[(-hw - ad, -hh), (hw + ad, -hh), (hw, hh), (-hw, hh)])
        }
        ShapeKind::Parallelogram => {
            side += ad;
            Outline::polygon(&[(-hw, -hh), (hw + ad, -hh), (hw, hh), (-hw - ad, hh)])
        }
        ShapeKind::Diamond | ShapeKind::MDiamond => {
            if shape == ShapeKind::MDiamond {
                if hw < 10 {
                    hw = 10;
                    side = 10;
                }
                if hh < 10 {
                    hh = 10;
                    updown = 10;
                }
            }
            updown += hw;
            side += hh;
            Outline::polygon(&[(-hw - hh, 0), (0, -hh - hw), (hw + hh, 0), (0, hh + hw)])
        }
        ShapeKind::Square | ShapeKind::MSquare => {
            // Corner ticks on the mirrored variant are drawing-only.
            if hh < hw {
                hh = hw;
            } else {
                hw = hh;
            }
            if hh < 6 {
                hh = 6;
                hw = 6;
            }
            side = hw + 4;
            updown = hh + 4;
            Outline::polygon(&[
                (-hw - 4, -hh - 4),
                (hw + 4, -hh - 4),
                (hw + 4, hh + 4),
                (-hw - 4, hh + 4),
            ])
        }
        ShapeKind::Octagon | ShapeKind::DoubleOctagon | ShapeKind::TripleOctagon => {
            let dx = width / 3;
            let dy = ad;
            updown += dy;
            let base = Outline::polygon(&[
                (-hw, -hh),
                (-hw + dx, -hh - dy),
                (hw - dx, -hh - dy),
                (hw, -hh),
                (hw, hh),
                (hw - dx, hh + dy),
                (-hw + dx, hh + dy),
                (-hw, hh),
            ]);
            if shape == ShapeKind::Octagon {
                base
            } else {
                // Offset each ring outward by 5 along the corner normal.
                let dxf = f64::from(dx);
                let dyf = f64::from(dy);
                let c = (dxf * dxf + dyf * dyf).sqrt();
                let a = dxf * dyf / c;
                let k = (a + 5.0) * dyf / dxf;
                let r = ((a + 5.0) * (a + 5.0) + k * k).sqrt() - dyf;
                let dx1 = (r - 5.0) * dxf / dyf;
                let dy1 = -((dxf + 5.0) * dyf / dxf - dyf - r);
                let x1 = dx1.round() as i32;
                let y1 = dy1.round() as i32;
                updown += 5;
                side += 5;
                let second = Outline::polygon(&[
                    (-hw - 5, -hh - y1),
                    (-hw + dx - x1, -hh - dy - 5),
                    (hw - dx + x1, -hh - dy - 5),
                    (hw + 5, -hh - y1),
                    (hw + 5, hh + y1),
                    (hw - dx + x1, hh + dy + 5),
                    (-hw + dx - x1, hh + dy + 5),
                    (-hw - 5, hh + y1),
                ]);
                rings.push(base);
                if shape == ShapeKind::DoubleOctagon {
                    second
                } else {
                    updown += 5;
                    side += 5;
                    let x1 = (dx1 * 2.0).round() as i32;
                    let y1 = (dy1 * 2.0).round() as i32;
                    let third = Outline::polygon(&[
                        (-hw - 10, -hh - y1),
                        (-hw + dx - x1, -hh - dy - 10),
                        (hw - dx + x1, -hh - dy - 10),
                        (hw + 10, -hh - y1),
                        (hw + 10, hh + y1),
                        (hw - dx + x1, hh + dy + 10),
                        (-hw + dx - x1, hh + dy + 10),
                        (-hw - 10, hh + y1),
                    ]);
                    rings.push(second);
                    third
                }
            }
        }
        ShapeKind::Circle | ShapeKind::MCircle | ShapeKind::DoubleCircle => {
            let rad = circle_radius(shape, hw, hh);
            let l = (f64::from(rad) / COS18) as i32 + 2;
            let a = (f64::from(l) * SIN36) as i32;
            let b = (f64::from(l) * COS36) as i32;
            let c = (f64::from(rad) * TAN18) as i32;
            updown = l;
            side = l;
            radius = Some(rad);
            Outline::polygon(&[
                (-l, 0),
                (-b, a),
                (-c, l),
                (c, l),
                (b, a),
                (l, 0),
                (b, -a),
                (c, -l),
                (-c, -l),
                (-b, -a),
            ])
        }
        ShapeKind::Egg | ShapeKind::Ellipse => {
            let pad = ad / 2;
            side += pad;
            updown += pad;
            // The egg's waist sits below center by half the line metric.
            let d = if shape == ShapeKind::Egg {
                f64::from(ad / 2)
            } else {
                0.0
            };
            let s = f64::from(side);
            let u = f64::from(updown);
            Outline::from_quads(
                (-s, d),
                &[
                    ((-s, -u), (0.0, -u)),
                    ((s, -u), (s, d)),
                    ((s, u), (0.0, u)),
                    ((-s, u), (-s, d)),
                ],
            )
        }
        ShapeKind::Box | ShapeKind::Text => {
            if shape != ShapeKind::Box {
                let d = ad / 2;
                hw += d;
                side = hw;
                hh += d;
                updown = hh;
            }
            Outline::polygon(&[(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)])
        }
    };

    NodeGeometry {
        half_width: side,
        half_height: updown,
        y_shift,
        circle_radius: radius,
        outline: Some(outline),
        rings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_metrics::FixedMetrics;

    const ALL_SHAPES: [ShapeKind; 22] = [
        ShapeKind::Box,
        ShapeKind::Text,
        ShapeKind::House,
        ShapeKind::InvHouse,
        ShapeKind::Triangle,
        ShapeKind::InvTriangle,
        ShapeKind::Hexagon,
        ShapeKind::Trapezoid,
        ShapeKind::InvTrapezoid,
        ShapeKind::Parallelogram,
        ShapeKind::Diamond,
        ShapeKind::MDiamond,
        ShapeKind::Square,
        ShapeKind::MSquare,
        ShapeKind::Octagon,
        ShapeKind::DoubleOctagon,
        ShapeKind::TripleOctagon,
        ShapeKind::Circle,
        ShapeKind::MCircle,
        ShapeKind::DoubleCircle,
        ShapeKind::Egg,
        ShapeKind::Ellipse,
    ];

    fn bounds(shape: Option<ShapeKind>, labels: &[&str]) -> NodeGeometry {
        let labels: Vec<String> = labels.iter().map(|s| s.to_string()).collect();
        compute_bounds(
            ShapeInput {
                shape,
                labels: &labels,
                bold: false,
            },
            &FixedMetrics::default(),
            &LayoutConfig::default(),
        )
    }

    #[test]
    fn recomputing_is_idempotent() {
        for shape in ALL_SHAPES {
            let first = bounds(Some(shape), &["Alpha", "Beta"]);
            let second = bounds(Some(shape), &["Alpha", "Beta"]);
            assert_eq!(first, second, "{shape:?}");
        }
    }

    #[test]
    fn every_shape_contains_its_center() {
        for shape in ALL_SHAPES {
            let geom = bounds(Some(shape), &["Label"]);
            let outline = geom.outline.as_ref().expect("shaped node has an outline");
            assert!(outline.contains(0.0, 0.0), "{shape:?} excludes its center");
        }
    }

    #[test]
    fn box_with_two_labels_matches_padding_rule() {
        // FixedMetrics: 7 units per char, ascent+descent 14, padding 5.
        let geom = bounds(Some(ShapeKind::Box), &["Alpha", "Beta"]);
        // widest = "Alpha" (35); hw = (35+1)/2 + 5 = 23.
        assert_eq!(geom.half_width, 23);
        assert!(geom.half_width >= 5 + 35 / 2);
        // height = 2*5 + 2*14 = 38; hh = (38+1)/2 + 5 = 24.
        assert_eq!(geom.half_height, 24);
        assert_eq!(geom.y_shift, 0);
    }

    #[test]
    fn empty_labels_are_treated_as_absent() {
        let with_blank = bounds(Some(ShapeKind::Box), &["", "Name"]);
        let without = bounds(Some(ShapeKind::Box), &["Name"]);
        assert_eq!(with_blank, without);
    }

    #[test]
    fn dummy_node_has_fixed_size_and_no_outline() {
        let geom = bounds(None, &["ignored"]);
        assert_eq!(geom.half_width, 15);
        assert_eq!(geom.half_height, 5);
        assert!(geom.outline.is_none());
        assert!(geom.rings.is_empty());
    }

    #[test]
    fn text_nodes_get_extra_margin_over_plain_boxes() {
        let plain = bounds(Some(ShapeKind::Box), &["Name"]);
        let text = bounds(Some(ShapeKind::Text), &["Name"]);
        assert_eq!(text.half_width, plain.half_width + 7);
        assert_eq!(text.half_height, plain.half_height + 7);
    }

    #[test]
    fn house_caps_shift_label_centering() {
        let house = bounds(Some(ShapeKind::House), &["Name"]);
        let inv = bounds(Some(ShapeKind::InvHouse), &["Name"]);
        assert_eq!(house.y_shift, 7);
        assert_eq!(inv.y_shift, -7);
        assert_eq!(house.half_height, inv.half_height);
    }

    #[test]
    fn circle_family_carries_analytic_radius() {
        let circle = bounds(Some(ShapeKind::Circle), &["Name"]);
        let double = bounds(Some(ShapeKind::DoubleCircle), &["Name"]);
        let r = circle.circle_radius.expect("circle radius");
        let rd = double.circle_radius.expect("double circle radius");
        assert_eq!(rd, r + 5);
        // The decagon circumscribes the radius.
        assert!(circle.half_width >= r);
        assert_eq!(circle.half_width, circle.half_height);
        assert!(bounds(Some(ShapeKind::Box), &["Name"]).circle_radius.is_none());
    }

    #[test]
    fn octagon_rings_grow_with_emphasis() {
        let single = bounds(Some(ShapeKind::Octagon), &["Name"]);
        let double = bounds(Some(ShapeKind::DoubleOctagon), &["Name"]);
        let triple = bounds(Some(ShapeKind::TripleOctagon), &["Name"]);
        assert_eq!(single.rings.len(), 0);
        assert_eq!(double.rings.len(), 1);
        assert_eq!(triple.rings.len(), 2);
        assert_eq!(double.half_width, single.half_width + 5);
        assert_eq!(triple.half_width, single.half_width + 10);
        assert_eq!(triple.half_height, single.half_height + 10);
    }

    #[test]
    fn mirrored_diamond_enforces_minimum_extents() {
        let geom = bounds(Some(ShapeKind::MDiamond), &[]);
        // Empty labels collapse to the padding minimum, floored at 10.
        assert!(geom.half_width >= 20);
        assert!(geom.half_height >= 20);
    }

    #[test]
    fn square_variants_share_geometry() {
        let square = bounds(Some(ShapeKind::Square), &["Hello"]);
        let mirrored = bounds(Some(ShapeKind::MSquare), &["Hello"]);
        assert_eq!(square, mirrored);
        assert_eq!(square.half_width, square.half_height);
    }

    #[test]
    fn egg_is_vertically_asymmetric() {
        let egg = bounds(Some(ShapeKind::Egg), &["Name"]);
        let ellipse = bounds(Some(ShapeKind::Ellipse), &["Name"]);
        assert_eq!(egg.half_width, ellipse.half_width);
        assert_eq!(egg.half_height, ellipse.half_height);
        let egg_outline = egg.outline.expect("egg outline");
        let ellipse_outline = ellipse.outline.expect("ellipse outline");
        assert_ne!(egg_outline, ellipse_outline);
        // The ellipse is symmetric about y = 0; the egg is not.
        let x = f64::from(ellipse.half_width) - 2.0;
        assert_eq!(
            ellipse_outline.contains(x, 1.0),
            ellipse_outline.contains(x, -1.0)
        );
    }

    #[test]
    fn triangle_circumscribes_label_box() {
        let labels = ["Wide label here"];
        let geom = bounds(Some(ShapeKind::Triangle), &labels);
        let outline = geom.outline.expect("triangle outline");
        // The plain box shares the padded label extents.
        let label_box = bounds(Some(ShapeKind::Box), &labels);
        let hw = f64::from(label_box.half_width - 1);
        let hh = f64::from(label_box.half_height - 1);
        let shift = f64::from(geom.y_shift);
        for (x, y) in [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)] {
            assert!(
                outline.contains(x, y + shift),
                "corner ({x}, {y}) outside triangle"
            );
        }
    }
}
