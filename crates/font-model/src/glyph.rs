//! Glyph, contour, anchor and component types.

use kurbo::{Affine, BezPath, Point, Vec2};

/// UFO point types. The type of an on-curve point describes the segment
/// that arrives at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointType {
    /// First point of an open contour.
    Move,
    Line,
    OffCurve,
    /// End of a cubic segment.
    Curve,
    /// End of a quadratic spline.
    QCurve,
}

impl PointType {
    pub const fn is_on_curve(self) -> bool {
        !matches!(self, PointType::OffCurve)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContourPoint {
    pub x: f64,
    pub y: f64,
    pub typ: PointType,
    pub smooth: bool,
    pub name: Option<String>,
}

impl ContourPoint {
    pub fn new(x: f64, y: f64, typ: PointType) -> Self {
        Self { x, y, typ, smooth: false, name: None }
    }

    pub fn line(x: f64, y: f64) -> Self {
        Self::new(x, y, PointType::Line)
    }

    pub fn off(x: f64, y: f64) -> Self {
        Self::new(x, y, PointType::OffCurve)
    }

    pub fn curve(x: f64, y: f64) -> Self {
        Self::new(x, y, PointType::Curve)
    }

    pub fn qcurve(x: f64, y: f64) -> Self {
        Self::new(x, y, PointType::QCurve)
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_point(&mut self, point: Point) {
        self.x = point.x;
        self.y = point.y;
    }
}

/// An ordered sequence of points. Closed unless the first point is a
/// [`PointType::Move`]. Point order carries the winding direction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contour {
    pub points: Vec<ContourPoint>,
}

impl Contour {
    pub fn new(points: Vec<ContourPoint>) -> Self {
        Self { points }
    }

    pub fn is_closed(&self) -> bool {
        self.points.first().is_none_or(|p| p.typ != PointType::Move)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn on_curve_count(&self) -> usize {
        self.points.iter().filter(|p| p.typ.is_on_curve()).count()
    }

    pub fn has_cubic(&self) -> bool {
        self.points.iter().any(|p| p.typ == PointType::Curve)
    }

    /// Map every point through `transform`.
    pub fn apply(&mut self, transform: Affine) {
        for point in &mut self.points {
            point.set_point(transform * point.point());
        }
    }

    /// Reverse the contour direction.
    ///
    /// A closed contour keeps its first point. Each on-curve point takes the
    /// segment type of the next on-curve point, since the segment that used
    /// to leave it now arrives at it.
    pub fn reverse(&mut self) {
        let n = self.points.len();
        if n < 2 {
            return;
        }

        let on_curve: Vec<usize> = (0..n).filter(|&i| self.points[i].typ.is_on_curve()).collect();
        let closed = self.is_closed();
        let mut types: Vec<PointType> = self.points.iter().map(|p| p.typ).collect();
        for (k, &i) in on_curve.iter().enumerate() {
            let next = match on_curve.get(k + 1) {
                Some(&j) => j,
                None if closed => on_curve[0],
                None => {
                    types[i] = PointType::Move;
                    continue;
                }
            };
            types[i] = self.points[next].typ;
        }
        for (point, typ) in self.points.iter_mut().zip(types) {
            point.typ = typ;
        }

        if closed {
            self.points[1..].reverse();
        } else {
            self.points.reverse();
        }
    }

    /// Build a [`BezPath`] for this contour.
    ///
    /// Closed contours start at their first on-curve point. A closed
    /// quadratic contour without any on-curve point starts at the implied
    /// midpoint between its last and first off-curve points.
    pub fn to_bezpath(&self) -> BezPath {
        let mut path = BezPath::new();
        if self.points.is_empty() {
            return path;
        }

        if !self.is_closed() {
            path.move_to(self.points[0].point());
            append_segments(&mut path, &self.points[1..]);
            return path;
        }

        let Some(start) = self.points.iter().position(|p| p.typ.is_on_curve()) else {
            let offs: Vec<Point> = self.points.iter().map(ContourPoint::point).collect();
            let first = offs[0].midpoint(offs[offs.len() - 1]);
            path.move_to(first);
            quad_spline_to(&mut path, &offs, first);
            path.close_path();
            return path;
        };

        let rotated: Vec<ContourPoint> = self.points[start + 1..]
            .iter()
            .chain(self.points[..=start].iter())
            .cloned()
            .collect();

        path.move_to(self.points[start].point());
        append_segments(&mut path, &rotated);
        path.close_path();
        path
    }
}

fn append_segments(path: &mut BezPath, points: &[ContourPoint]) {
    let mut pending: Vec<Point> = Vec::new();
    for point in points {
        let pt = point.point();
        match point.typ {
            PointType::OffCurve => pending.push(pt),
            PointType::Move | PointType::Line => {
                path.line_to(pt);
                pending.clear();
            }
            PointType::Curve => {
                match pending.as_slice() {
                    [] => path.line_to(pt),
                    [c] => path.quad_to(*c, pt),
                    [.., c1, c2] => path.curve_to(*c1, *c2, pt),
                }
                pending.clear();
            }
            PointType::QCurve => {
                if pending.is_empty() {
                    path.line_to(pt);
                } else {
                    quad_spline_to(path, &pending, pt);
                }
                pending.clear();
            }
        }
    }
}

/// Quadratic spline with implied on-curve points between consecutive
/// off-curve points.
fn quad_spline_to(path: &mut BezPath, offs: &[Point], end: Point) {
    for (i, c) in offs.iter().enumerate() {
        let to = offs.get(i + 1).map_or(end, |next| c.midpoint(*next));
        path.quad_to(*c, to);
    }
}

/// A named reference position, used to attach marks.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub name: Option<String>,
    pub x: f64,
    pub y: f64,
}

impl Anchor {
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self { name: Some(name.into()), x, y }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_point(&mut self, point: Point) {
        self.x = point.x;
        self.y = point.y;
    }
}

/// A reference to another glyph's outline.
///
/// The translation part of `transform` is the component's delta offset and
/// the linear part is its scale.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub base: String,
    pub transform: Affine,
}

impl Component {
    pub fn new(base: impl Into<String>, transform: Affine) -> Self {
        Self { base: base.into(), transform }
    }

    pub fn at(base: impl Into<String>, x: f64, y: f64) -> Self {
        Self::new(base, Affine::translate((x, y)))
    }

    pub fn delta(&self) -> Vec2 {
        self.transform.translation()
    }

    pub fn set_delta(&mut self, delta: Vec2) {
        self.transform = self.transform.with_translation(delta);
    }

    /// The linear (scale/skew) part of the transform, without translation.
    pub fn linear(&self) -> Affine {
        self.transform.with_translation(Vec2::ZERO)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Glyph {
    pub name: String,
    pub width: f64,
    pub codepoints: Vec<char>,
    pub contours: Vec<Contour>,
    pub anchors: Vec<Anchor>,
    pub components: Vec<Component>,
}

impl Glyph {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn with_contour(mut self, contour: Contour) -> Self {
        self.contours.push(contour);
        self
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchors.push(anchor);
        self
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_codepoint(mut self, codepoint: char) -> Self {
        self.codepoints.push(codepoint);
        self
    }

    pub fn anchor(&self, name: &str) -> Option<&Anchor> {
        self.anchors.iter().find(|a| a.name.as_deref() == Some(name))
    }

    pub fn has_components(&self) -> bool {
        !self.components.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{PathEl, Shape};

    use super::*;

    fn square() -> Contour {
        Contour::new(vec![
            ContourPoint::line(0.0, 0.0),
            ContourPoint::line(100.0, 0.0),
            ContourPoint::line(100.0, 100.0),
            ContourPoint::line(0.0, 100.0),
        ])
    }

    #[test]
    fn test_square_is_counter_clockwise() {
        assert!(square().to_bezpath().area() > 0.0);
    }

    #[test]
    fn test_bezpath_starts_at_first_on_curve() {
        let contour = Contour::new(vec![
            ContourPoint::off(0.0, 50.0),
            ContourPoint::off(0.0, 100.0),
            ContourPoint::curve(50.0, 100.0),
            ContourPoint::line(50.0, 0.0),
        ]);
        let path = contour.to_bezpath();
        let elements = path.elements();
        assert_eq!(elements[0], PathEl::MoveTo(Point::new(50.0, 100.0)));
        assert_eq!(elements[1], PathEl::LineTo(Point::new(50.0, 0.0)));
        assert_eq!(
            elements[2],
            PathEl::CurveTo(Point::new(0.0, 50.0), Point::new(0.0, 100.0), Point::new(50.0, 100.0))
        );
        assert_eq!(elements[3], PathEl::ClosePath);
    }

    #[test]
    fn test_open_contour_is_not_closed() {
        let contour = Contour::new(vec![
            ContourPoint::new(0.0, 0.0, PointType::Move),
            ContourPoint::line(10.0, 0.0),
        ]);
        assert!(!contour.is_closed());
        assert!(!contour.to_bezpath().elements().contains(&PathEl::ClosePath));
    }

    #[test]
    fn test_all_off_curve_contour() {
        let contour = Contour::new(vec![
            ContourPoint::off(0.0, 0.0),
            ContourPoint::off(100.0, 0.0),
            ContourPoint::off(100.0, 100.0),
            ContourPoint::off(0.0, 100.0),
        ]);
        let path = contour.to_bezpath();
        assert_eq!(path.elements()[0], PathEl::MoveTo(Point::new(0.0, 50.0)));
        assert!(path.area() > 0.0);
    }

    #[test]
    fn test_reverse_flips_winding() {
        let mut contour = square();
        contour.reverse();
        assert_eq!(contour.points[0].point(), Point::new(0.0, 0.0));
        assert_eq!(contour.points[1].point(), Point::new(0.0, 100.0));
        assert!(contour.to_bezpath().area() < 0.0);
    }

    #[test]
    fn test_reverse_moves_segment_types() {
        let mut contour = Contour::new(vec![
            ContourPoint::line(0.0, 0.0),
            ContourPoint::line(100.0, 0.0),
            ContourPoint::off(100.0, 50.0),
            ContourPoint::off(50.0, 100.0),
            ContourPoint::curve(0.0, 100.0),
        ]);
        let original = contour.clone();
        contour.reverse();

        let types: Vec<PointType> = contour.points.iter().map(|p| p.typ).collect();
        assert_eq!(
            types,
            vec![
                PointType::Line,
                PointType::Line,
                PointType::OffCurve,
                PointType::OffCurve,
                PointType::Curve,
            ]
        );
        assert_eq!(contour.points[1].point(), Point::new(0.0, 100.0));

        contour.reverse();
        assert_eq!(contour, original);
    }

    #[test]
    fn test_reverse_open_contour() {
        let mut contour = Contour::new(vec![
            ContourPoint::new(0.0, 0.0, PointType::Move),
            ContourPoint::line(10.0, 0.0),
            ContourPoint::line(10.0, 10.0),
        ]);
        contour.reverse();
        assert_eq!(contour.points[0].typ, PointType::Move);
        assert_eq!(contour.points[0].point(), Point::new(10.0, 10.0));
        assert_eq!(contour.points[2].point(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_component_delta() {
        let mut component = Component::at("A", 10.0, 20.0);
        assert_eq!(component.delta(), Vec2::new(10.0, 20.0));
        component.set_delta(Vec2::new(-5.0, 0.0));
        assert_eq!(component.transform, Affine::translate((-5.0, 0.0)));
        assert_eq!(component.linear(), Affine::IDENTITY);
    }

    #[test]
    fn test_glyph_anchor_lookup() {
        let glyph = Glyph::new("A").with_anchor(Anchor::new("top", 300.0, 700.0));
        assert_eq!(glyph.anchor("top").map(Anchor::point), Some(Point::new(300.0, 700.0)));
        assert!(glyph.anchor("bottom").is_none());
    }
}
