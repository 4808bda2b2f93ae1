//! Pure geometry helpers: distances, rectangle edge intersection, and
//! bézier connector construction.

use kurbo::{BezPath, Point, Rect, Vec2};

/// Distance between two points.
pub fn point_dist(a: Point, b: Point) -> f64 {
    (b - a).hypot()
}

/// Distance from a point to a rectangle (zero when the point is inside).
pub fn rect_dist(rect: Rect, point: Point) -> f64 {
    let dx = (rect.x0 - point.x).max(0.0).max(point.x - rect.x1);
    let dy = (rect.y0 - point.y).max(0.0).max(point.y - rect.y1);
    (dx * dx + dy * dy).sqrt()
}

/// Intersection of the segment from the rectangle's center toward `target`
/// with the rectangle's boundary.
///
/// Used so connectors terminate at node borders rather than centers. When
/// `target` coincides with the center (or the rectangle is degenerate) the
/// center itself is returned.
pub fn rect_edge_point(rect: Rect, target: Point) -> Point {
    let center = rect.center();
    let dir = target - center;
    if dir.hypot2() < f64::EPSILON || rect.width() <= 0.0 || rect.height() <= 0.0 {
        return center;
    }

    let half_w = rect.width() / 2.0;
    let half_h = rect.height() / 2.0;

    // Scale the direction so the larger normalized component reaches the box.
    let tx = if dir.x.abs() < f64::EPSILON {
        f64::INFINITY
    } else {
        half_w / dir.x.abs()
    };
    let ty = if dir.y.abs() < f64::EPSILON {
        f64::INFINITY
    } else {
        half_h / dir.y.abs()
    };
    let t = tx.min(ty);

    center + dir * t
}

/// Build a cubic bézier connector between two node rectangles.
///
/// Endpoints sit on the rectangle borders facing each other; control points
/// are offset along the dominant axis of the connection for a smooth curve.
pub fn connector_path(from: Rect, to: Rect) -> BezPath {
    let start = rect_edge_point(from, to.center());
    let end = rect_edge_point(to, from.center());

    let delta = end - start;
    let (c1, c2) = if delta.x.abs() >= delta.y.abs() {
        (
            start + Vec2::new(delta.x / 2.0, 0.0),
            end - Vec2::new(delta.x / 2.0, 0.0),
        )
    } else {
        (
            start + Vec2::new(0.0, delta.y / 2.0),
            end - Vec2::new(0.0, delta.y / 2.0),
        )
    };

    let mut path = BezPath::new();
    path.move_to(start);
    path.curve_to(c1, c2, end);
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::PathEl;

    #[test]
    fn test_point_dist() {
        let d = point_dist(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert!((d - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rect_dist_inside_is_zero() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert!(rect_dist(rect, Point::new(50.0, 25.0)).abs() < f64::EPSILON);
        assert!(rect_dist(rect, Point::new(0.0, 0.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rect_dist_outside() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        // Straight right of the rect.
        assert!((rect_dist(rect, Point::new(110.0, 25.0)) - 10.0).abs() < f64::EPSILON);
        // Diagonal from the corner.
        let d = rect_dist(rect, Point::new(103.0, 54.0));
        assert!((d - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rect_edge_point_on_boundary() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        let hit = rect_edge_point(rect, Point::new(200.0, 25.0));
        assert!((hit.x - 100.0).abs() < 1e-9);
        assert!((hit.y - 25.0).abs() < 1e-9);

        let hit = rect_edge_point(rect, Point::new(50.0, -100.0));
        assert!((hit.y - 0.0).abs() < 1e-9);
        assert!((hit.x - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_rect_edge_point_degenerate_target() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        let hit = rect_edge_point(rect, rect.center());
        assert_eq!(hit, rect.center());
    }

    #[test]
    fn test_connector_endpoints_on_borders() {
        let a = Rect::new(0.0, 0.0, 100.0, 50.0);
        let b = Rect::new(200.0, 0.0, 300.0, 50.0);
        let path = connector_path(a, b);

        let els: Vec<PathEl> = path.elements().to_vec();
        assert_eq!(els.len(), 2);
        let PathEl::MoveTo(start) = els[0] else {
            panic!("expected MoveTo");
        };
        let PathEl::CurveTo(_, _, end) = els[1] else {
            panic!("expected CurveTo");
        };

        // Start on a's right edge, end on b's left edge.
        assert!((start.x - 100.0).abs() < 1e-9);
        assert!((end.x - 200.0).abs() < 1e-9);
    }
}
