use crate::Point;

/// Ray-casting point-in-polygon test.
///
/// The polygon is a simple closed loop; the edge from the last vertex back
/// to the first is implicit. Self-intersecting or degenerate input is not a
/// supported case; fewer than three vertices always reports "outside".
///
/// Edge rule: each edge's y-span is treated as the half-open interval
/// `[min_y, max_y)`, so a ray through a shared vertex crosses exactly one of
/// the two incident edges. Points exactly on a boundary therefore resolve
/// deterministically (left/bottom edges of an axis-aligned rectangle count
/// as inside, right/top as outside) rather than depending on float noise.
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[j];

        let crosses = (a.y > point.y) != (b.y > point.y);
        if crosses {
            // x of the edge at the ray's height; the divisor is nonzero
            // because the edge straddles point.y.
            let x_at_y = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x_at_y {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}

/// Arithmetic mean of a small point set.
///
/// Used as the marker anchor when an annotation has no materialized leader
/// and only its bounding frame is known. Returns `None` for an empty set.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }

    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point::new(sx / n, sy / n))
}
