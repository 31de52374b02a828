use keynote_geom::{point_in_polygon, Point};
use keynote_host::ViewportSpec;

/// One viewport's visible region as a closed polygon in shared model space.
///
/// Vertex order is preserved from the paper-space boundary that produced it;
/// the resolver never reorders, so the input must already be a simple loop.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportPolygon {
    vertices: Vec<Point>,
}

impl ViewportPolygon {
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn contains(&self, point: Point) -> bool {
        point_in_polygon(point, &self.vertices)
    }
}

/// Maps a viewport's paper-space boundary into model coordinates.
///
/// The boundary is the explicit clip polygon when one exists, otherwise the
/// rectangular frame derived from the viewport's paper placement. Each
/// vertex goes through the inverse of the model→paper view transform:
/// recenter on the viewport, divide by the custom scale (paper units per
/// model unit), rotate back by the view twist, then translate to the view
/// center.
///
/// Returns `None` when no boundary can be derived (degenerate clip, missing
/// or non-positive frame extents, zero/non-finite scale). Such a viewport
/// simply contributes no containment region; the sheet is still processed.
pub fn resolve_polygon(spec: &ViewportSpec) -> Option<ViewportPolygon> {
    if !spec.custom_scale.is_finite() || spec.custom_scale <= 0.0 {
        trace_unresolvable(spec, "non-positive or non-finite scale");
        return None;
    }
    if !spec.view_center.is_finite() || !spec.center.is_finite() {
        trace_unresolvable(spec, "non-finite centers");
        return None;
    }

    let paper_boundary: Vec<Point> = match &spec.clip {
        Some(clip) => {
            if clip.len() < 3 || clip.iter().any(|p| !p.is_finite()) {
                trace_unresolvable(spec, "degenerate clip boundary");
                return None;
            }
            clip.clone()
        }
        None => {
            if !spec.width.is_finite()
                || !spec.height.is_finite()
                || spec.width <= 0.0
                || spec.height <= 0.0
            {
                trace_unresolvable(spec, "no clip and no rectangular frame");
                return None;
            }
            let (hw, hh) = (spec.width / 2.0, spec.height / 2.0);
            vec![
                Point::new(spec.center.x - hw, spec.center.y - hh),
                Point::new(spec.center.x + hw, spec.center.y - hh),
                Point::new(spec.center.x + hw, spec.center.y + hh),
                Point::new(spec.center.x - hw, spec.center.y + hh),
            ]
        }
    };

    let vertices: Vec<Point> = paper_boundary
        .iter()
        .map(|p| paper_to_model(spec, *p))
        .collect();
    if vertices.iter().any(|p| !p.is_finite()) {
        trace_unresolvable(spec, "transform produced non-finite vertices");
        return None;
    }

    Some(ViewportPolygon { vertices })
}

fn paper_to_model(spec: &ViewportSpec, paper: Point) -> Point {
    let dx = (paper.x - spec.center.x) / spec.custom_scale;
    let dy = (paper.y - spec.center.y) / spec.custom_scale;

    // Inverse of the view twist applied by the model→paper transform.
    let (sin, cos) = (-spec.twist).sin_cos();
    Point::new(
        spec.view_center.x + dx * cos - dy * sin,
        spec.view_center.y + dx * sin + dy * cos,
    )
}

fn trace_unresolvable(spec: &ViewportSpec, reason: &str) {
    tracing::debug!(
        target = "keynote.scan",
        viewport = %spec.id,
        reason,
        "viewport boundary unresolvable; contributes no region"
    );
}
