use keynote_core::ViewportId;
use keynote_geom::{BoundingBox, Point};

/// A style-tagged annotation as the host exposes it.
///
/// Leader vertices are probed by index: `leaders[i]` is `None` when leader
/// line `i` exists structurally but has no materialized vertex (the host
/// object model allows that), and the list is empty for leaderless notes.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationEntity {
    pub style: String,
    pub leaders: Vec<Option<Point>>,
    /// Bounding frame of the annotation body, model space.
    pub frame: Option<BoundingBox>,
    /// Raw attached note text; may be absent or fail to parse as a note id.
    pub note_text: Option<String>,
}

/// A block instance that may carry a note number in one of its attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockRefEntity {
    pub name: String,
    pub insertion: Point,
    pub attributes: std::collections::BTreeMap<String, String>,
}

/// Transform parameters of one paper-space viewport.
///
/// All placement values are paper (device) units; `view_center` is the
/// model-space point shown at the viewport's center. `custom_scale` is
/// paper units per model unit, `twist` the view rotation in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportSpec {
    pub id: ViewportId,
    pub view_center: Point,
    pub custom_scale: f64,
    pub twist: f64,
    /// Paper-space placement of the viewport center.
    pub center: Point,
    pub width: f64,
    pub height: f64,
    /// Optional irregular clip boundary, paper space, vertex order as drawn.
    pub clip: Option<Vec<Point>>,
}

impl ViewportSpec {
    /// Canonical byte encoding of every property that affects the resolved
    /// polygon. The cache layer hashes this into the entry fingerprint, so
    /// any change to center/scale/rotation/clip invalidates exactly this
    /// viewport's entry.
    pub fn fingerprint_bytes(&self) -> Vec<u8> {
        fn push_point(out: &mut Vec<u8>, p: Point) {
            out.extend_from_slice(&p.x.to_bits().to_le_bytes());
            out.extend_from_slice(&p.y.to_bits().to_le_bytes());
        }

        let mut out = Vec::with_capacity(96);
        out.extend_from_slice(&self.id.as_u64().to_le_bytes());
        push_point(&mut out, self.view_center);
        out.extend_from_slice(&self.custom_scale.to_bits().to_le_bytes());
        out.extend_from_slice(&self.twist.to_bits().to_le_bytes());
        push_point(&mut out, self.center);
        out.extend_from_slice(&self.width.to_bits().to_le_bytes());
        out.extend_from_slice(&self.height.to_bits().to_le_bytes());
        match &self.clip {
            None => out.push(0),
            Some(clip) => {
                out.push(1);
                out.extend_from_slice(&(clip.len() as u64).to_le_bytes());
                for p in clip {
                    push_point(&mut out, *p);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ViewportSpec {
        ViewportSpec {
            id: ViewportId::new(7),
            view_center: Point::new(500.0, 500.0),
            custom_scale: 0.01,
            twist: 0.0,
            center: Point::new(4.0, 3.0),
            width: 8.0,
            height: 6.0,
            clip: None,
        }
    }

    #[test]
    fn fingerprint_bytes_change_with_any_view_property() {
        let base = spec().fingerprint_bytes();

        let mut scaled = spec();
        scaled.custom_scale = 0.02;
        assert_ne!(base, scaled.fingerprint_bytes());

        let mut twisted = spec();
        twisted.twist = 0.5;
        assert_ne!(base, twisted.fingerprint_bytes());

        let mut clipped = spec();
        clipped.clip = Some(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        assert_ne!(base, clipped.fingerprint_bytes());
    }

    #[test]
    fn fingerprint_bytes_are_stable_for_equal_specs() {
        assert_eq!(spec().fingerprint_bytes(), spec().fingerprint_bytes());
    }
}
