use schem_common::geom::point::Point;
use schem_common::geom::rect::Rect;
use schem_common::geom::rtree::SpatialIndex;

/// Registry of padded rectangular obstacles. Rule applied uniformly:
/// touching an obstacle boundary is permitted, only interior crossing is
/// forbidden.
pub struct ObstacleMap {
    rects: Vec<Rect>,
    index: SpatialIndex,
}

impl Default for ObstacleMap {
    fn default() -> Self {
        Self::new()
    }
}

impl ObstacleMap {
    pub fn new() -> Self {
        Self {
            rects: Vec::new(),
            index: SpatialIndex::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Stores `rect` expanded outward by `padding`. Overlapping obstacles
    /// are permitted and treated independently.
    pub fn add(&mut self, rect: Rect, padding: f64) {
        let padded = rect.expand(padding);
        self.index.insert(padded, self.rects.len());
        self.rects.push(padded);
    }

    /// Whether `p` lies within any obstacle. Strict mode (`inclusive =
    /// false`) excludes boundary points; it is the corner validity test.
    pub fn contains_point(&self, p: Point<f64>, inclusive: bool) -> bool {
        self.index.query_point(p).into_iter().any(|id| {
            let r = &self.rects[id];
            if inclusive {
                r.contains(p)
            } else {
                r.strictly_contains(p)
            }
        })
    }

    /// Whether the interior of the axis-aligned segment `a -> b` passes
    /// through any obstacle interior. Ranges that merely touch (one bound
    /// equal to the other's) do not cross; zero-length segments never do.
    pub fn segment_crosses_interior(&self, a: Point<f64>, b: Point<f64>) -> bool {
        if a == b {
            return false;
        }
        debug_assert!(
            a.x == b.x || a.y == b.y,
            "segment query requires an axis-aligned segment"
        );

        let bbox = Rect::new(
            Point::new(a.x.min(b.x), a.y.min(b.y)),
            Point::new(a.x.max(b.x), a.y.max(b.y)),
        );

        self.index.query(bbox).into_iter().any(|id| {
            let r = &self.rects[id];
            if a.y == b.y {
                let (lo, hi) = (a.x.min(b.x), a.x.max(b.x));
                a.y > r.min.y && a.y < r.max.y && lo < r.max.x && hi > r.min.x
            } else {
                let (lo, hi) = (a.y.min(b.y), a.y.max(b.y));
                a.x > r.min.x && a.x < r.max.x && lo < r.max.y && hi > r.min.y
            }
        })
    }
}
