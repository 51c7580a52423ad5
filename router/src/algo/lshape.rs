use crate::obstacle::ObstacleMap;
use schem_common::db::core::{Orientation, Waypath};
use schem_common::geom::point::Point;

/// Which bend the single-corner candidate takes leaving the source:
/// `Hv` runs horizontally first, `Vh` vertically first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CornerKind {
    Hv,
    Vh,
}

impl CornerKind {
    fn corner(self, s: Point<f64>, t: Point<f64>) -> Point<f64> {
        match self {
            CornerKind::Hv => Point::new(t.x, s.y),
            CornerKind::Vh => Point::new(s.x, t.y),
        }
    }
}

/// Routes one net from `source` to `target` around the registered
/// obstacles. Candidates are tried in a fixed order: the direct run when
/// the terminals share an axis, the two single-bend L routes (the
/// preferred orientation first), then a bounded corner-displacement
/// search. A displaced corner cannot keep the route at a single bend, so
/// those candidates become four-point staircases through the displaced
/// rail. Returns `None` when every candidate crosses an obstacle.
pub fn route_net(
    obstacles: &ObstacleMap,
    source: Point<f64>,
    target: Point<f64>,
    preferred: Orientation,
    offsets: &[f64],
) -> Option<Waypath> {
    if source == target {
        return Some(Waypath::new(vec![source]));
    }

    if (source.x == target.x || source.y == target.y)
        && !obstacles.segment_crosses_interior(source, target)
    {
        return Some(Waypath::new(vec![source, target]));
    }

    let kinds = match preferred {
        Orientation::Horizontal => [CornerKind::Hv, CornerKind::Vh],
        Orientation::Vertical => [CornerKind::Vh, CornerKind::Hv],
    };

    for kind in kinds {
        let c = kind.corner(source, target);
        if let Some(path) = clear_path(obstacles, vec![source, c, target]) {
            return Some(path);
        }
    }

    // Displacement search: each orientation exhausts its whole offset
    // ladder, smallest first, before the other orientation is tried.
    for kind in kinds {
        let base = kind.corner(source, target);
        for &d in offsets {
            for delta in [
                Point::new(d, 0.0),
                Point::new(-d, 0.0),
                Point::new(0.0, d),
                Point::new(0.0, -d),
            ] {
                let c = base + delta;
                let pts = if delta.x != 0.0 {
                    // Displaced along x: climb the vertical rail at c.x.
                    vec![
                        source,
                        Point::new(c.x, source.y),
                        Point::new(c.x, target.y),
                        target,
                    ]
                } else {
                    // Displaced along y: cross on the horizontal rail at c.y.
                    vec![
                        source,
                        Point::new(source.x, c.y),
                        Point::new(target.x, c.y),
                        target,
                    ]
                };
                if let Some(path) = clear_path(obstacles, pts) {
                    return Some(path);
                }
            }
        }
    }

    None
}

/// Validates a candidate polyline: no run may cross an obstacle interior
/// and no bend point may sit strictly inside one. Terminals are exempt
/// from the point test since they sit on padded boundaries.
pub(crate) fn clear_path(obstacles: &ObstacleMap, pts: Vec<Point<f64>>) -> Option<Waypath> {
    let path = Waypath::new(pts);
    for (a, b) in path.runs() {
        if obstacles.segment_crosses_interior(a, b) {
            return None;
        }
    }
    if path.points.len() >= 2 {
        for &p in &path.points[1..path.points.len() - 1] {
            if obstacles.contains_point(p, false) {
                return None;
            }
        }
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use schem_common::geom::rect::Rect;

    const OFFSETS: [f64; 4] = [30.0, 60.0, 90.0, 120.0];

    fn p(x: f64, y: f64) -> Point<f64> {
        Point::new(x, y)
    }

    fn obstacles(rects: &[(f64, f64, f64, f64)], padding: f64) -> ObstacleMap {
        let mut map = ObstacleMap::new();
        for &(x1, y1, x2, y2) in rects {
            map.add(Rect::new(p(x1, y1), p(x2, y2)), padding);
        }
        map
    }

    #[test]
    fn aligned_terminals_route_directly() {
        let map = obstacles(&[], 0.0);
        let h = route_net(&map, p(100.0, 100.0), p(800.0, 100.0), Orientation::Horizontal, &OFFSETS)
            .unwrap();
        assert_eq!(h.points, vec![p(100.0, 100.0), p(800.0, 100.0)]);

        let v = route_net(&map, p(100.0, 100.0), p(100.0, 500.0), Orientation::Horizontal, &OFFSETS)
            .unwrap();
        assert_eq!(v.points, vec![p(100.0, 100.0), p(100.0, 500.0)]);
    }

    #[test]
    fn degenerate_net_routes_with_zero_length() {
        let map = obstacles(&[], 0.0);
        let path =
            route_net(&map, p(250.0, 250.0), p(250.0, 250.0), Orientation::Horizontal, &OFFSETS)
                .unwrap();
        assert_eq!(path.manhattan_len(), 0.0);
        assert_eq!(path.source(), path.target());
    }

    #[test]
    fn preference_picks_the_first_bend_direction() {
        let map = obstacles(&[], 0.0);
        let s = p(100.0, 100.0);
        let t = p(800.0, 500.0);

        let h = route_net(&map, s, t, Orientation::Horizontal, &OFFSETS).unwrap();
        assert_eq!(h.points, vec![s, p(800.0, 100.0), t]);

        let v = route_net(&map, s, t, Orientation::Vertical, &OFFSETS).unwrap();
        assert_eq!(v.points, vec![s, p(100.0, 500.0), t]);
    }

    #[test]
    fn blocked_preferred_corner_falls_back_to_the_other() {
        // Blocks both the first corner and the horizontal run into it.
        let map = obstacles(&[(400.0, 50.0, 550.0, 150.0)], 0.0);
        let s = p(100.0, 100.0);
        let t = p(500.0, 400.0);

        let path = route_net(&map, s, t, Orientation::Horizontal, &OFFSETS).unwrap();
        assert_eq!(path.points, vec![s, p(100.0, 400.0), t]);
    }

    #[test]
    fn both_corners_blocked_finds_a_displaced_rail() {
        let map = obstacles(
            &[(350.0, 50.0, 450.0, 150.0), (50.0, 350.0, 150.0, 450.0)],
            0.0,
        );
        let s = p(100.0, 100.0);
        let t = p(400.0, 400.0);

        let path = route_net(&map, s, t, Orientation::Horizontal, &OFFSETS).unwrap();
        // First clear candidate is the vertical rail 60 left of the
        // horizontal-first corner.
        assert_eq!(path.points, vec![s, p(340.0, 100.0), p(340.0, 400.0), t]);
    }

    #[test]
    fn preferred_orientation_exhausts_its_offsets_first() {
        // The horizontal-first corner and every 30-unit displacement of it
        // are blocked; the vertical-first corner is blocked too, but its
        // +30 displacement is clear. The horizontal-first ladder must still
        // run to completion, so its clear 60-unit candidate wins.
        let map = obstacles(
            &[(350.0, 50.0, 450.0, 150.0), (80.0, 380.0, 120.0, 420.0)],
            0.0,
        );
        let s = p(100.0, 100.0);
        let t = p(400.0, 400.0);

        let path = route_net(&map, s, t, Orientation::Horizontal, &OFFSETS).unwrap();
        assert_eq!(path.points, vec![s, p(340.0, 100.0), p(340.0, 400.0), t]);
    }

    #[test]
    fn collapsed_candidate_does_not_panic() {
        let map = obstacles(&[(100.0, 100.0, 200.0, 200.0)], 0.0);
        let path = clear_path(&map, vec![p(50.0, 50.0), p(50.0, 50.0)]).unwrap();
        assert_eq!(path.points.len(), 1);
    }

    #[test]
    fn collinear_terminals_detour_around_a_blocking_chip() {
        let map = obstacles(&[(400.0, 200.0, 500.0, 300.0)], 5.0);
        let s = p(300.0, 250.0);
        let t = p(600.0, 250.0);

        let path = route_net(&map, s, t, Orientation::Horizontal, &OFFSETS).unwrap();
        assert_eq!(
            path.points,
            vec![s, p(300.0, 310.0), p(600.0, 310.0), t]
        );
    }

    #[test]
    fn enclosed_target_is_unroutable() {
        let map = obstacles(&[(0.0, 0.0, 1000.0, 1000.0)], 0.0);
        let s = p(-100.0, 500.0);
        let t = p(500.0, 500.0);

        assert!(route_net(&map, s, t, Orientation::Horizontal, &OFFSETS).is_none());
        assert!(route_net(&map, s, t, Orientation::Vertical, &OFFSETS).is_none());
    }
}
