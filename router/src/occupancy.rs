use schem_common::db::core::{Orientation, Waypath};
use schem_common::db::indices::NetId;
use std::collections::BTreeMap;

/// Fixed-point scale for rail keys. Coordinates land on integer or
/// half-integer values in practice, so millis are exact.
const KEY_SCALE: f64 = 1000.0;

#[inline]
fn rail_key(v: f64) -> i64 {
    (v * KEY_SCALE).round() as i64
}

#[derive(Clone, Debug)]
struct Entry {
    lo: f64,
    hi: f64,
    net: NetId,
}

/// Tracks committed wire runs, grouped by rail: horizontal runs keyed by
/// their y coordinate, vertical runs by x. The two collections never
/// interact, so perpendicular crossings are always allowed.
#[derive(Default)]
pub struct OccupancyTracker {
    horizontal: BTreeMap<i64, Vec<Entry>>,
    vertical: BTreeMap<i64, Vec<Entry>>,
}

impl OccupancyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every non-degenerate run of `path` under `net`.
    pub fn register(&mut self, net: NetId, path: &Waypath) {
        for (a, b) in path.runs() {
            if a.y == b.y && a.x != b.x {
                self.horizontal.entry(rail_key(a.y)).or_default().push(Entry {
                    lo: a.x.min(b.x),
                    hi: a.x.max(b.x),
                    net,
                });
            } else if a.x == b.x && a.y != b.y {
                self.vertical.entry(rail_key(a.x)).or_default().push(Entry {
                    lo: a.y.min(b.y),
                    hi: a.y.max(b.y),
                    net,
                });
            }
        }
    }

    /// Drops every run recorded under `net`. Removing a net that was never
    /// registered is a no-op.
    pub fn remove_net(&mut self, net: NetId) {
        for rails in [&mut self.horizontal, &mut self.vertical] {
            rails.retain(|_, entries| {
                entries.retain(|e| e.net != net);
                !entries.is_empty()
            });
        }
    }

    /// Checks a prospective run of `kind` on rail `axis_value` spanning
    /// `[lo, hi]` against committed runs of other nets. Returns the
    /// positive perpendicular shift that clears every conflicting rail by
    /// `min_spacing`, or `None` when the run is already clear.
    ///
    /// A committed run conflicts when it is parallel, closer than
    /// `min_spacing` (exactly `min_spacing` apart is clear), belongs to a
    /// different net, and its span strictly overlaps `[lo, hi]`. Spans
    /// that merely share an endpoint do not overlap.
    pub fn conflict_offset(
        &self,
        kind: Orientation,
        axis_value: f64,
        lo: f64,
        hi: f64,
        net: NetId,
        min_spacing: f64,
    ) -> Option<f64> {
        let rails = match kind {
            Orientation::Horizontal => &self.horizontal,
            Orientation::Vertical => &self.vertical,
        };

        let (lo, hi) = (lo.min(hi), lo.max(hi));
        let from = rail_key(axis_value - min_spacing);
        let to = rail_key(axis_value + min_spacing);

        let mut worst: Option<i64> = None;
        for (&key, entries) in rails.range(from + 1..to) {
            let overlaps = entries
                .iter()
                .any(|e| e.net != net && e.lo < hi && e.hi > lo);
            if overlaps {
                worst = Some(worst.map_or(key, |w| w.max(key)));
            }
        }

        let worst = worst? as f64 / KEY_SCALE;
        let offset = worst + min_spacing - axis_value;
        (offset > 0.0).then_some(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schem_common::geom::point::Point;

    fn hpath(y: f64, x1: f64, x2: f64) -> Waypath {
        Waypath::new(vec![Point::new(x1, y), Point::new(x2, y)])
    }

    #[test]
    fn parallel_run_within_spacing_conflicts() {
        let mut occ = OccupancyTracker::new();
        occ.register(NetId::new(0), &hpath(300.0, 100.0, 500.0));

        let off = occ
            .conflict_offset(Orientation::Horizontal, 300.0, 300.0, 700.0, NetId::new(1), 10.0)
            .unwrap();
        assert_eq!(off, 10.0);
        // Shifted to y = 310 the run clears the committed rail exactly.
        assert!(occ
            .conflict_offset(Orientation::Horizontal, 310.0, 300.0, 700.0, NetId::new(1), 10.0)
            .is_none());
    }

    #[test]
    fn disjoint_spans_on_the_same_rail_are_clear() {
        let mut occ = OccupancyTracker::new();
        occ.register(NetId::new(0), &hpath(300.0, 100.0, 200.0));

        // Shares only the endpoint x = 200: not an overlap.
        assert!(occ
            .conflict_offset(Orientation::Horizontal, 300.0, 200.0, 400.0, NetId::new(1), 10.0)
            .is_none());
        assert!(occ
            .conflict_offset(Orientation::Horizontal, 300.0, 250.0, 400.0, NetId::new(1), 10.0)
            .is_none());
    }

    #[test]
    fn perpendicular_runs_never_conflict() {
        let mut occ = OccupancyTracker::new();
        occ.register(NetId::new(0), &hpath(300.0, 100.0, 500.0));

        // A vertical run crossing the horizontal rail is checked against
        // vertical rails only.
        assert!(occ
            .conflict_offset(Orientation::Vertical, 250.0, 200.0, 400.0, NetId::new(1), 10.0)
            .is_none());
    }

    #[test]
    fn own_runs_do_not_conflict() {
        let mut occ = OccupancyTracker::new();
        occ.register(NetId::new(0), &hpath(300.0, 100.0, 500.0));

        assert!(occ
            .conflict_offset(Orientation::Horizontal, 302.0, 100.0, 500.0, NetId::new(0), 10.0)
            .is_none());
    }

    #[test]
    fn removal_is_idempotent() {
        let mut occ = OccupancyTracker::new();
        occ.register(NetId::new(0), &hpath(300.0, 100.0, 500.0));

        occ.remove_net(NetId::new(0));
        assert!(occ
            .conflict_offset(Orientation::Horizontal, 300.0, 100.0, 500.0, NetId::new(1), 10.0)
            .is_none());

        // Second removal and removal of an unknown net change nothing.
        occ.remove_net(NetId::new(0));
        occ.remove_net(NetId::new(7));
        assert!(occ
            .conflict_offset(Orientation::Horizontal, 300.0, 100.0, 500.0, NetId::new(1), 10.0)
            .is_none());
    }

    #[test]
    fn shift_clears_the_farthest_conflicting_rail() {
        let mut occ = OccupancyTracker::new();
        occ.register(NetId::new(0), &hpath(300.0, 100.0, 500.0));
        occ.register(NetId::new(1), &hpath(305.0, 100.0, 500.0));

        let off = occ
            .conflict_offset(Orientation::Horizontal, 298.0, 100.0, 500.0, NetId::new(2), 10.0)
            .unwrap();
        assert_eq!(off, 305.0 + 10.0 - 298.0);
    }
}
