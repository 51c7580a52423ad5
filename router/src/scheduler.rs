use crate::algo::lshape;
use crate::session::RoutingSession;
use crate::{FailureReason, RouteFailure};
use schem_common::db::core::{CircuitDB, Orientation, Waypath};
use schem_common::db::indices::NetId;
use schem_common::geom::point::Point;
use std::collections::HashMap;

/// Routes one batch of nets in order. Each net is independent: a failure
/// is recorded and the pass moves on. Successful paths are nudged off
/// already-committed parallel runs, then committed to the occupancy
/// tracker so later nets in the batch see them.
pub fn route_pass(
    db: &CircuitDB,
    session: &mut RoutingSession,
    net_ids: &[NetId],
) -> (HashMap<NetId, Waypath>, HashMap<NetId, RouteFailure>) {
    let mut routed = HashMap::new();
    let mut failed = HashMap::new();

    for &id in net_ids {
        let net = &db.nets[id.index()];
        let connection = (net.from.clone(), net.to.clone());

        let (Some(s), Some(t)) = (db.terminal(&net.from), db.terminal(&net.to)) else {
            log::warn!("Net '{}' references an unresolvable terminal.", net.name);
            failed.insert(
                id,
                RouteFailure {
                    reason: FailureReason::MissingTerminal,
                    connection,
                },
            );
            continue;
        };

        match lshape::route_net(
            &session.obstacles,
            s,
            t,
            net.preferred,
            &session.cfg.corner_offsets,
        ) {
            Some(path) => {
                let path = separate_parallel(session, id, path);
                session.occupancy.register(id, &path);
                routed.insert(id, path);
            }
            None => {
                log::debug!("Net '{}' has no obstacle-clear candidate.", net.name);
                failed.insert(
                    id,
                    RouteFailure {
                        reason: FailureReason::NoValidCorner,
                        connection,
                    },
                );
            }
        }
    }

    (routed, failed)
}

/// Advisory spacing pass over a freshly routed path. Each run that sits
/// closer than `min_spacing` to a committed parallel run of another net
/// is shifted perpendicular just far enough to clear; the shifted path is
/// kept only when it still clears every obstacle. A shift never fails the
/// net, the crowded original is kept instead.
fn separate_parallel(session: &RoutingSession, net: NetId, path: Waypath) -> Waypath {
    let mut current = path;
    let mut idx = 0;
    while idx + 1 < current.points.len() {
        let (a, b) = (current.points[idx], current.points[idx + 1]);
        let kind = if a.y == b.y && a.x != b.x {
            Orientation::Horizontal
        } else if a.x == b.x && a.y != b.y {
            Orientation::Vertical
        } else {
            idx += 1;
            continue;
        };

        let (axis, lo, hi) = match kind {
            Orientation::Horizontal => (a.y, a.x.min(b.x), a.x.max(b.x)),
            Orientation::Vertical => (a.x, a.y.min(b.y), a.y.max(b.y)),
        };

        if let Some(offset) = session.occupancy.conflict_offset(
            kind,
            axis,
            lo,
            hi,
            net,
            session.cfg.min_spacing,
        ) {
            let shifted = shift_run(&current, idx, kind, offset);
            if lshape::clear_path(&session.obstacles, shifted.points.clone()).is_some() {
                // A stitch inserted at a terminal start moves the shifted
                // run one index forward.
                if idx == 0 && shifted.points.len() > current.points.len() {
                    idx += 1;
                }
                current = shifted;
            }
        }
        idx += 1;
    }
    current
}

/// Displaces the run `idx` of `path` perpendicular by `offset`. Interior
/// neighbours stretch or shrink with the moved endpoints; a terminal
/// endpoint stays put and gains a stitch point instead.
fn shift_run(path: &Waypath, idx: usize, kind: Orientation, offset: f64) -> Waypath {
    let delta = match kind {
        Orientation::Horizontal => Point::new(0.0, offset),
        Orientation::Vertical => Point::new(offset, 0.0),
    };

    let last = path.points.len() - 1;
    let mut pts = Vec::with_capacity(path.points.len() + 2);
    for (i, &p) in path.points.iter().enumerate() {
        if i == idx {
            if i == 0 {
                pts.push(p);
            }
            pts.push(p + delta);
        } else if i == idx + 1 {
            pts.push(p + delta);
            if i == last {
                pts.push(p);
            }
        } else {
            pts.push(p);
        }
    }
    Waypath::new(pts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use schem_common::db::core::PinRef;
    use schem_common::util::config::RoutingConfig;

    fn p(x: f64, y: f64) -> Point<f64> {
        Point::new(x, y)
    }

    fn pad(db: &mut CircuitDB, name: &str, at: Point<f64>) {
        let chip = db.add_chip(name.into(), "PAD".into(), 0.0, 0.0, true);
        db.positions[chip.index()] = at;
        db.add_pin(chip, "1".into(), p(0.0, 0.0));
    }

    fn net(db: &mut CircuitDB, name: &str, from: &str, to: &str) -> NetId {
        db.add_net(name.into(), PinRef::new(from, "1"), PinRef::new(to, "1"))
    }

    fn session() -> RoutingSession {
        RoutingSession::new(RoutingConfig::default()).unwrap()
    }

    #[test]
    fn overlapping_parallel_nets_get_spaced_apart() {
        let mut db = CircuitDB::new();
        pad(&mut db, "a0", p(100.0, 300.0));
        pad(&mut db, "a1", p(500.0, 300.0));
        pad(&mut db, "b0", p(300.0, 300.0));
        pad(&mut db, "b1", p(700.0, 300.0));
        let n0 = net(&mut db, "first", "a0", "a1");
        let n1 = net(&mut db, "second", "b0", "b1");

        let mut session = session();
        let (routed, failed) = route_pass(&db, &mut session, &[n0, n1]);

        assert!(failed.is_empty());
        assert_eq!(routed[&n0].points, vec![p(100.0, 300.0), p(500.0, 300.0)]);
        // The second net keeps its terminals on the shared rail and jogs
        // onto y = 310 in between.
        assert_eq!(
            routed[&n1].points,
            vec![
                p(300.0, 300.0),
                p(300.0, 310.0),
                p(700.0, 310.0),
                p(700.0, 300.0),
            ]
        );
    }

    #[test]
    fn unknown_terminal_fails_without_stopping_the_batch() {
        let mut db = CircuitDB::new();
        pad(&mut db, "a0", p(100.0, 100.0));
        pad(&mut db, "a1", p(400.0, 100.0));
        let bad = net(&mut db, "dangling", "a0", "nowhere");
        let good = net(&mut db, "fine", "a0", "a1");

        let mut session = session();
        let (routed, failed) = route_pass(&db, &mut session, &[bad, good]);

        assert_eq!(failed[&bad].reason, FailureReason::MissingTerminal);
        assert!(routed.contains_key(&good));
    }

    #[test]
    fn enclosed_net_fails_while_the_rest_route() {
        use schem_common::geom::rect::Rect;

        let mut db = CircuitDB::new();
        pad(&mut db, "in", p(2000.0, 2500.0));
        pad(&mut db, "out", p(2500.0, 2500.0));
        pad(&mut db, "a0", p(100.0, 100.0));
        pad(&mut db, "a1", p(400.0, 300.0));
        let stuck = net(&mut db, "stuck", "in", "out");
        let ok = net(&mut db, "ok", "a0", "a1");

        let mut session = session();
        session
            .obstacles
            .add(Rect::new(p(1500.0, 2000.0), p(3000.0, 3000.0)), 0.0);

        let (routed, failed) = route_pass(&db, &mut session, &[stuck, ok]);
        assert_eq!(failed[&stuck].reason, FailureReason::NoValidCorner);
        assert!(routed.contains_key(&ok));
    }

    #[test]
    fn shift_run_stretches_interior_neighbours() {
        let path = Waypath::new(vec![
            p(0.0, 0.0),
            p(0.0, 100.0),
            p(200.0, 100.0),
            p(200.0, 50.0),
        ]);
        let shifted = shift_run(&path, 1, Orientation::Horizontal, 20.0);
        assert_eq!(
            shifted.points,
            vec![p(0.0, 0.0), p(0.0, 120.0), p(200.0, 120.0), p(200.0, 50.0)]
        );
    }

    #[test]
    fn shift_run_stitches_at_both_terminals() {
        let path = Waypath::new(vec![p(100.0, 300.0), p(500.0, 300.0)]);
        let shifted = shift_run(&path, 0, Orientation::Horizontal, 10.0);
        assert_eq!(
            shifted.points,
            vec![
                p(100.0, 300.0),
                p(100.0, 310.0),
                p(500.0, 310.0),
                p(500.0, 300.0),
            ]
        );
    }
}
