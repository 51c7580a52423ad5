use crate::session::RoutingSession;
use crate::{scheduler, FailureReason, RoutingOutcome};
use schem_common::db::core::CircuitDB;
use schem_common::db::indices::NetId;

/// Runs the scheduler, then up to `max_ripup_iterations` rip-up passes.
/// Each pass rips the longest routed nets, at most half of them, and
/// reroutes them together with the failures in one batch. Nets with
/// unresolvable terminals are never retried. The loop is bounded and
/// every pass is a plain scheduler call, so the whole thing always
/// terminates with a complete routed/failed partition.
pub fn route_with_retry(
    db: &CircuitDB,
    session: &mut RoutingSession,
    net_ids: &[NetId],
) -> RoutingOutcome {
    let (mut routed, mut failed) = scheduler::route_pass(db, session, net_ids);
    let mut ripup_ran = false;

    for pass in 1..=session.cfg.max_ripup_iterations {
        let mut retry: Vec<NetId> = failed
            .iter()
            .filter(|(_, f)| f.reason != FailureReason::MissingTerminal)
            .map(|(&id, _)| id)
            .collect();
        retry.sort();
        if retry.is_empty() {
            break;
        }

        // Longest nets first, net id as the tie-break.
        let mut ranked: Vec<(NetId, f64)> = routed
            .iter()
            .map(|(&id, path)| (id, path.manhattan_len()))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        let victims: Vec<NetId> = ranked
            .into_iter()
            .take(retry.len().min(routed.len() / 2))
            .map(|(id, _)| id)
            .collect();
        if victims.is_empty() {
            break;
        }

        log::info!(
            "Rip-up pass {}: {} unrouted, ripping {} routed nets.",
            pass,
            retry.len(),
            victims.len()
        );

        for &id in &victims {
            session.occupancy.remove_net(id);
            routed.remove(&id);
        }

        let mut batch = victims;
        batch.extend(retry);
        batch.sort();
        for id in &batch {
            failed.remove(id);
        }

        let (pass_routed, pass_failed) = scheduler::route_pass(db, session, &batch);
        routed.extend(pass_routed);
        failed.extend(pass_failed);
        ripup_ran = true;
    }

    if ripup_ran {
        for failure in failed.values_mut() {
            if failure.reason != FailureReason::MissingTerminal {
                failure.reason = FailureReason::RerouteExhausted;
            }
        }
    }

    RoutingOutcome { routed, failed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schem_common::db::core::PinRef;
    use schem_common::geom::point::Point;
    use schem_common::geom::rect::Rect;
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

    fn crossbar_db() -> (CircuitDB, Vec<NetId>) {
        let mut db = CircuitDB::new();
        let mut ids = Vec::new();
        for i in 0..4 {
            let y = 100.0 + 50.0 * i as f64;
            pad(&mut db, &format!("l{i}"), p(100.0, y));
            pad(&mut db, &format!("r{i}"), p(600.0, y + 25.0));
            ids.push(net(
                &mut db,
                &format!("n{i}"),
                &format!("l{i}"),
                &format!("r{i}"),
            ));
        }
        (db, ids)
    }

    fn run(db: &CircuitDB, ids: &[NetId]) -> RoutingOutcome {
        let mut session = RoutingSession::new(RoutingConfig::default()).unwrap();
        route_with_retry(db, &mut session, ids)
    }

    #[test]
    fn clean_circuit_routes_in_one_pass() {
        let (db, ids) = crossbar_db();
        let outcome = run(&db, &ids);
        assert_eq!(outcome.routed_count(), ids.len());
        assert_eq!(outcome.failed_count(), 0);
    }

    #[test]
    fn repeated_runs_produce_identical_paths() {
        let (db, ids) = crossbar_db();
        let first = run(&db, &ids);
        let second = run(&db, &ids);
        for id in &ids {
            assert_eq!(first.routed[id], second.routed[id]);
        }
    }

    #[test]
    fn hopeless_net_terminates_as_exhausted() {
        let (mut db, mut ids) = crossbar_db();
        pad(&mut db, "in", p(2000.0, 2500.0));
        pad(&mut db, "out", p(2500.0, 2500.0));
        ids.push(net(&mut db, "stuck", "in", "out"));

        let mut session = RoutingSession::new(RoutingConfig::default()).unwrap();
        session
            .obstacles
            .add(Rect::new(p(1500.0, 2000.0), p(3000.0, 3000.0)), 0.0);
        let outcome = route_with_retry(&db, &mut session, &ids);

        assert_eq!(outcome.routed_count(), 4);
        assert_eq!(outcome.failed_count(), 1);
        let failure = outcome.failed.values().next().unwrap();
        assert_eq!(failure.reason, FailureReason::RerouteExhausted);
    }

    #[test]
    fn missing_terminal_is_reported_and_never_retried() {
        let (mut db, mut ids) = crossbar_db();
        pad(&mut db, "lone", p(900.0, 900.0));
        let dangling = net(&mut db, "dangling", "lone", "ghost");
        ids.push(dangling);

        let outcome = run(&db, &ids);
        assert_eq!(outcome.routed_count(), 4);
        assert_eq!(
            outcome.failed[&dangling].reason,
            FailureReason::MissingTerminal
        );
    }
}
