use crate::db::core::{CircuitDB, Waypath};
use crate::db::indices::{ChipId, NetId};
use crate::geom::point::Point;
use crate::geom::rect::Rect;
use std::collections::HashMap;

const CHECK_TOLERANCE: f64 = 1e-6;

/// Post-route verification: every waypath connects its net's terminals
/// through axis-aligned runs, and no run interior crosses a padded chip
/// interior. Boundary touching is allowed.
pub fn run(db: &CircuitDB, routed: &HashMap<NetId, Waypath>, padding: f64) -> Result<(), String> {
    log::info!("Starting Routing Verification...");

    let obstacles: Vec<Rect> = (0..db.num_chips())
        .map(|i| db.chip_rect(ChipId::new(i)).expand(padding))
        .collect();

    let mut msgs = Vec::new();

    let mut ids: Vec<NetId> = routed.keys().copied().collect();
    ids.sort();

    for id in ids {
        let net = &db.nets[id.index()];
        let path = &routed[&id];

        if path.points.is_empty() {
            msgs.push(format!("Net '{}': empty waypath", net.name));
            continue;
        }

        if let Err(e) = check_continuity(db, id, path) {
            msgs.push(e);
        }
        if let Err(e) = check_clearance(db, id, path, &obstacles) {
            msgs.push(e);
        }
    }

    if msgs.is_empty() {
        log::info!("\x1b[32mPASS\x1b[0m: All routed wires are clear and continuous.");
        Ok(())
    } else {
        for m in &msgs {
            log::error!("FAIL: {}", m);
        }
        Err(msgs.join("; "))
    }
}

fn check_continuity(db: &CircuitDB, id: NetId, path: &Waypath) -> Result<(), String> {
    let net = &db.nets[id.index()];

    for (a, b) in path.runs() {
        let dx = (a.x - b.x).abs();
        let dy = (a.y - b.y).abs();
        if dx > CHECK_TOLERANCE && dy > CHECK_TOLERANCE {
            return Err(format!(
                "Net '{}': diagonal run ({:.1},{:.1})->({:.1},{:.1})",
                net.name, a.x, a.y, b.x, b.y
            ));
        }
    }

    let close = |p: Point<f64>, q: Point<f64>| p.manhattan_dist(&q) < CHECK_TOLERANCE;
    let src = db.terminal(&net.from);
    let tgt = db.terminal(&net.to);
    match (src, tgt, path.source(), path.target()) {
        (Some(s), Some(t), Some(first), Some(last)) => {
            if !close(s, first) || !close(t, last) {
                return Err(format!("Net '{}': waypath detached from terminals", net.name));
            }
            Ok(())
        }
        _ => Err(format!("Net '{}': unresolvable terminals", net.name)),
    }
}

fn check_clearance(
    db: &CircuitDB,
    id: NetId,
    path: &Waypath,
    obstacles: &[Rect],
) -> Result<(), String> {
    let net = &db.nets[id.index()];

    for (a, b) in path.runs() {
        for r in obstacles {
            if run_crosses_interior(a, b, r) {
                return Err(format!(
                    "Net '{}': run ({:.1},{:.1})->({:.1},{:.1}) crosses obstacle interior",
                    net.name, a.x, a.y, b.x, b.y
                ));
            }
        }
    }
    Ok(())
}

fn run_crosses_interior(a: Point<f64>, b: Point<f64>, r: &Rect) -> bool {
    if (a.y - b.y).abs() < CHECK_TOLERANCE {
        let (lo, hi) = (a.x.min(b.x), a.x.max(b.x));
        a.y > r.min.y + CHECK_TOLERANCE
            && a.y < r.max.y - CHECK_TOLERANCE
            && lo < r.max.x - CHECK_TOLERANCE
            && hi > r.min.x + CHECK_TOLERANCE
    } else {
        let (lo, hi) = (a.y.min(b.y), a.y.max(b.y));
        a.x > r.min.x + CHECK_TOLERANCE
            && a.x < r.max.x - CHECK_TOLERANCE
            && lo < r.max.y - CHECK_TOLERANCE
            && hi > r.min.y + CHECK_TOLERANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_touch_is_not_a_crossing() {
        let r = Rect::new(Point::new(100.0, 100.0), Point::new(200.0, 200.0));
        // Along the top edge.
        assert!(!run_crosses_interior(
            Point::new(50.0, 100.0),
            Point::new(250.0, 100.0),
            &r
        ));
        // Ending exactly on the left edge.
        assert!(!run_crosses_interior(
            Point::new(50.0, 150.0),
            Point::new(100.0, 150.0),
            &r
        ));
        // Through the middle.
        assert!(run_crosses_interior(
            Point::new(50.0, 150.0),
            Point::new(250.0, 150.0),
            &r
        ));
    }
}
