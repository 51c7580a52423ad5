pub mod algo;
pub mod obstacle;
pub mod occupancy;
pub mod ripup;
pub mod scheduler;
pub mod session;

use schem_common::db::core::{CircuitDB, PinRef, Waypath};
use schem_common::db::indices::{ChipId, NetId};
use schem_common::util::config::{ConfigError, RoutingConfig};
use session::RoutingSession;
use std::collections::HashMap;
use thiserror::Error;

/// Per-net routing failures. All three are non-fatal: the scheduler and
/// the rip-up controller always complete and return a partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum FailureReason {
    #[error("terminal could not be resolved to a pin position")]
    MissingTerminal,
    #[error("no obstacle-clear corner in either orientation")]
    NoValidCorner,
    #[error("still unrouted after the rip-up iteration budget")]
    RerouteExhausted,
}

#[derive(Clone, Debug)]
pub struct RouteFailure {
    pub reason: FailureReason,
    /// The originating connection, echoed back for reporting.
    pub connection: (PinRef, PinRef),
}

#[derive(Debug, Default)]
pub struct RoutingOutcome {
    pub routed: HashMap<NetId, Waypath>,
    pub failed: HashMap<NetId, RouteFailure>,
}

impl RoutingOutcome {
    pub fn routed_count(&self) -> usize {
        self.routed.len()
    }
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

/// Routes every net of the circuit: builds a session, registers one padded
/// obstacle per placed component (boundary boxes included), and runs the
/// scheduler under the rip-up retry loop.
pub fn route(db: &CircuitDB, config: &RoutingConfig) -> Result<RoutingOutcome, ConfigError> {
    log::info!("Starting Routing for {} nets...", db.num_nets());

    let mut session = RoutingSession::new(config.clone())?;
    for i in 0..db.num_chips() {
        session
            .obstacles
            .add(db.chip_rect(ChipId::new(i)), config.obstacle_padding);
    }

    let net_ids: Vec<NetId> = (0..db.num_nets()).map(NetId::new).collect();
    let outcome = ripup::route_with_retry(db, &mut session, &net_ids);

    log::info!(
        "Routing finished: {} routed, {} failed.",
        outcome.routed_count(),
        outcome.failed_count()
    );
    Ok(outcome)
}
