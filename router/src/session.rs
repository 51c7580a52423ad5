use crate::obstacle::ObstacleMap;
use crate::occupancy::OccupancyTracker;
use schem_common::util::config::{ConfigError, RoutingConfig};

/// All mutable router state for one circuit, owned by the caller and
/// discarded after use. Nothing here is shared or static.
pub struct RoutingSession {
    pub obstacles: ObstacleMap,
    pub occupancy: OccupancyTracker,
    pub cfg: RoutingConfig,
}

impl RoutingSession {
    pub fn new(cfg: RoutingConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            obstacles: ObstacleMap::new(),
            occupancy: OccupancyTracker::new(),
            cfg,
        })
    }
}
