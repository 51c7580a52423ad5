use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("obstacle padding must be non-negative (got {0})")]
    NegativePadding(f64),
    #[error("minimum wire spacing must be positive (got {0})")]
    NonPositiveSpacing(f64),
    #[error("corner offset list must be non-empty, positive and ascending")]
    BadCornerOffsets,
    #[error("max rip-up iterations must be at least 1")]
    ZeroIterations,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub input: InputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            routing: RoutingConfig::default(),
            layout: LayoutConfig::default(),
            input: InputConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RoutingConfig {
    #[serde(default = "default_obstacle_padding")]
    pub obstacle_padding: f64,
    #[serde(default = "default_min_spacing")]
    pub min_spacing: f64,
    #[serde(default = "default_corner_offsets")]
    pub corner_offsets: Vec<f64>,
    #[serde(default = "default_max_ripup_iterations")]
    pub max_ripup_iterations: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            obstacle_padding: default_obstacle_padding(),
            min_spacing: default_min_spacing(),
            corner_offsets: default_corner_offsets(),
            max_ripup_iterations: default_max_ripup_iterations(),
        }
    }
}

impl RoutingConfig {
    /// Precondition check, run once at session construction. Malformed
    /// configuration is a caller error, distinct from per-net failures.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.obstacle_padding < 0.0 {
            return Err(ConfigError::NegativePadding(self.obstacle_padding));
        }
        if self.min_spacing <= 0.0 {
            return Err(ConfigError::NonPositiveSpacing(self.min_spacing));
        }
        let ascending = self
            .corner_offsets
            .windows(2)
            .all(|w| w[0] < w[1]);
        if self.corner_offsets.is_empty()
            || self.corner_offsets[0] <= 0.0
            || !ascending
        {
            return Err(ConfigError::BadCornerOffsets);
        }
        if self.max_ripup_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LayoutConfig {
    #[serde(default = "default_layer_spacing_x")]
    pub layer_spacing_x: f64,
    #[serde(default = "default_chip_spacing_y")]
    pub chip_spacing_y: f64,
    #[serde(default = "default_start_x")]
    pub start_x: f64,
    #[serde(default = "default_start_y")]
    pub start_y: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            layer_spacing_x: default_layer_spacing_x(),
            chip_spacing_y: default_chip_spacing_y(),
            start_x: default_start_x(),
            start_y: default_start_y(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_chips_csv")]
    pub chips_csv: String,
    #[serde(default = "default_connections_csv")]
    pub connections_csv: String,
    #[serde(default = "default_datasheets_csv")]
    pub datasheets_csv: String,
    #[serde(default = "default_output_svg")]
    pub output_svg: String,
    #[serde(default = "default_output_png")]
    pub output_png: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            chips_csv: default_chips_csv(),
            connections_csv: default_connections_csv(),
            datasheets_csv: default_datasheets_csv(),
            output_svg: default_output_svg(),
            output_png: default_output_png(),
        }
    }
}

fn default_obstacle_padding() -> f64 {
    5.0
}

fn default_min_spacing() -> f64 {
    10.0
}

fn default_corner_offsets() -> Vec<f64> {
    vec![30.0, 60.0, 90.0, 120.0]
}

fn default_max_ripup_iterations() -> usize {
    3
}

fn default_layer_spacing_x() -> f64 {
    400.0
}

fn default_chip_spacing_y() -> f64 {
    300.0
}

fn default_start_x() -> f64 {
    250.0
}

fn default_start_y() -> f64 {
    100.0
}

fn default_chips_csv() -> String {
    "inputs/chips.csv".to_string()
}

fn default_connections_csv() -> String {
    "inputs/connections.csv".to_string()
}

fn default_datasheets_csv() -> String {
    "inputs/chip_datasheets.csv".to_string()
}

fn default_output_svg() -> String {
    "output/circuit_diagram.svg".to_string()
}

fn default_output_png() -> String {
    "output/circuit_diagram.png".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_routing_config_is_valid() {
        assert_eq!(RoutingConfig::default().validate(), Ok(()));
    }

    #[test]
    fn negative_spacing_rejected() {
        let cfg = RoutingConfig {
            min_spacing: -1.0,
            ..RoutingConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NonPositiveSpacing(-1.0)));
    }

    #[test]
    fn unsorted_corner_offsets_rejected() {
        let cfg = RoutingConfig {
            corner_offsets: vec![60.0, 30.0],
            ..RoutingConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::BadCornerOffsets));
    }
}
