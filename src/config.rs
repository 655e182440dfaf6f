use crate::consts::{
    DEFAULT_DELTA_BULGE, DEFAULT_DELTA_FLOOR, DEFAULT_MIN_EDGE_WEIGHT, DEFAULT_SUM_TOLERANCE,
    DEFAULT_TOP_K,
};
use crate::error::{ShotLensError, SlResult};
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    #[command(flatten)]
    pub delta: DeltaParams,
    #[command(flatten)]
    pub flow: FlowParams,
}

/// Coefficients of the nudge curve `delta(p) = (floor + 4 * bulge * p * (1 - p)) / 100`.
#[derive(Args, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeltaParams {
    #[arg(long, default_value_t = DEFAULT_DELTA_FLOOR)]
    pub delta_floor: f64,
    #[arg(long, default_value_t = DEFAULT_DELTA_BULGE)]
    pub delta_bulge: f64,
    #[arg(long, default_value_t = DEFAULT_SUM_TOLERANCE)]
    pub sum_tolerance: f64,
}

impl Default for DeltaParams {
    fn default() -> Self {
        Self {
            delta_floor: DEFAULT_DELTA_FLOOR,
            delta_bulge: DEFAULT_DELTA_BULGE,
            sum_tolerance: DEFAULT_SUM_TOLERANCE,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FlowParams {
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,
    #[arg(long, default_value_t = DEFAULT_MIN_EDGE_WEIGHT)]
    pub min_edge_weight: f64,
}

impl Default for FlowParams {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            min_edge_weight: DEFAULT_MIN_EDGE_WEIGHT,
        }
    }
}

impl EngineConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> SlResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ShotLensError::Config(format!("Failed to read config '{}': {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SlResult<()> {
        if !self.delta.delta_floor.is_finite() || self.delta.delta_floor < 0.0 {
            return Err(ShotLensError::Config(format!(
                "delta_floor must be a non-negative number, got {}",
                self.delta.delta_floor
            )));
        }
        if !self.delta.delta_bulge.is_finite() || self.delta.delta_bulge < 0.0 {
            return Err(ShotLensError::Config(format!(
                "delta_bulge must be a non-negative number, got {}",
                self.delta.delta_bulge
            )));
        }
        if !self.delta.sum_tolerance.is_finite() || self.delta.sum_tolerance < 0.0 {
            return Err(ShotLensError::Config(format!(
                "sum_tolerance must be a non-negative number, got {}",
                self.delta.sum_tolerance
            )));
        }
        if self.flow.top_k == 0 {
            return Err(ShotLensError::Config("top_k must be at least 1".into()));
        }
        if !self.flow.min_edge_weight.is_finite() || self.flow.min_edge_weight < 0.0 {
            return Err(ShotLensError::Config(format!(
                "min_edge_weight must be a non-negative number, got {}",
                self.flow.min_edge_weight
            )));
        }
        Ok(())
    }

    /// Copies over only the values the user actually typed on the command line,
    /// so a config file stays authoritative for everything else.
    pub fn merge_from_cli(&mut self, cli: &EngineConfig, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($group:ident, $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$group.$field = cli.$group.$field.clone();
                }
            };
        }

        update_if_present!(delta, delta_floor);
        update_if_present!(delta, delta_bulge);
        update_if_present!(delta, sum_tolerance);

        update_if_present!(flow, top_k);
        update_if_present!(flow, min_edge_weight);
    }
}
