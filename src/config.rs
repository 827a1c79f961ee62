use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::{Bounds3D, PlannerError, PlannerResult, PlanningScenario};
use crate::engine::Algorithm;
use crate::path_planning::{AStarConfig, RRTConfig, MIN_SAMPLES_PER_SEGMENT};
use crate::utils::collision_model::{DEFAULT_COLLISION_RESOLUTION, DEFAULT_SAFETY_MARGIN};

/// Engine tunables that are not part of a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub safety_margin: f64,
    pub collision_resolution: f64,
    pub vertical_ceiling: f64,
    pub detour_height: f64,
    pub goal_bias: f64,
    pub bounds_padding: f64,
    pub sampling_bounds: Option<Bounds3D>,
    pub smoothing_density: usize,
    pub seed: Option<u64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            safety_margin: DEFAULT_SAFETY_MARGIN,
            collision_resolution: DEFAULT_COLLISION_RESOLUTION,
            vertical_ceiling: 100.0,
            detour_height: 10.0,
            goal_bias: 0.1,
            bounds_padding: 20.0,
            sampling_bounds: None,
            smoothing_density: 10,
            seed: None,
        }
    }
}

impl PlannerConfig {
    pub fn from_toml_str(content: &str) -> PlannerResult<Self> {
        let config: PlannerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> PlannerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> PlannerResult<()> {
        let invalid = |msg: String| Err(PlannerError::InvalidParameter(msg));

        if !(self.safety_margin.is_finite() && self.safety_margin >= 0.0) {
            return invalid(format!("safety_margin must be >= 0, got {}", self.safety_margin));
        }
        if !(self.collision_resolution.is_finite() && self.collision_resolution > 0.0) {
            return invalid(format!("collision_resolution must be > 0, got {}", self.collision_resolution));
        }
        if !(self.vertical_ceiling.is_finite() && self.vertical_ceiling >= 0.0) {
            return invalid(format!("vertical_ceiling must be >= 0, got {}", self.vertical_ceiling));
        }
        if !self.detour_height.is_finite() {
            return invalid(format!("detour_height must be finite, got {}", self.detour_height));
        }
        if !(0.0..=1.0).contains(&self.goal_bias) {
            return invalid(format!("goal_bias must be within [0, 1], got {}", self.goal_bias));
        }
        if !(self.bounds_padding.is_finite() && self.bounds_padding >= 0.0) {
            return invalid(format!("bounds_padding must be >= 0, got {}", self.bounds_padding));
        }
        if let Some(bounds) = &self.sampling_bounds {
            if !bounds.is_valid() {
                return invalid(format!("invalid sampling_bounds {:?}", bounds));
            }
        }
        if self.smoothing_density < MIN_SAMPLES_PER_SEGMENT {
            return invalid(format!(
                "smoothing_density must be >= {}, got {}",
                MIN_SAMPLES_PER_SEGMENT, self.smoothing_density
            ));
        }
        Ok(())
    }

    pub fn a_star_config(&self) -> AStarConfig {
        AStarConfig {
            safety_margin: self.safety_margin,
            collision_resolution: self.collision_resolution,
            vertical_ceiling: self.vertical_ceiling,
            detour_height: self.detour_height,
        }
    }

    pub fn rrt_config(&self) -> RRTConfig {
        RRTConfig {
            safety_margin: self.safety_margin,
            collision_resolution: self.collision_resolution,
            goal_bias: self.goal_bias,
            bounds_padding: self.bounds_padding,
            sampling_bounds: self.sampling_bounds,
            seed: self.seed,
        }
    }
}

/// A complete planning job as read from a TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub scenario: PlanningScenario,
    #[serde(default)]
    pub algorithm: Algorithm,
    /// Cruise speed; no trajectory is produced when unset
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub planner: PlannerConfig,
}

impl PlanRequest {
    pub fn from_toml_str(content: &str) -> PlannerResult<Self> {
        let request: PlanRequest = toml::from_str(content)?;
        request.planner.validate()?;
        request.scenario.validate()?;
        Ok(request)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> PlannerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
