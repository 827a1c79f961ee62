//! Planning facade
//!
//! [`MotionPlanner`] is the single entry point for callers: it picks a
//! planner by [`Algorithm`], runs it, smooths the result and optionally
//! turns it into a timed [`Trajectory`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::common::{Path3D, PathPlanner, PlanResult, PlannerError, PlannerResult, PlanningScenario};
use crate::config::PlannerConfig;
use crate::path_planning::{smooth_path, AStarPlanner, RRTPlanner};
use crate::trajectory::{self, Trajectory};

/// Search strategy selectable by name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Grid-neighbor best-first search (A*)
    #[default]
    #[serde(alias = "astar")]
    Grid,
    /// Rapidly-exploring random tree (RRT)
    #[serde(alias = "rrt")]
    Tree,
}

impl FromStr for Algorithm {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grid" | "astar" => Ok(Algorithm::Grid),
            "tree" | "rrt" => Ok(Algorithm::Tree),
            _ => Err(PlannerError::UnknownAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Grid => write!(f, "grid"),
            Algorithm::Tree => write!(f, "tree"),
        }
    }
}

/// Everything produced for one planning request
#[derive(Debug, Clone, PartialEq)]
pub struct PlanOutcome {
    /// Planner output before smoothing, with its status
    pub raw: PlanResult,
    pub smoothed: Path3D,
    /// Present when a cruise speed was requested
    pub trajectory: Option<Trajectory>,
}

pub struct MotionPlanner {
    config: PlannerConfig,
}

impl MotionPlanner {
    pub fn new(config: PlannerConfig) -> PlannerResult<Self> {
        config.validate()?;
        Ok(MotionPlanner { config })
    }

    pub fn plan(&self, scenario: &PlanningScenario, algorithm: Algorithm) -> PlannerResult<PlanResult> {
        let result = match algorithm {
            Algorithm::Grid => AStarPlanner::new(self.config.a_star_config()).plan(scenario)?,
            Algorithm::Tree => RRTPlanner::new(self.config.rrt_config()).plan(scenario)?,
        };
        info!(
            %algorithm,
            status = ?result.status,
            iterations = result.iterations,
            waypoints = result.path.len(),
            "plan finished"
        );
        Ok(result)
    }

    /// [`MotionPlanner::plan`] with the algorithm given by name
    pub fn plan_named(&self, scenario: &PlanningScenario, algorithm: &str) -> PlannerResult<PlanResult> {
        self.plan(scenario, algorithm.parse()?)
    }

    pub fn smooth(&self, path: &Path3D, density: usize) -> PlannerResult<Path3D> {
        smooth_path(path, density)
    }

    pub fn resample(&self, path: &Path3D, speed: f64) -> PlannerResult<Trajectory> {
        trajectory::resample(path, speed)
    }

    /// Plan, smooth with the configured density and, given a speed, resample.
    ///
    /// The speed is checked before any search runs.
    pub fn run(
        &self,
        scenario: &PlanningScenario,
        algorithm: Algorithm,
        speed: Option<f64>,
    ) -> PlannerResult<PlanOutcome> {
        if let Some(v) = speed {
            if !(v.is_finite() && v > 0.0) {
                return Err(PlannerError::InvalidParameter(format!("speed must be > 0, got {}", v)));
            }
        }

        let raw = self.plan(scenario, algorithm)?;
        let smoothed = self.smooth(&raw.path, self.config.smoothing_density)?;
        let trajectory = match speed {
            Some(v) => Some(self.resample(&smoothed, v)?),
            None => None,
        };

        Ok(PlanOutcome { raw, smoothed, trajectory })
    }
}

impl Default for MotionPlanner {
    fn default() -> Self {
        MotionPlanner { config: PlannerConfig::default() }
    }
}
