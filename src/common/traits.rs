//! Common traits defining interfaces for the planning engine

use crate::common::error::PlannerResult;
use crate::common::types::*;

/// Trait for path planning algorithms
///
/// Implementations never fail for lack of a path: they return a
/// fallback path tagged with a non-`Reached` [`PlanStatus`]. `Err` is
/// reserved for an invalid scenario.
pub trait PathPlanner {
    /// Plan a path from `scenario.start` to `scenario.goal`
    fn plan(&self, scenario: &PlanningScenario) -> PlannerResult<PlanResult>;
}
