//! RRT (Rapidly-exploring Random Tree) path planning algorithm
//!
//! Sampling-based path planning algorithm that builds a tree by
//! randomly sampling the configuration space. Every inserted node keeps
//! the index of the node it was grown from, so the final path is a
//! walk up the parent chain.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Bernoulli, Distribution, Uniform};
use ordered_float::OrderedFloat;
use tracing::{debug, warn};

use crate::common::{
    Bounds3D, Path3D, PathPlanner, PlanResult, PlanStatus, PlannerError, PlannerResult,
    PlanningScenario, Point3D,
};
use crate::utils::collision_model::{CollisionModel, DEFAULT_COLLISION_RESOLUTION, DEFAULT_SAFETY_MARGIN};

/// Steering distance in grid steps
const EXTEND_STEPS: f64 = 2.0;
/// A node this close to the goal (in grid steps) tries to connect directly
const GOAL_REACH_STEPS: f64 = 3.0;

/// Internal node for RRT tree
#[derive(Debug, Clone)]
pub struct RRTNode {
    pub position: Point3D,
    pub parent: Option<usize>,
}

impl RRTNode {
    pub fn new(position: Point3D, parent: Option<usize>) -> Self {
        RRTNode { position, parent }
    }
}

/// Configuration for RRT planner
#[derive(Debug, Clone)]
pub struct RRTConfig {
    /// Extra clearance kept around every obstacle
    pub safety_margin: f64,
    /// Sample spacing for segment collision checks
    pub collision_resolution: f64,
    /// Probability of sampling the goal itself
    pub goal_bias: f64,
    /// Padding around the scenario when `sampling_bounds` is unset
    pub bounds_padding: f64,
    /// Explicit sampling region
    pub sampling_bounds: Option<Bounds3D>,
    /// Seed for [`PathPlanner::plan`]; fresh entropy when unset
    pub seed: Option<u64>,
}

impl Default for RRTConfig {
    fn default() -> Self {
        Self {
            safety_margin: DEFAULT_SAFETY_MARGIN,
            collision_resolution: DEFAULT_COLLISION_RESOLUTION,
            goal_bias: 0.1,
            bounds_padding: 20.0,
            sampling_bounds: None,
            seed: None,
        }
    }
}

/// Draws exploration samples: the goal with probability `goal_bias`,
/// otherwise a uniform point inside the sampling bounds
struct Sampler {
    goal: Point3D,
    goal_bias: Bernoulli,
    x: Uniform<f64>,
    y: Uniform<f64>,
    z: Uniform<f64>,
}

impl Sampler {
    fn new(goal: Point3D, goal_bias: f64, bounds: &Bounds3D) -> PlannerResult<Self> {
        let goal_bias = Bernoulli::new(goal_bias).map_err(|_| {
            PlannerError::InvalidParameter(format!("goal_bias must be within [0, 1], got {}", goal_bias))
        })?;
        if !bounds.is_valid() {
            return Err(PlannerError::InvalidParameter(format!("invalid sampling bounds {:?}", bounds)));
        }

        Ok(Sampler {
            goal,
            goal_bias,
            x: Uniform::new_inclusive(bounds.min.x, bounds.max.x),
            y: Uniform::new_inclusive(bounds.min.y, bounds.max.y),
            z: Uniform::new_inclusive(bounds.min.z, bounds.max.z),
        })
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Point3D {
        if self.goal_bias.sample(rng) {
            self.goal
        } else {
            Point3D::new(self.x.sample(rng), self.y.sample(rng), self.z.sample(rng))
        }
    }
}

/// RRT path planner
pub struct RRTPlanner {
    config: RRTConfig,
}

impl RRTPlanner {
    pub fn new(config: RRTConfig) -> Self {
        RRTPlanner { config }
    }

    /// Plan with a caller-supplied random source
    pub fn plan_with_rng<R: Rng + ?Sized>(
        &self,
        scenario: &PlanningScenario,
        rng: &mut R,
    ) -> PlannerResult<PlanResult> {
        scenario.validate()?;

        let start = scenario.start;
        let goal = scenario.goal;
        let model = self.collision_model(scenario);
        let bounds = self.config.sampling_bounds
            .unwrap_or_else(|| Bounds3D::around(scenario, self.config.bounds_padding));
        let sampler = Sampler::new(goal, self.config.goal_bias, &bounds)?;

        if !model.is_point_clear(&start) || !model.is_point_clear(&goal) {
            warn!(?start, ?goal, "RRT: start or goal is blocked, skipping search");
            let path = Path3D::from_points(vec![start, goal]);
            return Ok(PlanResult::new(path, PlanStatus::BlockedEndpoint, 0));
        }

        let extend_length = EXTEND_STEPS * scenario.grid_step;
        let reach_distance = GOAL_REACH_STEPS * scenario.grid_step;
        let mut node_list = vec![RRTNode::new(start, None)];

        if start.distance(&goal) <= reach_distance && model.is_segment_clear(&start, &goal) {
            let path = Path3D::from_points(vec![start, goal]);
            return Ok(PlanResult::new(path, PlanStatus::Reached, 0));
        }

        for iteration in 1..=scenario.max_iterations {
            let rnd = sampler.sample(rng);
            let nearest_ind = Self::get_nearest_node_index(&node_list, &rnd);
            let nearest = node_list[nearest_ind].position;

            let new_point = match Self::steer(&nearest, &rnd, extend_length) {
                Some(p) => p,
                None => continue,
            };
            if !model.is_point_clear(&new_point) || !model.is_segment_clear(&nearest, &new_point) {
                continue;
            }

            node_list.push(RRTNode::new(new_point, Some(nearest_ind)));

            if new_point.distance(&goal) <= reach_distance && model.is_segment_clear(&new_point, &goal) {
                let path = Self::generate_final_course(&node_list, node_list.len() - 1, goal);
                debug!(
                    iterations = iteration,
                    nodes = node_list.len(),
                    waypoints = path.len(),
                    length = path.total_length(),
                    "RRT: goal reached"
                );
                return Ok(PlanResult::new(path, PlanStatus::Reached, iteration));
            }
        }

        let closest_ind = Self::get_nearest_node_index(&node_list, &goal);
        let path = Self::generate_final_course(&node_list, closest_ind, goal);
        warn!(
            iterations = scenario.max_iterations,
            nodes = node_list.len(),
            gap = node_list[closest_ind].position.distance(&goal),
            "RRT: iteration limit reached, returning closest branch"
        );
        Ok(PlanResult::new(path, PlanStatus::BestEffort, scenario.max_iterations))
    }

    fn collision_model(&self, scenario: &PlanningScenario) -> CollisionModel {
        CollisionModel::from_scenario(scenario)
            .with_safety_margin(self.config.safety_margin)
            .with_resolution(self.config.collision_resolution)
    }

    /// Move from `from` towards `to` by at most `extend_length`
    fn steer(from: &Point3D, to: &Point3D, extend_length: f64) -> Option<Point3D> {
        let d = from.distance(to);
        if d < f64::EPSILON {
            return None;
        }
        if d <= extend_length {
            return Some(*to);
        }
        Some(from.lerp(to, extend_length / d))
    }

    /// First node with minimal distance to `p`
    fn get_nearest_node_index(node_list: &[RRTNode], p: &Point3D) -> usize {
        node_list
            .iter()
            .enumerate()
            .min_by_key(|(_, node)| OrderedFloat(node.position.distance(p)))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Walk parents from `last_ind` back to the root, then append the goal
    fn generate_final_course(node_list: &[RRTNode], last_ind: usize, goal: Point3D) -> Path3D {
        let mut points = Vec::new();
        let mut node_index = Some(last_ind);

        while let Some(index) = node_index {
            let node = &node_list[index];
            points.push(node.position);
            node_index = node.parent;
        }

        points.reverse();
        if points.len() > 1 && points.last().map_or(false, |p| p.approx_eq(&goal, 1e-9)) {
            points.pop();
        }
        points.push(goal);
        Path3D::from_points(points)
    }
}

impl Default for RRTPlanner {
    fn default() -> Self {
        Self::new(RRTConfig::default())
    }
}

impl PathPlanner for RRTPlanner {
    fn plan(&self, scenario: &PlanningScenario) -> PlannerResult<PlanResult> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.plan_with_rng(scenario, &mut rng)
    }
}
