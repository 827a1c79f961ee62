//! A* path planning over a virtual 3D grid
//!
//! Best-first search with 26-connectivity. Node positions stay continuous
//! (start plus integer multiples of the grid step) and are deduplicated by
//! rounding to a [`GridKey`]. The heuristic is the straight-line distance
//! to the goal, which is consistent since edge costs are Euclidean.
//!
//! The planner never fails for lack of a path: when the search cannot
//! reach the goal it degrades to a direct segment or a raised detour.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use itertools::iproduct;
use ordered_float::OrderedFloat;
use tracing::{debug, warn};

use crate::common::{Path3D, PathPlanner, PlanResult, PlanStatus, PlannerResult, PlanningScenario, Point3D};
use crate::utils::collision_model::{CollisionModel, DEFAULT_COLLISION_RESOLUTION, DEFAULT_SAFETY_MARGIN};

/// A node this close to the goal (in grid steps) tries to connect directly
const GOAL_REACH_STEPS: f64 = 2.0;

/// Configuration for the A* planner
#[derive(Debug, Clone)]
pub struct AStarConfig {
    /// Extra clearance kept around every obstacle
    pub safety_margin: f64,
    /// Sample spacing for segment collision checks
    pub collision_resolution: f64,
    /// Expanded nodes must satisfy `0 <= z <= vertical_ceiling`
    pub vertical_ceiling: f64,
    /// Height of the fallback detour midpoint above the higher endpoint
    pub detour_height: f64,
}

impl Default for AStarConfig {
    fn default() -> Self {
        Self {
            safety_margin: DEFAULT_SAFETY_MARGIN,
            collision_resolution: DEFAULT_COLLISION_RESOLUTION,
            vertical_ceiling: 100.0,
            detour_height: 10.0,
        }
    }
}

/// Integer cell a continuous position falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridKey {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl GridKey {
    pub fn quantize(p: &Point3D, grid_step: f64) -> Self {
        GridKey {
            x: (p.x / grid_step).round() as i64,
            y: (p.y / grid_step).round() as i64,
            z: (p.z / grid_step).round() as i64,
        }
    }
}

#[derive(Debug, Clone)]
struct SearchNode {
    position: Point3D,
    cost: f64,
    heuristic: f64,
    parent_index: Option<usize>,
}

impl SearchNode {
    fn new(position: Point3D, cost: f64, heuristic: f64, parent_index: Option<usize>) -> Self {
        SearchNode { position, cost, heuristic, parent_index }
    }

    fn total(&self) -> f64 {
        self.cost + self.heuristic
    }
}

/// Open set entry; equal priorities pop in insertion order
#[derive(Debug, PartialEq, Eq)]
struct PriorityNode {
    priority: OrderedFloat<f64>,
    index: usize,
}

impl Ord for PriorityNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        other.priority.cmp(&self.priority)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for PriorityNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* path planner
pub struct AStarPlanner {
    config: AStarConfig,
    motion: Vec<Point3D>,
}

impl AStarPlanner {
    pub fn new(config: AStarConfig) -> Self {
        AStarPlanner {
            config,
            motion: Self::get_motion_model(),
        }
    }

    /// All 26 non-zero offsets of {-1, 0, 1}^3, in unit grid steps
    fn get_motion_model() -> Vec<Point3D> {
        iproduct!(-1..=1, -1..=1, -1..=1)
            .filter(|&(dx, dy, dz)| (dx, dy, dz) != (0, 0, 0))
            .map(|(dx, dy, dz)| Point3D::new(dx as f64, dy as f64, dz as f64))
            .collect()
    }

    fn collision_model(&self, scenario: &PlanningScenario) -> CollisionModel {
        CollisionModel::from_scenario(scenario)
            .with_safety_margin(self.config.safety_margin)
            .with_resolution(self.config.collision_resolution)
    }

    fn in_vertical_band(&self, p: &Point3D) -> bool {
        p.z >= 0.0 && p.z <= self.config.vertical_ceiling
    }

    fn build_path(&self, goal_index: usize, node_storage: &[SearchNode], goal: Point3D) -> Path3D {
        let mut points = Vec::new();
        let mut current_index = Some(goal_index);

        while let Some(index) = current_index {
            let node = &node_storage[index];
            points.push(node.position);
            current_index = node.parent_index;
        }

        points.reverse();
        if points.len() > 1 && points.last().map_or(false, |p| p.approx_eq(&goal, 1e-9)) {
            points.pop();
        }
        points.push(goal);
        Path3D::from_points(points)
    }

    /// Direct segment if clear, otherwise a detour over a raised midpoint.
    ///
    /// Only the start-to-midpoint leg of the detour is verified.
    fn fallback_path(&self, model: &CollisionModel, start: Point3D, goal: Point3D) -> (Path3D, PlanStatus) {
        if model.is_segment_clear(&start, &goal) {
            return (Path3D::from_points(vec![start, goal]), PlanStatus::DirectFallback);
        }

        let midpoint = Point3D::new(
            (start.x + goal.x) / 2.0,
            (start.y + goal.y) / 2.0,
            start.z.max(goal.z) + self.config.detour_height,
        );
        if model.is_segment_clear(&start, &midpoint) {
            return (Path3D::from_points(vec![start, midpoint, goal]), PlanStatus::DetourFallback);
        }

        (Path3D::from_points(vec![start, goal]), PlanStatus::Unverified)
    }
}

impl Default for AStarPlanner {
    fn default() -> Self {
        Self::new(AStarConfig::default())
    }
}

impl PathPlanner for AStarPlanner {
    fn plan(&self, scenario: &PlanningScenario) -> PlannerResult<PlanResult> {
        scenario.validate()?;

        let start = scenario.start;
        let goal = scenario.goal;
        let grid_step = scenario.grid_step;
        let model = self.collision_model(scenario);

        if !model.is_point_clear(&start) || !model.is_point_clear(&goal) {
            warn!(?start, ?goal, "A*: start or goal is blocked, skipping search");
            let path = Path3D::from_points(vec![start, goal]);
            return Ok(PlanResult::new(path, PlanStatus::BlockedEndpoint, 0));
        }

        let mut open_set = BinaryHeap::new();
        let mut closed_set: HashSet<GridKey> = HashSet::new();
        let mut node_storage: Vec<SearchNode> = Vec::new();
        // Cheapest node index found so far for each cell
        let mut best_index: HashMap<GridKey, usize> = HashMap::new();

        node_storage.push(SearchNode::new(start, 0.0, start.distance(&goal), None));
        best_index.insert(GridKey::quantize(&start, grid_step), 0);
        open_set.push(PriorityNode {
            priority: OrderedFloat(node_storage[0].total()),
            index: 0,
        });

        let mut expansions = 0;
        while let Some(current) = open_set.pop() {
            let current_node = node_storage[current.index].clone();
            let current_key = GridKey::quantize(&current_node.position, grid_step);

            if closed_set.contains(&current_key) {
                continue;
            }
            // Superseded by a cheaper node in the same cell
            if best_index.get(&current_key) != Some(&current.index) {
                continue;
            }
            if expansions >= scenario.max_iterations {
                break;
            }
            expansions += 1;
            closed_set.insert(current_key);

            if current_node.position.distance(&goal) <= GOAL_REACH_STEPS * grid_step
                && model.is_segment_clear(&current_node.position, &goal)
            {
                let path = self.build_path(current.index, &node_storage, goal);
                debug!(
                    expansions,
                    nodes = node_storage.len(),
                    waypoints = path.len(),
                    length = path.total_length(),
                    "A*: goal reached"
                );
                return Ok(PlanResult::new(path, PlanStatus::Reached, expansions));
            }

            for offset in &self.motion {
                let next = current_node.position + *offset * grid_step;
                if !self.in_vertical_band(&next) {
                    continue;
                }

                let next_key = GridKey::quantize(&next, grid_step);
                if closed_set.contains(&next_key) {
                    continue;
                }
                if !model.is_point_clear(&next) || !model.is_segment_clear(&current_node.position, &next) {
                    continue;
                }

                let new_cost = current_node.cost + current_node.position.distance(&next);
                if let Some(&existing) = best_index.get(&next_key) {
                    if new_cost >= node_storage[existing].cost {
                        continue;
                    }
                }

                node_storage.push(SearchNode::new(next, new_cost, next.distance(&goal), Some(current.index)));
                let new_index = node_storage.len() - 1;
                best_index.insert(next_key, new_index);
                open_set.push(PriorityNode {
                    priority: OrderedFloat(node_storage[new_index].total()),
                    index: new_index,
                });
            }
        }

        if expansions >= scenario.max_iterations {
            warn!(expansions, "A*: iteration limit reached, using fallback path");
        } else {
            warn!(expansions, "A*: open set exhausted, using fallback path");
        }

        let (path, status) = self.fallback_path(&model, start, goal);
        debug!(?status, waypoints = path.len(), "A*: fallback selected");
        Ok(PlanResult::new(path, status, expansions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Obstacle, PlannerError};

    fn assert_clear_of(path: &Path3D, obstacle: &Obstacle, min_distance: f64) {
        for p in &path.points {
            let d = p.distance(&obstacle.position);
            assert!(d >= min_distance, "point {:?} is {} from obstacle, expected >= {}", p, d, min_distance);
        }
    }

    #[test]
    fn test_motion_model_is_26_connected() {
        let motion = AStarPlanner::get_motion_model();
        assert_eq!(motion.len(), 26);
        assert!(!motion.contains(&Point3D::origin()));
    }

    #[test]
    fn test_grid_key_quantization() {
        assert_eq!(GridKey::quantize(&Point3D::new(3.9, -4.1, 0.9), 2.0), GridKey { x: 2, y: -2, z: 0 });
        assert_eq!(
            GridKey::quantize(&Point3D::new(4.0, 4.0, 4.0), 2.0),
            GridKey::quantize(&Point3D::new(4.0000001, 3.9999999, 4.0), 2.0)
        );
    }

    #[test]
    fn test_priority_ties_pop_in_insertion_order() {
        let mut heap = BinaryHeap::new();
        heap.push(PriorityNode { priority: OrderedFloat(5.0), index: 2 });
        heap.push(PriorityNode { priority: OrderedFloat(5.0), index: 1 });
        heap.push(PriorityNode { priority: OrderedFloat(7.0), index: 0 });
        heap.push(PriorityNode { priority: OrderedFloat(3.0), index: 3 });

        let order: Vec<usize> = std::iter::from_fn(|| heap.pop().map(|n| n.index)).collect();
        assert_eq!(order, vec![3, 1, 2, 0]);
    }

    #[test]
    fn test_a_star_obstacle_free_diagonal() {
        let scenario = PlanningScenario::new(Point3D::new(0.0, 0.0, 0.0), Point3D::new(10.0, 0.0, 10.0))
            .with_grid_step(2.0)
            .with_agent_radius(1.0)
            .with_max_iterations(100);

        let result = AStarPlanner::default().plan(&scenario).unwrap();
        assert_eq!(result.status, PlanStatus::Reached);
        assert_eq!(result.path.first(), Some(&scenario.start));
        assert_eq!(result.path.last(), Some(&scenario.goal));
        // Straight diagonal: never longer than the direct distance plus rounding
        assert!(result.path.total_length() <= scenario.start.distance(&scenario.goal) + 1e-6);
    }

    #[test]
    fn test_a_star_avoids_obstacle() {
        let obstacle = Obstacle::new(Point3D::new(10.0, 0.0, 0.0), 3.0);
        let scenario = PlanningScenario::new(Point3D::new(0.0, 0.0, 0.0), Point3D::new(20.0, 0.0, 0.0))
            .with_obstacles(vec![obstacle])
            .with_agent_radius(1.0);

        let result = AStarPlanner::default().plan(&scenario).unwrap();
        assert_eq!(result.status, PlanStatus::Reached);
        assert_eq!(result.path.last(), Some(&scenario.goal));
        // Every waypoint honours radius + agent radius + safety margin
        assert_clear_of(&result.path, &obstacle, 6.0);

        let model = CollisionModel::from_scenario(&scenario);
        for w in result.path.points.windows(2) {
            assert!(model.is_segment_clear(&w[0], &w[1]));
        }
    }

    #[test]
    fn test_a_star_start_inside_obstacle() {
        let scenario = PlanningScenario::new(Point3D::new(0.0, 0.0, 0.0), Point3D::new(20.0, 0.0, 0.0))
            .with_obstacles(vec![Obstacle::new(Point3D::new(0.0, 0.0, 0.0), 3.0)]);

        let result = AStarPlanner::default().plan(&scenario).unwrap();
        assert_eq!(result.status, PlanStatus::BlockedEndpoint);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.path.points, vec![scenario.start, scenario.goal]);
    }

    #[test]
    fn test_a_star_iteration_limit_falls_back_to_detour() {
        // A single expansion cannot get around the obstacle
        let scenario = PlanningScenario::new(Point3D::new(0.0, 0.0, 0.0), Point3D::new(40.0, 0.0, 0.0))
            .with_obstacles(vec![Obstacle::new(Point3D::new(20.0, 0.0, 0.0), 3.0)])
            .with_max_iterations(1);

        let result = AStarPlanner::default().plan(&scenario).unwrap();
        assert_eq!(result.iterations, 1);
        assert_eq!(result.status, PlanStatus::DetourFallback);
        assert_eq!(result.path.len(), 3);
        assert_eq!(result.path.points[1], Point3D::new(20.0, 0.0, 10.0));
    }

    #[test]
    fn test_a_star_iteration_limit_direct_fallback() {
        let scenario = PlanningScenario::new(Point3D::new(0.0, 0.0, 0.0), Point3D::new(40.0, 0.0, 0.0))
            .with_max_iterations(1);

        let result = AStarPlanner::default().plan(&scenario).unwrap();
        assert_eq!(result.status, PlanStatus::DirectFallback);
        assert_eq!(result.path.points, vec![scenario.start, scenario.goal]);
    }

    #[test]
    fn test_a_star_goal_inside_obstacle() {
        let scenario = PlanningScenario::new(Point3D::new(0.0, 0.0, 0.0), Point3D::new(20.0, 0.0, 0.0))
            .with_obstacles(vec![Obstacle::new(Point3D::new(21.0, 0.0, 0.0), 3.0)]);

        let result = AStarPlanner::default().plan(&scenario).unwrap();
        assert_eq!(result.status, PlanStatus::BlockedEndpoint);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.path.points, vec![scenario.start, scenario.goal]);
    }

    // Start below the vertical band: every neighbor is rejected and the
    // open set runs dry after expanding the start alone.
    fn below_band_scenario() -> PlanningScenario {
        PlanningScenario::new(Point3D::new(0.0, 0.0, -10.0), Point3D::new(40.0, 0.0, -10.0))
    }

    #[test]
    fn test_a_star_exhausted_open_set_direct_fallback() {
        let scenario = below_band_scenario();

        let result = AStarPlanner::default().plan(&scenario).unwrap();
        assert_eq!(result.iterations, 1);
        assert_eq!(result.status, PlanStatus::DirectFallback);
        assert_eq!(result.path.points, vec![scenario.start, scenario.goal]);
    }

    #[test]
    fn test_a_star_exhausted_open_set_detour_fallback() {
        let scenario = below_band_scenario()
            .with_obstacles(vec![Obstacle::new(Point3D::new(20.0, 0.0, -10.0), 3.0)]);

        let result = AStarPlanner::default().plan(&scenario).unwrap();
        assert_eq!(result.iterations, 1);
        assert_eq!(result.status, PlanStatus::DetourFallback);
        assert_eq!(
            result.path.points,
            vec![scenario.start, Point3D::new(20.0, 0.0, 0.0), scenario.goal]
        );
    }

    #[test]
    fn test_a_star_unverified_when_both_fallbacks_blocked() {
        // Second obstacle sits on the start-to-midpoint leg of the detour
        let scenario = below_band_scenario().with_obstacles(vec![
            Obstacle::new(Point3D::new(20.0, 0.0, -10.0), 3.0),
            Obstacle::new(Point3D::new(10.0, 0.0, -5.0), 2.0),
        ]);

        let result = AStarPlanner::default().plan(&scenario).unwrap();
        assert_eq!(result.status, PlanStatus::Unverified);
        assert!(result.status.is_fallback());
        assert_eq!(result.path.points, vec![scenario.start, scenario.goal]);
    }

    #[test]
    fn test_a_star_rejects_invalid_scenario() {
        let scenario = PlanningScenario::new(Point3D::origin(), Point3D::new(1.0, 0.0, 0.0))
            .with_grid_step(-1.0);
        let result = AStarPlanner::default().plan(&scenario);
        assert!(matches!(result, Err(PlannerError::InvalidParameter(_))));
    }
}
