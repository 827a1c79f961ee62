// Collision model for spherical obstacles
// Shared by the grid and tree planners.

use crate::common::{Obstacle, PlanningScenario, Point3D};

/// Extra distance kept between the agent and any obstacle surface
pub const DEFAULT_SAFETY_MARGIN: f64 = 2.0;
/// Maximum spacing between two samples of a checked segment
pub const DEFAULT_COLLISION_RESOLUTION: f64 = 2.0;
/// Segments needing more samples than this are reported as blocked
pub const MAX_SEGMENT_SAMPLES: usize = 1_000_000;

#[derive(Debug, Clone)]
pub struct CollisionModel {
    obstacles: Vec<Obstacle>,
    agent_radius: f64,
    safety_margin: f64,
    resolution: f64,
}

impl CollisionModel {
    pub fn new(obstacles: Vec<Obstacle>, agent_radius: f64) -> Self {
        CollisionModel {
            obstacles,
            agent_radius,
            safety_margin: DEFAULT_SAFETY_MARGIN,
            resolution: DEFAULT_COLLISION_RESOLUTION,
        }
    }

    pub fn from_scenario(scenario: &PlanningScenario) -> Self {
        Self::new(scenario.obstacles.clone(), scenario.agent_radius)
    }

    pub fn with_safety_margin(mut self, safety_margin: f64) -> Self {
        self.safety_margin = safety_margin;
        self
    }

    /// Non-positive resolutions fall back to the default spacing
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = if resolution > 0.0 {
            resolution
        } else {
            DEFAULT_COLLISION_RESOLUTION
        };
        self
    }

    /// Minimum distance the agent center must keep from `obstacle`'s center
    pub fn clearance(&self, obstacle: &Obstacle) -> f64 {
        obstacle.radius + self.agent_radius + self.safety_margin
    }

    pub fn is_point_clear(&self, p: &Point3D) -> bool {
        self.obstacles
            .iter()
            .all(|obs| obs.position.distance(p) > self.clearance(obs))
    }

    /// Samples the segment at least once per `resolution` units, endpoints included.
    ///
    /// Segments that cannot be sampled within `MAX_SEGMENT_SAMPLES` are not clear.
    pub fn is_segment_clear(&self, from: &Point3D, to: &Point3D) -> bool {
        let length = from.distance(to);
        if length < f64::EPSILON {
            return self.is_point_clear(from);
        }

        let n_samples = (length / self.resolution).ceil().max(1.0);
        if !(n_samples <= MAX_SEGMENT_SAMPLES as f64) {
            return false;
        }
        let n_samples = n_samples as usize;
        (0..=n_samples).all(|i| {
            let t = i as f64 / n_samples as f64;
            self.is_point_clear(&from.lerp(to, t))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_obstacle_model() -> CollisionModel {
        CollisionModel::new(vec![Obstacle::new(Point3D::new(10.0, 0.0, 0.0), 3.0)], 1.0)
    }

    #[test]
    fn test_point_clearance_includes_margin() {
        let model = single_obstacle_model();
        let obs = Obstacle::new(Point3D::new(10.0, 0.0, 0.0), 3.0);
        assert!((model.clearance(&obs) - 6.0).abs() < 1e-12);

        // 5 units away: outside radius + agent but inside the safety margin
        assert!(!model.is_point_clear(&Point3D::new(15.0, 0.0, 0.0)));
        assert!(model.is_point_clear(&Point3D::new(16.5, 0.0, 0.0)));
    }

    #[test]
    fn test_segment_through_obstacle_is_blocked() {
        let model = single_obstacle_model();
        let a = Point3D::new(0.0, 0.0, 0.0);
        let b = Point3D::new(20.0, 0.0, 0.0);
        assert!(model.is_point_clear(&a));
        assert!(model.is_point_clear(&b));
        assert!(!model.is_segment_clear(&a, &b));
    }

    #[test]
    fn test_segment_passing_beside_obstacle_is_clear() {
        let model = single_obstacle_model();
        let a = Point3D::new(0.0, 8.0, 0.0);
        let b = Point3D::new(20.0, 8.0, 0.0);
        assert!(model.is_segment_clear(&a, &b));
    }

    #[test]
    fn test_long_segment_does_not_tunnel() {
        // Thin obstacle in the middle of a long segment
        let model = CollisionModel::new(vec![Obstacle::new(Point3D::new(500.0, 0.0, 0.0), 0.1)], 0.0)
            .with_safety_margin(0.5);
        let a = Point3D::new(0.0, 0.0, 0.0);
        let b = Point3D::new(1000.0, 0.0, 0.0);
        assert!(!model.is_segment_clear(&a, &b));
    }

    #[test]
    fn test_zero_length_segment() {
        let model = single_obstacle_model();
        let p = Point3D::new(0.0, 0.0, 0.0);
        assert!(model.is_segment_clear(&p, &p));
        let inside = Point3D::new(10.0, 0.0, 0.0);
        assert!(!model.is_segment_clear(&inside, &inside));
    }

    #[test]
    fn test_unsamplable_segment_is_blocked() {
        let model = CollisionModel::new(Vec::new(), 0.0);
        let a = Point3D::new(-1e300, 0.0, 0.0);
        let b = Point3D::new(1e300, 0.0, 0.0);
        assert!(!model.is_segment_clear(&a, &b));

        let c = Point3D::new(2.0 * MAX_SEGMENT_SAMPLES as f64, 0.0, 0.0);
        assert!(model.is_segment_clear(&Point3D::origin(), &c));
    }

    #[test]
    fn test_empty_world_is_clear() {
        let model = CollisionModel::new(Vec::new(), 1.0);
        assert!(model.is_segment_clear(&Point3D::origin(), &Point3D::new(3.0, 4.0, 5.0)));
    }
}
