// Plan a scenario from a TOML request file and print a summary
//
// Usage: plan_scenario [request.toml]
// Without an argument a built-in single-obstacle scenario is planned
// with both algorithms.

use std::env;
use std::process;

use spatial_planner::{
    Algorithm, MotionPlanner, Obstacle, PlanOutcome, PlanRequest, PlannerConfig, PlanningScenario,
    Point3D,
};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn demo_request(algorithm: Algorithm) -> PlanRequest {
    let scenario = PlanningScenario::new(Point3D::new(0.0, 0.0, 0.0), Point3D::new(20.0, 0.0, 0.0))
        .with_obstacles(vec![Obstacle::new(Point3D::new(10.0, 0.0, 0.0), 3.0)])
        .with_agent_radius(1.0);

    PlanRequest {
        scenario,
        algorithm,
        speed: Some(5.0),
        planner: PlannerConfig { seed: Some(0), ..Default::default() },
    }
}

fn print_outcome(algorithm: Algorithm, outcome: &PlanOutcome) {
    println!("[{}] status: {:?}", algorithm, outcome.raw.status);
    println!("[{}] raw path: {} points, length {:.3}",
        algorithm, outcome.raw.path.len(), outcome.raw.path.total_length());
    for p in &outcome.raw.path.points {
        println!("    ({:.3}, {:.3}, {:.3})", p.x, p.y, p.z);
    }
    println!("[{}] smoothed path: {} points, length {:.3}",
        algorithm, outcome.smoothed.len(), outcome.smoothed.total_length());
    if let Some(traj) = &outcome.trajectory {
        println!("[{}] trajectory: {} samples over {:.3} s", algorithm, traj.len(), traj.duration());
    }
}

fn run(request: &PlanRequest) -> Result<(), spatial_planner::PlannerError> {
    let planner = MotionPlanner::new(request.planner.clone())?;
    let outcome = planner.run(&request.scenario, request.algorithm, request.speed)?;
    print_outcome(request.algorithm, &outcome);
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let requests = match env::args().nth(1) {
        Some(path) => match PlanRequest::from_file(&path) {
            Ok(request) => vec![request],
            Err(e) => {
                error!("failed to load {}: {}", path, e);
                process::exit(1);
            }
        },
        None => vec![demo_request(Algorithm::Grid), demo_request(Algorithm::Tree)],
    };

    for request in &requests {
        if let Err(e) = run(request) {
            error!("planning failed: {}", e);
            process::exit(1);
        }
    }
}
