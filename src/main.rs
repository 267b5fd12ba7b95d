use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use valet_app::adapters::outbound::{ConsoleActuator, ConsoleMarkerSink, ConsoleStatusSink};
use valet_app::adapters::sim::{SimMotionService, SimTransform, SimWorld};
use valet_app::application::{JobDispatcher, TaskDeps};
use valet_app::domains::geometry::{is_within, Vec2};
use valet_app::domains::parking::{LandmarkKind, LandmarkReport, ParkingJob};
use valet_app::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Valet App");

    let config = match Config::from_file("config.toml").await {
        Ok(config) => config,
        Err(e) => {
            info!("no config file loaded ({e}), using defaults");
            Config::default()
        }
    };
    let config = Arc::new(config);

    // Simulated external world so the binary runs a full parking demonstration
    // without the real motion and transform services.
    let world = SimWorld::new(0.0, 0.0, 0.0);
    let (detections, _) = tokio::sync::broadcast::channel(16);

    let deps = TaskDeps {
        motion: Arc::new(SimMotionService::new(world.clone())),
        transform: Arc::new(SimTransform::new(world.clone())),
        markers: Arc::new(ConsoleMarkerSink),
        actuator: Arc::new(ConsoleActuator),
        detections: detections.clone(),
    };

    let dispatcher = JobDispatcher::new(deps, Arc::new(ConsoleStatusSink), Arc::clone(&config));
    dispatcher.spawn_status_timer();

    let anchor = Vec2::new(2.5, -1.5);

    // Simulated detector: report the ring and the beacon once the robot is in
    // range, like the perception stack would.
    {
        let world = world.clone();
        let detections = detections.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(200)).await;
                let pose = world.pose();
                let robot = Vec2::new(pose.x, pose.y);
                if is_within(robot, anchor, 1.5) {
                    let _ = detections.send(LandmarkReport {
                        kind: LandmarkKind::Ring,
                        x: anchor.x + 0.3,
                        y: anchor.y + 0.2,
                    });
                    let _ = detections.send(LandmarkReport {
                        kind: LandmarkKind::Beacon,
                        x: anchor.x + 0.8,
                        y: anchor.y,
                    });
                }
            }
        });
    }

    dispatcher.on_job(ParkingJob {
        job_id: "demo-job".to_string(),
        position_x: anchor.x,
        position_y: anchor.y,
        position_z: 0.0,
        rotation: 0.0,
        only_wave: false,
        engage_speaker: false,
    });

    info!("Valet App started successfully");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down Valet App");
    dispatcher.shutdown();

    Ok(())
}
