use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub frames: FrameConfig,
    pub motion: MotionConfig,
    pub task: TaskConfig,
    pub detection: DetectionConfig,
    pub markers: MarkerConfig,
    pub status: StatusConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameConfig {
    pub world_frame: String,
    pub robot_frame: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Timeout of a single reachability probe against the motion service.
    pub server_probe_secs: f64,
    /// Budget handed to a single transform lookup.
    pub transform_budget_secs: f64,
    /// Delay between retries of a failed transform lookup.
    pub transform_retry_secs: f64,
    /// How long a phase loop sleeps between "still waiting" log lines.
    pub wait_log_secs: f64,
    pub drive_speed: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Breather taken before a job starts moving anything.
    pub intake_pause_secs: f64,
    /// Poll interval of the anchor-approach loop.
    pub approach_poll_secs: f64,
    /// Robot-to-anchor distance that counts as arrived.
    pub anchor_radius: f64,
    /// Full-turn rotation issued while searching for the ring.
    pub search_turn: f64,
    /// Forward step between search rotations.
    pub search_step: f64,
    pub search_pause_secs: f64,
    /// Robot-to-ring distance that ends centering.
    pub center_radius: f64,
    pub centering_iterations: u32,
    /// Fraction of the remaining distance driven per centering iteration.
    pub centering_damping: f64,
    /// Rotation step while scanning for the beacon.
    pub beacon_search_turn: f64,
    /// Robot-to-beacon distance that completes the approach.
    pub beacon_radius: f64,
    /// Fraction of the remaining distance driven per beacon-approach iteration.
    pub beacon_approach_factor: f64,
    pub wave_repetitions: u32,
    pub wave_pause_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// A ring report is only trusted while the robot is this close to the anchor.
    pub ring_validity_radius: f64,
    /// A beacon report is only trusted this close to the robot.
    pub beacon_validity_radius: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerConfig {
    pub lifetime_secs: f64,
    pub default_scale: f64,
    pub label_scale: f64,
    /// Height above the floor at which markers are drawn.
    pub height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Period of the unconditional status republish.
    pub publish_period_secs: f64,
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frames: FrameConfig {
                world_frame: "map".to_string(),
                robot_frame: "base_link".to_string(),
            },
            motion: MotionConfig {
                server_probe_secs: 1.0,
                transform_budget_secs: 0.1,
                transform_retry_secs: 1.0,
                wait_log_secs: 1.0,
                drive_speed: 0.5,
            },
            task: TaskConfig {
                intake_pause_secs: 1.0,
                approach_poll_secs: 0.2,
                anchor_radius: 0.4,
                search_turn: 6.3,
                search_step: 0.1,
                search_pause_secs: 1.0,
                center_radius: 0.05,
                centering_iterations: 5,
                centering_damping: 0.3,
                beacon_search_turn: 1.0,
                beacon_radius: 0.5,
                beacon_approach_factor: 0.2,
                wave_repetitions: 30,
                wave_pause_secs: 2.0,
            },
            detection: DetectionConfig {
                ring_validity_radius: 1.0,
                beacon_validity_radius: 2.0,
            },
            markers: MarkerConfig {
                lifetime_secs: 2.0,
                default_scale: 0.1,
                label_scale: 0.15,
                height: 1.0,
            },
            status: StatusConfig {
                publish_period_secs: 1.0,
            },
        }
    }
}

pub(crate) fn secs(value: f64) -> Duration {
    Duration::from_secs_f64(value)
}
