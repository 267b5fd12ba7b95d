use crate::domains::geometry::Vec2;
use serde::{Deserialize, Serialize};

/// A parking job as delivered on the intake channel. Immutable once accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingJob {
    pub job_id: String,
    pub position_x: f64,
    pub position_y: f64,
    pub position_z: f64,
    pub rotation: f64,
    /// Skip the parking phases entirely and only run the wave routine.
    pub only_wave: bool,
    /// Companion flag from the greeter task family. Carried on the wire but
    /// speech is an external concern, so it drives no phase here.
    pub engage_speaker: bool,
}

impl ParkingJob {
    /// The anchor point validity radii are measured from.
    pub fn anchor(&self) -> Vec2 {
        Vec2::new(self.position_x, self.position_y)
    }
}

/// Published on every state change and on the periodic timer tick.
///
/// The two free-form result slots are kept exactly as the upstream interface
/// defines them; the parking task itself never fills them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub job_id: String,
    pub acting: bool,
    pub result_string1: String,
    pub result_string2: String,
}

impl JobStatus {
    pub fn idle() -> Self {
        Self {
            job_id: String::new(),
            acting: false,
            result_string1: "nothing".to_string(),
            result_string2: "nothing".to_string(),
        }
    }
}
