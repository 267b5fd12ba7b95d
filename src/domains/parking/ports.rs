use crate::domains::parking::JobStatus;
use serde::{Deserialize, Serialize};

/// Port onto the job-status channel.
pub trait StatusSink: Send + Sync {
    fn publish(&self, status: &JobStatus);
}

/// Port onto the actuator command channel.
pub trait ActuatorPort: Send + Sync {
    fn send(&self, command: ArmCommand);
}

/// Opaque structured command for a target actuator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmCommand {
    pub joints: [f64; 4],
}

impl ArmCommand {
    /// Arm tucked into carrying position.
    pub fn carry() -> Self {
        Self {
            joints: [0.0, 0.3, 0.0, 2.5],
        }
    }

    /// Arm raised so the camera can scan ahead.
    pub fn scan() -> Self {
        Self {
            joints: [0.0, 0.3, 0.2, 2.0],
        }
    }
}
