use std::sync::{Arc, Mutex};

/// Ground-truth robot pose of the simulated world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimPose {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

/// Shared handle to the simulated pose. The motion service writes it, the
/// transform adapter reads it.
#[derive(Clone)]
pub struct SimWorld {
    pose: Arc<Mutex<SimPose>>,
}

impl SimWorld {
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self {
            pose: Arc::new(Mutex::new(SimPose { x, y, yaw })),
        }
    }

    pub fn pose(&self) -> SimPose {
        *self.pose.lock().unwrap()
    }

    pub fn set_pose(&self, pose: SimPose) {
        *self.pose.lock().unwrap() = pose;
    }
}
