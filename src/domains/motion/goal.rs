use serde::{Deserialize, Serialize};

/// One asynchronous motion request against the external motion service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MotionGoal {
    /// Navigate to a world-frame pose.
    Move { x: f64, y: f64, yaw: f64 },
    /// Rotate in place by a yaw delta (positive is counter-clockwise).
    Rotate { yaw: f64 },
    /// Drive straight ahead for a distance at a given speed.
    Drive { distance: f64, speed: f64 },
}

impl MotionGoal {
    pub fn kind(&self) -> GoalKind {
        match self {
            MotionGoal::Move { .. } => GoalKind::Move,
            MotionGoal::Rotate { .. } => GoalKind::Rotate,
            MotionGoal::Drive { .. } => GoalKind::Drive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoalKind {
    Move,
    Rotate,
    Drive,
}

/// Lifecycle of the most recently submitted goal. Transitions are monotonic
/// except Rejected -> Submitted (automatic resubmission) and
/// Accepted/ResultPending -> Canceling (cancellation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalState {
    Idle,
    Submitted,
    WaitingForServer,
    Accepted,
    Rejected,
    ResultPending,
    Completed,
    Canceling,
    Canceled,
}

/// Terminal status reported by the motion service for an accepted goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalOutcome {
    Succeeded,
    Canceled,
    Aborted,
}
