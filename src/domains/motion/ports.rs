use crate::common::DomainResult;
use crate::domains::motion::{GoalOutcome, MotionGoal};
use async_trait::async_trait;
use std::time::Duration;

/// Port onto the external motion-execution service, consumed only through its
/// submit / accept-or-reject / result / cancel contract.
#[async_trait]
pub trait MotionService: Send + Sync {
    /// Probe whether the action server answers within `timeout`.
    async fn server_available(&self, timeout: Duration) -> bool;

    /// Submit a goal and await the accept/reject decision. An `Err` means the
    /// server could not be reached at all.
    async fn submit(&self, goal: MotionGoal) -> DomainResult<GoalResponse>;
}

pub enum GoalResponse {
    Rejected,
    Accepted(Box<dyn GoalHandle>),
}

/// Handle to an accepted, in-flight goal.
#[async_trait]
pub trait GoalHandle: Send {
    /// Await the terminal result. A canceled goal also ends here, so this
    /// resolves either way.
    async fn result(&mut self) -> GoalOutcome;

    /// Ask the server to cancel the goal; resolves once the server confirms.
    /// Best-effort: the goal may still complete before the request lands.
    async fn cancel(&mut self);
}
