use crate::common::DomainResult;
use crate::domains::geometry::{RobotPoint, WorldPoint};
use async_trait::async_trait;
use std::time::Duration;

/// Port onto the external coordinate-frame transform service: express a
/// robot-frame point in the world frame at the current time, waiting at most
/// `budget` for the transform to become available, or fail the lookup.
#[async_trait]
pub trait FrameTransform: Send + Sync {
    async fn robot_to_world(&self, point: RobotPoint, budget: Duration) -> DomainResult<WorldPoint>;
}
