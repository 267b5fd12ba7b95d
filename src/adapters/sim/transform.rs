use crate::adapters::sim::SimWorld;
use crate::common::{DomainError, DomainResult};
use crate::domains::geometry::{FrameTransform, RobotPoint, WorldPoint};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// Frame transform backed by the simulated ground-truth pose. Can be told to
/// fail its first lookups to exercise the retry-forever policy.
pub struct SimTransform {
    world: SimWorld,
    fail_next: Mutex<u32>,
}

impl SimTransform {
    pub fn new(world: SimWorld) -> Self {
        Self {
            world,
            fail_next: Mutex::new(0),
        }
    }

    pub fn fail_next(&self, count: u32) {
        *self.fail_next.lock().unwrap() = count;
    }
}

#[async_trait]
impl FrameTransform for SimTransform {
    async fn robot_to_world(&self, point: RobotPoint, _budget: Duration) -> DomainResult<WorldPoint> {
        {
            let mut remaining = self.fail_next.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(DomainError::TransformLookup {
                    reason: "transform not yet available".to_string(),
                });
            }
        }

        let pose = self.world.pose();
        let (sin, cos) = pose.yaw.sin_cos();
        Ok(WorldPoint::new(
            pose.x + cos * point.x - sin * point.y,
            pose.y + sin * point.x + cos * point.y,
            point.z,
        ))
    }
}
