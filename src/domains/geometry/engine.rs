use crate::domains::geometry::{FrameTransform, RobotPoint, RobotPose, Vec2, WorldPoint};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

/// Unsigned angle between two vectors in the horizontal plane, via the clamped
/// arccos of the dot product of their unit vectors. Degenerate zero-length
/// input yields 0.
pub fn angle_between(a: Vec2, b: Vec2) -> f64 {
    let na = a.norm();
    let nb = b.norm();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    let cos = (a.dot(b) / (na * nb)).clamp(-1.0, 1.0);
    cos.acos()
}

pub fn squared_distance(a: Vec2, b: Vec2) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Strict distance gate: true iff the squared distance is strictly below
/// `radius` squared, so a point exactly on the boundary is outside.
pub fn is_within(a: Vec2, b: Vec2, radius: f64) -> bool {
    squared_distance(a, b) < radius * radius
}

/// Frame-relative geometry queries backed by the external transform service.
///
/// A failed lookup is retried forever with a fixed delay: the transform tree
/// going away is treated as a transient outage, never as a task failure. The
/// loops are async, so a caller that drops the future (shutdown token at the
/// worker layer) interrupts them cleanly.
pub struct Geometry {
    transform: Arc<dyn FrameTransform>,
    lookup_budget: Duration,
    retry_delay: Duration,
}

impl Geometry {
    pub fn new(
        transform: Arc<dyn FrameTransform>,
        lookup_budget: Duration,
        retry_delay: Duration,
    ) -> Self {
        Self {
            transform,
            lookup_budget,
            retry_delay,
        }
    }

    /// The robot-frame origin expressed in world coordinates.
    pub async fn robot_world_position(&self) -> WorldPoint {
        self.robot_to_world_safe(RobotPoint::ORIGIN).await
    }

    /// Full pose, with yaw derived from the forward probe.
    pub async fn robot_world_pose(&self) -> RobotPose {
        let origin = self.robot_to_world_safe(RobotPoint::ORIGIN).await;
        let forward = self.robot_to_world_safe(RobotPoint::new(1.0, 0.0)).await;
        RobotPose {
            x: origin.x,
            y: origin.y,
            yaw: (forward.y - origin.y).atan2(forward.x - origin.x),
        }
    }

    /// Signed angle between the robot's heading and the vector to `target`.
    ///
    /// The arccos formula alone cannot tell left from right, so the sign is
    /// resolved by mapping robot-frame (0, 1) and (0, -1) into the world and
    /// comparing which probe sits closer to the target: closer to the left
    /// probe means the angle is negated.
    pub async fn angle_to_world_position(&self, target: Vec2) -> f64 {
        let origin = self.robot_to_world_safe(RobotPoint::ORIGIN).await;
        let forward = self.robot_to_world_safe(RobotPoint::new(1.0, 0.0)).await;

        let heading = Vec2::new(forward.x - origin.x, forward.y - origin.y);
        let to_target = Vec2::new(target.x - origin.x, target.y - origin.y);
        let angle = angle_between(heading, to_target);

        let left = self.robot_to_world_safe(RobotPoint::new(0.0, 1.0)).await;
        let right = self.robot_to_world_safe(RobotPoint::new(0.0, -1.0)).await;

        if squared_distance(left.xy(), target) < squared_distance(right.xy(), target) {
            -angle
        } else {
            angle
        }
    }

    async fn robot_to_world_safe(&self, point: RobotPoint) -> WorldPoint {
        loop {
            match self
                .transform
                .robot_to_world(point, self.lookup_budget)
                .await
            {
                Ok(world) => return world,
                Err(e) => {
                    info!("could not get transform, trying again: {e}");
                    sleep(self.retry_delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_between_parallel_vectors_is_zero() {
        let angle = angle_between(Vec2::new(1.0, 0.0), Vec2::new(2.5, 0.0));
        assert!(angle.abs() < 1e-9);
    }

    #[test]
    fn angle_between_opposite_vectors_is_pi() {
        let angle = angle_between(Vec2::new(1.0, 0.0), Vec2::new(-3.0, 0.0));
        assert!((angle - std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn angle_between_zero_vector_is_zero() {
        assert_eq!(angle_between(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0)), 0.0);
    }

    #[test]
    fn is_within_is_strict_at_the_boundary() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 4.0);
        assert!(is_within(a, b, 5.1));
        assert!(!is_within(a, b, 5.0));
        assert!(!is_within(a, b, 4.9));
    }

    #[test]
    fn squared_distance_matches_hand_computation() {
        let d = squared_distance(Vec2::new(1.0, 2.0), Vec2::new(4.0, 6.0));
        assert!((d - 25.0).abs() < 1e-12);
    }
}
