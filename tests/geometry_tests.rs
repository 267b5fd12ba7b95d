use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::Arc;
use std::time::Duration;

use valet_app::adapters::sim::{SimPose, SimTransform, SimWorld};
use valet_app::domains::geometry::{Geometry, Vec2};

fn geometry_at(x: f64, y: f64, yaw: f64) -> (Geometry, SimWorld, Arc<SimTransform>) {
    let world = SimWorld::new(x, y, yaw);
    let transform = Arc::new(SimTransform::new(world.clone()));
    let geometry = Geometry::new(
        transform.clone(),
        Duration::from_millis(10),
        Duration::from_millis(5),
    );
    (geometry, world, transform)
}

#[tokio::test]
async fn angle_to_target_straight_ahead_is_zero() {
    let (geometry, _, _) = geometry_at(0.0, 0.0, 0.0);
    let angle = geometry.angle_to_world_position(Vec2::new(2.0, 0.0)).await;
    assert!(angle.abs() < 1e-9, "got {angle}");
}

#[tokio::test]
async fn angle_to_target_directly_behind_is_pi() {
    let (geometry, _, _) = geometry_at(0.0, 0.0, 0.0);
    let angle = geometry.angle_to_world_position(Vec2::new(-3.0, 0.0)).await;
    assert!((angle.abs() - PI).abs() < 1e-9, "got {angle}");
}

#[tokio::test]
async fn target_on_the_left_gives_negative_angle() {
    let (geometry, _, _) = geometry_at(0.0, 0.0, 0.0);
    let angle = geometry.angle_to_world_position(Vec2::new(0.0, 1.0)).await;
    assert!((angle + FRAC_PI_2).abs() < 1e-9, "got {angle}");
}

#[tokio::test]
async fn mirrored_target_flips_the_sign() {
    let (geometry, _, _) = geometry_at(0.0, 0.0, 0.0);
    let left = geometry.angle_to_world_position(Vec2::new(0.0, 1.0)).await;
    let right = geometry.angle_to_world_position(Vec2::new(0.0, -1.0)).await;
    assert!((left + right).abs() < 1e-9, "left {left}, right {right}");
    assert!(left < 0.0);
    assert!(right > 0.0);
}

#[tokio::test]
async fn sign_convention_holds_under_rotation() {
    // Robot at (1, 1) facing +y; a target at (0, 1) is to its left.
    let (geometry, _, _) = geometry_at(1.0, 1.0, FRAC_PI_2);
    let angle = geometry.angle_to_world_position(Vec2::new(0.0, 1.0)).await;
    assert!((angle + FRAC_PI_2).abs() < 1e-9, "got {angle}");
}

#[tokio::test]
async fn robot_world_pose_reports_position_and_yaw() {
    let (geometry, _, _) = geometry_at(2.0, -1.0, 0.7);
    let pose = geometry.robot_world_pose().await;
    assert!((pose.x - 2.0).abs() < 1e-9);
    assert!((pose.y + 1.0).abs() < 1e-9);
    assert!((pose.yaw - 0.7).abs() < 1e-9);
}

#[tokio::test]
async fn position_lookup_retries_through_transform_outages() {
    let (geometry, _, transform) = geometry_at(0.5, 0.25, 0.0);
    transform.fail_next(3);

    let position = tokio::time::timeout(
        Duration::from_secs(5),
        geometry.robot_world_position(),
    )
    .await
    .expect("lookup should recover once the transform is back");

    assert!((position.x - 0.5).abs() < 1e-9);
    assert!((position.y - 0.25).abs() < 1e-9);
}

#[tokio::test]
async fn pose_is_fetched_fresh_on_every_call() {
    let (geometry, world, _) = geometry_at(0.0, 0.0, 0.0);
    let first = geometry.robot_world_position().await;
    world.set_pose(SimPose {
        x: 4.0,
        y: 2.0,
        yaw: 0.0,
    });
    let second = geometry.robot_world_position().await;
    assert!((first.x).abs() < 1e-9);
    assert!((second.x - 4.0).abs() < 1e-9);
    assert!((second.y - 2.0).abs() < 1e-9);
}
