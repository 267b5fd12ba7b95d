use crate::config::{secs, Config};
use crate::domains::geometry::{is_within, squared_distance, Geometry, Vec2};
use crate::domains::markers::{ColorPreset, MarkerEmitter};
use crate::domains::motion::{wait_for_flag, MotionClient};
use crate::domains::parking::{ActuatorPort, ArmCommand, Landmark, LandmarkTracker, ParkingJob};
use std::sync::Arc;
use tokio::time::sleep;
use tracing::info;

/// The multi-phase parking sequencer. One instance per job, built fresh by the
/// dispatcher and consumed by `run`, so no job state outlives its worker.
///
/// Phases run strictly in order: approach the anchor, search for the ring,
/// center on it, search for the beacon, approach the beacon. Every external
/// hiccup inside a phase degrades to a logged retry; the only way out of `run`
/// is finishing.
pub struct ParkingTask {
    motion: MotionClient,
    geometry: Geometry,
    markers: MarkerEmitter,
    actuator: Arc<dyn ActuatorPort>,
    landmarks: LandmarkTracker,
    config: Arc<Config>,
}

impl ParkingTask {
    pub fn new(
        motion: MotionClient,
        geometry: Geometry,
        markers: MarkerEmitter,
        actuator: Arc<dyn ActuatorPort>,
        landmarks: LandmarkTracker,
        config: Arc<Config>,
    ) -> Self {
        Self {
            motion,
            geometry,
            markers,
            actuator,
            landmarks,
            config,
        }
    }

    pub async fn run(mut self, job: ParkingJob) {
        // Short breather before anything moves.
        sleep(secs(self.config.task.intake_pause_secs)).await;

        if job.only_wave {
            self.wave().await;
            return;
        }

        let anchor = job.anchor();
        self.actuator.send(ArmCommand::carry());

        // The first lookup doubles as waiting for the transform tree to come up.
        let _ = self.geometry.robot_world_position().await;

        info!("parking at (x: {}  y: {})", anchor.x, anchor.y);
        self.approach_anchor(anchor).await;
        let ring = self.search_ring(anchor).await;
        self.center_on_ring(ring).await;
        let beacon = self.search_beacon(anchor).await;
        self.approach_beacon(beacon).await;
        info!("parking task finished");
    }

    /// Navigate to the anchor, advancing early as soon as a ring is accepted
    /// or the robot is already close enough.
    async fn approach_anchor(&mut self, anchor: Vec2) {
        self.motion.submit_move(anchor.x, anchor.y, 0.0).await;
        self.actuator.send(ArmCommand::carry());
        self.markers.set_color(ColorPreset::PhaseDone);

        let arrived = self.motion.arrived();
        loop {
            if *arrived.borrow() {
                break;
            }
            info!("waiting until robot arrives at parking location");
            self.actuator.send(ArmCommand::carry());
            self.markers.emit(anchor.x, anchor.y);
            self.markers.emit_label(anchor.x - 0.1, anchor.y, 1, "parking_nav_goal");

            self.landmarks.poll(&self.geometry, anchor).await;
            let robot = self.geometry.robot_world_position().await;
            if self.landmarks.ring().is_some()
                || is_within(robot.xy(), anchor, self.config.task.anchor_radius)
            {
                self.motion.cancel_current().await;
                wait_for_flag(
                    self.motion.canceled(),
                    "waiting for goal to be canceled",
                    secs(self.config.motion.wait_log_secs),
                )
                .await;
                break;
            }
            sleep(secs(self.config.task.approach_poll_secs)).await;
        }

        info!("arrived at parking spot, beginning with parking");
        self.markers.emit_label(anchor.x - 0.1, anchor.y, 1, "parking_in_progress");
    }

    /// Spin and creep forward until a ring report passes its gate.
    async fn search_ring(&mut self, anchor: Vec2) -> Landmark {
        self.markers.set_color(ColorPreset::Searching);
        loop {
            self.landmarks.poll(&self.geometry, anchor).await;
            if let Some(ring) = self.landmarks.ring() {
                return ring;
            }

            info!("can not find parking ring, searching...");
            self.markers.emit_label(anchor.x - 0.1, anchor.y, 1, "searching_parking_ring");
            self.actuator.send(ArmCommand::carry());
            self.rotate(self.config.task.search_turn).await;
            self.drive(self.config.task.search_step).await;
            sleep(secs(self.config.task.search_pause_secs)).await;
        }
    }

    /// Iteratively face the ring and drive a damped fraction of the remaining
    /// distance, stopping early once inside the center radius.
    async fn center_on_ring(&mut self, ring: Landmark) {
        self.markers.set_color(ColorPreset::Centering);
        let angle = self.geometry.angle_to_world_position(ring.position()).await;
        self.rotate(-angle).await;

        for _ in 0..self.config.task.centering_iterations {
            info!("parking...");
            self.markers.emit(ring.x, ring.y);
            self.markers.emit_label(ring.x - 0.1, ring.y, 1, "parking_ring_center");

            let robot = self.geometry.robot_world_position().await;
            if is_within(robot.xy(), ring.position(), self.config.task.center_radius) {
                info!("close enough to center, stopping parking");
                break;
            }

            let angle = self.geometry.angle_to_world_position(ring.position()).await;
            self.rotate(-angle).await;
            let robot = self.geometry.robot_world_position().await;
            let remaining = squared_distance(robot.xy(), ring.position()).sqrt();
            self.drive(remaining * self.config.task.centering_damping).await;
        }

        info!("parking finished");
        self.markers.set_color(ColorPreset::PhaseDone);
        self.markers.emit_label(ring.x - 0.1, ring.y, 1, "parking_finished");
    }

    /// Rotate in place until a beacon report passes its gate. Detection range
    /// is short, so no forward steps are needed here.
    async fn search_beacon(&mut self, anchor: Vec2) -> Landmark {
        self.landmarks.arm_beacon();
        self.actuator.send(ArmCommand::scan());
        loop {
            self.landmarks.poll(&self.geometry, anchor).await;
            if let Some(beacon) = self.landmarks.beacon() {
                return beacon;
            }

            info!("searching for beacon...");
            self.markers.emit_label(anchor.x - 0.1, anchor.y, 1, "searching_beacon");
            self.actuator.send(ArmCommand::scan());
            self.rotate(self.config.task.beacon_search_turn).await;
        }
    }

    /// Close in on the beacon with proportional forward steps until inside the
    /// approach radius.
    async fn approach_beacon(&mut self, beacon: Landmark) {
        info!("rotating to beacon");
        let angle = self.geometry.angle_to_world_position(beacon.position()).await;
        self.rotate(-angle).await;

        loop {
            let robot = self.geometry.robot_world_position().await;
            if is_within(robot.xy(), beacon.position(), self.config.task.beacon_radius) {
                break;
            }
            self.actuator.send(ArmCommand::scan());
            info!("moving to beacon");
            let distance = squared_distance(robot.xy(), beacon.position()).sqrt();
            self.drive(distance * self.config.task.beacon_approach_factor).await;
            let angle = self.geometry.angle_to_world_position(beacon.position()).await;
            self.rotate(-angle).await;
        }
    }

    /// Wave-only short-circuit: alternate the two arm poses a fixed number of
    /// times instead of parking.
    async fn wave(&self) {
        for _ in 0..self.config.task.wave_repetitions {
            info!("waving");
            self.actuator.send(ArmCommand::carry());
            sleep(secs(self.config.task.wave_pause_secs)).await;
            self.actuator.send(ArmCommand::scan());
            sleep(secs(self.config.task.wave_pause_secs)).await;
        }
    }

    async fn rotate(&self, yaw: f64) {
        self.motion.submit_rotate(yaw).await;
        wait_for_flag(
            self.motion.rotation_complete(),
            "rotating",
            secs(self.config.motion.wait_log_secs),
        )
        .await;
    }

    async fn drive(&self, distance: f64) {
        self.motion
            .submit_drive(distance, self.config.motion.drive_speed)
            .await;
        wait_for_flag(
            self.motion.drive_complete(),
            "moving forward",
            secs(self.config.motion.wait_log_secs),
        )
        .await;
    }
}
