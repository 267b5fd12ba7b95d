use crate::config::DetectionConfig;
use crate::domains::geometry::{is_within, Geometry, Vec2};
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkKind {
    /// The parking ring the task centers on.
    Ring,
    /// The secondary target approached after parking.
    Beacon,
}

/// One detection report from the external feed, in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkReport {
    pub kind: LandmarkKind,
    pub x: f64,
    pub y: f64,
}

/// A detection that passed its validity gate. At most one per kind per job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub discovered_at: DateTime<Utc>,
}

impl Landmark {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Drains the detection feed and applies the acceptance gates.
///
/// Ring reports are trusted only while the robot is within the ring validity
/// radius of the anchor; beacon reports only when the report lies within the
/// beacon validity radius of the robot, and only once the beacon phase has
/// armed the tracker. Everything else is discarded without being an error.
pub struct LandmarkTracker {
    reports: broadcast::Receiver<LandmarkReport>,
    config: DetectionConfig,
    ring: Option<Landmark>,
    beacon: Option<Landmark>,
    beacon_armed: bool,
}

impl LandmarkTracker {
    pub fn new(reports: broadcast::Receiver<LandmarkReport>, config: DetectionConfig) -> Self {
        Self {
            reports,
            config,
            ring: None,
            beacon: None,
            beacon_armed: false,
        }
    }

    pub fn ring(&self) -> Option<Landmark> {
        self.ring
    }

    pub fn beacon(&self) -> Option<Landmark> {
        self.beacon
    }

    /// Start trusting beacon reports, discarding anything seen before.
    pub fn arm_beacon(&mut self) {
        self.beacon = None;
        self.beacon_armed = true;
    }

    /// Drain every pending report, keeping the first of each kind that passes
    /// its gate.
    pub async fn poll(&mut self, geometry: &Geometry, anchor: Vec2) {
        loop {
            let report = match self.reports.try_recv() {
                Ok(report) => report,
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    debug!("detection feed lagged, {skipped} reports skipped");
                    continue;
                }
                Err(_) => return,
            };

            match report.kind {
                LandmarkKind::Ring => {
                    if self.ring.is_some() {
                        continue;
                    }
                    let robot = geometry.robot_world_position().await;
                    if !is_within(robot.xy(), anchor, self.config.ring_validity_radius) {
                        debug!(
                            "ring report at ({}, {}) discarded, robot too far from anchor",
                            report.x, report.y
                        );
                        continue;
                    }
                    info!("valid ring detected at (x: {}  y: {})", report.x, report.y);
                    self.ring = Some(self.accept(report));
                }
                LandmarkKind::Beacon => {
                    if !self.beacon_armed || self.beacon.is_some() {
                        continue;
                    }
                    let robot = geometry.robot_world_position().await;
                    let target = Vec2::new(report.x, report.y);
                    if !is_within(robot.xy(), target, self.config.beacon_validity_radius) {
                        debug!(
                            "beacon report at ({}, {}) discarded, too far from robot",
                            report.x, report.y
                        );
                        continue;
                    }
                    info!("valid beacon detected at (x: {}  y: {})", report.x, report.y);
                    self.beacon = Some(self.accept(report));
                }
            }
        }
    }

    fn accept(&self, report: LandmarkReport) -> Landmark {
        Landmark {
            x: report.x,
            y: report.y,
            discovered_at: Utc::now(),
        }
    }
}
