use crate::adapters::sim::{SimPose, SimWorld};
use crate::common::{DomainError, DomainResult};
use crate::domains::motion::{GoalHandle, GoalOutcome, GoalResponse, MotionGoal, MotionService};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

const EXECUTION_STEPS: u32 = 10;

/// Simulated motion service: every accepted goal moves the shared pose toward
/// its target in small timed steps, so goals take observable time, can be
/// observed mid-flight through the transform adapter, and can be canceled
/// part-way.
pub struct SimMotionService {
    world: SimWorld,
    step_delay: Duration,
    fail_next: Mutex<u32>,
    reject_next: Mutex<u32>,
    submissions: Mutex<Vec<MotionGoal>>,
}

impl SimMotionService {
    pub fn new(world: SimWorld) -> Self {
        Self {
            world,
            step_delay: Duration::from_millis(2),
            fail_next: Mutex::new(0),
            reject_next: Mutex::new(0),
            submissions: Mutex::new(Vec::new()),
        }
    }

    /// Fail the next `count` submissions outright, as an unreachable server.
    pub fn fail_next(&self, count: u32) {
        *self.fail_next.lock().unwrap() = count;
    }

    /// Reject the next `count` submissions before accepting again.
    pub fn reject_next(&self, count: u32) {
        *self.reject_next.lock().unwrap() = count;
    }

    /// Every goal ever submitted, rejected ones included.
    pub fn submissions(&self) -> Vec<MotionGoal> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl MotionService for SimMotionService {
    async fn server_available(&self, _timeout: Duration) -> bool {
        true
    }

    async fn submit(&self, goal: MotionGoal) -> DomainResult<GoalResponse> {
        self.submissions.lock().unwrap().push(goal.clone());

        {
            let mut remaining = self.fail_next.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(DomainError::ServiceUnavailable {
                    service: "sim motion".to_string(),
                });
            }
        }

        {
            let mut remaining = self.reject_next.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Ok(GoalResponse::Rejected);
            }
        }

        Ok(GoalResponse::Accepted(Box::new(SimGoalHandle {
            world: self.world.clone(),
            goal,
            step_delay: self.step_delay,
            cancel_requested: Arc::new(AtomicBool::new(false)),
        })))
    }
}

struct SimGoalHandle {
    world: SimWorld,
    goal: MotionGoal,
    step_delay: Duration,
    cancel_requested: Arc<AtomicBool>,
}

#[async_trait]
impl GoalHandle for SimGoalHandle {
    async fn result(&mut self) -> GoalOutcome {
        let start = self.world.pose();
        let target = target_pose(&self.goal, start);

        for step in 1..=EXECUTION_STEPS {
            sleep(self.step_delay).await;
            if self.cancel_requested.load(Ordering::SeqCst) {
                return GoalOutcome::Canceled;
            }
            let t = f64::from(step) / f64::from(EXECUTION_STEPS);
            self.world.set_pose(SimPose {
                x: start.x + (target.x - start.x) * t,
                y: start.y + (target.y - start.y) * t,
                yaw: start.yaw + (target.yaw - start.yaw) * t,
            });
        }
        GoalOutcome::Succeeded
    }

    async fn cancel(&mut self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }
}

fn target_pose(goal: &MotionGoal, start: SimPose) -> SimPose {
    match *goal {
        MotionGoal::Move { x, y, yaw } => SimPose { x, y, yaw },
        MotionGoal::Rotate { yaw } => SimPose {
            x: start.x,
            y: start.y,
            yaw: start.yaw + yaw,
        },
        MotionGoal::Drive { distance, .. } => SimPose {
            x: start.x + distance * start.yaw.cos(),
            y: start.y + distance * start.yaw.sin(),
            yaw: start.yaw,
        },
    }
}
