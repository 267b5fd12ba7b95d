use crate::domains::motion::{GoalKind, GoalResponse, GoalState, MotionGoal, MotionService};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::sleep;
use tracing::info;
use uuid::Uuid;

/// Wrapper around the motion service that owns the per-goal completion flags.
///
/// Submission blocks only until the server answers a reachability probe and
/// the goal is handed to a driver task; from there the driver resubmits on
/// rejection (identical goal, indefinitely, by policy) and flips the kind's
/// completion flag once the eventually-accepted attempt reports its result.
/// Callbacks from the service only ever resolve futures the driver awaits, so
/// the event side never blocks.
pub struct MotionClient {
    service: Arc<dyn MotionService>,
    probe_timeout: Duration,
    flags: Arc<GoalFlags>,
    active: Arc<Mutex<Option<ActiveGoal>>>,
}

struct ActiveGoal {
    id: Uuid,
    cancel: mpsc::Sender<()>,
}

struct GoalFlags {
    arrived: watch::Sender<bool>,
    rotation_complete: watch::Sender<bool>,
    drive_complete: watch::Sender<bool>,
    canceled: watch::Sender<bool>,
    state: watch::Sender<GoalState>,
}

impl GoalFlags {
    fn new() -> Self {
        Self {
            arrived: watch::channel(false).0,
            rotation_complete: watch::channel(false).0,
            drive_complete: watch::channel(false).0,
            canceled: watch::channel(false).0,
            state: watch::channel(GoalState::Idle).0,
        }
    }

    fn completion_flag(&self, kind: GoalKind) -> &watch::Sender<bool> {
        match kind {
            GoalKind::Move => &self.arrived,
            GoalKind::Rotate => &self.rotation_complete,
            GoalKind::Drive => &self.drive_complete,
        }
    }
}

impl MotionClient {
    pub fn new(service: Arc<dyn MotionService>, probe_timeout: Duration) -> Self {
        Self {
            service,
            probe_timeout,
            flags: Arc::new(GoalFlags::new()),
            active: Arc::new(Mutex::new(None)),
        }
    }

    pub fn arrived(&self) -> watch::Receiver<bool> {
        self.flags.arrived.subscribe()
    }

    pub fn rotation_complete(&self) -> watch::Receiver<bool> {
        self.flags.rotation_complete.subscribe()
    }

    pub fn drive_complete(&self) -> watch::Receiver<bool> {
        self.flags.drive_complete.subscribe()
    }

    pub fn canceled(&self) -> watch::Receiver<bool> {
        self.flags.canceled.subscribe()
    }

    pub fn goal_state(&self) -> watch::Receiver<GoalState> {
        self.flags.state.subscribe()
    }

    pub async fn submit_move(&self, x: f64, y: f64, yaw: f64) {
        info!("navigating to goal (x: {x}  y: {y}  yaw: {yaw})");
        self.submit(MotionGoal::Move { x, y, yaw }).await;
    }

    pub async fn submit_rotate(&self, yaw: f64) {
        info!("spinning by {yaw} rad");
        self.submit(MotionGoal::Rotate { yaw }).await;
    }

    pub async fn submit_drive(&self, distance: f64, speed: f64) {
        info!("driving forward {distance}");
        self.submit(MotionGoal::Drive { distance, speed }).await;
    }

    /// Request cancellation of the outstanding goal, if any. The `canceled`
    /// flag turns true only once the service confirms; with nothing
    /// outstanding it turns true immediately.
    pub async fn cancel_current(&self) {
        self.flags.canceled.send_replace(false);
        info!("canceling current goal");
        // The slot lock is held across the send so the driver, which drains
        // the cancel channel under the same lock before exiting, can never
        // miss a request that raced its result.
        let mut active = self.active.lock().await;
        match active.take() {
            Some(goal) => {
                if goal.cancel.send(()).await.is_err() {
                    // Driver already reached a terminal state on its own.
                    self.flags.canceled.send_replace(true);
                }
            }
            None => {
                self.flags.canceled.send_replace(true);
            }
        }
    }

    async fn submit(&self, goal: MotionGoal) {
        let flags = Arc::clone(&self.flags);
        flags.completion_flag(goal.kind()).send_replace(false);
        flags.state.send_replace(GoalState::Submitted);

        while !self.service.server_available(self.probe_timeout).await {
            flags.state.send_replace(GoalState::WaitingForServer);
            info!("motion action server not available, waiting...");
        }

        let goal_id = Uuid::new_v4();
        let (cancel_tx, cancel_rx) = mpsc::channel(1);
        *self.active.lock().await = Some(ActiveGoal {
            id: goal_id,
            cancel: cancel_tx,
        });

        let service = Arc::clone(&self.service);
        let active = Arc::clone(&self.active);
        let retry_delay = self.probe_timeout;
        tokio::spawn(drive_goal(
            service, flags, active, goal, goal_id, cancel_rx, retry_delay,
        ));
    }
}

/// Iterative submit/resubmit loop for one goal. Runs until the goal reaches a
/// terminal state; a rejecting server is answered with the identical goal
/// forever rather than ever abandoning it.
async fn drive_goal(
    service: Arc<dyn MotionService>,
    flags: Arc<GoalFlags>,
    active: Arc<Mutex<Option<ActiveGoal>>>,
    goal: MotionGoal,
    goal_id: Uuid,
    mut cancel_rx: mpsc::Receiver<()>,
    retry_delay: Duration,
) {
    loop {
        flags.state.send_replace(GoalState::Submitted);
        let mut handle = match service.submit(goal.clone()).await {
            Err(e) => {
                info!("goal submission failed ({e}), retrying");
                sleep(retry_delay).await;
                continue;
            }
            Ok(GoalResponse::Rejected) => {
                flags.state.send_replace(GoalState::Rejected);
                info!("goal rejected, resubmitting");
                continue;
            }
            Ok(GoalResponse::Accepted(handle)) => {
                flags.state.send_replace(GoalState::Accepted);
                info!("goal accepted");
                handle
            }
        };

        flags.state.send_replace(GoalState::ResultPending);
        let cancel_requested = tokio::select! {
            _ = handle.result() => false,
            Some(()) = cancel_rx.recv() => true,
        };

        if cancel_requested {
            flags.state.send_replace(GoalState::Canceling);
            handle.cancel().await;
            flags.state.send_replace(GoalState::Canceled);
            // A canceled goal is still terminal for whoever waits on the
            // completion flag, matching the service's result-on-cancel.
            flags.completion_flag(goal.kind()).send_replace(true);
            flags.canceled.send_replace(true);
        } else {
            flags.state.send_replace(GoalState::Completed);
            flags.completion_flag(goal.kind()).send_replace(true);
        }

        let mut slot = active.lock().await;
        if slot.as_ref().map(|a| a.id) == Some(goal_id) {
            *slot = None;
        }
        // A cancel request that raced the result: the goal is terminal, which
        // is exactly what the canceler waits for, so confirm it here.
        if !cancel_requested && cancel_rx.try_recv().is_ok() {
            flags.canceled.send_replace(true);
        }
        return;
    }
}

/// Block until the flag turns true, logging `progress_msg` once per
/// `log_interval` while waiting. Wakes with bounded latency on the flag edge.
pub async fn wait_for_flag(
    mut rx: watch::Receiver<bool>,
    progress_msg: &str,
    log_interval: Duration,
) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        match tokio::time::timeout(log_interval, rx.changed()).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => return,
            Err(_) => info!("{progress_msg}"),
        }
    }
}
