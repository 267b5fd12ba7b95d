use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

use valet_app::common::{DomainError, DomainResult};
use valet_app::domains::motion::{
    GoalHandle, GoalOutcome, GoalResponse, GoalState, MotionClient, MotionGoal, MotionService,
};

/// Motion service scripted per test: fail or reject the first N submissions,
/// answer the first M probes as unavailable, and complete accepted goals only
/// when the test fires the prepared result channel.
struct ScriptedMotion {
    unavailable_probes: AtomicU32,
    fail_first: AtomicU32,
    reject_first: AtomicU32,
    submissions: Mutex<Vec<MotionGoal>>,
    next_result: Mutex<Option<oneshot::Receiver<GoalOutcome>>>,
    cancel_confirmed: Arc<AtomicBool>,
}

impl ScriptedMotion {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            unavailable_probes: AtomicU32::new(0),
            fail_first: AtomicU32::new(0),
            reject_first: AtomicU32::new(0),
            submissions: Mutex::new(Vec::new()),
            next_result: Mutex::new(None),
            cancel_confirmed: Arc::new(AtomicBool::new(false)),
        })
    }

    fn arm_result(&self) -> oneshot::Sender<GoalOutcome> {
        let (tx, rx) = oneshot::channel();
        *self.next_result.lock().unwrap() = Some(rx);
        tx
    }

    fn submissions(&self) -> Vec<MotionGoal> {
        self.submissions.lock().unwrap().clone()
    }

    fn count_down(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl MotionService for ScriptedMotion {
    async fn server_available(&self, _timeout: Duration) -> bool {
        !Self::count_down(&self.unavailable_probes)
    }

    async fn submit(&self, goal: MotionGoal) -> DomainResult<GoalResponse> {
        self.submissions.lock().unwrap().push(goal);
        if Self::count_down(&self.fail_first) {
            return Err(DomainError::ServiceUnavailable {
                service: "motion".to_string(),
            });
        }
        if Self::count_down(&self.reject_first) {
            return Ok(GoalResponse::Rejected);
        }
        Ok(GoalResponse::Accepted(Box::new(ScriptedHandle {
            result: self.next_result.lock().unwrap().take(),
            cancel_confirmed: Arc::clone(&self.cancel_confirmed),
        })))
    }
}

struct ScriptedHandle {
    result: Option<oneshot::Receiver<GoalOutcome>>,
    cancel_confirmed: Arc<AtomicBool>,
}

#[async_trait]
impl GoalHandle for ScriptedHandle {
    async fn result(&mut self) -> GoalOutcome {
        match self.result.take() {
            Some(rx) => rx.await.unwrap_or(GoalOutcome::Aborted),
            None => std::future::pending().await,
        }
    }

    async fn cancel(&mut self) {
        self.cancel_confirmed.store(true, Ordering::SeqCst);
    }
}

async fn eventually(what: &str, cond: impl Fn() -> bool) {
    for _ in 0..1000 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("timed out waiting for {what}");
}

#[tokio::test]
async fn rejections_trigger_identical_resubmission() {
    let service = ScriptedMotion::new();
    service.reject_first.store(3, Ordering::SeqCst);
    let result_tx = service.arm_result();

    let client = MotionClient::new(service.clone(), Duration::from_millis(10));
    client.submit_move(1.0, 2.0, 0.5).await;

    eventually("three rejections plus the accepted attempt", || {
        service.submissions().len() == 4
    })
    .await;

    let expected = MotionGoal::Move {
        x: 1.0,
        y: 2.0,
        yaw: 0.5,
    };
    for goal in service.submissions() {
        assert_eq!(goal, expected);
    }

    // The flag may only be set by the accepted attempt's result.
    assert!(!*client.arrived().borrow());
    result_tx.send(GoalOutcome::Succeeded).unwrap();

    eventually("arrival flag", || *client.arrived().borrow()).await;
    assert_eq!(*client.goal_state().borrow(), GoalState::Completed);
    assert_eq!(service.submissions().len(), 4);
}

#[tokio::test]
async fn submission_waits_until_the_server_answers_a_probe() {
    let service = ScriptedMotion::new();
    service.unavailable_probes.store(2, Ordering::SeqCst);
    let result_tx = service.arm_result();
    result_tx.send(GoalOutcome::Succeeded).unwrap();

    let client = MotionClient::new(service.clone(), Duration::from_millis(5));
    client.submit_rotate(1.0).await;

    eventually("rotation flag", || *client.rotation_complete().borrow()).await;
    assert_eq!(service.submissions().len(), 1);
}

#[tokio::test]
async fn cancel_with_nothing_outstanding_succeeds_immediately() {
    let service = ScriptedMotion::new();
    let client = MotionClient::new(service.clone(), Duration::from_millis(5));

    client.cancel_current().await;
    assert!(*client.canceled().borrow());
}

#[tokio::test]
async fn cancel_is_confirmed_by_the_service_before_the_flag_turns() {
    let service = ScriptedMotion::new();
    // Result channel armed but never fired: the goal stays in flight until
    // canceled. The sender must outlive the test body.
    let _result_tx = service.arm_result();

    let client = MotionClient::new(service.clone(), Duration::from_millis(5));
    client.submit_drive(0.5, 0.25).await;

    eventually("goal in flight", || {
        *client.goal_state().borrow() == GoalState::ResultPending
    })
    .await;
    assert!(!*client.canceled().borrow());

    client.cancel_current().await;
    eventually("cancel confirmation", || *client.canceled().borrow()).await;

    assert!(service.cancel_confirmed.load(Ordering::SeqCst));
    assert_eq!(*client.goal_state().borrow(), GoalState::Canceled);
    // A canceled goal is still terminal for the phase waiting on it.
    assert!(*client.drive_complete().borrow());
}

#[tokio::test]
async fn cancel_racing_a_finished_goal_still_confirms() {
    // The result fires just before the cancel request lands; the goal being
    // terminal is the confirmation, so the canceled flag must turn either way.
    for _ in 0..20 {
        let service = ScriptedMotion::new();
        let result_tx = service.arm_result();

        let client = MotionClient::new(service.clone(), Duration::from_millis(5));
        client.submit_drive(0.5, 0.25).await;
        eventually("goal in flight", || {
            *client.goal_state().borrow() == GoalState::ResultPending
        })
        .await;

        result_tx.send(GoalOutcome::Succeeded).unwrap();
        client.cancel_current().await;

        eventually("cancel confirmation", || *client.canceled().borrow()).await;
        assert!(*client.drive_complete().borrow());
    }
}

#[tokio::test]
async fn submission_errors_are_retried_until_accepted() {
    let service = ScriptedMotion::new();
    service.fail_first.store(2, Ordering::SeqCst);
    let result_tx = service.arm_result();
    result_tx.send(GoalOutcome::Succeeded).unwrap();

    let client = MotionClient::new(service.clone(), Duration::from_millis(5));
    client.submit_rotate(0.7).await;

    eventually("rotation flag", || *client.rotation_complete().borrow()).await;
    // Two failed attempts plus the accepted one, all for the same goal.
    assert_eq!(service.submissions().len(), 3);
    let expected = MotionGoal::Rotate { yaw: 0.7 };
    for goal in service.submissions() {
        assert_eq!(goal, expected);
    }
}

#[tokio::test]
async fn completed_goal_reports_through_its_own_kind_flag_only() {
    let service = ScriptedMotion::new();
    let result_tx = service.arm_result();
    result_tx.send(GoalOutcome::Succeeded).unwrap();

    let client = MotionClient::new(service.clone(), Duration::from_millis(5));
    client.submit_drive(0.2, 0.5).await;

    eventually("drive flag", || *client.drive_complete().borrow()).await;
    assert!(!*client.arrived().borrow());
    assert!(!*client.rotation_complete().borrow());
}
