use crate::config::{secs, Config};
use crate::domains::geometry::{FrameTransform, Geometry};
use crate::domains::markers::{MarkerEmitter, MarkerSink};
use crate::domains::motion::{MotionClient, MotionService};
use crate::domains::parking::{
    ActuatorPort, JobStatus, LandmarkReport, LandmarkTracker, ParkingJob, ParkingTask, StatusSink,
};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// External collaborators a worker needs. Shared across jobs; a fresh
/// `ParkingTask` is assembled from these for every accepted job.
pub struct TaskDeps {
    pub motion: Arc<dyn MotionService>,
    pub transform: Arc<dyn FrameTransform>,
    pub markers: Arc<dyn MarkerSink>,
    pub actuator: Arc<dyn ActuatorPort>,
    pub detections: broadcast::Sender<LandmarkReport>,
}

/// Job intake, deduplication, exclusivity and periodic status emission.
///
/// At most one job is acting at any time: a job sharing the current job's id,
/// or arriving while any job is acting, is dropped unprocessed rather than
/// queued. Status is published on every state change and unconditionally on a
/// fixed timer, so subscribers always observe liveness.
#[derive(Clone)]
pub struct JobDispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    deps: TaskDeps,
    config: Arc<Config>,
    status_sink: Arc<dyn StatusSink>,
    state: Mutex<JobStatus>,
    shutdown: CancellationToken,
}

impl JobDispatcher {
    pub fn new(deps: TaskDeps, status_sink: Arc<dyn StatusSink>, config: Arc<Config>) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                deps,
                config,
                status_sink,
                state: Mutex::new(JobStatus::idle()),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn current_status(&self) -> JobStatus {
        self.inner.current_status()
    }

    pub fn publish_status(&self) {
        self.inner.publish_status();
    }

    /// Handle one arriving job, spawning its worker when accepted.
    pub fn on_job(&self, job: ParkingJob) {
        {
            let mut state = self.inner.state.lock().unwrap();
            if state.job_id == job.job_id || state.acting {
                debug!("dropping job {} (duplicate or already acting)", job.job_id);
                return;
            }
            state.job_id = job.job_id.clone();
            state.acting = true;
        }
        self.inner.publish_status();

        let task = self.inner.build_task();
        let inner = Arc::clone(&self.inner);
        let token = self.inner.shutdown.child_token();
        tokio::spawn(async move {
            let job_id = job.job_id.clone();
            tokio::select! {
                _ = token.cancelled() => info!("job {job_id} interrupted by shutdown"),
                _ = task.run(job) => {}
            }
            inner.state.lock().unwrap().acting = false;
            inner.publish_status();
        });
    }

    /// Republish the current status every period until shutdown, independent
    /// of state changes.
    pub fn spawn_status_timer(&self) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        let period = secs(self.inner.config.status.publish_period_secs);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = inner.shutdown.cancelled() => return,
                    _ = ticker.tick() => inner.publish_status(),
                }
            }
        })
    }

    /// Cancel the status timer and interrupt any running worker at its next
    /// await point. The retry-forever waits are interruptible exactly here.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
    }
}

impl DispatcherInner {
    fn current_status(&self) -> JobStatus {
        self.state.lock().unwrap().clone()
    }

    fn publish_status(&self) {
        self.status_sink.publish(&self.current_status());
    }

    fn build_task(&self) -> ParkingTask {
        let motion = MotionClient::new(
            Arc::clone(&self.deps.motion),
            secs(self.config.motion.server_probe_secs),
        );
        let geometry = Geometry::new(
            Arc::clone(&self.deps.transform),
            secs(self.config.motion.transform_budget_secs),
            secs(self.config.motion.transform_retry_secs),
        );
        let markers = MarkerEmitter::new(
            Arc::clone(&self.deps.markers),
            self.config.frames.world_frame.clone(),
            &self.config.markers,
        );
        let landmarks = LandmarkTracker::new(
            self.deps.detections.subscribe(),
            self.config.detection.clone(),
        );
        ParkingTask::new(
            motion,
            geometry,
            markers,
            Arc::clone(&self.deps.actuator),
            landmarks,
            Arc::clone(&self.config),
        )
    }
}
