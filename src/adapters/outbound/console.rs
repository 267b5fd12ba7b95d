use crate::domains::markers::{MarkerSink, MarkerSpec};
use crate::domains::parking::{ActuatorPort, ArmCommand, JobStatus, StatusSink};
use tracing::info;

/// Status sink that logs each status as a JSON line.
pub struct ConsoleStatusSink;

impl StatusSink for ConsoleStatusSink {
    fn publish(&self, status: &JobStatus) {
        match serde_json::to_string(status) {
            Ok(line) => info!("job_status {line}"),
            Err(e) => info!("job_status (unserializable: {e})"),
        }
    }
}

/// Marker sink that logs the primitive instead of drawing it.
pub struct ConsoleMarkerSink;

impl MarkerSink for ConsoleMarkerSink {
    fn publish(&self, marker: MarkerSpec) {
        info!(
            "marker slot={} shape={:?} at ({:.2}, {:.2}) text={:?}",
            marker.slot_id,
            marker.shape(),
            marker.position.x,
            marker.position.y,
            marker.text
        );
    }
}

/// Actuator port that logs the requested configuration.
pub struct ConsoleActuator;

impl ActuatorPort for ConsoleActuator {
    fn send(&self, command: ArmCommand) {
        info!("arm command {:?}", command.joints);
    }
}
