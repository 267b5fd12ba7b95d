use crate::config::MarkerConfig;
use crate::domains::geometry::WorldPoint;
use crate::domains::markers::{ColorPreset, MarkerSink, MarkerSpec};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Builds and publishes visualization primitives. Stateless apart from the
/// color preset the current phase last selected.
pub struct MarkerEmitter {
    sink: Arc<dyn MarkerSink>,
    frame: String,
    lifetime: Duration,
    default_scale: f64,
    label_scale: f64,
    height: f64,
    color: Mutex<ColorPreset>,
}

impl MarkerEmitter {
    pub fn new(sink: Arc<dyn MarkerSink>, frame: String, config: &MarkerConfig) -> Self {
        Self {
            sink,
            frame,
            lifetime: Duration::from_secs_f64(config.lifetime_secs),
            default_scale: config.default_scale,
            label_scale: config.label_scale,
            height: config.height,
            color: Mutex::new(ColorPreset::PhaseDone),
        }
    }

    pub fn set_color(&self, preset: ColorPreset) {
        *self.color.lock().unwrap() = preset;
    }

    /// Sphere in the default slot at the default scale.
    pub fn emit(&self, x: f64, y: f64) {
        self.publish(x, y, 0, self.default_scale, None);
    }

    /// Floating text label; reusing `slot_id` overwrites the previous label.
    pub fn emit_label(&self, x: f64, y: f64, slot_id: i32, label: &str) {
        self.publish(x, y, slot_id, self.label_scale, Some(label.to_string()));
    }

    fn publish(&self, x: f64, y: f64, slot_id: i32, scale: f64, text: Option<String>) {
        let color = self.color.lock().unwrap().rgba();
        self.sink.publish(MarkerSpec {
            frame: self.frame.clone(),
            position: WorldPoint::new(x, y, self.height),
            slot_id,
            scale,
            color,
            lifetime: self.lifetime,
            text,
        });
    }
}
