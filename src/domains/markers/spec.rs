use crate::domains::geometry::WorldPoint;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One visualization primitive. Publishing a spec with an already-used slot id
/// replaces the primitive occupying that slot, which is how phase-progress
/// visuals stay current instead of accumulating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSpec {
    pub frame: String,
    pub position: WorldPoint,
    pub slot_id: i32,
    pub scale: f64,
    pub color: Rgba,
    pub lifetime: Duration,
    pub text: Option<String>,
}

impl MarkerSpec {
    /// A sphere when there is no label, a floating text label otherwise.
    pub fn shape(&self) -> MarkerShape {
        match self.text {
            None => MarkerShape::Sphere,
            Some(_) => MarkerShape::TextLabel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerShape {
    Sphere,
    TextLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Per-phase marker colors, so an observer can read the task state off the
/// visualization without the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorPreset {
    /// Green: approaching, or a phase just finished.
    PhaseDone,
    /// Red: searching for the ring.
    Searching,
    /// Teal: converging on the ring center.
    Centering,
}

impl ColorPreset {
    pub fn rgba(self) -> Rgba {
        let (r, g, b) = match self {
            ColorPreset::PhaseDone => (0.0, 0.5, 0.1),
            ColorPreset::Searching => (1.0, 0.0, 0.0),
            ColorPreset::Centering => (0.635, 0.823, 0.874),
        };
        Rgba { r, g, b, a: 1.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(text: Option<&str>) -> MarkerSpec {
        MarkerSpec {
            frame: "map".to_string(),
            position: WorldPoint::new(1.0, 2.0, 1.0),
            slot_id: 0,
            scale: 0.1,
            color: ColorPreset::PhaseDone.rgba(),
            lifetime: Duration::from_secs(2),
            text: text.map(str::to_string),
        }
    }

    #[test]
    fn spec_without_text_is_a_sphere() {
        assert_eq!(spec(None).shape(), MarkerShape::Sphere);
    }

    #[test]
    fn spec_with_text_is_a_label() {
        assert_eq!(spec(Some("parking_nav_goal")).shape(), MarkerShape::TextLabel);
    }
}
