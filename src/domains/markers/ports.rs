use crate::domains::markers::MarkerSpec;

/// Port onto the visualization channel. Publishing is fire-and-forget.
pub trait MarkerSink: Send + Sync {
    fn publish(&self, marker: MarkerSpec);
}
