pub mod geometry;
pub mod markers;
pub mod motion;
pub mod parking;

pub use geometry::*;
pub use markers::*;
pub use motion::*;
pub use parking::*;
