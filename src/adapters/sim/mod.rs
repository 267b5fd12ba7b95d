//! In-process simulated stand-ins for the external motion and transform
//! services, behind the same ports the real adapters would implement. Used by
//! the demo binary and the integration tests.

pub mod motion;
pub mod transform;
pub mod world;

pub use motion::*;
pub use transform::*;
pub use world::*;
