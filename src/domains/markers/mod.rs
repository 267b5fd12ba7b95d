pub mod emitter;
pub mod ports;
pub mod spec;

pub use emitter::*;
pub use ports::*;
pub use spec::*;
