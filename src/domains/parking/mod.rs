pub mod job;
pub mod landmarks;
pub mod ports;
pub mod task;

pub use job::*;
pub use landmarks::*;
pub use ports::*;
pub use task::*;
