pub mod engine;
pub mod ports;
pub mod types;

pub use engine::*;
pub use ports::*;
pub use types::*;
