pub mod client;
pub mod goal;
pub mod ports;

pub use client::*;
pub use goal::*;
pub use ports::*;
