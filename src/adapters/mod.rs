pub mod outbound;
pub mod sim;
