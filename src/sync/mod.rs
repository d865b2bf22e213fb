pub mod engine;
pub mod gateway;

pub use engine::*;
pub use gateway::*;
