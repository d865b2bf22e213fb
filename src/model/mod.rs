pub mod id;
pub mod item;
pub mod record;
pub mod tree;
pub mod config;

pub use id::*;
pub use item::*;
pub use record::*;
pub use tree::*;
pub use config::*;
