pub mod config_io;
pub mod draft;
pub mod lock;
pub mod store;
