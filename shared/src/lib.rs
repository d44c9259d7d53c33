pub mod config;
pub mod models;
pub mod storage;

pub use config::Config;
pub use models::*;
