pub mod types;
pub mod traits;
pub mod event;
pub mod config;
