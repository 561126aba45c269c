pub mod config;
pub mod consumer;
pub mod core;
pub mod engine;
pub mod error;
pub mod generators;
pub mod observability;

pub use config::DriverConfig;
pub use error::{DriverError, Result};
