pub mod app;
pub mod config;
pub mod error;
pub mod fetch;
pub mod persist;
pub mod process;
pub mod schedule;
pub mod serve;
pub mod stats;

pub use error::{Error, Result};
