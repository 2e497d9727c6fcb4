//! Browser configuration module

pub mod browser_config;
pub mod null_handling;

pub use browser_config::*;
pub use null_handling::*;
