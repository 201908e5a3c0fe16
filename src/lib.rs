pub mod browser;
pub mod config;
pub mod logging;
pub mod model;
pub mod output;
pub mod persistence;
pub mod scoring;
pub mod store;
