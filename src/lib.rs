pub mod cli;
pub mod config;
pub mod dashboard;
pub mod normalize;
pub mod progress;
pub mod proof;
pub mod query;
pub mod render;
pub mod report;
pub mod staging;
pub mod surface;
pub mod transport;
pub mod upload;
pub mod util;
