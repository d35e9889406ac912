pub mod catalog;
pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod percentile;
pub mod radar;
pub mod radar_canvas;
pub mod session;
pub mod state;
