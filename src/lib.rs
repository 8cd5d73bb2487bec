pub mod config;
pub mod logging;
pub mod model;
pub mod output;
pub mod points;
pub mod standings;
pub mod store;
