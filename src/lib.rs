pub mod config;
pub mod history;
pub mod model;
pub mod report;
pub mod stats;
