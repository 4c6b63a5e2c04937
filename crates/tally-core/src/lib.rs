pub mod compose;
pub mod config;
pub mod engine;
pub mod errors;
pub mod model;
pub mod stats;
pub mod storage;
pub mod thread;
pub mod twitter;
