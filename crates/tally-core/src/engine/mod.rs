pub mod runner;
pub mod visibility;
