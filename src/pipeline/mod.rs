pub mod config;
pub mod pattern;
pub mod persistence;
pub mod pitch;
