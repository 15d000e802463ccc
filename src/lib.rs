// ABOUTME: Library root for cutover - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod cloud;
pub mod config;
pub mod error;
pub mod log_sink;
pub mod output;
pub mod sim;
pub mod task;
pub mod types;
