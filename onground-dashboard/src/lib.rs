//! OnGround dashboard
//!
//! Loads workers, tasks, messages and tools from the OnGround backend, shows
//! them as worker cards and a tool registry, and plays back the multi-agent
//! workflow (ingest, parallel delay and safety analysis, report) whenever the
//! chat agent triggers one.

pub mod app;
pub mod backend;
pub mod cards;
pub mod cli;
pub mod config;
pub mod execution_log;
pub mod findings;
pub mod formatter;
pub mod logging;
pub mod tools;
pub mod ui;
pub mod workflow;

pub use onground_sdk::{self as sdk, DashboardBackend};
