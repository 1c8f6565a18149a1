//! Infrastructure layer: config, logging, region lookup and the local engine.

pub mod config;
pub mod contracts;
pub mod error;
pub mod local_engine;
pub mod logging;
pub mod region;
pub mod stubs;

/// Returns the infra module name for smoke checks.
pub fn module_name() -> &'static str {
    "infra"
}
