//! Domain layer: declarations, deferred values and policy rules.

pub mod bucket;
pub mod deferred;
pub mod error;
pub mod policy;
pub mod property;
pub mod resource;
pub mod stack;
pub mod taggable;

/// Returns the domain module name for smoke checks.
pub fn module_name() -> &'static str {
    "domain"
}
