//! Use case layer: stack definitions, evaluation and policy workflows.

pub mod auto_tag;
pub mod bootstrap;
pub mod bucket_stack;
pub mod context;
pub mod contracts;
pub mod engine;
pub mod evaluate;
pub mod region_lookup;
pub mod tag_policy;

/// Returns the usecases module name for smoke checks.
pub fn module_name() -> &'static str {
    "usecases"
}
