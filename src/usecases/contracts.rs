use std::fmt;

use async_trait::async_trait;

use crate::{
    domain::{
        error::StackError,
        stack::{DeclarationSet, StackBuilder},
    },
    usecases::engine::{ApplyReport, EngineError},
};

/// A unit of infrastructure description, evaluated once per run.
pub trait StackDefinition: fmt::Debug {
    fn name(&self) -> &str;

    /// Declares resources and outputs into the injected registry.
    fn declare(&self, stack: &mut StackBuilder) -> Result<(), StackError>;
}

/// Consumes a declaration set and drives its deferred values.
#[async_trait]
pub trait ProvisioningEngine: Send + Sync {
    async fn apply(&self, declarations: DeclarationSet) -> Result<ApplyReport, EngineError>;
}
