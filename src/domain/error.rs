use thiserror::Error;

/// Failure reported by a region lookup provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no region configured (set AWS_REGION, AWS_DEFAULT_REGION or region.default)")]
    NotConfigured,
    #[error("lookup rejected by provider: {reason}")]
    Rejected { reason: String },
    #[cfg_attr(not(test), allow(dead_code))]
    #[error("lookup endpoint unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Failure carried by a [`Deferred`](crate::domain::deferred::Deferred) value.
///
/// Every clone of a shared deferred observes the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeferredError {
    #[error("{label}: {source}")]
    Lookup {
        label: String,
        #[source]
        source: LookupError,
    },
    #[error("{label} was dropped before the engine resolved it")]
    Abandoned { label: String },
    #[error("{label}: {reason}")]
    Failed { label: String, reason: String },
}

#[derive(Debug, Error)]
pub enum StackError {
    #[error("invalid {subject}: {reason}")]
    Configuration { subject: String, reason: String },
    #[error("resource '{resource}' property '{property}': {source}")]
    Lookup {
        resource: String,
        property: String,
        #[source]
        source: LookupError,
    },
    #[error("resource '{resource}' property '{property}' failed to resolve: {source}")]
    Resolution {
        resource: String,
        property: String,
        #[source]
        source: DeferredError,
    },
    #[error("output '{name}' has not been resolved yet")]
    UnresolvedOutput { name: String },
    #[error("output '{name}' failed to resolve: {source}")]
    OutputFailed {
        name: String,
        #[source]
        source: DeferredError,
    },
    #[error("output '{name}' is not registered")]
    UnknownOutput { name: String },
}

impl StackError {
    pub fn resource_config(resource: &str, reason: impl Into<String>) -> Self {
        Self::Configuration {
            subject: format!("resource '{resource}'"),
            reason: reason.into(),
        }
    }

    pub fn output_config(name: &str, reason: impl Into<String>) -> Self {
        Self::Configuration {
            subject: format!("output '{name}'"),
            reason: reason.into(),
        }
    }

    /// Attributes a deferred failure to the resource property it was bound to.
    pub fn from_property(resource: &str, property: &str, error: DeferredError) -> Self {
        match error {
            DeferredError::Lookup { source, .. } => Self::Lookup {
                resource: resource.to_owned(),
                property: property.to_owned(),
                source,
            },
            other => Self::Resolution {
                resource: resource.to_owned(),
                property: property.to_owned(),
                source: other,
            },
        }
    }
}
