use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::{error::StackError, policy::PolicyViolation};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvisionedResource {
    pub urn: String,
    pub name: String,
    pub resource_type: String,
    pub id: String,
    pub properties: Map<String, Value>,
}

/// What an engine run produced: resolved resources, outputs and every policy
/// violation (advisory ones included).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApplyReport {
    pub resources: Vec<ProvisionedResource>,
    pub outputs: BTreeMap<String, Value>,
    pub violations: Vec<PolicyViolation>,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Stack(#[from] StackError),
    #[error("resource '{urn}' failed {} mandatory policy check(s)", .violations.len())]
    PolicyViolations {
        urn: String,
        violations: Vec<PolicyViolation>,
    },
}
