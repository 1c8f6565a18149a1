//! Resource validation policies evaluated against resolved properties.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::resource::Urn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnforcementLevel {
    /// Violations are reported but do not block provisioning.
    #[default]
    Advisory,
    /// Violations block provisioning of the offending resource.
    Mandatory,
    Disabled,
}

impl EnforcementLevel {
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Advisory => "advisory",
            Self::Mandatory => "mandatory",
            Self::Disabled => "disabled",
        }
    }
}

/// What a validator sees of one resource.
#[derive(Debug, Clone, Copy)]
pub struct ResourceValidationArgs<'a> {
    pub urn: &'a Urn,
    pub resource_type: &'a str,
    pub props: &'a Map<String, Value>,
}

impl ResourceValidationArgs<'_> {
    /// Tag keys present on the resource, or `None` when it has no `tags` property.
    pub fn tags(&self) -> Option<&Map<String, Value>> {
        self.props.get("tags").and_then(Value::as_object)
    }
}

#[derive(Debug, Default)]
pub struct ViolationReport {
    messages: Vec<String>,
}

impl ViolationReport {
    pub fn report(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }
}

pub trait ResourceValidator: Send + Sync + fmt::Debug {
    fn validate(&self, args: &ResourceValidationArgs<'_>, report: &mut ViolationReport);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyViolation {
    pub policy: String,
    pub urn: String,
    pub level: EnforcementLevel,
    pub message: String,
}

#[derive(Debug)]
pub struct ResourceValidationPolicy {
    pub name: String,
    #[cfg_attr(not(test), allow(dead_code))]
    pub description: String,
    pub enforcement_level: EnforcementLevel,
    pub validators: Vec<Box<dyn ResourceValidator>>,
}

impl ResourceValidationPolicy {
    pub fn validate(&self, args: &ResourceValidationArgs<'_>) -> Vec<PolicyViolation> {
        if self.enforcement_level == EnforcementLevel::Disabled {
            return Vec::new();
        }

        let mut report = ViolationReport::default();
        for validator in &self.validators {
            validator.validate(args, &mut report);
        }

        report
            .messages
            .into_iter()
            .map(|message| PolicyViolation {
                policy: self.name.clone(),
                urn: args.urn.to_string(),
                level: self.enforcement_level,
                message,
            })
            .collect()
    }
}

#[derive(Debug)]
pub struct PolicyPack {
    pub name: String,
    pub policies: Vec<ResourceValidationPolicy>,
}

impl PolicyPack {
    pub fn validate(&self, args: &ResourceValidationArgs<'_>) -> Vec<PolicyViolation> {
        self.policies
            .iter()
            .flat_map(|policy| policy.validate(args))
            .collect()
    }
}
