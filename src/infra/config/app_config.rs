use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::policy::EnforcementLevel;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub stack: StackConfig,
    pub region: RegionConfig,
    /// Extra tags merged into every taggable resource.
    pub auto_tags: BTreeMap<String, String>,
    pub policy: PolicyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StackConfig {
    pub project: String,
    pub name: String,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            project: "stackform".to_owned(),
            name: "dev".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RegionConfig {
    /// Used when the AWS region provider chain finds nothing.
    pub default: Option<String>,
    /// Artificial latency added to every region lookup.
    pub lookup_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PolicyConfig {
    pub enforcement: EnforcementLevel,
    pub check_stack_tags: bool,
}
