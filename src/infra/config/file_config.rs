use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{
    domain::policy::EnforcementLevel,
    infra::config::{AppConfig, LogConfig, PolicyConfig, RegionConfig, StackConfig},
};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub stack: Option<FileStackConfig>,
    pub region: Option<FileRegionConfig>,
    pub auto_tags: Option<BTreeMap<String, toml::Value>>,
    pub policy: Option<FilePolicyConfig>,
}

impl FileConfig {
    /// Merges file values over `config`. Fails with the offending key when an
    /// auto tag value is not a scalar.
    pub fn merge_into(self, config: &mut AppConfig) -> Result<(), String> {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(stack) = self.stack {
            stack.merge_into(&mut config.stack);
        }

        if let Some(region) = self.region {
            region.merge_into(&mut config.region);
        }

        if let Some(auto_tags) = self.auto_tags {
            for (key, value) in auto_tags {
                let value = scalar_to_string(&value)
                    .ok_or_else(|| format!("auto_tags.{key} must be a string, number or boolean"))?;
                config.auto_tags.insert(key, value);
            }
        }

        if let Some(policy) = self.policy {
            policy.merge_into(&mut config.policy);
        }

        Ok(())
    }
}

fn scalar_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(value) => Some(value.clone()),
        toml::Value::Integer(value) => Some(value.to_string()),
        toml::Value::Float(value) => Some(value.to_string()),
        toml::Value::Boolean(value) => Some(value.to_string()),
        _ => None,
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogConfig {
    pub level: Option<String>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileStackConfig {
    pub project: Option<String>,
    pub name: Option<String>,
}

impl FileStackConfig {
    fn merge_into(self, config: &mut StackConfig) {
        if let Some(project) = self.project {
            config.project = project;
        }

        if let Some(name) = self.name {
            config.name = name;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileRegionConfig {
    pub default: Option<String>,
    pub lookup_delay_ms: Option<u64>,
}

impl FileRegionConfig {
    fn merge_into(self, config: &mut RegionConfig) {
        if let Some(default) = self.default {
            config.default = Some(default);
        }

        if let Some(lookup_delay_ms) = self.lookup_delay_ms {
            config.lookup_delay_ms = Some(lookup_delay_ms);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FilePolicyConfig {
    pub enforcement: Option<EnforcementLevel>,
    pub check_stack_tags: Option<bool>,
}

impl FilePolicyConfig {
    fn merge_into(self, config: &mut PolicyConfig) {
        if let Some(enforcement) = self.enforcement {
            config.enforcement = enforcement;
        }

        if let Some(check_stack_tags) = self.check_stack_tags {
            config.check_stack_tags = check_stack_tags;
        }
    }
}
