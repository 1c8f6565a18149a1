use std::sync::Arc;

use crate::{
    domain::stack::StackContext,
    infra::config::AppConfig,
    usecases::{auto_tag::AutoTags, region_lookup::RegionLookup, tag_policy::TagPolicyOptions},
};

#[derive(Debug)]
pub struct AppContext {
    pub config: AppConfig,
    pub region_lookup: Arc<dyn RegionLookup>,
}

impl AppContext {
    pub fn new(config: AppConfig, region_lookup: Arc<dyn RegionLookup>) -> Self {
        Self {
            config,
            region_lookup,
        }
    }

    pub fn stack_context(&self) -> StackContext {
        StackContext::new(&self.config.stack.project, &self.config.stack.name)
    }

    pub fn auto_tags(&self) -> AutoTags {
        AutoTags::for_stack(&self.stack_context(), &self.config.auto_tags)
    }

    pub fn tag_policy_options(&self) -> TagPolicyOptions {
        TagPolicyOptions {
            enforcement: self.config.policy.enforcement,
            check_stack_tags: self.config.policy.check_stack_tags,
        }
    }
}
