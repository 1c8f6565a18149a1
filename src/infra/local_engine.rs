//! In-process stand-in for the provisioning engine.
//!
//! Drives every deferred property, runs the policy pack against the resolved
//! values and assigns auto-named identifiers. It talks to no cloud API and
//! keeps no state between runs.

use std::fmt;

use async_trait::async_trait;

use crate::{
    domain::{
        error::StackError,
        policy::{EnforcementLevel, PolicyPack, PolicyViolation, ResourceValidationArgs},
        property::resolve_bag_at,
        resource::LogicalName,
        stack::{DeclarationParts, DeclarationSet},
    },
    usecases::{
        contracts::ProvisioningEngine,
        engine::{ApplyReport, EngineError, ProvisionedResource},
    },
};

const AUTO_NAME_SUFFIX_LEN: usize = 7;

pub type IdAllocator = fn(&LogicalName) -> String;

pub struct LocalEngine {
    policy_pack: Option<PolicyPack>,
    allocate_id: IdAllocator,
}

impl LocalEngine {
    pub fn new() -> Self {
        Self {
            policy_pack: None,
            allocate_id: auto_name,
        }
    }

    pub fn with_policy_pack(mut self, pack: PolicyPack) -> Self {
        self.policy_pack = Some(pack);
        self
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn with_id_allocator(mut self, allocate_id: IdAllocator) -> Self {
        self.allocate_id = allocate_id;
        self
    }

    fn check_policies(
        &self,
        args: &ResourceValidationArgs<'_>,
    ) -> Result<Vec<PolicyViolation>, EngineError> {
        let Some(pack) = &self.policy_pack else {
            return Ok(Vec::new());
        };

        let violations = pack.validate(args);
        for violation in &violations {
            tracing::warn!(
                pack = %pack.name,
                policy = %violation.policy,
                level = violation.level.as_label(),
                urn = %violation.urn,
                "{}",
                violation.message
            );
        }

        let mandatory: Vec<_> = violations
            .iter()
            .filter(|violation| violation.level == EnforcementLevel::Mandatory)
            .cloned()
            .collect();
        if !mandatory.is_empty() {
            return Err(EngineError::PolicyViolations {
                urn: args.urn.to_string(),
                violations: mandatory,
            });
        }

        Ok(violations)
    }
}

impl Default for LocalEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LocalEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalEngine")
            .field("policy_pack", &self.policy_pack)
            .finish_non_exhaustive()
    }
}

/// `<logical-name>-<7 hex chars>`, the provider's auto-naming shape.
fn auto_name(name: &LogicalName) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{name}-{}", &suffix[..AUTO_NAME_SUFFIX_LEN])
}

#[async_trait]
impl ProvisioningEngine for LocalEngine {
    async fn apply(&self, declarations: DeclarationSet) -> Result<ApplyReport, EngineError> {
        let DeclarationParts {
            context,
            resources,
            mut id_resolvers,
            outputs,
        } = declarations.into_parts();
        let mut report = ApplyReport::default();

        for resource in resources {
            let properties = resolve_bag_at(&resource.properties, None)
                .await
                .map_err(|error| {
                    StackError::from_property(resource.name.as_str(), &error.path, error.source)
                })?;

            let violations = self.check_policies(&ResourceValidationArgs {
                urn: &resource.urn,
                resource_type: &resource.resource_type,
                props: &properties,
            })?;
            report.violations.extend(violations);

            let id = (self.allocate_id)(&resource.name);
            if let Some(resolver) = id_resolvers.remove(&resource.name) {
                resolver.resolve(id.clone());
            }

            tracing::info!(urn = %resource.urn, id = %id, "resource provisioned");

            report.resources.push(ProvisionedResource {
                urn: resource.urn.to_string(),
                name: resource.name.to_string(),
                resource_type: resource.resource_type,
                id,
                properties,
            });
        }

        for binding in outputs.iter() {
            let value = binding
                .value()
                .resolve()
                .await
                .map_err(|source| StackError::OutputFailed {
                    name: binding.name().to_owned(),
                    source,
                })?;
            report.outputs.insert(binding.name().to_owned(), value);
        }

        tracing::info!(
            project = %context.project,
            stack = %context.stack,
            resources = report.resources.len(),
            outputs = report.outputs.len(),
            violations = report.violations.len(),
            "stack applied"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, sync::Arc};

    use serde_json::json;

    use super::*;
    use crate::{
        domain::{
            bucket::BucketArgs,
            deferred::Deferred,
            stack::{StackBuilder, StackContext},
        },
        infra::stubs::StaticRegionLookup,
        usecases::{
            auto_tag::AutoTags,
            bucket_stack::BucketStack,
            evaluate::evaluate,
            tag_policy::{tagging_policy_pack, TagPolicyOptions},
        },
    };

    fn context() -> StackContext {
        StackContext::new("test-cs", "dev")
    }

    fn fixed_id(name: &LogicalName) -> String {
        format!("{name}-abc1234")
    }

    #[test]
    fn auto_names_append_a_short_suffix() {
        let name = LogicalName::new("my-bucket").expect("valid name");

        let id = auto_name(&name);

        assert!(id.starts_with("my-bucket-"));
        assert_eq!(id.len(), "my-bucket-".len() + AUTO_NAME_SUFFIX_LEN);
    }

    #[tokio::test]
    async fn later_resources_can_reference_earlier_ids() {
        let mut stack = StackBuilder::new(context());
        let logs = stack
            .declare("logs", BucketArgs::default())
            .expect("logs declared");
        let mut args = BucketArgs::default();
        args.tags
            .insert("log-bucket".to_owned(), logs.id().to_json().into());
        stack.declare("app", args).expect("app declared");

        let report = LocalEngine::new()
            .with_id_allocator(fixed_id)
            .apply(stack.finish())
            .await
            .expect("apply succeeds");

        assert_eq!(
            report.resources[1].properties["tags"],
            json!({ "log-bucket": "logs-abc1234" })
        );
    }

    #[tokio::test]
    async fn advisory_violations_are_reported_without_failing() {
        let definition = BucketStack::new(Arc::new(StaticRegionLookup::new("us-west-2")));
        let declarations =
            evaluate(&definition, context(), &AutoTags::default()).expect("evaluates");

        let report = LocalEngine::new()
            .with_policy_pack(tagging_policy_pack(TagPolicyOptions::default()))
            .apply(declarations)
            .await
            .expect("advisory violations do not fail apply");

        assert_eq!(report.violations.len(), 5);
        assert!(report.outputs.contains_key("BucketName"));
    }

    #[tokio::test]
    async fn mandatory_violations_fail_and_leave_ids_unassigned() {
        let definition = BucketStack::new(Arc::new(StaticRegionLookup::new("us-west-2")));
        let mut builder = StackBuilder::new(context());
        let outputs = definition
            .declare_bucket(&mut builder)
            .expect("declaration succeeds");
        let options = TagPolicyOptions {
            enforcement: EnforcementLevel::Mandatory,
            ..TagPolicyOptions::default()
        };

        let error = LocalEngine::new()
            .with_policy_pack(tagging_policy_pack(options))
            .apply(builder.finish())
            .await
            .expect_err("mandatory violations fail apply");

        assert!(matches!(error, EngineError::PolicyViolations { ref violations, .. } if violations.len() == 5));
        assert!(outputs.bucket.id().resolve().await.is_err());
    }

    #[tokio::test]
    async fn fully_tagged_stack_passes_mandatory_policy() {
        let definition = BucketStack::new(Arc::new(StaticRegionLookup::new("us-west-2")));
        let extra = BTreeMap::from([
            ("application".to_owned(), "test".to_owned()),
            ("cost-center".to_owned(), "390".to_owned()),
            ("product".to_owned(), "policy".to_owned()),
            ("product-area".to_owned(), "devsecops".to_owned()),
        ]);
        let auto_tags = AutoTags::for_stack(&context(), &extra);
        let declarations = evaluate(&definition, context(), &auto_tags).expect("evaluates");
        let options = TagPolicyOptions {
            enforcement: EnforcementLevel::Mandatory,
            ..TagPolicyOptions::default()
        };

        let report = LocalEngine::new()
            .with_policy_pack(tagging_policy_pack(options))
            .with_id_allocator(fixed_id)
            .apply(declarations)
            .await
            .expect("compliant stack applies");

        assert!(report.violations.is_empty());
        assert_eq!(report.outputs["BucketName"], json!("my-bucket-abc1234"));
        assert_eq!(
            report.resources[0].properties["tags"]["data-center"],
            json!("us-west-2")
        );
    }

    #[tokio::test]
    async fn output_failures_name_the_output() {
        let mut stack = StackBuilder::new(context());
        stack
            .export(
                "Broken",
                Deferred::<String>::from_future("broken", async {
                    Err(crate::domain::error::DeferredError::Failed {
                        label: "broken".to_owned(),
                        reason: "boom".to_owned(),
                    })
                }),
            )
            .expect("export succeeds");

        let error = LocalEngine::new()
            .apply(stack.finish())
            .await
            .expect_err("output failure surfaces");

        assert!(matches!(
            error,
            EngineError::Stack(StackError::OutputFailed { ref name, .. }) if name == "Broken"
        ));
    }
}
