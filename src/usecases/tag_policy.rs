//! The `tagging-policy` pack: checks that taggable resources carry the tags
//! cost reporting and lifecycle automation depend on.

use crate::domain::{
    policy::{
        EnforcementLevel, PolicyPack, ResourceValidationArgs, ResourceValidationPolicy,
        ResourceValidator, ViolationReport,
    },
    taggable::{is_taggable, needs_time_tags},
};

pub const PACK_NAME: &str = "tagging-policy";
pub const POLICY_NAME: &str = "check-for-tags";

pub const REQUIRED_TAGS: [&str; 5] = [
    "application",
    "cost-center",
    "environment",
    "product",
    "product-area",
];
pub const TIME_TAGS: [&str; 2] = ["backup-by", "delete-after"];
pub const STACK_TAGS: [&str; 2] = ["project", "stack"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagPolicyOptions {
    pub enforcement: EnforcementLevel,
    pub check_stack_tags: bool,
}

impl Default for TagPolicyOptions {
    fn default() -> Self {
        Self {
            enforcement: EnforcementLevel::Advisory,
            check_stack_tags: false,
        }
    }
}

#[derive(Debug)]
struct HasTags;

impl ResourceValidator for HasTags {
    fn validate(&self, args: &ResourceValidationArgs<'_>, report: &mut ViolationReport) {
        if is_taggable(args.resource_type) && !args.props.contains_key("tags") {
            report.report(format!(
                "Taggable resource '{}' does not have any tags",
                args.urn
            ));
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum TagScope {
    AllTaggable,
    TimeTracked,
}

impl TagScope {
    fn covers(self, resource_type: &str) -> bool {
        match self {
            Self::AllTaggable => true,
            Self::TimeTracked => needs_time_tags(resource_type),
        }
    }
}

/// Reports each listed tag missing from a taggable resource's `tags`.
/// Resources with no `tags` at all are left to [`HasTags`].
#[derive(Debug)]
struct RequiredTags {
    tags: &'static [&'static str],
    scope: TagScope,
}

impl ResourceValidator for RequiredTags {
    fn validate(&self, args: &ResourceValidationArgs<'_>, report: &mut ViolationReport) {
        if !is_taggable(args.resource_type) || !self.scope.covers(args.resource_type) {
            return;
        }
        let Some(present) = args.tags() else {
            return;
        };

        for tag in self.tags.iter().filter(|tag| !present.contains_key(**tag)) {
            report.report(format!(
                "Taggable resource '{}' is missing required tag '{tag}'",
                args.urn
            ));
        }
    }
}

pub fn tagging_policy_pack(options: TagPolicyOptions) -> PolicyPack {
    let mut validators: Vec<Box<dyn ResourceValidator>> = vec![
        Box::new(HasTags),
        Box::new(RequiredTags {
            tags: &REQUIRED_TAGS,
            scope: TagScope::AllTaggable,
        }),
        Box::new(RequiredTags {
            tags: &TIME_TAGS,
            scope: TagScope::TimeTracked,
        }),
    ];
    if options.check_stack_tags {
        validators.push(Box::new(RequiredTags {
            tags: &STACK_TAGS,
            scope: TagScope::AllTaggable,
        }));
    }

    PolicyPack {
        name: PACK_NAME.to_owned(),
        policies: vec![ResourceValidationPolicy {
            name: POLICY_NAME.to_owned(),
            description: "Looks for tags on taggable resources.".to_owned(),
            enforcement_level: options.enforcement,
            validators,
        }],
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map, Value};

    use super::*;
    use crate::domain::{
        policy::PolicyViolation,
        resource::{LogicalName, Urn},
        stack::StackContext,
    };

    fn run(options: TagPolicyOptions, resource_type: &str, props: Value) -> Vec<PolicyViolation> {
        let name = LogicalName::new("res").expect("valid name");
        let urn = Urn::new(&StackContext::new("p", "dev"), resource_type, &name);
        let props: Map<String, Value> = props.as_object().cloned().expect("object literal");

        tagging_policy_pack(options).validate(&ResourceValidationArgs {
            urn: &urn,
            resource_type,
            props: &props,
        })
    }

    fn complete_tags() -> Value {
        json!({
            "application": "test",
            "cost-center": "390",
            "environment": "dev",
            "product": "policy",
            "product-area": "devsecops"
        })
    }

    #[test]
    fn reports_taggable_resource_without_tags() {
        let violations = run(TagPolicyOptions::default(), "aws:s3/bucket:Bucket", json!({}));

        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("does not have any tags"));
        assert_eq!(violations[0].policy, POLICY_NAME);
    }

    #[test]
    fn reports_each_missing_required_tag() {
        let violations = run(
            TagPolicyOptions::default(),
            "aws:s3/bucket:Bucket",
            json!({ "tags": { "application": "test", "environment": "dev" } }),
        );

        let missing: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(missing.len(), 3);
        assert!(missing.iter().any(|m| m.ends_with("'cost-center'")));
        assert!(missing.iter().any(|m| m.ends_with("'product'")));
        assert!(missing.iter().any(|m| m.ends_with("'product-area'")));
    }

    #[test]
    fn fully_tagged_bucket_passes() {
        let violations = run(
            TagPolicyOptions::default(),
            "aws:s3/bucket:Bucket",
            json!({ "tags": complete_tags() }),
        );

        assert!(violations.is_empty());
    }

    #[test]
    fn ec2_resources_also_need_time_tags() {
        let violations = run(
            TagPolicyOptions::default(),
            "aws:ec2/instance:Instance",
            json!({ "tags": complete_tags() }),
        );

        assert_eq!(violations.len(), 2);
        assert!(violations[0].message.contains("'backup-by'"));
        assert!(violations[1].message.contains("'delete-after'"));
    }

    #[test]
    fn stack_tags_are_checked_only_when_enabled() {
        let options = TagPolicyOptions {
            check_stack_tags: true,
            ..TagPolicyOptions::default()
        };

        let violations = run(options, "aws:s3/bucket:Bucket", json!({ "tags": complete_tags() }));

        assert_eq!(violations.len(), 2);
        assert!(violations.iter().all(|v| v.level == EnforcementLevel::Advisory));
    }

    #[test]
    fn untaggable_resources_are_ignored() {
        let violations = run(
            TagPolicyOptions::default(),
            "aws:s3/bucketPolicy:BucketPolicy",
            json!({}),
        );

        assert!(violations.is_empty());
    }
}
