//! Stack-wide tags merged into every taggable resource before hand-off.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::domain::{
    property::{PropertyBag, PropertyValue},
    stack::{DeclarationSet, StackContext},
    taggable::is_taggable,
};

const TAGS_PROPERTY: &str = "tags";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoTags {
    tags: BTreeMap<String, String>,
}

impl AutoTags {
    /// Stack identity tags plus the configured extras; configured values win.
    pub fn for_stack(context: &StackContext, extra: &BTreeMap<String, String>) -> Self {
        let mut tags = BTreeMap::new();
        tags.insert("user:Project".to_owned(), context.project.clone());
        tags.insert("user:Stack".to_owned(), context.stack.clone());
        tags.insert("environment".to_owned(), context.stack.clone());
        tags.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));

        Self { tags }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Merges the auto tags into each taggable resource. Same-named keys are
    /// overwritten; other existing tags are kept. Returns how many resources
    /// were tagged.
    pub fn apply(&self, declarations: &mut DeclarationSet) -> usize {
        if self.tags.is_empty() {
            return 0;
        }

        let mut tagged = 0;
        for resource in declarations.resources_mut() {
            if !is_taggable(&resource.resource_type) {
                continue;
            }

            let merged = match resource.properties.remove(TAGS_PROPERTY) {
                None | Some(PropertyValue::Null) => PropertyValue::Map(self.as_bag()),
                Some(PropertyValue::Map(mut existing)) => {
                    existing.extend(self.as_bag());
                    PropertyValue::Map(existing)
                }
                Some(PropertyValue::Deferred(deferred)) => {
                    let tags = self.tags.clone();
                    let urn = resource.urn.to_string();
                    PropertyValue::Deferred(
                        deferred.map(move |value| merge_json(value, &tags, &urn)),
                    )
                }
                Some(other) => {
                    tracing::warn!(
                        urn = %resource.urn,
                        "tags property is not a map; auto tags skipped"
                    );
                    resource
                        .properties
                        .insert(TAGS_PROPERTY.to_owned(), other);
                    continue;
                }
            };

            resource
                .properties
                .insert(TAGS_PROPERTY.to_owned(), merged);
            tagged += 1;
        }

        tracing::debug!(tags = self.tags.len(), resources = tagged, "auto tags applied");
        tagged
    }

    fn as_bag(&self) -> PropertyBag {
        self.tags
            .iter()
            .map(|(key, value)| (key.clone(), PropertyValue::from(value.clone())))
            .collect()
    }
}

/// Same rules as the concrete merge: null counts as no tags, anything other
/// than an object is kept untouched.
fn merge_json(value: Value, tags: &BTreeMap<String, String>, urn: &str) -> Value {
    let mut object = match value {
        Value::Object(object) => object,
        Value::Null => serde_json::Map::new(),
        other => {
            tracing::warn!(urn, "resolved tags property is not a map; auto tags skipped");
            return other;
        }
    };
    for (key, tag) in tags {
        object.insert(key.clone(), Value::String(tag.clone()));
    }

    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::{
        bucket::BucketArgs,
        deferred::Deferred,
        property::preview_bag,
        resource::RawResourceArgs,
        stack::StackBuilder,
    };

    fn context() -> StackContext {
        StackContext::new("test2", "dev")
    }

    fn extra() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("application".to_owned(), "test".to_owned()),
            ("cost-center".to_owned(), "390".to_owned()),
        ])
    }

    #[test]
    fn includes_stack_identity_tags() {
        let tags = AutoTags::for_stack(&context(), &BTreeMap::new());

        assert_eq!(tags.len(), 3);
        assert_eq!(tags.tags.get("user:Project").map(String::as_str), Some("test2"));
        assert_eq!(tags.tags.get("environment").map(String::as_str), Some("dev"));
    }

    #[test]
    fn merges_into_existing_tags_and_overrides_same_keys() {
        let mut stack = StackBuilder::new(context());
        let mut args = BucketArgs::default();
        args.tags.insert("product".to_owned(), "policy".into());
        args.tags.insert("application".to_owned(), "legacy".into());
        stack.declare("my-bucket", args).expect("declaration succeeds");
        let mut set = stack.finish();

        let tagged = AutoTags::for_stack(&context(), &extra()).apply(&mut set);

        let bucket = set.resource("my-bucket").expect("bucket exists");
        assert_eq!(tagged, 1);
        assert_eq!(
            serde_json::Value::Object(preview_bag(&bucket.properties)),
            json!({
                "tags": {
                    "application": "test",
                    "cost-center": "390",
                    "environment": "dev",
                    "product": "policy",
                    "user:Project": "test2",
                    "user:Stack": "dev"
                }
            })
        );
    }

    #[test]
    fn adds_tags_to_untagged_resources_and_skips_untaggable_ones() {
        let mut stack = StackBuilder::new(context());
        stack
            .declare("my-bucket", BucketArgs::default())
            .expect("bucket declared");
        stack
            .declare(
                "policy",
                RawResourceArgs {
                    resource_type: "aws:s3/bucketPolicy:BucketPolicy".to_owned(),
                    properties: PropertyBag::new(),
                },
            )
            .expect("policy declared");
        let mut set = stack.finish();

        let tagged = AutoTags::for_stack(&context(), &BTreeMap::new()).apply(&mut set);

        assert_eq!(tagged, 1);
        assert!(set
            .resource("my-bucket")
            .and_then(|r| r.property("tags.user:Stack"))
            .is_some());
        assert!(set
            .resource("policy")
            .expect("policy exists")
            .properties
            .is_empty());
    }

    #[tokio::test]
    async fn wraps_deferred_tag_maps_without_resolving_them() {
        let (resolver, tags) = Deferred::<serde_json::Value>::pending("tags-from-lookup");
        let mut properties = PropertyBag::new();
        properties.insert("tags".to_owned(), tags.into());
        let mut stack = StackBuilder::new(context());
        stack
            .declare(
                "vol",
                RawResourceArgs {
                    resource_type: "aws:ebs/volume:Volume".to_owned(),
                    properties,
                },
            )
            .expect("volume declared");
        let mut set = stack.finish();

        AutoTags::for_stack(&context(), &BTreeMap::new()).apply(&mut set);
        let merged = set
            .resource("vol")
            .and_then(|r| r.property("tags"))
            .and_then(PropertyValue::as_deferred)
            .cloned()
            .expect("tags stay deferred");
        assert!(merged.try_get().is_none());

        resolver.resolve(json!({ "owner": "ops" }));
        let value = merged.resolve().await.expect("merged tags resolve");

        assert_eq!(value["owner"], "ops");
        assert_eq!(value["user:Project"], "test2");
    }

    #[tokio::test]
    async fn deferred_tags_that_resolve_to_a_non_map_are_kept() {
        let tags = Deferred::from_future("tags-from-lookup", async {
            Ok::<_, crate::domain::error::DeferredError>(json!("owner=ops"))
        });
        let mut properties = PropertyBag::new();
        properties.insert("tags".to_owned(), tags.into());
        let mut stack = StackBuilder::new(context());
        stack
            .declare(
                "vol",
                RawResourceArgs {
                    resource_type: "aws:ebs/volume:Volume".to_owned(),
                    properties,
                },
            )
            .expect("volume declared");
        let mut set = stack.finish();

        AutoTags::for_stack(&context(), &extra()).apply(&mut set);
        let merged = set
            .resource("vol")
            .and_then(|r| r.property("tags"))
            .and_then(PropertyValue::as_deferred)
            .cloned()
            .expect("tags stay deferred");

        assert_eq!(merged.resolve().await, Ok(json!("owner=ops")));
    }

    #[test]
    fn null_deferred_tags_become_the_auto_tags() {
        let merged = merge_json(serde_json::Value::Null, &extra(), "urn:test");

        assert_eq!(merged, json!({ "application": "test", "cost-center": "390" }));
    }
}
