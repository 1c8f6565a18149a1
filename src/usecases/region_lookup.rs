//! Region lookup invoke: the one asynchronous call a stack makes while declaring.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{
    deferred::Deferred,
    error::{DeferredError, LookupError},
};

pub const GET_REGION_TOKEN: &str = "aws:index/getRegion:getRegion";

const KNOWN_REGIONS: [(&str, &str); 8] = [
    ("us-east-1", "US East (N. Virginia)"),
    ("us-east-2", "US East (Ohio)"),
    ("us-west-1", "US West (N. California)"),
    ("us-west-2", "US West (Oregon)"),
    ("eu-west-1", "Europe (Ireland)"),
    ("eu-central-1", "Europe (Frankfurt)"),
    ("ap-southeast-2", "Asia Pacific (Sydney)"),
    ("ap-northeast-1", "Asia Pacific (Tokyo)"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetRegionArgs {
    /// Region to describe; the provider's configured region when unset.
    pub name: Option<String>,
}

/// Provider connection overrides; nothing else is recognised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvokeOptions {
    /// URN of an explicit provider resource to route the call through.
    pub provider: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionResult {
    pub name: String,
    pub description: String,
    pub endpoint: String,
    pub id: String,
}

impl RegionResult {
    pub fn for_name(name: &str) -> Self {
        let description = KNOWN_REGIONS
            .iter()
            .find(|(code, _)| *code == name)
            .map(|(_, description)| (*description).to_owned())
            .unwrap_or_else(|| name.to_owned());

        Self {
            name: name.to_owned(),
            description,
            endpoint: format!("ec2.{name}.amazonaws.com"),
            id: name.to_owned(),
        }
    }
}

#[async_trait]
pub trait RegionLookup: Send + Sync + fmt::Debug {
    async fn get_region(
        &self,
        args: GetRegionArgs,
        options: InvokeOptions,
    ) -> Result<RegionResult, LookupError>;
}

/// Starts a region lookup and returns its result as a [`Deferred`].
///
/// Nothing is awaited here: the call runs when the engine drives the
/// deferred, so declaring code never waits on lookup latency.
pub fn invoke_region_lookup(
    lookup: Arc<dyn RegionLookup>,
    args: GetRegionArgs,
    options: Option<InvokeOptions>,
) -> Deferred<RegionResult> {
    let options = options.unwrap_or_default();
    tracing::debug!(
        token = GET_REGION_TOKEN,
        provider = options.provider.as_deref().unwrap_or("default"),
        "region lookup scheduled"
    );

    Deferred::from_future(GET_REGION_TOKEN, async move {
        lookup
            .get_region(args, options)
            .await
            .map_err(|source| DeferredError::Lookup {
                label: GET_REGION_TOKEN.to_owned(),
                source,
            })
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Default)]
    struct RecordingLookup {
        captured: Mutex<Option<(GetRegionArgs, InvokeOptions)>>,
    }

    #[async_trait]
    impl RegionLookup for RecordingLookup {
        async fn get_region(
            &self,
            args: GetRegionArgs,
            options: InvokeOptions,
        ) -> Result<RegionResult, LookupError> {
            let name = args.name.clone().unwrap_or_else(|| "us-east-1".to_owned());
            *self.captured.lock().expect("capture lock") = Some((args, options));
            Ok(RegionResult::for_name(&name))
        }
    }

    #[test]
    fn describes_known_and_unknown_regions() {
        let oregon = RegionResult::for_name("us-west-2");
        let custom = RegionResult::for_name("xx-test-9");

        assert_eq!(oregon.description, "US West (Oregon)");
        assert_eq!(oregon.endpoint, "ec2.us-west-2.amazonaws.com");
        assert_eq!(custom.description, "xx-test-9");
    }

    #[tokio::test]
    async fn invoke_is_lazy_and_forwards_arguments() {
        let lookup = Arc::new(RecordingLookup::default());
        let options = InvokeOptions {
            provider: Some("urn:pulumi:dev::p::pulumi:providers:aws::west".to_owned()),
            version: None,
        };

        let deferred = invoke_region_lookup(
            lookup.clone(),
            GetRegionArgs {
                name: Some("eu-west-1".to_owned()),
            },
            Some(options.clone()),
        );

        assert!(lookup.captured.lock().expect("capture lock").is_none());

        let region = deferred.resolve().await.expect("lookup succeeds");

        assert_eq!(region.name, "eu-west-1");
        let captured = lookup.captured.lock().expect("capture lock").clone();
        assert_eq!(captured.map(|(_, opts)| opts), Some(options));
    }
}
