use std::{fmt, time::Duration};

use async_trait::async_trait;
use aws_config::{meta::region::RegionProviderChain, Region};

use crate::{
    domain::error::LookupError,
    usecases::region_lookup::{GetRegionArgs, InvokeOptions, RegionLookup, RegionResult},
};

/// Resolves the provider region through the AWS region provider chain
/// (environment, shared config profile, instance metadata), falling back to
/// the configured default.
pub struct EnvRegionLookup {
    chain: RegionProviderChain,
    delay: Option<Duration>,
}

impl EnvRegionLookup {
    pub fn from_process_env(default: Option<String>) -> Self {
        Self::with_fallback(RegionProviderChain::default_provider(), default)
    }

    /// Tries `chain` first, then `default`. Blank defaults count as unset.
    pub fn with_fallback(chain: RegionProviderChain, default: Option<String>) -> Self {
        let default = default
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .map(Region::new);

        Self {
            chain: chain.or_else(default),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn configured_region(&self) -> Option<String> {
        self.chain.region().await.map(|region| region.to_string())
    }
}

impl fmt::Debug for EnvRegionLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvRegionLookup")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RegionLookup for EnvRegionLookup {
    async fn get_region(
        &self,
        args: GetRegionArgs,
        options: InvokeOptions,
    ) -> Result<RegionResult, LookupError> {
        if let Some(provider) = options.provider.as_deref() {
            tracing::debug!(provider, "explicit provider ignored by environment lookup");
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let name = match args.name {
            Some(name) => name,
            None => self
                .configured_region()
                .await
                .ok_or(LookupError::NotConfigured)?,
        };

        if !is_region_name(&name) {
            return Err(LookupError::Rejected {
                reason: format!("'{name}' is not a valid region name"),
            });
        }

        tracing::debug!(region = %name, "region resolved");
        Ok(RegionResult::for_name(&name))
    }
}

/// `us-west-2`, `us-gov-east-1`, `ap-southeast-2`: lowercase segments ending in a number.
fn is_region_name(name: &str) -> bool {
    let segments: Vec<&str> = name.split('-').collect();
    let Some((last, rest)) = segments.split_last() else {
        return false;
    };

    rest.len() >= 2
        && rest
            .iter()
            .all(|segment| !segment.is_empty() && segment.chars().all(|c| c.is_ascii_lowercase()))
        && !last.is_empty()
        && last.chars().all(|c| c.is_ascii_digit())
}
