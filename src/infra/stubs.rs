use std::time::Duration;

use async_trait::async_trait;

use crate::{
    domain::error::LookupError,
    usecases::region_lookup::{GetRegionArgs, InvokeOptions, RegionLookup, RegionResult},
};

#[cfg(test)]
use crate::infra::{config::AppConfig, contracts::ConfigAdapter};

#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct StubConfigAdapter;

#[cfg(test)]
impl ConfigAdapter for StubConfigAdapter {
    fn load(&self) -> anyhow::Result<AppConfig> {
        Ok(AppConfig::default())
    }
}

/// Answers every lookup with a fixed region, optionally after a delay.
#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Clone)]
pub struct StaticRegionLookup {
    region: String,
    delay: Option<Duration>,
}

#[cfg_attr(not(test), allow(dead_code))]
impl StaticRegionLookup {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl RegionLookup for StaticRegionLookup {
    async fn get_region(
        &self,
        args: GetRegionArgs,
        _options: InvokeOptions,
    ) -> Result<RegionResult, LookupError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        Ok(RegionResult::for_name(
            args.name.as_deref().unwrap_or(&self.region),
        ))
    }
}

#[cfg(test)]
#[derive(Debug, Clone)]
pub struct FailingRegionLookup {
    error: LookupError,
}

#[cfg(test)]
impl FailingRegionLookup {
    pub fn new(error: LookupError) -> Self {
        Self { error }
    }
}

#[cfg(test)]
#[async_trait]
impl RegionLookup for FailingRegionLookup {
    async fn get_region(
        &self,
        _args: GetRegionArgs,
        _options: InvokeOptions,
    ) -> Result<RegionResult, LookupError> {
        Err(self.error.clone())
    }
}
