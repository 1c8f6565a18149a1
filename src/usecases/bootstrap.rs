use std::{path::Path, sync::Arc, time::Duration};

use crate::{
    infra::{
        self, config::FileConfigAdapter, contracts::ConfigAdapter, error::AppError,
        region::EnvRegionLookup,
    },
    usecases::context::AppContext,
};

pub fn bootstrap(config_path: Option<&Path>) -> Result<AppContext, AppError> {
    let context = build_context(config_path)?;
    infra::logging::init(&context.config.logging)?;

    Ok(context)
}

fn build_context(config_path: Option<&Path>) -> Result<AppContext, AppError> {
    let config_adapter = FileConfigAdapter::new(config_path);
    let config = config_adapter.load().map_err(AppError::Other)?;
    let mut region_lookup = EnvRegionLookup::from_process_env(config.region.default.clone());
    if let Some(delay_ms) = config.region.lookup_delay_ms {
        region_lookup = region_lookup.with_delay(Duration::from_millis(delay_ms));
    }

    Ok(AppContext::new(config, Arc::new(region_lookup)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_context_with_default_config_when_file_is_missing() {
        let context = build_context(Some(Path::new("./missing-config.toml")))
            .expect("context should build from defaults");

        assert_eq!(context.config, crate::infra::config::AppConfig::default());
        assert_eq!(context.stack_context().stack, "dev");
    }

    #[test]
    fn context_derives_auto_tags_from_stack_settings() {
        let context = build_context(Some(Path::new("./missing-config.toml")))
            .expect("context should build from defaults");

        let tags = context.auto_tags();

        assert_eq!(tags.len(), 3);
    }

    #[test]
    fn region_lookup_delay_is_read_from_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("stackform.toml");
        std::fs::write(&path, "[region]\ndefault = \"us-west-2\"\nlookup_delay_ms = 500\n")
            .expect("config written");

        let context = build_context(Some(&path)).expect("context should build");

        assert_eq!(context.config.region.lookup_delay_ms, Some(500));
        assert!(format!("{:?}", context.region_lookup).contains("500ms"));
    }
}
