//! The bucket stack: one S3 bucket tagged with the region it lives in, and its
//! identifier exported as `BucketName`.

use std::sync::Arc;

use crate::{
    domain::{
        bucket::BucketArgs,
        error::StackError,
        property::PropertyValue,
        resource::ResourceHandle,
        stack::{OutputBinding, StackBuilder},
    },
    usecases::{
        contracts::StackDefinition,
        region_lookup::{invoke_region_lookup, GetRegionArgs, InvokeOptions, RegionLookup},
    },
};

pub const BUCKET_LOGICAL_NAME: &str = "my-bucket";
pub const DATA_CENTER_TAG: &str = "data-center";
pub const BUCKET_NAME_OUTPUT: &str = "BucketName";

#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Clone)]
pub struct BucketStackOutputs {
    pub bucket: ResourceHandle,
    pub bucket_name: OutputBinding,
}

#[derive(Debug, Clone)]
pub struct BucketStack {
    lookup: Arc<dyn RegionLookup>,
}

impl BucketStack {
    pub fn new(lookup: Arc<dyn RegionLookup>) -> Self {
        Self { lookup }
    }

    pub fn declare_bucket(&self, stack: &mut StackBuilder) -> Result<BucketStackOutputs, StackError> {
        let region = invoke_region_lookup(Arc::clone(&self.lookup), GetRegionArgs::default(), None);

        let mut args = BucketArgs::default();
        args.tags.insert(
            DATA_CENTER_TAG.to_owned(),
            PropertyValue::Deferred(region.map(|region| region.name).to_json()),
        );

        let bucket = stack.declare(BUCKET_LOGICAL_NAME, args)?;
        let bucket_name = stack.export(BUCKET_NAME_OUTPUT, bucket.id())?;

        Ok(BucketStackOutputs {
            bucket,
            bucket_name,
        })
    }
}

impl StackDefinition for BucketStack {
    fn name(&self) -> &str {
        "bucket"
    }

    fn declare(&self, stack: &mut StackBuilder) -> Result<(), StackError> {
        self.declare_bucket(stack).map(|_| ())
    }
}

/// Variant that awaits the region lookup before declaring the bucket.
///
/// Construction takes at least as long as the lookup, and lookup failures
/// surface here instead of at resolution time. Not used by any command; it is
/// kept to pin down that difference in tests.
#[cfg_attr(not(test), allow(dead_code))]
pub async fn declare_bucket_stack_blocking(
    lookup: &dyn RegionLookup,
    stack: &mut StackBuilder,
) -> Result<BucketStackOutputs, StackError> {
    let region = lookup
        .get_region(GetRegionArgs::default(), InvokeOptions::default())
        .await
        .map_err(|source| StackError::Lookup {
            resource: BUCKET_LOGICAL_NAME.to_owned(),
            property: format!("tags.{DATA_CENTER_TAG}"),
            source,
        })?;

    let mut args = BucketArgs::default();
    args.tags
        .insert(DATA_CENTER_TAG.to_owned(), region.name.into());

    let bucket = stack.declare(BUCKET_LOGICAL_NAME, args)?;
    let bucket_name = stack.export(BUCKET_NAME_OUTPUT, bucket.id())?;

    Ok(BucketStackOutputs {
        bucket,
        bucket_name,
    })
}
