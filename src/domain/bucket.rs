use crate::domain::{
    property::{PropertyBag, PropertyValue},
    resource::ResourceArgs,
};

pub const BUCKET_TYPE: &str = "aws:s3/bucket:Bucket";

/// Arguments of an S3 bucket. Unset fields are left to the provider's defaults.
#[derive(Debug, Clone, Default)]
pub struct BucketArgs {
    /// Physical bucket name; auto-named from the logical name when unset.
    pub bucket: Option<String>,
    pub acl: Option<String>,
    pub force_destroy: Option<bool>,
    pub tags: PropertyBag,
}

impl ResourceArgs for BucketArgs {
    fn resource_type(&self) -> String {
        BUCKET_TYPE.to_owned()
    }

    fn into_properties(self) -> PropertyBag {
        let mut properties = PropertyBag::new();

        if let Some(bucket) = self.bucket {
            properties.insert("bucket".to_owned(), bucket.into());
        }
        if let Some(acl) = self.acl {
            properties.insert("acl".to_owned(), acl.into());
        }
        if let Some(force_destroy) = self.force_destroy {
            properties.insert("forceDestroy".to_owned(), force_destroy.into());
        }
        if !self.tags.is_empty() {
            properties.insert("tags".to_owned(), PropertyValue::Map(self.tags));
        }

        properties
    }
}
