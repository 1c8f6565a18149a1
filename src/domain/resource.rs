use std::fmt;

use crate::domain::{
    deferred::Deferred,
    error::StackError,
    property::{PropertyBag, PropertyValue},
    stack::StackContext,
};

/// Non-empty name of a resource, unique within one stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogicalName(String);

impl LogicalName {
    pub fn new(name: &str) -> Result<Self, StackError> {
        if name.trim().is_empty() {
            return Err(StackError::resource_config(
                name,
                "logical name must not be empty",
            ));
        }

        Ok(Self(name.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable resource identity: `urn:pulumi:<stack>::<project>::<type>::<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Urn(String);

impl Urn {
    pub fn new(context: &StackContext, resource_type: &str, name: &LogicalName) -> Self {
        Self(format!(
            "urn:pulumi:{stack}::{project}::{resource_type}::{name}",
            stack = context.stack,
            project = context.project,
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Typed arguments for one kind of resource.
pub trait ResourceArgs {
    fn resource_type(&self) -> String;
    fn into_properties(self) -> PropertyBag;
}

/// Arguments for resource types without a typed wrapper.
#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Clone)]
pub struct RawResourceArgs {
    pub resource_type: String,
    pub properties: PropertyBag,
}

impl ResourceArgs for RawResourceArgs {
    fn resource_type(&self) -> String {
        self.resource_type.clone()
    }

    fn into_properties(self) -> PropertyBag {
        self.properties
    }
}

/// One desired cloud object as declared by a stack.
#[derive(Debug, Clone)]
pub struct ResourceDeclaration {
    pub name: LogicalName,
    pub resource_type: String,
    pub urn: Urn,
    pub properties: PropertyBag,
    id: Deferred<String>,
}

impl ResourceDeclaration {
    pub(crate) fn new(
        name: LogicalName,
        resource_type: String,
        urn: Urn,
        properties: PropertyBag,
        id: Deferred<String>,
    ) -> Self {
        Self {
            name,
            resource_type,
            urn,
            properties,
            id,
        }
    }

    /// Provider-assigned identifier; pending until the engine provisions the resource.
    pub fn id(&self) -> Deferred<String> {
        self.id.clone()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn property(&self, path: &str) -> Option<&PropertyValue> {
        crate::domain::property::lookup_path(&self.properties, path)
    }

    pub fn handle(&self) -> ResourceHandle {
        ResourceHandle {
            name: self.name.clone(),
            urn: self.urn.clone(),
            id: self.id.clone(),
        }
    }
}

/// Cheap reference to a declared resource, handed back to the declaring code.
#[derive(Debug, Clone)]
pub struct ResourceHandle {
    pub name: LogicalName,
    pub urn: Urn,
    id: Deferred<String>,
}

impl ResourceHandle {
    pub fn id(&self) -> Deferred<String> {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_blank_names() {
        assert!(matches!(
            LogicalName::new(""),
            Err(StackError::Configuration { .. })
        ));
        assert!(matches!(
            LogicalName::new("   "),
            Err(StackError::Configuration { .. })
        ));
    }

    #[test]
    fn urn_joins_stack_project_type_and_name() {
        let context = StackContext::new("test-cs", "dev");
        let name = LogicalName::new("my-bucket").expect("name is valid");

        let urn = Urn::new(&context, "aws:s3/bucket:Bucket", &name);

        assert_eq!(
            urn.as_str(),
            "urn:pulumi:dev::test-cs::aws:s3/bucket:Bucket::my-bucket"
        );
    }
}
