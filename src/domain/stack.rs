//! Construction-time registry for one stack evaluation.
//!
//! A [`StackBuilder`] is passed explicitly into stack definitions; nothing is
//! registered through global state. [`StackBuilder::finish`] hands back the
//! [`DeclarationSet`] the engine enumerates.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::domain::{
    deferred::{Deferred, Resolver},
    error::StackError,
    resource::{LogicalName, ResourceArgs, ResourceDeclaration, ResourceHandle, Urn},
};

/// Identity of the stack being evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackContext {
    pub project: String,
    pub stack: String,
}

impl StackContext {
    pub fn new(project: impl Into<String>, stack: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            stack: stack.into(),
        }
    }
}

/// A named, externally readable handle to a deferred value.
#[derive(Debug, Clone)]
pub struct OutputBinding {
    name: String,
    value: Deferred<Value>,
}

impl OutputBinding {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Deferred<Value> {
        &self.value
    }

    /// Reads the resolved value. Never falls back to a default: an output the
    /// engine has not resolved yet is an error.
    pub fn read(&self) -> Result<Value, StackError> {
        match self.value.try_get() {
            None => Err(StackError::UnresolvedOutput {
                name: self.name.clone(),
            }),
            Some(Ok(value)) => Ok(value),
            Some(Err(source)) => Err(StackError::OutputFailed {
                name: self.name.clone(),
                source,
            }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OutputSet {
    bindings: Vec<OutputBinding>,
}

impl OutputSet {
    pub fn get(&self, name: &str) -> Option<&OutputBinding> {
        self.bindings.iter().find(|binding| binding.name == name)
    }

    pub fn read(&self, name: &str) -> Result<Value, StackError> {
        self.get(name)
            .ok_or_else(|| StackError::UnknownOutput {
                name: name.to_owned(),
            })?
            .read()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutputBinding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[derive(Debug)]
pub struct StackBuilder {
    context: StackContext,
    resources: Vec<ResourceDeclaration>,
    id_resolvers: BTreeMap<LogicalName, Resolver<String>>,
    outputs: OutputSet,
}

impl StackBuilder {
    pub fn new(context: StackContext) -> Self {
        Self {
            context,
            resources: Vec::new(),
            id_resolvers: BTreeMap::new(),
            outputs: OutputSet::default(),
        }
    }

    /// Registers a resource declaration. Deferred properties are stored as-is.
    pub fn declare<A: ResourceArgs>(
        &mut self,
        name: &str,
        args: A,
    ) -> Result<ResourceHandle, StackError> {
        let name = LogicalName::new(name)?;
        if self.id_resolvers.contains_key(&name) {
            return Err(StackError::resource_config(
                name.as_str(),
                "logical name is already declared in this stack",
            ));
        }

        let resource_type = args.resource_type();
        let urn = Urn::new(&self.context, &resource_type, &name);
        let (resolver, id) = Deferred::pending(format!("{name}.id"));
        let declaration =
            ResourceDeclaration::new(name.clone(), resource_type, urn, args.into_properties(), id);

        tracing::debug!(
            urn = %declaration.urn,
            properties = declaration.properties.len(),
            "resource declared"
        );

        let handle = declaration.handle();
        self.id_resolvers.insert(name, resolver);
        self.resources.push(declaration);

        Ok(handle)
    }

    /// Registers a named output. Each name can be exported once.
    pub fn export<T>(&mut self, name: &str, value: Deferred<T>) -> Result<OutputBinding, StackError>
    where
        T: Serialize + Clone + Send + Sync + 'static,
    {
        let name = name.trim();
        if name.is_empty() {
            return Err(StackError::output_config(name, "output name must not be empty"));
        }
        if self.outputs.get(name).is_some() {
            return Err(StackError::output_config(name, "output is already exported"));
        }

        let binding = OutputBinding {
            name: name.to_owned(),
            value: value.to_json(),
        };

        tracing::debug!(output = name, source = binding.value.label(), "output exported");

        self.outputs.bindings.push(binding.clone());
        Ok(binding)
    }

    pub fn finish(self) -> DeclarationSet {
        DeclarationSet {
            context: self.context,
            resources: self.resources,
            id_resolvers: self.id_resolvers,
            outputs: self.outputs,
        }
    }
}

/// Everything a stack declared, ready for an engine.
#[derive(Debug)]
pub struct DeclarationSet {
    context: StackContext,
    resources: Vec<ResourceDeclaration>,
    id_resolvers: BTreeMap<LogicalName, Resolver<String>>,
    outputs: OutputSet,
}

/// Owned pieces of a [`DeclarationSet`] for engines that consume it.
#[derive(Debug)]
pub struct DeclarationParts {
    pub context: StackContext,
    pub resources: Vec<ResourceDeclaration>,
    pub id_resolvers: BTreeMap<LogicalName, Resolver<String>>,
    pub outputs: OutputSet,
}

impl DeclarationSet {
    pub fn context(&self) -> &StackContext {
        &self.context
    }

    pub fn resources(&self) -> &[ResourceDeclaration] {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut [ResourceDeclaration] {
        &mut self.resources
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn resource(&self, name: &str) -> Option<&ResourceDeclaration> {
        self.resources
            .iter()
            .find(|resource| resource.name.as_str() == name)
    }

    pub fn outputs(&self) -> &OutputSet {
        &self.outputs
    }

    pub fn into_parts(self) -> DeclarationParts {
        DeclarationParts {
            context: self.context,
            resources: self.resources,
            id_resolvers: self.id_resolvers,
            outputs: self.outputs,
        }
    }
}
