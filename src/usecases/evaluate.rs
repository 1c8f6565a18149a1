use serde_json::{json, Value};

use crate::{
    domain::{
        error::StackError,
        property::preview_bag,
        stack::{DeclarationSet, StackBuilder, StackContext},
    },
    usecases::{auto_tag::AutoTags, contracts::StackDefinition},
};

/// Runs one stack definition against a fresh registry and applies the
/// stack-wide auto tags. No deferred value is driven here.
pub fn evaluate(
    definition: &dyn StackDefinition,
    context: StackContext,
    auto_tags: &AutoTags,
) -> Result<DeclarationSet, StackError> {
    let mut stack = StackBuilder::new(context);
    definition.declare(&mut stack)?;

    let mut declarations = stack.finish();
    let tagged = auto_tags.apply(&mut declarations);

    tracing::info!(
        definition = definition.name(),
        project = %declarations.context().project,
        stack = %declarations.context().stack,
        resources = declarations.resources().len(),
        outputs = declarations.outputs().len(),
        auto_tagged = tagged,
        "stack evaluated"
    );

    Ok(declarations)
}

/// Renders a declaration set for humans without resolving anything.
pub fn preview_document(declarations: &DeclarationSet) -> Value {
    let resources: Vec<Value> = declarations
        .resources()
        .iter()
        .map(|resource| {
            let id = resource.id();
            json!({
                "urn": resource.urn.as_str(),
                "type": resource.resource_type,
                "name": resource.name.as_str(),
                "id": format!("<deferred: {}>", id.label()),
                "properties": Value::Object(preview_bag(&resource.properties)),
            })
        })
        .collect();

    let outputs: serde_json::Map<String, Value> = declarations
        .outputs()
        .iter()
        .map(|binding| {
            (
                binding.name().to_owned(),
                Value::String(format!("<deferred: {}>", binding.value().label())),
            )
        })
        .collect();

    json!({
        "project": declarations.context().project,
        "stack": declarations.context().stack,
        "resources": resources,
        "outputs": outputs,
    })
}
