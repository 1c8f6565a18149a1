use std::{collections::BTreeMap, sync::Arc};

use anyhow::Result;
use serde_json::Value;

use crate::{
    cli::{Cli, Command},
    domain::{self, error::StackError, policy::PolicyViolation, stack::OutputSet},
    infra::{self, error::AppError, local_engine::LocalEngine},
    usecases::{
        self, bootstrap,
        bucket_stack::BucketStack,
        context::AppContext,
        contracts::{ProvisioningEngine, StackDefinition},
        engine::{ApplyReport, EngineError},
        evaluate::{evaluate, preview_document},
        tag_policy::tagging_policy_pack,
    },
};

const POLICY_CHECK_FAILED: &str = "POLICY_CHECK_FAILED";

pub fn run(cli: Cli) -> Result<()> {
    let context = bootstrap::bootstrap(cli.config.as_deref())?;

    tracing::debug!(
        domain = domain::module_name(),
        usecases = usecases::module_name(),
        infra = infra::module_name(),
        "module boundaries loaded"
    );

    let definition = BucketStack::new(Arc::clone(&context.region_lookup));

    match cli.command_or_default() {
        Command::Preview => {
            let declarations =
                evaluate(&definition, context.stack_context(), &context.auto_tags())?;
            print_json(&preview_document(&declarations))?;
        }
        Command::Up => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(AppError::Runtime)?;

            match runtime.block_on(apply_stack(&context, &definition)) {
                Ok(applied) => {
                    for line in violation_lines(&applied.report.violations) {
                        eprintln!("{line}");
                    }
                    print_json(&serde_json::to_value(&applied.outputs)?)?;
                }
                Err(EngineError::PolicyViolations { urn, violations }) => {
                    tracing::error!(
                        code = POLICY_CHECK_FAILED,
                        urn = %urn,
                        count = violations.len(),
                        "mandatory policy violations block provisioning"
                    );
                    for line in violation_lines(&violations) {
                        eprintln!("{line}");
                    }
                    anyhow::bail!("{POLICY_CHECK_FAILED}: resource '{urn}' is not compliant");
                }
                Err(error) => return Err(error.into()),
            }
        }
    }

    Ok(())
}

#[derive(Debug)]
struct AppliedStack {
    report: ApplyReport,
    outputs: BTreeMap<String, Value>,
}

async fn apply_stack(
    context: &AppContext,
    definition: &dyn StackDefinition,
) -> Result<AppliedStack, EngineError> {
    let declarations = evaluate(definition, context.stack_context(), &context.auto_tags())?;
    let outputs = declarations.outputs().clone();
    let engine =
        LocalEngine::new().with_policy_pack(tagging_policy_pack(context.tag_policy_options()));

    let report = engine.apply(declarations).await?;
    let outputs = read_outputs(&outputs)?;

    Ok(AppliedStack { report, outputs })
}

/// Reads every output binding the way an external host would.
fn read_outputs(outputs: &OutputSet) -> Result<BTreeMap<String, Value>, StackError> {
    outputs
        .iter()
        .map(|binding| {
            let value = outputs.read(binding.name())?;
            Ok::<_, StackError>((binding.name().to_owned(), value))
        })
        .collect()
}

fn violation_lines(violations: &[PolicyViolation]) -> Vec<String> {
    violations
        .iter()
        .map(|violation| {
            format!(
                "[{level}] {policy}: {message}",
                level = violation.level.as_label(),
                policy = violation.policy,
                message = violation.message
            )
        })
        .collect()
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
