use anyhow::{Context, Result};
use colored::Colorize;

use super::CommandContext;
use crate::graphql::Operation;

pub fn handle_run(
    ctx: CommandContext,
    query: String,
    variables: Option<String>,
    operation_name: Option<String>,
) -> Result<()> {
    let pipeline = ctx.build_pipeline()?;

    let mut operation = Operation::new(query);
    if let Some(v) = variables {
        let vars: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&v).context("--variables must be a JSON object")?;
        operation = operation.with_variables(vars);
    }
    if let Some(name) = operation_name {
        operation = operation.with_operation_name(name);
    }

    let outcome = tokio::runtime::Runtime::new()?.block_on(pipeline.run(operation));

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if !outcome.is_executed() {
        anyhow::bail!("Operation rejected ({})", outcome.kind());
    }
    if !outcome.errors().is_empty() {
        eprintln!(
            "{} {} execution error(s)",
            "Warning:".yellow(),
            outcome.errors().len()
        );
    }
    Ok(())
}
