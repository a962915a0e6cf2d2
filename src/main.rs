use anyhow::Result;
use clap::Parser;

use shelf::cli::handlers::{CommandContext, handle_run, handle_schema, handle_serve};
use shelf::cli::{Cli, Commands};
use shelf::logging;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_file.clone());

    let ctx = CommandContext::load(cli.config.as_deref(), cli.data.as_deref())?;

    match cli.command {
        Commands::Serve { host, port } => handle_serve(ctx, host, port),
        Commands::Run {
            query,
            variables,
            operation_name,
        } => handle_run(ctx, query, variables, operation_name),
        Commands::Schema => handle_schema(ctx),
    }
}
