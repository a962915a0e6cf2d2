use anyhow::Result;
use colored::Colorize;

use super::CommandContext;
use crate::http;

pub fn handle_serve(ctx: CommandContext, host: Option<String>, port: Option<u16>) -> Result<()> {
    // The schema is checked before anything is bound; a bad schema never serves.
    let pipeline = ctx.build_pipeline()?;

    let mut settings = ctx.config.server.clone();
    if let Some(host) = host {
        settings.host = host;
    }
    if let Some(port) = port {
        settings.port = port;
    }

    println!(
        "{} GraphQL server on http://{}{}",
        "Starting".green(),
        settings.socket_addr(),
        http::GRAPHQL_PATH
    );

    tokio::runtime::Runtime::new()?.block_on(http::serve(pipeline, &settings))?;
    Ok(())
}
