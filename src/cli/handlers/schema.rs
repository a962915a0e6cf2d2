use anyhow::Result;

use super::CommandContext;

pub fn handle_schema(ctx: CommandContext) -> Result<()> {
    let pipeline = ctx.build_pipeline()?;
    println!("{}", pipeline.schema().sdl());
    Ok(())
}
