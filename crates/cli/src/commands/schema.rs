use anyhow::Result;
use orbit_core::configs::workspace_config_schema;

pub fn execute() -> Result<()> {
    let schema = workspace_config_schema()
        .map_err(|e| anyhow::anyhow!("Failed to generate schema: {}", e))?;
    println!("{}", schema);
    Ok(())
}
