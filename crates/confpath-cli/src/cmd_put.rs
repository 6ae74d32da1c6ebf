use anyhow::{Context, Result};
use confpath_restconf::ClientConfig;
use std::io::Read;

pub async fn run(config: ClientConfig, path: &str, input: &str) -> Result<()> {
    let text = read_input(input)?;

    let mut console = crate::cmd_get::open(config, path).await?;
    console.set_buffer(text)?;
    console
        .save()
        .await
        .with_context(|| format!("Failed to save {}", path))?;

    eprintln!("Saved {}", path);
    Ok(())
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {:?}", input))
    }
}
