use anyhow::{Result, bail};
use confpath_restconf::{ClientConfig, RestconfConsole, SessionState};

/// Load `path` into a fresh edit session and wait for it.
pub(crate) async fn open(config: ClientConfig, path: &str) -> Result<RestconfConsole> {
    let mut console = RestconfConsole::connect(config)?;
    console.open(path);
    if let SessionState::Error { message, .. } = console.settle().await {
        bail!("{}", message);
    }
    Ok(console)
}

pub async fn run(config: ClientConfig, path: &str, pretty: bool) -> Result<()> {
    let console = open(config, path).await?;
    let Some(buffer) = console.session().buffer() else {
        bail!("Nothing loaded for {}", path);
    };

    if pretty {
        println!("{}", buffer);
    } else {
        let value: serde_json::Value = serde_json::from_str(buffer)?;
        println!("{}", value);
    }
    Ok(())
}
