use anyhow::{Context, Result, bail};
use confpath_restconf::ClientConfig;
use similar::TextDiff;
use std::io::Write;
use std::path::Path;
use std::process::Command;

pub async fn run(config: ClientConfig, path: &str) -> Result<()> {
    let mut console = crate::cmd_get::open(config, path).await?;
    let original = console
        .session()
        .buffer()
        .map(str::to_string)
        .with_context(|| format!("Nothing loaded for {}", path))?;

    let mut file = tempfile::Builder::new()
        .prefix("cpath-")
        .suffix(".json")
        .tempfile()
        .context("failed to create temp file")?;
    file.write_all(original.as_bytes())?;
    file.flush()?;

    launch_editor(&editor(), file.path())?;

    let edited = std::fs::read_to_string(file.path())
        .with_context(|| format!("failed to read back {}", file.path().display()))?;

    let Some(diff) = compute_diff(&original, &edited) else {
        eprintln!("No changes to {}", path);
        return Ok(());
    };
    eprint!("{}", diff);

    console.set_buffer(edited)?;
    console
        .save()
        .await
        .with_context(|| format!("Failed to save {}", path))?;
    eprintln!("Saved {}", path);
    Ok(())
}

/// `$VISUAL`, then `$EDITOR`, then `vi`.
fn editor() -> String {
    std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .ok()
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| "vi".to_string())
}

/// Run the editor command on `file`. The command may carry its own
/// arguments, e.g. `code --wait`.
fn launch_editor(editor: &str, file: &Path) -> Result<()> {
    let mut parts = editor.split_whitespace();
    let Some(program) = parts.next() else {
        bail!("no editor configured");
    };
    let status = Command::new(program)
        .args(parts)
        .arg(file)
        .status()
        .with_context(|| format!("failed to launch editor {:?}", editor))?;
    if !status.success() {
        bail!("editor {:?} exited with {}", editor, status);
    }
    Ok(())
}

fn compute_diff(old: &str, new: &str) -> Option<String> {
    let diff = TextDiff::from_lines(old, new);
    let unified = diff
        .unified_diff()
        .context_radius(3)
        .header("loaded", "edited")
        .to_string();
    if unified.is_empty() {
        None
    } else {
        Some(unified)
    }
}
