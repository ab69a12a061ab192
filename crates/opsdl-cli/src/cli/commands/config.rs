//! `opsdl config` – locate or edit the config file.

use anyhow::{bail, Context, Result};
use opsdl_core::config;
use std::path::Path;
use std::process::Command;

/// Never parses the file, so a broken config can still be located and edited.
pub fn run_config(path: &Path, edit: bool) -> Result<()> {
    if !path.exists() {
        config::write_default(path)?;
        println!("{}", config::created_notice(path));
    }
    println!("{}", path.display());

    if edit {
        let editor = std::env::var("EDITOR")
            .ok()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| "vi".to_string());
        let status = Command::new(&editor)
            .arg(path)
            .status()
            .with_context(|| format!("launch editor {editor}"))?;
        if !status.success() {
            bail!("editor {editor} exited with {status}");
        }
    }
    Ok(())
}
