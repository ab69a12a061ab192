//! `opsdl status` – show what the local library already has.

use anyhow::{bail, Result};
use opsdl_core::config::OpsdlConfig;
use opsdl_core::episode::current_season;
use opsdl_core::library::MediaLibrary;

pub fn run_status(cfg: &OpsdlConfig) -> Result<()> {
    if cfg.media_dir.as_os_str().is_empty() {
        bail!("missing 'media_dir' in configuration (see `opsdl config --edit`)");
    }
    let library = MediaLibrary::new(&cfg.media_dir);
    let season = current_season();

    println!("Library: {}", library.root().display());
    println!("{:<6} {:<8} {:<8} {}", "TYPE", "SEASON", "EPISODE", "REMOTE");
    for &ty in &cfg.types {
        let last = library.last_synced(ty, season)?;
        if last.is_empty() {
            println!("{:<6} {:<8} {:<8} {}", ty.to_string(), last.season, "-", "-");
        } else {
            println!(
                "{:<6} {:<8} {:<8} {}",
                ty.to_string(),
                last.season,
                format!("e{}", last.internal_number),
                last.remote_number
            );
        }
    }
    Ok(())
}
