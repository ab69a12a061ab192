//! `opsdl sync` – crawl the catalog and file new episodes.

use anyhow::Result;
use opsdl_core::browser::ChromeSession;
use opsdl_core::config::OpsdlConfig;
use opsdl_core::control::CancelToken;
use opsdl_core::pipeline::{SyncOptions, SyncPipeline, SyncReport};

use crate::cli::SyncArgs;

pub async fn run_sync(cfg: OpsdlConfig, args: SyncArgs, cancel: CancelToken) -> Result<()> {
    cfg.validate()?;
    let types = if args.types.is_empty() {
        cfg.types.clone()
    } else {
        args.types
    };
    let mut options = SyncOptions::for_types(types)?;
    options.pretend = args.pretend;
    options.dump_network_log = args.dump_network_log;

    let mut chrome = cfg.chrome_options();
    if args.headed {
        chrome.headless = false;
    }

    // The crawl blocks on the browser and sleeps between steps; keep it off
    // the runtime so the Ctrl-C listener stays responsive.
    let report = tokio::task::spawn_blocking(move || -> Result<SyncReport> {
        let pipeline = SyncPipeline::from_config(&cfg, options)?;
        Ok(pipeline.run(|| ChromeSession::launch(&chrome), &cancel)?)
    })
    .await??;

    print_report(&report);
    Ok(())
}

fn print_report(report: &SyncReport) {
    if report.is_up_to_date() {
        println!("Up to date.");
        return;
    }
    for t in &report.types {
        let since = if t.prior.is_empty() {
            "nothing synced yet".to_string()
        } else {
            format!(
                "after s{}e{} ({})",
                t.prior.season, t.prior.internal_number, t.prior.remote_number
            )
        };
        println!("{}: {} new episode(s), {}", t.program_type, t.episodes.len(), since);
        for ep in &t.episodes {
            let dest = match &ep.file {
                Some(p) => p.display().to_string(),
                None if report.pretend => ep.canonical_filename(),
                None => "(not filed)".to_string(),
            };
            println!("  {:>6}  {}", ep.remote_number.to_string(), dest);
        }
    }
    if report.pretend {
        println!("Pretend mode: nothing was downloaded.");
    } else {
        println!("Filed {} of {} episode(s).", report.total_filed(), report.total_planned());
    }
}
