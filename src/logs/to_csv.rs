use anyhow::{bail, Context, Result};
use std::fs;
use std::io;
use tracing::info;

use mc_analysis::cli::to_csv_cli_from;
use mc_analysis::logger::{self, NonMatchLog};
use mc_analysis::scrape::{scrape_folder, ScrapeOptions};

fn main() -> Result<()> {
    let args = to_csv_cli_from(std::env::args_os()).unwrap_or_else(|e| e.exit());
    logger::init(args.verbose);

    if !args.folder.is_dir() {
        bail!("{} is not a directory", args.folder.display());
    }

    let mut non_match = match &args.non_match {
        Some(path) => Some(
            NonMatchLog::create(path).with_context(|| format!("creating {}", path.display()))?,
        ),
        None => None,
    };
    let opts = ScrapeOptions {
        filter: args.filter.clone(),
        progress: args.progress,
    };

    let stdout = io::stdout();
    let mut out = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(stdout.lock());
    let summary = scrape_folder(&args.folder, &opts, &mut out, non_match.as_mut())
        .with_context(|| format!("scraping {}", args.folder.display()))?;

    if let Some(path) = &args.count_queries {
        fs::write(path, format!("{}\n", summary.entries))
            .with_context(|| format!("writing {}", path.display()))?;
    }
    if let Some(log) = non_match {
        let count = log.finish()?;
        info!("{} files without a result", count);
    }
    info!("{} results from {} entries", summary.matched, summary.entries);
    Ok(())
}
