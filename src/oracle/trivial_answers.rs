use anyhow::{Context, Result};
use glob::glob;
use std::path::PathBuf;
use tracing::{debug, warn};

use mc_analysis::cli::trivial_cli_from;
use mc_analysis::correctness::trivial_answers;
use mc_analysis::logger;
use mc_analysis::parse::parse_file;

/// Expands every pattern; a pattern matching nothing is kept as a plain path.
fn expand(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let mut matched = false;
        for entry in glob(pattern).with_context(|| format!("bad pattern {}", pattern))? {
            files.push(entry?);
            matched = true;
        }
        if !matched {
            warn!("{} matches no file", pattern);
            files.push(PathBuf::from(pattern));
        }
    }
    Ok(files)
}

fn main() -> Result<()> {
    let args = trivial_cli_from(std::env::args_os()).unwrap_or_else(|e| e.exit());
    logger::init(args.verbose);

    let mut runs = Vec::new();
    for path in expand(&args.inputs)? {
        let set = parse_file(&path).with_context(|| format!("reading {}", path.display()))?;
        debug!("{}: {} answers", path.display(), set.len());
        runs.push(set);
    }

    for query in trivial_answers(&runs) {
        println!("{}", query);
    }
    Ok(())
}
