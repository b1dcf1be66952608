use anyhow::{Context, Result};
use std::collections::HashSet;
use std::io;
use tracing::{debug, info};

use mc_analysis::cli::stats_cli_from;
use mc_analysis::correctness::{compare_results, select_answers, Statistics};
use mc_analysis::logger;
use mc_analysis::parse::{parse_file, parse_reader, read_oracle};

fn main() -> Result<()> {
    let args = stats_cli_from(std::env::args_os()).unwrap_or_else(|e| e.exit());
    logger::init(args.verbose);

    let oracle = read_oracle(&args.oracle)
        .with_context(|| format!("Unable to open the file {}", args.oracle.display()))?;
    debug!("oracle knows {} queries", oracle.len());

    let answers = match &args.input {
        Some(path) => parse_file(path).with_context(|| format!("reading {}", path.display()))?,
        None => parse_reader(io::stdin().lock()).context("reading stdin")?,
    };

    let exclude = match &args.simplification {
        Some(simp) => simp.read().context("reading query simplification lists")?,
        None => HashSet::new(),
    };
    let (answers, skipped) = select_answers(&answers, &exclude, args.upper);
    let cmp = compare_results(&answers, &oracle);

    if let Some(path) = &args.print_mismatch {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("creating {}", path.display()))?;
        for row in &cmp.bad {
            writer.write_record([
                row.query.clone(),
                row.answer.clone(),
                row.elapsed_time.to_string(),
                row.memory.to_string(),
                row.explored_states.to_string(),
            ])?;
        }
        writer.flush()?;
        info!("{} mismatches written to {}", cmp.bad.len(), path.display());
    }

    let stats = Statistics::new(args.total_queries, answers.len(), &cmp, skipped);
    print!("{}", stats);
    Ok(())
}
