use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::info;

use mc_analysis::cli::{table_cli_from, TableKind};
use mc_analysis::latex::{num_answers_table, percentage_comparison, score_table, TableWriter};
use mc_analysis::logger;
use mc_analysis::parse::{parse_file, read_query_list};
use mc_analysis::record::Dataset;

fn main() -> Result<()> {
    let args = table_cli_from(std::env::args_os()).unwrap_or_else(|e| e.exit());
    logger::init(args.verbose);

    let mut sets = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        sets.push(parse_file(input).with_context(|| format!("reading {}", input.display()))?);
    }
    let dataset = Dataset::from_parts(args.names.clone(), sets)?;

    // Answers found by query simplification are left out unless asked for.
    let exclude = if args.query_simplification {
        None
    } else {
        Some(
            read_query_list(&args.exclude)
                .with_context(|| format!("reading {}", args.exclude.display()))?,
        )
    };

    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut out = TableWriter::new(BufWriter::new(file));
    match args.table {
        TableKind::Answers => {
            num_answers_table(&mut out, &dataset, exclude.as_ref(), args.total_queries)?
        }
        TableKind::Percentage => {
            percentage_comparison(&mut out, &dataset, &args.baseline, exclude.as_ref())?
        }
        TableKind::Scores => score_table(
            &mut out,
            &dataset,
            &args.baseline,
            args.suffix.as_deref(),
            args.point_threshold / 100.0,
            args.min_time,
        )?,
    }
    out.into_inner().flush()?;
    info!("wrote {}", args.output.display());
    Ok(())
}
