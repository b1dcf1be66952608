use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

use mc_analysis::aggregate::{virtual_best, VIRTUAL_BEST};
use mc_analysis::cli::{cactus_cli_from, CactusArgs};
use mc_analysis::filter::FilterCriteria;
use mc_analysis::parse::{parse_file, read_query_list};
use mc_analysis::plot::{output_path, render_cactus, PlotOptions};
use mc_analysis::record::Dataset;
use mc_analysis::series::{cactus_series, tail_window, Metric};
use mc_analysis::{logger, Error};

fn main() -> Result<()> {
    let args = cactus_cli_from(std::env::args_os()).unwrap_or_else(|e| e.exit());
    logger::init(args.verbose);

    let names: Vec<String> = if args.names.is_empty() {
        args.inputs.iter().map(|p| file_stem(p)).collect()
    } else {
        args.names.clone()
    };
    let mut sets = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        let set = parse_file(input).with_context(|| format!("reading {}", input.display()))?;
        debug!("{}: {} answers", input.display(), set.len());
        sets.push(set);
    }
    let dataset = Dataset::from_parts(names.clone(), sets)?;

    let criteria = filter_criteria(&args, &names)?;
    let mut dataset = criteria.apply(&dataset)?;
    if args.virtual_best {
        let best = virtual_best(&dataset);
        dataset.insert(VIRTUAL_BEST.to_string(), best);
    }

    let base = args.output_file.clone().unwrap_or_else(|| names.join("-"));
    let mut metrics = vec![Metric::Time, Metric::Memory];
    if args.explored {
        metrics.push(Metric::ExploredStates);
    }

    for metric in metrics {
        let (limit, floor) = match metric {
            Metric::Time => (args.limit, args.min),
            _ => (None, None),
        };
        let series: Vec<_> = dataset
            .iter()
            .map(|(name, set)| cactus_series(name, set, metric, limit, floor))
            .collect();
        let window = match (metric, args.tail) {
            (Metric::Time, Some(n)) => tail_window(&series, n, args.virtual_best),
            _ => None,
        };
        let opts = PlotOptions {
            y_limit: limit,
            y_floor: floor,
            window,
            max_line: args.max_line && metric == Metric::Time,
            legend: !args.no_legend,
            less_styles: args.less_styles,
        };
        let path = output_path(&base, metric, args.format);
        render_cactus(&path, args.format, metric, &series, &opts)
            .with_context(|| format!("drawing {}", path.display()))?;
        info!("wrote {}", path.display());
    }

    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn filter_criteria(args: &CactusArgs, names: &[String]) -> Result<FilterCriteria> {
    let weak_reference = match args.weak {
        Some(idx) => Some(
            names
                .get(idx)
                .cloned()
                .ok_or_else(|| Error::UnknownConfiguration(format!("input #{}", idx)))?,
        ),
        None => None,
    };
    let allowlist = match &args.filter {
        Some(path) => Some(
            read_query_list(path).with_context(|| format!("reading {}", path.display()))?,
        ),
        None => None,
    };
    let exclude = match &args.simplification {
        Some(simp) => Some(simp.read().context("reading query simplification lists")?),
        None => None,
    };
    Ok(FilterCriteria {
        ceiling: args.time_limit,
        floor: None,
        weak_reference,
        allowlist,
        exclude,
        intersection: args.intersection,
    })
}
