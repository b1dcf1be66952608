use clap::{command, value_parser, Arg, ArgAction, ArgMatches, Command};
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::parse::{read_query_list, ParseError};
use crate::plot::PlotFormat;
use crate::TOTAL_QUERIES;

#[derive(Debug)]
pub struct CactusArgs {
    pub inputs: Vec<PathBuf>,
    pub names: Vec<String>,
    pub format: PlotFormat,
    pub limit: Option<f64>,
    pub time_limit: Option<f64>,
    pub min: Option<f64>,
    pub tail: Option<usize>,
    pub intersection: bool,
    pub max_line: bool,
    pub weak: Option<usize>,
    pub filter: Option<PathBuf>,
    pub output_file: Option<String>,
    pub explored: bool,
    pub virtual_best: bool,
    pub no_legend: bool,
    pub simplification: Option<Simplification>,
    pub less_styles: bool,
    pub verbose: bool,
}

/// Lists of queries answered by query simplification alone.
#[derive(Debug, Clone)]
pub struct Simplification {
    pub simplified: PathBuf,
    pub immediate: PathBuf,
}

impl Simplification {
    /// Union of both lists.
    pub fn read(&self) -> Result<HashSet<String>, ParseError> {
        let mut exclude = read_query_list(&self.simplified)?;
        exclude.extend(read_query_list(&self.immediate)?);
        Ok(exclude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Answers,
    Percentage,
    Scores,
}

#[derive(Debug)]
pub struct TableArgs {
    pub inputs: Vec<PathBuf>,
    pub names: Vec<String>,
    pub output: PathBuf,
    pub table: TableKind,
    pub min_time: Option<f64>,
    pub query_simplification: bool,
    pub exclude: PathBuf,
    pub baseline: String,
    pub point_threshold: f64,
    /// Restricts the score table to queries ending in this suffix.
    pub suffix: Option<String>,
    pub total_queries: usize,
    pub verbose: bool,
}

#[derive(Debug)]
pub struct StatsArgs {
    pub oracle: PathBuf,
    pub input: Option<PathBuf>,
    pub print_mismatch: Option<PathBuf>,
    pub upper: Option<f64>,
    pub simplification: Option<Simplification>,
    pub total_queries: usize,
    pub verbose: bool,
}

#[derive(Debug)]
pub struct TrivialArgs {
    pub inputs: Vec<String>,
    pub verbose: bool,
}

#[derive(Debug)]
pub struct ToCsvArgs {
    pub folder: PathBuf,
    pub non_match: Option<PathBuf>,
    pub count_queries: Option<PathBuf>,
    pub filter: Option<String>,
    pub progress: bool,
    pub verbose: bool,
}

fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .help("Print debug diagnostics to stderr")
        .long("verbose")
        .action(ArgAction::SetTrue)
}

fn simplification_args(
    cmd: Command,
    id: &'static str,
    long: &'static str,
    help: &'static str,
) -> Command {
    cmd.arg(
        Arg::new(id)
            .help(help)
            .long(long)
            .action(ArgAction::SetTrue),
    )
    .arg(
        Arg::new("simplified")
            .help("File listing queries solved by query simplification")
            .long("simplified")
            .value_parser(value_parser!(PathBuf))
            .default_value("simplified"),
    )
    .arg(
        Arg::new("immediate")
            .help("File listing queries solved immediately")
            .long("immediate")
            .value_parser(value_parser!(PathBuf))
            .default_value("immediate-solve"),
    )
}

fn simplification(matches: &ArgMatches, flag: &str) -> Option<Simplification> {
    if !matches.get_flag(flag) {
        return None;
    }
    Some(Simplification {
        simplified: path(matches, "simplified")?,
        immediate: path(matches, "immediate")?,
    })
}

fn total_queries_arg() -> Arg {
    Arg::new("total_queries")
        .help("Number of queries in the benchmark")
        .long("total-queries")
        .value_parser(value_parser!(usize))
        .default_value(TOTAL_QUERIES_STR)
}

const TOTAL_QUERIES_STR: &str = "32512";

fn path(matches: &ArgMatches, id: &str) -> Option<PathBuf> {
    matches.get_one::<PathBuf>(id).cloned()
}

fn paths(matches: &ArgMatches, id: &str) -> Vec<PathBuf> {
    matches
        .get_many::<PathBuf>(id)
        .map(|v| v.cloned().collect())
        .unwrap_or_default()
}

fn strings(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|v| v.cloned().collect())
        .unwrap_or_default()
}

fn float(matches: &ArgMatches, id: &str) -> Option<f64> {
    matches.get_one::<f64>(id).copied()
}

pub fn cactus_cli_from<I, T>(args: I) -> Result<CactusArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cmd = command!("cactus")
        .about("Takes csv files and creates time and memory cactus plots for them.")
        .arg(
            Arg::new("format")
                .help("Format of the saved figures")
                .long("format")
                .short('f')
                .value_parser(["png", "svg"])
                .default_value("png"),
        )
        .arg(
            Arg::new("limit")
                .help("Limit the y-axis on the time plot")
                .long("limit")
                .short('l')
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("time_limit")
                .help("Exclude all queries taking longer than this many seconds from every plot")
                .long("time_limit")
                .visible_alias("time-limit")
                .short('t')
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("min")
                .help("Remove all queries that finish faster than this many seconds")
                .long("min")
                .short('m')
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("tail")
                .help("Display only the n last points of the cactus plot")
                .long("tail")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("intersection")
                .help("Only display queries in the intersection of all inputs")
                .long("intersection")
                .short('I')
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("inputs")
                .help("List of input files")
                .long("inputs")
                .num_args(1..)
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("names")
                .help("Labels of the inputs, in order. Defaults to the file stems")
                .long("names")
                .num_args(0..),
        )
        .arg(
            Arg::new("max_line")
                .help("Draw a vertical line at the last point of each data set")
                .long("max_line")
                .visible_alias("max-line")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("weak")
                .help("Index of the input holding only weak data. Other inputs are narrowed to its queries")
                .long("weak")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("filter")
                .help("File with the names of the queries the inputs are filtered to")
                .long("filter")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output_file")
                .help("Base file name, suffixed with '-time.<format>' and '-memory.<format>'")
                .long("output-file")
                .short('o'),
        )
        .arg(
            Arg::new("explored")
                .help("Generate a cactus plot of explored states")
                .long("explored")
                .short('x')
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("virtual_best")
                .help("Add the series of the best score across all inputs")
                .long("virtual-best")
                .short('v')
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no_legend")
                .help("Disable the plot legend")
                .long("no-legend")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("less_styles")
                .help("Skip the first line style and colour")
                .long("less-styles")
                .action(ArgAction::SetTrue),
        )
        .arg(verbose_arg());
    let matches = simplification_args(
        cmd,
        "no_simplification",
        "no-simplification",
        "Exclude answers obtainable by query simplification",
    )
    .try_get_matches_from(args)?;

    Ok(CactusArgs {
        inputs: paths(&matches, "inputs"),
        names: strings(&matches, "names"),
        format: match matches.get_one::<String>("format").map(String::as_str) {
            Some("svg") => PlotFormat::Svg,
            _ => PlotFormat::Png,
        },
        limit: float(&matches, "limit"),
        time_limit: float(&matches, "time_limit"),
        min: float(&matches, "min"),
        tail: matches.get_one::<usize>("tail").copied(),
        intersection: matches.get_flag("intersection"),
        max_line: matches.get_flag("max_line"),
        weak: matches.get_one::<usize>("weak").copied(),
        filter: path(&matches, "filter"),
        output_file: matches.get_one::<String>("output_file").cloned(),
        explored: matches.get_flag("explored"),
        virtual_best: matches.get_flag("virtual_best"),
        no_legend: matches.get_flag("no_legend"),
        simplification: simplification(&matches, "no_simplification"),
        less_styles: matches.get_flag("less_styles"),
        verbose: matches.get_flag("verbose"),
    })
}

pub fn table_cli_from<I, T>(args: I) -> Result<TableArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command!("make-table")
        .about("Turns .csv answer files into LaTeX tables")
        .arg(
            Arg::new("input")
                .help("Input files")
                .long("input")
                .short('i')
                .num_args(1..)
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("names")
                .help("Names of each configuration. Used as table heading")
                .long("names")
                .short('n')
                .num_args(1..)
                .required(true),
        )
        .arg(
            Arg::new("output")
                .help("File to output the table to")
                .long("output")
                .short('o')
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("table")
                .help("Which table to produce")
                .long("table")
                .value_parser(["answers", "percentage", "scores"])
                .default_value("answers"),
        )
        .arg(
            Arg::new("min_time")
                .help("Minimum time (in s) for a query to count outside of the answers table. 0 disables")
                .long("min-time")
                .short('t')
                .value_parser(value_parser!(f64))
                .default_value("5"),
        )
        .arg(
            Arg::new("query_simplification")
                .help("Include answers obtained by query simplification")
                .long("query-simplification")
                .short('q')
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("exclude")
                .help("File listing the queries answered by query simplification")
                .long("exclude")
                .value_parser(value_parser!(PathBuf))
                .default_value("exclude"),
        )
        .arg(
            Arg::new("baseline")
                .help("Configuration the other ones are compared against")
                .long("baseline")
                .default_value("Baseline"),
        )
        .arg(
            Arg::new("point_threshold")
                .help("Percentage of the baseline a value must stay under to count as a win")
                .long("point-threshold")
                .value_parser(value_parser!(f64))
                .default_value("90"),
        )
        .arg(
            Arg::new("suffix")
                .help("Only score queries whose name ends in this suffix, e.g. LTLC")
                .long("suffix"),
        )
        .arg(total_queries_arg())
        .arg(verbose_arg())
        .try_get_matches_from(args)?;

    Ok(TableArgs {
        inputs: paths(&matches, "input"),
        names: strings(&matches, "names"),
        output: path(&matches, "output").unwrap_or_default(),
        table: match matches.get_one::<String>("table").map(String::as_str) {
            Some("percentage") => TableKind::Percentage,
            Some("scores") => TableKind::Scores,
            _ => TableKind::Answers,
        },
        min_time: float(&matches, "min_time").filter(|&t| t > 0.0),
        query_simplification: matches.get_flag("query_simplification"),
        exclude: path(&matches, "exclude").unwrap_or_default(),
        baseline: matches
            .get_one::<String>("baseline")
            .cloned()
            .unwrap_or_default(),
        point_threshold: float(&matches, "point_threshold").unwrap_or(90.0),
        suffix: matches.get_one::<String>("suffix").cloned(),
        total_queries: matches
            .get_one::<usize>("total_queries")
            .copied()
            .unwrap_or(TOTAL_QUERIES),
        verbose: matches.get_flag("verbose"),
    })
}

pub fn stats_cli_from<I, T>(args: I) -> Result<StatsArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cmd = command!("stats-generator")
        .about("Creates statistics about a run against an oracle")
        .arg(
            Arg::new("oracle")
                .help("File containing the oracle answers")
                .long("oracle")
                .short('o')
                .value_parser(value_parser!(PathBuf))
                .default_value("single-oracle"),
        )
        .arg(
            Arg::new("input")
                .help("The input file. If omitted stdin is used")
                .long("input")
                .short('i')
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("print_mismatch")
                .help("Write the answers inconsistent with the oracle to this file")
                .long("print-mismatch")
                .short('m')
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("upper")
                .help("Consider only answers obtained within this many minutes")
                .long("upper")
                .short('u')
                .value_parser(value_parser!(f64)),
        )
        .arg(total_queries_arg())
        .arg(verbose_arg());
    let matches = simplification_args(
        cmd,
        "no_query",
        "no-query",
        "Exclude answers obtained directly from query simplification",
    )
    .try_get_matches_from(args)?;

    Ok(StatsArgs {
        oracle: path(&matches, "oracle").unwrap_or_default(),
        input: path(&matches, "input"),
        print_mismatch: path(&matches, "print_mismatch"),
        upper: float(&matches, "upper"),
        simplification: simplification(&matches, "no_query"),
        total_queries: matches
            .get_one::<usize>("total_queries")
            .copied()
            .unwrap_or(TOTAL_QUERIES),
        verbose: matches.get_flag("verbose"),
    })
}

pub fn trivial_cli_from<I, T>(args: I) -> Result<TrivialArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command!("trivial-answers")
        .about("Lists the queries answered without exploring any state")
        .arg(
            Arg::new("inputs")
                .help("Input files or glob patterns. Should include all experiments to ensure consistency")
                .num_args(1..)
                .required(true)
                .index(1),
        )
        .arg(verbose_arg())
        .try_get_matches_from(args)?;

    Ok(TrivialArgs {
        inputs: strings(&matches, "inputs"),
        verbose: matches.get_flag("verbose"),
    })
}

pub fn to_csv_cli_from<I, T>(args: I) -> Result<ToCsvArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command!("to-csv")
        .about("Translates a folder of model checker output files into csv rows")
        .arg(
            Arg::new("folder")
                .help("Path to the folder containing the output files")
                .required(true)
                .index(1)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("non_match")
                .help("File to dump the contents of the non matching files to")
                .long("non_match")
                .visible_alias("non-match")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("count_queries")
                .help("File to write the total number of queries to")
                .long("count_queries")
                .visible_alias("count-queries")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("filter")
                .help("Include only files containing the given string")
                .long("filter"),
        )
        .arg(
            Arg::new("progress")
                .help("Report progress on stderr")
                .long("progress")
                .action(ArgAction::SetTrue),
        )
        .arg(verbose_arg())
        .try_get_matches_from(args)?;

    Ok(ToCsvArgs {
        folder: path(&matches, "folder").unwrap_or_default(),
        non_match: path(&matches, "non_match"),
        count_queries: path(&matches, "count_queries"),
        filter: matches.get_one::<String>("filter").cloned(),
        progress: matches.get_flag("progress"),
        verbose: matches.get_flag("verbose"),
    })
}

#[test]
fn cactus_defaults() {
    let args = cactus_cli_from(["cactus", "--inputs", "a.csv", "b.csv"]).unwrap();
    assert_eq!(args.inputs, vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")]);
    assert!(args.names.is_empty());
    assert_eq!(args.format, PlotFormat::Png);
    assert!(args.simplification.is_none());
    assert!(!args.virtual_best);
}

#[test]
fn cactus_flags() {
    let args = cactus_cli_from([
        "cactus", "--inputs", "a.csv", "b.csv", "--names", "A", "B", "-t", "60", "-m", "0.5",
        "-I", "-v", "--weak", "1", "-f", "svg", "--tail", "10", "--no-simplification",
    ])
    .unwrap();
    assert_eq!(args.names, vec!["A", "B"]);
    assert_eq!(args.time_limit, Some(60.0));
    assert_eq!(args.min, Some(0.5));
    assert!(args.intersection);
    assert!(args.virtual_best);
    assert_eq!(args.weak, Some(1));
    assert_eq!(args.format, PlotFormat::Svg);
    assert_eq!(args.tail, Some(10));
    let simp = args.simplification.unwrap();
    assert_eq!(simp.simplified, PathBuf::from("simplified"));
    assert_eq!(simp.immediate, PathBuf::from("immediate-solve"));
}

#[test]
fn cactus_requires_inputs() {
    assert!(cactus_cli_from(["cactus"]).is_err());
}

#[test]
fn table_requires_output() {
    assert!(table_cli_from(["make-table", "-i", "a.csv", "-n", "A"]).is_err());
    let args = table_cli_from(["make-table", "-i", "a.csv", "-n", "A", "-o", "t.tex"]).unwrap();
    assert_eq!(args.table, TableKind::Answers);
    assert_eq!(args.min_time, Some(5.0));
    assert_eq!(args.total_queries, TOTAL_QUERIES);
    assert_eq!(args.exclude, PathBuf::from("exclude"));
}

#[test]
fn table_zero_min_time_disables() {
    let args = table_cli_from([
        "make-table", "-i", "a.csv", "-n", "A", "-o", "t.tex", "-t", "0", "--table", "scores",
    ])
    .unwrap();
    assert_eq!(args.min_time, None);
    assert_eq!(args.table, TableKind::Scores);
}

#[test]
fn stats_defaults() {
    let args = stats_cli_from(["stats-generator", "-u", "2.5", "--no-query"]).unwrap();
    assert_eq!(args.oracle, PathBuf::from("single-oracle"));
    assert_eq!(args.input, None);
    assert_eq!(args.upper, Some(2.5));
    assert!(args.simplification.is_some());
}

#[test]
fn trivial_positional_inputs() {
    let args = trivial_cli_from(["trivial-answers", "runs/*.csv", "extra.csv"]).unwrap();
    assert_eq!(args.inputs, vec!["runs/*.csv", "extra.csv"]);
}

#[test]
fn to_csv_underscore_and_dash_flags() {
    let args = to_csv_cli_from(["to-csv", "out", "--non-match", "nm.txt", "--count_queries", "n"]).unwrap();
    assert_eq!(args.folder, PathBuf::from("out"));
    assert_eq!(args.non_match, Some(PathBuf::from("nm.txt")));
    assert_eq!(args.count_queries, Some(PathBuf::from("n")));
    assert!(!args.progress);
}

#[test]
fn total_queries_default_matches_constant() {
    assert_eq!(TOTAL_QUERIES_STR.parse::<usize>().unwrap(), TOTAL_QUERIES);
}
