//! LaTeX (booktabs + siunitx) table fragments.

use std::collections::HashSet;
use std::io::{self, Write};

use crate::aggregate::{percent_diff, score, AnswerCounts, Category, Score};
use crate::error::{Error, Result};
use crate::record::Dataset;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Int(usize),
    Float(f64),
}

impl Cell {
    pub fn percent(fraction: f64) -> Cell {
        Cell::Text(format!("\\SI{{{:.1}}}{{\\percent}}", fraction * 100.0))
    }

    fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Int(n) => format!("\\num{{{}}}", n),
            Cell::Float(x) => format!("\\num{{{}}}", x),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<usize> for Cell {
    fn from(n: usize) -> Self {
        Cell::Int(n)
    }
}

pub struct TableWriter<W: Write> {
    out: W,
}

impl<W: Write> TableWriter<W> {
    pub fn new(out: W) -> Self {
        TableWriter { out }
    }

    pub fn header(&mut self, colfmt: &str) -> io::Result<()> {
        writeln!(self.out, "\\begin{{tabular}}{{@{{}}{}@{{}}}}", colfmt)?;
        writeln!(self.out, "\\toprule")
    }

    /// Centres every heading; blank headings stay empty and headings that are
    /// already a `\multicolumn` are written as is.
    pub fn head_row(&mut self, headers: &[&str]) -> io::Result<()> {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| {
                if h.trim().is_empty() {
                    String::new()
                } else if h.contains("multicolumn") {
                    h.to_string()
                } else {
                    format!("\\multicolumn{{1}}{{c}}{{{}}}", h)
                }
            })
            .collect();
        writeln!(self.out, "{}\\\\", cells.join(" & "))
    }

    pub fn row(&mut self, cells: &[Cell], spacing: Option<&str>) -> io::Result<()> {
        let cells: Vec<String> = cells.iter().map(Cell::render).collect();
        write!(self.out, "{} \\\\", cells.join(" & "))?;
        match spacing {
            Some(s) => writeln!(self.out, "[{}]", s),
            None => writeln!(self.out),
        }
    }

    pub fn midrule(&mut self) -> io::Result<()> {
        writeln!(self.out, "\\midrule")
    }

    pub fn footer(&mut self) -> io::Result<()> {
        writeln!(self.out, "\\bottomrule")?;
        writeln!(self.out, "\\end{{tabular}}")
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

const CATEGORY_HEADINGS: [&str; 4] = ["LTLC$+$", "LTLC$-$", "LTLF$+$", "LTLF$-$"];

/// Number of answers per category and configuration.
///
/// The last column is the share of `total_queries` minus the excluded ones.
pub fn num_answers_table<W: Write>(
    out: &mut TableWriter<W>,
    dataset: &Dataset,
    exclude: Option<&HashSet<String>>,
    total_queries: usize,
) -> Result<()> {
    let available = total_queries.saturating_sub(exclude.map_or(0, HashSet::len));
    out.header("lrrrrrr")?;
    let mut headings = vec![""];
    headings.extend(CATEGORY_HEADINGS);
    headings.push("\\multicolumn{2}{c}{Total}");
    out.head_row(&headings)?;
    out.midrule()?;

    for (name, set) in dataset.iter() {
        let counts = AnswerCounts::count(set, exclude);
        let mut cells = vec![Cell::from(name)];
        cells.extend(Category::ALL.iter().map(|&c| Cell::from(counts.get(c))));
        cells.push(Cell::from(counts.total()));
        cells.push(if available == 0 {
            Cell::from("--")
        } else {
            Cell::percent(counts.total() as f64 / available as f64)
        });
        out.row(&cells, None)?;
    }

    out.footer()?;
    Ok(())
}

fn diff_cell(a: usize, b: usize) -> Cell {
    percent_diff(a, b).map_or_else(|| Cell::from("--"), Cell::percent)
}

/// Change in answers of every configuration relative to `baseline`.
pub fn percentage_comparison<W: Write>(
    out: &mut TableWriter<W>,
    dataset: &Dataset,
    baseline: &str,
    exclude: Option<&HashSet<String>>,
) -> Result<()> {
    let base = dataset
        .get(baseline)
        .ok_or_else(|| Error::MissingBaseline(baseline.to_string()))?;
    let base = AnswerCounts::count(base, exclude);

    out.header("lrrrrr")?;
    let mut headings = vec![""];
    headings.extend(CATEGORY_HEADINGS);
    headings.push("Total");
    out.head_row(&headings)?;
    out.midrule()?;

    for (name, set) in dataset.iter().filter(|(n, _)| *n != baseline) {
        let counts = AnswerCounts::count(set, exclude);
        let mut cells = vec![Cell::from(name)];
        cells.extend(
            Category::ALL
                .iter()
                .map(|&c| diff_cell(counts.get(c), base.get(c))),
        );
        cells.push(diff_cell(counts.total(), base.total()));
        out.row(&cells, None)?;
    }

    out.footer()?;
    Ok(())
}

/// Wins of every configuration over `baseline`; see [`score`].
pub fn score_table<W: Write>(
    out: &mut TableWriter<W>,
    dataset: &Dataset,
    baseline: &str,
    suffix: Option<&str>,
    factor: f64,
    min_time: Option<f64>,
) -> Result<()> {
    let base = dataset
        .get(baseline)
        .ok_or_else(|| Error::MissingBaseline(baseline.to_string()))?;

    out.header("lrrrr")?;
    out.head_row(&["", "Time", "Memory", "States", "Exclusive"])?;
    out.midrule()?;

    for (name, set) in dataset.iter().filter(|(n, _)| *n != baseline) {
        let Score {
            time,
            memory,
            states,
            exclusive,
        } = score(base, set, suffix, factor, min_time);
        out.row(
            &[
                Cell::from(name),
                Cell::from(time),
                Cell::from(memory),
                Cell::from(states),
                Cell::from(exclusive),
            ],
            None,
        )?;
    }

    out.footer()?;
    Ok(())
}

#[cfg(test)]
fn render<F>(f: F) -> String
where
    F: FnOnce(&mut TableWriter<Vec<u8>>) -> Result<()>,
{
    let mut out = TableWriter::new(Vec::new());
    f(&mut out).unwrap();
    String::from_utf8(out.into_inner()).unwrap()
}

#[cfg(test)]
fn sample_dataset() -> Dataset {
    use crate::record::{ResultRecord, ResultSet};

    let base: ResultSet = vec![
        ResultRecord::new("a-LTLC", "TRUE", 10.0, 100.0),
        ResultRecord::new("b-LTLF", "FALSE", 10.0, 100.0),
    ]
    .into_iter()
    .collect();
    let other: ResultSet = vec![
        ResultRecord::new("a-LTLC", "TRUE", 1.0, 100.0),
        ResultRecord::new("b-LTLF", "FALSE", 10.0, 100.0),
        ResultRecord::new("c-LTLF", "FALSE", 10.0, 100.0),
    ]
    .into_iter()
    .collect();
    Dataset::from_parts(vec!["Baseline".into(), "New".into()], vec![base, other]).unwrap()
}

#[test]
fn row_formats_numbers_and_spacing() {
    let text = render(|t| {
        t.row(&[Cell::from("x"), Cell::Int(3), Cell::Float(1.5)], Some("2pt"))?;
        Ok(())
    });
    assert_eq!(text, "x & \\num{3} & \\num{1.5} \\\\[2pt]\n");
}

#[test]
fn head_row_centres_headings() {
    let text = render(|t| {
        t.head_row(&["", "A", "\\multicolumn{2}{c}{B}"])?;
        Ok(())
    });
    assert_eq!(text, " & \\multicolumn{1}{c}{A} & \\multicolumn{2}{c}{B}\\\\\n");
}

#[test]
fn answers_table_layout() {
    let dataset = sample_dataset();
    let text = render(|t| num_answers_table(t, &dataset, None, 4));
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "\\begin{tabular}{@{}lrrrrrr@{}}");
    assert_eq!(lines[1], "\\toprule");
    assert_eq!(lines[3], "\\midrule");
    assert_eq!(
        lines[4],
        "Baseline & \\num{1} & \\num{0} & \\num{0} & \\num{1} & \\num{2} & \\SI{50.0}{\\percent} \\\\"
    );
    assert_eq!(lines[lines.len() - 1], "\\end{tabular}");
}

#[test]
fn comparison_skips_baseline() {
    let dataset = sample_dataset();
    let text = render(|t| percentage_comparison(t, &dataset, "Baseline", None));
    assert!(!text.contains("Baseline &"));
    assert!(text.contains(
        "New & \\SI{0.0}{\\percent} & -- & -- & \\SI{100.0}{\\percent} & \\SI{50.0}{\\percent} \\\\"
    ));
}

#[test]
fn comparison_requires_baseline() {
    let dataset = sample_dataset();
    let mut out = TableWriter::new(Vec::new());
    assert!(matches!(
        percentage_comparison(&mut out, &dataset, "Missing", None),
        Err(Error::MissingBaseline(_))
    ));
}

#[test]
fn score_table_rows() {
    let dataset = sample_dataset();
    let text = render(|t| score_table(t, &dataset, "Baseline", None, 0.9, None));
    assert!(text.contains("New & \\num{2} & \\num{1} & \\num{1} & \\num{1} \\\\"));
    let ltlf = render(|t| score_table(t, &dataset, "Baseline", Some("LTLF"), 0.9, None));
    assert!(ltlf.contains("New & \\num{1} & \\num{1} & \\num{1} & \\num{1} \\\\"));
}
