//! Extraction of results from the raw text a model checker prints.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::logger::NonMatchLog;
use crate::record::NOT_REPORTED;

static ANSWER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^.*FORMULA (\S*) (\S*) TECHNIQUES .*@@@([^,]*),([^@]*)@@@").unwrap()
});
static STATS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^.*FORMULA \S* STATS EXPLORED (\d+)").unwrap());

/// Query families a log file name can end in, with the suffix used in CSV ids.
const FAMILIES: [(&str, &str); 2] = [("LTLCardinality", "LTLC"), ("LTLFireability", "LTLF")];

/// Fields scraped from one log, kept as printed by the tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResult {
    pub query: String,
    pub answer: String,
    pub time: String,
    pub memory: String,
    pub explored_states: i64,
}

impl ParsedResult {
    pub fn fields(&self) -> [String; 5] {
        [
            self.query.clone(),
            self.answer.clone(),
            self.time.clone(),
            self.memory.clone(),
            self.explored_states.to_string(),
        ]
    }
}

/// Short family suffix (`LTLC` / `LTLF`) for a log file name, `None` for
/// files that are not query logs.
pub fn query_family(file_name: &str) -> Option<&'static str> {
    FAMILIES
        .iter()
        .find(|(ending, _)| file_name.ends_with(ending))
        .map(|&(_, short)| short)
}

/// Scrapes the answer line and the explored states of one log.
///
/// Returns `None` when `file_name` is not a query log or the text carries no
/// answer.
pub fn parse_log_text(file_name: &str, text: &str) -> Option<ParsedResult> {
    let family = query_family(file_name)?;
    let caps = ANSWER_RE.captures(text)?;
    let explored_states = STATS_RE
        .captures(text)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(NOT_REPORTED);
    Some(ParsedResult {
        query: format!("{}-{}", &caps[1], family),
        answer: caps[2].to_string(),
        time: caps[3].to_string(),
        memory: caps[4].to_string(),
        explored_states,
    })
}

#[derive(Debug, Clone, Default)]
pub struct ScrapeOptions {
    /// Only logs containing this text are considered.
    pub filter: Option<String>,
    /// Report every 1000th file.
    pub progress: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeSummary {
    /// Directory entries, query logs or not.
    pub entries: usize,
    pub matched: usize,
    pub unmatched: usize,
}

/// Writes one CSV row per recognised log in `folder`, visiting files in name
/// order. Logs with no result go to `non_match` when given.
///
/// A log that cannot be read is skipped; one that is not UTF-8 aborts.
pub fn scrape_folder<W: Write>(
    folder: &Path,
    opts: &ScrapeOptions,
    out: &mut csv::Writer<W>,
    mut non_match: Option<&mut NonMatchLog>,
) -> Result<ScrapeSummary> {
    let mut names: Vec<String> = fs::read_dir(folder)?
        .map(|e| e.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<std::io::Result<_>>()?;
    names.sort();

    let mut summary = ScrapeSummary {
        entries: names.len(),
        ..Default::default()
    };
    for (idx, name) in names.iter().enumerate() {
        if opts.progress && idx % 1000 == 0 {
            info!("{}/{}", idx, names.len());
        }
        if query_family(name).is_none() {
            continue;
        }
        let path = folder.join(name);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::InvalidData => return Err(Error::Encoding(path)),
            Err(e) => {
                warn!("Unable to open {}: {}", name, e);
                continue;
            }
        };
        if text.is_empty() {
            continue;
        }
        if opts.filter.as_deref().map_or(false, |f| !text.contains(f)) {
            continue;
        }
        match parse_log_text(name, &text) {
            Some(res) => {
                out.write_record(res.fields())?;
                summary.matched += 1;
            }
            None => {
                summary.unmatched += 1;
                if let Some(log) = non_match.as_deref_mut() {
                    log.record(name, &text)?;
                }
            }
        }
    }
    out.flush()?;
    Ok(summary)
}

#[cfg(test)]
const SAMPLE_LOG: &str = "\
Parameters: -x 3
FORMULA Model-PT-001-LTLCardinality-03 STATS EXPLORED 1532
FORMULA Model-PT-001-LTLCardinality-03 TRUE TECHNIQUES EXPLICIT STATE_COMPRESSION
done
@@@12.5,40960@@@
";

#[test]
fn scrapes_answer_and_states() {
    let res = parse_log_text("Model-PT-001.LTLCardinality", SAMPLE_LOG).unwrap();
    assert_eq!(res.query, "Model-PT-001-LTLCardinality-03-LTLC");
    assert_eq!(res.answer, "TRUE");
    assert_eq!(res.time, "12.5");
    assert_eq!(res.memory, "40960");
    assert_eq!(res.explored_states, 1532);
}

#[test]
fn missing_stats_is_not_reported() {
    let text = "FORMULA f-1 FALSE TECHNIQUES X\n@@@1.0,2@@@";
    let res = parse_log_text("f.LTLFireability", text).unwrap();
    assert_eq!(res.query, "f-1-LTLF");
    assert_eq!(res.explored_states, NOT_REPORTED);
    assert_eq!(res.fields()[4], "-1");
}

#[test]
fn unrecognised_text() {
    assert_eq!(parse_log_text("f.LTLFireability", "segfault\n"), None);
}

#[test]
fn ignores_other_families() {
    assert_eq!(query_family("model.ReachabilityCardinality"), None);
    assert_eq!(parse_log_text("f.CTLCardinality", SAMPLE_LOG), None);
}

#[test]
fn scrapes_a_folder_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b.LTLFireability"), "FORMULA b-0 FALSE TECHNIQUES X\n@@@2.0,20@@@").unwrap();
    fs::write(dir.path().join("a.LTLCardinality"), SAMPLE_LOG).unwrap();
    fs::write(dir.path().join("c.LTLCardinality"), "killed\n").unwrap();
    fs::write(dir.path().join("d.LTLCardinality"), "").unwrap();
    fs::write(dir.path().join("notes.txt"), "FORMULA x TRUE TECHNIQUES @@@1,1@@@").unwrap();

    let nm_path = dir.path().join("non-match.log");
    let mut nm = NonMatchLog::create(&nm_path).unwrap();
    let mut out = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    let summary = scrape_folder(dir.path(), &ScrapeOptions::default(), &mut out, Some(&mut nm)).unwrap();
    nm.finish().unwrap();

    assert_eq!(summary.entries, 6);
    assert_eq!(summary.matched, 2);
    assert_eq!(summary.unmatched, 1);
    let csv = String::from_utf8(out.into_inner().unwrap()).unwrap();
    assert_eq!(
        csv,
        "Model-PT-001-LTLCardinality-03-LTLC,TRUE,12.5,40960,1532\nb-0-LTLF,FALSE,2.0,20,-1\n"
    );
    assert!(fs::read_to_string(&nm_path).unwrap().starts_with("c.LTLCardinality\nkilled"));
}

#[test]
fn filter_keeps_only_matching_logs() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.LTLCardinality"), SAMPLE_LOG).unwrap();
    fs::write(dir.path().join("b.LTLFireability"), "FORMULA b-0 FALSE TECHNIQUES X\n@@@2.0,20@@@").unwrap();
    let opts = ScrapeOptions {
        filter: Some("STATE_COMPRESSION".to_string()),
        progress: false,
    };
    let mut out = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    let summary = scrape_folder(dir.path(), &opts, &mut out, None).unwrap();
    assert_eq!(summary.matched, 1);
}

#[test]
fn non_utf8_log_aborts() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.LTLCardinality"), [0xff, 0xfe, 0x00]).unwrap();
    let mut out = csv::Writer::from_writer(Vec::new());
    let res = scrape_folder(dir.path(), &ScrapeOptions::default(), &mut out, None);
    assert!(matches!(res, Err(Error::Encoding(_))));
}
