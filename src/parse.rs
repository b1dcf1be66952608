use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::record::{ResultRecord, ResultSet, NOT_REPORTED};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("record {record}: expected at least {expected} fields, found {found}")]
    MissingFields {
        record: usize,
        expected: usize,
        found: usize,
    },

    #[error("record {record}: invalid {field} '{value}'")]
    InvalidField {
        record: usize,
        field: &'static str,
        value: String,
    },
}

fn reader_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder.has_headers(false).flexible(true).trim(Trim::All);
    builder
}

fn field<T: FromStr>(
    record: &StringRecord,
    idx: usize,
    name: &'static str,
    line: usize,
) -> Result<T, ParseError> {
    let value = &record[idx];
    value.parse().map_err(|_| ParseError::InvalidField {
        record: line,
        field: name,
        value: value.to_string(),
    })
}

/// Turns one `[query, answer, time, memory, states?]` row into a record.
/// `line` is the 1-based record number used in errors.
pub fn parse_record(record: &StringRecord, line: usize) -> Result<ResultRecord, ParseError> {
    if record.len() < 4 {
        return Err(ParseError::MissingFields {
            record: line,
            expected: 4,
            found: record.len(),
        });
    }
    let elapsed_time = field::<f64>(record, 2, "time", line)?;
    let memory = field::<f64>(record, 3, "memory", line)?;
    let explored_states = if record.len() > 4 && !record[4].is_empty() {
        field::<i64>(record, 4, "explored states", line)?
    } else {
        NOT_REPORTED
    };
    Ok(ResultRecord {
        query: record[0].to_string(),
        answer: record[1].to_string(),
        elapsed_time,
        memory,
        explored_states,
    })
}

/// Reads a whole result file. The first malformed record aborts the read.
pub fn parse_reader<R: Read>(reader: R) -> Result<ResultSet, ParseError> {
    let mut rdr = reader_builder().from_reader(reader);
    let mut set = ResultSet::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        set.insert(parse_record(&record, idx + 1)?);
    }
    Ok(set)
}

pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<ResultSet, ParseError> {
    parse_reader(File::open(path)?)
}

/// Newline separated query names, trimmed, blank lines ignored.
pub fn parse_query_list(text: &str) -> HashSet<String> {
    text.lines()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn read_query_list<P: AsRef<Path>>(path: P) -> Result<HashSet<String>, ParseError> {
    Ok(parse_query_list(&fs::read_to_string(path)?))
}

/// Reads `[query, expected_answer]` rows.
pub fn parse_oracle<R: Read>(reader: R) -> Result<HashMap<String, String>, ParseError> {
    let mut rdr = reader_builder().from_reader(reader);
    let mut oracle = HashMap::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        if record.len() < 2 {
            return Err(ParseError::MissingFields {
                record: idx + 1,
                expected: 2,
                found: record.len(),
            });
        }
        oracle.insert(record[0].to_string(), record[1].to_string());
    }
    Ok(oracle)
}

pub fn read_oracle<P: AsRef<Path>>(path: P) -> Result<HashMap<String, String>, ParseError> {
    parse_oracle(File::open(path)?)
}

#[test]
fn parses_four_and_five_field_rows() {
    let input = "q1-LTLC, TRUE, 1.5, 2048\nq2-LTLF,FALSE,0.25,512,42\n";
    let set = parse_reader(input.as_bytes()).unwrap();
    assert_eq!(set.len(), 2);
    let q1 = set.get("q1-LTLC").unwrap();
    assert_eq!(q1.answer, "TRUE");
    assert_eq!(q1.elapsed_time, 1.5);
    assert_eq!(q1.memory, 2048.0);
    assert_eq!(q1.explored_states, NOT_REPORTED);
    assert_eq!(set.get("q2-LTLF").unwrap().explored_states, 42);
}

#[test]
fn rejects_malformed_time() {
    let input = "q1,TRUE,1.0,10\nq2,TRUE,fast,10\n";
    match parse_reader(input.as_bytes()) {
        Err(ParseError::InvalidField { record, field, value }) => {
            assert_eq!(record, 2);
            assert_eq!(field, "time");
            assert_eq!(value, "fast");
        }
        other => panic!("expected invalid field, got {:?}", other),
    }
}

#[test]
fn rejects_short_rows() {
    let res = parse_reader("q1,TRUE,1.0\n".as_bytes());
    assert!(matches!(
        res,
        Err(ParseError::MissingFields { record: 1, expected: 4, found: 3 })
    ));
}

#[test]
fn empty_input_is_empty_set() {
    assert!(parse_reader("".as_bytes()).unwrap().is_empty());
}

#[test]
fn query_list_ignores_blank_lines() {
    let list = parse_query_list("a\n\n  b  \n");
    assert_eq!(list.len(), 2);
    assert!(list.contains("a"));
    assert!(list.contains("b"));
}

#[test]
fn oracle_rows() {
    let oracle = parse_oracle("q1, TRUE\nq2,FALSE\n".as_bytes()).unwrap();
    assert_eq!(oracle.get("q1").map(String::as_str), Some("TRUE"));
    assert_eq!(oracle.get("q2").map(String::as_str), Some("FALSE"));
}

#[test]
fn reads_result_file() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "q1,TRUE,3.0,100,7").unwrap();
    let set = parse_file(file.path()).unwrap();
    assert_eq!(set.get("q1").unwrap().explored_states, 7);
}
