use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

use crate::record::{ResultRecord, ResultSet};

/// Answers of one run split against an oracle.
#[derive(Debug, Default)]
pub struct Comparison<'a> {
    pub good: Vec<&'a ResultRecord>,
    pub bad: Vec<&'a ResultRecord>,
    /// Answers for queries the oracle does not know; not comparable.
    pub not_in_oracle: usize,
}

pub fn compare_results<'a>(answers: &'a ResultSet, oracle: &HashMap<String, String>) -> Comparison<'a> {
    let mut cmp = Comparison::default();
    for record in answers {
        match oracle.get(&record.query) {
            Some(expected) if *expected == record.answer => cmp.good.push(record),
            Some(_) => cmp.bad.push(record),
            None => cmp.not_in_oracle += 1,
        }
    }
    cmp
}

/// Answers dropped before comparing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Skipped {
    /// Dropped for any reason.
    pub total: usize,
    /// Dropped because query simplification answered them.
    pub simplification: usize,
}

/// Drops excluded queries and answers slower than `upper_minutes`.
pub fn select_answers(
    answers: &ResultSet,
    exclude: &HashSet<String>,
    upper_minutes: Option<f64>,
) -> (ResultSet, Skipped) {
    let mut skipped = Skipped::default();
    let kept = answers.filtered(|r| {
        if exclude.contains(&r.query) {
            skipped.total += 1;
            skipped.simplification += 1;
            return false;
        }
        if upper_minutes.map_or(true, |u| u >= r.elapsed_time / 60.0) {
            return true;
        }
        skipped.total += 1;
        false
    });
    (kept, skipped)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub total_queries: usize,
    pub answered: usize,
    pub correct: usize,
    pub not_in_oracle: usize,
    pub skipped: Skipped,
}

impl Statistics {
    pub fn new(total_queries: usize, answered: usize, cmp: &Comparison, skipped: Skipped) -> Self {
        Statistics {
            total_queries,
            answered,
            correct: cmp.good.len(),
            not_in_oracle: cmp.not_in_oracle,
            skipped,
        }
    }

    pub fn comparable(&self) -> usize {
        self.answered - self.not_in_oracle
    }
}

fn percentage(part: usize, whole: usize) -> String {
    if whole == 0 {
        "n/a".to_string()
    } else {
        format!("{}%", part as f64 / whole as f64 * 100.0)
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of queries: {}", self.total_queries)?;
        writeln!(f, "Number of answers not in oracle: {}", self.not_in_oracle)?;
        writeln!(
            f,
            "Number of answered queries of all queries: {}/{}",
            self.answered, self.total_queries
        )?;
        writeln!(f, "Percentage answered: {}", percentage(self.answered, self.total_queries))?;
        writeln!(f, "Number of correct of answered: {}/{}", self.correct, self.comparable())?;
        writeln!(
            f,
            "Percentage correct of answered: {}",
            percentage(self.correct, self.comparable())
        )?;
        if self.skipped.total > 0 {
            writeln!(
                f,
                "Number of answers from query simplification: {}",
                self.skipped.simplification
            )?;
            writeln!(f, "Total queries answered: {}", self.answered + self.skipped.total)?;
        }
        Ok(())
    }
}

/// Queries whose answer needed no state exploration.
///
/// A query is trivial when any run answered it without reporting explored
/// states, or when its explored states add up to zero over all runs.
pub fn trivial_answers<'a, I>(runs: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a ResultSet>,
{
    let mut trivial = BTreeSet::new();
    let mut explored: BTreeMap<&str, i64> = BTreeMap::new();
    for run in runs {
        for record in run {
            if record.states_reported() {
                *explored.entry(record.query.as_str()).or_insert(0) += record.explored_states;
            } else {
                trivial.insert(record.query.clone());
            }
        }
    }
    trivial.extend(
        explored
            .into_iter()
            .filter(|&(_, n)| n == 0)
            .map(|(q, _)| q.to_string()),
    );
    trivial
}

#[cfg(test)]
fn answers() -> ResultSet {
    vec![
        ResultRecord::new("q1", "TRUE", 30.0, 1.0),
        ResultRecord::new("q2", "FALSE", 90.0, 1.0),
        ResultRecord::new("q3", "TRUE", 10.0, 1.0),
        ResultRecord::new("q4", "TRUE", 10.0, 1.0),
    ]
    .into_iter()
    .collect()
}

#[cfg(test)]
fn oracle() -> HashMap<String, String> {
    [("q1", "TRUE"), ("q2", "TRUE"), ("q3", "TRUE")]
        .iter()
        .map(|&(q, a)| (q.to_string(), a.to_string()))
        .collect()
}

#[test]
fn splits_good_and_bad() {
    let answers = answers();
    let cmp = compare_results(&answers, &oracle());
    assert_eq!(cmp.good.len(), 2);
    assert_eq!(cmp.bad.len(), 1);
    assert_eq!(cmp.bad[0].query, "q2");
    assert_eq!(cmp.not_in_oracle, 1);
}

#[test]
fn upper_bound_in_minutes() {
    let exclude: HashSet<String> = ["q4".to_string()].into_iter().collect();
    let (kept, skipped) = select_answers(&answers(), &exclude, Some(1.0));
    assert_eq!(kept.queries().collect::<Vec<_>>(), vec!["q1", "q3"]);
    assert_eq!(skipped, Skipped { total: 2, simplification: 1 });
}

#[test]
fn statistics_report() {
    let answers = answers();
    let cmp = compare_results(&answers, &oracle());
    let stats = Statistics::new(8, answers.len(), &cmp, Skipped::default());
    let text = stats.to_string();
    assert!(text.contains("Number of answered queries of all queries: 4/8\n"));
    assert!(text.contains("Percentage answered: 50%\n"));
    assert!(text.contains("Number of correct of answered: 2/3\n"));
    assert!(!text.contains("Total queries answered"));
}

#[test]
fn statistics_without_comparable_answers() {
    let stats = Statistics::new(0, 0, &Comparison::default(), Skipped::default());
    assert!(stats.to_string().contains("Percentage correct of answered: n/a"));
}

#[test]
fn trivial_when_unreported_or_zero() {
    let a: ResultSet = vec![
        ResultRecord::new("q1", "TRUE", 1.0, 1.0).with_states(0),
        ResultRecord::new("q2", "TRUE", 1.0, 1.0).with_states(5),
        ResultRecord::new("q3", "TRUE", 1.0, 1.0),
    ]
    .into_iter()
    .collect();
    let b: ResultSet = vec![
        ResultRecord::new("q1", "TRUE", 1.0, 1.0).with_states(0),
        ResultRecord::new("q2", "TRUE", 1.0, 1.0).with_states(0),
    ]
    .into_iter()
    .collect();
    let trivial = trivial_answers([&a, &b]);
    assert_eq!(trivial.into_iter().collect::<Vec<_>>(), vec!["q1", "q3"]);
}
