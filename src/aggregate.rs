use std::collections::HashSet;

use crate::record::{Dataset, ResultRecord, ResultSet, NOT_REPORTED};

pub const VIRTUAL_BEST: &str = "Virtual Best Solver";

/// Best observed time, memory and explored states per query across all
/// configurations.
///
/// Each field is minimised on its own, so the values for one query may come
/// from different configurations. The answer is the one of the fastest
/// contributor. States are minimised over the configurations that reported
/// them.
pub fn virtual_best(sets: &Dataset) -> ResultSet {
    let mut best = ResultSet::new();
    for query in sets.all_queries() {
        let answers: Vec<&ResultRecord> = sets.sets().filter_map(|s| s.get(query)).collect();
        let Some(fastest) = answers
            .iter()
            .min_by(|a, b| a.elapsed_time.total_cmp(&b.elapsed_time))
        else {
            continue;
        };
        let memory = answers.iter().map(|r| r.memory).fold(f64::INFINITY, f64::min);
        let states = answers
            .iter()
            .filter(|r| r.states_reported())
            .map(|r| r.explored_states)
            .min()
            .unwrap_or(NOT_REPORTED);
        best.insert(ResultRecord {
            query: query.to_string(),
            answer: fastest.answer.clone(),
            elapsed_time: fastest.elapsed_time,
            memory,
            explored_states: states,
        });
    }
    best
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub time: usize,
    pub memory: usize,
    pub states: usize,
    /// Queries answered by `other` but not by `base`.
    pub exclusive: usize,
}

/// Counts the queries on which `other` beats `base` by more than `factor`.
///
/// A query only `other` answered wins in every category. Queries where either
/// side finished within `min_time` seconds are ignored.
pub fn score(
    base: &ResultSet,
    other: &ResultSet,
    suffix: Option<&str>,
    factor: f64,
    min_time: Option<f64>,
) -> Score {
    let mut score = Score::default();
    for row in other {
        if suffix.map_or(false, |s| !row.query.ends_with(s)) {
            continue;
        }
        let Some(base_row) = base.get(&row.query) else {
            score.time += 1;
            score.memory += 1;
            score.states += 1;
            score.exclusive += 1;
            continue;
        };
        if min_time.map_or(false, |m| row.elapsed_time.min(base_row.elapsed_time) <= m) {
            continue;
        }
        if row.elapsed_time < base_row.elapsed_time * factor {
            score.time += 1;
        }
        if row.memory < base_row.memory * factor {
            score.memory += 1;
        }
        if row.explored_states > 0
            && (row.explored_states as f64) < base_row.explored_states as f64 * factor
        {
            score.states += 1;
        }
    }
    score
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    LtlcPositive,
    LtlcNegative,
    LtlfPositive,
    LtlfNegative,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::LtlcPositive,
        Category::LtlcNegative,
        Category::LtlfPositive,
        Category::LtlfNegative,
    ];

    pub fn of(record: &ResultRecord) -> Option<Category> {
        let cardinality = if record.query.ends_with("LTLC") {
            true
        } else if record.query.ends_with("LTLF") {
            false
        } else {
            return None;
        };
        match (cardinality, record.answer.as_str()) {
            (true, "TRUE") => Some(Category::LtlcPositive),
            (true, "FALSE") => Some(Category::LtlcNegative),
            (false, "TRUE") => Some(Category::LtlfPositive),
            (false, "FALSE") => Some(Category::LtlfNegative),
            _ => None,
        }
    }
}

/// Answers per [`Category`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnswerCounts {
    pub ltlc_positive: usize,
    pub ltlc_negative: usize,
    pub ltlf_positive: usize,
    pub ltlf_negative: usize,
}

impl AnswerCounts {
    pub fn count(set: &ResultSet, exclude: Option<&HashSet<String>>) -> Self {
        let mut counts = AnswerCounts::default();
        for record in set {
            if exclude.map_or(false, |e| e.contains(&record.query)) {
                continue;
            }
            match Category::of(record) {
                Some(Category::LtlcPositive) => counts.ltlc_positive += 1,
                Some(Category::LtlcNegative) => counts.ltlc_negative += 1,
                Some(Category::LtlfPositive) => counts.ltlf_positive += 1,
                Some(Category::LtlfNegative) => counts.ltlf_negative += 1,
                None => {}
            }
        }
        counts
    }

    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::LtlcPositive => self.ltlc_positive,
            Category::LtlcNegative => self.ltlc_negative,
            Category::LtlfPositive => self.ltlf_positive,
            Category::LtlfNegative => self.ltlf_negative,
        }
    }

    pub fn total(&self) -> usize {
        self.ltlc_positive + self.ltlc_negative + self.ltlf_positive + self.ltlf_negative
    }
}

/// Relative change of `a` against `b`; `None` when `b` is zero.
pub fn percent_diff(a: usize, b: usize) -> Option<f64> {
    if b == 0 {
        None
    } else {
        Some((a as f64 - b as f64) / b as f64)
    }
}

#[cfg(test)]
fn rec(q: &str, t: f64, m: f64, s: i64) -> ResultRecord {
    ResultRecord::new(q, "TRUE", t, m).with_states(s)
}

#[cfg(test)]
fn dataset_of(configs: Vec<(&str, Vec<ResultRecord>)>) -> Dataset {
    let mut dataset = Dataset::new();
    for (name, records) in configs {
        dataset.insert(name.to_string(), records.into_iter().collect());
    }
    dataset
}

#[test]
fn virtual_best_takes_independent_minima() {
    let dataset = dataset_of(vec![
        ("A", vec![rec("q1", 1.0, 500.0, 30), rec("q2", 7.0, 10.0, 5)]),
        ("B", vec![rec("q1", 3.0, 100.0, 10)]),
    ]);
    let best = virtual_best(&dataset);
    assert_eq!(best.len(), 2);
    let q1 = best.get("q1").unwrap();
    assert_eq!(q1.elapsed_time, 1.0);
    assert_eq!(q1.memory, 100.0);
    assert_eq!(q1.explored_states, 10);
    assert_eq!(best.get("q2").unwrap().elapsed_time, 7.0);
}

#[test]
fn virtual_best_of_single_configuration_is_identity() {
    let set: ResultSet = vec![rec("q1", 1.0, 2.0, 3), rec("q2", 4.0, 5.0, NOT_REPORTED)]
        .into_iter()
        .collect();
    let mut dataset = Dataset::new();
    dataset.insert("X".to_string(), set.clone());
    assert_eq!(virtual_best(&dataset), set);
}

#[test]
fn virtual_best_ignores_unreported_states() {
    let dataset = dataset_of(vec![
        ("A", vec![rec("q1", 1.0, 1.0, NOT_REPORTED)]),
        ("B", vec![rec("q1", 2.0, 1.0, 12)]),
    ]);
    assert_eq!(virtual_best(&dataset).get("q1").unwrap().explored_states, 12);
}

#[test]
fn score_counts_wins_and_exclusives() {
    let base: ResultSet = vec![rec("q1", 10.0, 100.0, 100)].into_iter().collect();
    let other: ResultSet = vec![rec("q1", 8.0, 95.0, 50), rec("q2", 5.0, 1.0, 1)]
        .into_iter()
        .collect();
    let s = score(&base, &other, None, 0.9, None);
    assert_eq!(
        s,
        Score {
            time: 2,
            memory: 1,
            states: 2,
            exclusive: 1
        }
    );
}

#[test]
fn score_against_itself_is_zero() {
    let set: ResultSet = vec![rec("q1", 10.0, 100.0, 100), rec("q2", 1.0, 1.0, 0)]
        .into_iter()
        .collect();
    assert_eq!(score(&set, &set, None, 1.0, None), Score::default());
}

#[test]
fn score_skips_fast_queries_and_other_suffixes() {
    let base: ResultSet = vec![rec("a-LTLC", 2.0, 100.0, 100), rec("b-LTLF", 100.0, 100.0, 100)]
        .into_iter()
        .collect();
    let other: ResultSet = vec![rec("a-LTLC", 1.0, 1.0, 1), rec("b-LTLF", 1.0, 1.0, 1)]
        .into_iter()
        .collect();
    assert_eq!(score(&base, &other, Some("LTLC"), 0.9, Some(5.0)), Score::default());
    assert_eq!(score(&base, &other, Some("LTLF"), 0.9, Some(5.0)).time, 0);
    assert_eq!(score(&base, &other, Some("LTLF"), 0.9, None).time, 1);
}

#[test]
fn counts_answers_by_category() {
    let set: ResultSet = vec![
        ResultRecord::new("a-LTLC", "TRUE", 1.0, 1.0),
        ResultRecord::new("b-LTLC", "FALSE", 1.0, 1.0),
        ResultRecord::new("c-LTLF", "FALSE", 1.0, 1.0),
        ResultRecord::new("d-LTLF", "FALSE", 1.0, 1.0),
        ResultRecord::new("e-LTLF", "UNKNOWN", 1.0, 1.0),
    ]
    .into_iter()
    .collect();
    let counts = AnswerCounts::count(&set, None);
    assert_eq!(counts.get(Category::LtlcPositive), 1);
    assert_eq!(counts.get(Category::LtlcNegative), 1);
    assert_eq!(counts.get(Category::LtlfPositive), 0);
    assert_eq!(counts.get(Category::LtlfNegative), 2);
    assert_eq!(counts.total(), 4);

    let exclude: HashSet<String> = ["c-LTLF".to_string()].into_iter().collect();
    assert_eq!(AnswerCounts::count(&set, Some(&exclude)).ltlf_negative, 1);
}

#[test]
fn percent_diff_of_zero_baseline() {
    assert_eq!(percent_diff(3, 0), None);
    assert_eq!(percent_diff(15, 10), Some(0.5));
}
