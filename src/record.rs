use std::collections::{btree_map, BTreeMap, BTreeSet};

use crate::error::{Error, Result};

/// Explored-state count of a record whose solver did not report one.
pub const NOT_REPORTED: i64 = -1;

/// One measured outcome for a query under one configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub query: String,
    pub answer: String,
    /// Seconds.
    pub elapsed_time: f64,
    /// As supplied by the harness (KB).
    pub memory: f64,
    pub explored_states: i64,
}

impl ResultRecord {
    pub fn new(query: &str, answer: &str, elapsed_time: f64, memory: f64) -> Self {
        ResultRecord {
            query: query.to_string(),
            answer: answer.to_string(),
            elapsed_time,
            memory,
            explored_states: NOT_REPORTED,
        }
    }

    pub fn with_states(mut self, explored_states: i64) -> Self {
        self.explored_states = explored_states;
        self
    }

    pub fn states_reported(&self) -> bool {
        self.explored_states >= 0
    }
}

/// All results of one configuration, keyed by query.
///
/// Inserting a query that is already present replaces the earlier record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    records: BTreeMap<String, ResultRecord>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: ResultRecord) -> Option<ResultRecord> {
        self.records.insert(record.query.clone(), record)
    }

    pub fn get(&self, query: &str) -> Option<&ResultRecord> {
        self.records.get(query)
    }

    pub fn contains(&self, query: &str) -> bool {
        self.records.contains_key(query)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn queries(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn query_set(&self) -> BTreeSet<&str> {
        self.queries().collect()
    }

    pub fn records(&self) -> btree_map::Values<'_, String, ResultRecord> {
        self.records.values()
    }

    /// Copy of this set keeping only the records matching `keep`.
    pub fn filtered<F>(&self, mut keep: F) -> ResultSet
    where
        F: FnMut(&ResultRecord) -> bool,
    {
        self.records().filter(|r| keep(r)).cloned().collect()
    }
}

impl FromIterator<ResultRecord> for ResultSet {
    fn from_iter<I: IntoIterator<Item = ResultRecord>>(iter: I) -> Self {
        let mut set = ResultSet::new();
        for record in iter {
            set.insert(record);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a ResultRecord;
    type IntoIter = btree_map::Values<'a, String, ResultRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records()
    }
}

/// Named result sets in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    configs: Vec<(String, ResultSet)>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs `names[i]` with `sets[i]`.
    pub fn from_parts(names: Vec<String>, sets: Vec<ResultSet>) -> Result<Self> {
        if names.len() != sets.len() {
            return Err(Error::MismatchedArguments {
                names: names.len(),
                inputs: sets.len(),
            });
        }
        let mut dataset = Dataset::new();
        for (name, set) in names.into_iter().zip(sets) {
            dataset.insert(name, set);
        }
        Ok(dataset)
    }

    /// Adds a configuration, replacing one of the same name in place.
    pub fn insert(&mut self, name: String, set: ResultSet) {
        match self.configs.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = set,
            None => self.configs.push((name, set)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ResultSet> {
        self.configs.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.configs.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResultSet)> {
        self.configs.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn sets(&self) -> impl Iterator<Item = &ResultSet> {
        self.configs.iter().map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// New dataset with the same names, each set replaced by `f(name, set)`.
    pub fn map<F>(&self, mut f: F) -> Dataset
    where
        F: FnMut(&str, &ResultSet) -> ResultSet,
    {
        Dataset {
            configs: self
                .configs
                .iter()
                .map(|(name, set)| (name.clone(), f(name, set)))
                .collect(),
        }
    }

    /// Union of the queries of every configuration.
    pub fn all_queries(&self) -> BTreeSet<&str> {
        self.sets().flat_map(ResultSet::queries).collect()
    }
}

#[test]
fn duplicate_query_last_write_wins() {
    let mut set = ResultSet::new();
    set.insert(ResultRecord::new("q1", "TRUE", 1.0, 10.0));
    let old = set.insert(ResultRecord::new("q1", "FALSE", 2.0, 20.0));
    assert_eq!(old.map(|r| r.answer), Some("TRUE".to_string()));
    assert_eq!(set.len(), 1);
    assert_eq!(set.get("q1").unwrap().answer, "FALSE");
}

#[test]
fn dataset_keeps_input_order() {
    let dataset = Dataset::from_parts(
        vec!["b".to_string(), "a".to_string()],
        vec![ResultSet::new(), ResultSet::new()],
    )
    .unwrap();
    assert_eq!(dataset.names().collect::<Vec<_>>(), vec!["b", "a"]);
}

#[test]
fn dataset_rejects_mismatched_lengths() {
    let res = Dataset::from_parts(vec!["a".to_string()], vec![]);
    assert!(matches!(
        res,
        Err(Error::MismatchedArguments { names: 1, inputs: 0 })
    ));
}

#[test]
fn dataset_insert_replaces_same_name() {
    let mut dataset = Dataset::new();
    dataset.insert("a".to_string(), ResultSet::new());
    let set: ResultSet = vec![ResultRecord::new("q", "TRUE", 1.0, 1.0)]
        .into_iter()
        .collect();
    dataset.insert("a".to_string(), set);
    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.get("a").unwrap().len(), 1);
}
