//! Reducers narrowing a [`Dataset`] down to the queries worth comparing.
//!
//! Every filter returns a new dataset with the same configuration names; an
//! empty result set is a valid output.

use std::collections::{BTreeSet, HashSet};

use crate::error::{Error, Result};
use crate::record::{Dataset, ResultSet};

/// Drops records taking longer than `ceiling` or less than `floor`.
pub fn apply_time_bounds(set: &ResultSet, ceiling: Option<f64>, floor: Option<f64>) -> ResultSet {
    set.filtered(|r| {
        ceiling.map_or(true, |c| r.elapsed_time <= c) && floor.map_or(true, |f| r.elapsed_time >= f)
    })
}

/// Restricts every other configuration to the queries `reference` answered.
pub fn apply_weak_reference(sets: &Dataset, reference: &str) -> Result<Dataset> {
    let master: HashSet<String> = sets
        .get(reference)
        .ok_or_else(|| Error::UnknownConfiguration(reference.to_string()))?
        .queries()
        .map(str::to_string)
        .collect();

    Ok(sets.map(|name, set| {
        if name == reference {
            set.clone()
        } else {
            set.filtered(|r| master.contains(&r.query))
        }
    }))
}

pub fn apply_allowlist(sets: &Dataset, allowlist: &HashSet<String>) -> Dataset {
    sets.map(|_, set| set.filtered(|r| allowlist.contains(&r.query)))
}

pub fn apply_exclusion(sets: &Dataset, excluded: &HashSet<String>) -> Dataset {
    sets.map(|_, set| set.filtered(|r| !excluded.contains(&r.query)))
}

/// Keeps only the queries present in every configuration.
pub fn apply_intersection(sets: &Dataset) -> Dataset {
    let mut keys = sets.sets().map(ResultSet::query_set);
    let common: BTreeSet<String> = match keys.next() {
        Some(first) => keys
            .fold(first, |acc, k| acc.intersection(&k).copied().collect())
            .into_iter()
            .map(str::to_string)
            .collect(),
        None => return sets.clone(),
    };
    sets.map(|_, set| set.filtered(|r| common.contains(&r.query)))
}

/// Which filters to run over a dataset.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub ceiling: Option<f64>,
    pub floor: Option<f64>,
    /// Name of the configuration holding only weak data.
    pub weak_reference: Option<String>,
    pub allowlist: Option<HashSet<String>>,
    pub exclude: Option<HashSet<String>>,
    pub intersection: bool,
}

impl FilterCriteria {
    /// Runs time bounds, exclusion, weak reference, allow-list and
    /// intersection, in that order.
    pub fn apply(&self, sets: &Dataset) -> Result<Dataset> {
        let mut out = sets.map(|_, set| apply_time_bounds(set, self.ceiling, self.floor));
        if let Some(exclude) = &self.exclude {
            out = apply_exclusion(&out, exclude);
        }
        if let Some(reference) = &self.weak_reference {
            out = apply_weak_reference(&out, reference)?;
        }
        if let Some(allowlist) = &self.allowlist {
            out = apply_allowlist(&out, allowlist);
        }
        if self.intersection {
            out = apply_intersection(&out);
        }
        Ok(out)
    }
}

#[cfg(test)]
fn set_of(queries: &[(&str, f64)]) -> ResultSet {
    use crate::record::ResultRecord;

    queries
        .iter()
        .map(|&(q, t)| ResultRecord::new(q, "TRUE", t, 1.0))
        .collect()
}

#[cfg(test)]
fn dataset_of(configs: Vec<(&str, ResultSet)>) -> Dataset {
    let (names, sets): (Vec<_>, Vec<_>) = configs
        .into_iter()
        .map(|(n, s)| (n.to_string(), s))
        .unzip();
    Dataset::from_parts(names, sets).unwrap()
}

#[test]
fn time_bounds_drop_outliers() {
    let set = set_of(&[("q1", 0.5), ("q2", 5.0), ("q3", 50.0)]);
    let bounded = apply_time_bounds(&set, Some(10.0), Some(1.0));
    assert_eq!(bounded.queries().collect::<Vec<_>>(), vec!["q2"]);
    assert_eq!(apply_time_bounds(&set, None, None), set);
}

#[test]
fn time_ceiling_is_inclusive() {
    let set = set_of(&[("q1", 10.0)]);
    assert_eq!(apply_time_bounds(&set, Some(10.0), None).len(), 1);
}

#[test]
fn weak_reference_narrows_others() {
    let dataset = dataset_of(vec![
        ("A", set_of(&[("q1", 1.0), ("q2", 1.0)])),
        ("B", set_of(&[("q1", 1.0), ("q2", 1.0), ("q3", 1.0)])),
    ]);
    let out = apply_weak_reference(&dataset, "A").unwrap();
    assert_eq!(out.get("A"), dataset.get("A"));
    assert_eq!(out.get("B").unwrap().queries().collect::<Vec<_>>(), vec!["q1", "q2"]);
}

#[test]
fn weak_reference_must_exist() {
    let dataset = dataset_of(vec![("A", set_of(&[]))]);
    assert!(matches!(
        apply_weak_reference(&dataset, "Z"),
        Err(Error::UnknownConfiguration(_))
    ));
}

#[test]
fn intersection_equalises_key_sets() {
    let dataset = dataset_of(vec![
        ("A", set_of(&[("q1", 1.0), ("q2", 1.0)])),
        ("B", set_of(&[("q2", 1.0), ("q3", 1.0)])),
        ("C", set_of(&[("q2", 1.0), ("q1", 1.0)])),
    ]);
    let out = apply_intersection(&dataset);
    for (name, set) in out.iter() {
        assert_eq!(set.queries().collect::<Vec<_>>(), vec!["q2"], "{}", name);
        assert!(set.queries().all(|q| dataset.get(name).unwrap().contains(q)));
    }
}

#[test]
fn intersection_of_nothing_is_nothing() {
    assert!(apply_intersection(&Dataset::new()).is_empty());
}

#[test]
fn allowlist_and_exclusion() {
    let dataset = dataset_of(vec![("A", set_of(&[("q1", 1.0), ("q2", 1.0)]))]);
    let list: HashSet<String> = ["q1".to_string()].into_iter().collect();
    let allowed = apply_allowlist(&dataset, &list);
    assert_eq!(allowed.get("A").unwrap().queries().collect::<Vec<_>>(), vec!["q1"]);
    let excluded = apply_exclusion(&dataset, &list);
    assert_eq!(excluded.get("A").unwrap().queries().collect::<Vec<_>>(), vec!["q2"]);
}

#[test]
fn criteria_apply_weak_before_intersection() {
    let dataset = dataset_of(vec![
        ("weak", set_of(&[("q1", 1.0), ("q2", 20.0)])),
        ("strong", set_of(&[("q1", 2.0), ("q2", 3.0), ("q3", 4.0)])),
    ]);
    let criteria = FilterCriteria {
        ceiling: Some(10.0),
        weak_reference: Some("weak".to_string()),
        intersection: true,
        ..Default::default()
    };
    let out = criteria.apply(&dataset).unwrap();
    assert_eq!(out.get("weak").unwrap().queries().collect::<Vec<_>>(), vec!["q1"]);
    assert_eq!(out.get("strong").unwrap().queries().collect::<Vec<_>>(), vec!["q1"]);
}
