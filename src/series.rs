use crate::record::{ResultRecord, ResultSet};

/// What a cactus plot puts on its y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Time,
    /// Megabytes.
    Memory,
    ExploredStates,
}

impl Metric {
    pub fn value(&self, record: &ResultRecord) -> Option<f64> {
        match self {
            Metric::Time => Some(record.elapsed_time),
            Metric::Memory => Some(record.memory / 1024.0),
            Metric::ExploredStates if record.states_reported() => Some(record.explored_states as f64),
            Metric::ExploredStates => None,
        }
    }

    /// File name suffix and plot title.
    pub fn label(&self) -> (&'static str, &'static str) {
        match self {
            Metric::Time => ("time", "Time (in seconds)"),
            Metric::Memory => ("memory", "Memory (in MB)"),
            Metric::ExploredStates => ("explored", "Explored states"),
        }
    }
}

/// Sorted values of one configuration, plotted as `(rank, value)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CactusSeries {
    pub name: String,
    /// Size of the result set the series was built from.
    pub total: usize,
    pub points: Vec<(usize, f64)>,
}

impl CactusSeries {
    /// Number of records left out by the bounds, also the rank of the first point.
    pub fn excluded(&self) -> usize {
        self.total - self.points.len()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|&(_, v)| v)
    }

    pub fn last_rank(&self) -> Option<usize> {
        self.points.last().map(|&(r, _)| r)
    }
}

/// Keeps values with `floor <= v < limit`, sorts them and ranks them starting
/// at the number of values left out.
pub fn cactus_points<I>(values: I, limit: Option<f64>, floor: Option<f64>) -> Vec<(usize, f64)>
where
    I: IntoIterator<Item = f64>,
{
    let mut total = 0;
    let mut kept: Vec<f64> = values
        .into_iter()
        .inspect(|_| total += 1)
        .filter(|&v| limit.map_or(true, |l| v < l) && floor.map_or(true, |f| v >= f))
        .collect();
    kept.sort_by(f64::total_cmp);
    let excluded = total - kept.len();
    kept.into_iter().enumerate().map(|(idx, v)| (excluded + idx, v)).collect()
}

/// Cactus series of `metric` over `set`. The bounds only apply to time.
pub fn cactus_series(
    name: &str,
    set: &ResultSet,
    metric: Metric,
    limit: Option<f64>,
    floor: Option<f64>,
) -> CactusSeries {
    let (limit, floor) = match metric {
        Metric::Time => (limit, floor),
        _ => (None, None),
    };
    let values: Vec<f64> = set.records().filter_map(|r| metric.value(r)).collect();
    CactusSeries {
        name: name.to_string(),
        total: values.len(),
        points: cactus_points(values, limit, floor),
    }
}

/// Axis ranges showing only the last points of a group of series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub x_min: usize,
    pub x_max: usize,
    pub y_min: f64,
    pub y_max: f64,
}

/// Frames the last `n` points of the longest series. With `skip_last` the last
/// series (the virtual best) does not count towards the longest.
pub fn tail_window(series: &[CactusSeries], n: usize, skip_last: bool) -> Option<Window> {
    let counted = if skip_last && !series.is_empty() {
        &series[..series.len() - 1]
    } else {
        series
    };
    let longest = series.iter().map(|s| s.points.len()).max()?;
    let cut = counted
        .iter()
        .map(|s| s.points.len())
        .max()
        .unwrap_or(longest)
        .saturating_sub(n);

    let y_min = series
        .iter()
        .filter_map(|s| s.points.get(cut).map(|&(_, v)| v))
        .fold(f64::INFINITY, f64::min);
    let y_max = series
        .iter()
        .filter_map(|s| s.points.last().map(|&(_, v)| v))
        .fold(f64::NEG_INFINITY, f64::max);
    if !y_min.is_finite() || !y_max.is_finite() {
        return None;
    }
    Some(Window {
        x_min: cut,
        x_max: longest + 5,
        y_min: 0.8 * y_min,
        y_max: 1.2 * y_max,
    })
}

#[test]
fn points_are_sorted_and_offset() {
    let points = cactus_points(vec![5.0, 0.5, 3.0, 100.0, 2.0], Some(10.0), Some(1.0));
    assert_eq!(points, vec![(2, 2.0), (3, 3.0), (4, 5.0)]);
}

#[test]
fn unbounded_points_start_at_zero() {
    let points = cactus_points(vec![2.0, 1.0, 2.0], None, None);
    assert_eq!(points, vec![(0, 1.0), (1, 2.0), (2, 2.0)]);
}

#[test]
fn limit_is_exclusive_floor_inclusive() {
    let points = cactus_points(vec![1.0, 10.0], Some(10.0), Some(1.0));
    assert_eq!(points, vec![(1, 1.0)]);
}

#[test]
fn empty_set_gives_empty_series() {
    let series = cactus_series("A", &ResultSet::new(), Metric::Time, Some(1.0), None);
    assert!(series.points.is_empty());
    assert_eq!(series.excluded(), 0);
}

#[test]
fn memory_series_ignores_bounds() {
    let set: ResultSet = vec![
        ResultRecord::new("q1", "TRUE", 100.0, 2048.0),
        ResultRecord::new("q2", "TRUE", 1.0, 1024.0),
    ]
    .into_iter()
    .collect();
    let series = cactus_series("A", &set, Metric::Memory, Some(10.0), None);
    assert_eq!(series.points, vec![(0, 1.0), (1, 2.0)]);
    let time = cactus_series("A", &set, Metric::Time, Some(10.0), None);
    assert_eq!(time.points, vec![(1, 1.0)]);
    assert_eq!(time.excluded(), 1);
}

#[test]
fn explored_series_skips_unreported() {
    let set: ResultSet = vec![
        ResultRecord::new("q1", "TRUE", 1.0, 1.0).with_states(7),
        ResultRecord::new("q2", "TRUE", 1.0, 1.0),
    ]
    .into_iter()
    .collect();
    let series = cactus_series("A", &set, Metric::ExploredStates, None, None);
    assert_eq!(series.points, vec![(0, 7.0)]);
    assert_eq!(series.total, 1);
}

#[test]
fn tail_frames_last_points() {
    let a = CactusSeries {
        name: "A".into(),
        total: 4,
        points: cactus_points(vec![1.0, 2.0, 3.0, 4.0], None, None),
    };
    let b = CactusSeries {
        name: "B".into(),
        total: 2,
        points: cactus_points(vec![1.0, 10.0], None, None),
    };
    let window = tail_window(&[a, b], 2, false).unwrap();
    assert_eq!(window.x_min, 2);
    assert_eq!(window.x_max, 9);
    assert!((window.y_min - 2.4).abs() < 1e-9);
    assert!((window.y_max - 12.0).abs() < 1e-9);
}

#[test]
fn tail_of_nothing() {
    assert_eq!(tail_window(&[], 3, true), None);
}
