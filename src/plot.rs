use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

use crate::aggregate::VIRTUAL_BEST;
use crate::error::{Error, Result};
use crate::series::{CactusSeries, Metric, Window};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotFormat {
    Png,
    Svg,
}

impl PlotFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            PlotFormat::Png => "png",
            PlotFormat::Svg => "svg",
        }
    }
}

const COLORS: [RGBColor; 10] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0x8c, 0x56, 0x4b),
    RGBColor(0xe3, 0x77, 0xc2),
    RGBColor(0x7f, 0x7f, 0x7f),
    RGBColor(0xbc, 0xbd, 0x22),
    RGBColor(0x17, 0xbe, 0xcf),
];

const SIZE: (u32, u32) = (1024, 768);

#[derive(Debug, Clone, Default)]
pub struct PlotOptions {
    /// Upper end of the y axis.
    pub y_limit: Option<f64>,
    /// Lower end of the y axis.
    pub y_floor: Option<f64>,
    pub window: Option<Window>,
    pub max_line: bool,
    pub legend: bool,
    pub less_styles: bool,
}

/// `<base>-<metric>.<ext>`
pub fn output_path(base: &str, metric: Metric, format: PlotFormat) -> PathBuf {
    PathBuf::from(format!("{}-{}.{}", base, metric.label().0, format.extension()))
}

/// Axis ranges `(x, y)`; the y range is strictly positive for the log scale.
pub fn axis_ranges(series: &[CactusSeries], opts: &PlotOptions) -> ((usize, usize), (f64, f64)) {
    let x_max = series
        .iter()
        .filter_map(CactusSeries::last_rank)
        .max()
        .map_or(1, |r| r + 1);
    let positive: Vec<f64> = series
        .iter()
        .flat_map(|s| s.values())
        .filter(|&v| v > 0.0)
        .collect();
    let mut y_lo = positive.iter().copied().fold(f64::INFINITY, f64::min) * 0.8;
    let mut y_hi = positive.iter().copied().fold(0.0, f64::max) * 1.2;
    let mut x = (0, x_max);

    if let Some(w) = opts.window {
        x = (w.x_min, w.x_max);
        y_lo = w.y_min;
        y_hi = w.y_max;
    }
    if let Some(top) = opts.y_limit {
        y_hi = top;
    }
    if let Some(bottom) = opts.y_floor {
        y_lo = bottom;
    }
    if !y_lo.is_finite() || y_lo <= 0.0 {
        y_lo = 1e-3;
    }
    if !y_hi.is_finite() || y_hi <= y_lo {
        y_hi = y_lo * 10.0;
    }
    if x.1 <= x.0 {
        x.1 = x.0 + 1;
    }
    (x, (y_lo, y_hi))
}

/// Draws one cactus plot of `metric` with a line per series.
pub fn render_cactus(
    path: &Path,
    format: PlotFormat,
    metric: Metric,
    series: &[CactusSeries],
    opts: &PlotOptions,
) -> Result<()> {
    match format {
        PlotFormat::Png => draw(BitMapBackend::new(path, SIZE).into_drawing_area(), metric, series, opts),
        PlotFormat::Svg => draw(SVGBackend::new(path, SIZE).into_drawing_area(), metric, series, opts),
    }
}

fn plot_err<E: std::fmt::Display>(err: E) -> Error {
    Error::Plot(err.to_string())
}

fn draw<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    metric: Metric,
    series: &[CactusSeries],
    opts: &PlotOptions,
) -> Result<()> {
    root.fill(&WHITE).map_err(plot_err)?;
    let ((x_lo, x_hi), (y_lo, y_hi)) = axis_ranges(series, opts);

    let mut chart = ChartBuilder::on(&root)
        .caption(metric.label().1, ("sans-serif", 30).into_font())
        .margin(20)
        .x_label_area_size(35)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, (y_lo..y_hi).log_scale())
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("Number of answered queries")
        .y_desc(metric.label().1)
        .draw()
        .map_err(plot_err)?;

    let palette = if opts.less_styles { &COLORS[1..] } else { &COLORS[..] };
    for (idx, s) in series.iter().enumerate() {
        let (color, width) = if s.name == VIRTUAL_BEST {
            (BLACK, 2)
        } else {
            (palette[idx % palette.len()], 1)
        };
        let points = s.points.iter().map(|&(r, v)| (r, v.max(y_lo)));
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(width)))
            .map_err(plot_err)?
            .label(format!("{} (n={})", s.name, s.total))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(width)));

        if let Some(x) = s.last_rank().filter(|_| opts.max_line) {
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(x, y_lo), (x, y_hi)],
                    BLACK.mix(0.6).stroke_width(1),
                )))
                .map_err(plot_err)?;
        }
    }

    if opts.legend {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .position(SeriesLabelPosition::UpperLeft)
            .draw()
            .map_err(plot_err)?;
    }

    root.present().map_err(plot_err)?;
    Ok(())
}

#[cfg(test)]
fn series_of(name: &str, points: Vec<(usize, f64)>) -> CactusSeries {
    CactusSeries {
        name: name.to_string(),
        total: points.len(),
        points,
    }
}

#[test]
fn output_names() {
    assert_eq!(
        output_path("A-B", Metric::Time, PlotFormat::Png),
        PathBuf::from("A-B-time.png")
    );
    assert_eq!(
        output_path("out", Metric::Memory, PlotFormat::Svg),
        PathBuf::from("out-memory.svg")
    );
}

#[test]
fn ranges_follow_data() {
    let series = vec![series_of("A", vec![(0, 1.0), (1, 10.0)]), series_of("B", vec![(2, 5.0)])];
    let ((x_lo, x_hi), (y_lo, y_hi)) = axis_ranges(&series, &PlotOptions::default());
    assert_eq!((x_lo, x_hi), (0, 3));
    assert!((y_lo - 0.8).abs() < 1e-9);
    assert!((y_hi - 12.0).abs() < 1e-9);
}

#[test]
fn ranges_respect_limits_and_stay_positive() {
    let series = vec![series_of("A", vec![(0, 0.0), (1, 4.0)])];
    let opts = PlotOptions {
        y_limit: Some(60.0),
        y_floor: Some(0.0),
        ..Default::default()
    };
    let (_, (y_lo, y_hi)) = axis_ranges(&series, &opts);
    assert!(y_lo > 0.0);
    assert_eq!(y_hi, 60.0);
}

#[test]
fn ranges_of_empty_plot() {
    let ((x_lo, x_hi), (y_lo, y_hi)) = axis_ranges(&[], &PlotOptions::default());
    assert!(x_hi > x_lo);
    assert!(y_hi > y_lo && y_lo > 0.0);
}
