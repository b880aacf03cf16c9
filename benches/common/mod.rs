//! Reading criterion estimates back and charting them.

use plotters::coord::Shift;
use plotters::coord::ranged1d::Ranged;
use plotters::prelude::*;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const BOXSIZE: f64 = 420.0;
pub const PIMAX: f64 = 40.0;

const SERIES_COLORS: [RGBColor; 5] = [RED, BLUE, GREEN, MAGENTA, CYAN];

#[derive(Deserialize)]
struct Estimates {
    mean: Mean,
}

#[derive(Deserialize)]
struct Mean {
    point_estimate: f64,
    confidence_interval: Interval,
}

#[derive(Deserialize)]
struct Interval {
    lower_bound: f64,
    upper_bound: f64,
}

/// Mean wall time of one benchmark point, in milliseconds.
#[derive(Clone, Copy, Debug)]
pub struct Timing {
    pub x: usize,
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
}

pub type Timings = BTreeMap<&'static str, Vec<Timing>>;

/// Uniform catalog in `[0, BOXSIZE)^3`.
pub fn uniform_catalog(n: usize, seed: u64) -> [Vec<f64>; 3] {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut axis = || (0..n).map(|_| rng.gen_range(0.0..BOXSIZE)).collect::<Vec<f64>>();
    [axis(), axis(), axis()]
}

/// Collects `target/criterion/<group>/<method>/<x>/base/estimates.json` for
/// every method and parameter that has been run. Methods with no results are
/// left out.
pub fn read_timings(group: &str, methods: &[&'static str], xs: &[usize]) -> Result<Timings, Box<dyn Error>> {
    let root = Path::new("target/criterion").join(group);
    let mut timings = Timings::new();
    if !root.exists() {
        return Ok(timings);
    }

    for &method in methods {
        let mut series = Vec::new();
        for &x in xs {
            let path = root.join(method).join(x.to_string()).join("base/estimates.json");
            if !path.exists() {
                continue;
            }
            let estimates: Estimates = serde_json::from_reader(BufReader::new(File::open(&path)?))?;
            let mean = estimates.mean;
            series.push(Timing {
                x,
                mean: mean.point_estimate / 1e6,
                lower: mean.confidence_interval.lower_bound / 1e6,
                upper: mean.confidence_interval.upper_bound / 1e6,
            });
        }
        if !series.is_empty() {
            series.sort_by_key(|t| t.x);
            timings.insert(method, series);
        }
    }
    Ok(timings)
}

/// `benches/results/<stem>_<short git hash>.png`, creating the directory.
pub fn plot_path(stem: &str) -> Result<PathBuf, Box<dyn Error>> {
    let out_dir = Path::new("benches/results");
    std::fs::create_dir_all(out_dir)?;
    let rev = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string());
    Ok(out_dir.join(format!("{}_{}.png", stem, rev)))
}

pub fn canvas(path: &Path) -> Result<DrawingArea<BitMapBackend<'_>, Shift>, Box<dyn Error>> {
    let area = BitMapBackend::new(path, (1024, 768)).into_drawing_area();
    area.fill(&WHITE)?;
    Ok(area)
}

pub fn time_range(timings: &Timings) -> (f64, f64) {
    timings
        .values()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), t| (lo.min(t.lower), hi.max(t.upper)))
}

/// Draws every series as a confidence band, a line and markers, then the
/// legend.
pub fn draw_timings<X, Y>(
    chart: &mut ChartContext<'_, BitMapBackend<'_>, Cartesian2d<X, Y>>,
    timings: &Timings,
) -> Result<(), Box<dyn Error>>
where
    X: Ranged<ValueType = f64>,
    Y: Ranged<ValueType = f64>,
{
    for (i, (&method, series)) in timings.iter().enumerate() {
        let color = SERIES_COLORS[i % SERIES_COLORS.len()];
        let means = || series.iter().map(|t| (t.x as f64, t.mean));

        let band: Vec<(f64, f64)> = series
            .iter()
            .map(|t| (t.x as f64, t.upper))
            .chain(series.iter().rev().map(|t| (t.x as f64, t.lower)))
            .collect();
        chart.draw_series(std::iter::once(Polygon::new(band, color.mix(0.2).filled())))?;

        chart
            .draw_series(LineSeries::new(means(), &color))?
            .label(method)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));

        chart.draw_series(PointSeries::of_element(means(), 5, &color, &|c, s, st| {
            EmptyElement::at(c) + Circle::new((0, 0), s, st.filled())
        }))?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    Ok(())
}
