//! SVG charts of goals per season and of the goal distribution.

use std::f64::consts::PI;

use crate::analysis::SeasonGoals;
use crate::dataset::Dataset;
use crate::html::escape;

pub const NO_DATA: &str = "No data available for plotting.";

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 400.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 80.0;
const Y_TICKS: usize = 5;
const HISTOGRAM_BINS: usize = 10;
const DENSITY_POINTS: usize = 200;

const SCORED_COLOUR: &str = "blue";
const CONCEDED_COLOUR: &str = "red";

#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    Svg(String),
    Placeholder(String),
}
impl Chart {
    pub fn to_html(&self) -> String {
        match self {
            Chart::Svg(svg) => format!("<figure class=\"chart\">{svg}</figure>"),
            Chart::Placeholder(message) => format!("<p class=\"placeholder\">{}</p>", escape(message)),
        }
    }
}

/// Line chart of goals scored and conceded per season.
pub fn goals_by_season(rows: &[SeasonGoals], title: &str) -> Chart {
    if rows.is_empty() {
        return Chart::Placeholder(NO_DATA.into());
    }
    let y_max = rows
        .iter()
        .flat_map(|row| [row.goals_scored, row.goals_conceded])
        .fold(0.0, f64::max);
    let y_ticks = ticks(y_max, Y_TICKS);
    let mut plot = Plot::new(
        title,
        (-0.5, rows.len() as f64 - 0.5),
        (0.0, *y_ticks.last().unwrap_or(&1.0)),
    );
    plot.y_grid(&y_ticks, |tick| format!("{tick}"));
    for (index, row) in rows.iter().enumerate() {
        plot.x_label_rotated(index as f64, &row.season);
    }
    plot.axis_labels("Season", "Total goals");

    for (colour, values) in [
        (SCORED_COLOUR, rows.iter().map(|row| row.goals_scored).collect::<Vec<_>>()),
        (CONCEDED_COLOUR, rows.iter().map(|row| row.goals_conceded).collect()),
    ] {
        let points: Vec<_> = values
            .iter()
            .enumerate()
            .map(|(index, &value)| (index as f64, value))
            .collect();
        plot.polyline(&points, colour);
        for &(x, y) in &points {
            plot.marker(x, y, colour);
        }
    }
    plot.legend(&[(SCORED_COLOUR, "Goals scored"), (CONCEDED_COLOUR, "Goals conceded")]);
    Chart::Svg(plot.finish())
}

/// Overlaid density histograms of home and away goals, each with a kernel density curve.
pub fn goals_distribution(dataset: &Dataset) -> Chart {
    if dataset.is_empty() {
        return Chart::Placeholder(NO_DATA.into());
    }
    let home: Vec<_> = dataset.matches.iter().map(|m| m.home_goal).collect();
    let away: Vec<_> = dataset.matches.iter().map(|m| m.away_goal).collect();
    let (mut lo, mut hi) = home
        .iter()
        .chain(&away)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &value| (lo.min(value), hi.max(value)));
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let xs: Vec<_> = (0..DENSITY_POINTS)
        .map(|point| lo + (hi - lo) * point as f64 / (DENSITY_POINTS - 1) as f64)
        .collect();
    let series = [
        (SCORED_COLOUR, "Home goals", &home),
        (CONCEDED_COLOUR, "Away goals", &away),
    ]
    .map(|(colour, label, values)| {
        let histogram = histogram(values, (lo, hi), HISTOGRAM_BINS);
        let density = kde(values, &xs);
        (colour, label, histogram, density)
    });

    let y_max = series
        .iter()
        .flat_map(|(_, _, histogram, density)| {
            histogram
                .densities
                .iter()
                .chain(density.iter().flatten())
                .copied()
        })
        .fold(0.0, f64::max);
    let y_ticks = ticks(y_max, Y_TICKS);
    let mut plot = Plot::new("Goal distribution", (lo, hi), (0.0, *y_ticks.last().unwrap_or(&1.0)));
    plot.y_grid(&y_ticks, |tick| format!("{tick:.2}"));
    for &edge in &series[0].2.edges {
        plot.x_label(edge, &format!("{edge:.1}"));
    }
    plot.axis_labels("Goals", "Density");

    for (colour, _, histogram, _) in &series {
        for (bin, &density) in histogram.densities.iter().enumerate() {
            plot.bar(histogram.edges[bin], histogram.edges[bin + 1], density, colour);
        }
    }
    for (colour, _, _, density) in &series {
        if let Some(density) = density {
            let points: Vec<_> = xs.iter().copied().zip(density.iter().copied()).collect();
            plot.polyline(&points, colour);
        }
    }
    plot.legend(&series.each_ref().map(|(colour, label, _, _)| (*colour, *label)));
    Chart::Svg(plot.finish())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub densities: Vec<f64>,
}

/// Bins `values` into `bins` equal-width bins over `range`, normalised so that the bars have a
/// total area of one. The last bin is closed on the right; values outside the range are ignored.
pub fn histogram(values: &[f64], range: (f64, f64), bins: usize) -> Histogram {
    assert!(bins > 0, "at least one bin is required");
    let (lo, hi) = range;
    assert!(hi > lo, "invalid histogram range {lo}..{hi}");
    let width = (hi - lo) / bins as f64;
    let edges: Vec<_> = (0..=bins).map(|edge| lo + width * edge as f64).collect();
    let mut counts = vec![0usize; bins];
    for &value in values {
        if value < lo || value > hi {
            continue;
        }
        let bin = (((value - lo) / width) as usize).min(bins - 1);
        counts[bin] += 1;
    }
    let total: usize = counts.iter().sum();
    let densities = counts
        .iter()
        .map(|&count| {
            if total == 0 {
                0.0
            } else {
                count as f64 / (total as f64 * width)
            }
        })
        .collect();
    Histogram { edges, densities }
}

/// Gaussian kernel density estimate of `values` at each of `xs`, using Scott's rule for the
/// bandwidth. `None` when fewer than two values are given or the values have no spread.
pub fn kde(values: &[f64], xs: &[f64]) -> Option<Vec<f64>> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    if variance <= 0.0 {
        return None;
    }
    let bandwidth = variance.sqrt() * (n as f64).powf(-0.2);
    let norm = 1.0 / (n as f64 * bandwidth * (2.0 * PI).sqrt());
    Some(
        xs.iter()
            .map(|&x| {
                norm * values
                    .iter()
                    .map(|value| (-0.5 * ((x - value) / bandwidth).powi(2)).exp())
                    .sum::<f64>()
            })
            .collect(),
    )
}

/// Evenly spaced tick values from zero, on a 1-2-5 step, covering at least `max`.
fn ticks(max: f64, target: usize) -> Vec<f64> {
    let step = nice_step(max, target);
    let count = (max / step).ceil().max(1.0) as usize;
    (0..=count).map(|tick| tick as f64 * step).collect()
}

fn nice_step(range: f64, target: usize) -> f64 {
    if range <= 0.0 || !range.is_finite() {
        return 1.0;
    }
    let raw = range / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let residual = raw / magnitude;
    let nice = if residual <= 1.0 {
        1.0
    } else if residual <= 2.0 {
        2.0
    } else if residual <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

struct Plot {
    svg: String,
    x_range: (f64, f64),
    y_range: (f64, f64),
}
impl Plot {
    fn new(title: &str, x_range: (f64, f64), y_range: (f64, f64)) -> Self {
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {WIDTH} {HEIGHT}\" \
             width=\"{WIDTH}\" height=\"{HEIGHT}\" font-family=\"sans-serif\" font-size=\"12\">"
        );
        svg.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"16\">{}</text>",
            WIDTH / 2.0,
            MARGIN_TOP / 2.0 + 6.0,
            escape(title)
        ));
        svg.push_str(&format!(
            "<rect x=\"{MARGIN_LEFT}\" y=\"{MARGIN_TOP}\" width=\"{}\" height=\"{}\" fill=\"none\" stroke=\"black\"/>",
            WIDTH - MARGIN_LEFT - MARGIN_RIGHT,
            HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
        ));
        Self {
            svg,
            x_range,
            y_range,
        }
    }

    fn x(&self, value: f64) -> f64 {
        let (lo, hi) = self.x_range;
        let inner = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        if hi == lo {
            MARGIN_LEFT + inner / 2.0
        } else {
            MARGIN_LEFT + inner * (value - lo) / (hi - lo)
        }
    }

    fn y(&self, value: f64) -> f64 {
        let (lo, hi) = self.y_range;
        let inner = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        HEIGHT - MARGIN_BOTTOM - inner * (value - lo) / (hi - lo)
    }

    fn y_grid(&mut self, ticks: &[f64], label: impl Fn(f64) -> String) {
        for &tick in ticks {
            let y = self.y(tick);
            self.svg.push_str(&format!(
                "<line x1=\"{MARGIN_LEFT}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"#ddd\"/>\
                 <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{}</text>",
                WIDTH - MARGIN_RIGHT,
                MARGIN_LEFT - 6.0,
                y + 4.0,
                escape(&label(tick))
            ));
        }
    }

    fn x_label(&mut self, value: f64, label: &str) {
        let x = self.x(value);
        self.svg.push_str(&format!(
            "<text x=\"{x:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>",
            HEIGHT - MARGIN_BOTTOM + 16.0,
            escape(label)
        ));
    }

    fn x_label_rotated(&mut self, value: f64, label: &str) {
        let (x, y) = (self.x(value), HEIGHT - MARGIN_BOTTOM + 14.0);
        self.svg.push_str(&format!(
            "<line x1=\"{x:.1}\" y1=\"{MARGIN_TOP}\" x2=\"{x:.1}\" y2=\"{:.1}\" stroke=\"#ddd\"/>\
             <text x=\"{x:.1}\" y=\"{y:.1}\" text-anchor=\"end\" transform=\"rotate(-45 {x:.1} {y:.1})\">{}</text>",
            HEIGHT - MARGIN_BOTTOM,
            escape(label)
        ));
    }

    fn axis_labels(&mut self, x_label: &str, y_label: &str) {
        let y_mid = MARGIN_TOP + (HEIGHT - MARGIN_TOP - MARGIN_BOTTOM) / 2.0;
        self.svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>\
             <text x=\"16\" y=\"{y_mid:.1}\" text-anchor=\"middle\" transform=\"rotate(-90 16 {y_mid:.1})\">{}</text>",
            MARGIN_LEFT + (WIDTH - MARGIN_LEFT - MARGIN_RIGHT) / 2.0,
            HEIGHT - 12.0,
            escape(x_label),
            escape(y_label)
        ));
    }

    fn polyline(&mut self, points: &[(f64, f64)], colour: &str) {
        let points = points
            .iter()
            .map(|&(x, y)| format!("{:.1},{:.1}", self.x(x), self.y(y)))
            .collect::<Vec<_>>()
            .join(" ");
        self.svg.push_str(&format!(
            "<polyline points=\"{points}\" fill=\"none\" stroke=\"{colour}\" stroke-width=\"2\"/>"
        ));
    }

    fn marker(&mut self, x: f64, y: f64, colour: &str) {
        self.svg.push_str(&format!(
            "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"4\" fill=\"{colour}\"/>",
            self.x(x),
            self.y(y)
        ));
    }

    fn bar(&mut self, from: f64, to: f64, height: f64, colour: &str) {
        let (left, right) = (self.x(from), self.x(to));
        let (top, bottom) = (self.y(height), self.y(self.y_range.0));
        self.svg.push_str(&format!(
            "<rect x=\"{left:.1}\" y=\"{top:.1}\" width=\"{:.1}\" height=\"{:.1}\" \
             fill=\"{colour}\" fill-opacity=\"0.35\" stroke=\"{colour}\"/>",
            right - left,
            bottom - top
        ));
    }

    fn legend(&mut self, entries: &[(&str, &str)]) {
        let x = WIDTH - MARGIN_RIGHT - 150.0;
        for (index, (colour, label)) in entries.iter().enumerate() {
            let y = MARGIN_TOP + 16.0 + index as f64 * 18.0;
            self.svg.push_str(&format!(
                "<rect x=\"{x:.1}\" y=\"{:.1}\" width=\"12\" height=\"12\" fill=\"{colour}\"/>\
                 <text x=\"{:.1}\" y=\"{y:.1}\">{}</text>",
                y - 10.0,
                x + 18.0,
                escape(label)
            ));
        }
    }

    fn finish(mut self) -> String {
        self.svg.push_str("</svg>");
        self.svg
    }
}
