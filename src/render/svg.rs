//! Depth/age profile charts as standalone SVG.
//!
//! Values run along the top axis, depth or age runs downwards. Age charts can
//! carry Marine Isotope Stage bands behind the curve.

use std::fmt::Write;

const WIDTH: f64 = 600.0;
const HEIGHT: f64 = 900.0;
const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 60.0;
const MARGIN_TOP: f64 = 100.0;
const MARGIN_BOTTOM: f64 = 30.0;

const COLOR_RAW: &str = "#1f4e79";
const COLOR_FADED: &str = "#9e9e9e";
const COLOR_SMOOTH: &str = "#c0392b";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Climate {
    Warm,
    Interstadial,
    Cold,
}

impl Climate {
    fn fill(self) -> &'static str {
        match self {
            Climate::Warm => "#fddbc7",
            Climate::Interstadial => "#fef0e6",
            Climate::Cold => "#d6e8f7",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MisStage {
    pub start_ka: f64,
    pub end_ka: f64,
    pub name: &'static str,
    pub climate: Climate,
}

const fn stage(start_ka: f64, end_ka: f64, name: &'static str, climate: Climate) -> MisStage {
    MisStage {
        start_ka,
        end_ka,
        name,
        climate,
    }
}

/// LR04 stage boundaries (Lisiecki & Raymo 2005), ka BP.
pub const MIS_STAGES: &[MisStage] = &[
    stage(0.0, 14.0, "MIS 1", Climate::Warm),
    stage(14.0, 29.0, "MIS 2", Climate::Cold),
    stage(29.0, 57.0, "MIS 3", Climate::Interstadial),
    stage(57.0, 71.0, "MIS 4", Climate::Cold),
    stage(71.0, 130.0, "MIS 5", Climate::Warm),
    stage(130.0, 191.0, "MIS 6", Climate::Cold),
    stage(191.0, 243.0, "MIS 7", Climate::Warm),
    stage(243.0, 300.0, "MIS 8", Climate::Cold),
    stage(300.0, 337.0, "MIS 9", Climate::Warm),
    stage(337.0, 374.0, "MIS 10", Climate::Cold),
    stage(374.0, 424.0, "MIS 11", Climate::Warm),
    stage(424.0, 478.0, "MIS 12", Climate::Cold),
    stage(478.0, 533.0, "MIS 13", Climate::Warm),
    stage(533.0, 563.0, "MIS 14", Climate::Cold),
    stage(563.0, 621.0, "MIS 15", Climate::Warm),
    stage(621.0, 676.0, "MIS 16", Climate::Cold),
    stage(676.0, 712.0, "MIS 17", Climate::Warm),
    stage(712.0, 761.0, "MIS 18", Climate::Cold),
    stage(761.0, 790.0, "MIS 19", Climate::Warm),
    stage(790.0, 814.0, "MIS 20", Climate::Cold),
];

/// One profile chart. `positions` and `values` are aligned; `smoothed`, when
/// present, is aligned with both.
#[derive(Debug, Clone)]
pub struct Chart<'a> {
    pub title: String,
    pub value_label: &'a str,
    pub position_label: String,
    pub positions: &'a [f64],
    pub values: &'a [f64],
    pub smoothed: Option<(String, &'a [Option<f64>])>,
    /// Draw MIS bands; positions must then be in ka BP.
    pub mis_bands: bool,
}

fn nice_step(range: f64, target: usize) -> f64 {
    let raw = range / target.max(1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let norm = raw / magnitude;
    let nice = if norm <= 1.0 {
        1.0
    } else if norm <= 2.0 {
        2.0
    } else if norm <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Round tick positions covering `[min, max]`, about `target` intervals.
pub fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    if !min.is_finite() || !max.is_finite() {
        return vec![0.0, 1.0];
    }
    let (min, max) = if max - min < 1e-12 {
        (min - 1.0, max + 1.0)
    } else {
        (min, max)
    };
    let step = nice_step(max - min, target);
    let start = (min / step).floor() * step;
    let end = (max / step).ceil() * step;
    let n = ((end - start) / step).round() as usize;
    (0..=n).map(|i| start + i as f64 * step).collect()
}

fn tick_label(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 {
        0
    } else {
        (-step.log10()).ceil() as usize
    };
    let value = if value.abs() < step * 1e-9 { 0.0 } else { value };
    format!("{:.*}", decimals, value)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// SVG path data; a `None` point ends the current segment.
pub fn path_data(points: impl IntoIterator<Item = Option<(f64, f64)>>) -> String {
    let mut d = String::new();
    let mut pen_down = false;
    for point in points {
        match point {
            Some((x, y)) => {
                let cmd = if pen_down { 'L' } else { 'M' };
                if !d.is_empty() {
                    d.push(' ');
                }
                let _ = write!(d, "{cmd}{x:.2} {y:.2}");
                pen_down = true;
            }
            None => pen_down = false,
        }
    }
    d
}

struct Scale {
    lo: f64,
    hi: f64,
    out_lo: f64,
    out_hi: f64,
}

impl Scale {
    fn map(&self, v: f64) -> f64 {
        self.out_lo + (v - self.lo) / (self.hi - self.lo) * (self.out_hi - self.out_lo)
    }
}

fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

pub fn render_chart(chart: &Chart<'_>) -> String {
    let plot_left = MARGIN_LEFT;
    let plot_right = WIDTH - MARGIN_RIGHT;
    let plot_top = MARGIN_TOP;
    let plot_bottom = HEIGHT - MARGIN_BOTTOM;

    let smoothed_values = chart
        .smoothed
        .iter()
        .flat_map(|(_, s)| s.iter().flatten().copied());
    let (vmin, vmax) = extent(chart.values.iter().copied().chain(smoothed_values));
    let x_ticks = nice_ticks(vmin, vmax, 5);
    let (pmin, pmax) = extent(chart.positions.iter().copied());
    let y_ticks = nice_ticks(pmin, pmax, 8);

    let x = Scale {
        lo: x_ticks[0],
        hi: x_ticks[x_ticks.len() - 1],
        out_lo: plot_left,
        out_hi: plot_right,
    };
    let y = Scale {
        lo: y_ticks[0],
        hi: y_ticks[y_ticks.len() - 1],
        out_lo: plot_top,
        out_hi: plot_bottom,
    };

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif">"##
    );
    svg.push_str("<rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    let _ = writeln!(
        svg,
        r##"<text x="{}" y="28" text-anchor="middle" font-size="18" font-weight="bold">{}</text>"##,
        WIDTH / 2.0,
        escape(&chart.title)
    );

    if chart.mis_bands {
        for stage in MIS_STAGES {
            let lo = stage.start_ka.max(y.lo);
            let hi = stage.end_ka.min(y.hi);
            if hi <= lo {
                continue;
            }
            let (top, bottom) = (y.map(lo), y.map(hi));
            let _ = writeln!(
                svg,
                r##"<rect class="mis" x="{plot_left:.2}" y="{top:.2}" width="{:.2}" height="{:.2}" fill="{}"/>"##,
                plot_right - plot_left,
                bottom - top,
                stage.climate.fill()
            );
            let _ = writeln!(
                svg,
                r##"<text x="{:.2}" y="{:.2}" font-size="11" fill="#555">{}</text>"##,
                plot_right + 4.0,
                (top + bottom) / 2.0 + 4.0,
                stage.name
            );
        }
    }

    // Frame and grid.
    let _ = writeln!(
        svg,
        r##"<rect x="{plot_left:.2}" y="{plot_top:.2}" width="{:.2}" height="{:.2}" fill="none" stroke="black"/>"##,
        plot_right - plot_left,
        plot_bottom - plot_top
    );
    let x_step = x_ticks.get(1).map_or(1.0, |t| t - x_ticks[0]);
    for tick in &x_ticks {
        let px = x.map(*tick);
        let _ = writeln!(
            svg,
            r##"<line x1="{px:.2}" y1="{plot_top:.2}" x2="{px:.2}" y2="{plot_bottom:.2}" stroke="#e0e0e0"/>"##
        );
        let _ = writeln!(
            svg,
            r##"<text x="{px:.2}" y="{:.2}" text-anchor="middle" font-size="12">{}</text>"##,
            plot_top - 8.0,
            tick_label(*tick, x_step)
        );
    }
    let y_step = y_ticks.get(1).map_or(1.0, |t| t - y_ticks[0]);
    for tick in &y_ticks {
        let py = y.map(*tick);
        let _ = writeln!(
            svg,
            r##"<text x="{:.2}" y="{:.2}" text-anchor="end" font-size="12">{}</text>"##,
            plot_left - 6.0,
            py + 4.0,
            tick_label(*tick, y_step)
        );
    }
    let _ = writeln!(
        svg,
        r##"<text x="{:.2}" y="{:.2}" text-anchor="middle" font-size="14">{}</text>"##,
        (plot_left + plot_right) / 2.0,
        plot_top - 32.0,
        escape(chart.value_label)
    );
    let _ = writeln!(
        svg,
        r##"<text transform="translate(24 {:.2}) rotate(-90)" text-anchor="middle" font-size="14">{}</text>"##,
        (plot_top + plot_bottom) / 2.0,
        escape(&chart.position_label)
    );

    // Curves.
    let raw = path_data(
        chart
            .positions
            .iter()
            .zip(chart.values)
            .map(|(p, v)| Some((x.map(*v), y.map(*p)))),
    );
    match &chart.smoothed {
        None => {
            let _ = writeln!(
                svg,
                r##"<path class="raw" d="{raw}" fill="none" stroke="{COLOR_RAW}" stroke-width="1"/>"##
            );
        }
        Some((legend, smoothed)) => {
            let _ = writeln!(
                svg,
                r##"<path class="raw" d="{raw}" fill="none" stroke="{COLOR_FADED}" stroke-width="0.8" opacity="0.6"/>"##
            );
            let line = path_data(
                chart
                    .positions
                    .iter()
                    .zip(smoothed.iter())
                    .map(|(p, s)| s.map(|v| (x.map(v), y.map(*p)))),
            );
            let _ = writeln!(
                svg,
                r##"<path class="smoothed" d="{line}" fill="none" stroke="{COLOR_SMOOTH}" stroke-width="1.5"/>"##
            );
            let _ = writeln!(
                svg,
                r##"<text x="{:.2}" y="{:.2}" text-anchor="end" font-size="12" fill="{COLOR_SMOOTH}">{}</text>"##,
                plot_right - 6.0,
                plot_bottom - 8.0,
                escape(legend)
            );
        }
    }

    svg.push_str("</svg>\n");
    svg
}
