//! Per-dataset pipelines: read, smooth, map, then write graphs and plots.

pub mod epica;
pub mod sisal;

use crate::Result;
use crate::graph::{Dataset, GraphBuilder, MappingStats, Quantity};
use crate::render::mermaid;
use crate::render::svg::{self, Chart};
use crate::render::{WrittenFile, write_dataset};
use crate::smooth::{SmoothingMethod, SmoothingParams};
use anyhow::Context;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where and what a dataset run writes.
#[derive(Debug, Clone)]
pub struct RunTarget {
    pub rdf_dir: PathBuf,
    pub plot_dir: PathBuf,
    pub write_rdf: bool,
    pub write_plots: bool,
    pub created: NaiveDate,
}

#[derive(Debug, Default)]
pub struct DatasetOutcome {
    pub stats: MappingStats,
    /// Declared entities per class IRI.
    pub classes: BTreeMap<String, usize>,
    pub rdf: Vec<WrittenFile>,
    pub diagrams: Vec<PathBuf>,
    pub plots: Vec<PathBuf>,
}

/// Output of every configured filter over one series, aligned with it.
#[derive(Debug, Clone)]
pub struct SmoothedSeries {
    by_method: BTreeMap<SmoothingMethod, Vec<Option<f64>>>,
}

impl SmoothedSeries {
    pub fn compute(params: &SmoothingParams, values: &[f64]) -> Result<Self> {
        let mut by_method = BTreeMap::new();
        for method in SmoothingMethod::ALL {
            by_method.insert(method, params.apply(method, values)?);
        }
        Ok(Self { by_method })
    }

    /// Smoothed values present at index `i`.
    pub fn at(&self, i: usize) -> Vec<(SmoothingMethod, f64)> {
        self.by_method
            .iter()
            .filter_map(|(m, v)| v.get(i).copied().flatten().map(|x| (*m, x)))
            .collect()
    }

    pub fn get(&self, method: SmoothingMethod) -> &[Option<f64>] {
        self.by_method
            .get(&method)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Keep only the indices where `keep` is true.
    pub fn select(&self, keep: &[bool]) -> Self {
        let by_method = self
            .by_method
            .iter()
            .map(|(m, v)| {
                let kept = v
                    .iter()
                    .zip(keep)
                    .filter(|(_, k)| **k)
                    .map(|(x, _)| *x)
                    .collect();
                (*m, kept)
            })
            .collect();
        Self { by_method }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotAxis {
    Depth,
    Age,
}

impl PlotAxis {
    fn slug(self) -> &'static str {
        match self {
            PlotAxis::Depth => "depth",
            PlotAxis::Age => "age",
        }
    }

    fn label(self) -> &'static str {
        match self {
            PlotAxis::Depth => "Depth (m)",
            PlotAxis::Age => "Age (ka BP)",
        }
    }
}

/// One plotted series. Age positions must be in ka BP.
pub struct PlotSeries<'a> {
    pub prefix: &'a str,
    pub title: String,
    pub quantity: Quantity,
    pub axis: PlotAxis,
    pub positions: &'a [f64],
    pub values: &'a [f64],
    pub smoothed: &'a SmoothedSeries,
}

/// Write the unsmoothed, rolling-median and Savitzky-Golay charts of a
/// series: `<prefix>_<quantity>_vs_<axis>[_smooth<w>|_savgol<w>p<p>].svg`.
pub fn write_plots(
    dir: &Path,
    series: &PlotSeries<'_>,
    params: &SmoothingParams,
) -> Result<Vec<PathBuf>> {
    let stem = format!(
        "{}_{}_vs_{}",
        series.prefix,
        series.quantity.slug(),
        series.axis.slug()
    );
    let variants = [
        (String::new(), None),
        (
            format!("_smooth{}", params.rolling_window),
            Some((
                format!("Rolling median (w = {})", params.rolling_window),
                SmoothingMethod::RollingMedian,
            )),
        ),
        (
            format!("_savgol{}p{}", params.sg_window, params.sg_poly_order),
            Some((
                format!(
                    "Savitzky-Golay (w = {}, p = {})",
                    params.sg_window, params.sg_poly_order
                ),
                SmoothingMethod::SavitzkyGolay,
            )),
        ),
    ];

    let mut written = Vec::new();
    for (suffix, smoothing) in variants {
        let chart = Chart {
            title: series.title.clone(),
            value_label: series.quantity.axis_label(),
            position_label: series.axis.label().to_string(),
            positions: series.positions,
            values: series.values,
            smoothed: smoothing.map(|(legend, m)| (legend, series.smoothed.get(m))),
            mis_bands: series.axis == PlotAxis::Age,
        };
        let path = dir.join(format!("{stem}{suffix}.svg"));
        std::fs::write(&path, svg::render_chart(&chart))
            .with_context(|| format!("write {}", path.display()))?;
        written.push(path);
    }
    info!(stem = %stem, points = series.values.len(), "wrote plots");
    Ok(written)
}

/// Turtle partitions, the combined file and the instance diagram.
pub fn write_graph(
    target: &RunTarget,
    dataset: Dataset,
    graph: &GraphBuilder,
    outcome: &mut DatasetOutcome,
) -> Result<()> {
    outcome.rdf = write_dataset(
        &target.rdf_dir,
        &format!("{}_all", dataset.slug()),
        graph,
    )?;
    let path = target
        .rdf_dir
        .join(format!("mermaid_instance_{}.mermaid", dataset.slug()));
    let title = format!("{} instance graph", dataset.tag());
    std::fs::write(&path, mermaid::instance_diagram(&title, graph))
        .with_context(|| format!("write {}", path.display()))?;
    outcome.diagrams.push(path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn aligns_smoothed_values_with_input() {
        let params = SmoothingParams {
            rolling_window: 3,
            sg_window: 3,
            sg_poly_order: 2,
        };
        let s = SmoothedSeries::compute(&params, &[10.0, 20.0, 15.0]).unwrap();
        // Only the centre has a full window for the quadratic fit.
        assert_eq!(s.at(0), vec![(SmoothingMethod::RollingMedian, 15.0)]);
        assert_eq!(s.at(1).len(), 2);
        assert_eq!(s.at(1)[0], (SmoothingMethod::RollingMedian, 15.0));
        assert_eq!(s.get(SmoothingMethod::SavitzkyGolay)[2], None);

        let picked = s.select(&[true, false, true]);
        assert_eq!(
            picked.get(SmoothingMethod::RollingMedian),
            &[Some(15.0), Some(17.5)]
        );
    }

    #[test]
    fn writes_three_variants() {
        let dir = tempfile::tempdir().unwrap();
        let params = SmoothingParams::default();
        let values = [1.0, 2.0, 3.0];
        let smoothed = SmoothedSeries::compute(&params, &values).unwrap();
        let series = PlotSeries {
            prefix: "epica",
            title: "EPICA Dome C".to_string(),
            quantity: Quantity::Ch4,
            axis: PlotAxis::Depth,
            positions: &[100.0, 101.0, 102.0],
            values: &values,
            smoothed: &smoothed,
        };
        let written = write_plots(dir.path(), &series, &params).unwrap();
        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "epica_ch4_vs_depth.svg",
                "epica_ch4_vs_depth_smooth11.svg",
                "epica_ch4_vs_depth_savgol11p2.svg",
            ]
        );
    }
}
