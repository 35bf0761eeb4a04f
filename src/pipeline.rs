//! Run orchestration: output layout, ontology step, per-dataset isolation
//! and the run summary.

use crate::Result;
use crate::config::ValidatedConfig;
use crate::dataset::{self, DatasetOutcome, RunTarget};
use crate::graph::{Dataset, Quantity};
use crate::ontology::{self, Module};
use crate::render::{WrittenFile, mermaid, write_turtle};
use crate::source::{SkipCounts, SkipReason};
use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Directory tree under `--out`.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn ontology_dir(&self) -> PathBuf {
        self.root.join("ontology")
    }

    pub fn rdf_dir(&self, dataset: Dataset) -> PathBuf {
        self.root.join(dataset.slug()).join("rdf")
    }

    pub fn plot_dir(&self, dataset: Dataset) -> PathBuf {
        self.root.join(dataset.slug()).join("plots")
    }

    pub fn summary_path(&self) -> PathBuf {
        self.root.join("summary.json")
    }

    pub fn create_dirs(&self) -> Result<()> {
        let mut dirs = vec![self.ontology_dir()];
        for d in Dataset::ALL {
            dirs.push(self.rdf_dir(d));
            dirs.push(self.plot_dir(d));
        }
        for dir in dirs {
            fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        }
        Ok(())
    }

    /// Remove everything a previous run wrote. Other files under the root
    /// are left alone.
    pub fn clean(&self) -> Result<()> {
        let mut dirs = vec![self.ontology_dir()];
        dirs.extend(Dataset::ALL.iter().map(|d| self.root.join(d.slug())));
        for dir in dirs {
            if dir.exists() {
                fs::remove_dir_all(&dir).with_context(|| format!("remove {}", dir.display()))?;
                info!(dir = %dir.display(), "removed");
            }
        }
        let summary = self.summary_path();
        if summary.exists() {
            fs::remove_file(&summary).with_context(|| format!("remove {}", summary.display()))?;
        }
        Ok(())
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub datasets: Vec<Dataset>,
    pub write_rdf: bool,
    pub write_plots: bool,
    pub clean: bool,
    pub created: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub path: String,
    pub triples: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub observations: BTreeMap<Quantity, usize>,
    pub skipped: BTreeMap<Quantity, SkipCounts>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub empty_series: Vec<String>,
    pub entities: BTreeMap<String, usize>,
    pub files: Vec<FileSummary>,
    pub diagrams: Vec<String>,
    pub plots: usize,
}

impl DatasetSummary {
    fn failed(err: &anyhow::Error) -> Self {
        Self {
            status: Status::Failed,
            error: Some(format!("{err:#}")),
            observations: BTreeMap::new(),
            skipped: BTreeMap::new(),
            empty_series: Vec::new(),
            entities: BTreeMap::new(),
            files: Vec::new(),
            diagrams: Vec::new(),
            plots: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub created: String,
    pub ontology: Vec<FileSummary>,
    pub datasets: BTreeMap<Dataset, DatasetSummary>,
}

impl RunSummary {
    pub fn failed_datasets(&self) -> Vec<Dataset> {
        self.datasets
            .iter()
            .filter(|(_, s)| s.status == Status::Failed)
            .map(|(d, _)| *d)
            .collect()
    }
}

/// Ontology modules as Turtle plus the class taxonomy diagram.
pub fn write_ontology(layout: &OutputLayout, created: NaiveDate) -> Result<Vec<WrittenFile>> {
    let dir = layout.ontology_dir();
    let mut written = Vec::new();
    for module in Module::DEFINED {
        let graph = ontology::build_module(module, created)
            .with_context(|| format!("build ontology module {}", module.file_stem()))?;
        let path = dir.join(format!("{}.ttl", module.file_stem()));
        written.push(write_turtle(&path, graph.triples())?);
    }
    let path = dir.join("mermaid_taxonomy.mermaid");
    fs::write(&path, mermaid::taxonomy()).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), "wrote taxonomy diagram");
    Ok(written)
}

fn run_dataset(
    dataset: Dataset,
    cfg: &ValidatedConfig,
    target: &RunTarget,
) -> Result<DatasetOutcome> {
    match dataset {
        Dataset::Epica => dataset::epica::run(&cfg.epica, &cfg.smoothing, target),
        Dataset::Sisal => dataset::sisal::run(&cfg.sisal, &cfg.smoothing, target),
    }
}

/// Run the requested datasets. A failing dataset is logged and recorded in
/// the summary; the others still run. Ontology and summary write failures
/// abort the run.
pub fn run(cfg: &ValidatedConfig, layout: &OutputLayout, opts: &RunOptions) -> Result<RunSummary> {
    if opts.clean {
        layout.clean()?;
    }
    layout.create_dirs()?;

    let mut summary = RunSummary {
        created: opts.created.to_string(),
        ontology: Vec::new(),
        datasets: BTreeMap::new(),
    };

    if opts.write_rdf {
        summary.ontology = write_ontology(layout, opts.created)?
            .iter()
            .map(|w| FileSummary {
                path: layout.relative(&w.path),
                triples: w.triples,
            })
            .collect();
    }

    for &dataset in &opts.datasets {
        let target = RunTarget {
            rdf_dir: layout.rdf_dir(dataset),
            plot_dir: layout.plot_dir(dataset),
            write_rdf: opts.write_rdf,
            write_plots: opts.write_plots,
            created: opts.created,
        };
        info!(dataset = dataset.tag(), "dataset started");
        let entry = match run_dataset(dataset, cfg, &target) {
            Ok(outcome) => {
                info!(
                    dataset = dataset.tag(),
                    observations = outcome.stats.observation_total(),
                    skipped = outcome.stats.skipped_total(),
                    malformed = outcome.stats.skipped_by_reason(SkipReason::Malformed),
                    files = outcome.rdf.len(),
                    plots = outcome.plots.len(),
                    "dataset finished"
                );
                DatasetSummary {
                    status: Status::Ok,
                    error: None,
                    observations: outcome.stats.observations,
                    skipped: outcome.stats.skipped,
                    empty_series: outcome.stats.empty_series,
                    entities: outcome.classes,
                    files: outcome
                        .rdf
                        .iter()
                        .map(|w| FileSummary {
                            path: layout.relative(&w.path),
                            triples: w.triples,
                        })
                        .collect(),
                    diagrams: outcome.diagrams.iter().map(|p| layout.relative(p)).collect(),
                    plots: outcome.plots.len(),
                }
            }
            Err(err) => {
                error!(dataset = dataset.tag(), error = %format!("{err:#}"), "dataset failed");
                DatasetSummary::failed(&err)
            }
        };
        summary.datasets.insert(dataset, entry);
    }

    let path = layout.summary_path();
    let json = serde_json::to_string_pretty(&summary)?;
    fs::write(&path, json + "\n").with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), "wrote run summary");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CaveConfig, PipelineConfig};
    use crate::ontology::vocab::rdfs;
    use crate::render::turtle::count_triples;
    use oxrdf::vocab::rdf;
    use oxrdf::{Subject, Term};
    use pretty_assertions::assert_eq;
    use std::collections::{BTreeSet, HashMap, HashSet};

    const CH4_TAB: &str = "/* DATA DESCRIPTION:\n*/\n\
Depth ice/snow [m]\tDepth ref [m]\tGas age EDC1 [ka BP]\tGas age [ka BP]\tCH4 [ppbv]\tCH4 std dev [±]\n\
99.34\t99.34\t2.1\t2.123\t635.4\t5.2\n\
102.95\t102.95\t2.5\t2.575\t\t4.8\n\
110.20\t110.20\t3.0\t3.112\t608.1\t4.1\n\
115.00\t115.00\t3.4\t3.480\t612.9\t4.0\n";

    const D18O_TAB: &str = "/* DATA DESCRIPTION:\n*/\n\
Depth ice/snow [m]\tGas age [ka BP]\tδ18O [‰ SMOW]\n\
500.1\t102.4\t-52.31\n\
501.2\t102.9\t-52.10\n";

    const SITES: &str = "site_id,site_name,latitude,longitude\n\
144,Botuverá cave,-27.2233,-49.1556\n\
140,Sanbao cave,31.67,110.43\n";

    const BOTUVERA: &str = "site_id,site_name,entity_id,entity_name,sample_id,age_bp,d18o_permille,d13c_permille\n\
144,Botuverá cave,283,BT2,5001,1250.5,-4.2,-7.9\n\
144,Botuverá cave,283,BT2,5002,1300,-4.1,-7.8\n\
144,Botuverá cave,283,BT2,5003,1350,abc,-7.7\n";

    const SANBAO: &str = "site_id,site_name,entity_id,entity_name,sample_id,age_bp,d18o_permille,d13c_permille\n\
140,Sanbao cave,1,SB10,1,50000,-8.1,\n\
140,Sanbao cave,1,SB10,2,50100,-8.3,\n";

    fn fixture(data: &Path) -> ValidatedConfig {
        fs::create_dir_all(data.join("EPICA")).unwrap();
        fs::create_dir_all(data.join("SISAL")).unwrap();
        fs::write(data.join("EPICA/EDC_CH4.tab"), CH4_TAB).unwrap();
        fs::write(data.join("EPICA/EPICA_Dome_C_d18O.tab"), D18O_TAB).unwrap();
        fs::write(data.join("SISAL/v_sites_all.csv"), SITES).unwrap();
        fs::write(data.join("SISAL/v_data_144_botuvera.csv"), BOTUVERA).unwrap();
        fs::write(data.join("SISAL/v_data_140_sanbao.csv"), SANBAO).unwrap();

        let cave = |site_id, slug: &str| CaveConfig {
            site_id,
            slug: slug.to_string(),
            file: None,
        };
        let mut cfg = PipelineConfig::default();
        cfg.sisal.caves = vec![cave(144, "144_botuvera"), cave(140, "140_sanbao")];
        cfg.validate_and_build(data).unwrap()
    }

    fn options() -> RunOptions {
        RunOptions {
            datasets: Dataset::ALL.to_vec(),
            write_rdf: true,
            write_plots: true,
            clean: false,
            created: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        }
    }

    fn read_graph(path: &Path) -> Vec<oxrdf::Triple> {
        oxttl::TurtleParser::new()
            .for_reader(fs::File::open(path).unwrap())
            .map(|t| t.unwrap())
            .collect()
    }

    fn type_counts(triples: &[oxrdf::Triple]) -> HashMap<String, usize> {
        let mut out = HashMap::new();
        for t in triples.iter().filter(|t| t.predicate == rdf::TYPE) {
            if let Term::NamedNode(class) = &t.object {
                *out.entry(class.as_str().to_string()).or_default() += 1;
            }
        }
        out
    }

    /// Typed triples of a combined file against the summary's entity counts.
    /// Every entity is declared once, so no subject carries two labels and
    /// every labelled subject is typed.
    fn check_entities(path: &Path, summary: &DatasetSummary) -> HashMap<String, usize> {
        let triples = read_graph(path);
        let types = type_counts(&triples);
        let declared: HashMap<String, usize> = summary.entities.clone().into_iter().collect();
        assert_eq!(types, declared);

        let typed: HashSet<&Subject> = triples
            .iter()
            .filter(|t| t.predicate == rdf::TYPE)
            .map(|t| &t.subject)
            .collect();
        let mut labelled = BTreeSet::new();
        for t in triples.iter().filter(|t| t.predicate == rdfs::LABEL) {
            let Subject::NamedNode(s) = &t.subject else {
                panic!("blank subject")
            };
            assert!(labelled.insert(s.as_str().to_string()), "{s} labelled twice");
            assert!(typed.contains(&t.subject), "{s} labelled but untyped");
        }
        types
    }

    #[test]
    fn end_to_end_run() {
        let data = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let cfg = fixture(data.path());
        let layout = OutputLayout::new(out.path());

        let summary = run(&cfg, &layout, &options()).unwrap();
        assert!(summary.failed_datasets().is_empty());

        let ontology: Vec<_> = summary.ontology.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            ontology,
            vec![
                "ontology/geo_lod_core.ttl",
                "ontology/epica_ontology.ttl",
                "ontology/sisal_ontology.ttl"
            ]
        );
        assert!(out.path().join("ontology/mermaid_taxonomy.mermaid").exists());

        let epica = &summary.datasets[&Dataset::Epica];
        assert_eq!(epica.observations[&Quantity::Ch4], 3);
        assert_eq!(epica.observations[&Quantity::D18O], 2);
        assert_eq!(epica.skipped[&Quantity::Ch4].get(SkipReason::MissingValue), 1);
        assert!(epica.empty_series.is_empty());
        assert_eq!(epica.diagrams, vec!["epica/rdf/mermaid_instance_epica.mermaid"]);

        let sisal = &summary.datasets[&Dataset::Sisal];
        assert_eq!(sisal.observations[&Quantity::D18O], 4);
        assert_eq!(sisal.observations[&Quantity::D13C], 3);
        assert_eq!(sisal.skipped[&Quantity::D18O].get(SkipReason::Malformed), 1);
        assert_eq!(sisal.skipped[&Quantity::D13C].get(SkipReason::EmptySeries), 2);
        assert_eq!(sisal.empty_series, vec!["140_sanbao/d13C".to_string()]);
        // Botuverá d18O and d13C, Sanbao d18O; three variants each.
        assert_eq!(sisal.plots, 9);

        // Each quantity accounts for every input row exactly once.
        let rows = [
            (Dataset::Epica, Quantity::Ch4, 4),
            (Dataset::Epica, Quantity::D18O, 2),
            (Dataset::Sisal, Quantity::D18O, 5),
            (Dataset::Sisal, Quantity::D13C, 5),
        ];
        for (ds, q, n) in rows {
            let s = &summary.datasets[&ds];
            let observed = s.observations.get(&q).copied().unwrap_or(0);
            let skipped = s.skipped.get(&q).map(SkipCounts::total).unwrap_or(0);
            assert_eq!(observed + skipped, n, "{} {}", ds.tag(), q.tag());
        }

        for ds in summary.datasets.values() {
            let (combined, parts) = ds.files.split_last().unwrap();
            let sum: usize = parts.iter().map(|f| f.triples).sum();
            assert_eq!(combined.triples, sum);
            assert_eq!(count_triples(&out.path().join(&combined.path)), sum);
        }

        let json = fs::read_to_string(layout.summary_path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["datasets"]["epica"]["status"], "ok");
        assert_eq!(value["datasets"]["sisal"]["observations"]["d13C"], 3);
        assert_eq!(value["datasets"]["epica"]["skipped"]["CH4"]["missing_value"], 1);
        assert_eq!(value["datasets"]["sisal"]["skipped"]["d13C"]["empty_series"], 2);
        assert_eq!(value["datasets"]["sisal"]["empty_series"][0], "140_sanbao/d13C");
    }

    #[test]
    fn typed_triples_match_entities() {
        let data = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let cfg = fixture(data.path());
        let layout = OutputLayout::new(out.path());
        let summary = run(&cfg, &layout, &options()).unwrap();

        let epica = &summary.datasets[&Dataset::Epica];
        let types = check_entities(&out.path().join("epica/rdf/epica_all.ttl"), epica);
        assert_eq!(types["http://w3id.org/geo-lod/CH4Observation"], 3);
        assert_eq!(
            types["http://www.w3.org/ns/sosa/Observation"],
            epica.observations.values().sum::<usize>()
        );
        assert_eq!(types["http://w3id.org/geo-lod/DrillingSite"], 1);
        assert_eq!(types["http://w3id.org/geo-lod/IceCoreChronology"], 2);

        let sisal = &summary.datasets[&Dataset::Sisal];
        let types = check_entities(&out.path().join("sisal/rdf/sisal_all.ttl"), sisal);
        assert_eq!(types["http://w3id.org/geo-lod/Cave"], 2);
        assert_eq!(types["http://w3id.org/geo-lod/Speleothem"], 2);
        assert_eq!(
            types["http://www.w3.org/ns/sosa/Observation"],
            sisal.observations.values().sum::<usize>()
        );
    }

    #[test]
    fn reruns_are_byte_identical() {
        let data = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let cfg = fixture(data.path());
        let layout = OutputLayout::new(out.path());

        let first = run(&cfg, &layout, &options()).unwrap();
        let files: Vec<PathBuf> = first
            .ontology
            .iter()
            .chain(first.datasets.values().flat_map(|d| d.files.iter()))
            .map(|f| out.path().join(&f.path))
            .collect();
        let before: Vec<Vec<u8>> = files.iter().map(|p| fs::read(p).unwrap()).collect();

        let second = run(&cfg, &layout, &RunOptions { clean: true, ..options() }).unwrap();
        assert_eq!(first, second);
        let after: Vec<Vec<u8>> = files.iter().map(|p| fs::read(p).unwrap()).collect();
        assert!(before == after);
    }

    #[test]
    fn failing_dataset_does_not_stop_the_other() {
        let data = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let cfg = fixture(data.path());
        fs::remove_file(data.path().join("SISAL/v_sites_all.csv")).unwrap();
        let layout = OutputLayout::new(out.path());

        let summary = run(&cfg, &layout, &options()).unwrap();
        assert_eq!(summary.failed_datasets(), vec![Dataset::Sisal]);
        assert_eq!(summary.datasets[&Dataset::Epica].status, Status::Ok);
        let sisal = &summary.datasets[&Dataset::Sisal];
        assert!(sisal.error.as_deref().unwrap().contains("SISAL sites input"));
        assert!(out.path().join("epica/rdf/epica_all.ttl").exists());
        assert!(!out.path().join("sisal/rdf/sisal_all.ttl").exists());
    }

    #[test]
    fn clean_keeps_unrelated_files() {
        let out = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(out.path());
        layout.create_dirs().unwrap();
        fs::write(layout.rdf_dir(Dataset::Epica).join("old.ttl"), "").unwrap();
        fs::write(layout.summary_path(), "{}").unwrap();
        fs::write(out.path().join("notes.txt"), "keep").unwrap();

        layout.clean().unwrap();
        assert!(!out.path().join("epica").exists());
        assert!(!layout.summary_path().exists());
        assert!(out.path().join("notes.txt").exists());
    }

    #[test]
    fn no_rdf_writes_plots_only() {
        let data = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let cfg = fixture(data.path());
        let layout = OutputLayout::new(out.path());
        let opts = RunOptions {
            datasets: vec![Dataset::Epica],
            write_rdf: false,
            ..options()
        };
        let summary = run(&cfg, &layout, &opts).unwrap();
        assert!(summary.ontology.is_empty());
        assert!(!summary.datasets.contains_key(&Dataset::Sisal));
        let epica = &summary.datasets[&Dataset::Epica];
        assert!(epica.files.is_empty());
        assert_eq!(epica.plots, 12);
    }
}
