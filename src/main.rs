use anyhow::bail;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

mod config;
mod dataset;
mod graph;
mod logging;
mod ontology;
mod pipeline;
mod render;
mod smooth;
mod source;

use graph::Dataset;
use pipeline::{OutputLayout, RunOptions};

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "palaeo-lod")]
#[command(about = "Palaeoclimate tables to linked data, plots and diagrams", long_about = None)]
struct Cli {
    /// Debug logging (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the ontology, then map, plot and serialize the datasets.
    Run {
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        #[arg(short = 'o', long, default_value = "output")]
        out: PathBuf,

        /// JSON pipeline config; built-in defaults otherwise.
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, conflicts_with = "sisal_only")]
        epica_only: bool,

        #[arg(long)]
        sisal_only: bool,

        #[arg(long)]
        no_plots: bool,

        #[arg(long)]
        no_rdf: bool,

        /// Remove previous outputs first.
        #[arg(long)]
        clean: bool,

        /// Value of dct:created (YYYY-MM-DD); today if omitted.
        #[arg(long)]
        created: Option<NaiveDate>,
    },
    /// Write the ontology Turtle files and the taxonomy diagram only.
    Ontology {
        #[arg(short = 'o', long, default_value = "output")]
        out: PathBuf,

        #[arg(long)]
        created: Option<NaiveDate>,
    },
    /// Delete previous outputs.
    Clean {
        #[arg(short = 'o', long, default_value = "output")]
        out: PathBuf,
    },
}

fn today_or(created: Option<NaiveDate>) -> NaiveDate {
    created.unwrap_or_else(|| chrono::Local::now().date_naive())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    match cli.cmd {
        Commands::Run {
            data_dir,
            out,
            config,
            epica_only,
            sisal_only,
            no_plots,
            no_rdf,
            clean,
            created,
        } => {
            let cfg = config::load(config.as_deref())?.validate_and_build(&data_dir)?;
            let datasets = match (epica_only, sisal_only) {
                (true, _) => vec![Dataset::Epica],
                (_, true) => vec![Dataset::Sisal],
                _ => Dataset::ALL.to_vec(),
            };
            let opts = RunOptions {
                datasets,
                write_rdf: !no_rdf,
                write_plots: !no_plots,
                clean,
                created: today_or(created),
            };
            let layout = OutputLayout::new(out);
            let summary = pipeline::run(&cfg, &layout, &opts)?;

            let failed = summary.failed_datasets();
            if !failed.is_empty() {
                let names: Vec<&str> = failed.iter().map(|d| d.tag()).collect();
                bail!("dataset(s) failed: {}", names.join(", "));
            }
            println!("Wrote {}", layout.summary_path().display());
        }
        Commands::Ontology { out, created } => {
            let layout = OutputLayout::new(out);
            std::fs::create_dir_all(layout.ontology_dir())?;
            let written = pipeline::write_ontology(&layout, today_or(created))?;
            for file in &written {
                println!("Wrote {} ({} triples)", file.path.display(), file.triples);
            }
        }
        Commands::Clean { out } => {
            OutputLayout::new(out).clean()?;
            info!("outputs removed");
        }
    }

    Ok(())
}
