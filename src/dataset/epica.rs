//! EPICA Dome C: CH4 (EDC2) and d18O (AICC2023) records from PANGAEA tables.

use crate::Result;
use crate::config::EpicaInputs;
use crate::dataset::{
    DatasetOutcome, PlotAxis, PlotSeries, RunTarget, SmoothedSeries, write_graph, write_plots,
};
use crate::graph::builder::{date, plain, text_en};
use crate::graph::entity::geolod_iri;
use crate::graph::mapper::{chronology_key, sample_key, source_key};
use crate::graph::{
    DataSourceMeta, Dataset, GraphBuilder, Mapper, ObservationRecord, Quantity, SiteMeta,
};
use crate::ontology::vocab::{dcat, dct, geolod};
use crate::smooth::{SmoothingMethod, SmoothingParams};
use crate::source::{IceCoreRow, Reading, TabColumns, parse_tab_file};
use anyhow::Context;
use oxrdf::NamedNode;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

pub const METADATA_PARTITION: &str = "epica_metadata";
pub const SITE_PARTITION: &str = "epica_dome_c";

const PUBLISHER: &str = "PANGAEA - Data Publisher for Earth & Environmental Science";
const LICENSE: &str = "https://creativecommons.org/licenses/by/3.0/";
const COLLECTION: &str = "EPICA_Site_Collection";
const CAMPAIGN: &str = "EPICA_DrillingCampaign_1996_2004";

pub const CH4_SOURCE: DataSourceMeta = DataSourceMeta {
    key: "pangaea_472484",
    iri: "https://doi.org/10.1594/PANGAEA.472484",
    title: "EPICA Dome C Methane Record (Spahni & Stocker 2006)",
    creator: "Spahni, R.; Stocker, T.F.",
    year: 2006,
};

pub const D18O_SOURCE: DataSourceMeta = DataSourceMeta {
    key: "pangaea_961024",
    iri: "https://doi.org/10.1594/PANGAEA.961024",
    title: "EPICA Dome C δ18O Record on AICC2023 (Bouchet et al. 2023)",
    creator: "Bouchet, M. et al.",
    year: 2023,
};

/// One EPICA record and the metadata that travels with it.
struct Record {
    quantity: Quantity,
    columns: TabColumns,
    source: DataSourceMeta,
    chronology: &'static str,
    chronology_label: &'static str,
    chronology_reference: &'static str,
    dataset_local: &'static str,
    dataset_title: &'static str,
    dataset_description: &'static str,
}

const RECORDS: [Record; 2] = [
    Record {
        quantity: Quantity::Ch4,
        columns: TabColumns::EDC_CH4,
        source: CH4_SOURCE,
        chronology: "EDC2",
        chronology_label: "EDC2 ice core chronology (Schwander et al. 2001)",
        chronology_reference: "https://doi.org/10.1029/2000JD900754",
        dataset_local: "EPICA_DomeC_CH4_Dataset",
        dataset_title: "EPICA Dome C - Methane (CH₄) Record",
        dataset_description: "CH₄ concentration measurements from the EPICA Dome C ice core on the EDC2 chronology.",
    },
    Record {
        quantity: Quantity::D18O,
        columns: TabColumns::EDC_D18O,
        source: D18O_SOURCE,
        chronology: "AICC2023",
        chronology_label: "AICC2023 ice core chronology (Bouchet et al. 2023)",
        chronology_reference: "https://doi.org/10.5194/cp-19-2257-2023",
        dataset_local: "EPICA_DomeC_d18O_Dataset",
        dataset_title: "EPICA Dome C - Stable Water Isotope (δ¹⁸O) Record",
        dataset_description: "δ¹⁸O measurements from the EPICA Dome C ice core on the AICC2023 chronology.",
    },
];

fn dataset_key(quantity: Quantity) -> String {
    format!("dataset:{}", quantity.tag())
}

fn input_path(inputs: &EpicaInputs, quantity: Quantity) -> &Path {
    match quantity {
        Quantity::Ch4 => &inputs.ch4_file,
        _ => &inputs.d18o_file,
    }
}

/// Catalogue, per-record datasets, sources and shared vocabulary individuals.
fn build_metadata(mapper: &mut Mapper<'_>, target: &RunTarget) -> Result<()> {
    for record in &RECORDS {
        mapper.ensure_data_source(&record.source)?;
    }

    let catalog = geolod_iri("EPICA_DomeC_Catalog");
    let title = "EPICA Dome C Ice Core - Linked Data Catalogue";
    let g = mapper.graph();
    g.declare(
        "catalog:epica",
        &catalog,
        &[geolod::PALAEOCLIMATE_DATA_CATALOGUE, dcat::CATALOG],
        Some(title),
    )?;
    g.add(&catalog, dct::TITLE, text_en(title));
    g.add(
        &catalog,
        dct::DESCRIPTION,
        text_en(
            "DCAT catalogue aggregating palaeoclimate observation datasets from the EPICA Dome C \
             ice core, East Antarctica, with raw and smoothed values, provenance, site geometry \
             and chronology metadata.",
        ),
    );
    g.add(&catalog, dct::PUBLISHER, plain(PUBLISHER));
    g.link(&catalog, dct::LICENSE, NamedNode::new_unchecked(LICENSE));
    g.add(&catalog, dct::CREATED, date(target.created));

    for record in &RECORDS {
        let source = NamedNode::new_unchecked(record.source.iri);
        let ds = geolod_iri(record.dataset_local);
        let class = match record.quantity {
            Quantity::Ch4 => geolod::CH4_DATASET,
            _ => geolod::DELTA18O_DATASET,
        };
        g.declare(
            &dataset_key(record.quantity),
            &ds,
            &[class, dcat::DATASET],
            Some(record.dataset_title),
        )?;
        g.add(&ds, dct::TITLE, text_en(record.dataset_title));
        g.add(&ds, dct::DESCRIPTION, text_en(record.dataset_description));
        g.link(&ds, dct::SOURCE, source.clone());
        g.link(&ds, dcat::DISTRIBUTION, source);
        g.link(&ds, dct::LICENSE, NamedNode::new_unchecked(LICENSE));
        g.link(&catalog, dcat::DATASET_PROPERTY, ds);
    }

    mapper.ensure_collection(COLLECTION, "EPICA ice core drilling sites")?;
    for record in &RECORDS {
        mapper.ensure_property(record.quantity)?;
        mapper.ensure_measurement_type(record.quantity)?;
    }
    for method in SmoothingMethod::ALL {
        mapper.ensure_smoothing_filter(method)?;
    }
    Ok(())
}

/// Site, ice core, campaign and chronologies.
fn build_site(mapper: &mut Mapper<'_>, site: &SiteMeta) -> Result<()> {
    mapper.ensure_site(&site.key, &source_key(CH4_SOURCE.key))?;
    mapper.add_member(COLLECTION, &site.key)?;
    mapper.ensure_sample(
        &site.key,
        &format!("{}_IceCore", site.key),
        &format!("{} Ice Core", site.label),
        &site.key,
        None,
    )?;
    mapper.ensure_sampling_activity(
        CAMPAIGN,
        "EPICA Dome C drilling campaign 1996-2004",
        &site.key,
        &site.key,
        Some("1996/2004"),
    )?;
    for record in &RECORDS {
        mapper.ensure_chronology(
            record.chronology,
            &format!("{}_Chronology", record.chronology),
            record.chronology_label,
            Some(record.chronology_reference),
        )?;
    }
    Ok(())
}

/// Admitted rows of one record, in input order.
struct Admitted {
    depths: Vec<Option<f64>>,
    ages: Vec<f64>,
    values: Vec<f64>,
}

fn admit_rows(
    mapper: &mut Mapper<'_>,
    site: &str,
    quantity: Quantity,
    rows: &[IceCoreRow],
) -> Result<Admitted> {
    let mut out = Admitted {
        depths: Vec::new(),
        ages: Vec::new(),
        values: Vec::new(),
    };
    for row in rows {
        if let Some((age, value)) = mapper.admit(row.line, site, quantity, &row.age_ka, &row.value)? {
            out.depths.push(row.depth_m.value());
            out.ages.push(age);
            out.values.push(value);
        }
    }
    Ok(out)
}

pub fn run(inputs: &EpicaInputs, params: &SmoothingParams, target: &RunTarget) -> Result<DatasetOutcome> {
    // Both files are read before anything is built so a missing input fails
    // the dataset without partial output.
    let mut tables = Vec::new();
    for record in &RECORDS {
        let path = input_path(inputs, record.quantity);
        let rows = parse_tab_file(path, record.columns)
            .with_context(|| format!("EPICA {} input", record.quantity.tag()))?;
        info!(file = %path.display(), rows = rows.len(), "read EPICA table");
        tables.push(rows);
    }

    let site = &inputs.site;
    let sites = BTreeMap::from([(site.key.clone(), site.clone())]);
    let mut graph = GraphBuilder::new(METADATA_PARTITION);
    let mut mapper = Mapper::new(&mut graph, Dataset::Epica, &sites, *params);
    let mut outcome = DatasetOutcome::default();

    build_metadata(&mut mapper, target)?;
    mapper.graph().begin_partition(SITE_PARTITION);
    build_site(&mut mapper, site)?;

    let sample = sample_key(&site.key);
    for (record, rows) in RECORDS.iter().zip(&tables) {
        let q = record.quantity;
        if !rows.is_empty() && rows.iter().all(|r| r.value == Reading::Missing) {
            info!(quantity = q.tag(), "no values, record skipped");
            mapper.skip_empty_series(q, SITE_PARTITION, rows.len());
            continue;
        }
        let admitted = admit_rows(&mut mapper, &site.key, q, rows)?;
        let smoothed = SmoothedSeries::compute(params, &admitted.values)?;

        let chronology = chronology_key(record.chronology);
        let source = source_key(record.source.key);
        let dataset = dataset_key(q);
        for i in 0..admitted.values.len() {
            mapper.map_observation(&ObservationRecord {
                quantity: q,
                site_key: &site.key,
                sample: &sample,
                chronology: &chronology,
                source: &source,
                dataset_record: Some(&dataset),
                age: admitted.ages[i],
                depth_m: admitted.depths[i],
                value: admitted.values[i],
                sample_id: None,
                smoothed: smoothed.at(i),
            })?;
        }
        info!(
            quantity = q.tag(),
            observations = admitted.values.len(),
            skipped = rows.len() - admitted.values.len(),
            "mapped EPICA record"
        );

        if target.write_plots {
            let title = format!("EPICA Dome C - {}", q.label());
            outcome.plots.extend(write_plots(
                &target.plot_dir,
                &PlotSeries {
                    prefix: Dataset::Epica.slug(),
                    title: title.clone(),
                    quantity: q,
                    axis: PlotAxis::Age,
                    positions: &admitted.ages,
                    values: &admitted.values,
                    smoothed: &smoothed,
                },
                params,
            )?);

            let keep: Vec<bool> = admitted.depths.iter().map(Option::is_some).collect();
            let depths: Vec<f64> = admitted.depths.iter().flatten().copied().collect();
            let values: Vec<f64> = admitted
                .values
                .iter()
                .zip(&keep)
                .filter(|(_, k)| **k)
                .map(|(v, _)| *v)
                .collect();
            outcome.plots.extend(write_plots(
                &target.plot_dir,
                &PlotSeries {
                    prefix: Dataset::Epica.slug(),
                    title,
                    quantity: q,
                    axis: PlotAxis::Depth,
                    positions: &depths,
                    values: &values,
                    smoothed: &smoothed.select(&keep),
                },
                params,
            )?);
        }
    }

    outcome.stats = mapper.finish();
    outcome.classes = graph.class_counts();
    if target.write_rdf {
        write_graph(target, Dataset::Epica, &graph, &mut outcome)?;
    }
    Ok(outcome)
}
