//! SISAL speleothem records: one partition per configured cave.

use crate::Result;
use crate::config::{CaveInput, SisalInputs};
use crate::dataset::{
    DatasetOutcome, PlotAxis, PlotSeries, RunTarget, SmoothedSeries, write_graph, write_plots,
};
use crate::graph::mapper::{chronology_key, sample_key, source_key};
use crate::graph::{
    DataSourceMeta, Dataset, GraphBuilder, Mapper, MappingError, ObservationRecord, Quantity,
    SiteMeta,
};
use crate::smooth::{SmoothingMethod, SmoothingParams};
use crate::source::{
    AgeUnit, Reading, SampleTable, SiteRecord, SpeleothemRow, read_samples_file, read_sites_file,
};
use anyhow::{Context, bail};
use std::collections::BTreeMap;
use tracing::info;

pub const METADATA_PARTITION: &str = "sisal_metadata";

const COLLECTION: &str = "SISAL_Cave_Collection";

pub const SISAL_SOURCE: DataSourceMeta = DataSourceMeta {
    key: "sisal_v3",
    iri: "https://doi.org/10.5194/essd-16-1933-2024",
    title: "SISALv3: Speleothem Isotopes Synthesis and AnaLysis database, version 3",
    creator: "Kaushal, N. et al.",
    year: 2024,
};

const QUANTITIES: [Quantity; 2] = [Quantity::D18O, Quantity::D13C];

pub fn cave_key(site_id: u32) -> String {
    format!("Cave_site_{site_id:04}")
}

fn entity_key(entity_id: u32) -> String {
    format!("entity_{entity_id:04}")
}

/// Site metadata for a configured cave. WKT from the sites file wins over
/// the coordinate columns.
fn cave_meta(record: &SiteRecord) -> Result<SiteMeta> {
    let (latitude, longitude) = match (record.latitude, record.longitude, &record.geom) {
        (Some(lat), Some(lon), _) => (lat, lon),
        (_, _, Some(_)) => (0.0, 0.0),
        _ => bail!(
            "SISAL site {} ({}) has neither coordinates nor geometry",
            record.site_id,
            record.site_name
        ),
    };
    Ok(SiteMeta {
        key: cave_key(record.site_id),
        label: record.site_name.clone(),
        latitude,
        longitude,
        wkt: record.geom.clone().filter(|g| !g.trim().is_empty()),
        source_id: Some(record.site_id),
    })
}

fn reading(row: &SpeleothemRow, quantity: Quantity) -> &Reading {
    match quantity {
        Quantity::D13C => &row.d13c,
        _ => &row.d18o,
    }
}

/// Source, collection and shared vocabulary individuals.
fn build_metadata(mapper: &mut Mapper<'_>) -> Result<()> {
    mapper.ensure_data_source(&SISAL_SOURCE)?;
    mapper.ensure_collection(COLLECTION, "SISAL speleothem cave sites")?;
    for q in QUANTITIES {
        mapper.ensure_property(q)?;
        mapper.ensure_measurement_type(q)?;
    }
    for method in SmoothingMethod::ALL {
        mapper.ensure_smoothing_filter(method)?;
    }
    Ok(())
}

/// Speleothem, sampling event and U/Th chronology for every entity of a
/// cave, in order of first appearance.
fn build_entities(mapper: &mut Mapper<'_>, site: &str, rows: &[SpeleothemRow]) -> Result<()> {
    for row in rows {
        let id = entity_key(row.entity_id);
        let name = if row.entity_name.is_empty() {
            id.clone()
        } else {
            row.entity_name.clone()
        };
        mapper.ensure_sample(
            &id,
            &format!("Speleothem_{id}"),
            &format!("Speleothem {name}"),
            site,
            Some(row.entity_id),
        )?;
        mapper.ensure_sampling_activity(
            &format!("SpeleothemSamplingEvent_{id}"),
            &format!("Sampling of speleothem {name}"),
            site,
            &id,
            None,
        )?;
        mapper.ensure_chronology(
            &id,
            &format!("UThChronology_{id}"),
            &format!("U/Th chronology of speleothem {name}"),
            None,
        )?;
    }
    Ok(())
}

/// Every row of a cave file must belong to that cave.
fn check_rows(mapper: &Mapper<'_>, cave: &CaveInput, rows: &[SpeleothemRow]) -> Result<()> {
    for row in rows {
        let found = cave_key(row.site_id);
        mapper.site(&found)?;
        if row.site_id != cave.site_id {
            return Err(MappingError::SiteMismatch {
                line: row.line,
                expected: cave_key(cave.site_id),
                found,
            }
            .into());
        }
    }
    Ok(())
}

/// Indices of `ages` in ascending order; ties keep input order.
fn age_order(ages: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..ages.len()).collect();
    order.sort_by(|&a, &b| ages[a].total_cmp(&ages[b]));
    order
}

fn map_cave(
    mapper: &mut Mapper<'_>,
    cave: &CaveInput,
    site: &SiteMeta,
    table: &SampleTable,
    target: &RunTarget,
    outcome: &mut DatasetOutcome,
) -> Result<()> {
    let params = mapper.params();
    check_rows(mapper, cave, &table.rows)?;
    mapper
        .graph()
        .begin_partition(&format!("sisal_{}", cave.slug));
    mapper.ensure_site(&site.key, &source_key(SISAL_SOURCE.key))?;
    mapper.add_member(COLLECTION, &site.key)?;
    build_entities(mapper, &site.key, &table.rows)?;

    let source = source_key(SISAL_SOURCE.key);
    for q in QUANTITIES {
        mapper.merge_skips(q, &table.skipped);
        if table
            .rows
            .iter()
            .all(|r| *reading(r, q) == Reading::Missing)
        {
            info!(cave = %cave.slug, quantity = q.tag(), "no values, series skipped");
            mapper.skip_empty_series(q, &cave.slug, table.rows.len());
            continue;
        }

        let mut admitted = Vec::new();
        for row in &table.rows {
            if let Some((age, value)) =
                mapper.admit(row.line, &site.key, q, &row.age_bp, reading(row, q))?
            {
                admitted.push((row, age, value));
            }
        }

        // Smoothing and plots run along the age axis; IRIs follow input order.
        let ages: Vec<f64> = admitted.iter().map(|(_, age, _)| *age).collect();
        let order = age_order(&ages);
        let mut rank = vec![0; order.len()];
        for (r, &i) in order.iter().enumerate() {
            rank[i] = r;
        }
        let values: Vec<f64> = order.iter().map(|&i| admitted[i].2).collect();
        let smoothed = SmoothedSeries::compute(&params, &values)?;

        for (i, (row, age, value)) in admitted.iter().enumerate() {
            let entity = entity_key(row.entity_id);
            mapper.map_observation(&ObservationRecord {
                quantity: q,
                site_key: &site.key,
                sample: &sample_key(&entity),
                chronology: &chronology_key(&entity),
                source: &source,
                dataset_record: None,
                age: *age,
                depth_m: None,
                value: *value,
                sample_id: row.sample_id,
                smoothed: smoothed.at(rank[i]),
            })?;
        }
        info!(
            cave = %cave.slug,
            quantity = q.tag(),
            observations = values.len(),
            "mapped SISAL series"
        );

        if target.write_plots && !values.is_empty() {
            let ages_ka: Vec<f64> = order
                .iter()
                .map(|&i| AgeUnit::YearsBp.to_ka(ages[i]))
                .collect();
            outcome.plots.extend(write_plots(
                &target.plot_dir,
                &PlotSeries {
                    prefix: &cave.slug,
                    title: format!("{} - {}", site.label, q.label()),
                    quantity: q,
                    axis: PlotAxis::Age,
                    positions: &ages_ka,
                    values: &values,
                    smoothed: &smoothed,
                },
                &params,
            )?);
        }
    }
    Ok(())
}

pub fn run(inputs: &SisalInputs, params: &SmoothingParams, target: &RunTarget) -> Result<DatasetOutcome> {
    let site_records: BTreeMap<u32, SiteRecord> = read_sites_file(&inputs.sites_file)
        .context("SISAL sites input")?
        .into_iter()
        .map(|s| (s.site_id, s))
        .collect();

    let mut sites = BTreeMap::new();
    let mut tables = Vec::new();
    for cave in &inputs.caves {
        let Some(record) = site_records.get(&cave.site_id) else {
            bail!("cave {} refers to unknown SISAL site {}", cave.slug, cave.site_id);
        };
        let meta = cave_meta(record)?;
        let table = read_samples_file(&cave.file)
            .with_context(|| format!("SISAL input for cave {}", cave.slug))?;
        info!(
            cave = %cave.slug,
            file = %cave.file.display(),
            rows = table.rows.len(),
            "read SISAL data"
        );
        sites.insert(meta.key.clone(), meta);
        tables.push(table);
    }

    let mut graph = GraphBuilder::new(METADATA_PARTITION);
    let mut mapper = Mapper::new(&mut graph, Dataset::Sisal, &sites, *params);
    let mut outcome = DatasetOutcome::default();

    build_metadata(&mut mapper)?;
    for (cave, table) in inputs.caves.iter().zip(&tables) {
        let key = cave_key(cave.site_id);
        let site = mapper.site(&key)?;
        map_cave(&mut mapper, cave, site, table, target, &mut outcome)?;
    }

    outcome.stats = mapper.finish();
    outcome.classes = graph.class_counts();
    if target.write_rdf {
        write_graph(target, Dataset::Sisal, &graph, &mut outcome)?;
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::entity::geolod_iri;
    use crate::ontology::vocab::geolod;
    use crate::render::turtle::count_triples;
    use oxrdf::vocab::xsd;
    use oxrdf::{Literal, Subject, Term};
    use crate::source::SkipReason;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;

    const SITES: &str = "site_id,site_name,latitude,longitude,geom\n\
144,Botuverá cave,-27.2233,-49.1556,\n\
140,Sanbao cave,31.67,110.43,POINT(110.430000 31.670000)\n";

    const BOTUVERA: &str = "site_id,site_name,entity_id,entity_name,sample_id,age_bp,d18o_permille,d13c_permille\n\
144,Botuverá cave,283,BT2,5001,1250.5,-4.2,-7.9\n\
144,Botuverá cave,283,BT2,5002,,-4.1,-7.8\n\
144,Botuverá cave,284,BTV21a,5003,1400,-4.0,\n";

    const SANBAO: &str = "site_id,site_name,entity_id,entity_name,sample_id,age_bp,d18o_permille,d13c_permille\n\
140,Sanbao cave,1,SB10,1,50000,-8.1,\n\
140,Sanbao cave,1,SB10,2,50100,-8.3,\n";

    fn setup(dir: &Path) -> (SisalInputs, RunTarget) {
        fs::write(dir.join("sites.csv"), SITES).unwrap();
        fs::write(dir.join("botuvera.csv"), BOTUVERA).unwrap();
        fs::write(dir.join("sanbao.csv"), SANBAO).unwrap();
        let inputs = SisalInputs {
            sites_file: dir.join("sites.csv"),
            caves: vec![
                CaveInput {
                    site_id: 144,
                    slug: "144_botuvera".to_string(),
                    file: dir.join("botuvera.csv"),
                },
                CaveInput {
                    site_id: 140,
                    slug: "140_sanbao".to_string(),
                    file: dir.join("sanbao.csv"),
                },
            ],
        };
        let target = RunTarget {
            rdf_dir: dir.join("rdf"),
            plot_dir: dir.join("plots"),
            write_rdf: true,
            write_plots: true,
            created: chrono::NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        };
        fs::create_dir_all(&target.rdf_dir).unwrap();
        fs::create_dir_all(&target.plot_dir).unwrap();
        (inputs, target)
    }

    #[test]
    fn maps_caves_into_partitions() {
        let dir = tempfile::tempdir().unwrap();
        let (inputs, target) = setup(dir.path());
        let outcome = run(&inputs, &SmoothingParams::default(), &target).unwrap();

        // Botuverá: 2 d18O + 1 d13C (one missing age per series, one empty d13C).
        // Sanbao: 2 d18O, d13C column empty throughout.
        assert_eq!(outcome.stats.observations[&Quantity::D18O], 4);
        assert_eq!(outcome.stats.observations[&Quantity::D13C], 1);
        let d18o = &outcome.stats.skipped[&Quantity::D18O];
        assert_eq!(d18o.get(SkipReason::MissingAge), 1);
        assert_eq!(d18o.total(), 1);
        let d13c = &outcome.stats.skipped[&Quantity::D13C];
        assert_eq!(d13c.get(SkipReason::MissingAge), 1);
        assert_eq!(d13c.get(SkipReason::MissingValue), 1);
        assert_eq!(d13c.get(SkipReason::EmptySeries), 2);
        assert_eq!(outcome.stats.empty_series, vec!["140_sanbao/d13C".to_string()]);

        // Every input row is either an observation or a skip, per quantity.
        for q in QUANTITIES {
            let observed = outcome.stats.observations.get(&q).copied().unwrap_or(0);
            assert_eq!(observed + outcome.stats.skipped[&q].total(), 5, "{}", q.tag());
        }

        let names: Vec<_> = outcome
            .rdf
            .iter()
            .map(|w| w.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "sisal_metadata.ttl",
                "sisal_144_botuvera.ttl",
                "sisal_140_sanbao.ttl",
                "sisal_all.ttl"
            ]
        );
        let counts: Vec<usize> = outcome.rdf.iter().map(|w| count_triples(&w.path)).collect();
        assert_eq!(counts[3], counts[0] + counts[1] + counts[2]);

        // Sequence numbers continue across caves.
        let sanbao = fs::read_to_string(dir.path().join("rdf/sisal_140_sanbao.ttl")).unwrap();
        assert!(sanbao.contains("Obs_d18O_SISAL_0002"));
        assert!(sanbao.contains("Obs_d18O_SISAL_0003"));
        assert!(sanbao.contains("Speleothem_entity_0001"));
        assert!(!sanbao.contains("Obs_d13C_SISAL"));

        // Botuverá d18O and d13C, Sanbao d18O; three variants each.
        assert_eq!(outcome.plots.len(), 9);
        assert!(dir.path().join("plots/140_sanbao_d18o_vs_age.svg").exists());
        assert!(!dir.path().join("plots/140_sanbao_d13c_vs_age.svg").exists());
    }

    #[test]
    fn missing_cave_file_fails_the_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let (inputs, target) = setup(dir.path());
        fs::remove_file(dir.path().join("sanbao.csv")).unwrap();
        let err = run(&inputs, &SmoothingParams::default(), &target).unwrap_err();
        assert!(format!("{err:#}").contains("SISAL input for cave 140_sanbao"));
        assert!(!dir.path().join("rdf/sisal_all.ttl").exists());
    }

    #[test]
    fn reader_drops_are_charged_once_per_quantity() {
        let dir = tempfile::tempdir().unwrap();
        let (inputs, target) = setup(dir.path());
        fs::write(
            dir.path().join("sanbao.csv"),
            format!("{SANBAO}140,Sanbao cave,,SB10,3,50200,-8.2,-1.0\n"),
        )
        .unwrap();
        let outcome = run(&inputs, &SmoothingParams::default(), &target).unwrap();

        for q in QUANTITIES {
            let observed = outcome.stats.observations.get(&q).copied().unwrap_or(0);
            assert_eq!(observed + outcome.stats.skipped[&q].total(), 6, "{}", q.tag());
            assert_eq!(outcome.stats.skipped[&q].get(SkipReason::Malformed), 1);
        }
    }

    #[test]
    fn smooths_and_plots_along_the_age_axis() {
        let dir = tempfile::tempdir().unwrap();
        let (mut inputs, target) = setup(dir.path());
        fs::write(
            dir.path().join("botuvera.csv"),
            "site_id,site_name,entity_id,entity_name,sample_id,age_bp,d18o_permille\n\
             144,Botuverá cave,283,BT2,1,1000,-1.0\n\
             144,Botuverá cave,283,BT2,2,3000,-3.0\n\
             144,Botuverá cave,283,BT2,3,2000,-2.0\n",
        )
        .unwrap();
        inputs.caves.truncate(1);
        let params = SmoothingParams {
            rolling_window: 3,
            sg_window: 3,
            sg_poly_order: 2,
        };
        let outcome = run(&inputs, &params, &target).unwrap();
        assert_eq!(outcome.stats.observations[&Quantity::D18O], 3);

        let triples: Vec<oxrdf::Triple> = oxttl::TurtleParser::new()
            .for_reader(fs::File::open(dir.path().join("rdf/sisal_all.ttl")).unwrap())
            .map(|t| t.unwrap())
            .collect();
        let median = |obs: &str| -> Option<Term> {
            let subject = geolod_iri(obs);
            triples
                .iter()
                .find(|t| {
                    t.subject == Subject::from(subject.clone())
                        && t.predicate == geolod::SMOOTHED_VALUE_ROLLING_MEDIAN
                })
                .map(|t| t.object.clone())
        };
        let decimal =
            |v: &str| -> Option<Term> { Some(Literal::new_typed_literal(v, xsd::DECIMAL).into()) };

        // Sorted by age: -1, -2, -3. IRIs keep input order.
        assert_eq!(median("Obs_d18O_SISAL_0000"), decimal("-1.50000"));
        assert_eq!(median("Obs_d18O_SISAL_0001"), decimal("-2.50000"));
        assert_eq!(median("Obs_d18O_SISAL_0002"), decimal("-2.00000"));

        let svg = fs::read_to_string(dir.path().join("plots/144_botuvera_d18o_vs_age.svg")).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn row_of_another_configured_cave_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let (inputs, target) = setup(dir.path());
        fs::write(
            dir.path().join("botuvera.csv"),
            format!("{BOTUVERA}140,Sanbao cave,1,SB10,9,51000,-8.0,\n"),
        )
        .unwrap();
        let err = run(&inputs, &SmoothingParams::default(), &target).unwrap_err();
        assert_eq!(
            err.downcast_ref::<MappingError>(),
            Some(&MappingError::SiteMismatch {
                line: 5,
                expected: "Cave_site_0144".to_string(),
                found: "Cave_site_0140".to_string(),
            })
        );
        assert!(!dir.path().join("rdf/sisal_all.ttl").exists());
    }

    #[test]
    fn row_for_unconfigured_site_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let (inputs, target) = setup(dir.path());
        fs::write(
            dir.path().join("sanbao.csv"),
            "site_id,site_name,entity_id,entity_name,sample_id,age_bp,d18o_permille\n\
             999,Elsewhere,1,X,1,100,-1.0\n",
        )
        .unwrap();
        let err = run(&inputs, &SmoothingParams::default(), &target).unwrap_err();
        assert_eq!(
            err.downcast_ref::<MappingError>(),
            Some(&MappingError::UnknownSite("Cave_site_0999".to_string()))
        );
    }

    #[test]
    fn prefers_source_geometry() {
        let record = SiteRecord {
            site_id: 140,
            site_name: "Sanbao cave".to_string(),
            latitude: None,
            longitude: None,
            geom: Some("POINT(110.43 31.67)".to_string()),
        };
        let meta = cave_meta(&record).unwrap();
        assert_eq!(meta.key, "Cave_site_0140");
        assert_eq!(
            meta.wkt_literal(),
            "<http://www.opengis.net/def/crs/EPSG/0/4326> POINT(110.43 31.67)"
        );

        let bare = SiteRecord { geom: None, ..record };
        assert!(cave_meta(&bare).is_err());
    }
}
