//! Maps validated records onto the shared geo-lod ontology.
//!
//! Supporting entities (site, sample, chronology, property, ...) are created
//! on first use and referenced afterwards. Observations get sequential IRIs
//! per (quantity, dataset); a record that fails validation is counted and
//! consumes no sequence number.

use crate::graph::builder::{decimal, g_year, integer, plain, text_en};
use crate::graph::entity::{geolod_iri, Dataset, Quantity, SiteMeta};
use crate::graph::{GraphBuilder, MappingError};
use crate::ontology::vocab::{crm, crmsci, dcat, dct, geo, geolod, prov, qudt, rdfs, sf, sosa};
use crate::smooth::{SmoothingMethod, SmoothingParams};
use crate::source::{AgeUnit, Reading, SkipCounts, SkipReason};
use oxrdf::{Literal, NamedNode, NamedNodeRef};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Observation and skip counters of one dataset run.
///
/// Skips are counted in rows of the quantity they were dropped from, so
/// `observations[q] + skipped[q].total()` is the number of input rows that
/// carried quantity `q`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MappingStats {
    pub observations: BTreeMap<Quantity, usize>,
    pub skipped: BTreeMap<Quantity, SkipCounts>,
    /// Series (`<partition>/<quantity>`) without a single value.
    pub empty_series: Vec<String>,
}

impl MappingStats {
    pub fn observation_total(&self) -> usize {
        self.observations.values().sum()
    }

    pub fn skipped_total(&self) -> usize {
        self.skipped.values().map(SkipCounts::total).sum()
    }

    /// Rows skipped for `reason`, over all quantities.
    pub fn skipped_by_reason(&self, reason: SkipReason) -> usize {
        self.skipped.values().map(|counts| counts.get(reason)).sum()
    }
}

/// A citable source observations are derived from.
#[derive(Debug, Clone, Copy)]
pub struct DataSourceMeta {
    pub key: &'static str,
    pub iri: &'static str,
    pub title: &'static str,
    pub creator: &'static str,
    pub year: i32,
}

/// One admitted input record, ready to become an observation.
///
/// `sample`, `chronology`, `source` and `dataset_record` are entity keys that
/// must already be declared in the graph.
#[derive(Debug, Clone)]
pub struct ObservationRecord<'a> {
    pub quantity: Quantity,
    pub site_key: &'a str,
    pub sample: &'a str,
    pub chronology: &'a str,
    pub source: &'a str,
    pub dataset_record: Option<&'a str>,
    pub age: f64,
    pub depth_m: Option<f64>,
    pub value: f64,
    pub sample_id: Option<u64>,
    pub smoothed: Vec<(SmoothingMethod, f64)>,
}

pub struct Mapper<'g> {
    graph: &'g mut GraphBuilder,
    dataset: Dataset,
    sites: &'g BTreeMap<String, SiteMeta>,
    params: SmoothingParams,
    stats: MappingStats,
}

pub fn site_key(key: &str) -> String {
    format!("site:{key}")
}

pub fn sample_key(id: &str) -> String {
    format!("sample:{id}")
}

pub fn chronology_key(id: &str) -> String {
    format!("chronology:{id}")
}

pub fn source_key(id: &str) -> String {
    format!("source:{id}")
}

impl<'g> Mapper<'g> {
    pub fn new(
        graph: &'g mut GraphBuilder,
        dataset: Dataset,
        sites: &'g BTreeMap<String, SiteMeta>,
        params: SmoothingParams,
    ) -> Self {
        Self {
            graph,
            dataset,
            sites,
            params,
            stats: MappingStats::default(),
        }
    }

    pub fn graph(&mut self) -> &mut GraphBuilder {
        &mut *self.graph
    }

    pub fn params(&self) -> SmoothingParams {
        self.params
    }

    pub fn finish(self) -> MappingStats {
        self.stats
    }

    pub fn site(&self, key: &str) -> Result<&'g SiteMeta, MappingError> {
        let sites: &'g BTreeMap<String, SiteMeta> = self.sites;
        sites
            .get(key)
            .ok_or_else(|| MappingError::UnknownSite(key.to_string()))
    }

    fn resolve(&self, role: &'static str, key: &str) -> Result<NamedNode, MappingError> {
        self.graph
            .entity(key)
            .map(|e| e.iri.clone())
            .ok_or_else(|| MappingError::UnknownEntity {
                role,
                key: key.to_string(),
            })
    }

    /// Site with its point geometry, derived from `source`.
    pub fn ensure_site(&mut self, key: &str, source: &str) -> Result<NamedNode, MappingError> {
        let site = self.site(key)?;
        let source = self.resolve("data source", source)?;
        let iri = site.iri();
        let class = match self.dataset {
            Dataset::Epica => geolod::DRILLING_SITE,
            Dataset::Sisal => geolod::CAVE,
        };
        let classes = [class, geolod::SAMPLING_LOCATION, geo::FEATURE, crm::E53_PLACE, crm::E27_SITE];
        if !self
            .graph
            .declare(&site_key(key), &iri, &classes, Some(site.label.as_str()))?
        {
            return Ok(iri);
        }

        let geometry = site.geometry_iri();
        self.graph.declare(
            &format!("geometry:{key}"),
            &geometry,
            &[sf::POINT],
            Some(format!("Geometry of {}", site.label).as_str()),
        )?;
        self.graph.add(
            &geometry,
            geo::AS_WKT,
            Literal::new_typed_literal(site.wkt_literal(), geo::WKT_LITERAL),
        );
        self.graph.link(&iri, geo::HAS_GEOMETRY, geometry);
        if let Some(id) = site.source_id {
            self.graph.add(&iri, geolod::SITE_ID, integer(i64::from(id)));
        }
        self.graph.link(&iri, prov::WAS_DERIVED_FROM, source);
        Ok(iri)
    }

    /// Physical sample (ice core or speleothem) taken at a site.
    pub fn ensure_sample(
        &mut self,
        id: &str,
        local: &str,
        label: &str,
        site: &str,
        source_id: Option<u32>,
    ) -> Result<NamedNode, MappingError> {
        let site = self.resolve("site", &site_key(site))?;
        let iri = geolod_iri(local);
        let classes: &[NamedNodeRef<'_>] = match self.dataset {
            Dataset::Epica => &[geolod::ICE_CORE, sosa::SAMPLE, crm::E22_HUMAN_MADE_OBJECT],
            Dataset::Sisal => &[geolod::SPELEOTHEM, sosa::SAMPLE],
        };
        if !self.graph.declare(&sample_key(id), &iri, classes, Some(label))? {
            return Ok(iri);
        }
        self.graph.link(&iri, sosa::IS_SAMPLE_OF, site.clone());
        self.graph.link(&iri, geolod::EXTRACTED_FROM, site);
        if let Some(id) = source_id {
            self.graph.add(&iri, geolod::ENTITY_ID, integer(i64::from(id)));
        }
        Ok(iri)
    }

    /// The activity that removed a sample from its site: a drilling campaign
    /// for ice cores, a sampling event for speleothems.
    pub fn ensure_sampling_activity(
        &mut self,
        local: &str,
        label: &str,
        site: &str,
        sample: &str,
        time_span: Option<&str>,
    ) -> Result<NamedNode, MappingError> {
        let site = self.resolve("site", &site_key(site))?;
        let sample = self.resolve("sample", &sample_key(sample))?;
        let iri = geolod_iri(local);
        let classes: &[NamedNodeRef<'_>] = match self.dataset {
            Dataset::Epica => &[geolod::DRILLING_CAMPAIGN, crm::E7_ACTIVITY, crmsci::S1_MATTER_REMOVAL],
            Dataset::Sisal => &[geolod::SPELEOTHEM_SAMPLING_EVENT, crmsci::S1_MATTER_REMOVAL],
        };
        if !self
            .graph
            .declare(&format!("activity:{local}"), &iri, classes, Some(label))?
        {
            return Ok(iri);
        }
        self.graph.link(&iri, geolod::TOOK_PLACE_AT, site.clone());
        self.graph.link(&iri, crm::P7_TOOK_PLACE_AT, site);
        self.graph.link(&iri, geolod::REMOVED_SAMPLE, sample);
        if let Some(span) = time_span {
            self.graph.add(&iri, crm::P4_HAS_TIME_SPAN, plain(span));
        }
        Ok(iri)
    }

    pub fn ensure_chronology(
        &mut self,
        id: &str,
        local: &str,
        label: &str,
        reference: Option<&str>,
    ) -> Result<NamedNode, MappingError> {
        let iri = geolod_iri(local);
        let class = match self.dataset {
            Dataset::Epica => geolod::ICE_CORE_CHRONOLOGY,
            Dataset::Sisal => geolod::UTH_CHRONOLOGY,
        };
        if self
            .graph
            .declare(&chronology_key(id), &iri, &[class], Some(label))?
        {
            if let Some(doi) = reference {
                self.graph
                    .link(&iri, dct::REFERENCES, NamedNode::new_unchecked(doi));
            }
        }
        Ok(iri)
    }

    pub fn ensure_property(&mut self, quantity: Quantity) -> Result<NamedNode, MappingError> {
        let iri = geolod_iri(quantity.property_local());
        let classes = [
            quantity.property_class(),
            sosa::OBSERVABLE_PROPERTY,
            crmsci::S9_PROPERTY_TYPE,
        ];
        if self.graph.declare(
            &format!("property:{}", quantity.tag()),
            &iri,
            &classes,
            Some(quantity.property_label()),
        )? {
            self.graph.link(&iri, qudt::UNIT, quantity.unit());
        }
        Ok(iri)
    }

    pub fn ensure_measurement_type(
        &mut self,
        quantity: Quantity,
    ) -> Result<NamedNode, MappingError> {
        let iri = geolod_iri(&quantity.measurement_type_local());
        self.graph.declare(
            &format!("measurement-type:{}", quantity.tag()),
            &iri,
            &[geolod::MEASUREMENT_TYPE],
            Some(quantity.measurement_type_label()),
        )?;
        Ok(iri)
    }

    /// Named individual describing one configured filter.
    pub fn ensure_smoothing_filter(
        &mut self,
        method: SmoothingMethod,
    ) -> Result<NamedNode, MappingError> {
        let p = self.params;
        let (local, class, label, reference) = match method {
            SmoothingMethod::RollingMedian => (
                format!("RollingMedian_w{}", p.rolling_window),
                geolod::ROLLING_MEDIAN_FILTER,
                format!("Rolling median filter, window={} pts", p.rolling_window),
                "https://doi.org/10.1145/1968.1969",
            ),
            SmoothingMethod::SavitzkyGolay => (
                format!("SavitzkyGolay_w{}_p{}", p.sg_window, p.sg_poly_order),
                geolod::SAVITZKY_GOLAY_FILTER,
                format!(
                    "Savitzky-Golay filter, window={} pts, polyorder={}",
                    p.sg_window, p.sg_poly_order
                ),
                "https://doi.org/10.1021/ac60214a047",
            ),
        };
        let iri = geolod_iri(&local);
        if !self
            .graph
            .declare(&format!("filter:{local}"), &iri, &[class], Some(label.as_str()))?
        {
            return Ok(iri);
        }
        match method {
            SmoothingMethod::RollingMedian => {
                self.graph
                    .add(&iri, geolod::WINDOW_SIZE, integer(p.rolling_window as i64));
            }
            SmoothingMethod::SavitzkyGolay => {
                self.graph
                    .add(&iri, geolod::WINDOW_SIZE, integer(p.sg_window as i64));
                self.graph
                    .add(&iri, geolod::POLY_ORDER, integer(p.sg_poly_order as i64));
            }
        }
        self.graph
            .link(&iri, dct::REFERENCES, NamedNode::new_unchecked(reference));
        Ok(iri)
    }

    pub fn ensure_data_source(&mut self, meta: &DataSourceMeta) -> Result<NamedNode, MappingError> {
        let iri = NamedNode::new_unchecked(meta.iri);
        if self.graph.declare(
            &source_key(meta.key),
            &iri,
            &[geolod::DATA_SOURCE, dct::BIBLIOGRAPHIC_RESOURCE],
            None,
        )? {
            self.graph.add(&iri, dct::TITLE, text_en(meta.title));
            self.graph.add(&iri, dct::CREATOR, plain(meta.creator));
            self.graph.add(&iri, dct::DATE, g_year(meta.year));
        }
        Ok(iri)
    }

    /// A feature collection. Members are added with [`Mapper::add_member`].
    pub fn ensure_collection(&mut self, local: &str, label: &str) -> Result<NamedNode, MappingError> {
        let iri = geolod_iri(local);
        self.graph.declare(
            &format!("collection:{local}"),
            &iri,
            &[geo::FEATURE_COLLECTION],
            Some(label),
        )?;
        Ok(iri)
    }

    pub fn add_member(&mut self, collection: &str, site: &str) -> Result<(), MappingError> {
        let collection = self.resolve("collection", &format!("collection:{collection}"))?;
        let site = self.resolve("site", &site_key(site))?;
        self.graph.link(&collection, rdfs::MEMBER, site);
        Ok(())
    }

    /// Validate the required fields of a raw record.
    ///
    /// An unknown site is fatal. Missing or malformed age and value cells
    /// skip the record; the skip is counted and `None` returned.
    pub fn admit(
        &mut self,
        line: usize,
        site_key: &str,
        quantity: Quantity,
        age: &Reading,
        value: &Reading,
    ) -> Result<Option<(f64, f64)>, MappingError> {
        self.site(site_key)?;
        let reason = match (age, value) {
            (Reading::Value(a), Reading::Value(v)) => return Ok(Some((*a, *v))),
            (Reading::Missing, _) => SkipReason::MissingAge,
            (Reading::Malformed(_), _) => SkipReason::Malformed,
            (_, Reading::Missing) => SkipReason::MissingValue,
            (_, Reading::Malformed(_)) => SkipReason::Malformed,
        };
        debug!(
            dataset = self.dataset.tag(),
            quantity = quantity.tag(),
            line,
            ?reason,
            "record skipped"
        );
        self.stats.skipped.entry(quantity).or_default().record(reason);
        Ok(None)
    }

    /// Charge rows the reader already dropped to `quantity`.
    pub fn merge_skips(&mut self, quantity: Quantity, counts: &SkipCounts) {
        self.stats.skipped.entry(quantity).or_default().merge(counts);
    }

    /// Count every row of a series that has no value at all.
    pub fn skip_empty_series(&mut self, quantity: Quantity, series: &str, rows: usize) {
        debug!(
            dataset = self.dataset.tag(),
            quantity = quantity.tag(),
            series,
            rows,
            "empty series skipped"
        );
        self.stats
            .skipped
            .entry(quantity)
            .or_default()
            .add(SkipReason::EmptySeries, rows);
        self.stats
            .empty_series
            .push(format!("{series}/{}", quantity.tag()));
    }

    /// Emit one observation and its edges.
    pub fn map_observation(
        &mut self,
        record: &ObservationRecord<'_>,
    ) -> Result<NamedNode, MappingError> {
        let q = record.quantity;
        self.site(record.site_key)?;
        let site = self.resolve("site", &site_key(record.site_key))?;
        let sample = self.resolve("sample", record.sample)?;
        let chronology = self.resolve("chronology", record.chronology)?;
        let source = self.resolve("data source", record.source)?;
        let dataset_record = record
            .dataset_record
            .map(|key| self.resolve("dataset", key))
            .transpose()?;
        let property = self.ensure_property(q)?;
        let measurement_type = self.ensure_measurement_type(q)?;

        let seq = self
            .graph
            .next_sequence(&format!("{}_{}", q.tag(), self.dataset.tag()));
        let iri = q.observation_iri(self.dataset, seq);
        let unit = self.dataset.age_unit();
        let label = format!(
            "{} observation at {:.1} {}",
            q.label(),
            record.age,
            unit.symbol()
        );
        let classes = [
            q.observation_class(self.dataset),
            sosa::OBSERVATION,
            crmsci::S4_OBSERVATION,
        ];
        self.graph
            .declare(&format!("observation:{}", iri.as_str()), &iri, &classes, Some(label.as_str()))?;

        let g = &mut *self.graph;
        g.link(&iri, sosa::HAS_FEATURE_OF_INTEREST, sample);
        g.link(&iri, sosa::OBSERVED_PROPERTY, property);
        g.link(&iri, geolod::MEASUREMENT_TYPE_PROPERTY, measurement_type);
        g.link(&iri, geolod::AGE_CHRONOLOGY, chronology);
        g.link(&iri, qudt::UNIT, q.unit());
        g.link(&iri, prov::WAS_DERIVED_FROM, source);
        g.link(&iri, crm::P7_TOOK_PLACE_AT, site);

        match unit {
            AgeUnit::KaBp => g.add(&iri, geolod::AGE_KA_BP, decimal(record.age, 4)),
            AgeUnit::YearsBp => g.add(&iri, geolod::AGE_YEARS_BP, decimal(record.age, 1)),
        };
        if let Some(depth) = record.depth_m {
            g.add(&iri, geolod::AT_DEPTH_M, decimal(depth, 2));
        }
        g.add(&iri, geolod::MEASURED_VALUE, decimal(record.value, q.decimals()));
        if let Some(id) = record.sample_id {
            g.add(&iri, geolod::SAMPLE_ID, integer(id as i64));
        }
        if let Some(dataset) = dataset_record {
            g.link(&dataset, dcat::RECORD, iri.clone());
        }

        for (method, value) in &record.smoothed {
            let filter = self.ensure_smoothing_filter(*method)?;
            let (value_predicate, method_predicate) = match method {
                SmoothingMethod::RollingMedian => (
                    geolod::SMOOTHED_VALUE_ROLLING_MEDIAN,
                    geolod::SMOOTHING_METHOD_MEDIAN,
                ),
                SmoothingMethod::SavitzkyGolay => {
                    (geolod::SMOOTHED_VALUE_SAVGOL, geolod::SMOOTHING_METHOD_SAVGOL)
                }
            };
            self.graph
                .add(&iri, value_predicate, decimal(*value, q.decimals()));
            self.graph.link(&iri, method_predicate, filter);
        }

        *self.stats.observations.entry(q).or_default() += 1;
        Ok(iri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::vocab::unit;
    use oxrdf::vocab::rdf;
    use oxrdf::{Term, Triple};
    use pretty_assertions::assert_eq;

    const SOURCE: DataSourceMeta = DataSourceMeta {
        key: "test",
        iri: "https://doi.org/10.0000/test",
        title: "Test record",
        creator: "Nobody",
        year: 2024,
    };

    fn sites() -> BTreeMap<String, SiteMeta> {
        let site = SiteMeta {
            key: "EpicaDomeC".to_string(),
            label: "EPICA Dome C".to_string(),
            latitude: -75.1,
            longitude: 123.35,
            wkt: None,
            source_id: None,
        };
        BTreeMap::from([(site.key.clone(), site)])
    }

    fn setup(mapper: &mut Mapper<'_>) {
        mapper.ensure_data_source(&SOURCE).unwrap();
        mapper.ensure_site("EpicaDomeC", &source_key("test")).unwrap();
        mapper
            .ensure_sample("core", "EpicaDomeC_IceCore", "Ice core", "EpicaDomeC", None)
            .unwrap();
        mapper
            .ensure_chronology("EDC2", "EDC2_Chronology", "EDC2", None)
            .unwrap();
    }

    fn record(value: f64) -> ObservationRecord<'static> {
        ObservationRecord {
            quantity: Quantity::Ch4,
            site_key: "EpicaDomeC",
            sample: "sample:core",
            chronology: "chronology:EDC2",
            source: "source:test",
            dataset_record: None,
            age: 12.3456789,
            depth_m: Some(100.0),
            value,
            sample_id: None,
            smoothed: vec![(SmoothingMethod::RollingMedian, value)],
        }
    }

    fn has(graph: &GraphBuilder, s: &NamedNode, p: NamedNodeRef<'_>, o: impl Into<Term>) -> bool {
        let t = Triple::new(s.clone(), p.into_owned(), o.into());
        graph.triples().any(|x| *x == t)
    }

    #[test]
    fn maps_observation_edges() {
        let sites = sites();
        let mut graph = GraphBuilder::new("data");
        let mut mapper = Mapper::new(&mut graph, Dataset::Epica, &sites, SmoothingParams::default());
        setup(&mut mapper);
        let obs = mapper.map_observation(&record(612.5)).unwrap();
        let stats = mapper.finish();

        assert_eq!(obs.as_str(), "http://w3id.org/geo-lod/Obs_CH4_EPICA_0000");
        assert_eq!(stats.observations[&Quantity::Ch4], 1);
        assert!(has(&graph, &obs, rdf::TYPE, geolod::CH4_OBSERVATION.into_owned()));
        assert!(has(&graph, &obs, geolod::AGE_KA_BP, decimal(12.3457, 4)));
        assert!(has(&graph, &obs, geolod::MEASURED_VALUE, decimal(612.5, 2)));
        assert!(has(&graph, &obs, qudt::UNIT, unit::PPB.into_owned()));
        assert!(has(
            &graph,
            &obs,
            geolod::SMOOTHING_METHOD_MEDIAN,
            geolod_iri("RollingMedian_w11")
        ));
        assert!(has(
            &graph,
            &obs,
            sosa::HAS_FEATURE_OF_INTEREST,
            geolod_iri("EpicaDomeC_IceCore")
        ));
        // No Savitzky-Golay value was supplied.
        assert!(!graph.triples().any(|t| t.predicate == geolod::SMOOTHED_VALUE_SAVGOL));
    }

    #[test]
    fn skipped_record_consumes_no_sequence_number() {
        let sites = sites();
        let mut graph = GraphBuilder::new("data");
        let mut mapper = Mapper::new(&mut graph, Dataset::Epica, &sites, SmoothingParams::default());
        setup(&mut mapper);

        let rows = [
            (Reading::Value(1.0), Reading::Value(600.0)),
            (Reading::Value(2.0), Reading::Missing),
            (Reading::Value(3.0), Reading::Value(610.0)),
        ];
        let mut iris = Vec::new();
        for (age, value) in &rows {
            if let Some((age, value)) = mapper
                .admit(1, "EpicaDomeC", Quantity::Ch4, age, value)
                .unwrap()
            {
                let mut r = record(value);
                r.age = age;
                iris.push(mapper.map_observation(&r).unwrap());
            }
        }
        let stats = mapper.finish();
        assert_eq!(stats.skipped[&Quantity::Ch4].get(SkipReason::MissingValue), 1);
        assert_eq!(stats.observation_total(), 2);
        assert_eq!(
            iris.last().unwrap().as_str(),
            "http://w3id.org/geo-lod/Obs_CH4_EPICA_0001"
        );
    }

    #[test]
    fn classifies_skip_reasons() {
        let sites = sites();
        let mut graph = GraphBuilder::new("data");
        let mut mapper = Mapper::new(&mut graph, Dataset::Epica, &sites, SmoothingParams::default());
        let bad = Reading::Malformed("x".to_string());
        let ok = Reading::Value(1.0);
        for (age, value) in [
            (&Reading::Missing, &ok),
            (&bad, &ok),
            (&ok, &bad),
            (&ok, &Reading::Missing),
        ] {
            assert_eq!(mapper.admit(7, "EpicaDomeC", Quantity::Ch4, age, value), Ok(None));
        }
        let stats = mapper.finish();
        assert_eq!(stats.skipped_by_reason(SkipReason::MissingAge), 1);
        assert_eq!(stats.skipped_by_reason(SkipReason::Malformed), 2);
        assert_eq!(stats.skipped_by_reason(SkipReason::MissingValue), 1);
        assert_eq!(stats.skipped_total(), 4);
    }

    #[test]
    fn skips_are_charged_to_their_quantity() {
        let sites = sites();
        let mut graph = GraphBuilder::new("data");
        let mut mapper = Mapper::new(&mut graph, Dataset::Epica, &sites, SmoothingParams::default());
        let mut dropped = SkipCounts::default();
        dropped.record(SkipReason::Malformed);
        mapper.merge_skips(Quantity::Ch4, &dropped);
        mapper.merge_skips(Quantity::D18O, &dropped);
        mapper
            .admit(3, "EpicaDomeC", Quantity::D18O, &Reading::Value(1.0), &Reading::Missing)
            .unwrap();
        mapper.skip_empty_series(Quantity::D13C, "cave", 5);

        let stats = mapper.finish();
        assert_eq!(stats.skipped[&Quantity::Ch4].total(), 1);
        assert_eq!(stats.skipped[&Quantity::D18O].total(), 2);
        assert_eq!(stats.skipped[&Quantity::D13C].get(SkipReason::EmptySeries), 5);
        assert_eq!(stats.empty_series, vec!["cave/d13C".to_string()]);
        assert_eq!(stats.skipped_total(), 8);
    }

    #[test]
    fn unknown_site_is_fatal() {
        let sites = sites();
        let mut graph = GraphBuilder::new("data");
        let mut mapper = Mapper::new(&mut graph, Dataset::Epica, &sites, SmoothingParams::default());
        assert_eq!(
            mapper.admit(1, "Vostok", Quantity::Ch4, &Reading::Missing, &Reading::Missing),
            Err(MappingError::UnknownSite("Vostok".to_string()))
        );
    }

    #[test]
    fn undeclared_sample_is_reported() {
        let sites = sites();
        let mut graph = GraphBuilder::new("data");
        let mut mapper = Mapper::new(&mut graph, Dataset::Epica, &sites, SmoothingParams::default());
        mapper.ensure_data_source(&SOURCE).unwrap();
        mapper.ensure_site("EpicaDomeC", &source_key("test")).unwrap();
        let err = mapper.map_observation(&record(1.0)).unwrap_err();
        assert_eq!(
            err,
            MappingError::UnknownEntity {
                role: "sample",
                key: "sample:core".to_string()
            }
        );
    }

    #[test]
    fn site_gets_crs_prefixed_geometry() {
        let sites = sites();
        let mut graph = GraphBuilder::new("data");
        let mut mapper = Mapper::new(&mut graph, Dataset::Epica, &sites, SmoothingParams::default());
        setup(&mut mapper);
        let wkt = graph
            .triples()
            .find(|t| t.predicate == geo::AS_WKT)
            .map(|t| t.object.clone());
        assert_eq!(
            wkt,
            Some(Term::Literal(Literal::new_typed_literal(
                "<http://www.opengis.net/def/crs/EPSG/0/4326> POINT(123.350000 -75.100000)",
                geo::WKT_LITERAL
            )))
        );
    }
}
