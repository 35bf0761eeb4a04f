//! Readers for SISAL CSV exports: the site table and per-site isotope series.

use crate::Result;
use crate::source::row::{Reading, SkipCounts, SkipReason, SpeleothemRow};
use anyhow::Context;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// One row of `v_sites_all.csv`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SiteRecord {
    pub site_id: u32,
    pub site_name: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// WKT point, with or without CRS prefix.
    #[serde(default)]
    pub geom: Option<String>,
}

/// Raw shape of a `v_data_*.csv` row. Everything is text until validated.
#[derive(Debug, Deserialize)]
struct RawSampleRow {
    #[serde(default)]
    site_id: Option<String>,
    #[serde(default)]
    site_name: Option<String>,
    #[serde(default)]
    entity_id: Option<String>,
    #[serde(default)]
    entity_name: Option<String>,
    #[serde(default)]
    sample_id: Option<String>,
    #[serde(default)]
    age_bp: Option<String>,
    #[serde(default)]
    d18o_permille: Option<String>,
    #[serde(default)]
    d13c_permille: Option<String>,
}

/// Rows read from one SISAL data file plus rows that could not be identified.
#[derive(Debug, Default)]
pub struct SampleTable {
    pub rows: Vec<SpeleothemRow>,
    pub skipped: SkipCounts,
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader)
}

pub fn read_sites_file(path: &Path) -> Result<Vec<SiteRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("open sites file {}", path.display()))?;
    read_sites(file).with_context(|| format!("parse sites file {}", path.display()))
}

pub fn read_sites<R: Read>(reader: R) -> Result<Vec<SiteRecord>> {
    let mut out = Vec::new();
    for record in csv_reader(reader).deserialize() {
        out.push(record?);
    }
    Ok(out)
}

pub fn read_samples_file(path: &Path) -> Result<SampleTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("open SISAL data file {}", path.display()))?;
    read_samples(file).with_context(|| format!("parse SISAL data file {}", path.display()))
}

/// Read a per-site isotope export.
///
/// Rows whose site or entity id is not an integer cannot be attached to any
/// speleothem; they are counted as malformed and left out.
pub fn read_samples<R: Read>(reader: R) -> Result<SampleTable> {
    let mut table = SampleTable::default();
    for (idx, record) in csv_reader(reader).deserialize::<RawSampleRow>().enumerate() {
        // Line 1 is the header.
        let line = idx + 2;
        let raw = record.with_context(|| format!("line {}", line))?;

        let site_id = raw.site_id.as_deref().and_then(|s| s.parse::<u32>().ok());
        let entity_id = raw.entity_id.as_deref().and_then(|s| s.parse::<u32>().ok());
        let (Some(site_id), Some(entity_id)) = (site_id, entity_id) else {
            debug!(line, "SISAL row without usable site/entity id, skipped");
            table.skipped.record(SkipReason::Malformed);
            continue;
        };

        table.rows.push(SpeleothemRow {
            line,
            site_id,
            site_name: raw.site_name.unwrap_or_default(),
            entity_id,
            entity_name: raw.entity_name.unwrap_or_default(),
            sample_id: raw.sample_id.as_deref().and_then(|s| s.parse().ok()),
            age_bp: Reading::parse(raw.age_bp.as_deref()),
            d18o: Reading::parse(raw.d18o_permille.as_deref()),
            d13c: Reading::parse(raw.d13c_permille.as_deref()),
        });
    }
    Ok(table)
}
