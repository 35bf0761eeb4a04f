//! Pipeline configuration (pipeline.json).
//!
//! JSON shape, every field optional:
//! {
//!   "smoothing": { "rolling_window": 11, "sg_window": 11, "sg_poly_order": 2 },
//!   "epica": {
//!     "ch4_file": "EPICA/EDC_CH4.tab",
//!     "d18o_file": "EPICA/EPICA_Dome_C_d18O.tab",
//!     "site": { "key": "EpicaDomeC", "label": "...", "latitude": -75.1, "longitude": 123.35 }
//!   },
//!   "sisal": {
//!     "sites_file": "SISAL/v_sites_all.csv",
//!     "caves": [ { "site_id": 144, "slug": "144_botuvera" } ]   // "file" defaults to v_data_<slug>.csv
//!   }
//! }
//!
//! Relative paths are resolved against the data directory.

use crate::Result;
use crate::graph::SiteMeta;
use crate::smooth::SmoothingParams;
use anyhow::{Context, bail};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub smoothing: SmoothingParams,
    pub epica: EpicaConfig,
    pub sisal: SisalConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EpicaConfig {
    pub ch4_file: String,
    pub d18o_file: String,
    pub site: SiteConfig,
}

impl Default for EpicaConfig {
    fn default() -> Self {
        Self {
            ch4_file: "EPICA/EDC_CH4.tab".to_string(),
            d18o_file: "EPICA/EPICA_Dome_C_d18O.tab".to_string(),
            site: SiteConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub key: String,
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            key: "EpicaDomeC".to_string(),
            label: "EPICA Dome C, East Antarctica".to_string(),
            latitude: -75.1,
            longitude: 123.35,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SisalConfig {
    pub sites_file: String,
    pub caves: Vec<CaveConfig>,
}

impl Default for SisalConfig {
    fn default() -> Self {
        let cave = |site_id, slug: &str| CaveConfig {
            site_id,
            slug: slug.to_string(),
            file: None,
        };
        Self {
            sites_file: "SISAL/v_sites_all.csv".to_string(),
            caves: vec![
                cave(144, "144_botuvera"),
                cave(145, "145_corchia"),
                cave(140, "140_sanbao"),
                cave(275, "275_buracagloriosa"),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaveConfig {
    pub site_id: u32,
    pub slug: String,
    #[serde(default)]
    pub file: Option<String>,
}

/// Configuration with resolved paths and checked parameters.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub smoothing: SmoothingParams,
    pub epica: EpicaInputs,
    pub sisal: SisalInputs,
}

#[derive(Debug, Clone)]
pub struct EpicaInputs {
    pub ch4_file: PathBuf,
    pub d18o_file: PathBuf,
    pub site: SiteMeta,
}

#[derive(Debug, Clone)]
pub struct SisalInputs {
    pub sites_file: PathBuf,
    pub caves: Vec<CaveInput>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaveInput {
    pub site_id: u32,
    pub slug: String,
    pub file: PathBuf,
}

/// Read `path` if given, otherwise use the defaults.
pub fn load(path: Option<&Path>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse config {}", path.display()))
}

fn check_coordinates(label: &str, latitude: f64, longitude: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        bail!("{label}: latitude {latitude} out of range");
    }
    if !(-180.0..=180.0).contains(&longitude) {
        bail!("{label}: longitude {longitude} out of range");
    }
    Ok(())
}

impl PipelineConfig {
    pub fn validate_and_build(&self, data_dir: &Path) -> Result<ValidatedConfig> {
        self.smoothing
            .validate()
            .context("invalid smoothing parameters")?;

        let site = &self.epica.site;
        if site.key.trim().is_empty() {
            bail!("epica.site.key must not be empty");
        }
        check_coordinates("epica.site", site.latitude, site.longitude)?;

        // Slugs become file names and IRI fragments.
        let slug_re = Regex::new(r"^[A-Za-z0-9_]+$")?;
        let mut slugs = BTreeSet::new();
        let mut ids = BTreeSet::new();
        let mut caves = Vec::new();
        for cave in &self.sisal.caves {
            if !slug_re.is_match(&cave.slug) {
                bail!("invalid cave slug {:?}: use letters, digits and '_'", cave.slug);
            }
            if !slugs.insert(cave.slug.as_str()) {
                bail!("duplicate cave slug in config: {}", cave.slug);
            }
            if !ids.insert(cave.site_id) {
                bail!("duplicate cave site_id in config: {}", cave.site_id);
            }
            let file = cave
                .file
                .clone()
                .unwrap_or_else(|| format!("SISAL/v_data_{}.csv", cave.slug));
            caves.push(CaveInput {
                site_id: cave.site_id,
                slug: cave.slug.clone(),
                file: data_dir.join(file),
            });
        }

        Ok(ValidatedConfig {
            smoothing: self.smoothing,
            epica: EpicaInputs {
                ch4_file: data_dir.join(&self.epica.ch4_file),
                d18o_file: data_dir.join(&self.epica.d18o_file),
                site: SiteMeta {
                    key: site.key.clone(),
                    label: site.label.clone(),
                    latitude: site.latitude,
                    longitude: site.longitude,
                    wkt: None,
                    source_id: None,
                },
            },
            sisal: SisalInputs {
                sites_file: data_dir.join(&self.sisal.sites_file),
                caves,
            },
        })
    }
}
