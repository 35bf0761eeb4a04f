//! Domain vocabulary for the mapping layer: datasets, measured quantities,
//! site metadata and IRI construction.

use crate::ontology::schema::Module;
use crate::ontology::vocab::{CRS_WGS84, geolod, unit};
use crate::source::AgeUnit;
use oxrdf::{NamedNode, NamedNodeRef};
use serde::Serialize;

/// IRI in the project namespace.
pub fn geolod_iri(local: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{}{}", geolod::NS, local))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    Epica,
    Sisal,
}

impl Dataset {
    pub const ALL: [Dataset; 2] = [Dataset::Epica, Dataset::Sisal];

    /// Tag used inside observation IRIs.
    pub fn tag(self) -> &'static str {
        match self {
            Dataset::Epica => "EPICA",
            Dataset::Sisal => "SISAL",
        }
    }

    /// Lower-case name used for directories and file prefixes.
    pub fn slug(self) -> &'static str {
        match self {
            Dataset::Epica => "epica",
            Dataset::Sisal => "sisal",
        }
    }

    pub fn age_unit(self) -> AgeUnit {
        match self {
            Dataset::Epica => AgeUnit::KaBp,
            Dataset::Sisal => AgeUnit::YearsBp,
        }
    }
}

/// A measured quantity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Quantity {
    #[serde(rename = "CH4")]
    Ch4,
    #[serde(rename = "d18O")]
    D18O,
    #[serde(rename = "d13C")]
    D13C,
}

impl Quantity {
    pub const ALL: [Quantity; 3] = [Quantity::Ch4, Quantity::D18O, Quantity::D13C];

    pub fn tag(self) -> &'static str {
        match self {
            Quantity::Ch4 => "CH4",
            Quantity::D18O => "d18O",
            Quantity::D13C => "d13C",
        }
    }

    /// File-name form.
    pub fn slug(self) -> &'static str {
        match self {
            Quantity::Ch4 => "ch4",
            Quantity::D18O => "d18o",
            Quantity::D13C => "d13c",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Quantity::Ch4 => "CH₄",
            Quantity::D18O => "δ¹⁸O",
            Quantity::D13C => "δ¹³C",
        }
    }

    /// Axis caption with unit.
    pub fn axis_label(self) -> &'static str {
        match self {
            Quantity::Ch4 => "CH₄ (ppbv)",
            Quantity::D18O => "δ¹⁸O (‰)",
            Quantity::D13C => "δ¹³C (‰)",
        }
    }

    /// Fraction digits of `geolod:measuredValue`.
    pub fn decimals(self) -> usize {
        match self {
            Quantity::Ch4 => 2,
            Quantity::D18O | Quantity::D13C => 5,
        }
    }

    pub fn unit(self) -> NamedNodeRef<'static> {
        match self {
            Quantity::Ch4 => unit::PPB,
            Quantity::D18O | Quantity::D13C => unit::PERMILLE,
        }
    }

    /// Local name of the shared observable-property individual.
    pub fn property_local(self) -> &'static str {
        match self {
            Quantity::Ch4 => "CH4Concentration",
            Quantity::D18O => "Delta18O",
            Quantity::D13C => "Delta13C",
        }
    }

    pub fn property_class(self) -> NamedNodeRef<'static> {
        match self {
            Quantity::Ch4 => geolod::CH4_CONCENTRATION_PROPERTY,
            Quantity::D18O => geolod::DELTA18O_PROPERTY,
            Quantity::D13C => geolod::DELTA13C_PROPERTY,
        }
    }

    pub fn property_label(self) -> &'static str {
        match self {
            Quantity::Ch4 => "Methane concentration (CH₄)",
            Quantity::D18O => "Stable oxygen isotope ratio (δ¹⁸O)",
            Quantity::D13C => "Stable carbon isotope ratio (δ¹³C)",
        }
    }

    pub fn measurement_type_local(self) -> String {
        format!("MeasurementType_{}", self.tag())
    }

    pub fn measurement_type_label(self) -> &'static str {
        match self {
            Quantity::Ch4 => "Methane (CH₄) measurement",
            Quantity::D18O => "δ¹⁸O stable isotope measurement",
            Quantity::D13C => "δ¹³C stable isotope measurement",
        }
    }

    /// Ontology module that defines the property and measurement type.
    pub fn home_module(self) -> Module {
        match self {
            Quantity::Ch4 => Module::Epica,
            Quantity::D18O => Module::Core,
            Quantity::D13C => Module::Sisal,
        }
    }

    pub fn observation_class(self, dataset: Dataset) -> NamedNodeRef<'static> {
        match (dataset, self) {
            (Dataset::Epica, Quantity::Ch4) => geolod::CH4_OBSERVATION,
            (Dataset::Epica, Quantity::D18O) => geolod::DELTA18O_OBSERVATION,
            (Dataset::Epica, Quantity::D13C) => geolod::ICE_CORE_OBSERVATION,
            (Dataset::Sisal, Quantity::D18O) => geolod::DELTA18O_SPELEOTHEM_OBSERVATION,
            (Dataset::Sisal, Quantity::D13C) => geolod::DELTA13C_SPELEOTHEM_OBSERVATION,
            (Dataset::Sisal, Quantity::Ch4) => geolod::SPELEOTHEM_OBSERVATION,
        }
    }

    /// Observation IRI: `Obs_{quantity}_{dataset}_{seq:04}`.
    pub fn observation_iri(self, dataset: Dataset, seq: usize) -> NamedNode {
        geolod_iri(&format!("Obs_{}_{}_{:04}", self.tag(), dataset.tag(), seq))
    }
}

/// Static description of a sampling location.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteMeta {
    /// Local name of the site IRI; also the key records refer to.
    pub key: String,
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
    /// WKT supplied by the source, if any. Preferred over lat/lon.
    pub wkt: Option<String>,
    /// Identifier in the source database.
    pub source_id: Option<u32>,
}

impl SiteMeta {
    pub fn iri(&self) -> NamedNode {
        geolod_iri(&self.key)
    }

    pub fn geometry_iri(&self) -> NamedNode {
        geolod_iri(&format!("{}_Geometry", self.key))
    }

    /// CRS-prefixed WKT for this site.
    pub fn wkt_literal(&self) -> String {
        match &self.wkt {
            Some(wkt) => with_crs(wkt),
            None => point_wkt(self.longitude, self.latitude),
        }
    }
}

/// `<CRS> POINT(lon lat)`, longitude first.
pub fn point_wkt(longitude: f64, latitude: f64) -> String {
    format!("<{}> POINT({:.6} {:.6})", CRS_WGS84, longitude, latitude)
}

/// Prefix a WKT string with the WGS84 CRS unless it already carries one.
pub fn with_crs(wkt: &str) -> String {
    let wkt = wkt.trim();
    if wkt.starts_with('<') {
        wkt.to_string()
    } else {
        format!("<{}> {}", CRS_WGS84, wkt)
    }
}
