//! The fixed geo-lod class and property hierarchy.
//!
//! Everything that describes the ontology (Turtle class definitions and the
//! taxonomy diagram) is generated from these tables.

use crate::ontology::vocab::{crm, crmsci, dcat, geo, geolod, prov, sf, sosa};
use oxrdf::NamedNodeRef;
use oxrdf::vocab::xsd;
use serde::Serialize;

/// Which ontology file a term belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    External,
    Core,
    Epica,
    Sisal,
}

impl Module {
    pub const DEFINED: [Module; 3] = [Module::Core, Module::Epica, Module::Sisal];

    pub fn file_stem(self) -> &'static str {
        match self {
            Module::External => "external",
            Module::Core => "geo_lod_core",
            Module::Epica => "epica_ontology",
            Module::Sisal => "sisal_ontology",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Module::External => "External Ontologies",
            Module::Core => "geo-lod Core",
            Module::Epica => "geo-lod EPICA Extension",
            Module::Sisal => "geo-lod SISAL Extension",
        }
    }

    /// IRI of the `owl:Ontology` resource for this module.
    pub fn ontology_iri(self) -> String {
        match self {
            Module::Core | Module::External => geolod::NS.to_string(),
            Module::Epica => format!("{}epica", geolod::NS),
            Module::Sisal => format!("{}sisal", geolod::NS),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ClassDef {
    pub iri: NamedNodeRef<'static>,
    pub module: Module,
    /// Diagram grouping inside the module.
    pub group: &'static str,
    pub label: &'static str,
    pub comment: &'static str,
    pub parents: &'static [NamedNodeRef<'static>],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Object,
    Datatype,
}

#[derive(Debug, Clone, Copy)]
pub struct PropertyDef {
    pub iri: NamedNodeRef<'static>,
    pub module: Module,
    pub kind: PropertyKind,
    pub label: &'static str,
    pub comment: &'static str,
    pub domain: Option<NamedNodeRef<'static>>,
    pub range: Option<NamedNodeRef<'static>>,
}

const fn class(
    iri: NamedNodeRef<'static>,
    module: Module,
    group: &'static str,
    label: &'static str,
    comment: &'static str,
    parents: &'static [NamedNodeRef<'static>],
) -> ClassDef {
    ClassDef {
        iri,
        module,
        group,
        label,
        comment,
        parents,
    }
}

pub const CLASSES: &[ClassDef] = &[
    // External terms referenced by the hierarchy.
    class(geo::FEATURE, Module::External, "GeoSPARQL", "Feature",
        "An abstraction of a real-world phenomenon (OGC GeoSPARQL).", &[]),
    class(geo::FEATURE_COLLECTION, Module::External, "GeoSPARQL", "Feature Collection",
        "A collection of geo:Feature instances (GeoSPARQL 1.1).", &[]),
    class(geo::GEOMETRY, Module::External, "GeoSPARQL", "Geometry",
        "A coherent set of direct positions in space (OGC GeoSPARQL).", &[]),
    class(sf::POINT, Module::External, "Simple Features", "Point",
        "A single location in n-dimensional space (OGC Simple Features).", &[geo::GEOMETRY]),
    class(crm::E53_PLACE, Module::External, "CIDOC-CRM", "Place",
        "An extent in space (CIDOC-CRM E53).", &[]),
    class(crm::E27_SITE, Module::External, "CIDOC-CRM", "Site",
        "A place that was or is the focus of human activity (CIDOC-CRM E27).", &[]),
    class(crm::E22_HUMAN_MADE_OBJECT, Module::External, "CIDOC-CRM", "Human-Made Object",
        "A physical object purposely created by human activity (CIDOC-CRM E22).", &[]),
    class(crm::E7_ACTIVITY, Module::External, "CIDOC-CRM", "Activity",
        "Actions intentionally carried out by actors (CIDOC-CRM E7).", &[]),
    class(crmsci::S1_MATTER_REMOVAL, Module::External, "CRMsci", "Matter Removal",
        "A process of removing matter from an object (CRMsci S1).", &[]),
    class(crmsci::S4_OBSERVATION, Module::External, "CRMsci", "Observation",
        "A scientific observation event (CRMsci S4).", &[]),
    class(crmsci::S6_DATA_EVALUATION, Module::External, "CRMsci", "Data Evaluation",
        "A process producing a value by evaluating data (CRMsci S6).", &[]),
    class(crmsci::S9_PROPERTY_TYPE, Module::External, "CRMsci", "Property Type",
        "A type of measurable property (CRMsci S9).", &[]),
    class(sosa::OBSERVATION, Module::External, "SOSA / SSN", "Observation", "", &[]),
    class(sosa::SAMPLE, Module::External, "SOSA / SSN", "Sample", "", &[]),
    class(sosa::OBSERVABLE_PROPERTY, Module::External, "SOSA / SSN", "Observable Property", "", &[]),
    class(prov::ENTITY, Module::External, "PROV-O", "Entity", "", &[]),
    class(dcat::CATALOG, Module::External, "DCAT", "Catalog", "", &[]),
    class(dcat::DATASET, Module::External, "DCAT", "Dataset", "", &[]),
    // Core.
    class(geolod::SAMPLING_LOCATION, Module::Core, "Locations", "Sampling Location",
        "A geographically identified location from which palaeoclimate proxy material was obtained (ice-core drilling site or speleothem cave).",
        &[geo::FEATURE, crm::E53_PLACE, crm::E27_SITE]),
    class(geolod::PALAEOCLIMATE_SAMPLE, Module::Core, "Samples", "Palaeoclimate Sample",
        "A physical archive recording a palaeoclimate signal (ice core or speleothem).",
        &[sosa::SAMPLE]),
    class(geolod::PALAEOCLIMATE_OBSERVATION, Module::Core, "Observations", "Palaeoclimate Observation",
        "A single measured value (e.g. δ¹⁸O, δ¹³C, CH₄) at a known depth or age within a palaeoclimate archive.",
        &[crmsci::S4_OBSERVATION, sosa::OBSERVATION]),
    class(geolod::OBSERVABLE_PROPERTY, Module::Core, "Observable Properties", "Observable Property",
        "A measurable geochemical or physical property of a palaeoclimate sample.",
        &[sosa::OBSERVABLE_PROPERTY, crmsci::S9_PROPERTY_TYPE]),
    class(geolod::DELTA18O_PROPERTY, Module::Core, "Observable Properties", "δ¹⁸O Property",
        "Stable oxygen isotope ratio (δ¹⁸O), shared by both ice-core and speleothem records.",
        &[geolod::OBSERVABLE_PROPERTY]),
    class(geolod::CHRONOLOGY, Module::Core, "Chronology", "Chronology",
        "A depth-age model assigning calendar ages to positions within a palaeoclimate archive.",
        &[]),
    class(geolod::MEASUREMENT_TYPE, Module::Core, "Measurement Type", "Measurement Type",
        "Classifies an observation by the physical quantity measured.",
        &[crmsci::S6_DATA_EVALUATION]),
    class(geolod::SMOOTHING_METHOD, Module::Core, "Smoothing", "Smoothing Method",
        "A numerical method applied to reduce high-frequency noise in a palaeoclimate time series.",
        &[crmsci::S6_DATA_EVALUATION]),
    class(geolod::ROLLING_MEDIAN_FILTER, Module::Core, "Smoothing", "Rolling Median Filter",
        "Non-parametric smoother computing the median within a sliding window of fixed width.",
        &[geolod::SMOOTHING_METHOD]),
    class(geolod::SAVITZKY_GOLAY_FILTER, Module::Core, "Smoothing", "Savitzky-Golay Filter",
        "Polynomial least-squares smoothing filter preserving higher signal moments.",
        &[geolod::SMOOTHING_METHOD]),
    class(geolod::DATA_SOURCE, Module::Core, "Data Source", "Data Source",
        "A citable source (database, repository, publication) from which palaeoclimate observations were obtained.",
        &[prov::ENTITY]),
    // EPICA extension.
    class(geolod::DRILLING_SITE, Module::Epica, "Ice Core Location", "Drilling Site",
        "The location of an ice-core drilling operation.",
        &[geolod::SAMPLING_LOCATION]),
    class(geolod::ICE_CORE, Module::Epica, "Ice Core Sample", "Ice Core",
        "A cylindrical sample of ice recovered by drilling.",
        &[geolod::PALAEOCLIMATE_SAMPLE, crm::E22_HUMAN_MADE_OBJECT]),
    class(geolod::ICE_CORE_OBSERVATION, Module::Epica, "Ice Core Observations", "Ice Core Observation",
        "An observation made on ice-core material.",
        &[geolod::PALAEOCLIMATE_OBSERVATION]),
    class(geolod::CH4_OBSERVATION, Module::Epica, "Ice Core Observations", "CH₄ Observation",
        "A methane concentration measurement on air trapped in ice.",
        &[geolod::ICE_CORE_OBSERVATION]),
    class(geolod::DELTA18O_OBSERVATION, Module::Epica, "Ice Core Observations", "δ¹⁸O Observation",
        "A stable oxygen isotope measurement on an ice core.",
        &[geolod::ICE_CORE_OBSERVATION]),
    class(geolod::CH4_CONCENTRATION_PROPERTY, Module::Epica, "Ice Core Properties", "CH₄ Concentration Property",
        "Atmospheric methane concentration recorded in trapped air.",
        &[geolod::OBSERVABLE_PROPERTY]),
    class(geolod::ICE_CORE_CHRONOLOGY, Module::Epica, "Ice Core Chronology", "Ice Core Chronology",
        "A depth-age model for an ice core (e.g. EDC2, AICC2023).",
        &[geolod::CHRONOLOGY]),
    class(geolod::PALAEOCLIMATE_DATA_CATALOGUE, Module::Epica, "Catalogue & Dataset", "Palaeoclimate Data Catalogue",
        "A DCAT catalogue aggregating one or more palaeoclimate ice core datasets.",
        &[dcat::CATALOG]),
    class(geolod::ICE_CORE_DATASET, Module::Epica, "Catalogue & Dataset", "Ice Core Dataset",
        "A dataset derived from measurements on an ice core.",
        &[dcat::DATASET]),
    class(geolod::CH4_DATASET, Module::Epica, "Catalogue & Dataset", "Methane (CH₄) Ice Core Dataset",
        "Dataset containing methane concentration observations from an ice core.",
        &[geolod::ICE_CORE_DATASET]),
    class(geolod::DELTA18O_DATASET, Module::Epica, "Catalogue & Dataset", "δ¹⁸O Ice Core Dataset",
        "Dataset containing stable oxygen isotope observations from an ice core.",
        &[geolod::ICE_CORE_DATASET]),
    class(geolod::DRILLING_CAMPAIGN, Module::Epica, "Campaign", "Drilling Campaign",
        "A field campaign recovering an ice core.",
        &[crm::E7_ACTIVITY]),
    // SISAL extension.
    class(geolod::CAVE, Module::Sisal, "Speleothem Location", "Cave",
        "A cave from which speleothems were sampled.",
        &[geolod::SAMPLING_LOCATION]),
    class(geolod::SPELEOTHEM, Module::Sisal, "Speleothem Sample", "Speleothem",
        "A secondary cave mineral deposit (stalagmite, stalactite, flowstone).",
        &[geolod::PALAEOCLIMATE_SAMPLE]),
    class(geolod::SPELEOTHEM_SAMPLING_EVENT, Module::Sisal, "Sampling Event", "Speleothem Sampling Event",
        "The removal of a speleothem from its cave.",
        &[crmsci::S1_MATTER_REMOVAL]),
    class(geolod::SPELEOTHEM_OBSERVATION, Module::Sisal, "Speleothem Observations", "Speleothem Observation",
        "An observation made on speleothem material.",
        &[geolod::PALAEOCLIMATE_OBSERVATION]),
    class(geolod::DELTA18O_SPELEOTHEM_OBSERVATION, Module::Sisal, "Speleothem Observations", "δ¹⁸O Speleothem Observation",
        "A stable oxygen isotope measurement on speleothem calcite.",
        &[geolod::SPELEOTHEM_OBSERVATION]),
    class(geolod::DELTA13C_SPELEOTHEM_OBSERVATION, Module::Sisal, "Speleothem Observations", "δ¹³C Speleothem Observation",
        "A stable carbon isotope measurement on speleothem calcite.",
        &[geolod::SPELEOTHEM_OBSERVATION]),
    class(geolod::DELTA13C_PROPERTY, Module::Sisal, "Speleothem Properties", "δ¹³C Property",
        "Stable carbon isotope ratio (δ¹³C).",
        &[geolod::OBSERVABLE_PROPERTY]),
    class(geolod::UTH_CHRONOLOGY, Module::Sisal, "U-Th Chronology", "U-Th Chronology",
        "A uranium-thorium age model for a speleothem.",
        &[geolod::CHRONOLOGY]),
];

const fn property(
    iri: NamedNodeRef<'static>,
    kind: PropertyKind,
    label: &'static str,
    comment: &'static str,
    domain: Option<NamedNodeRef<'static>>,
    range: Option<NamedNodeRef<'static>>,
) -> PropertyDef {
    PropertyDef {
        iri,
        module: Module::Core,
        kind,
        label,
        comment,
        domain,
        range,
    }
}

use self::PropertyKind::{Datatype, Object};

/// All geo-lod properties live in the core module.
pub const PROPERTIES: &[PropertyDef] = &[
    property(geolod::AGE_CHRONOLOGY, Object, "age chronology",
        "Links an observation to the depth-age model used.", None, Some(geolod::CHRONOLOGY)),
    property(geolod::MEASUREMENT_TYPE_PROPERTY, Object, "measurement type", "",
        Some(geolod::PALAEOCLIMATE_OBSERVATION), Some(geolod::MEASUREMENT_TYPE)),
    property(geolod::SMOOTHING_METHOD_MEDIAN, Object, "smoothing method (rolling median)", "",
        Some(geolod::PALAEOCLIMATE_OBSERVATION), Some(geolod::ROLLING_MEDIAN_FILTER)),
    property(geolod::SMOOTHING_METHOD_SAVGOL, Object, "smoothing method (Savitzky-Golay)", "",
        Some(geolod::PALAEOCLIMATE_OBSERVATION), Some(geolod::SAVITZKY_GOLAY_FILTER)),
    property(geolod::TOOK_PLACE_AT, Object, "took place at",
        "Links a sampling event or campaign to its location.", None, Some(geolod::SAMPLING_LOCATION)),
    property(geolod::EXTRACTED_FROM, Object, "extracted from", "",
        Some(geolod::PALAEOCLIMATE_SAMPLE), Some(geolod::SAMPLING_LOCATION)),
    property(geolod::REMOVED_SAMPLE, Object, "removed sample",
        "Links a sampling event to the sample taken.", None, Some(geolod::PALAEOCLIMATE_SAMPLE)),
    property(geolod::HAS_OBSERVATION, Object, "has observation", "", None, Some(geolod::PALAEOCLIMATE_OBSERVATION)),
    property(geolod::AGE_KA_BP, Datatype, "age (ka BP)",
        "Age in thousands of years before present (ka BP).", None, Some(xsd::DECIMAL)),
    property(geolod::AGE_YEARS_BP, Datatype, "age (a BP)",
        "Age in years before present (BP = 1950 CE).", None, Some(xsd::DECIMAL)),
    property(geolod::AT_DEPTH_M, Datatype, "depth (m)",
        "Sample depth below surface in metres.", Some(geolod::PALAEOCLIMATE_OBSERVATION), Some(xsd::DECIMAL)),
    property(geolod::MEASURED_VALUE, Datatype, "measured value", "",
        Some(geolod::PALAEOCLIMATE_OBSERVATION), Some(xsd::DECIMAL)),
    property(geolod::SMOOTHED_VALUE_ROLLING_MEDIAN, Datatype, "smoothed value (rolling median)", "",
        Some(geolod::PALAEOCLIMATE_OBSERVATION), Some(xsd::DECIMAL)),
    property(geolod::SMOOTHED_VALUE_SAVGOL, Datatype, "smoothed value (Savitzky-Golay)", "",
        Some(geolod::PALAEOCLIMATE_OBSERVATION), Some(xsd::DECIMAL)),
    property(geolod::WINDOW_SIZE, Datatype, "window size",
        "Number of data points in the smoothing window.", Some(geolod::SMOOTHING_METHOD), Some(xsd::INTEGER)),
    property(geolod::POLY_ORDER, Datatype, "polynomial order", "",
        Some(geolod::SAVITZKY_GOLAY_FILTER), Some(xsd::INTEGER)),
    property(geolod::SITE_ID, Datatype, "site id", "Source database identifier of a site.",
        Some(geolod::SAMPLING_LOCATION), Some(xsd::INTEGER)),
    property(geolod::ENTITY_ID, Datatype, "entity id", "Source database identifier of a sample.",
        Some(geolod::PALAEOCLIMATE_SAMPLE), Some(xsd::INTEGER)),
    property(geolod::SAMPLE_ID, Datatype, "sample id",
        "Source database identifier of the subsample an observation was made on.",
        Some(geolod::PALAEOCLIMATE_OBSERVATION), Some(xsd::INTEGER)),
];

/// Labels for external properties so ontology editors show readable names.
pub const EXTERNAL_PROPERTY_LABELS: &[(NamedNodeRef<'static>, &str)] = &[
    (geo::HAS_GEOMETRY, "has geometry"),
    (geo::AS_WKT, "as WKT"),
];

pub fn classes_in(module: Module) -> impl Iterator<Item = &'static ClassDef> {
    CLASSES.iter().filter(move |c| c.module == module)
}
