//! IRIs of the project namespace and the external vocabularies it reuses.

use oxrdf::NamedNodeRef;

macro_rules! terms {
    ($ns:literal; $($name:ident = $local:literal),* $(,)?) => {
        pub const NS: &str = $ns;
        $(
            pub const $name: super::NamedNodeRef<'static> =
                super::NamedNodeRef::new_unchecked(concat!($ns, $local));
        )*
    };
}

/// Prefixes bound in every Turtle file, in output order.
pub const PREFIXES: &[(&str, &str)] = &[
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", rdfs::NS),
    ("owl", owl::NS),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("geo", geo::NS),
    ("sf", sf::NS),
    ("crm", crm::NS),
    ("crmsci", crmsci::NS),
    ("sosa", sosa::NS),
    ("ssn", "http://www.w3.org/ns/ssn/"),
    ("qudt", qudt::NS),
    ("unit", unit::NS),
    ("prov", prov::NS),
    ("dct", dct::NS),
    ("dcat", dcat::NS),
    ("skos", "http://www.w3.org/2004/02/skos/core#"),
    ("geolod", geolod::NS),
];

/// EPSG:4326 CRS IRI prefixed to every WKT literal.
pub const CRS_WGS84: &str = "http://www.opengis.net/def/crs/EPSG/0/4326";

/// Shorten an IRI to `prefix:local` when a bound prefix matches.
pub fn compact(iri: &str) -> String {
    PREFIXES
        .iter()
        .filter(|(_, ns)| iri.starts_with(ns))
        .max_by_key(|(_, ns)| ns.len())
        .map(|(prefix, ns)| format!("{}:{}", prefix, &iri[ns.len()..]))
        .unwrap_or_else(|| format!("<{}>", iri))
}

pub mod rdfs {
    terms!("http://www.w3.org/2000/01/rdf-schema#";
        LABEL = "label",
        COMMENT = "comment",
        SUB_CLASS_OF = "subClassOf",
        MEMBER = "member",
        DOMAIN = "domain",
        RANGE = "range",
    );
}

pub mod owl {
    terms!("http://www.w3.org/2002/07/owl#";
        ONTOLOGY = "Ontology",
        CLASS = "Class",
        OBJECT_PROPERTY = "ObjectProperty",
        DATATYPE_PROPERTY = "DatatypeProperty",
        NAMED_INDIVIDUAL = "NamedIndividual",
        IMPORTS = "imports",
        VERSION_INFO = "versionInfo",
    );
}

pub mod geo {
    terms!("http://www.opengis.net/ont/geosparql#";
        FEATURE = "Feature",
        FEATURE_COLLECTION = "FeatureCollection",
        GEOMETRY = "Geometry",
        HAS_GEOMETRY = "hasGeometry",
        AS_WKT = "asWKT",
        WKT_LITERAL = "wktLiteral",
    );
}

pub mod sf {
    terms!("http://www.opengis.net/ont/sf#";
        POINT = "Point",
    );
}

pub mod crm {
    terms!("http://www.cidoc-crm.org/cidoc-crm/";
        E7_ACTIVITY = "E7_Activity",
        E22_HUMAN_MADE_OBJECT = "E22_Human-Made_Object",
        E27_SITE = "E27_Site",
        E53_PLACE = "E53_Place",
        P4_HAS_TIME_SPAN = "P4_has_time-span",
        P7_TOOK_PLACE_AT = "P7_took_place_at",
    );
}

pub mod crmsci {
    terms!("http://www.ics.forth.gr/isl/CRMsci/";
        S1_MATTER_REMOVAL = "S1_Matter_Removal",
        S4_OBSERVATION = "S4_Observation",
        S6_DATA_EVALUATION = "S6_Data_Evaluation",
        S9_PROPERTY_TYPE = "S9_Property_Type",
    );
}

pub mod sosa {
    terms!("http://www.w3.org/ns/sosa/";
        OBSERVATION = "Observation",
        OBSERVABLE_PROPERTY = "ObservableProperty",
        SAMPLE = "Sample",
        HAS_FEATURE_OF_INTEREST = "hasFeatureOfInterest",
        OBSERVED_PROPERTY = "observedProperty",
        IS_SAMPLE_OF = "isSampleOf",
    );
}

pub mod qudt {
    terms!("http://qudt.org/schema/qudt/";
        UNIT = "unit",
    );
}

pub mod unit {
    terms!("http://qudt.org/vocab/unit/";
        PPB = "PPB",
        PERMILLE = "PERMILLE",
    );
}

pub mod prov {
    terms!("http://www.w3.org/ns/prov#";
        ENTITY = "Entity",
        WAS_DERIVED_FROM = "wasDerivedFrom",
    );
}

pub mod dct {
    terms!("http://purl.org/dc/terms/";
        BIBLIOGRAPHIC_RESOURCE = "BibliographicResource",
        TITLE = "title",
        DESCRIPTION = "description",
        CREATOR = "creator",
        CREATED = "created",
        DATE = "date",
        LICENSE = "license",
        PUBLISHER = "publisher",
        REFERENCES = "references",
        SOURCE = "source",
    );
}

pub mod dcat {
    terms!("http://www.w3.org/ns/dcat#";
        CATALOG = "Catalog",
        DATASET = "Dataset",
        DATASET_PROPERTY = "dataset",
        DISTRIBUTION = "distribution",
        RECORD = "record",
    );
}

pub mod geolod {
    terms!("http://w3id.org/geo-lod/";
        ONTOLOGY = "",
        // core classes
        SAMPLING_LOCATION = "SamplingLocation",
        PALAEOCLIMATE_SAMPLE = "PalaeoclimateSample",
        PALAEOCLIMATE_OBSERVATION = "PalaeoclimateObservation",
        OBSERVABLE_PROPERTY = "ObservableProperty",
        DELTA18O_PROPERTY = "Delta18OProperty",
        CHRONOLOGY = "Chronology",
        MEASUREMENT_TYPE = "MeasurementType",
        SMOOTHING_METHOD = "SmoothingMethod",
        ROLLING_MEDIAN_FILTER = "RollingMedianFilter",
        SAVITZKY_GOLAY_FILTER = "SavitzkyGolayFilter",
        DATA_SOURCE = "DataSource",
        // EPICA classes
        DRILLING_SITE = "DrillingSite",
        ICE_CORE = "IceCore",
        ICE_CORE_OBSERVATION = "IceCoreObservation",
        CH4_OBSERVATION = "CH4Observation",
        DELTA18O_OBSERVATION = "Delta18OObservation",
        CH4_CONCENTRATION_PROPERTY = "CH4ConcentrationProperty",
        ICE_CORE_CHRONOLOGY = "IceCoreChronology",
        PALAEOCLIMATE_DATA_CATALOGUE = "PalaeoclimateDataCatalogue",
        ICE_CORE_DATASET = "IceCoreDataset",
        CH4_DATASET = "CH4Dataset",
        DELTA18O_DATASET = "Delta18ODataset",
        DRILLING_CAMPAIGN = "DrillingCampaign",
        // SISAL classes
        CAVE = "Cave",
        SPELEOTHEM = "Speleothem",
        SPELEOTHEM_SAMPLING_EVENT = "SpeleothemSamplingEvent",
        SPELEOTHEM_OBSERVATION = "SpeleothemObservation",
        DELTA18O_SPELEOTHEM_OBSERVATION = "Delta18OSpeleothemObservation",
        DELTA13C_SPELEOTHEM_OBSERVATION = "Delta13CSpeleothemObservation",
        DELTA13C_PROPERTY = "Delta13CProperty",
        UTH_CHRONOLOGY = "UThChronology",
        // object properties
        AGE_CHRONOLOGY = "ageChronology",
        MEASUREMENT_TYPE_PROPERTY = "measurementType",
        SMOOTHING_METHOD_MEDIAN = "smoothingMethod_median",
        SMOOTHING_METHOD_SAVGOL = "smoothingMethod_savgol",
        TOOK_PLACE_AT = "tookPlaceAt",
        EXTRACTED_FROM = "extractedFrom",
        REMOVED_SAMPLE = "removedSample",
        HAS_OBSERVATION = "hasObservation",
        // datatype properties
        AGE_KA_BP = "ageKaBP",
        AGE_YEARS_BP = "ageYearsBP",
        AT_DEPTH_M = "atDepth_m",
        MEASURED_VALUE = "measuredValue",
        SMOOTHED_VALUE_ROLLING_MEDIAN = "smoothedValue_rollingMedian",
        SMOOTHED_VALUE_SAVGOL = "smoothedValue_savgol",
        WINDOW_SIZE = "windowSize",
        POLY_ORDER = "polyOrder",
        SITE_ID = "siteId",
        ENTITY_ID = "entityId",
        SAMPLE_ID = "sampleId",
    );
}
