//! Builds the OWL description of one ontology module.

use crate::graph::builder::{date, plain, text_en};
use crate::graph::entity::{geolod_iri, Quantity};
use crate::graph::{GraphBuilder, MappingError};
use crate::ontology::schema::{self, Module, PropertyKind, EXTERNAL_PROPERTY_LABELS, PROPERTIES};
use crate::ontology::vocab::{dct, geolod, owl, qudt, rdfs};
use chrono::NaiveDate;
use oxrdf::NamedNode;

pub const VERSION: &str = "1.0.0";

fn description(module: Module) -> &'static str {
    match module {
        Module::Core | Module::External => {
            "Shared classes and properties for palaeoclimate observations from ice cores and speleothems."
        }
        Module::Epica => {
            "Extension for EPICA Dome C ice-core observations: drilling site, ice core, CH4 and d18O records, chronologies and DCAT catalogue."
        }
        Module::Sisal => {
            "Extension for SISAL speleothem observations: caves, speleothems, sampling events, d18O and d13C records and U-Th chronologies."
        }
    }
}

/// Graph of one ontology file, in a single partition named after the file.
pub fn build_module(module: Module, created: NaiveDate) -> Result<GraphBuilder, MappingError> {
    let mut g = GraphBuilder::new(module.file_stem());
    let ontology = NamedNode::new_unchecked(module.ontology_iri());
    g.declare(
        &format!("ontology:{}", module.file_stem()),
        &ontology,
        &[owl::ONTOLOGY],
        Some(module.title()),
    )?;
    g.add(&ontology, dct::TITLE, text_en(module.title()));
    g.add(&ontology, dct::DESCRIPTION, text_en(description(module)));
    g.add(&ontology, dct::CREATED, date(created));
    g.add(&ontology, owl::VERSION_INFO, plain(VERSION));
    g.link(
        &ontology,
        dct::LICENSE,
        NamedNode::new_unchecked("https://creativecommons.org/licenses/by/4.0/"),
    );
    if module != Module::Core {
        g.link(&ontology, owl::IMPORTS, geolod::ONTOLOGY);
    }

    let mut classes: Vec<_> = schema::classes_in(module).collect();
    if module == Module::Core {
        // External classes are labelled in the core file so every parent
        // referenced by the hierarchy resolves to something readable.
        classes.extend(schema::classes_in(Module::External));
    }
    for class in classes {
        let iri = class.iri.into_owned();
        g.declare(
            &format!("class:{}", iri.as_str()),
            &iri,
            &[owl::CLASS],
            Some(class.label),
        )?;
        if !class.comment.is_empty() {
            g.add(&iri, rdfs::COMMENT, text_en(class.comment));
        }
        for parent in class.parents {
            g.link(&iri, rdfs::SUB_CLASS_OF, *parent);
        }
    }

    for property in PROPERTIES.iter().filter(|p| p.module == module) {
        let iri = property.iri.into_owned();
        let kind = match property.kind {
            PropertyKind::Object => owl::OBJECT_PROPERTY,
            PropertyKind::Datatype => owl::DATATYPE_PROPERTY,
        };
        g.declare(
            &format!("property:{}", iri.as_str()),
            &iri,
            &[kind],
            Some(property.label),
        )?;
        if !property.comment.is_empty() {
            g.add(&iri, rdfs::COMMENT, text_en(property.comment));
        }
        if let Some(domain) = property.domain {
            g.link(&iri, rdfs::DOMAIN, domain);
        }
        if let Some(range) = property.range {
            g.link(&iri, rdfs::RANGE, range);
        }
    }
    if module == Module::Core {
        for (iri, label) in EXTERNAL_PROPERTY_LABELS {
            g.add(&iri.into_owned(), rdfs::LABEL, text_en(label));
        }
    }

    for quantity in Quantity::ALL.into_iter().filter(|q| q.home_module() == module) {
        let property = geolod_iri(quantity.property_local());
        g.declare(
            &format!("individual:{}", quantity.property_local()),
            &property,
            &[quantity.property_class(), owl::NAMED_INDIVIDUAL],
            Some(quantity.property_label()),
        )?;
        g.link(&property, qudt::UNIT, quantity.unit());

        let mtype = geolod_iri(&quantity.measurement_type_local());
        g.declare(
            &format!("individual:{}", quantity.measurement_type_local()),
            &mtype,
            &[geolod::MEASUREMENT_TYPE, owl::NAMED_INDIVIDUAL],
            Some(quantity.measurement_type_label()),
        )?;
    }

    Ok(g)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::vocab::{crm, geo};
    use oxrdf::vocab::rdf;
    use oxrdf::{NamedNodeRef, Subject, Term, Triple};

    fn created() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn contains(
        g: &GraphBuilder,
        s: NamedNodeRef<'_>,
        p: NamedNodeRef<'_>,
        o: NamedNodeRef<'_>,
    ) -> bool {
        let t = Triple::new(s.into_owned(), p.into_owned(), Term::NamedNode(o.into_owned()));
        g.triples().any(|x| *x == t)
    }

    #[test]
    fn core_declares_shared_hierarchy() {
        let g = build_module(Module::Core, created()).unwrap();
        assert!(contains(&g, geolod::SAMPLING_LOCATION, rdf::TYPE, owl::CLASS));
        assert!(contains(&g, geolod::SAMPLING_LOCATION, rdfs::SUB_CLASS_OF, crm::E27_SITE));
        assert!(contains(&g, geolod::MEASURED_VALUE, rdf::TYPE, owl::DATATYPE_PROPERTY));
        assert!(contains(&g, geolod::MEASUREMENT_TYPE_PROPERTY, rdf::TYPE, owl::OBJECT_PROPERTY));
        let has_geometry = Subject::NamedNode(geo::HAS_GEOMETRY.into_owned());
        assert!(g.triples().any(|t| t.subject == has_geometry));
        // Extensions import the core; the core imports nothing.
        assert!(!g.triples().any(|t| t.predicate == owl::IMPORTS));
    }

    #[test]
    fn extensions_import_core() {
        for module in [Module::Epica, Module::Sisal] {
            let g = build_module(module, created()).unwrap();
            let ontology = NamedNode::new_unchecked(module.ontology_iri());
            assert!(contains(&g, ontology.as_ref(), owl::IMPORTS, geolod::ONTOLOGY));
        }
    }

    #[test]
    fn extension_classes_are_typed_once() {
        let g = build_module(Module::Sisal, created()).unwrap();
        let counts = g.class_counts();
        assert_eq!(
            counts[owl::CLASS.as_str()],
            schema::classes_in(Module::Sisal).count()
        );
        assert!(contains(
            &g,
            geolod::DELTA13C_SPELEOTHEM_OBSERVATION,
            rdfs::SUB_CLASS_OF,
            geolod::SPELEOTHEM_OBSERVATION
        ));
    }
}
