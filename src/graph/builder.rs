use crate::graph::MappingError;
use oxrdf::vocab::{rdf, xsd};
use oxrdf::{Literal, NamedNode, NamedNodeRef, Term, Triple};
use std::collections::{BTreeMap, HashMap, HashSet};

/// One logical output file of a dataset graph.
#[derive(Debug, Clone)]
pub struct Partition {
    pub name: String,
    pub triples: Vec<Triple>,
}

/// A registered graph node, keyed by its source key.
#[derive(Debug, Clone)]
pub struct Entity {
    pub iri: NamedNode,
    pub classes: Vec<NamedNode>,
}

impl Entity {
    /// The most specific class, used to group entities in diagrams.
    pub fn primary_class(&self) -> Option<&NamedNode> {
        self.classes.first()
    }
}

/// In-memory graph of one dataset run.
///
/// Triples are written into the current partition. A triple already asserted
/// in any partition is dropped, so partitions never overlap and their
/// concatenation is the whole graph. Entities are registered once by key;
/// `rdf:type` triples are only produced by [`GraphBuilder::declare`].
#[derive(Debug)]
pub struct GraphBuilder {
    partitions: Vec<Partition>,
    current: usize,
    asserted: HashSet<Triple>,
    entities: BTreeMap<String, Entity>,
    key_by_iri: HashMap<NamedNode, String>,
    sequences: HashMap<String, usize>,
}

impl GraphBuilder {
    pub fn new(first_partition: &str) -> Self {
        Self {
            partitions: vec![Partition {
                name: first_partition.to_string(),
                triples: Vec::new(),
            }],
            current: 0,
            asserted: HashSet::new(),
            entities: BTreeMap::new(),
            key_by_iri: HashMap::new(),
            sequences: HashMap::new(),
        }
    }

    /// Switch to the named partition, creating it after the existing ones.
    pub fn begin_partition(&mut self, name: &str) {
        if let Some(idx) = self.partitions.iter().position(|p| p.name == name) {
            self.current = idx;
            return;
        }
        self.partitions.push(Partition {
            name: name.to_string(),
            triples: Vec::new(),
        });
        self.current = self.partitions.len() - 1;
    }

    /// Register an entity and emit its type and label triples.
    ///
    /// Returns `Ok(true)` when the entity is new. Declaring a known key again
    /// is a no-op; reusing an IRI under a different key is an error.
    pub fn declare(
        &mut self,
        key: &str,
        iri: &NamedNode,
        classes: &[NamedNodeRef<'_>],
        label: Option<&str>,
    ) -> Result<bool, MappingError> {
        if self.entities.contains_key(key) {
            return Ok(false);
        }
        if let Some(existing) = self.key_by_iri.get(iri) {
            return Err(MappingError::DuplicateIdentifier {
                iri: iri.as_str().to_string(),
                existing: existing.clone(),
                key: key.to_string(),
            });
        }

        for class in classes {
            self.add(iri, rdf::TYPE, class.into_owned());
        }
        if let Some(label) = label {
            self.add(iri, crate::ontology::vocab::rdfs::LABEL, text_en(label));
        }

        self.key_by_iri.insert(iri.clone(), key.to_string());
        self.entities.insert(
            key.to_string(),
            Entity {
                iri: iri.clone(),
                classes: classes.iter().map(|c| c.into_owned()).collect(),
            },
        );
        Ok(true)
    }

    /// Assert one triple into the current partition. Returns `false` when the
    /// graph already held it.
    pub fn add(
        &mut self,
        subject: &NamedNode,
        predicate: NamedNodeRef<'_>,
        object: impl Into<Term>,
    ) -> bool {
        let triple = Triple::new(subject.clone(), predicate.into_owned(), object.into());
        if self.asserted.contains(&triple) {
            return false;
        }
        self.asserted.insert(triple.clone());
        self.partitions[self.current].triples.push(triple);
        true
    }

    /// Assert an edge between two resources.
    pub fn link(
        &mut self,
        subject: &NamedNode,
        predicate: NamedNodeRef<'_>,
        object: impl Into<NamedNode>,
    ) -> bool {
        self.add(subject, predicate, Term::NamedNode(object.into()))
    }

    pub fn entity(&self, key: &str) -> Option<&Entity> {
        self.entities.get(key)
    }

    pub fn entity_by_iri(&self, iri: &NamedNode) -> Option<&Entity> {
        self.key_by_iri.get(iri).and_then(|k| self.entities.get(k))
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Next value of a named counter, starting at 0.
    pub fn next_sequence(&mut self, counter: &str) -> usize {
        let slot = self.sequences.entry(counter.to_string()).or_insert(0);
        let n = *slot;
        *slot += 1;
        n
    }

    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    pub fn triples(&self) -> impl Iterator<Item = &Triple> {
        self.partitions.iter().flat_map(|p| p.triples.iter())
    }

    /// Number of registered entities per class IRI.
    pub fn class_counts(&self) -> BTreeMap<String, usize> {
        let mut out = BTreeMap::new();
        for entity in self.entities.values() {
            for class in &entity.classes {
                *out.entry(class.as_str().to_string()).or_default() += 1;
            }
        }
        out
    }
}

/// Fixed-point `xsd:decimal` literal.
pub fn decimal(value: f64, places: usize) -> Literal {
    Literal::new_typed_literal(format!("{:.*}", places, value), xsd::DECIMAL)
}

pub fn integer(value: i64) -> Literal {
    Literal::new_typed_literal(value.to_string(), xsd::INTEGER)
}

pub fn text_en(value: &str) -> Literal {
    Literal::new_language_tagged_literal_unchecked(value, "en")
}

pub fn plain(value: &str) -> Literal {
    Literal::new_simple_literal(value)
}

pub fn date(value: chrono::NaiveDate) -> Literal {
    Literal::new_typed_literal(value.format("%Y-%m-%d").to_string(), xsd::DATE)
}

pub fn g_year(year: i32) -> Literal {
    Literal::new_typed_literal(year.to_string(), xsd::G_YEAR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::vocab::{geolod, rdfs};
    use pretty_assertions::assert_eq;

    fn node(local: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("{}{}", geolod::NS, local))
    }

    #[test]
    fn declares_entities_once() {
        let mut g = GraphBuilder::new("meta");
        let site = node("Site");
        assert_eq!(
            g.declare("site", &site, &[geolod::CAVE], Some("A cave")),
            Ok(true)
        );
        assert_eq!(
            g.declare("site", &site, &[geolod::CAVE], Some("A cave")),
            Ok(false)
        );
        // type + label
        assert_eq!(g.triples().count(), 2);
        assert_eq!(g.class_counts()[geolod::CAVE.as_str()], 1);
    }

    #[test]
    fn rejects_iri_reuse_under_another_key() {
        let mut g = GraphBuilder::new("meta");
        let iri = node("Cave_site_0144");
        g.declare("site/144", &iri, &[geolod::CAVE], None).unwrap();
        let err = g.declare("site/0144", &iri, &[geolod::CAVE], None).unwrap_err();
        assert_eq!(
            err,
            MappingError::DuplicateIdentifier {
                iri: iri.as_str().to_string(),
                existing: "site/144".to_string(),
                key: "site/0144".to_string(),
            }
        );
    }

    #[test]
    fn partitions_are_disjoint() {
        let mut g = GraphBuilder::new("meta");
        let a = node("A");
        assert!(g.add(&a, rdfs::LABEL, text_en("a")));
        g.begin_partition("data");
        assert!(!g.add(&a, rdfs::LABEL, text_en("a")));
        assert!(g.add(&a, rdfs::COMMENT, text_en("c")));
        g.begin_partition("meta");
        assert!(g.add(&a, rdfs::COMMENT, text_en("d")));

        let sizes: Vec<usize> = g.partitions().iter().map(|p| p.triples.len()).collect();
        assert_eq!(sizes, vec![2, 1]);
        assert_eq!(g.triples().count(), 3);
    }

    #[test]
    fn sequences_are_independent_per_counter() {
        let mut g = GraphBuilder::new("p");
        assert_eq!(g.next_sequence("CH4_EPICA"), 0);
        assert_eq!(g.next_sequence("CH4_EPICA"), 1);
        assert_eq!(g.next_sequence("d18O_EPICA"), 0);
    }

    #[test]
    fn formats_literals() {
        assert_eq!(decimal(1.23456, 2).value(), "1.23");
        assert_eq!(decimal(-75.1, 6).value(), "-75.100000");
        assert_eq!(integer(11).datatype(), xsd::INTEGER);
        assert_eq!(g_year(2006).value(), "2006");
    }
}
