//! Mermaid flowcharts: the class taxonomy and per-dataset instance graphs.

use crate::graph::GraphBuilder;
use crate::ontology::schema::{self, Module};
use crate::ontology::vocab::compact;
use oxrdf::vocab::rdf;
use oxrdf::{Subject, Term};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

/// Mermaid node id for an IRI.
fn node_id(iri: &str) -> String {
    compact(iri)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn escape(label: &str) -> String {
    label.replace('"', "#quot;")
}

/// Class hierarchy grouped by module and group.
pub fn taxonomy() -> String {
    let mut out = String::from("flowchart BT\n");
    for module in [Module::External, Module::Core, Module::Epica, Module::Sisal] {
        let module_id = format!("M_{}", module.file_stem());
        let _ = writeln!(out, "    subgraph {}[\"{}\"]", module_id, escape(module.title()));

        let mut groups: BTreeMap<&str, Vec<&schema::ClassDef>> = BTreeMap::new();
        for class in schema::classes_in(module) {
            groups.entry(class.group).or_default().push(class);
        }
        for (group, classes) in groups {
            let group_id = format!("{}_{}", module_id, node_id(group));
            let _ = writeln!(out, "        subgraph {}[\"{}\"]", group_id, escape(group));
            for class in classes {
                let _ = writeln!(
                    out,
                    "            {}[\"{}\"]",
                    node_id(class.iri.as_str()),
                    escape(&compact(class.iri.as_str()))
                );
            }
            out.push_str("        end\n");
        }
        out.push_str("    end\n");
    }
    for class in schema::CLASSES {
        for parent in class.parents {
            let _ = writeln!(
                out,
                "    {} -->|subClassOf| {}",
                node_id(class.iri.as_str()),
                node_id(parent.as_str())
            );
        }
    }
    out
}

struct ClassNode {
    first: String,
    count: usize,
}

/// One node per entity class present in `graph`, one edge per
/// (source class, predicate, target class) combination.
pub fn instance_diagram(title: &str, graph: &GraphBuilder) -> String {
    let mut nodes: BTreeMap<String, ClassNode> = BTreeMap::new();
    for entity in graph.entities() {
        let Some(class) = entity.primary_class() else {
            continue;
        };
        nodes
            .entry(class.as_str().to_string())
            .and_modify(|n| n.count += 1)
            .or_insert_with(|| ClassNode {
                first: entity.iri.as_str().to_string(),
                count: 1,
            });
    }

    let mut edges: BTreeSet<(String, String, String)> = BTreeSet::new();
    for triple in graph.triples() {
        if triple.predicate == rdf::TYPE {
            continue;
        }
        let (Subject::NamedNode(s), Term::NamedNode(o)) = (&triple.subject, &triple.object) else {
            continue;
        };
        let source = graph.entity_by_iri(s).and_then(|e| e.primary_class());
        let target = graph.entity_by_iri(o).and_then(|e| e.primary_class());
        if let (Some(source), Some(target)) = (source, target) {
            edges.insert((
                source.as_str().to_string(),
                triple.predicate.as_str().to_string(),
                target.as_str().to_string(),
            ));
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "---\ntitle: {}\n---", title);
    out.push_str("flowchart LR\n");
    for (class, node) in &nodes {
        let _ = writeln!(
            out,
            "    {}[\"{}<br/>e.g. {}<br/>n = {}\"]",
            node_id(class),
            escape(&compact(class)),
            escape(&compact(&node.first)),
            node.count
        );
    }
    for (source, predicate, target) in &edges {
        let _ = writeln!(
            out,
            "    {} -->|\"{}\"| {}",
            node_id(source),
            escape(&compact(predicate)),
            node_id(target)
        );
    }
    out
}
