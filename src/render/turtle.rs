use crate::Result;
use crate::graph::GraphBuilder;
use crate::ontology::vocab::PREFIXES;
use anyhow::Context;
use oxrdf::Triple;
use oxttl::TurtleSerializer;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// A Turtle file written by this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub triples: usize,
}

/// Write `triples` to `path`, replacing any previous content.
pub fn write_turtle<'a>(
    path: &Path,
    triples: impl IntoIterator<Item = &'a Triple>,
) -> Result<WrittenFile> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;

    let mut serializer = TurtleSerializer::new();
    for (name, iri) in PREFIXES {
        serializer = serializer
            .with_prefix(*name, *iri)
            .with_context(|| format!("invalid IRI for prefix {name}: {iri}"))?;
    }
    let mut writer = serializer.for_writer(BufWriter::new(file));

    let mut count = 0;
    for triple in triples {
        writer
            .serialize_triple(triple)
            .with_context(|| format!("write {}", path.display()))?;
        count += 1;
    }
    writer
        .finish()
        .and_then(|mut w| w.flush())
        .with_context(|| format!("finish {}", path.display()))?;

    info!(path = %path.display(), triples = count, "wrote turtle");
    Ok(WrittenFile {
        path: path.to_path_buf(),
        triples: count,
    })
}

/// One file per partition plus `<combined>.ttl` holding all of them.
pub fn write_dataset(dir: &Path, combined: &str, graph: &GraphBuilder) -> Result<Vec<WrittenFile>> {
    let mut written = Vec::new();
    for partition in graph.partitions() {
        let path = dir.join(format!("{}.ttl", partition.name));
        written.push(write_turtle(&path, &partition.triples)?);
    }
    let path = dir.join(format!("{combined}.ttl"));
    written.push(write_turtle(&path, graph.triples())?);
    Ok(written)
}

#[cfg(test)]
pub(crate) fn count_triples(path: &Path) -> usize {
    let file = File::open(path).unwrap();
    oxttl::TurtleParser::new()
        .for_reader(file)
        .map(|t| t.unwrap())
        .count()
}
