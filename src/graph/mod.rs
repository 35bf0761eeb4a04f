//! Entity mapping: records and site metadata in, typed RDF graph out.

pub mod builder;
pub mod entity;
pub mod mapper;

pub use builder::GraphBuilder;
pub use entity::{Dataset, Quantity, SiteMeta};
pub use mapper::{DataSourceMeta, Mapper, MappingStats, ObservationRecord};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("no site metadata for site key `{0}`")]
    UnknownSite(String),
    #[error("{role} `{key}` is referenced before it was declared")]
    UnknownEntity { role: &'static str, key: String },
    #[error("line {line}: row belongs to site `{found}`, not to `{expected}`")]
    SiteMismatch {
        line: usize,
        expected: String,
        found: String,
    },
    #[error("IRI <{iri}> already identifies `{existing}` and cannot be reused for `{key}`")]
    DuplicateIdentifier {
        iri: String,
        existing: String,
        key: String,
    },
}
