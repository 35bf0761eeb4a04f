//! The geo-lod ontology: namespaces, the class/property table and its OWL
//! rendering.

pub mod export;
pub mod schema;
pub mod vocab;

pub use export::build_module;
pub use schema::Module;
