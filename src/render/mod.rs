//! Output writers: Turtle graphs, Mermaid diagrams and SVG charts.

pub mod mermaid;
pub mod svg;
pub mod turtle;

pub use turtle::{WrittenFile, write_dataset, write_turtle};
