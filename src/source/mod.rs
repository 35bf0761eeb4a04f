//! Input readers for PANGAEA ice-core tables and SISAL speleothem exports.

pub mod row;
pub mod sisal;
pub mod tab;

pub use row::{AgeUnit, IceCoreRow, Reading, SkipCounts, SkipReason, SpeleothemRow};
pub use sisal::{SampleTable, SiteRecord, read_samples_file, read_sites_file};
pub use tab::{TabColumns, parse_tab_file};
