use serde::Serialize;
use std::collections::BTreeMap;

/// One numeric cell as read from an input file.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    Value(f64),
    Missing,
    /// Present but not a finite number; keeps the raw text for diagnostics.
    Malformed(String),
}

impl Reading {
    /// Parse a raw cell. Empty cells and the usual NA spellings count as missing.
    pub fn parse(cell: Option<&str>) -> Self {
        let raw = match cell.map(str::trim) {
            None | Some("") => return Reading::Missing,
            Some(raw) => raw,
        };
        if raw.eq_ignore_ascii_case("na") || raw.eq_ignore_ascii_case("nan") {
            return Reading::Missing;
        }
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Reading::Value(v),
            _ => Reading::Malformed(raw.to_string()),
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Reading::Value(v) => Some(*v),
            _ => None,
        }
    }
}

/// Unit an age column is declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeUnit {
    /// Thousands of years before present.
    KaBp,
    /// Years before present (1950).
    YearsBp,
}

impl AgeUnit {
    pub fn to_ka(self, age: f64) -> f64 {
        match self {
            AgeUnit::KaBp => age,
            AgeUnit::YearsBp => age / 1000.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            AgeUnit::KaBp => "ka BP",
            AgeUnit::YearsBp => "a BP",
        }
    }
}

/// A data row from a PANGAEA ice-core table.
#[derive(Debug, Clone, PartialEq)]
pub struct IceCoreRow {
    pub line: usize,
    pub depth_m: Reading,
    pub age_ka: Reading,
    pub value: Reading,
}

/// A data row from a SISAL per-site isotope export.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeleothemRow {
    pub line: usize,
    pub site_id: u32,
    pub site_name: String,
    pub entity_id: u32,
    pub entity_name: String,
    pub sample_id: Option<u64>,
    pub age_bp: Reading,
    pub d18o: Reading,
    pub d13c: Reading,
}

/// Why a row was left out of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingAge,
    MissingValue,
    Malformed,
    /// The quantity has no value in any row of its file.
    EmptySeries,
}

/// Skipped-row counters of one quantity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SkipCounts(BTreeMap<SkipReason, usize>);

impl SkipCounts {
    pub fn record(&mut self, reason: SkipReason) {
        self.add(reason, 1);
    }

    pub fn add(&mut self, reason: SkipReason, n: usize) {
        if n > 0 {
            *self.0.entry(reason).or_default() += n;
        }
    }

    pub fn get(&self, reason: SkipReason) -> usize {
        self.0.get(&reason).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn merge(&mut self, other: &SkipCounts) {
        for (reason, n) in &other.0 {
            self.add(*reason, *n);
        }
    }
}
