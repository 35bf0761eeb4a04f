use crate::Result;
use crate::source::row::{IceCoreRow, Reading};
use anyhow::{Context, bail};
use regex::Regex;
use std::fs;
use std::path::Path;

/// Column positions (0-based) of the fields we read from a PANGAEA table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabColumns {
    pub depth: usize,
    pub age: usize,
    pub value: usize,
}

impl TabColumns {
    /// EDC_CH4.tab: depth, depth ref, age EDC1, age EDC2, CH4, CH4 std dev.
    /// The EDC2 gas age is used.
    pub const EDC_CH4: TabColumns = TabColumns {
        depth: 0,
        age: 3,
        value: 4,
    };

    /// EPICA_Dome_C_d18O.tab: depth, gas age (AICC2023), d18O.
    pub const EDC_D18O: TabColumns = TabColumns {
        depth: 0,
        age: 1,
        value: 2,
    };
}

/// Parse a PANGAEA `.tab` file into ice-core rows.
///
/// Layout:
/// /* DATA DESCRIPTION: ...
/// ... */
/// Depth ice/snow [m]<TAB>Gas age [ka BP]<TAB>...
/// 102.55<TAB>1.231<TAB>...
pub fn parse_tab_file(path: &Path, columns: TabColumns) -> Result<Vec<IceCoreRow>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read tab file {}", path.display()))?;
    parse_tab_str(&text, columns).with_context(|| format!("parse tab file {}", path.display()))
}

pub fn parse_tab_str(text: &str, columns: TabColumns) -> Result<Vec<IceCoreRow>> {
    // The column header is the first line after the metadata block that
    // starts with a letter. Later lines are data even when they start with
    // `NaN` or `n.d.`.
    let header_re = Regex::new(r"^\s*[A-Za-z]")?;

    // Files without a metadata block start straight at the header.
    let mut in_block = text.trim_start().starts_with("/*");
    let mut saw_block_end = !in_block;
    let mut saw_header = false;

    let mut out = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let lno = lineno + 1;

        if in_block {
            if line.trim_start().starts_with("*/") {
                in_block = false;
                saw_block_end = true;
            }
            continue;
        }

        if line.trim().is_empty() {
            continue;
        }
        if !saw_header {
            saw_header = true;
            if header_re.is_match(line) {
                continue;
            }
        }

        let cells: Vec<&str> = if line.contains('\t') {
            line.split('\t').collect()
        } else {
            line.split_whitespace().collect()
        };

        out.push(IceCoreRow {
            line: lno,
            depth_m: Reading::parse(cells.get(columns.depth).copied()),
            age_ka: Reading::parse(cells.get(columns.age).copied()),
            value: Reading::parse(cells.get(columns.value).copied()),
        });
    }

    if !saw_block_end {
        bail!("unterminated /* ... */ metadata block");
    }

    Ok(out)
}
