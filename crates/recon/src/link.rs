//! Two-dataset reconciliation: join matched rows side by side.

use std::collections::HashSet;

use tracing::info;

use crate::error::{ReconError, Result};
use crate::model::{DatasetTag, MatchedPair, RawRow, RecordId, Table};
use crate::store::parse_table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinMode {
    /// Matched rows, then every unmatched row of either side, padded.
    #[default]
    Outer,
    /// Matched rows only.
    Inner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkSummary {
    pub matched: usize,
    pub left_only: usize,
    pub right_only: usize,
}

/// Resolve one side of a pair to a row position, checking its tag and range.
fn resolve(id: &RecordId, side: DatasetTag, len: usize) -> Result<usize> {
    if let Some(tag) = id.tag() {
        if tag != side {
            return Err(ReconError::malformed(
                "matches",
                format!("record '{id}' was given as the {side} side of a pair"),
            ));
        }
    }
    let index = id.index();
    if index >= len {
        return Err(ReconError::DanglingReference {
            side: side.to_string(),
            index,
            len,
        });
    }
    Ok(index)
}

fn blanks(n: usize) -> impl Iterator<Item = String> {
    std::iter::repeat_with(String::new).take(n)
}

/// Merge matched rows of two tables. See [`JoinMode`] for which unmatched
/// rows are kept.
pub fn reconcile_linked(
    pairs: &[MatchedPair],
    input_1: &str,
    input_2: &str,
    join: JoinMode,
) -> Result<Table> {
    let (table, summary) = reconcile_linked_with_summary(pairs, input_1, input_2, join)?;
    info!(
        matched = summary.matched,
        left_only = summary.left_only,
        right_only = summary.right_only,
        ?join,
        "reconciled linked output"
    );
    Ok(table)
}

pub fn reconcile_linked_with_summary(
    pairs: &[MatchedPair],
    input_1: &str,
    input_2: &str,
    join: JoinMode,
) -> Result<(Table, LinkSummary)> {
    let left = parse_table(input_1, DatasetTag::Input1.as_str())?;
    let right = parse_table(input_2, DatasetTag::Input2.as_str())?;
    let left_width = left.width();
    let right_width = right.width();

    let header: RawRow = left.header.iter().chain(&right.header).cloned().collect();

    let mut seen_left = HashSet::new();
    let mut seen_right = HashSet::new();
    let mut rows: Vec<RawRow> = Vec::with_capacity(pairs.len());

    for pair in pairs {
        let l = resolve(&pair.left, DatasetTag::Input1, left.rows.len())?;
        let r = resolve(&pair.right, DatasetTag::Input2, right.rows.len())?;
        rows.push(left.rows[l].iter().chain(&right.rows[r]).cloned().collect());
        seen_left.insert(l);
        seen_right.insert(r);
    }

    let mut summary = LinkSummary {
        matched: rows.len(),
        ..LinkSummary::default()
    };

    if join == JoinMode::Outer {
        for (i, row) in left.rows.iter().enumerate() {
            if !seen_left.contains(&i) {
                rows.push(row.iter().cloned().chain(blanks(right_width)).collect());
                summary.left_only += 1;
            }
        }
        for (i, row) in right.rows.iter().enumerate() {
            if !seen_right.contains(&i) {
                rows.push(blanks(left_width).chain(row.iter().cloned()).collect());
                summary.right_only += 1;
            }
        }
    }

    Ok((Table { header, rows }, summary))
}
