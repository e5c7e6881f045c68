//! Single-dataset reconciliation: map clusters back onto the original rows.

use std::collections::HashSet;

use tracing::info;

use crate::allocator::IdAllocator;
use crate::error::Result;
use crate::membership::{Membership, MembershipIndex};
use crate::model::{ClusterAssignment, RawRow, Table};
use crate::store::parse_table;

pub const CLUSTER_ID_HEADER: &str = "Cluster ID";
pub const CONFIDENCE_HEADER: &str = "Confidence Score";

/// Score written for rows that belong to no cluster.
const SINGLETON_SCORE: f64 = 1.0;

fn prefixed(prefix: &[String], row: &[String]) -> RawRow {
    prefix.iter().chain(row).cloned().collect()
}

/// Every original row, in original order, prefixed with its cluster id and
/// confidence score. Rows outside any cluster get a fresh id past the last
/// cluster and a score of 1.
pub fn reconcile_all(clusters: &[ClusterAssignment], input: &str) -> Result<Table> {
    let table = parse_table(input, "input")?;
    let index = MembershipIndex::build(clusters, table.rows.len())?;
    let mut fresh = IdAllocator::after(index.max_cluster_id());

    let header = prefixed(
        &[CLUSTER_ID_HEADER.to_string(), CONFIDENCE_HEADER.to_string()],
        &table.header,
    );

    let rows = table
        .rows
        .iter()
        .enumerate()
        .map(|(row_id, row)| {
            let Membership { cluster, score } = index.get(row_id).unwrap_or_else(|| Membership {
                cluster: fresh.next_id(),
                score: SINGLETON_SCORE,
            });
            prefixed(&[cluster.to_string(), score.to_string()], row)
        })
        .collect::<Vec<_>>();

    info!(
        rows = rows.len(),
        clusters = clusters.len(),
        singletons = rows.len() - index.len(),
        "reconciled full output"
    );

    Ok(Table { header, rows })
}

/// One representative row per cluster: the first row of each cluster in
/// original order. Rows outside any cluster are always kept, each with a
/// fresh id.
pub fn reconcile_unique(clusters: &[ClusterAssignment], input: &str) -> Result<Table> {
    let table = parse_table(input, "input")?;
    let index = MembershipIndex::build(clusters, table.rows.len())?;
    let mut fresh = IdAllocator::after(index.max_cluster_id());

    let header = prefixed(&[CLUSTER_ID_HEADER.to_string()], &table.header);

    let mut seen = HashSet::new();
    let mut rows: Vec<RawRow> = Vec::new();
    let mut suppressed = 0usize;

    for (row_id, row) in table.rows.iter().enumerate() {
        match index.get(row_id) {
            Some(Membership { cluster, .. }) => {
                if seen.insert(cluster) {
                    rows.push(prefixed(&[cluster.to_string()], row));
                } else {
                    suppressed += 1;
                }
            }
            None => rows.push(prefixed(&[fresh.next_id().to_string()], row)),
        }
    }

    info!(rows = rows.len(), suppressed, "reconciled unique output");

    Ok(Table { header, rows })
}
