use std::collections::HashMap;

use crate::error::{ReconError, Result};
use crate::model::{ClusterAssignment, ClusterId, RecordId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Membership {
    pub cluster: ClusterId,
    pub score: f64,
}

/// Row position -> cluster membership for one single-dataset reconciliation.
#[derive(Debug, Default)]
pub struct MembershipIndex {
    by_row: HashMap<usize, Membership>,
    max_cluster: Option<ClusterId>,
}

impl MembershipIndex {
    /// Cluster `i` of `clusters` gets `ClusterId(i)`. Every member must
    /// address one of the `row_count` data rows. A row listed in several
    /// clusters keeps its last assignment.
    pub fn build(clusters: &[ClusterAssignment], row_count: usize) -> Result<Self> {
        let mut by_row = HashMap::new();

        for (position, cluster) in clusters.iter().enumerate() {
            let cluster_id = ClusterId(position as u64);
            for (member, score) in cluster.iter() {
                let index = plain_index(member)?;
                if index >= row_count {
                    return Err(ReconError::DanglingReference {
                        side: "input".into(),
                        index,
                        len: row_count,
                    });
                }
                by_row.insert(
                    index,
                    Membership {
                        cluster: cluster_id,
                        score,
                    },
                );
            }
        }

        let max_cluster = clusters.len().checked_sub(1).map(|n| ClusterId(n as u64));
        Ok(Self { by_row, max_cluster })
    }

    pub fn get(&self, row: usize) -> Option<Membership> {
        self.by_row.get(&row).copied()
    }

    /// Highest cluster id assigned to a real cluster.
    pub fn max_cluster_id(&self) -> Option<ClusterId> {
        self.max_cluster
    }

    pub fn len(&self) -> usize {
        self.by_row.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_row.is_empty()
    }
}

fn plain_index(id: &RecordId) -> Result<usize> {
    match id {
        RecordId::Plain(index) => Ok(*index),
        RecordId::Tagged { .. } => Err(ReconError::malformed(
            "clusters",
            format!("record id '{id}' carries a dataset tag; single-dataset clusters use plain ids"),
        )),
    }
}
