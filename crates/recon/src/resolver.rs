//! Boundary with the entity-resolution engine.
//!
//! Reconciliation only needs the engine's output: clusters for one dataset,
//! matched pairs for two. Engines plug in through [`Deduplicator`] and
//! [`Linker`], or hand over a [`ResolutionFile`] produced out of process.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ReconError, Result};
use crate::model::{ClusterAssignment, MatchedPair, NormalizedRecord, RecordId, ScoredPair};
use crate::store::RecordStore;

pub trait Deduplicator {
    /// Group the records of one dataset into clusters of duplicates.
    fn cluster(&self, store: &RecordStore) -> Result<Vec<ClusterAssignment>>;
}

pub trait Linker {
    /// Pair records of `left` with the records of `right` they denote.
    fn link(&self, left: &RecordStore, right: &RecordStore) -> Result<Vec<ScoredPair>>;
}

// ---------------------------------------------------------------------------
// Exact-key baseline
// ---------------------------------------------------------------------------

/// Treats records as the same entity when every selected field has the same
/// normalized value. Records whose selected fields are all empty never match.
#[derive(Debug, Clone)]
pub struct ExactKeyResolver {
    fields: Vec<String>,
}

impl ExactKeyResolver {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    fn key<'a>(&self, record: &'a NormalizedRecord) -> Option<Vec<&'a str>> {
        let key: Vec<&str> = self
            .fields
            .iter()
            .map(|f| record.get(f).unwrap_or(""))
            .collect();
        if key.iter().all(|v| v.is_empty()) {
            None
        } else {
            Some(key)
        }
    }
}

impl Deduplicator for ExactKeyResolver {
    fn cluster(&self, store: &RecordStore) -> Result<Vec<ClusterAssignment>> {
        // Key -> members, remembering the first row so clusters come out in
        // row order.
        let mut groups: HashMap<Vec<&str>, Vec<RecordId>> = HashMap::new();
        let mut order: BTreeMap<usize, Vec<&str>> = BTreeMap::new();

        for (id, record) in store.iter() {
            let Some(key) = self.key(record) else { continue };
            let members = groups.entry(key.clone()).or_default();
            if members.is_empty() {
                order.insert(id.index(), key);
            }
            members.push(id);
        }

        let clusters: Vec<ClusterAssignment> = order
            .values()
            .filter_map(|key| groups.remove(key))
            .filter(|members| members.len() > 1)
            .map(ClusterAssignment::certain)
            .collect();

        info!(clusters = clusters.len(), "exact-key clustering done");
        Ok(clusters)
    }
}

impl Linker for ExactKeyResolver {
    fn link(&self, left: &RecordStore, right: &RecordStore) -> Result<Vec<ScoredPair>> {
        let mut candidates: HashMap<Vec<&str>, VecDeque<RecordId>> = HashMap::new();
        for (id, record) in right.iter() {
            if let Some(key) = self.key(record) {
                candidates.entry(key).or_default().push_back(id);
            }
        }

        let mut pairs = Vec::new();
        for (id, record) in left.iter() {
            let Some(key) = self.key(record) else { continue };
            if let Some(right_id) = candidates.get_mut(&key).and_then(VecDeque::pop_front) {
                debug!(left = %id, right = %right_id, "exact-key match");
                pairs.push(ScoredPair {
                    pair: MatchedPair { left: id, right: right_id },
                    score: 1.0,
                });
            }
        }

        info!(pairs = pairs.len(), "exact-key linking done");
        Ok(pairs)
    }
}

// ---------------------------------------------------------------------------
// Resolution-result file
// ---------------------------------------------------------------------------

/// Engine output exchanged as JSON.
///
/// ```json
/// {"clusters": [{"members": [0, 2], "scores": [0.9, 0.8]}]}
/// {"pairs": [{"left": "input_1|0", "right": "input_2|1", "score": 0.7}]}
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolutionFile {
    #[serde(default)]
    pub clusters: Vec<ClusterAssignment>,
    #[serde(default)]
    pub pairs: Vec<ScoredPair>,
}

impl ResolutionFile {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ReconError::ResolutionFile(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| ReconError::io(path, e))?;
        Self::from_json(&json).map_err(|e| match e {
            ReconError::ResolutionFile(msg) => {
                ReconError::ResolutionFile(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    pub fn matched_pairs(&self) -> Vec<MatchedPair> {
        self.pairs.iter().map(|p| p.pair).collect()
    }

    /// Clusters for single-file reconciliation. A file carrying pairs was
    /// produced for linking and is rejected.
    pub fn into_clusters(self, label: &str) -> Result<Vec<ClusterAssignment>> {
        if !self.pairs.is_empty() {
            return Err(ReconError::malformed(
                label,
                format!("holds {} matched pairs; expected clusters", self.pairs.len()),
            ));
        }
        Ok(self.clusters)
    }

    /// Pairs for linking. A file carrying clusters was produced for
    /// single-file reconciliation and is rejected.
    pub fn into_matched_pairs(self, label: &str) -> Result<Vec<MatchedPair>> {
        if !self.clusters.is_empty() {
            return Err(ReconError::malformed(
                label,
                format!("holds {} clusters; expected matched pairs", self.clusters.len()),
            ));
        }
        Ok(self.matched_pairs())
    }
}
