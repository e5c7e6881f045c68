use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Which side of a two-dataset link a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DatasetTag {
    Input1,
    Input2,
}

impl DatasetTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input1 => "input_1",
            Self::Input2 => "input_2",
        }
    }
}

impl fmt::Display for DatasetTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetTag {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "input_1" => Ok(Self::Input1),
            "input_2" => Ok(Self::Input2),
            other => Err(ReconError::ResolutionFile(format!(
                "unknown dataset tag '{other}' (expected input_1 or input_2)"
            ))),
        }
    }
}

/// Row identifier. A row is addressed by its 0-based position among the data
/// rows of its table; linked datasets additionally carry the side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordId {
    Plain(usize),
    Tagged { tag: DatasetTag, index: usize },
}

impl RecordId {
    pub fn new(index: usize, tag: Option<DatasetTag>) -> Self {
        match tag {
            Some(tag) => Self::Tagged { tag, index },
            None => Self::Plain(index),
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Plain(index) | Self::Tagged { index, .. } => *index,
        }
    }

    pub fn tag(&self) -> Option<DatasetTag> {
        match self {
            Self::Plain(_) => None,
            Self::Tagged { tag, .. } => Some(*tag),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(index) => write!(f, "{index}"),
            Self::Tagged { tag, index } => write!(f, "{tag}|{index}"),
        }
    }
}

impl FromStr for RecordId {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_index = |raw: &str| {
            raw.trim()
                .parse::<usize>()
                .map_err(|_| ReconError::ResolutionFile(format!("invalid record id '{s}'")))
        };
        match s.split_once('|') {
            Some((tag, index)) => Ok(Self::Tagged {
                tag: tag.trim().parse()?,
                index: parse_index(index)?,
            }),
            None => Ok(Self::Plain(parse_index(s)?)),
        }
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Plain(index) => serializer.serialize_u64(*index as u64),
            Self::Tagged { .. } => serializer.collect_str(self),
        }
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Index(usize),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Index(index) => Ok(Self::Plain(index)),
            Repr::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Cluster identifier assigned during reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ClusterId(pub u64);

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One data row as read from the source, in original column order.
pub type RawRow = Vec<String>;

/// Field name -> normalized value. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct NormalizedRecord(BTreeMap<String, String>);

impl NormalizedRecord {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rename fields, returning a new record. Fields not named in `renames`
    /// are dropped.
    pub fn project(&self, renames: &[(&str, &str)]) -> Self {
        renames
            .iter()
            .filter_map(|(from, to)| self.0.get(*from).map(|v| (to.to_string(), v.clone())))
            .collect()
    }
}

impl FromIterator<(String, String)> for NormalizedRecord {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Resolution results (produced by the resolver, consumed by reconcilers)
// ---------------------------------------------------------------------------

/// Records believed to denote one entity, with a parallel confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCluster")]
pub struct ClusterAssignment {
    members: Vec<RecordId>,
    scores: Vec<f64>,
}

#[derive(Deserialize)]
struct RawCluster {
    members: Vec<RecordId>,
    scores: Vec<f64>,
}

impl TryFrom<RawCluster> for ClusterAssignment {
    type Error = ReconError;

    fn try_from(raw: RawCluster) -> Result<Self, Self::Error> {
        Self::new(raw.members, raw.scores)
    }
}

impl ClusterAssignment {
    pub fn new(members: Vec<RecordId>, scores: Vec<f64>) -> Result<Self, ReconError> {
        if members.len() != scores.len() {
            return Err(ReconError::malformed(
                "cluster",
                format!(
                    "{} members but {} scores",
                    members.len(),
                    scores.len()
                ),
            ));
        }
        Ok(Self { members, scores })
    }

    /// Cluster with every member scored 1.
    pub fn certain(members: Vec<RecordId>) -> Self {
        let scores = vec![1.0; members.len()];
        Self { members, scores }
    }

    pub fn members(&self) -> &[RecordId] {
        &self.members
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RecordId, f64)> {
        self.members.iter().zip(self.scores.iter().copied())
    }
}

/// One record from each side believed to denote the same entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchedPair {
    pub left: RecordId,
    pub right: RecordId,
}

/// A matched pair with the resolver's confidence. The score is carried for
/// logging only; linked output ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredPair {
    #[serde(flatten)]
    pub pair: MatchedPair,
    #[serde(default = "default_score")]
    pub score: f64,
}

fn default_score() -> f64 {
    1.0
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A fully materialized CSV table: header plus data rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub header: RawRow,
    pub rows: Vec<RawRow>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.header.len()
    }
}
