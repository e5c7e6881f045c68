//! `csvdedupe-recon` - maps entity-resolution results back onto CSV rows.
//!
//! Pure engine crate: ingests CSV text into position-addressed records,
//! takes clusters or matched pairs from a resolver, and builds the
//! reconciled output table. No CLI dependencies.

pub mod allocator;
pub mod dedupe;
pub mod error;
pub mod link;
pub mod membership;
pub mod model;
pub mod normalize;
pub mod output;
pub mod resolver;
pub mod store;

pub use dedupe::{reconcile_all, reconcile_unique};
pub use error::{ReconError, Result};
pub use link::{reconcile_linked, JoinMode};
pub use model::{ClusterAssignment, ClusterId, DatasetTag, MatchedPair, RecordId, ScoredPair, Table};
pub use resolver::{Deduplicator, ExactKeyResolver, Linker, ResolutionFile};
pub use store::{ingest, read_source, RecordStore};
