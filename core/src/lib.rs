//! Keyword selection by particle swarm optimization.
//!
//! A candidate keyword subset is encoded as a point in `[0, M]^D`: every
//! coordinate rounds to a [`Codebook`] index, index 0 meaning "no keyword".
//! The [`Swarm`] minimizes the irrelevance/collectibility score of the decoded
//! keywords against a [`CorpusStore`], subject to the [`UniquenessConstraint`].

pub mod codebook;
pub mod config;
pub mod constraint;
pub mod corpus;
pub mod error;
pub mod fitness;
pub mod normalize;
pub mod persist;
pub mod selection;
pub mod swarm;

pub use codebook::{Codebook, KeywordSet, EMPTY_SLOT};
pub use config::{FitnessConfig, KeywordLists, SelectorConfig, SwarmConfig};
pub use constraint::{feasibility_margin, Constraint, UniquenessConstraint};
pub use corpus::{CorpusStore, Label, MatchScope, RawRecord, Record};
pub use error::{KeyswarmError, Result};
pub use fitness::{score, score_with, KeywordScorer, KeywordStats, Polarity};
pub use selection::{CorpusCounts, KeywordHits, KeywordObjective, KeywordSelector, SelectionReport};
pub use swarm::{Bounds, Objective, Particle, StopFlag, StopReason, Swarm, SwarmOutcome};
