pub mod ko;
pub mod languages;
pub mod level;
pub mod location;
pub mod pipeline;
pub mod prefilter;
pub mod responsibilities;
pub mod salary;
pub mod scoring;
pub mod skills;
pub mod weights;

pub use pipeline::{
    batch_match, compute_match, BatchEntry, BatchOptions, CandidateEntry, MatchingEngine,
    RankedVacancy,
};
pub use prefilter::{is_candidate_pool, PreFilter, PreFilterConfig};
pub use scoring::{aggregate, DimensionScores, MatchQuality, MatchResult, MatchingConfig};
