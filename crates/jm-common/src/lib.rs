pub mod currency;
pub mod error;
pub mod logging;
pub mod matching;
pub mod normalize;
pub mod run_id;
pub mod schema;
pub mod store;

pub use error::{BatchError, ConfigError, MatchError, StoreError};
pub use matching::{
    batch_match, compute_match, is_candidate_pool, BatchEntry, BatchOptions, CandidateEntry,
    MatchQuality, MatchResult, MatchingConfig, MatchingEngine,
};
pub use schema::{CandidateProfile, VacancyRecord};
pub use store::{InMemoryMatchStore, MatchStore};
