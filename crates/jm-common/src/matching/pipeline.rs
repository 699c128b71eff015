use std::{
    any::Any,
    cmp::Ordering,
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, Ordering as AtomicOrdering},
        Arc,
    },
};

use rayon::prelude::*;
use tracing::{debug, info, info_span, warn};

use super::{
    ko::KnockoutResult,
    prefilter::PreFilter,
    scoring::{DimensionScores, MatchResult, MatchingConfig},
};
use crate::{
    error::{BatchError, ConfigError, MatchError},
    run_id,
    schema::{CandidateProfile, VacancyRecord},
    store::MatchStore,
};

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Upper bound on pairs scored at the same time.
    pub max_concurrency: usize,
    /// Save every successful result through the store passed to the batch.
    pub persist: bool,
    /// Raised by the caller to stop scoring pairs that have not started.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_concurrency: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            persist: false,
            cancel: None,
        }
    }
}

impl BatchOptions {
    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(AtomicOrdering::Relaxed))
    }
}

/// One pre-filtered vacancy of a batch and what happened to it.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    /// Position in the input slice.
    pub vacancy_index: usize,
    pub vacancy_id: Option<i64>,
    pub outcome: Result<MatchResult, MatchError>,
}

/// One pre-filtered candidate of a reverse batch.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateEntry {
    /// Position in the input slice.
    pub candidate_index: usize,
    pub candidate_id: Option<i64>,
    pub outcome: Result<MatchResult, MatchError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedVacancy {
    pub vacancy_index: usize,
    pub vacancy_id: Option<i64>,
    pub result: MatchResult,
}

pub struct MatchingEngine {
    config: MatchingConfig,
    prefilter: PreFilter,
}

impl Default for MatchingEngine {
    fn default() -> Self {
        let config = MatchingConfig::default();
        Self {
            prefilter: PreFilter::new(config.prefilter.clone()),
            config,
        }
    }
}

impl MatchingEngine {
    /// Fails when the configuration does not validate; there is no engine
    /// for an invalid weight vector or inverted thresholds.
    pub fn new(config: MatchingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            prefilter: PreFilter::new(config.prefilter.clone()),
            config,
        })
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Scores one pair. Deterministic and side-effect free.
    pub fn compute_match(&self, candidate: &CandidateProfile, vacancy: &VacancyRecord) -> MatchResult {
        let scores = DimensionScores::compute(candidate, vacancy);
        let result =
            MatchResult::from_scores(&scores, &self.config.weights, &self.config.thresholds);

        debug!(
            candidate_id = candidate.id,
            vacancy_id = vacancy.id,
            overall = result.overall_score,
            quality = result.quality.as_ref(),
            "scored pair"
        );
        result
    }

    /// `compute_match` followed by exactly one `save` on the store.
    pub fn compute_and_store(
        &self,
        candidate: &CandidateProfile,
        vacancy: &VacancyRecord,
        store: &dyn MatchStore,
    ) -> Result<MatchResult, MatchError> {
        let candidate_id = candidate.id.ok_or(MatchError::MissingId { side: "candidate" })?;
        let vacancy_id = vacancy.id.ok_or(MatchError::MissingId { side: "vacancy" })?;

        let result = self.compute_match(candidate, vacancy);
        store.save(candidate_id, vacancy_id, &result)?;
        Ok(result)
    }

    pub fn prefilter(&self, vacancy: &VacancyRecord, candidate: &CandidateProfile) -> KnockoutResult {
        self.prefilter.evaluate(vacancy, candidate)
    }

    pub fn is_candidate_pool(&self, vacancy: &VacancyRecord, candidate: &CandidateProfile) -> bool {
        self.prefilter.is_candidate_pool(vacancy, candidate)
    }

    /// Pre-filters `vacancies`, then scores the survivors in parallel.
    ///
    /// Returns one entry per surviving vacancy in input order. A failure of
    /// one pair (store error, panic, cancellation) is reported on that entry
    /// only. `Err` means the batch could not start at all.
    pub fn batch_match(
        &self,
        candidate: &CandidateProfile,
        vacancies: &[VacancyRecord],
        options: &BatchOptions,
        store: Option<&dyn MatchStore>,
    ) -> Result<Vec<BatchEntry>, BatchError> {
        let pool = worker_pool(options, store)?;
        let run_id = run_id::generate();
        let span = info_span!("batch_match", run_id = %run_id, candidate_id = candidate.id);
        let _entered = span.enter();

        let kept = self.prefilter.filter(candidate, vacancies);
        let entries: Vec<BatchEntry> = pool.install(|| {
            kept.par_iter()
                .map(|&index| {
                    let _worker = span.enter();
                    let vacancy = &vacancies[index];
                    BatchEntry {
                        vacancy_index: index,
                        vacancy_id: vacancy.id,
                        outcome: self.score_pair(candidate, vacancy, options, store),
                    }
                })
                .collect()
        });

        let failed = log_failures(
            entries
                .iter()
                .map(|e| (e.vacancy_index, e.vacancy_id, &e.outcome)),
        );
        info!(
            vacancies = vacancies.len(),
            filtered_out = vacancies.len() - kept.len(),
            scored = entries.len() - failed,
            failed,
            max_concurrency = options.max_concurrency,
            "batch_match finished"
        );

        Ok(entries)
    }

    /// Reverse direction: one vacancy against many candidates.
    ///
    /// Same pre-filter, isolation and ordering rules as [`Self::batch_match`].
    pub fn batch_match_candidates(
        &self,
        vacancy: &VacancyRecord,
        candidates: &[CandidateProfile],
        options: &BatchOptions,
        store: Option<&dyn MatchStore>,
    ) -> Result<Vec<CandidateEntry>, BatchError> {
        let pool = worker_pool(options, store)?;
        let run_id = run_id::generate();
        let span = info_span!("batch_match_candidates", run_id = %run_id, vacancy_id = vacancy.id);
        let _entered = span.enter();

        let kept = self.prefilter.filter_candidates(vacancy, candidates);
        let entries: Vec<CandidateEntry> = pool.install(|| {
            kept.par_iter()
                .map(|&index| {
                    let _worker = span.enter();
                    let candidate = &candidates[index];
                    CandidateEntry {
                        candidate_index: index,
                        candidate_id: candidate.id,
                        outcome: self.score_pair(candidate, vacancy, options, store),
                    }
                })
                .collect()
        });

        let failed = log_failures(
            entries
                .iter()
                .map(|e| (e.candidate_index, e.candidate_id, &e.outcome)),
        );
        info!(
            candidates = candidates.len(),
            filtered_out = candidates.len() - kept.len(),
            scored = entries.len() - failed,
            failed,
            max_concurrency = options.max_concurrency,
            "batch_match_candidates finished"
        );

        Ok(entries)
    }

    /// Successful batch results, best first; ties keep input order.
    ///
    /// Nothing is persisted here.
    pub fn rank_vacancies(
        &self,
        candidate: &CandidateProfile,
        vacancies: &[VacancyRecord],
        options: &BatchOptions,
    ) -> Result<Vec<RankedVacancy>, BatchError> {
        let mut ranked: Vec<RankedVacancy> = self
            .batch_match(candidate, vacancies, options, None)?
            .into_iter()
            .filter_map(|entry| {
                entry.outcome.ok().map(|result| RankedVacancy {
                    vacancy_index: entry.vacancy_index,
                    vacancy_id: entry.vacancy_id,
                    result,
                })
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.result
                .overall_score
                .partial_cmp(&a.result.overall_score)
                .unwrap_or(Ordering::Equal)
        });
        Ok(ranked)
    }

    fn score_pair(
        &self,
        candidate: &CandidateProfile,
        vacancy: &VacancyRecord,
        options: &BatchOptions,
        store: Option<&dyn MatchStore>,
    ) -> Result<MatchResult, MatchError> {
        if options.is_cancelled() {
            return Err(MatchError::Cancelled);
        }
        panic::catch_unwind(AssertUnwindSafe(|| match store {
            Some(store) if options.persist => self.compute_and_store(candidate, vacancy, store),
            _ => Ok(self.compute_match(candidate, vacancy)),
        }))
        .unwrap_or_else(|payload| Err(MatchError::Panicked(panic_message(payload))))
    }
}

fn worker_pool(
    options: &BatchOptions,
    store: Option<&dyn MatchStore>,
) -> Result<rayon::ThreadPool, BatchError> {
    if options.max_concurrency == 0 {
        return Err(BatchError::ZeroConcurrency);
    }
    if options.persist && store.is_none() {
        warn!("persist requested without a store; results will not be saved");
    }
    Ok(rayon::ThreadPoolBuilder::new()
        .num_threads(options.max_concurrency)
        .thread_name(|i| format!("jm-match-{i}"))
        .build()?)
}

/// Warns once per failed pair; returns the failure count.
fn log_failures<'a>(
    outcomes: impl Iterator<Item = (usize, Option<i64>, &'a Result<MatchResult, MatchError>)>,
) -> usize {
    let mut failed = 0;
    for (index, id, outcome) in outcomes {
        if let Err(err) = outcome {
            failed += 1;
            warn!(index, id, error = %err, "pair failed");
        }
    }
    failed
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic payload not string".into())
}

/// Scores one pair with the canonical configuration.
pub fn compute_match(candidate: &CandidateProfile, vacancy: &VacancyRecord) -> MatchResult {
    MatchingEngine::default().compute_match(candidate, vacancy)
}

/// Pre-filter plus parallel scoring with the canonical configuration.
pub fn batch_match(
    candidate: &CandidateProfile,
    vacancies: &[VacancyRecord],
    options: &BatchOptions,
) -> Result<Vec<BatchEntry>, BatchError> {
    MatchingEngine::default().batch_match(candidate, vacancies, options, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::StoreError,
        schema::LocationPreferences,
        store::InMemoryMatchStore,
    };

    fn candidate() -> CandidateProfile {
        CandidateProfile {
            id: Some(1),
            skills: vec!["Rust".into(), "PostgreSQL".into()],
            location: LocationPreferences {
                is_remote: Some(true),
                ..LocationPreferences::default()
            },
            seniority_level: Some("Senior".into()),
            ..CandidateProfile::default()
        }
    }

    fn vacancy(id: i64, skills: &[&str]) -> VacancyRecord {
        VacancyRecord {
            id: Some(id),
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
            location: LocationPreferences {
                is_remote: Some(true),
                ..LocationPreferences::default()
            },
            seniority_level: Some("Senior".into()),
            ..VacancyRecord::default()
        }
    }

    fn office_vacancy(id: i64) -> VacancyRecord {
        VacancyRecord {
            location: LocationPreferences {
                is_office: Some(true),
                is_remote: Some(false),
                ..LocationPreferences::default()
            },
            ..vacancy(id, &["Rust"])
        }
    }

    fn options(max_concurrency: usize) -> BatchOptions {
        BatchOptions {
            max_concurrency,
            ..BatchOptions::default()
        }
    }

    struct FailingStore {
        fail_vacancy: i64,
        inner: InMemoryMatchStore,
    }

    impl MatchStore for FailingStore {
        fn save(&self, candidate_id: i64, vacancy_id: i64, result: &MatchResult) -> Result<(), StoreError> {
            if vacancy_id == self.fail_vacancy {
                return Err(StoreError::Unavailable("disk full".into()));
            }
            self.inner.save(candidate_id, vacancy_id, result)
        }
    }

    struct PanickingStore;

    impl MatchStore for PanickingStore {
        fn save(&self, _: i64, vacancy_id: i64, _: &MatchResult) -> Result<(), StoreError> {
            if vacancy_id == 2 {
                panic!("store exploded");
            }
            Ok(())
        }
    }

    #[test]
    fn compute_match_is_deterministic() {
        let engine = MatchingEngine::default();
        let v = vacancy(1, &["rust", "docker"]);
        let first = engine.compute_match(&candidate(), &v);
        let second = engine.compute_match(&candidate(), &v);
        assert_eq!(first, second);
        assert_eq!(first.overall_score.to_bits(), second.overall_score.to_bits());
    }

    #[test]
    fn invalid_config_cannot_build_engine() {
        let mut config = MatchingConfig::default();
        config.weights.skills = 0.9;
        assert!(matches!(
            MatchingEngine::new(config),
            Err(ConfigError::WeightSum { .. })
        ));
        assert!(MatchingEngine::new(MatchingConfig::default()).is_ok());
    }

    #[test]
    fn batch_skips_prefiltered_and_keeps_order() {
        let engine = MatchingEngine::default();
        let vacancies = vec![
            vacancy(10, &["Rust"]),
            office_vacancy(11),
            vacancy(12, &["Go"]),
        ];

        let entries = engine
            .batch_match(&candidate(), &vacancies, &options(2), None)
            .unwrap();

        assert_eq!(
            entries.iter().map(|e| e.vacancy_index).collect::<Vec<_>>(),
            vec![0, 2]
        );
        assert_eq!(entries[0].vacancy_id, Some(10));
        assert!(entries.iter().all(|e| e.outcome.is_ok()));
    }

    #[test]
    fn batch_results_equal_single_calls() {
        let engine = MatchingEngine::default();
        let vacancies: Vec<_> = (0..32)
            .map(|i| {
                let skills: &[&str] = if i % 2 == 0 { &["rust"] } else { &["rust", "kafka"] };
                vacancy(i, skills)
            })
            .collect();

        let entries = engine
            .batch_match(&candidate(), &vacancies, &options(4), None)
            .unwrap();

        assert_eq!(entries.len(), vacancies.len());
        for entry in entries {
            let expected = engine.compute_match(&candidate(), &vacancies[entry.vacancy_index]);
            assert_eq!(entry.outcome, Ok(expected));
        }
    }

    #[test]
    fn store_failure_is_isolated_to_its_pair() {
        let engine = MatchingEngine::default();
        let store = FailingStore {
            fail_vacancy: 2,
            inner: InMemoryMatchStore::new(),
        };
        let vacancies = vec![vacancy(1, &["rust"]), vacancy(2, &["rust"]), vacancy(3, &["rust"])];
        let opts = BatchOptions {
            persist: true,
            ..options(3)
        };

        let entries = engine
            .batch_match(&candidate(), &vacancies, &opts, Some(&store))
            .unwrap();

        assert!(entries[0].outcome.is_ok());
        assert!(matches!(entries[1].outcome, Err(MatchError::Store(_))));
        assert!(entries[2].outcome.is_ok());
        assert_eq!(store.inner.len(), 2);
    }

    #[test]
    fn panic_is_reported_per_pair() {
        let engine = MatchingEngine::default();
        let vacancies = vec![vacancy(1, &["rust"]), vacancy(2, &["rust"])];
        let opts = BatchOptions {
            persist: true,
            ..options(2)
        };

        let entries = engine
            .batch_match(&candidate(), &vacancies, &opts, Some(&PanickingStore))
            .unwrap();

        assert!(entries[0].outcome.is_ok());
        assert_eq!(
            entries[1].outcome,
            Err(MatchError::Panicked("store exploded".into()))
        );
    }

    #[test]
    fn missing_ids_fail_persistence_only() {
        let engine = MatchingEngine::default();
        let store = InMemoryMatchStore::new();
        let mut anonymous = vacancy(0, &["rust"]);
        anonymous.id = None;

        let err = engine
            .compute_and_store(&candidate(), &anonymous, &store)
            .unwrap_err();
        assert_eq!(err, MatchError::MissingId { side: "vacancy" });
        assert!(store.is_empty());

        let stored = engine
            .compute_and_store(&candidate(), &vacancy(5, &["rust"]), &store)
            .unwrap();
        assert_eq!(store.get(1, 5), Some(stored));
    }

    #[test]
    fn cancelled_batch_reports_every_pair() {
        let engine = MatchingEngine::default();
        let flag = Arc::new(AtomicBool::new(true));
        let opts = BatchOptions {
            cancel: Some(flag),
            ..options(2)
        };

        let entries = engine
            .batch_match(&candidate(), &[vacancy(1, &["rust"]), vacancy(2, &["go"])], &opts, None)
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.outcome == Err(MatchError::Cancelled)));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let engine = MatchingEngine::default();
        assert!(matches!(
            engine.batch_match(&candidate(), &[], &options(0), None),
            Err(BatchError::ZeroConcurrency)
        ));
    }

    #[test]
    fn ranks_best_first() {
        let engine = MatchingEngine::default();
        let vacancies = vec![
            vacancy(1, &["java"]),
            vacancy(2, &["rust", "postgresql"]),
            vacancy(3, &["rust"]),
        ];

        let ranked = engine
            .rank_vacancies(&candidate(), &vacancies, &options(2))
            .unwrap();

        assert_eq!(ranked.len(), 3);
        assert_eq!(
            ranked.iter().map(|r| r.vacancy_id).collect::<Vec<_>>(),
            vec![Some(2), Some(3), Some(1)]
        );
        assert!(ranked
            .windows(2)
            .all(|w| w[0].result.overall_score >= w[1].result.overall_score));
    }

    #[test]
    fn reverse_batch_scores_candidates_for_one_vacancy() {
        let engine = MatchingEngine::default();
        let store = InMemoryMatchStore::new();
        let remote_only = candidate();
        let second = CandidateProfile {
            id: Some(2),
            ..candidate()
        };
        let mut no_id = candidate();
        no_id.id = None;
        let opts = BatchOptions {
            persist: true,
            ..options(2)
        };

        let office = office_vacancy(7);
        let entries = engine
            .batch_match_candidates(&office, &[remote_only.clone()], &opts, Some(&store))
            .unwrap();
        assert!(entries.is_empty());

        let v = vacancy(7, &["rust"]);
        let entries = engine
            .batch_match_candidates(&v, &[remote_only.clone(), second, no_id], &opts, Some(&store))
            .unwrap();

        assert_eq!(
            entries.iter().map(|e| e.candidate_index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(entries[0].outcome, Ok(engine.compute_match(&remote_only, &v)));
        assert!(matches!(
            entries[2].outcome,
            Err(MatchError::MissingId { side: "candidate" })
        ));
        assert_eq!(store.len(), 2);
        assert!(store.get(2, 7).is_some());
    }

    #[test]
    fn persist_without_store_still_scores() {
        let engine = MatchingEngine::default();
        let opts = BatchOptions {
            persist: true,
            ..options(1)
        };
        let entries = engine
            .batch_match(&candidate(), &[vacancy(1, &["rust"])], &opts, None)
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].outcome.is_ok());
    }
}
