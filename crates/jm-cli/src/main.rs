use std::path::{Path, PathBuf};

use clap::Parser;
use dotenvy::dotenv;
use jm_common::{
    logging, BatchEntry, BatchOptions, CandidateProfile, InMemoryMatchStore, MatchResult,
    MatchStore, MatchingConfig, MatchingEngine, VacancyRecord,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::info;

mod error;

use error::CliError;

#[derive(Debug, Clone, Parser)]
#[command(name = "jm-match", about = "Score a candidate profile against a list of vacancies")]
struct Cli {
    /// JSON file holding one candidate profile
    #[arg(long)]
    candidate: PathBuf,

    /// JSON file holding an array of vacancies
    #[arg(long)]
    vacancies: PathBuf,

    /// Maximum number of pairs scored at once
    #[arg(long, env = "JM_MATCH_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Save results into an in-memory store and report the stored pairs
    #[arg(long, default_value_t = false, conflicts_with = "rank")]
    persist: bool,

    /// Print successful results best first instead of input order
    #[arg(long, default_value_t = false)]
    rank: bool,

    /// Pretty-print the JSON output
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

#[derive(Debug, Serialize)]
struct EntryOutput {
    vacancy_index: usize,
    vacancy_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<MatchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<BatchEntry> for EntryOutput {
    fn from(entry: BatchEntry) -> Self {
        let (result, error) = match entry.outcome {
            Ok(result) => (Some(result), None),
            Err(err) => (None, Some(err.to_string())),
        };
        Self {
            vacancy_index: entry.vacancy_index,
            vacancy_id: entry.vacancy_id,
            result,
            error,
        }
    }
}

#[derive(Debug, Serialize)]
struct Report {
    candidate_id: Option<i64>,
    vacancies: usize,
    matches: Vec<EntryOutput>,
    /// `[candidate_id, vacancy_id]` of every stored result.
    #[serde(skip_serializing_if = "Option::is_none")]
    persisted: Option<Vec<[i64; 2]>>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CliError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn batch_options(cli: &Cli) -> BatchOptions {
    let mut options = BatchOptions {
        persist: cli.persist,
        ..BatchOptions::default()
    };
    if let Some(concurrency) = cli.concurrency {
        options.max_concurrency = concurrency;
    }
    options
}

fn build_report(
    engine: &MatchingEngine,
    cli: &Cli,
    candidate: &CandidateProfile,
    vacancies: &[VacancyRecord],
) -> Result<Report, CliError> {
    let options = batch_options(cli);

    if cli.rank {
        let matches = engine
            .rank_vacancies(candidate, vacancies, &options)?
            .into_iter()
            .map(|ranked| EntryOutput {
                vacancy_index: ranked.vacancy_index,
                vacancy_id: ranked.vacancy_id,
                result: Some(ranked.result),
                error: None,
            })
            .collect();
        return Ok(Report {
            candidate_id: candidate.id,
            vacancies: vacancies.len(),
            matches,
            persisted: None,
        });
    }

    let store = InMemoryMatchStore::new();
    let store_ref: Option<&dyn MatchStore> = if cli.persist { Some(&store) } else { None };
    let entries = engine.batch_match(candidate, vacancies, &options, store_ref)?;

    Ok(Report {
        candidate_id: candidate.id,
        vacancies: vacancies.len(),
        matches: entries.into_iter().map(EntryOutput::from).collect(),
        persisted: cli.persist.then(|| {
            store
                .snapshot()
                .into_iter()
                .map(|((candidate_id, vacancy_id), _)| [candidate_id, vacancy_id])
                .collect()
        }),
    })
}

fn run() -> Result<(), CliError> {
    dotenv().ok();
    logging::init_tracing_subscriber("jm-match");
    logging::install_tracing_panic_hook("jm-match");

    let cli = Cli::parse();
    let engine = MatchingEngine::new(MatchingConfig::from_env()?)?;

    let candidate: CandidateProfile = read_json(&cli.candidate)?;
    let vacancies: Vec<VacancyRecord> = read_json(&cli.vacancies)?;
    info!(
        candidate = %cli.candidate.display(),
        vacancies = vacancies.len(),
        rank = cli.rank,
        persist = cli.persist,
        "jm-match starting"
    );

    let report = build_report(&engine, &cli, &candidate, &vacancies)?;
    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{rendered}");
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        tracing::error!(error = %err, "jm-match failed");
        eprintln!("jm-match: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jm_common::schema::LocationPreferences;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["jm-match", "--candidate", "c.json", "--vacancies", "v.json"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn remote() -> LocationPreferences {
        LocationPreferences {
            is_remote: Some(true),
            ..LocationPreferences::default()
        }
    }

    #[test]
    fn parses_flags() {
        let parsed = cli(&["--concurrency", "3", "--persist", "--pretty"]);
        assert_eq!(parsed.candidate, PathBuf::from("c.json"));
        assert_eq!(parsed.concurrency, Some(3));
        assert!(parsed.persist);
        assert!(parsed.pretty);
        assert!(!parsed.rank);
        assert_eq!(batch_options(&parsed).max_concurrency, 3);
    }

    #[test]
    fn persist_and_rank_are_exclusive() {
        let args = ["jm-match", "--candidate", "c.json", "--vacancies", "v.json", "--rank", "--persist"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn input_paths_are_required() {
        assert!(Cli::try_parse_from(["jm-match", "--candidate", "c.json"]).is_err());
    }

    #[test]
    fn report_lists_entries_and_persisted_pairs() {
        let candidate = CandidateProfile {
            id: Some(1),
            skills: vec!["rust".into()],
            location: remote(),
            ..CandidateProfile::default()
        };
        let vacancies = vec![
            VacancyRecord {
                id: Some(10),
                required_skills: vec!["rust".into()],
                location: remote(),
                ..VacancyRecord::default()
            },
            VacancyRecord {
                id: None,
                required_skills: vec!["go".into()],
                location: remote(),
                ..VacancyRecord::default()
            },
        ];

        let report = build_report(
            &MatchingEngine::default(),
            &cli(&["--persist", "--concurrency", "2"]),
            &candidate,
            &vacancies,
        )
        .unwrap();

        assert_eq!(report.matches.len(), 2);
        assert!(report.matches[0].result.is_some());
        assert!(report.matches[1].error.is_some());
        assert_eq!(report.persisted, Some(vec![[1, 10]]));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["matches"][0]["result"]["quality"], "High");
        assert!(json["matches"][0].get("error").is_none());
    }

    #[test]
    fn ranked_report_is_best_first() {
        let candidate = CandidateProfile {
            skills: vec!["rust".into(), "sql".into()],
            location: remote(),
            ..CandidateProfile::default()
        };
        let vacancies = vec![
            VacancyRecord {
                id: Some(1),
                required_skills: vec!["go".into()],
                location: remote(),
                ..VacancyRecord::default()
            },
            VacancyRecord {
                id: Some(2),
                required_skills: vec!["rust".into(), "sql".into()],
                location: remote(),
                ..VacancyRecord::default()
            },
        ];

        let report = build_report(&MatchingEngine::default(), &cli(&["--rank"]), &candidate, &vacancies)
            .unwrap();
        let ids: Vec<_> = report.matches.iter().map(|m| m.vacancy_id).collect();
        assert_eq!(ids, vec![Some(2), Some(1)]);
        assert_eq!(report.persisted, None);
    }
}
