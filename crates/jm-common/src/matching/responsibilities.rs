use crate::normalize::normalize_phrases;

/// Directional phrase match: a vacancy responsibility is covered when it
/// contains, or is contained in, any candidate responsibility.
///
/// Score is `covered / vacancy_count * 100`; no vacancy responsibilities → 100.
pub fn score_responsibilities(candidate: &[String], vacancy: &[String]) -> f64 {
    let required = normalize_phrases(vacancy);
    if required.is_empty() {
        return 100.0;
    }

    let offered = normalize_phrases(candidate);
    let covered = required
        .iter()
        .filter(|req| {
            offered
                .iter()
                .any(|have| have.contains(req.as_str()) || req.contains(have.as_str()))
        })
        .count();

    covered as f64 / required.len() as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrases(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_requirements_is_full_score() {
        assert_eq!(score_responsibilities(&phrases(&["anything"]), &[]), 100.0);
        assert_eq!(score_responsibilities(&[], &phrases(&["  ", "."])), 100.0);
    }

    #[test]
    fn containment_works_both_ways() {
        let candidate = phrases(&["Code review of backend services", "mentoring"]);
        let vacancy = phrases(&["code review", "Mentoring junior developers", "on-call duty"]);
        let score = score_responsibilities(&candidate, &vacancy);
        assert!((score - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn punctuation_and_case_are_ignored() {
        let score = score_responsibilities(
            &phrases(&["Design, build and maintain APIs"]),
            &phrases(&["design build"]),
        );
        assert_eq!(score, 100.0);
    }

    #[test]
    fn empty_candidate_scores_zero_against_requirements() {
        assert_eq!(score_responsibilities(&[], &phrases(&["deploy"])), 0.0);
    }
}
