use crate::schema::SeniorityLevel;

/// Seniority dimension. Distance on the ladder
/// Trainee < Junior < Middle < Senior < Lead < C-Level:
///
/// | candidate vs required | score |
/// |---|---|
/// | equal | 100 |
/// | one above | 90 |
/// | one below | 70 |
/// | two+ above | 70 |
/// | two+ below | 30 |
///
/// Either side missing → 100; unrecognized text on either side → 50.
pub fn score_level(candidate: Option<&str>, required: Option<&str>) -> f64 {
    let (Some(candidate), Some(required)) = (
        candidate.filter(|s| !s.trim().is_empty()),
        required.filter(|s| !s.trim().is_empty()),
    ) else {
        return 100.0;
    };

    let (Some(candidate), Some(required)) =
        (SeniorityLevel::parse(candidate), SeniorityLevel::parse(required))
    else {
        return 50.0;
    };

    match candidate.rank() - required.rank() {
        0 => 100.0,
        1 => 90.0,
        -1 => 70.0,
        d if d >= 2 => 70.0,
        _ => 30.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_levels() {
        assert_eq!(score_level(Some("Middle"), Some("middle")), 100.0);
    }

    #[test]
    fn one_step_either_way() {
        assert_eq!(score_level(Some("Junior"), Some("Middle")), 70.0);
        assert_eq!(score_level(Some("Senior"), Some("Middle")), 90.0);
    }

    #[test]
    fn two_or_more_steps() {
        assert_eq!(score_level(Some("Trainee"), Some("Senior")), 30.0);
        assert_eq!(score_level(Some("C-Level"), Some("Junior")), 70.0);
    }

    #[test]
    fn missing_side_is_unconstrained() {
        assert_eq!(score_level(None, Some("Senior")), 100.0);
        assert_eq!(score_level(Some("Senior"), None), 100.0);
        assert_eq!(score_level(Some("  "), Some("Senior")), 100.0);
    }

    #[test]
    fn unrecognized_text_is_neutral() {
        assert_eq!(score_level(Some("Rockstar"), Some("Senior")), 50.0);
        assert_eq!(score_level(Some("Senior"), Some("ninja")), 50.0);
    }

    #[test]
    fn aliases_map_onto_the_ladder() {
        assert_eq!(score_level(Some("Intern"), Some("Trainee")), 100.0);
        assert_eq!(score_level(Some("Director"), Some("Team Lead")), 90.0);
    }
}
