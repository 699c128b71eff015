use crate::normalize::normalize_tags;

/// Two tokens match when equal or when either contains the other.
/// Symmetric in its arguments.
pub fn tokens_match(a: &str, b: &str) -> bool {
    a == b || a.contains(b) || b.contains(a)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenOverlap {
    /// `(vacancy_token, candidate_token)` pairs, each token used at most once.
    pub matched: Vec<(String, String)>,
    /// Vacancy tokens left unmatched.
    pub missing: Vec<String>,
    pub candidate_len: usize,
    pub vacancy_len: usize,
}

impl TokenOverlap {
    /// Distinct elements once matched pairs are counted as one.
    pub fn union_len(&self) -> usize {
        self.candidate_len + self.vacancy_len - self.matched.len()
    }

    /// Missing-data policy: no requirements → 100, requirements but no
    /// candidate tokens → 0, otherwise `matched / union * 100`.
    pub fn score(&self) -> f64 {
        if self.vacancy_len == 0 {
            return 100.0;
        }
        if self.candidate_len == 0 {
            return 0.0;
        }
        self.matched.len() as f64 / self.union_len() as f64 * 100.0
    }
}

/// Largest one-to-one pairing of vacancy tokens with candidate tokens.
///
/// Exact pairs are seeded first, then augmenting paths add substring pairs,
/// reassigning earlier partners when that frees room for another pair. A
/// candidate token backs one vacancy token only, so the score can never
/// exceed 100.
pub fn match_tokens(candidate: &[String], vacancy: &[String]) -> TokenOverlap {
    let candidate_tokens: Vec<String> = normalize_tags(candidate).into_iter().collect();
    let vacancy_tokens: Vec<String> = normalize_tags(vacancy).into_iter().collect();

    let edges: Vec<Vec<usize>> = vacancy_tokens
        .iter()
        .map(|token| {
            let mut partners: Vec<usize> = (0..candidate_tokens.len())
                .filter(|&c| tokens_match(&candidate_tokens[c], token))
                .collect();
            partners.sort_by_key(|&c| candidate_tokens[c] != *token);
            partners
        })
        .collect();

    // owner[c] = vacancy index currently backed by candidate token c
    let mut owner: Vec<Option<usize>> = vec![None; candidate_tokens.len()];
    for (v, token) in vacancy_tokens.iter().enumerate() {
        if let Some(c) = candidate_tokens.iter().position(|c| c == token) {
            owner[c] = Some(v);
        }
    }
    for v in 0..vacancy_tokens.len() {
        if owner.contains(&Some(v)) {
            continue;
        }
        let mut visited = vec![false; candidate_tokens.len()];
        augment(v, &edges, &mut owner, &mut visited);
    }

    let mut partner_of: Vec<Option<usize>> = vec![None; vacancy_tokens.len()];
    for (c, v) in owner.iter().enumerate() {
        if let Some(v) = v {
            partner_of[*v] = Some(c);
        }
    }

    let mut matched = Vec::new();
    let mut missing = Vec::new();
    for (token, partner) in vacancy_tokens.iter().zip(partner_of) {
        match partner {
            Some(c) => matched.push((token.clone(), candidate_tokens[c].clone())),
            None => missing.push(token.clone()),
        }
    }

    TokenOverlap {
        matched,
        missing,
        candidate_len: candidate_tokens.len(),
        vacancy_len: vacancy_tokens.len(),
    }
}

fn augment(
    v: usize,
    edges: &[Vec<usize>],
    owner: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for &c in &edges[v] {
        if visited[c] {
            continue;
        }
        visited[c] = true;
        let free = match owner[c] {
            None => true,
            Some(other) => augment(other, edges, owner, visited),
        };
        if free {
            owner[c] = Some(v);
            return true;
        }
    }
    false
}

/// Skills dimension, 0..=100.
pub fn score_skills(candidate: &[String], vacancy: &[String]) -> f64 {
    match_tokens(candidate, vacancy).score()
}

/// Tools dimension; same algorithm as skills on independent token sets.
pub fn score_tools(candidate: &[String], vacancy: &[String]) -> f64 {
    match_tokens(candidate, vacancy).score()
}
