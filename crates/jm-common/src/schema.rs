//! Input records handed to the engine by the CV / vacancy analysis pipelines.
//!
//! Upstream extraction is unreliable, so every field is read leniently: a value
//! of the wrong shape becomes the "missing" sentinel (empty list / `None`)
//! instead of failing the whole record.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use strum::AsRefStr;

use crate::{currency::parse_salary_range, normalize::normalize_key};

/// CEFR level, plus native speaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, AsRefStr)]
pub enum LanguageLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
    #[serde(rename = "native")]
    #[strum(serialize = "native")]
    Native,
}

impl LanguageLevel {
    /// A1=1 .. C2=6, native=7
    pub fn ordinal(self) -> i32 {
        match self {
            LanguageLevel::A1 => 1,
            LanguageLevel::A2 => 2,
            LanguageLevel::B1 => 3,
            LanguageLevel::B2 => 4,
            LanguageLevel::C1 => 5,
            LanguageLevel::C2 => 6,
            LanguageLevel::Native => 7,
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        let lower = input.trim().to_lowercase();
        match lower.as_str() {
            "a1" => Some(LanguageLevel::A1),
            "a2" => Some(LanguageLevel::A2),
            "b1" => Some(LanguageLevel::B1),
            "b2" => Some(LanguageLevel::B2),
            "c1" => Some(LanguageLevel::C1),
            "c2" => Some(LanguageLevel::C2),
            "native" | "native speaker" | "mother tongue" => Some(LanguageLevel::Native),
            _ => None,
        }
    }
}

/// Career level ladder, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, AsRefStr)]
pub enum SeniorityLevel {
    Trainee,
    Junior,
    Middle,
    Senior,
    Lead,
    #[strum(serialize = "C-Level")]
    CLevel,
}

impl SeniorityLevel {
    pub fn rank(self) -> i32 {
        match self {
            SeniorityLevel::Trainee => 0,
            SeniorityLevel::Junior => 1,
            SeniorityLevel::Middle => 2,
            SeniorityLevel::Senior => 3,
            SeniorityLevel::Lead => 4,
            SeniorityLevel::CLevel => 5,
        }
    }

    /// Recognizes the level names and their common aliases.
    pub fn parse(input: &str) -> Option<Self> {
        let lower = input.trim().to_lowercase().replace(['_', '-'], " ");
        let level = match lower.split_whitespace().collect::<Vec<_>>().join(" ").as_str() {
            "trainee" | "intern" | "internship" => SeniorityLevel::Trainee,
            "junior" | "jr" => SeniorityLevel::Junior,
            "middle" | "mid" | "mid level" | "regular" => SeniorityLevel::Middle,
            "senior" | "sr" => SeniorityLevel::Senior,
            "lead" | "team lead" | "tech lead" | "teamlead" | "techlead" => SeniorityLevel::Lead,
            "c level" | "clevel" | "director" | "head" | "cto" | "ceo" | "vp" => {
                SeniorityLevel::CLevel
            }
            _ => return None,
        };
        Some(level)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub name: String,
    pub level: Option<LanguageLevel>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationPreferences {
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub countries: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub cities: Vec<String>,
    #[serde(default, deserialize_with = "lenient_opt_bool")]
    pub is_office: Option<bool>,
    #[serde(default, deserialize_with = "lenient_opt_bool")]
    pub is_remote: Option<bool>,
    #[serde(default, deserialize_with = "lenient_opt_bool")]
    pub is_hybrid: Option<bool>,
    #[serde(default, deserialize_with = "lenient_opt_bool")]
    pub willing_to_relocate: Option<bool>,
}

impl LocationPreferences {
    /// Remote only: remote accepted, neither office nor hybrid.
    pub fn is_remote_only(&self) -> bool {
        self.is_remote == Some(true) && self.is_office != Some(true) && self.is_hybrid != Some(true)
    }

    /// Office only: neither remote nor hybrid, with an explicit office signal
    /// (office flagged, or remote explicitly refused).
    pub fn is_office_only(&self) -> bool {
        self.is_remote != Some(true)
            && self.is_hybrid != Some(true)
            && (self.is_office == Some(true) || self.is_remote == Some(false))
    }

    pub fn has_places(&self) -> bool {
        self.countries.iter().chain(self.cities.iter()).any(|p| !p.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRange {
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub min: Option<i64>,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub max: Option<i64>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub currency: Option<String>,
}

impl SalaryRange {
    pub fn is_unspecified(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Ordered `(low, high)`. A single bound becomes a point interval; a
    /// reversed pair is swapped.
    pub fn bounds(&self) -> Option<(i64, i64)> {
        match (self.min, self.max) {
            (Some(a), Some(b)) => Some((a.min(b), a.max(b))),
            (Some(a), None) | (None, Some(a)) => Some((a, a)),
            (None, None) => None,
        }
    }
}

/// Candidate side, derived from an analyzed CV.
///
/// `level` and `salary` are accepted as alternate keys; when both spellings
/// are present the canonical one wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CandidateProfile {
    pub id: Option<i64>,
    pub skills: Vec<String>,
    pub tools: Vec<String>,
    pub responsibilities: Vec<String>,
    pub languages: Vec<Language>,
    pub seniority_level: Option<String>,
    pub location: LocationPreferences,
    pub salary_expectation: SalaryRange,
    pub categories: Vec<String>,
}

/// Vacancy side, derived from an AI-parsed job posting.
///
/// Requirement lists also load from their short keys (`skills`, `tools`,
/// `languages`); salary from `salary` or the legacy `salary_range` text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VacancyRecord {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub required_skills: Vec<String>,
    pub required_tools: Vec<String>,
    pub responsibilities: Vec<String>,
    pub required_languages: Vec<Language>,
    pub seniority_level: Option<String>,
    pub location: LocationPreferences,
    pub salary_offer: SalaryRange,
}

static NULL: Value = Value::Null;

/// Fields of a record; anything but a JSON object reads as empty.
struct RawRecord(Map<String, Value>);

impl RawRecord {
    fn read<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Object(fields) => Self(fields),
            _ => Self(Map::new()),
        })
    }

    /// First non-null value among `keys`, canonical key listed first.
    fn get(&self, keys: &[&str]) -> &Value {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .find(|value| !value.is_null())
            .unwrap_or(&NULL)
    }
}

impl<'de> Deserialize<'de> for CandidateProfile {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawRecord::read(deserializer)?;
        Ok(Self {
            id: coerce_i64(raw.get(&["id"])),
            skills: coerce_string_list(raw.get(&["skills"])),
            tools: coerce_string_list(raw.get(&["tools"])),
            responsibilities: coerce_string_list(raw.get(&["responsibilities"])),
            languages: coerce_languages(raw.get(&["languages"])),
            seniority_level: scalar_to_string(raw.get(&["seniority_level", "level"])),
            location: coerce_location(raw.get(&["location"])),
            salary_expectation: coerce_salary(raw.get(&["salary_expectation", "salary"])),
            categories: coerce_string_list(raw.get(&["categories"])),
        })
    }
}

impl<'de> Deserialize<'de> for VacancyRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawRecord::read(deserializer)?;
        Ok(Self {
            id: coerce_i64(raw.get(&["id"])),
            title: scalar_to_string(raw.get(&["title"])),
            category: scalar_to_string(raw.get(&["category"])),
            required_skills: coerce_string_list(raw.get(&["required_skills", "skills"])),
            required_tools: coerce_string_list(raw.get(&["required_tools", "tools"])),
            responsibilities: coerce_string_list(raw.get(&["responsibilities"])),
            required_languages: coerce_languages(raw.get(&["required_languages", "languages"])),
            seniority_level: scalar_to_string(raw.get(&["seniority_level", "level"])),
            location: coerce_location(raw.get(&["location"])),
            salary_offer: coerce_salary(raw.get(&["salary_offer", "salary", "salary_range"])),
        })
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn coerce_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_to_string).collect(),
        Value::String(text) => text
            .split([',', ';', '\n'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Some(true),
            "false" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.round() as i64)
        }),
        Value::String(s) => {
            let compact: String = s.chars().filter(|c| !c.is_whitespace() && *c != '_').collect();
            compact.parse().ok()
        }
        _ => None,
    }
}

fn coerce_language(value: &Value) -> Option<Language> {
    match value {
        Value::Object(map) => {
            let name = map
                .get("language")
                .or_else(|| map.get("name"))
                .and_then(scalar_to_string)?;
            let level = map
                .get("level")
                .and_then(scalar_to_string)
                .and_then(|l| LanguageLevel::parse(&l));
            Some(Language { name, level })
        }
        Value::String(text) => {
            let cleaned = text.replace(['(', ')'], " ");
            let parts: Vec<&str> = cleaned.split_whitespace().collect();
            let (last, rest) = parts.split_last()?;
            match LanguageLevel::parse(last) {
                Some(level) if !rest.is_empty() => Some(Language {
                    name: rest.join(" "),
                    level: Some(level),
                }),
                _ => Some(Language {
                    name: parts.join(" "),
                    level: None,
                }),
            }
        }
        _ => None,
    }
}

fn coerce_languages(value: &Value) -> Vec<Language> {
    let entries: Vec<Language> = match value {
        Value::Array(items) => items.iter().filter_map(coerce_language).collect(),
        Value::String(text) => text
            .split([',', ';'])
            .filter_map(|part| coerce_language(&Value::String(part.to_string())))
            .collect(),
        _ => Vec::new(),
    };

    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|lang| match normalize_key(&lang.name) {
            Some(key) => seen.insert(key),
            None => false,
        })
        .collect()
}

fn coerce_salary(value: &Value) -> SalaryRange {
    match value {
        Value::Object(_) => serde_json::from_value(value.clone()).unwrap_or_default(),
        Value::String(text) => parse_salary_range(text),
        _ => SalaryRange::default(),
    }
}

fn coerce_location(value: &Value) -> LocationPreferences {
    match value {
        Value::Object(_) => serde_json::from_value(value.clone()).unwrap_or_default(),
        _ => LocationPreferences::default(),
    }
}

fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(coerce_string_list(&Value::deserialize(deserializer)?))
}

fn lenient_opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(coerce_bool(&Value::deserialize(deserializer)?))
}

fn lenient_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(coerce_i64(&Value::deserialize(deserializer)?))
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_to_string(&Value::deserialize(deserializer)?))
}
