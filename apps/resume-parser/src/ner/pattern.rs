//! Rule-based entity recognizer.
//!
//! Recognizes two categories:
//! - dates: month-name dates, numeric dates, bare years and ranges such as
//!   `Jan 2019 - Present` or `2015 – 2019`
//! - organizations: capitalized phrases built around an institution or
//!   company keyword (`Stanford University`, `Acme Corp`,
//!   `University of Michigan`), plus optional gazetteer names
//!
//! Matches from all rules are merged left to right; where two matches
//! overlap the earlier one wins, then the longer one.

use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use super::{EntityRecognizer, RecognizedEntity, RecognizerError};

const MONTH: &str = r"(?i:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?";
const SEASON: &str = r"(?i:spring|summer|fall|autumn|winter)";
const YEAR: &str = r"(?:19[5-9]\d|20\d\d)\b";
const OPEN_END: &str = r"(?i:present|current|now|today)\b";
const RANGE_SEPARATOR: &str = r"\s*(?:-|–|—|to\b|until\b)\s*";

/// Keywords that make a capitalized phrase an organization. Longer forms first.
const ORG_KEYWORDS: &[&str] = &[
    "University",
    "Universität",
    "Université",
    "College",
    "Institute",
    "Institution",
    "School",
    "Academy",
    "Polytechnic",
    "Conservatory",
    "Seminary",
    "Corporation",
    "Corp",
    "Incorporated",
    "Inc",
    "LLC",
    "LLP",
    "Ltd",
    "Limited",
    "GmbH",
    "PLC",
    "Company",
    "Technologies",
    "Technology",
    "Systems",
    "Solutions",
    "Software",
    "Laboratories",
    "Labs",
    "Group",
    "Bank",
    "Foundation",
    "Hospital",
    "Agency",
    "Association",
    "Society",
    "Partners",
    "Consulting",
    "Ventures",
    "Holdings",
    "Enterprises",
    "Industries",
];

/// Leading words that are section headings or verbs, never part of a name.
const LEADING_STOPWORDS: &[&str] = &[
    "Education",
    "Experience",
    "Employment",
    "Work",
    "History",
    "Professional",
    "Skills",
    "Summary",
    "Projects",
    "Profile",
    "Objective",
    "Attended",
    "Graduated",
    "Joined",
    "Studied",
    "Worked",
    "Currently",
    "At",
    "In",
    "From",
];

const CAPITALIZED_WORD: &str = r"\p{Lu}[\p{L}\p{N}&'\-]*";

#[derive(Debug, Deserialize)]
struct Gazetteer {
    #[serde(default)]
    organizations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Organization,
    Date,
}

#[derive(Debug)]
struct Candidate {
    start: usize,
    end: usize,
    kind: Kind,
}

/// Deterministic recognizer driven by regular expressions.
#[derive(Debug)]
pub struct PatternRecognizer {
    date: Regex,
    organization: Regex,
    gazetteer: Option<Regex>,
}

impl PatternRecognizer {
    pub fn new() -> Result<Self, RecognizerError> {
        Ok(Self {
            date: Regex::new(&date_pattern())?,
            organization: Regex::new(&organization_pattern())?,
            gazetteer: None,
        })
    }

    /// Adds exact organization names matched as whole words.
    pub fn with_organizations<I, S>(mut self, names: I) -> Result<Self, RecognizerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        if names.is_empty() {
            return Ok(self);
        }
        // Longest first so "Acme Labs Europe" beats "Acme Labs".
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        names.dedup();

        let alternation = names
            .iter()
            .map(|n| regex::escape(n))
            .collect::<Vec<_>>()
            .join("|");
        self.gazetteer = Some(Regex::new(&format!(r"\b(?:{alternation})\b"))?);
        Ok(self)
    }

    /// Loads a JSON gazetteer of the form `{"organizations": ["Acme", ...]}`.
    pub fn with_gazetteer_file(path: &Path) -> Result<Self, RecognizerError> {
        let raw = std::fs::read_to_string(path).map_err(|source| RecognizerError::GazetteerRead {
            path: path.to_path_buf(),
            source,
        })?;
        let gazetteer: Gazetteer =
            serde_json::from_str(&raw).map_err(|source| RecognizerError::GazetteerFormat {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(
            "Loaded {} gazetteer organizations from {}",
            gazetteer.organizations.len(),
            path.display()
        );
        Self::new()?.with_organizations(gazetteer.organizations)
    }

    fn candidates(&self, text: &str) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = self
            .date
            .find_iter(text)
            .map(|m| Candidate {
                start: m.start(),
                end: m.end(),
                kind: Kind::Date,
            })
            .collect();

        for m in self.organization.find_iter(text) {
            if let Some(start) = trim_leading_stopwords(text, m.start(), m.end()) {
                candidates.push(Candidate {
                    start,
                    end: m.end(),
                    kind: Kind::Organization,
                });
            }
        }

        if let Some(gazetteer) = &self.gazetteer {
            candidates.extend(gazetteer.find_iter(text).map(|m| Candidate {
                start: m.start(),
                end: m.end(),
                kind: Kind::Organization,
            }));
        }

        candidates
    }
}

impl EntityRecognizer for PatternRecognizer {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn recognize(&self, text: &str) -> Vec<RecognizedEntity> {
        let mut candidates = self.candidates(text);
        candidates.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then_with(|| (b.end - b.start).cmp(&(a.end - a.start)))
        });

        let mut entities = Vec::new();
        let mut covered_until = 0;
        for candidate in candidates {
            if candidate.start < covered_until {
                continue;
            }
            covered_until = candidate.end;
            let span = text[candidate.start..candidate.end].to_string();
            entities.push(match candidate.kind {
                Kind::Organization => RecognizedEntity::Organization(span),
                Kind::Date => RecognizedEntity::Date(span),
            });
        }
        entities
    }
}

fn date_pattern() -> String {
    let point = format!(
        r"(?:{MONTH}\s+\d{{1,2}}(?:st|nd|rd|th)?,?\s+{YEAR}|{MONTH},?\s+{YEAR}|{SEASON}\s+{YEAR}|\d{{1,2}}/\d{{1,2}}/{YEAR}|\d{{1,2}}/{YEAR}|{YEAR}-\d{{2}}-\d{{2}}\b|{YEAR}-\d{{2}}\b|{YEAR})"
    );
    let end = format!(r"(?:{point}|{OPEN_END})");
    format!(r"\b(?:{point}{RANGE_SEPARATOR}{end}|{point})")
}

fn organization_pattern() -> String {
    let keywords = ORG_KEYWORDS.join("|");
    let cap = CAPITALIZED_WORD;
    let name_tail = format!(r"{cap}(?:[ \t]+(?:{cap}|&))*");
    format!(
        r"\b(?:(?:{cap}[ \t]+)+(?:{keywords})\b\.?(?:[ \t]+(?:of|for)[ \t]+(?:the[ \t]+)?{name_tail})?|(?:{keywords})[ \t]+(?:of|for)[ \t]+(?:the[ \t]+)?{name_tail})"
    )
}

/// Drops heading words from the front of an organization match. Returns the
/// new start offset, or `None` when fewer than two words remain.
fn trim_leading_stopwords(text: &str, start: usize, end: usize) -> Option<usize> {
    let mut start = start;
    loop {
        let span = &text[start..end];
        let first_word_len = span.find([' ', '\t'])?;
        if !LEADING_STOPWORDS.contains(&&span[..first_word_len]) {
            return Some(start);
        }
        let rest = &span[first_word_len..];
        start += first_word_len + (rest.len() - rest.trim_start_matches([' ', '\t']).len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recognizer() -> PatternRecognizer {
        PatternRecognizer::new().unwrap()
    }

    fn org(s: &str) -> RecognizedEntity {
        RecognizedEntity::Organization(s.to_string())
    }

    fn date(s: &str) -> RecognizedEntity {
        RecognizedEntity::Date(s.to_string())
    }

    #[test]
    fn test_patterns_compile() {
        assert!(Regex::new(&date_pattern()).is_ok());
        assert!(Regex::new(&organization_pattern()).is_ok());
    }

    #[test]
    fn test_text_without_entities_yields_nothing() {
        let entities =
            recognizer().recognize("Call me at 5551234567 or email jane@example.com");
        assert!(entities.is_empty());
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        assert!(recognizer().recognize("").is_empty());
    }

    #[test]
    fn test_university_names() {
        let r = recognizer();
        assert_eq!(r.recognize("Stanford University"), vec![org("Stanford University")]);
        assert_eq!(
            r.recognize("B.S. from University of Michigan, 2016"),
            vec![org("University of Michigan"), date("2016")]
        );
        assert_eq!(
            r.recognize("Massachusetts Institute of Technology"),
            vec![org("Massachusetts Institute of Technology")]
        );
    }

    #[test]
    fn test_company_suffixes() {
        let r = recognizer();
        assert_eq!(r.recognize("Engineer at Acme Corp."), vec![org("Acme Corp.")]);
        assert_eq!(
            r.recognize("Globex Technologies Inc"),
            vec![org("Globex Technologies Inc")]
        );
    }

    #[test]
    fn test_lowercase_keyword_is_not_an_organization() {
        assert!(recognizer().recognize("went to college and graduate school").is_empty());
    }

    #[test]
    fn test_heading_words_are_trimmed() {
        assert_eq!(
            recognizer().recognize("Education Stanford University"),
            vec![org("Stanford University")]
        );
    }

    #[test]
    fn test_date_ranges() {
        let r = recognizer();
        assert_eq!(r.recognize("Jan 2019 - Present"), vec![date("Jan 2019 - Present")]);
        assert_eq!(r.recognize("2015 – 2019"), vec![date("2015 – 2019")]);
        assert_eq!(r.recognize("2018-2020"), vec![date("2018-2020")]);
        assert_eq!(
            r.recognize("September 2017 to June 2019"),
            vec![date("September 2017 to June 2019")]
        );
    }

    #[test]
    fn test_single_dates() {
        let r = recognizer();
        assert_eq!(r.recognize("May 5, 2020"), vec![date("May 5, 2020")]);
        assert_eq!(r.recognize("since 03/2021"), vec![date("03/2021")]);
        assert_eq!(r.recognize("Summer 2018"), vec![date("Summer 2018")]);
        assert_eq!(r.recognize("released 2021-04-01"), vec![date("2021-04-01")]);
    }

    #[test]
    fn test_out_of_range_numbers_are_not_years() {
        assert!(recognizer().recognize("Room 1234 and 2150 units").is_empty());
    }

    #[test]
    fn test_discovery_order_is_left_to_right() {
        let text = "Worked at Acme Corp from 2018 to 2020 after graduating from \
                    Stanford University in 2017";
        assert_eq!(
            recognizer().recognize(text),
            vec![
                org("Acme Corp"),
                date("2018 to 2020"),
                org("Stanford University"),
                date("2017"),
            ]
        );
    }

    #[test]
    fn test_organizations_do_not_span_lines() {
        assert_eq!(
            recognizer().recognize("Jane Doe\nGlobex Corporation"),
            vec![org("Globex Corporation")]
        );
    }

    #[test]
    fn test_duplicates_are_kept() {
        let entities = recognizer().recognize("2019 and again 2019");
        assert_eq!(entities, vec![date("2019"), date("2019")]);
    }

    #[test]
    fn test_gazetteer_names_are_recognized() {
        let r = recognizer().with_organizations(["Google", "Initech"]).unwrap();
        assert_eq!(
            r.recognize("Intern at Google in 2019"),
            vec![org("Google"), date("2019")]
        );
        // Whole words only.
        assert!(r.recognize("Googleplex").is_empty());
    }

    #[test]
    fn test_gazetteer_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orgs.json");
        std::fs::write(&path, r#"{"organizations": ["Initech"]}"#).unwrap();
        let r = PatternRecognizer::with_gazetteer_file(&path).unwrap();
        assert_eq!(r.recognize("Initech"), vec![org("Initech")]);
    }

    #[test]
    fn test_malformed_gazetteer_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orgs.json");
        std::fs::write(&path, "not json").unwrap();
        let err = PatternRecognizer::with_gazetteer_file(&path).unwrap_err();
        assert!(matches!(err, RecognizerError::GazetteerFormat { .. }));
    }

    #[test]
    fn test_recognition_is_deterministic() {
        let r = recognizer();
        let text = "Acme Labs, 2019 - 2021. Ohio State University, May 2015";
        assert_eq!(r.recognize(text), r.recognize(text));
    }
}
