//! Open data and open code statement classification

use std::collections::BTreeSet;

use regex::Regex;

use super::patterns::Patterns;
use super::sentences::Sentence;
use crate::model::{OddpubMetrics, OpenDataCategory};

/// Longest availability section, in sentences, including its heading
const MAX_SECTION_SENTENCES: usize = 8;

const STATEMENT_SEPARATOR: &str = "; ";

/// Classification of a single sentence with respect to data sharing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataSignal {
    pub categories: BTreeSet<OpenDataCategory>,
    pub is_reuse: bool,
}

/// Which availability section a sentence belongs to
#[derive(Debug, Clone, Copy, Default)]
struct SectionMembership {
    das: bool,
    cas: bool,
}

/// Classifies sentences into open data and open code statements
pub struct StatementSearch<'a> {
    patterns: &'a Patterns,
}

impl<'a> StatementSearch<'a> {
    pub fn new(patterns: &'a Patterns) -> Self {
        Self { patterns }
    }

    /// Data sharing signal of a sentence, if it is an open data statement
    pub fn data_signal(&self, sentence: &str, in_das: bool) -> Option<DataSignal> {
        let p = self.patterns;

        if p.restricted.is_match(sentence) {
            return None;
        }

        let has_accession = p.accession.is_match(sentence);
        let available = p.availability.is_match(sentence) || has_accession;
        if !available {
            return None;
        }

        let mut categories = BTreeSet::new();
        if has_accession || p.field_repository.is_match(sentence) {
            categories.insert(OpenDataCategory::FieldSpecificRepository);
        }
        if p.general_repository.is_match(sentence) {
            categories.insert(OpenDataCategory::GeneralPurposeRepository);
        }
        // inside a DAS the data wording is implied by the section
        if p.supplement.is_match(sentence) && (in_das || p.data_words.is_match(sentence)) {
            categories.insert(OpenDataCategory::Supplement);
        }

        if categories.is_empty() {
            return None;
        }

        // a general repository mention outside any data context is usually code
        if !in_das
            && categories == BTreeSet::from([OpenDataCategory::GeneralPurposeRepository])
            && !p.data_words.is_match(sentence)
        {
            return None;
        }

        Some(DataSignal {
            categories,
            is_reuse: p.reuse.is_match(sentence),
        })
    }

    /// Whether a sentence states that code is openly available
    pub fn is_code_statement(&self, sentence: &str, in_cas: bool) -> bool {
        let p = self.patterns;

        if p.restricted.is_match(sentence) {
            return false;
        }

        let on_code_host = p.code_host.is_match(sentence);
        if in_cas && on_code_host {
            return true;
        }

        let mentions_code = in_cas || p.code_words.is_match(sentence);
        let has_location = on_code_host || p.url.is_match(sentence);

        mentions_code && has_location && p.availability.is_match(sentence)
    }

    /// Classify an article's sentences into the ODDPub metrics record
    pub fn search(&self, article: &str, sentences: &[Sentence]) -> OddpubMetrics {
        let membership = self.sections(sentences);

        let mut das_text: Vec<&str> = Vec::new();
        let mut cas_text: Vec<&str> = Vec::new();
        let mut data_statements: Vec<&str> = Vec::new();
        let mut code_statements: Vec<&str> = Vec::new();
        let mut categories: BTreeSet<OpenDataCategory> = BTreeSet::new();

        let mut metrics = OddpubMetrics::empty(article);

        for (sentence, section) in sentences.iter().zip(membership.iter()) {
            let text = sentence.text.as_str();

            if section.das {
                das_text.push(text);
            }
            if section.cas {
                cas_text.push(text);
            }
            if sentence.is_heading {
                continue;
            }

            if let Some(signal) = self.data_signal(text, section.das) {
                data_statements.push(text);
                if signal.is_reuse {
                    metrics.is_reuse = true;
                } else {
                    metrics.is_open_data = true;
                    metrics.is_open_data_das |= section.das;
                    categories.extend(signal.categories);
                }
            }

            if self.is_code_statement(text, section.cas) {
                code_statements.push(text);
                metrics.is_open_code = true;
                metrics.is_open_code_cas |= section.cas;
            }
        }

        metrics.open_data_category = categories
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(", ");
        metrics.open_data_statements = dedup_join(&data_statements);
        metrics.open_code_statements = dedup_join(&code_statements);
        metrics.das = (!das_text.is_empty()).then(|| das_text.join(" "));
        metrics.cas = (!cas_text.is_empty()).then(|| cas_text.join(" "));

        tracing::debug!(
            article = %article,
            sentences = sentences.len(),
            is_open_data = metrics.is_open_data,
            is_open_code = metrics.is_open_code,
            has_das = metrics.das.is_some(),
            has_cas = metrics.cas.is_some(),
            "Completed open data search"
        );

        metrics
    }

    /// Mark the sentences that belong to a DAS or CAS section.
    ///
    /// A section starts at a heading line naming data or code availability, or
    /// at a sentence led by such a heading and a colon. It runs until the next
    /// heading in either form, capped at `MAX_SECTION_SENTENCES`.
    fn sections(&self, sentences: &[Sentence]) -> Vec<SectionMembership> {
        let p = self.patterns;
        let mut membership = vec![SectionMembership::default(); sentences.len()];
        let mut current: Option<(SectionMembership, usize)> = None;

        for (i, sentence) in sentences.iter().enumerate() {
            let text = sentence.text.as_str();
            let opens = |re: &Regex| {
                if sentence.is_heading {
                    re.is_match(text)
                } else {
                    inline_heading(re, text)
                }
            };
            let opens_das = opens(&p.das_heading);
            let opens_cas = opens(&p.cas_heading);

            if opens_das || opens_cas {
                current = Some((
                    SectionMembership {
                        das: opens_das,
                        cas: opens_cas,
                    },
                    0,
                ));
            } else if sentence.is_heading || inline_heading(&p.other_heading, text) {
                current = None;
            }

            if let Some((section, len)) = current {
                if len >= MAX_SECTION_SENTENCES {
                    current = None;
                    continue;
                }
                membership[i] = section;
                current = Some((section, len + 1));
            }
        }

        membership
    }
}

/// Whether a prose sentence opens with `heading` followed by a colon, as in
/// "Data availability: all data are on Dryad."
fn inline_heading(heading: &Regex, text: &str) -> bool {
    heading
        .find(text)
        .is_some_and(|m| text[m.end()..].trim_start().starts_with(':'))
}

fn dedup_join(statements: &[&str]) -> String {
    let mut seen = BTreeSet::new();
    statements
        .iter()
        .filter(|s| seen.insert(**s))
        .copied()
        .collect::<Vec<_>>()
        .join(STATEMENT_SEPARATOR)
}
