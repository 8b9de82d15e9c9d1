//! Sentence segmentation of converted PDF text

use regex::Regex;

use super::convert::ConvertedPdf;
use super::patterns::Patterns;

/// Tokens that end in a period without ending the sentence
const ABBREVIATIONS: &[&str] = &[
    "e.g", "i.e", "al", "fig", "figs", "ref", "refs", "no", "nos", "vs", "approx", "ca", "cf",
    "eq", "eqs", "suppl", "vol", "dr", "mr", "ms", "prof", "resp", "tab", "sect", "sec", "ch",
];

/// A sentence of the paper; headings are kept as their own sentences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    pub text: String,
    pub is_heading: bool,
}

impl Sentence {
    fn prose(text: String) -> Self {
        Self {
            text,
            is_heading: false,
        }
    }

    fn heading(text: String) -> Self {
        Self {
            text,
            is_heading: true,
        }
    }
}

/// Splits page text into sentences
#[derive(Debug, Clone)]
pub struct SentenceSplitter {
    hyphenation: Regex,
    whitespace: Regex,
}

impl SentenceSplitter {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            hyphenation: Regex::new(r"(\p{L})-[ \t]*\r?\n[ \t]*(\p{Ll})")?,
            whitespace: Regex::new(r"\s+")?,
        })
    }

    /// Produce the sentence list for a converted document
    pub fn load(&self, converted: &ConvertedPdf, patterns: &Patterns) -> Vec<Sentence> {
        let text = converted.pages.join("\n\n");
        let text = self.hyphenation.replace_all(&text, "$1$2");

        let mut sentences = Vec::new();
        let mut paragraph = String::new();

        for line in text.lines() {
            let line = line.trim();

            if line.is_empty() {
                self.flush(&mut paragraph, &mut sentences);
                continue;
            }

            if patterns.is_heading_line(line) {
                self.flush(&mut paragraph, &mut sentences);
                let heading = line.trim_end_matches([':', '.']).trim().to_string();
                sentences.push(Sentence::heading(heading));
                continue;
            }

            if !paragraph.is_empty() {
                paragraph.push(' ');
            }
            paragraph.push_str(line);
        }
        self.flush(&mut paragraph, &mut sentences);

        sentences
    }

    fn flush(&self, paragraph: &mut String, sentences: &mut Vec<Sentence>) {
        if paragraph.is_empty() {
            return;
        }
        let collapsed = self.whitespace.replace_all(paragraph.trim(), " ");
        sentences.extend(split_sentences(&collapsed).into_iter().map(Sentence::prose));
        paragraph.clear();
    }
}

/// Split prose at terminal punctuation followed by whitespace and a capital
/// letter, digit or opening bracket
pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0usize;

    for i in 0..chars.len() {
        let (idx, c) = chars[i];
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }

        let Some(&(_, next)) = chars.get(i + 1) else {
            continue;
        };
        if !next.is_whitespace() {
            continue;
        }

        let following = chars[i + 1..].iter().map(|(_, c)| *c).find(|c| !c.is_whitespace());
        let starts_new = match following {
            Some(f) => f.is_uppercase() || f.is_ascii_digit() || matches!(f, '(' | '[' | '"'),
            None => false,
        };
        if !starts_new {
            continue;
        }

        if c == '.' && is_abbreviation(&text[start..idx]) {
            continue;
        }

        let end = idx + c.len_utf8();
        let sentence = text[start..end].trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        start = end;
    }

    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }

    sentences
}

fn is_abbreviation(before: &str) -> bool {
    let token = before
        .rsplit(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or("");

    let mut letters = token.chars();
    if let (Some(first), None) = (letters.next(), letters.next()) {
        // single initial, e.g. "J. Smith"
        return first.is_uppercase();
    }

    let lower = token.to_lowercase();
    ABBREVIATIONS.contains(&lower.as_str())
}
