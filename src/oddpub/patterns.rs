//! Keyword vocabularies for open data and open code detection

use regex::Regex;

use crate::model::DetectionConfig;

const AVAILABILITY: &str = r"\b(available|availability|deposited|deposit|accessible|access|uploaded|released|shared|archived|hosted|provided|included|contained|downloaded|obtained|retrieved|found|stored)\b";

const FIELD_REPOSITORIES: &[&str] = &[
    r"gene expression omnibus",
    r"\bgeo\b",
    r"arrayexpress",
    r"sequence read archive",
    r"\bsra\b",
    r"european nucleotide archive",
    r"\bena\b",
    r"genbank",
    r"dbgap",
    r"protein data bank",
    r"\bpdb\b",
    r"proteomexchange",
    r"\bpride\b",
    r"metabolights",
    r"bioproject",
    r"biosample",
    r"openneuro",
    r"neurovault",
    r"\bddbj\b",
    r"\begas?\b",
    r"cancer imaging archive",
    r"\btcia\b",
    r"\bgdc\b",
    r"clinvar",
    r"dbsnp",
    r"flowrepository",
    r"uniprot",
];

const ACCESSION_NUMBERS: &str = r"\b(gse\d{3,}|gds\d{3,}|prjn[a-z]\d{3,}|prjeb\d{3,}|srp\d{4,}|srr\d{4,}|srx\d{4,}|erp\d{4,}|e-[a-z]{4}-\d+|pxd\d{4,}|phs\d{6}|egas\d{6,}|msv\d{6,})\b";

const GENERAL_REPOSITORIES: &[&str] = &[
    r"figshare",
    r"\bdryad\b",
    r"zenodo",
    r"dataverse",
    r"open science framework",
    r"\bosf\b",
    r"osf\.io",
    r"mendeley data",
    r"\bsynapse\b",
    r"\bvivli\b",
    r"data ?verse",
    r"\bmendeley\b",
];

const CODE_HOSTS: &[&str] = &[
    r"github",
    r"gitlab",
    r"bitbucket",
    r"sourceforge",
    r"code ?ocean",
    r"\bcran\b",
    r"bioconductor",
    r"\bpypi\b",
    r"zenodo",
    r"figshare",
    r"\bosf\b",
    r"osf\.io",
];

const SUPPLEMENT: &str = r"\b(supplement\w*|supporting information|additional files?|appendix|source data)\b";
const DATA_WORDS: &str = r"\b(data|datasets?|data sets?|raw data|source data|measurements|recordings|images|sequences|spreadsheets?)\b";
const CODE_WORDS: &str = r"\b(source code|code|scripts?|software|analysis pipeline|pipeline|package|notebooks?|implementation|toolbox)\b";
const URL: &str = r"(https?://|www\.|doi\.org/|10\.\d{4,9}/)";

const RESTRICTED: &str = r"(\bupon\s+(reasonable\s+)?request\b|\bon\s+(reasonable\s+)?request\b|\bnot\s+(be\s+)?(publicly\s+|openly\s+|freely\s+)?(available|accessible|shared)\b|\bcannot\s+be\s+(publicly\s+)?(shared|made\s+available)\b|\brestrictions?\s+apply\b|\bfrom\s+the\s+corresponding\s+author\b)";

const REUSE: &str = r"(\b(were|was|are|is)\s+(obtained|downloaded|retrieved|acquired|extracted|accessed|taken)\s+from\b|\bpreviously\s+(published|described|deposited|generated|released|reported)\b|\bre-?use[ds]?\b|\bpublicly\s+available\s+(data\s*sets?|datasets?|databases?|data)\s+(from|of|provided)\b)";

const DAS_HEADINGS: &str = r"^\W*(data\s+availability(\s+statement)?|availability\s+of\s+(the\s+)?data(\s+and\s+materials?)?|data\s+accessibility(\s+statement)?|data\s+sharing(\s+statement)?|data\s+access(\s+statement)?|data\s+and\s+code\s+availability|code\s+and\s+data\s+availability|data\s+deposition)\b";

const CAS_HEADINGS: &str = r"^\W*(code\s+availability(\s+statement)?|software\s+availability|availability\s+of\s+(the\s+)?(source\s+)?(code|software)|data\s+and\s+code\s+availability|code\s+and\s+data\s+availability)\b";

const OTHER_HEADINGS: &str = r"^\W*(abstract|introduction|background|methods?|materials\s+and\s+methods|results|discussion|conclusions?|acknowledge?ments?|references|bibliography|funding(\s+statement)?|author\s+contributions?|competing\s+interests?|conflicts?\s+of\s+interest|declaration\s+of\s+interests?|ethics(\s+statement)?|supplementary\s+(information|material)|additional\s+information|abbreviations)\b";

/// Compiled detection vocabularies
#[derive(Debug, Clone)]
pub struct Patterns {
    pub availability: Regex,
    pub field_repository: Regex,
    pub accession: Regex,
    pub general_repository: Regex,
    pub code_host: Regex,
    pub supplement: Regex,
    pub data_words: Regex,
    pub code_words: Regex,
    pub url: Regex,
    pub restricted: Regex,
    pub reuse: Regex,
    pub das_heading: Regex,
    pub cas_heading: Regex,
    pub other_heading: Regex,
}

impl Patterns {
    /// Compile the built-in vocabularies extended with configured terms
    pub fn new(config: &DetectionConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            availability: ci(AVAILABILITY)?,
            field_repository: alternation(FIELD_REPOSITORIES, &config.field_repositories)?,
            accession: ci(ACCESSION_NUMBERS)?,
            general_repository: alternation(GENERAL_REPOSITORIES, &config.general_repositories)?,
            code_host: alternation(CODE_HOSTS, &config.code_hosts)?,
            supplement: ci(SUPPLEMENT)?,
            data_words: ci(DATA_WORDS)?,
            code_words: ci(CODE_WORDS)?,
            url: ci(URL)?,
            restricted: ci(RESTRICTED)?,
            reuse: ci(REUSE)?,
            das_heading: ci(DAS_HEADINGS)?,
            cas_heading: ci(CAS_HEADINGS)?,
            other_heading: ci(OTHER_HEADINGS)?,
        })
    }

    /// Whether a whole line is nothing but a section heading
    pub fn is_heading_line(&self, line: &str) -> bool {
        let trimmed = line.trim().trim_end_matches([':', '.']).trim_end();
        if trimmed.is_empty() {
            return false;
        }
        [&self.das_heading, &self.cas_heading, &self.other_heading]
            .iter()
            .filter_map(|re| re.find(trimmed))
            .any(|m| m.end() == trimmed.len())
    }
}

fn ci(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("(?i){}", pattern))
}

fn alternation(builtin: &[&str], extra: &[String]) -> Result<Regex, regex::Error> {
    let mut parts: Vec<String> = builtin.iter().map(|p| format!("(?:{})", p)).collect();
    parts.extend(
        extra
            .iter()
            .map(|term| term.trim())
            .filter(|term| !term.is_empty())
            .map(literal_term),
    );
    ci(&parts.join("|"))
}

/// Escape a configured term, anchoring on word boundaries only where the term
/// itself starts or ends with a word character
fn literal_term(term: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let lead = if term.starts_with(is_word) { r"\b" } else { "" };
    let tail = if term.ends_with(is_word) { r"\b" } else { "" };
    format!("{}{}{}", lead, regex::escape(term), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> Patterns {
        Patterns::new(&DetectionConfig::default()).unwrap()
    }

    #[test]
    fn test_accession_numbers() {
        let p = patterns();
        assert!(p.accession.is_match("under accession number GSE123456"));
        assert!(p.accession.is_match("BioProject PRJNA552345"));
        assert!(p.accession.is_match("ArrayExpress E-MTAB-1234"));
        assert!(p.accession.is_match("PRIDE PXD012345"));
        assert!(!p.accession.is_match("we used 12345 samples"));
    }

    #[test]
    fn test_restricted_wording() {
        let p = patterns();
        assert!(p.restricted.is_match("Data are available upon reasonable request."));
        assert!(p.restricted.is_match("The data are not publicly available due to privacy."));
        assert!(!p.restricted.is_match("All data are available on Zenodo."));
    }

    #[test]
    fn test_headings() {
        let p = patterns();
        assert!(p.is_heading_line("Data Availability"));
        assert!(p.is_heading_line("Availability of data and materials:"));
        assert!(p.is_heading_line("Code availability"));
        assert!(p.is_heading_line("Acknowledgements"));
        assert!(!p.is_heading_line("Data availability is an important topic"));
        assert!(!p.is_heading_line("Results are shown in Table 1."));
        assert!(p.das_heading.is_match("Data availability: all data are on Dryad."));
        assert!(p.cas_heading.is_match("Code and data availability"));
        assert!(p.das_heading.is_match("Code and data availability"));
    }

    #[test]
    fn test_configured_terms_extend_vocabulary() {
        let config = DetectionConfig {
            field_repositories: vec!["BrainBank".to_string()],
            general_repositories: vec!["Uni Archive (v2)".to_string()],
            code_hosts: vec!["codeberg".to_string(), "  ".to_string()],
        };
        let p = Patterns::new(&config).unwrap();
        assert!(p.field_repository.is_match("deposited in brainbank"));
        assert!(p.general_repository.is_match("see the Uni Archive (v2) record"));
        assert!(p.code_host.is_match("hosted on Codeberg"));
        assert!(!patterns().code_host.is_match("hosted on Codeberg"));
    }
}
