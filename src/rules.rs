//! Filename pattern rules that take precedence over extension lookup.
//!
//! Rules are evaluated in the fixed order of [`RULE_ORDER`]; the first one
//! that matches decides the category. All matching is done on the
//! lowercased filename, never on file contents.

use crate::config::ConfigError;
use crate::file_category::Category;
use regex::{Regex, RegexBuilder};

/// A filename rule with a fixed destination category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Resume,
    Tax,
    Screenshot,
}

/// Rule priority. Resume beats Tax beats Screenshot.
pub const RULE_ORDER: [RuleKind; 3] = [RuleKind::Resume, RuleKind::Tax, RuleKind::Screenshot];

impl RuleKind {
    /// The category a file lands in when this rule matches.
    pub fn category(&self) -> Category {
        match self {
            RuleKind::Resume => Category::Resumes,
            RuleKind::Tax => Category::TaxDocuments,
            RuleKind::Screenshot => Category::Screenshots,
        }
    }
}

const RESUME_TOKENS: &[&str] = &["resume", "résumé", "cv"];

/// Years accepted by the tax rule, inclusive.
pub const TAX_YEARS: std::ops::RangeInclusive<u32> = 2020..=2030;

/// State codes recognized by the tax rule. Codes that are also common
/// English words (`in`, `or`, `me`, `hi`, `ok`, `oh`, `de`, `la`) are left
/// out, as are states without a personal income tax.
const STATE_CODES: &[&str] = &[
    "al", "ar", "az", "ca", "co", "ct", "dc", "ga", "ia", "id", "il", "ks", "ky", "ma", "md", "mi",
    "mn", "mo", "ms", "mt", "nc", "nd", "ne", "nj", "nm", "ny", "pa", "ri", "sc", "ut", "va", "vt",
    "wi", "wv",
];

/// Tax keywords matched as substrings.
const TAX_KEYWORDS: &[&str] = &["tax", "federal", "1040", "1099", "w2", "w-2"];

/// Tax keywords matched only as whole tokens (`state` would otherwise hit
/// `statement`).
const TAX_TOKEN_KEYWORDS: &[&str] = &["state"];

const SCREENSHOT_SUBSTRINGS: &[&str] = &["capture", "scr "];

/// `screenshot`, `screen shot`, `screen_shot` and `screen-shot`, which
/// includes the macOS `Screenshot 2023-01-05 at 10.30.15` naming.
const SCREENSHOT_WORDS: &str = r"screen[ _-]?shot";

/// Compiled filename rules.
#[derive(Debug, Clone)]
pub struct NameRules {
    name_patterns: Vec<Regex>,
    screenshot_words: Regex,
    digit_run: Regex,
}

impl NameRules {
    /// Compiles the rules.
    ///
    /// `name_patterns` are case-insensitive regexes for the owner's name.
    /// When the list is empty the resume rule matches on the resume token
    /// alone; otherwise one of the patterns must match too.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRegexPattern` if a name pattern does not
    /// compile.
    pub fn new(name_patterns: &[String]) -> Result<Self, ConfigError> {
        let name_patterns = name_patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| ConfigError::InvalidRegexPattern {
                        pattern: pattern.clone(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name_patterns,
            ..Self::default()
        })
    }

    /// Returns the first rule in priority order that matches `filename`.
    pub fn first_match(&self, filename: &str) -> Option<RuleKind> {
        let lower = filename.to_lowercase();
        RULE_ORDER
            .into_iter()
            .find(|kind| self.matches_lower(*kind, &lower))
    }

    /// Checks a single rule against `filename`.
    pub fn matches(&self, kind: RuleKind, filename: &str) -> bool {
        self.matches_lower(kind, &filename.to_lowercase())
    }

    fn matches_lower(&self, kind: RuleKind, lower: &str) -> bool {
        match kind {
            RuleKind::Resume => self.is_resume(lower),
            RuleKind::Tax => self.is_tax_document(lower),
            RuleKind::Screenshot => self.is_screenshot(lower),
        }
    }

    fn is_resume(&self, lower: &str) -> bool {
        if !tokens(lower).any(|t| RESUME_TOKENS.contains(&t)) {
            return false;
        }
        if self.name_patterns.is_empty() {
            return true;
        }
        let cleaned: String = lower
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect();
        self.name_patterns
            .iter()
            .any(|re| re.is_match(lower) || re.is_match(&cleaned))
    }

    fn is_tax_document(&self, lower: &str) -> bool {
        let has_year = self
            .digit_run
            .find_iter(lower)
            .filter_map(|m| leading_year(m.as_str()))
            .any(|year| TAX_YEARS.contains(&year));
        if !has_year {
            return false;
        }

        let has_state = tokens(lower).any(|t| STATE_CODES.contains(&t));
        let has_keyword = TAX_KEYWORDS.iter().any(|k| lower.contains(k))
            || tokens(lower).any(|t| TAX_TOKEN_KEYWORDS.contains(&t));
        has_state || has_keyword
    }

    fn is_screenshot(&self, lower: &str) -> bool {
        self.screenshot_words.is_match(lower)
            || SCREENSHOT_SUBSTRINGS.iter().any(|p| lower.contains(p))
    }
}

impl Default for NameRules {
    fn default() -> Self {
        Self {
            name_patterns: Vec::new(),
            screenshot_words: Regex::new(SCREENSHOT_WORDS).expect("static regex"),
            digit_run: Regex::new(r"\d+").expect("static regex"),
        }
    }
}

/// The year carried by a run of digits: the whole run when it is four
/// digits long, or its first four digits for a `YYYYMMDD` date.
fn leading_year(digits: &str) -> Option<u32> {
    match digits.len() {
        4 | 8 => digits[..4].parse().ok(),
        _ => None,
    }
}

/// Splits a name into runs of letters.
fn tokens(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| !c.is_alphabetic())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> NameRules {
        NameRules::default()
    }

    #[test]
    fn test_resume_token() {
        let r = rules();
        assert!(r.matches(RuleKind::Resume, "resume_john_2024.pdf"));
        assert!(r.matches(RuleKind::Resume, "John Doe CV.docx"));
        assert!(r.matches(RuleKind::Resume, "RESUME.pdf"));
        assert!(!r.matches(RuleKind::Resume, "cvs_receipt.pdf"));
        assert!(!r.matches(RuleKind::Resume, "recv_log.txt"));
    }

    #[test]
    fn test_resume_requires_configured_name() {
        let r = NameRules::new(&["ibrahim".to_string(), "samia".to_string()]).unwrap();
        assert!(r.matches(RuleKind::Resume, "Samia_Resume.pdf"));
        assert!(r.matches(RuleKind::Resume, "cv-ibra-him.pdf"));
        assert!(!r.matches(RuleKind::Resume, "resume_john_2024.pdf"));
    }

    #[test]
    fn test_invalid_name_pattern() {
        let result = NameRules::new(&["(unclosed".to_string()]);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidRegexPattern { .. })
        ));
    }

    #[test]
    fn test_tax_with_state_code() {
        let r = rules();
        assert!(r.matches(RuleKind::Tax, "ca_tax_2023.pdf"));
        assert!(r.matches(RuleKind::Tax, "MN 2021 return.pdf"));
        assert!(!r.matches(RuleKind::Tax, "mnemonic_2021.txt"));
    }

    #[test]
    fn test_tax_with_keyword() {
        let r = rules();
        assert!(r.matches(RuleKind::Tax, "w2_2022.pdf"));
        assert!(r.matches(RuleKind::Tax, "Form-1040-2024.pdf"));
        assert!(r.matches(RuleKind::Tax, "federal 2025.pdf"));
        assert!(r.matches(RuleKind::Tax, "state_2020.pdf"));
        assert!(!r.matches(RuleKind::Tax, "bank_statement_2024.pdf"));
    }

    #[test]
    fn test_tax_year_bounds() {
        let r = rules();
        assert!(r.matches(RuleKind::Tax, "tax_2030.pdf"));
        assert!(!r.matches(RuleKind::Tax, "tax_2019.pdf"));
        assert!(!r.matches(RuleKind::Tax, "tax_2031.pdf"));
        assert!(!r.matches(RuleKind::Tax, "tax_120225.pdf"));
        assert!(!r.matches(RuleKind::Tax, "tax_202401311.pdf"));
        assert!(!r.matches(RuleKind::Tax, "taxes.pdf"));
    }

    #[test]
    fn test_tax_year_inside_compact_date() {
        let r = rules();
        assert!(r.matches(RuleKind::Tax, "1099-INT_20240131.pdf"));
        assert!(r.matches(RuleKind::Tax, "tax_statement_20230415.pdf"));
        assert!(!r.matches(RuleKind::Tax, "tax_20190415.pdf"));
        assert!(!r.matches(RuleKind::Tax, "invoice_20240131.pdf"));
    }

    #[test]
    fn test_leading_year() {
        assert_eq!(leading_year("2024"), Some(2024));
        assert_eq!(leading_year("20240131"), Some(2024));
        assert_eq!(leading_year("120225"), None);
        assert_eq!(leading_year("99"), None);
    }

    #[test]
    fn test_screenshot_patterns() {
        let r = rules();
        assert!(r.matches(RuleKind::Screenshot, "Screenshot 2023-01-05 at 10.30.15.png"));
        assert!(r.matches(RuleKind::Screenshot, "Screen Shot 2019-11-02 at 9.01.44 PM.png"));
        assert!(r.matches(RuleKind::Screenshot, "screen_shot_final.png"));
        assert!(r.matches(RuleKind::Screenshot, "Screen-Shot-2020-02-02.png"));
        assert!(r.matches(RuleKind::Screenshot, "scr 12.png"));
        assert!(r.matches(RuleKind::Screenshot, "Capture.PNG"));
        assert!(!r.matches(RuleKind::Screenshot, "photo.png"));
    }

    #[test]
    fn test_resume_precedes_tax() {
        let r = rules();
        assert_eq!(r.first_match("resume_tax_2023.pdf"), Some(RuleKind::Resume));
        assert_eq!(r.first_match("ca_tax_2023.pdf"), Some(RuleKind::Tax));
    }

    #[test]
    fn test_tax_precedes_screenshot() {
        let r = rules();
        assert_eq!(
            r.first_match("tax screenshot 2023.png"),
            Some(RuleKind::Tax)
        );
    }

    #[test]
    fn test_no_rule_matches() {
        assert_eq!(rules().first_match("report.xlsx"), None);
    }

    #[test]
    fn test_rule_categories() {
        assert_eq!(RuleKind::Resume.category(), Category::Resumes);
        assert_eq!(RuleKind::Tax.category(), Category::TaxDocuments);
        assert_eq!(RuleKind::Screenshot.category(), Category::Screenshots);
    }
}
