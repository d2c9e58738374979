use std::cmp::Ordering;

/// One dot-delimited atom of a version string.
///
/// An atom keeps its raw spelling so that non-numeric comparisons stay
/// faithful to the original text (`"09"` and `"9"` are different strings
/// even though they parse to the same number).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    raw: String,
    numeric: Option<u64>,
}

impl Token {
    pub fn parse(atom: &str) -> Self {
        Token {
            raw: atom.to_string(),
            numeric: atom.parse::<u64>().ok(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn as_number(&self) -> Option<u64> {
        self.numeric
    }

    /// Numeric comparison when both atoms parse as integers, otherwise
    /// case-sensitive code-point comparison of the raw text.
    pub fn compare(&self, other: &Token) -> Ordering {
        match (self.numeric, other.numeric) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => self.raw.cmp(&other.raw),
        }
    }
}

/// Splits a version string on `.` into comparable atoms.
pub fn tokenize(version: &str) -> Vec<Token> {
    version.split('.').map(Token::parse).collect()
}
