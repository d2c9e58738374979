use crate::error::{PomupError, Result};
use regex::Regex;

/// Include/exclude patterns evaluated against the qualifier component of a
/// candidate version. Patterns are anchored (`^…$`); an exclude always wins
/// over an include, and an empty include list admits every qualifier that
/// is not excluded.
#[derive(Debug, Default)]
pub struct QualifierFilter {
    includes: Vec<Regex>,
    excludes: Vec<Regex>,
}

impl QualifierFilter {
    pub fn new(includes: &[String], excludes: &[String]) -> Result<Self> {
        Ok(QualifierFilter {
            includes: Self::compile(includes)?,
            excludes: Self::compile(excludes)?,
        })
    }

    /// Builds a filter from comma-separated pattern lists as they arrive
    /// from the command line. Whitespace inside a list is stripped.
    pub fn from_lists(includes: Option<&str>, excludes: Option<&str>) -> Result<Self> {
        Self::new(&Self::split(includes), &Self::split(excludes))
    }

    fn split(list: Option<&str>) -> Vec<String> {
        list.map(|l| {
            l.split(',')
                .map(|p| p.chars().filter(|c| !c.is_whitespace()).collect::<String>())
                .filter(|p| !p.is_empty())
                .collect()
        })
        .unwrap_or_default()
    }

    fn compile(patterns: &[String]) -> Result<Vec<Regex>> {
        patterns
            .iter()
            .map(|p| {
                // Grouped so alternations stay anchored as a whole.
                Regex::new(&format!("^(?:{p})$"))
                    .map_err(|e| PomupError::InvalidQualifierPattern(p.clone(), e))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }

    pub fn matches(&self, qualifier: &str) -> bool {
        if self.excludes.iter().any(|e| e.is_match(qualifier)) {
            return false;
        }
        if self.includes.is_empty() {
            return true;
        }
        self.includes.iter().any(|i| i.is_match(qualifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_matches_everything() {
        let filter = QualifierFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches("alpha"));
        assert!(filter.matches(""));
    }

    #[test]
    fn includes_admit_only_matching_qualifiers() {
        let filter = QualifierFilter::from_lists(Some("alpha|beta"), None).unwrap();
        assert!(filter.matches("alpha"));
        assert!(filter.matches("beta"));
        assert!(!filter.matches("rc"));
        assert!(!filter.matches("alphabet"));
    }

    #[test]
    fn exclude_wins_over_include() {
        let filter = QualifierFilter::from_lists(Some("alpha,beta"), Some("beta")).unwrap();
        assert!(filter.matches("alpha"));
        assert!(!filter.matches("beta"));
    }

    #[test]
    fn list_whitespace_is_stripped() {
        let filter = QualifierFilter::from_lists(Some(" alpha , beta "), None).unwrap();
        assert!(filter.matches("alpha"));
        assert!(filter.matches("beta"));
    }

    #[test]
    fn invalid_pattern_fails_at_construction() {
        let err = QualifierFilter::from_lists(Some("["), None).unwrap_err();
        assert!(matches!(err, PomupError::InvalidQualifierPattern(..)));
    }
}
