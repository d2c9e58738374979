use crate::error::{PomupError, Result};
use crate::ordering::VersionComparator;
use std::cmp::Ordering;
use std::fmt;

/// A version interval with independently inclusive/exclusive bounds,
/// parsed from the textual syntax `[lower,upper)`, `(,upper]`, `[exact]`
/// and so on. Either bound may be open-ended.
///
/// Construction validates that lower <= upper under the comparator the
/// range will be queried with; a reversed range is a configuration error,
/// never silently swapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    lower: Option<String>,
    lower_inclusive: bool,
    upper: Option<String>,
    upper_inclusive: bool,
}

impl VersionRange {
    /// Single exact-match point `[version,version]`.
    pub fn exact(version: &str) -> Self {
        VersionRange {
            lower: Some(version.to_string()),
            lower_inclusive: true,
            upper: Some(version.to_string()),
            upper_inclusive: true,
        }
    }

    pub fn between(
        lower: Option<&str>,
        lower_inclusive: bool,
        upper: Option<&str>,
        upper_inclusive: bool,
        comparator: &dyn VersionComparator,
    ) -> Result<Self> {
        if let (Some(lo), Some(hi)) = (lower, upper)
            && comparator.compare(lo, hi) == Ordering::Greater
        {
            return Err(PomupError::InvalidRange {
                spec: format!("[{lo},{hi}]"),
                reason: "lower bound is greater than upper bound".to_string(),
            });
        }
        Ok(VersionRange {
            lower: lower.map(str::to_string),
            lower_inclusive,
            upper: upper.map(str::to_string),
            upper_inclusive,
        })
    }

    /// Parses the bracket interval syntax. `[` / `]` are inclusive,
    /// `(` / `)` exclusive; `[1.0]` is an exact point.
    pub fn parse(spec: &str, comparator: &dyn VersionComparator) -> Result<Self> {
        let invalid = |reason: &str| PomupError::InvalidRange {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = spec.trim();
        let mut chars = trimmed.chars();
        let lower_inclusive = match chars.next() {
            Some('[') => true,
            Some('(') => false,
            _ => return Err(invalid("range must start with '[' or '('")),
        };
        let upper_inclusive = match chars.next_back() {
            Some(']') => true,
            Some(')') => false,
            _ => return Err(invalid("range must end with ']' or ')'")),
        };

        let body = &trimmed[1..trimmed.len() - 1];
        match body.split_once(',') {
            None => {
                if body.is_empty() {
                    return Err(invalid("empty range"));
                }
                if !(lower_inclusive && upper_inclusive) {
                    return Err(invalid("an exact point must use '[version]'"));
                }
                Ok(Self::exact(body.trim()))
            }
            Some((lo, hi)) => {
                let lo = lo.trim();
                let hi = hi.trim();
                Self::between(
                    (!lo.is_empty()).then_some(lo),
                    lower_inclusive,
                    (!hi.is_empty()).then_some(hi),
                    upper_inclusive,
                    comparator,
                )
            }
        }
    }

    pub fn contains(&self, version: &str, comparator: &dyn VersionComparator) -> bool {
        if let Some(lower) = &self.lower {
            match comparator.compare(version, lower) {
                Ordering::Less => return false,
                Ordering::Equal if !self.lower_inclusive => return false,
                _ => {}
            }
        }
        if let Some(upper) = &self.upper {
            match comparator.compare(version, upper) {
                Ordering::Greater => return false,
                Ordering::Equal if !self.upper_inclusive => return false,
                _ => {}
            }
        }
        true
    }

    pub fn lower(&self) -> Option<&str> {
        self.lower.as_deref()
    }

    pub fn upper(&self) -> Option<&str> {
        self.upper.as_deref()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{},{}{}",
            if self.lower_inclusive { '[' } else { '(' },
            self.lower.as_deref().unwrap_or(""),
            self.upper.as_deref().unwrap_or(""),
            if self.upper_inclusive { ']' } else { ')' },
        )
    }
}
