use crate::error::{PomupError, Result};
use crate::ordering::token::tokenize;
use crate::ordering::{VersionComparator, alpha_num_increment};
use std::cmp::Ordering;

/// Flat numeric ordering: the version is one sequence of dot-separated
/// atoms with no snapshot or qualifier semantics. Atoms that both parse as
/// integers compare numerically, anything else compares as text.
#[derive(Debug, Default)]
pub struct NumericVersionComparator;

impl VersionComparator for NumericVersionComparator {
    fn name(&self) -> &'static str {
        "numeric"
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        let left = tokenize(a);
        let right = tokenize(b);

        for (l, r) in left.iter().zip(right.iter()) {
            match l.compare(r) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        left.len().cmp(&right.len())
    }

    fn segment_count(&self, version: &str) -> usize {
        tokenize(version).len()
    }

    fn increment_segment(&self, version: &str, segment: usize) -> Result<String> {
        let tokens = tokenize(version);
        if segment >= tokens.len() {
            return Err(PomupError::InvalidSegment {
                version: version.to_string(),
                segment,
            });
        }

        let atoms: Vec<String> = tokens
            .iter()
            .enumerate()
            .map(|(i, token)| {
                if i != segment {
                    return token.as_str().to_string();
                }
                match token.as_number() {
                    Some(n) => (n + 1).to_string(),
                    None => alpha_num_increment(token.as_str()),
                }
            })
            .collect();

        Ok(atoms.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmp(a: &str, b: &str) -> Ordering {
        NumericVersionComparator.compare(a, b)
    }

    #[test]
    fn trailing_numeric_atoms_compare_as_numbers() {
        assert_eq!(cmp("5.1.0.0.24", "5.1.0.0.9"), Ordering::Greater);
    }

    #[test]
    fn non_numeric_atom_falls_back_to_text_order() {
        assert_eq!(cmp("5.1.0.0.2a4", "5.1.0.0.9"), Ordering::Less);
    }

    #[test]
    fn longer_version_wins_a_prefix_tie() {
        assert_eq!(cmp("1.2", "1.2.0"), Ordering::Less);
        assert_eq!(cmp("1", "2"), Ordering::Less);
    }

    #[test]
    fn antisymmetric_over_mixed_atoms() {
        assert_eq!(cmp("5.1.0.0.2a4", "5.1.0.0.9"), cmp("5.1.0.0.9", "5.1.0.0.2a4").reverse());
    }

    #[test]
    fn increments_numeric_and_text_segments() {
        let c = NumericVersionComparator;
        assert_eq!(c.increment_segment("1.2.9", 2).unwrap(), "1.2.10");
        assert_eq!(c.increment_segment("1.2.9a", 2).unwrap(), "1.2.9b");
        assert!(c.increment_segment("1.2", 5).is_err());
    }
}
