use crate::error::Result;
use std::cmp::Ordering;
use std::sync::Arc;

pub mod maven;
pub mod numeric;
pub mod token;

pub use maven::{MavenVersion, MavenVersionComparator, MercuryVersionComparator};
pub use numeric::NumericVersionComparator;

/// Total ordering over version strings. Implementations differ in how a
/// string is segmented and how ties break, but each one is a strict total
/// order consistent with its own `equals`.
pub trait VersionComparator: Send + Sync {
    fn name(&self) -> &'static str;

    fn compare(&self, a: &str, b: &str) -> Ordering;

    fn equals(&self, a: &str, b: &str) -> bool {
        self.compare(a, b) == Ordering::Equal
    }

    /// Number of addressable segments in `version` under this strategy.
    fn segment_count(&self, version: &str) -> usize;

    /// Returns `version` with the given segment incremented, per the
    /// strategy's segment model. Strategies with positional semantics
    /// (major/minor/incremental) also reset the segments to the right.
    fn increment_segment(&self, version: &str, segment: usize) -> Result<String>;
}

/// Resolves a comparator by configuration name. Unrecognised names fall
/// back to the maven-default strategy.
pub fn comparator_for(comparison_method: &str) -> Arc<dyn VersionComparator> {
    if comparison_method.eq_ignore_ascii_case("numeric") {
        Arc::new(NumericVersionComparator)
    } else if comparison_method.eq_ignore_ascii_case("mercury") {
        Arc::new(MercuryVersionComparator)
    } else {
        Arc::new(MavenVersionComparator)
    }
}

/// Increments the rightmost alphanumeric character of `token` with carry:
/// 0-8 and A-Y/a-y step to the next character and stop, 9 wraps to 0 and
/// carries left, Z/z wrap to A/a and carry left. Non-alphanumeric
/// characters are passed over by the carry without changing.
pub fn alpha_num_increment(token: &str) -> String {
    let mut chars: Vec<char> = token.chars().collect();
    for i in (0..chars.len()).rev() {
        match chars[i] {
            c @ ('0'..='8' | 'A'..='Y' | 'a'..='y') => {
                chars[i] = (c as u8 + 1) as char;
                break;
            }
            '9' => chars[i] = '0',
            'Z' => chars[i] = 'A',
            'z' => chars[i] = 'a',
            _ => {}
        }
    }
    chars.into_iter().collect()
}
