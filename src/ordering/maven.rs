use crate::error::{PomupError, Result};
use crate::ordering::{VersionComparator, alpha_num_increment};
use std::cmp::Ordering;

/// Parsed form of a Maven-style version string:
/// `major[.minor[.incremental]][-buildNumber|-qualifier]`.
///
/// Strings that do not fit the numeric grammar (empty atoms, more than
/// three atoms, non-numeric atoms) degrade to a qualifier-only version, the
/// same fallback the classic artifact-version parser uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenVersion {
    major: u64,
    minor: u64,
    incremental: u64,
    build_number: u64,
    qualifier: Option<String>,
    /// How many numeric atoms were spelled out (0 for qualifier-only).
    explicit_segments: usize,
}

impl MavenVersion {
    pub fn parse(version: &str) -> Self {
        let (number_part, suffix) = match version.split_once('-') {
            Some((head, tail)) => (head, Some(tail)),
            None => (version, None),
        };

        let mut build_number = 0u64;
        let mut qualifier = None;
        if let Some(suffix) = suffix {
            match suffix.parse::<u64>() {
                Ok(n) if !suffix.is_empty() => build_number = n,
                _ => qualifier = Some(suffix.to_string()),
            }
        }

        let atoms: Vec<&str> = number_part.split('.').collect();
        if atoms.len() > 3 || atoms.iter().any(|a| a.is_empty() || a.parse::<u64>().is_err()) {
            return Self::qualifier_only(version);
        }

        let mut numbers = atoms.iter().map(|a| a.parse::<u64>().unwrap_or(0));
        MavenVersion {
            major: numbers.next().unwrap_or(0),
            minor: numbers.next().unwrap_or(0),
            incremental: numbers.next().unwrap_or(0),
            build_number,
            qualifier,
            explicit_segments: atoms.len(),
        }
    }

    fn qualifier_only(version: &str) -> Self {
        MavenVersion {
            major: 0,
            minor: 0,
            incremental: 0,
            build_number: 0,
            qualifier: Some(version.to_string()),
            explicit_segments: 0,
        }
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn incremental(&self) -> u64 {
        self.incremental
    }

    pub fn build_number(&self) -> u64 {
        self.build_number
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub fn is_qualifier_only(&self) -> bool {
        self.explicit_segments == 0
    }

    /// True for a plain release: no qualifier and no build number.
    pub fn is_bare_release(&self) -> bool {
        self.qualifier.is_none() && self.build_number == 0 && self.explicit_segments > 0
    }

    /// The numeric prefix rendered with the original segment count
    /// ("2.0.0-beta" -> "2.0.0", "1-SNAPSHOT" -> "1").
    pub fn numeric_prefix(&self) -> String {
        let parts = [self.major, self.minor, self.incremental];
        parts[..self.explicit_segments.max(1)]
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Rank of a qualifier in the fixed ordering table. Release (no qualifier)
/// sits at `RELEASE_RANK`; only "sp" outranks it. Qualifiers outside the
/// table share the lowest bucket and fall back to lexical order among
/// themselves.
const RELEASE_RANK: u8 = 6;
const UNKNOWN_RANK: u8 = 0;

fn qualifier_rank(qualifier: Option<&str>) -> u8 {
    let Some(q) = qualifier else {
        return RELEASE_RANK;
    };
    match q.to_ascii_lowercase().as_str() {
        "alpha" => 1,
        "beta" => 2,
        "milestone" => 3,
        "rc" | "cr" => 4,
        "snapshot" => 5,
        "sp" => 7,
        _ => UNKNOWN_RANK,
    }
}

fn compare_qualifiers(a: Option<&str>, b: Option<&str>) -> Ordering {
    let (rank_a, rank_b) = (qualifier_rank(a), qualifier_rank(b));
    match rank_a.cmp(&rank_b) {
        Ordering::Equal if rank_a == UNKNOWN_RANK => {
            // Both outside the table: lexical, still below everything known.
            a.unwrap_or("").cmp(b.unwrap_or(""))
        }
        other => other,
    }
}

/// Shared segment-model comparison. `shorter_is_newer` selects the tie-break
/// applied when everything else is equal: the maven-default order ranks "1"
/// above "1.0", the mercury order ranks a missing segment below a zero one.
fn compare_parsed(a: &MavenVersion, b: &MavenVersion, shorter_is_newer: bool) -> Ordering {
    a.major
        .cmp(&b.major)
        .then(a.minor.cmp(&b.minor))
        .then(a.incremental.cmp(&b.incremental))
        .then_with(|| compare_qualifiers(a.qualifier(), b.qualifier()))
        .then(a.build_number.cmp(&b.build_number))
        .then_with(|| {
            let by_len = a.explicit_segments.cmp(&b.explicit_segments);
            if shorter_is_newer { by_len.reverse() } else { by_len }
        })
}

fn increment_parsed(version: &str, segment: usize) -> Result<String> {
    let parsed = MavenVersion::parse(version);
    if parsed.is_qualifier_only() {
        if segment != 0 {
            return Err(PomupError::InvalidSegment {
                version: version.to_string(),
                segment,
            });
        }
        return Ok(alpha_num_increment(version));
    }
    if segment >= parsed.explicit_segments {
        return Err(PomupError::InvalidSegment {
            version: version.to_string(),
            segment,
        });
    }

    let mut parts = [parsed.major, parsed.minor, parsed.incremental];
    parts[segment] += 1;
    for part in parts.iter_mut().take(parsed.explicit_segments).skip(segment + 1) {
        *part = 0;
    }
    Ok(parts[..parsed.explicit_segments]
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join("."))
}

fn parsed_segment_count(version: &str) -> usize {
    let parsed = MavenVersion::parse(version);
    if parsed.is_qualifier_only() {
        1
    } else {
        parsed.explicit_segments
    }
}

/// Default strategy: full segment model with the qualifier rank table and
/// the "1" > "1.0" short-version policy.
#[derive(Debug, Default)]
pub struct MavenVersionComparator;

impl VersionComparator for MavenVersionComparator {
    fn name(&self) -> &'static str {
        "maven"
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        compare_parsed(&MavenVersion::parse(a), &MavenVersion::parse(b), true)
    }

    fn segment_count(&self, version: &str) -> usize {
        parsed_segment_count(version)
    }

    fn increment_segment(&self, version: &str, segment: usize) -> Result<String> {
        increment_parsed(version, segment)
    }
}

/// Extended strategy for metadata-rich repositories: identical segment model
/// but a missing trailing segment sorts below an explicit zero, so
/// "1" < "1.0".
#[derive(Debug, Default)]
pub struct MercuryVersionComparator;

impl VersionComparator for MercuryVersionComparator {
    fn name(&self) -> &'static str {
        "mercury"
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        compare_parsed(&MavenVersion::parse(a), &MavenVersion::parse(b), false)
    }

    fn segment_count(&self, version: &str) -> usize {
        parsed_segment_count(version)
    }

    fn increment_segment(&self, version: &str, segment: usize) -> Result<String> {
        increment_parsed(version, segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maven(a: &str, b: &str) -> Ordering {
        MavenVersionComparator.compare(a, b)
    }

    fn mercury(a: &str, b: &str) -> Ordering {
        MercuryVersionComparator.compare(a, b)
    }

    #[test]
    fn parses_numeric_triples() {
        let v = MavenVersion::parse("2.1.3");
        assert_eq!((v.major(), v.minor(), v.incremental()), (2, 1, 3));
        assert!(v.is_bare_release());
    }

    #[test]
    fn parses_build_number_and_qualifier() {
        let with_build = MavenVersion::parse("1.0-2");
        assert_eq!(with_build.build_number(), 2);
        assert!(with_build.qualifier().is_none());

        let with_qualifier = MavenVersion::parse("2.0.0-beta");
        assert_eq!(with_qualifier.qualifier(), Some("beta"));
        assert_eq!(with_qualifier.numeric_prefix(), "2.0.0");
    }

    #[test]
    fn unparsable_version_degrades_to_qualifier_only() {
        let v = MavenVersion::parse("1.2.3.4");
        assert!(v.is_qualifier_only());
        assert_eq!(v.qualifier(), Some("1.2.3.4"));
    }

    #[test]
    fn identical_versions_are_equal() {
        assert_eq!(maven("1", "1"), Ordering::Equal);
        assert_eq!(maven("1.0-beta", "1.0-beta"), Ordering::Equal);
    }

    #[test]
    fn release_outranks_its_own_snapshot() {
        assert_eq!(maven("1", "1-SNAPSHOT"), Ordering::Greater);
        assert_eq!(maven("2.0.0-SNAPSHOT", "2.0.0"), Ordering::Less);
    }

    #[test]
    fn shorter_release_outranks_explicit_zero() {
        assert_eq!(maven("1", "1.0"), Ordering::Greater);
        assert_eq!(maven("1.0", "1"), Ordering::Less);
    }

    #[test]
    fn higher_minor_wins_regardless_of_length() {
        assert_eq!(maven("1.1", "1"), Ordering::Greater);
        assert_eq!(maven("1", "2"), Ordering::Less);
    }

    #[test]
    fn qualifier_table_order() {
        let ladder = [
            "1-alpha",
            "1-beta",
            "1-milestone",
            "1-rc",
            "1-SNAPSHOT",
            "1",
            "1-sp",
        ];
        for pair in ladder.windows(2) {
            assert_eq!(
                maven(pair[0], pair[1]),
                Ordering::Less,
                "{} should sort below {}",
                pair[0],
                pair[1]
            );
        }
        assert_eq!(maven("1-rc", "1-cr"), Ordering::Equal);
    }

    #[test]
    fn unknown_qualifiers_sort_below_release_and_lexically() {
        assert_eq!(maven("1-zeta", "1"), Ordering::Less);
        assert_eq!(maven("1-zeta", "1-SNAPSHOT"), Ordering::Less);
        assert_eq!(maven("1-custom", "1-zeta"), Ordering::Less);
    }

    #[test]
    fn build_numbers_compare_numerically() {
        assert_eq!(maven("1.0-2", "1.0"), Ordering::Greater);
        assert_eq!(maven("1.0-2", "1.0-10"), Ordering::Less);
    }

    #[test]
    fn mercury_reverses_the_length_tie_break_only() {
        assert_eq!(mercury("1", "1.0"), Ordering::Less);
        assert_eq!(mercury("1", "1-SNAPSHOT"), Ordering::Greater);
        assert_eq!(mercury("1.1", "1"), Ordering::Greater);
    }

    #[test]
    fn antisymmetry_over_a_corpus() {
        let corpus = [
            "1", "1.0", "1.1", "2", "1-SNAPSHOT", "1-alpha", "1-sp", "1.0-2", "1-zzz", "1.2.3.4",
        ];
        for a in &corpus {
            for b in &corpus {
                assert_eq!(maven(a, b), maven(b, a).reverse(), "{a} vs {b}");
                assert_eq!(mercury(a, b), mercury(b, a).reverse(), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn transitivity_over_a_corpus() {
        let corpus = [
            "1", "1.0", "1.1", "2", "1-SNAPSHOT", "1-alpha", "1-sp", "1.0-2", "1-zzz",
        ];
        for a in &corpus {
            for b in &corpus {
                for c in &corpus {
                    if maven(a, b) == Ordering::Less && maven(b, c) == Ordering::Less {
                        assert_eq!(maven(a, c), Ordering::Less, "{a} < {b} < {c}");
                    }
                }
            }
        }
    }

    #[test]
    fn increments_the_requested_segment_and_zeroes_the_rest() {
        let c = MavenVersionComparator;
        assert_eq!(c.increment_segment("1.2.3", 1).unwrap(), "1.3.0");
        assert_eq!(c.increment_segment("1.2.3", 0).unwrap(), "2.0.0");
        assert_eq!(c.increment_segment("1.2", 1).unwrap(), "1.3");
        assert!(c.increment_segment("1.2", 2).is_err());
    }
}
