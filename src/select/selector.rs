use crate::error::{PomupError, Result};
use crate::ordering::{MavenVersion, VersionComparator};
use crate::select::filter::QualifierFilter;
use crate::select::range::VersionRange;
use regex::Regex;
use std::sync::{Arc, LazyLock};

/// Matches the classic snapshot marker or a timestamped snapshot build
/// such as `1.0-20240131.123456-7`.
static SNAPSHOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)-((SNAPSHOT)|(\d{8}\.\d{6}-\d+))$").unwrap());

pub fn is_snapshot(version: &str) -> bool {
    SNAPSHOT_RE.is_match(version)
}

/// The release version a snapshot is approaching, if `version` is one.
pub fn release_prefix(version: &str) -> Option<&str> {
    SNAPSHOT_RE
        .captures(version)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Decrements the rightmost non-zero component of the
/// (major, minor, incremental) triple, zeroing everything to its right.
/// "0.0.0" is a fixed point; callers must guard against the degenerate
/// window that produces.
pub fn decrement(version: &str) -> String {
    let parsed = MavenVersion::parse(version);
    let (mut major, mut minor, mut incremental) =
        (parsed.major(), parsed.minor(), parsed.incremental());

    if incremental > 0 {
        incremental -= 1;
    } else if minor > 0 {
        minor -= 1;
    } else if major > 0 {
        major -= 1;
    }

    format!("{major}.{minor}.{incremental}")
}

/// One selection query over a read-only candidate set. The candidate set
/// is never mutated and selection is purely functional, so re-running the
/// same request yields the same answer.
#[derive(Debug, Default)]
pub struct SelectionRequest<'a> {
    /// Version the caller wants an exact (comparator-relative) match for.
    pub exact_target: Option<&'a str>,
    /// When the exact target misses, search the `(decrement(target), target)`
    /// window for qualified pre-releases of the target.
    pub accept_qualified: bool,
    pub range: Option<&'a VersionRange>,
    pub qualifier_filter: Option<&'a QualifierFilter>,
    pub allow_snapshots: bool,
}

pub struct Selector {
    comparator: Arc<dyn VersionComparator>,
}

impl Selector {
    pub fn new(comparator: Arc<dyn VersionComparator>) -> Self {
        Self { comparator }
    }

    pub fn comparator(&self) -> &dyn VersionComparator {
        self.comparator.as_ref()
    }

    /// Resolves one request against the candidate set. A miss is a normal
    /// `None`; only an ambiguous exact match or an invalid configuration
    /// is an error.
    pub fn select(
        &self,
        candidates: &[String],
        request: &SelectionRequest<'_>,
    ) -> Result<Option<String>> {
        if let Some(target) = request.exact_target {
            let matches: Vec<&String> = candidates
                .iter()
                .filter(|c| self.comparator.equals(c, target))
                .collect();
            match matches.len() {
                1 => return Ok(Some(matches[0].clone())),
                0 => {}
                n => {
                    return Err(PomupError::AmbiguousExactMatch {
                        target: target.to_string(),
                        count: n,
                    });
                }
            }

            if !request.accept_qualified {
                return Ok(None);
            }
            let approached = MavenVersion::parse(target);
            if !approached.is_bare_release() {
                return Ok(None);
            }
            return Ok(self.select_qualified(candidates, target, request.qualifier_filter));
        }

        Ok(self.newest(candidates, request))
    }

    /// Qualified-release window: strictly above the decremented target and
    /// strictly below the target itself, so "2.0.0" admits "2.0.0-beta"
    /// while excluding both "1.0.0" and "2.0.0".
    pub fn select_qualified(
        &self,
        candidates: &[String],
        target: &str,
        filter: Option<&QualifierFilter>,
    ) -> Option<String> {
        let prefix = MavenVersion::parse(target).numeric_prefix();
        let lower = decrement(&prefix);
        if self.comparator.equals(&lower, &prefix) {
            return None;
        }
        // Bounds come from a decrement, so the between() check cannot fail.
        let window = VersionRange::between(
            Some(&lower),
            false,
            Some(&prefix),
            false,
            self.comparator.as_ref(),
        )
        .ok()?;

        let request = SelectionRequest {
            range: Some(&window),
            qualifier_filter: filter,
            allow_snapshots: false,
            ..SelectionRequest::default()
        };
        self.newest(candidates, &request)
    }

    fn newest(&self, candidates: &[String], request: &SelectionRequest<'_>) -> Option<String> {
        let mut survivors: Vec<&String> = candidates
            .iter()
            .filter(|c| {
                request
                    .range
                    .is_none_or(|r| r.contains(c, self.comparator.as_ref()))
            })
            .filter(|c| request.allow_snapshots || !is_snapshot(c))
            .filter(|c| {
                request.qualifier_filter.is_none_or(|f| {
                    let parsed = MavenVersion::parse(c);
                    f.matches(parsed.qualifier().unwrap_or(""))
                })
            })
            .collect();

        survivors.sort_by(|a, b| self.comparator.compare(a, b));
        survivors.pop().cloned()
    }
}
