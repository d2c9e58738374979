use crate::error::Result;
use std::fmt;

/// The (group, artifact) identity a version string belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
}

impl Coordinate {
    pub fn new(group: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
        }
    }

    /// Parses `group:artifact` (a trailing `:version` part is tolerated
    /// and ignored).
    pub fn parse(coordinate: &str) -> Option<Self> {
        let parts: Vec<&str> = coordinate.split(':').collect();
        match parts.len() {
            2 | 3 => Some(Self::new(parts[0], parts[1])),
            _ => None,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)
    }
}

/// External artifact-metadata collaborator. Implementations return the
/// discovery-ordered set of known version strings for one coordinate;
/// retrieval failures are surfaced as errors, never flattened into an
/// empty set.
pub trait RepositoryClient: Send + Sync {
    fn fetch_known_versions(&self, coordinate: &Coordinate) -> Result<Vec<String>>;
}
