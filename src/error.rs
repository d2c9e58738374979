use thiserror::Error;

#[derive(Error, Debug)]
pub enum PomupError {
    #[error("Invalid version range '{spec}': {reason}")]
    InvalidRange { spec: String, reason: String },

    #[error("Invalid qualifier pattern '{0}': {1}")]
    InvalidQualifierPattern(String, regex::Error),

    #[error("Ambiguous exact match for '{target}': {count} candidates compare equal")]
    AmbiguousExactMatch { target: String, count: usize },

    #[error("Version '{version}' has no segment {segment}")]
    InvalidSegment { version: String, segment: usize },

    #[error("Malformed POM: {0}")]
    MalformedDocument(String),

    #[error("Version metadata retrieval failed for {coordinate}: {reason}")]
    Retrieval { coordinate: String, reason: String },

    #[error("Repository configuration error: {0}")]
    RepositoryConfig(String),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PomupError>;
