use crate::error::{PomupError, Result};
use crate::repository::{Coordinate, RepositoryClient};
use quick_xml::de::from_str;
use regex::Regex;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;
use url::Url;

const DEFAULT_MAVEN_CENTRAL: &str = "https://repo1.maven.org/maven2";
const MAX_METADATA_BYTES: usize = 10 * 1024 * 1024;

/// One remote repository to query for `maven-metadata.xml`, optionally
/// restricted to groups matching any of the regex filters.
#[derive(Debug, Clone)]
pub struct RemoteRepository {
    pub name: String,
    pub url: String,
    pub group_filters: Vec<String>,
}

impl RemoteRepository {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            group_filters: Vec::new(),
        }
    }
}

/// Maven repository client: resolves a coordinate's known version set by
/// fetching and decoding its `maven-metadata.xml`.
pub struct MavenRepository {
    client: Client,
    repositories: Vec<RemoteRepository>,
}

impl MavenRepository {
    pub fn new() -> Result<Self> {
        Self::with_repositories(Vec::new())
    }

    pub fn with_repositories(repositories: Vec<RemoteRepository>) -> Result<Self> {
        let client = Self::build_client()?;
        let repositories = if repositories.is_empty() {
            vec![RemoteRepository::new("Maven Central", DEFAULT_MAVEN_CENTRAL)]
        } else {
            repositories
        };

        for repo in &repositories {
            Self::validate_repository_url(&repo.url)?;
        }

        Ok(Self {
            client,
            repositories,
        })
    }

    fn build_client() -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("pomup")
            .danger_accept_invalid_certs(false)
            .build()
            .map_err(|e| PomupError::Io(std::io::Error::other(e)))
    }

    fn matches_filters(group: &str, filters: &[String]) -> bool {
        filters.iter().any(|pattern| {
            Regex::new(pattern)
                .map(|re| re.is_match(group))
                .unwrap_or(false)
        })
    }

    /// Asks each configured repository in order and returns the version
    /// list of the first one that knows the coordinate. A repository that
    /// simply does not host the artifact (404) is skipped; transport and
    /// decoding failures abort the lookup so the caller sees them.
    fn fetch_versions(&self, coordinate: &Coordinate) -> Result<Vec<String>> {
        for repo in &self.repositories {
            if !repo.group_filters.is_empty()
                && !Self::matches_filters(&coordinate.group, &repo.group_filters)
            {
                continue;
            }
            if let Some(versions) = self.fetch_from_repository(&repo.url, coordinate)? {
                return Ok(versions);
            }
        }
        Ok(Vec::new())
    }

    fn fetch_from_repository(
        &self,
        repo_url: &str,
        coordinate: &Coordinate,
    ) -> Result<Option<Vec<String>>> {
        let group_path = coordinate.group.replace('.', "/");
        let metadata_url = format!(
            "{}/{}/{}/maven-metadata.xml",
            repo_url, group_path, coordinate.artifact
        );

        if std::env::var("POMUP_VERBOSE").is_ok() {
            eprintln!("[VERBOSE] Fetching: {}", metadata_url);
        }

        let retrieval = |reason: String| PomupError::Retrieval {
            coordinate: coordinate.to_string(),
            reason,
        };

        let response = self
            .client
            .get(&metadata_url)
            .send()
            .map_err(|e| retrieval(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(retrieval(format!("HTTP {status} from {metadata_url}")));
        }

        let text = response.text().map_err(|e| retrieval(e.to_string()))?;
        if text.len() > MAX_METADATA_BYTES {
            return Err(retrieval(
                "maven-metadata.xml response exceeded 10MB limit".to_string(),
            ));
        }

        let metadata: MavenMetadata =
            from_str(&text).map_err(|e| retrieval(format!("bad maven-metadata.xml: {e}")))?;

        Ok(Some(metadata.versioning.versions.version))
    }

    fn validate_repository_url(url: &str) -> Result<()> {
        let parsed = Url::parse(url)
            .map_err(|_| PomupError::RepositoryConfig(format!("Invalid repository URL: {url}")))?;

        match parsed.scheme() {
            "https" | "http" => {}
            scheme => {
                return Err(PomupError::RepositoryConfig(format!(
                    "Unsupported repository scheme: {scheme}"
                )));
            }
        }

        if let Some(host) = parsed.host_str()
            && Self::is_private_host(host)
        {
            return Err(PomupError::RepositoryConfig(format!(
                "Repository host '{host}' is not allowed"
            )));
        }

        Ok(())
    }

    fn is_private_host(host: &str) -> bool {
        if host.eq_ignore_ascii_case("localhost") {
            return true;
        }

        if let Ok(ip) = host.parse::<IpAddr>() {
            match ip {
                IpAddr::V4(v4) => v4.is_private() || v4.is_loopback(),
                IpAddr::V6(v6) => v6.is_loopback() || v6.is_unique_local(),
            }
        } else {
            false
        }
    }
}

impl RepositoryClient for MavenRepository {
    fn fetch_known_versions(&self, coordinate: &Coordinate) -> Result<Vec<String>> {
        self.fetch_versions(coordinate)
    }
}

#[derive(Debug, Deserialize)]
struct MavenMetadata {
    versioning: Versioning,
}

#[derive(Debug, Deserialize)]
struct Versioning {
    versions: Versions,
}

#[derive(Debug, Deserialize)]
struct Versions {
    version: Vec<String>,
}
