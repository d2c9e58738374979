use crate::error::{PomupError, Result};
use crate::maven::{MavenRepository, RemoteRepository};
use crate::ordering::comparator_for;
use crate::pom::{PomDependency, extract_dependencies};
use crate::repository::{Coordinate, RepositoryClient};
use crate::rewrite::XmlPatcher;
use crate::select::{
    QualifierFilter, SelectionRequest, Selector, VersionRange, is_snapshot, release_prefix,
};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::cmp::Ordering;
use std::path::Path;

fn repository_client(repos: &[String]) -> Result<MavenRepository> {
    let remotes = repos
        .iter()
        .enumerate()
        .map(|(i, url)| RemoteRepository::new(format!("repo-{}", i + 1), url))
        .collect();
    MavenRepository::with_repositories(remotes)
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  [{bar:40}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );
    pb
}

fn load_pom(pom_path: &str) -> Result<(XmlPatcher, Vec<PomDependency>)> {
    let path = Path::new(pom_path);
    if !path.is_file() {
        return Err(PomupError::MalformedDocument(format!(
            "'{pom_path}' does not exist or is not a file"
        )));
    }
    let patcher = XmlPatcher::from_path(path)?;
    let dependencies = extract_dependencies(patcher.content())?;
    Ok((patcher, dependencies))
}

/// Replace every -SNAPSHOT dependency with its released counterpart, or,
/// with `accept_qualified`, with the newest admitted qualified pre-release
/// of the approached version. The rewritten POM is only written to disk
/// after the whole pass completed.
pub fn execute_use_releases(
    pom_path: &str,
    repos: &[String],
    comparison_method: &str,
    accept_qualified: bool,
    qualifier_includes: Option<&str>,
    qualifier_excludes: Option<&str>,
) -> Result<()> {
    println!("{}", "Resolving snapshot dependencies...".cyan().bold());

    // Configuration errors surface before any lookups run.
    let filter = QualifierFilter::from_lists(qualifier_includes, qualifier_excludes)?;
    let selector = Selector::new(comparator_for(comparison_method));
    let client = repository_client(repos)?;

    println!("\n{}", "1. Reading POM...".yellow());
    let (mut patcher, dependencies) = load_pom(pom_path)?;
    let snapshots: Vec<&PomDependency> = dependencies
        .iter()
        .filter(|d| d.version.as_deref().is_some_and(is_snapshot))
        .collect();
    println!(
        "   Found {} dependencies, {} with snapshot versions",
        dependencies.len(),
        snapshots.len()
    );

    if snapshots.is_empty() {
        println!("\n{}", "Nothing to do.".green());
        return Ok(());
    }

    println!("\n{}", "2. Looking up released versions...".yellow());
    let pb = progress_bar(snapshots.len());
    let mut updated = 0usize;

    for dep in snapshots {
        let coordinate = Coordinate::new(&dep.group, &dep.artifact);
        pb.set_message(format!("Checking {coordinate}"));

        let current = dep.version.as_deref().expect("filtered on version");
        let Some(approached) = release_prefix(current) else {
            pb.inc(1);
            continue;
        };

        let candidates = client.fetch_known_versions(&coordinate)?;
        let request = SelectionRequest {
            exact_target: Some(approached),
            accept_qualified,
            qualifier_filter: Some(&filter),
            ..SelectionRequest::default()
        };

        if let Some(release) = selector.select(&candidates, &request)? {
            if patcher.set_dependency_version(&dep.group, &dep.artifact, current, &release)? {
                pb.println(format!(
                    "  {} {} {} -> {}",
                    "Updated".green(),
                    coordinate,
                    current.dimmed(),
                    release.bold()
                ));
                updated += 1;
            } else {
                // The live document no longer carries the value we derived
                // the candidate from; skip rather than overwrite blindly.
                pb.println(format!(
                    "  {} {} changed since it was scanned, skipping",
                    "Stale".yellow(),
                    coordinate
                ));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if patcher.is_modified() {
        println!("\n{}", "3. Writing POM...".yellow());
        patcher.write_to(pom_path)?;
        println!(
            "\n{}",
            format!("✨ Updated {updated} dependency version(s)").green().bold()
        );
    } else {
        println!("\n{}", "No releases available yet.".green());
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct UpdateFinding {
    group: String,
    artifact: String,
    current: String,
    newest: Option<String>,
    update_available: bool,
}

/// Report available updates without modifying anything.
pub fn execute_check(
    pom_path: &str,
    repos: &[String],
    comparison_method: &str,
    range: Option<&str>,
    snapshots: bool,
    json: bool,
) -> Result<()> {
    let selector = Selector::new(comparator_for(comparison_method));
    let range = range
        .map(|spec| VersionRange::parse(spec, selector.comparator()))
        .transpose()?;
    let client = repository_client(repos)?;

    if !json {
        println!("{}", "Checking for available updates...".cyan().bold());
    }

    let (_, dependencies) = load_pom(pom_path)?;
    let versioned: Vec<&PomDependency> = dependencies
        .iter()
        .filter(|d| d.version.is_some())
        .collect();

    let pb = if json {
        ProgressBar::hidden()
    } else {
        progress_bar(versioned.len())
    };

    let mut findings = Vec::new();
    for dep in versioned {
        let coordinate = Coordinate::new(&dep.group, &dep.artifact);
        pb.set_message(format!("Checking {coordinate}"));

        let current = dep.version.clone().expect("filtered on version");
        let candidates = client.fetch_known_versions(&coordinate)?;
        let request = SelectionRequest {
            range: range.as_ref(),
            allow_snapshots: snapshots,
            ..SelectionRequest::default()
        };
        let newest = selector.select(&candidates, &request)?;
        let update_available = newest.as_deref().is_some_and(|n| {
            selector.comparator().compare(n, &current) == Ordering::Greater
        });

        findings.push(UpdateFinding {
            group: dep.group.clone(),
            artifact: dep.artifact.clone(),
            current,
            newest,
            update_available,
        });
        pb.inc(1);
    }
    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&findings)?);
        return Ok(());
    }

    let available: Vec<&UpdateFinding> = findings.iter().filter(|f| f.update_available).collect();
    println!("\n{}", "Results:".yellow());
    for finding in &findings {
        let coordinate = format!("{}:{}", finding.group, finding.artifact);
        match (&finding.newest, finding.update_available) {
            (Some(newest), true) => println!(
                "  {} {} {} -> {}",
                "↑".green(),
                coordinate,
                finding.current.dimmed(),
                newest.bold()
            ),
            _ => println!("  {} {} {}", "=".dimmed(), coordinate, finding.current.dimmed()),
        }
    }
    println!(
        "\n{}",
        format!("{} update(s) available", available.len()).green().bold()
    );
    Ok(())
}

/// Rewrite a single dependency to an explicit version, optionally
/// validated against a range and the remote candidate set.
pub fn execute_set(
    pom_path: &str,
    repos: &[String],
    comparison_method: &str,
    coordinate: &str,
    new_version: &str,
    range: Option<&str>,
    verify_remote: bool,
) -> Result<()> {
    let coordinate = Coordinate::parse(coordinate).ok_or_else(|| {
        PomupError::RepositoryConfig(format!(
            "'{coordinate}' is not a group:artifact coordinate"
        ))
    })?;
    let selector = Selector::new(comparator_for(comparison_method));

    if let Some(spec) = range {
        let range = VersionRange::parse(spec, selector.comparator())?;
        if !range.contains(new_version, selector.comparator()) {
            return Err(PomupError::InvalidRange {
                spec: spec.to_string(),
                reason: format!("version '{new_version}' lies outside the range"),
            });
        }
    }

    if verify_remote {
        let client = repository_client(repos)?;
        let candidates = client.fetch_known_versions(&coordinate)?;
        let request = SelectionRequest {
            exact_target: Some(new_version),
            ..SelectionRequest::default()
        };
        if selector.select(&candidates, &request)?.is_none() {
            return Err(PomupError::Retrieval {
                coordinate: coordinate.to_string(),
                reason: format!("version '{new_version}' is not published"),
            });
        }
    }

    println!("{}", "Setting dependency version...".cyan().bold());
    let (mut patcher, dependencies) = load_pom(pom_path)?;

    let Some(dep) = dependencies.iter().find(|d| {
        d.group == coordinate.group && d.artifact == coordinate.artifact && d.version.is_some()
    }) else {
        println!(
            "\n{}",
            format!("{coordinate} is not declared with a literal version, nothing to do").yellow()
        );
        return Ok(());
    };
    let current = dep.version.as_deref().expect("filtered on version");

    if patcher.set_dependency_version(&coordinate.group, &coordinate.artifact, current, new_version)? {
        patcher.write_to(pom_path)?;
        println!(
            "\n{}",
            format!("✨ {coordinate} {current} -> {new_version}").green().bold()
        );
    } else {
        println!("\n{}", "POM changed since it was scanned, no change made".yellow());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const POM: &str = r#"<project>
  <dependencies>
    <dependency>
      <groupId>org.acme</groupId>
      <artifactId>widget</artifactId>
      <version>1.0</version>
    </dependency>
  </dependencies>
</project>
"#;

    fn pom_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn set_rewrites_only_the_version_text() {
        let file = pom_file(POM);
        let path = file.path().to_str().unwrap().to_string();
        execute_set(&path, &[], "maven", "org.acme:widget", "2.0", None, false).unwrap();
        let rewritten = std::fs::read_to_string(&path).unwrap();
        assert_eq!(rewritten, POM.replace("1.0", "2.0"));
    }

    #[test]
    fn set_honours_the_range_guard() {
        let file = pom_file(POM);
        let path = file.path().to_str().unwrap().to_string();
        let err = execute_set(
            &path,
            &[],
            "maven",
            "org.acme:widget",
            "3.0",
            Some("[1.0,2.0)"),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, PomupError::InvalidRange { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), POM);
    }

    #[test]
    fn set_on_undeclared_coordinate_changes_nothing() {
        let file = pom_file(POM);
        let path = file.path().to_str().unwrap().to_string();
        execute_set(&path, &[], "maven", "org.acme:unknown", "2.0", None, false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), POM);
    }

    #[test]
    fn malformed_pom_aborts_before_any_write() {
        let file = pom_file("<project><dependencies></project>");
        let path = file.path().to_str().unwrap().to_string();
        let err =
            execute_set(&path, &[], "maven", "org.acme:widget", "2.0", None, false).unwrap_err();
        assert!(matches!(err, PomupError::MalformedDocument(_)));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "<project><dependencies></project>"
        );
    }
}
