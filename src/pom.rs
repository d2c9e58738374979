use crate::error::{PomupError, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Serialize;

/// Which part of the POM a coordinate was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PomSection {
    Dependencies,
    DependencyManagement,
    Plugins,
}

impl PomSection {
    fn path(self) -> &'static [&'static str] {
        match self {
            PomSection::Dependencies => &["project", "dependencies", "dependency"],
            PomSection::DependencyManagement => {
                &["project", "dependencyManagement", "dependencies", "dependency"]
            }
            PomSection::Plugins => &["project", "build", "plugins", "plugin"],
        }
    }

    const ALL: [PomSection; 3] = [
        PomSection::Dependencies,
        PomSection::DependencyManagement,
        PomSection::Plugins,
    ];
}

/// One declared dependency or plugin with a literal version. Entries whose
/// version is a property reference (`${...}`) or absent are reported with
/// `version: None` and skipped by the update workflows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PomDependency {
    pub group: String,
    pub artifact: String,
    pub version: Option<String>,
    pub section: PomSection,
}

#[derive(Debug, Default)]
struct Collector {
    group: Option<String>,
    artifact: Option<String>,
    version: Option<String>,
}

/// Walks the POM once and lists every coordinate in the dependency,
/// dependency-management and build-plugin sections, in document order.
pub fn extract_dependencies(content: &str) -> Result<Vec<PomDependency>> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().check_end_names = true;

    let mut stack: Vec<String> = Vec::new();
    let mut open: Option<(PomSection, Collector)> = None;
    let mut entries = Vec::new();

    loop {
        match reader
            .read_event()
            .map_err(|e| PomupError::MalformedDocument(e.to_string()))?
        {
            Event::Start(e) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .map_err(|e| PomupError::MalformedDocument(format!("bad element name: {e}")))?
                    .to_string();
                stack.push(name);
                if open.is_none()
                    && let Some(section) = PomSection::ALL
                        .into_iter()
                        .find(|s| stack_is(&stack, s.path()))
                {
                    open = Some((section, Collector::default()));
                }
            }
            Event::End(_) => {
                if let Some((section, collector)) =
                    open.take_if(|(s, _)| stack_is(&stack, s.path()))
                    && let (Some(group), Some(artifact)) = (collector.group, collector.artifact)
                {
                    let version = collector
                        .version
                        .filter(|v| !v.is_empty() && !v.starts_with("${"));
                    entries.push(PomDependency {
                        group,
                        artifact,
                        version,
                        section,
                    });
                }
                stack.pop();
            }
            Event::Text(e) => {
                if let Some((section, collector)) = open.as_mut()
                    && stack.len() == section.path().len() + 1
                {
                    let raw = std::str::from_utf8(e.as_ref())
                        .map_err(|e| PomupError::MalformedDocument(e.to_string()))?;
                    let text = quick_xml::escape::unescape(raw)
                        .map_err(|e| PomupError::MalformedDocument(e.to_string()))?
                        .trim()
                        .to_string();
                    let slot = match stack.last().map(String::as_str) {
                        Some("groupId") => &mut collector.group,
                        Some("artifactId") => &mut collector.artifact,
                        Some("version") => &mut collector.version,
                        _ => continue,
                    };
                    slot.get_or_insert(text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(openel) = stack.last() {
        return Err(PomupError::MalformedDocument(format!(
            "unclosed element <{openel}>"
        )));
    }
    Ok(entries)
}

fn stack_is(stack: &[String], path: &[&str]) -> bool {
    stack.len() == path.len() && stack.iter().zip(path).all(|(a, b)| a == b)
}
