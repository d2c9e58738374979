use crate::error::{PomupError, Result};
use quick_xml::Reader;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::Event;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Addresses one text node inside the document: a sequence of element
/// names from the root, optionally disambiguated by sibling key elements
/// (children of the target's parent whose text must match, e.g. the
/// groupId/artifactId pair of a `<dependency>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchTarget {
    path: Vec<String>,
    key: Vec<(String, String)>,
}

impl PatchTarget {
    pub fn element_path<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PatchTarget {
            path: path.into_iter().map(Into::into).collect(),
            key: Vec::new(),
        }
    }

    /// Adds a sibling-key constraint: the named child of the target's
    /// parent element must carry exactly this text.
    pub fn with_key(mut self, element: impl Into<String>, value: impl Into<String>) -> Self {
        self.key.push((element.into(), value.into()));
        self
    }

    fn wants_field(&self, name: &str) -> bool {
        self.key.iter().any(|(k, _)| k == name)
    }
}

/// Byte span of one text run inside the live document.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TextSpan {
    start: usize,
    end: usize,
    cdata: bool,
}

#[derive(Debug, Default)]
struct ContainerState {
    fields: HashMap<String, String>,
    span: Option<TextSpan>,
}

/// Minimal-diff rewriter over one XML document held in memory.
///
/// Every patch re-scans the current text by structural events, so spans
/// stay valid no matter what earlier patches in the same pass changed.
/// Only the matched text run is spliced; every other byte of the document
/// (whitespace, comments, attribute order, element formatting) survives
/// verbatim. Nothing touches disk until [`XmlPatcher::write_to`].
#[derive(Debug)]
pub struct XmlPatcher {
    content: String,
    modified: bool,
}

impl XmlPatcher {
    pub fn new(content: impl Into<String>) -> Self {
        XmlPatcher {
            content: content.into(),
            modified: false,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(fs::read_to_string(path)?))
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Replaces the text of the first node matching `target`, provided its
    /// current text equals `expected_old`. Returns `Ok(false)` without
    /// touching the document when the path misses or the guard fails;
    /// malformed XML is a hard error that poisons the whole pass.
    pub fn set_value(
        &mut self,
        target: &PatchTarget,
        expected_old: &str,
        new_value: &str,
    ) -> Result<bool> {
        let Some(span) = find_text_span(&self.content, target)? else {
            return Ok(false);
        };

        let raw = &self.content[span.start..span.end];
        let trim_start = raw.len() - raw.trim_start().len();
        let trim_end = raw.trim_end().len().max(trim_start);
        let core = &raw[trim_start..trim_end];
        let current: Cow<'_, str> = if span.cdata {
            Cow::Borrowed(core)
        } else {
            unescape(core).map_err(|e| {
                PomupError::MalformedDocument(format!("bad character reference in text: {e}"))
            })?
        };

        if current != expected_old {
            return Ok(false);
        }

        let replacement = if span.cdata {
            new_value.to_string()
        } else {
            escape(new_value).into_owned()
        };
        self.content
            .replace_range(span.start + trim_start..span.start + trim_end, &replacement);
        self.modified = true;
        Ok(true)
    }

    /// Rewrites the `<version>` of one coordinate, looking through the
    /// dependency, dependency-management and build-plugin sections in that
    /// order. First section with a matching, guard-passing entry wins.
    pub fn set_dependency_version(
        &mut self,
        group: &str,
        artifact: &str,
        expected_old: &str,
        new_value: &str,
    ) -> Result<bool> {
        let paths: [&[&str]; 3] = [
            &["project", "dependencies", "dependency", "version"],
            &[
                "project",
                "dependencyManagement",
                "dependencies",
                "dependency",
                "version",
            ],
            &["project", "build", "plugins", "plugin", "version"],
        ];

        for path in paths {
            let target = PatchTarget::element_path(path.iter().copied())
                .with_key("groupId", group)
                .with_key("artifactId", artifact);
            if self.set_value(&target, expected_old, new_value)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Commits the buffered document. Callers invoke this once, after the
    /// whole patch pass has either succeeded or been explicitly skipped.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, &self.content)?;
        Ok(())
    }
}

fn element_name(raw: &[u8]) -> Result<String> {
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|e| PomupError::MalformedDocument(format!("non-UTF-8 element name: {e}")))
}

fn stacks_match(stack: &[String], path: &[&String]) -> bool {
    stack.len() == path.len() && stack.iter().zip(path).all(|(a, b)| a == *b)
}

/// Single forward scan for the first text run matching `target`. The whole
/// document is always walked to the end so unbalanced markup is reported
/// even when the match sits early in the stream.
fn find_text_span(content: &str, target: &PatchTarget) -> Result<Option<TextSpan>> {
    let path: Vec<&String> = target.path.iter().collect();
    if path.is_empty() || (!target.key.is_empty() && path.len() < 2) {
        return Ok(None);
    }
    let container_path = &path[..path.len() - 1];

    let mut reader = Reader::from_str(content);
    reader.config_mut().check_end_names = true;

    let mut stack: Vec<String> = Vec::new();
    let mut container: Option<ContainerState> = None;
    let mut found: Option<TextSpan> = None;

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|e| PomupError::MalformedDocument(e.to_string()))?;
        let end = reader.buffer_position() as usize;

        match event {
            Event::Start(e) => {
                stack.push(element_name(e.name().as_ref())?);
                if !target.key.is_empty()
                    && container.is_none()
                    && stacks_match(&stack, container_path)
                {
                    container = Some(ContainerState::default());
                }
            }
            Event::End(_) => {
                if let Some(state) = container.take_if(|_| stacks_match(&stack, container_path)) {
                    let key_matches = target
                        .key
                        .iter()
                        .all(|(k, v)| state.fields.get(k).map(String::as_str) == Some(v.as_str()));
                    if found.is_none() && key_matches {
                        found = state.span;
                    }
                }
                if stack.pop().is_none() {
                    return Err(PomupError::MalformedDocument(
                        "close tag without matching open tag".to_string(),
                    ));
                }
            }
            Event::Text(e) => {
                let span = TextSpan {
                    start,
                    end,
                    cdata: false,
                };
                record_text(target, &path, &stack, &mut container, &mut found, span, || {
                    unescape(std::str::from_utf8(e.as_ref()).unwrap_or_default())
                        .map(|t| t.trim().to_string())
                        .unwrap_or_default()
                });
            }
            Event::CData(e) => {
                // Strip the <![CDATA[ ... ]]> markers from the raw span.
                let span = TextSpan {
                    start: start + 9,
                    end: end.saturating_sub(3),
                    cdata: true,
                };
                record_text(target, &path, &stack, &mut container, &mut found, span, || {
                    String::from_utf8_lossy(e.as_ref()).trim().to_string()
                });
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(PomupError::MalformedDocument(format!(
            "unclosed element <{open}>"
        )));
    }
    Ok(found)
}

/// Routes one text run either to the target span (first match wins) or to
/// the sibling-key fields of the currently open container.
fn record_text(
    target: &PatchTarget,
    path: &[&String],
    stack: &[String],
    container: &mut Option<ContainerState>,
    found: &mut Option<TextSpan>,
    span: TextSpan,
    text: impl FnOnce() -> String,
) {
    if stacks_match(stack, path) {
        match (target.key.is_empty(), container.as_mut()) {
            (true, _) => {
                if found.is_none() {
                    *found = Some(span);
                }
            }
            (false, Some(state)) => {
                if state.span.is_none() {
                    state.span = Some(span);
                }
            }
            _ => {}
        }
        return;
    }

    if let Some(state) = container.as_mut()
        && stack.len() == path.len()
        && stacks_match(&stack[..path.len() - 1], &path[..path.len() - 1])
    {
        let field = stack.last().expect("non-empty stack").clone();
        if target.wants_field(&field) {
            state.fields.entry(field).or_insert_with(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project>
  <!-- hand-edited, keep the formatting -->
  <groupId>com.example</groupId>
  <artifactId>demo</artifactId>
  <version>0.1.0</version>
  <dependencies>
    <dependency>
      <groupId>org.acme</groupId>
      <artifactId>widget</artifactId>
      <version>1.0-SNAPSHOT</version>
    </dependency>
    <dependency>
      <groupId>org.acme</groupId>
      <artifactId>gadget</artifactId>
      <version>2.3</version>   <!-- pinned -->
    </dependency>
  </dependencies>
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>org.acme</groupId>
        <artifactId>widget</artifactId>
        <version>1.0-SNAPSHOT</version>
      </dependency>
    </dependencies>
  </dependencyManagement>
</project>
"#;

    #[test]
    fn patches_only_the_matched_text_run() {
        let mut patcher = XmlPatcher::new(POM);
        let changed = patcher
            .set_dependency_version("org.acme", "widget", "1.0-SNAPSHOT", "1.0")
            .unwrap();
        assert!(changed);
        assert!(patcher.is_modified());
        assert_eq!(
            patcher.content(),
            POM.replacen("1.0-SNAPSHOT", "1.0", 1)
        );
    }

    #[test]
    fn sibling_key_disambiguates_repeated_structures() {
        let mut patcher = XmlPatcher::new(POM);
        let changed = patcher
            .set_dependency_version("org.acme", "gadget", "2.3", "2.4")
            .unwrap();
        assert!(changed);
        assert!(patcher.content().contains("<version>2.4</version>   <!-- pinned -->"));
        // The widget entries are untouched.
        assert_eq!(patcher.content().matches("1.0-SNAPSHOT").count(), 2);
    }

    #[test]
    fn project_version_is_reachable_by_plain_path() {
        let mut patcher = XmlPatcher::new(POM);
        let target = PatchTarget::element_path(["project", "version"]);
        assert!(patcher.set_value(&target, "0.1.0", "0.2.0").unwrap());
        assert!(patcher.content().contains("<version>0.2.0</version>"));
        // Dependency versions live deeper and must not match this path.
        assert_eq!(patcher.content().matches("1.0-SNAPSHOT").count(), 2);
    }

    #[test]
    fn wrong_expected_value_never_mutates() {
        let mut patcher = XmlPatcher::new(POM);
        let changed = patcher
            .set_dependency_version("org.acme", "widget", "9.9", "1.0")
            .unwrap();
        assert!(!changed);
        assert!(!patcher.is_modified());
        assert_eq!(patcher.content(), POM);
    }

    #[test]
    fn unknown_coordinate_is_a_miss_not_an_error() {
        let mut patcher = XmlPatcher::new(POM);
        let changed = patcher
            .set_dependency_version("org.acme", "nothing", "1.0", "2.0")
            .unwrap();
        assert!(!changed);
        assert_eq!(patcher.content(), POM);
    }

    #[test]
    fn patch_round_trip_restores_the_original_bytes() {
        let mut patcher = XmlPatcher::new(POM);
        assert!(patcher
            .set_dependency_version("org.acme", "widget", "1.0-SNAPSHOT", "1.0")
            .unwrap());
        assert!(patcher
            .set_dependency_version("org.acme", "widget", "1.0", "1.0-SNAPSHOT")
            .unwrap());
        assert_eq!(patcher.content(), POM);
    }

    #[test]
    fn sequential_patches_track_the_mutating_document() {
        let mut patcher = XmlPatcher::new(POM);
        // The first patch changes byte offsets for everything after it; the
        // second must still land on the right node.
        assert!(patcher
            .set_dependency_version("org.acme", "widget", "1.0-SNAPSHOT", "1.0.0-FINAL")
            .unwrap());
        assert!(patcher
            .set_dependency_version("org.acme", "gadget", "2.3", "2.4")
            .unwrap());
        assert!(patcher.content().contains("<artifactId>widget</artifactId>\n      <version>1.0.0-FINAL</version>"));
        assert!(patcher.content().contains("<artifactId>gadget</artifactId>\n      <version>2.4</version>"));
    }

    #[test]
    fn management_section_is_patched_when_dependencies_miss() {
        let mut patcher = XmlPatcher::new(POM);
        // First call rewrites the <dependencies> entry, second one falls
        // through to <dependencyManagement>.
        assert!(patcher
            .set_dependency_version("org.acme", "widget", "1.0-SNAPSHOT", "1.0")
            .unwrap());
        assert!(patcher
            .set_dependency_version("org.acme", "widget", "1.0-SNAPSHOT", "1.0")
            .unwrap());
        assert_eq!(patcher.content().matches("1.0-SNAPSHOT").count(), 0);
    }

    #[test]
    fn escaped_text_is_compared_unescaped_and_written_escaped() {
        let doc = "<project><version>1.0&amp;x</version></project>";
        let mut patcher = XmlPatcher::new(doc);
        let target = PatchTarget::element_path(["project", "version"]);
        assert!(patcher.set_value(&target, "1.0&x", "2.0<y").unwrap());
        assert_eq!(
            patcher.content(),
            "<project><version>2.0&lt;y</version></project>"
        );
    }

    #[test]
    fn surrounding_whitespace_inside_the_text_run_is_kept() {
        let doc = "<project><version>  1.0  </version></project>";
        let mut patcher = XmlPatcher::new(doc);
        let target = PatchTarget::element_path(["project", "version"]);
        assert!(patcher.set_value(&target, "1.0", "2.0").unwrap());
        assert_eq!(patcher.content(), "<project><version>  2.0  </version></project>");
    }

    #[test]
    fn cdata_values_are_patched_in_place() {
        let doc = "<project><version><![CDATA[1.0]]></version></project>";
        let mut patcher = XmlPatcher::new(doc);
        let target = PatchTarget::element_path(["project", "version"]);
        assert!(patcher.set_value(&target, "1.0", "2.0").unwrap());
        assert_eq!(
            patcher.content(),
            "<project><version><![CDATA[2.0]]></version></project>"
        );
    }

    #[test]
    fn unbalanced_markup_is_fatal() {
        let mut patcher = XmlPatcher::new("<project><version>1.0</project>");
        let target = PatchTarget::element_path(["project", "version"]);
        let err = patcher.set_value(&target, "1.0", "2.0").unwrap_err();
        assert!(matches!(err, PomupError::MalformedDocument(_)));
    }

    #[test]
    fn malformation_after_the_match_is_still_fatal() {
        let doc = "<project><version>1.0</version><dangling></project>";
        let mut patcher = XmlPatcher::new(doc);
        let target = PatchTarget::element_path(["project", "version"]);
        assert!(patcher.set_value(&target, "1.0", "2.0").is_err());
        // The buffered document is left untouched on a fatal error.
        assert_eq!(patcher.content(), doc);
    }
}
