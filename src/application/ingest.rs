//! Ingestion of `path.key = value` text into a forest.
//!
//! Format, one entry per line:
//!
//! ```text
//! config.loglevel = 3
//! strings.en.button_cancel = "Cancel"
//! strings.no.button_cancel = "Avbryt"
//! ```
//!
//! Quotes delimit strings, an unquoted value is an unsigned integer. Quotes
//! cannot be escaped and values cannot span lines. Blank lines and `#` comment
//! lines are skipped.

use std::path::Path;
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{key_path, Forest, TreeResult, Value, ROOT_KEY};
use crate::infrastructure::traits::FileSystem;

const LINE_PATTERN: &str = r#"^(?P<path>[^\s="]+)\s*=\s*(?:"(?P<string>[^"]*)"|(?P<integer>[^\s"]+))$"#;

/// One parsed line: where to write and what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// 1-based line number in the source text
    pub line: usize,
    /// Path segments, outermost first
    pub segments: Vec<String>,
    pub value: Value,
}

/// Parses single lines of the ingestion format.
#[derive(Debug, Clone)]
pub struct LineParser {
    pattern: Regex,
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineParser {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(LINE_PATTERN).expect("static ingestion pattern"),
        }
    }

    /// Parse one line. `Ok(None)` for blank and comment lines.
    pub fn parse(&self, line_number: usize, line: &str) -> ApplicationResult<Option<Assignment>> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }

        let malformed = |reason: &str| ApplicationError::MalformedLine {
            line: line_number,
            content: trimmed.to_string(),
            reason: reason.to_string(),
        };

        let caps = self.pattern.captures(trimmed).ok_or_else(|| {
            if trimmed.contains('=') {
                malformed("missing or unterminated value")
            } else {
                malformed("missing '=' separator")
            }
        })?;

        let segments = caps["path"]
            .split(key_path::SEPARATOR)
            .map(|segment| {
                key_path::validate_key(segment)
                    .map(|_| segment.to_string())
                    .map_err(|_| malformed("empty or invalid path segment"))
            })
            .collect::<ApplicationResult<Vec<_>>>()?;

        let value = match (caps.name("string"), caps.name("integer")) {
            (Some(s), _) => Value::Str(s.as_str().to_string()),
            (None, Some(i)) => i
                .as_str()
                .parse::<u64>()
                .map(Value::Int)
                .map_err(|_| malformed("value is neither a quoted string nor an unsigned integer"))?,
            (None, None) => return Err(malformed("missing value")),
        };

        Ok(Some(Assignment {
            line: line_number,
            segments,
            value,
        }))
    }
}

/// Loads text files into a forest through the public mutation API.
pub struct IngestService {
    fs: Arc<dyn FileSystem>,
    parser: LineParser,
    localized_sections: Vec<String>,
}

impl IngestService {
    /// Create a new ingest service.
    ///
    /// Segments placed directly under one of `localized_sections` are stored
    /// under the composite key `section + segment` (`no.greeting` becomes
    /// `nogreeting`), which is what [`Forest::get_text`] looks up.
    pub fn new(fs: Arc<dyn FileSystem>, localized_sections: Vec<String>) -> Self {
        Self {
            fs,
            parser: LineParser::new(),
            localized_sections,
        }
    }

    /// Build a fresh forest from a data file.
    #[instrument(level = "debug", skip(self))]
    pub fn load_file(&self, path: &Path) -> ApplicationResult<Forest> {
        let mut forest = Forest::new();
        self.ingest_file(&mut forest, path)?;
        Ok(forest)
    }

    /// Ingest a data file into an existing forest.
    #[instrument(level = "debug", skip(self, forest))]
    pub fn ingest_file(&self, forest: &mut Forest, path: &Path) -> ApplicationResult<usize> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read data file", path)?;
        self.ingest_str(forest, &content)
    }

    /// Ingest text into `forest`. All or nothing: on any error the forest is
    /// left as it was. Returns the number of applied assignments.
    pub fn ingest_str(&self, forest: &mut Forest, content: &str) -> ApplicationResult<usize> {
        let assignments = self.parse(content)?;

        let mut staged = forest.clone();
        for assignment in &assignments {
            self.apply(&mut staged, assignment)
                .map_err(|source| ApplicationError::Ingest {
                    line: assignment.line,
                    source,
                })?;
        }
        *forest = staged;

        info!(assignments = assignments.len(), nodes = forest.len(), "ingestion complete");
        Ok(assignments.len())
    }

    /// Parse every line up front so a bad line aborts before any mutation.
    pub fn parse(&self, content: &str) -> ApplicationResult<Vec<Assignment>> {
        let mut assignments = Vec::new();
        for (i, line) in content.lines().enumerate() {
            if let Some(assignment) = self.parser.parse(i + 1, line)? {
                assignments.push(assignment);
            }
        }
        Ok(assignments)
    }

    fn apply(&self, forest: &mut Forest, assignment: &Assignment) -> TreeResult<()> {
        let mut parent = ROOT_KEY.to_string();
        for segment in &assignment.segments {
            let key = if self.is_localized(&parent) {
                format!("{}{}", parent, segment)
            } else {
                segment.clone()
            };
            // keys are global: an existing node is reused wherever it lives
            if forest.find(&key)?.is_none() {
                forest.insert(&parent, &key)?;
            }
            parent = key;
        }

        debug!(line = assignment.line, key = %parent, value = %assignment.value, "assign");
        forest.set_value(&parent, assignment.value.clone())
    }

    fn is_localized(&self, key: &str) -> bool {
        self.localized_sections.iter().any(|section| section == key)
    }
}
