//! Front-matter parsing and the required-field audit.
//!
//! Parsing is two-phase: [`locate_block`] finds the `---` delimited block by line search, then
//! [`parse_block`] hands only that substring to the YAML loader. Nothing outside this module
//! touches `serde_yaml` directly.

use crate::docs::corpus::Corpus;
use crate::docs::{CheckKind, CheckOutcome, CheckStatus};
use serde_yaml::Value;
use std::fmt::{self, Display, Formatter};
use thiserror::Error;
use tracing::{debug, info};

const FRONTMATTER_DELIM: &str = "---";

/// Parsed front-matter mapping. Always a non-empty YAML mapping.
#[derive(Clone, Debug, PartialEq)]
pub struct FrontMatter(Value);

impl FrontMatter {
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.get(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Elements of a sequence-valued field rendered as strings.
    ///
    /// Returns `None` when the field is absent or not a sequence. Nested mappings and sequences
    /// inside the list are dropped.
    pub fn string_list(&self, key: &str) -> Option<Vec<String>> {
        let Value::Sequence(items) = self.get(key)? else {
            return None;
        };
        Some(items.iter().filter_map(scalar_to_string).collect())
    }

    /// Required keys absent from this mapping, in the order given.
    pub fn missing_fields<'a>(&self, required: &'a [String]) -> Vec<&'a str> {
        required
            .iter()
            .map(String::as_str)
            .filter(|field| !self.contains_key(field))
            .collect()
    }
}

/// Why a document has no usable front-matter block.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MissingBlock {
    NoStart,
    NoEnd,
}

impl Display for MissingBlock {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MissingBlock::NoStart => f.write_str("missing front-matter (no opening `---`)"),
            MissingBlock::NoEnd => f.write_str("missing front-matter (no closing `---`)"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("front-matter must be a key-value mapping, found {0}")]
    NotMapping(&'static str),
}

/// Return the raw text between the opening and closing delimiter lines.
pub fn locate_block(text: &str) -> Result<&str, MissingBlock> {
    if !text.starts_with(FRONTMATTER_DELIM) {
        return Err(MissingBlock::NoStart);
    }
    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Err(MissingBlock::NoStart);
    };
    if first.trim() != FRONTMATTER_DELIM {
        return Err(MissingBlock::NoStart);
    }

    let start = first.len();
    let mut offset = start;
    for line in lines {
        if line.trim() == FRONTMATTER_DELIM {
            return Ok(&text[start..offset]);
        }
        offset += line.len();
    }
    Err(MissingBlock::NoEnd)
}

/// Parse a raw block. `Ok(None)` means the block is empty or null.
///
/// A key repeated within one block is rejected as a YAML error rather than resolved to its last
/// value.
pub fn parse_block(raw: &str) -> Result<Option<FrontMatter>, FrontMatterError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    match serde_yaml::from_str::<Value>(raw)? {
        Value::Null => Ok(None),
        Value::Mapping(map) if map.is_empty() => Ok(None),
        value @ Value::Mapping(_) => Ok(Some(FrontMatter(value))),
        other => Err(FrontMatterError::NotMapping(kind_name(&other))),
    }
}

/// Parse a document's front-matter, or fail.
///
/// `Ok(None)` covers both a missing block and an empty one.
pub fn parse_front_matter(text: &str) -> Result<Option<FrontMatter>, FrontMatterError> {
    match locate_block(text) {
        Ok(raw) => parse_block(raw),
        Err(_) => Ok(None),
    }
}

/// Check every document for a front-matter block carrying all `required` keys.
pub fn validate_front_matter(corpus: &Corpus, required: &[String]) -> CheckOutcome {
    let mut outcome = CheckOutcome::new(CheckKind::Frontmatter);
    let mut scanned = 0usize;
    let mut without_yaml = 0usize;
    let mut missing_fields = 0usize;
    let mut parse_errors = 0usize;

    for path in corpus.files() {
        let Some(doc) = corpus.read_or_skip(path, &mut outcome) else {
            continue;
        };
        scanned += 1;

        let raw = match locate_block(&doc.text) {
            Ok(raw) => raw,
            Err(missing) => {
                without_yaml += 1;
                outcome.push(doc.rel_path, missing.to_string(), None);
                continue;
            }
        };

        match parse_block(raw) {
            Ok(None) => {
                without_yaml += 1;
                outcome.push(doc.rel_path, "missing front-matter (empty block)", None);
            }
            Ok(Some(front_matter)) => {
                let missing = front_matter.missing_fields(required);
                if !missing.is_empty() {
                    missing_fields += 1;
                    outcome.push(
                        doc.rel_path,
                        format!("missing required fields: {}", missing.join(", ")),
                        None,
                    );
                }
            }
            Err(err) => {
                debug!(path = %doc.rel_path, "front-matter parse failure: {err}");
                parse_errors += 1;
                outcome.push(doc.rel_path, err.to_string(), None);
            }
        }
    }

    outcome.stat("files_with_yaml", scanned - without_yaml);
    outcome.stat("files_without_yaml", without_yaml);
    outcome.stat("files_missing_fields", missing_fields);
    outcome.stat("yaml_parse_errors", parse_errors);
    info!(
        scanned,
        without_yaml, missing_fields, parse_errors, "front-matter check complete"
    );

    if without_yaml > 0 || parse_errors > 0 {
        outcome.finish(
            CheckStatus::Fail,
            format!(
                "{without_yaml} file(s) without front-matter, {parse_errors} unparsable block(s)"
            ),
        )
    } else if missing_fields > 0 {
        outcome.finish(
            CheckStatus::Warn,
            format!("{missing_fields} file(s) missing required fields"),
        )
    } else {
        outcome.finish(
            CheckStatus::Pass,
            format!("All {scanned} files have valid front-matter"),
        )
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn required() -> Vec<String> {
        ["title", "type", "tags", "status"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn locate_block_returns_enclosed_text_only() {
        let text = "---\ntitle: PBFT\ntags: [bft]\n---\n# Body\n---\n";
        assert_eq!(locate_block(text), Ok("title: PBFT\ntags: [bft]\n"));
    }

    #[test]
    fn locate_block_distinguishes_missing_start_and_end() {
        assert_eq!(locate_block("# No metadata\n"), Err(MissingBlock::NoStart));
        assert_eq!(locate_block("----\ntitle: x\n---\n"), Err(MissingBlock::NoStart));
        assert_eq!(locate_block("---\ntitle: x\n"), Err(MissingBlock::NoEnd));
    }

    #[test]
    fn parse_front_matter_treats_empty_block_as_absent() {
        assert!(parse_front_matter("---\n---\nbody").expect("parse").is_none());
        assert!(parse_front_matter("---\n  \n---\n").expect("parse").is_none());
        assert!(parse_front_matter("no block").expect("parse").is_none());
    }

    #[test]
    fn parse_front_matter_reports_structural_errors() {
        let err = parse_front_matter("---\ntitle: [unterminated\n---\n").expect_err("bad yaml");
        assert!(matches!(err, FrontMatterError::Yaml(_)));

        let err = parse_front_matter("---\n- a\n- b\n---\n").expect_err("not a mapping");
        assert_eq!(
            err.to_string(),
            "front-matter must be a key-value mapping, found a sequence"
        );
    }

    #[test]
    fn repeated_key_is_a_parse_error() {
        let err = parse_front_matter("---\ntitle: x\ntags: [a]\ntags: [b]\n---\n")
            .expect_err("duplicate key");
        assert!(matches!(err, FrontMatterError::Yaml(_)));
        assert!(err.to_string().contains("duplicate entry"));
    }

    #[test]
    fn string_list_stringifies_scalars() {
        let fm = parse_front_matter("---\nreferences: [FOO-1, 2024, true, {a: b}]\n---\n")
            .expect("parse")
            .expect("present");
        assert_eq!(
            fm.string_list("references"),
            Some(vec!["FOO-1".to_string(), "2024".to_string(), "true".to_string()])
        );
        assert_eq!(fm.string_list("title"), None);
    }

    #[test]
    fn complete_block_has_no_missing_fields_and_each_removal_is_named() {
        let full = "title: PBFT\ntype: protocol\ntags: [bft]\nstatus: draft\n";
        let fm = parse_block(full).expect("parse").expect("present");
        assert!(fm.missing_fields(&required()).is_empty());

        for field in required() {
            let reduced: String = full
                .lines()
                .filter(|line| !line.starts_with(&format!("{field}:")))
                .map(|line| format!("{line}\n"))
                .collect();
            let fm = parse_block(&reduced).expect("parse").expect("present");
            assert_eq!(fm.missing_fields(&required()), vec![field.as_str()]);
        }
    }

    #[test]
    fn null_valued_key_counts_as_present() {
        let fm = parse_block("title:\ntype: note\ntags: []\nstatus: ok\n")
            .expect("parse")
            .expect("present");
        assert!(fm.missing_fields(&required()).is_empty());
    }

    #[test]
    fn validate_collects_one_issue_per_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::write(
            root.join("complete.md"),
            "---\ntitle: A\ntype: note\ntags: [x]\nstatus: done\n---\nbody\n",
        )
        .expect("write");
        fs::write(root.join("partial.md"), "---\ntitle: B\n---\nbody\n").expect("write");
        fs::write(root.join("bare.md"), "# Bare\n").expect("write");
        fs::write(root.join("broken.md"), "---\ntitle: [x\n---\n").expect("write");

        let corpus = Corpus::discover(root).expect("discover");
        let outcome = validate_front_matter(&corpus, &required());

        assert_eq!(outcome.status, CheckStatus::Fail);
        assert_eq!(outcome.issues.len(), 3);
        let partial = outcome
            .issues
            .iter()
            .find(|i| i.path.as_deref() == Some("partial.md"))
            .expect("partial issue");
        assert_eq!(partial.message, "missing required fields: type, tags, status");
        assert_eq!(outcome.stat_value("files_with_yaml"), Some(3));
        assert_eq!(outcome.stat_value("files_without_yaml"), Some(1));
        assert_eq!(outcome.stat_value("files_missing_fields"), Some(1));
        assert_eq!(outcome.stat_value("yaml_parse_errors"), Some(1));
    }
}
