//! Knowledge-base checks.
//!
//! Each check is an independent scan over the same [`Corpus`](corpus::Corpus): it re-reads the
//! files it needs, shares no state with the other checks, and returns a [`CheckOutcome`]. The
//! [`audit`] module runs any subset of them and renders the report.

pub mod audit;
pub mod corpus;
pub mod frontmatter;
pub mod glossary;
pub mod math;
pub mod mermaid;
pub mod references;
pub mod wikilinks;

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

pub const GLOSSARY_FILE: &str = "glossary.md";
pub const REFERENCES_FILE: &str = "references.md";

pub const REQUIRED_GLOSSARY_TERMS: &[&str] = &[
    "byzantine fault tolerance",
    "bft",
    "consensus",
    "safety",
    "liveness",
    "provable broadcast",
    "reliable broadcast",
    "temporal logic",
    "knowledge framework",
    "pbft",
    "hotstuff",
    "honeybadger",
    "threshold automata",
    "formal verification",
    "asynchronous",
    "synchronous",
    "quorum",
    "view change",
    "leader election",
];

pub const REQUIRED_FRONTMATTER_FIELDS: &[&str] = &["title", "type", "tags", "status"];

pub const DIAGRAM_KEYWORDS: &[&str] = &[
    "graph",
    "sequenceDiagram",
    "classDiagram",
    "stateDiagram",
    "flowchart",
    "gantt",
    "pie",
    "erDiagram",
    "journey",
];

/// The six independent checks, in report order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, clap::ValueEnum)]
pub enum CheckKind {
    Wikilinks,
    References,
    Glossary,
    Frontmatter,
    Mermaid,
    Math,
}

impl CheckKind {
    pub const ALL: [CheckKind; 6] = [
        CheckKind::Wikilinks,
        CheckKind::References,
        CheckKind::Glossary,
        CheckKind::Frontmatter,
        CheckKind::Mermaid,
        CheckKind::Math,
    ];

    /// Stable machine name, used as the issue category.
    pub fn as_str(self) -> &'static str {
        match self {
            CheckKind::Wikilinks => "wikilinks",
            CheckKind::References => "references",
            CheckKind::Glossary => "glossary",
            CheckKind::Frontmatter => "frontmatter",
            CheckKind::Mermaid => "mermaid",
            CheckKind::Math => "math",
        }
    }

    /// Report section header.
    pub fn title(self) -> &'static str {
        match self {
            CheckKind::Wikilinks => "Validating wikilinks",
            CheckKind::References => "Validating references",
            CheckKind::Glossary => "Checking glossary completeness",
            CheckKind::Frontmatter => "Validating YAML front-matter",
            CheckKind::Mermaid => "Verifying Mermaid diagrams",
            CheckKind::Math => "Checking mathematical notation",
        }
    }
}

impl Display for CheckKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding. Informational only; issues never abort a run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Issue {
    pub check: CheckKind,
    /// Root-relative POSIX path, absent for findings about the corpus as a whole.
    pub path: Option<String>,
    pub line: Option<usize>,
    pub message: String,
}

impl Issue {
    pub fn new(
        check: CheckKind,
        path: impl Into<String>,
        message: impl Into<String>,
        line: Option<usize>,
    ) -> Self {
        Self {
            check,
            path: Some(path.into()),
            line,
            message: message.into(),
        }
    }

    /// A finding not tied to a single document (e.g. an undefined citation).
    pub fn global(check: CheckKind, message: impl Into<String>) -> Self {
        Self {
            check,
            path: None,
            line: None,
            message: message.into(),
        }
    }

    pub fn location(&self) -> Option<String> {
        let path = self.path.as_ref()?;
        Some(match self.line {
            Some(line) => format!("{path}:{line}"),
            None => path.clone(),
        })
    }
}

impl Display for Issue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.location() {
            Some(loc) => write!(f, "{loc} - {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

impl CheckStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Warn => "WARN",
            CheckStatus::Fail => "FAIL",
        }
    }
}

/// A document left out of a check because it could not be read.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

/// Result of running one check over the corpus.
#[derive(Clone, Debug)]
pub struct CheckOutcome {
    pub check: CheckKind,
    pub status: CheckStatus,
    /// One-line verdict printed next to the status.
    pub headline: String,
    pub issues: Vec<Issue>,
    pub stats: BTreeMap<&'static str, usize>,
    pub skipped: Vec<SkippedFile>,
}

impl CheckOutcome {
    pub fn new(check: CheckKind) -> Self {
        Self {
            check,
            status: CheckStatus::Pass,
            headline: String::new(),
            issues: Vec::new(),
            stats: BTreeMap::new(),
            skipped: Vec::new(),
        }
    }

    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>, line: Option<usize>) {
        self.issues.push(Issue::new(self.check, path, message, line));
    }

    pub fn push_global(&mut self, message: impl Into<String>) {
        self.issues.push(Issue::global(self.check, message));
    }

    pub fn stat(&mut self, key: &'static str, value: usize) {
        self.stats.insert(key, value);
    }

    pub fn stat_value(&self, key: &str) -> Option<usize> {
        self.stats.get(key).copied()
    }

    pub fn finish(mut self, status: CheckStatus, headline: impl Into<String>) -> Self {
        self.status = status;
        self.headline = headline.into();
        self
    }

    /// Shorthand for the common "pass when clean, `status` otherwise" verdict.
    pub fn finish_with(
        self,
        failing: CheckStatus,
        clean: impl Into<String>,
        dirty: impl Into<String>,
    ) -> Self {
        if self.issues.is_empty() {
            self.finish(CheckStatus::Pass, clean)
        } else {
            self.finish(failing, dirty)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_display_includes_location_when_known() {
        let issue = Issue::new(CheckKind::Wikilinks, "notes/a.md", "broken", Some(4));
        assert_eq!(issue.to_string(), "notes/a.md:4 - broken");
        let issue = Issue::global(CheckKind::References, "[FOO-1] cited but not defined");
        assert_eq!(issue.to_string(), "[FOO-1] cited but not defined");
    }

    #[test]
    fn finish_with_picks_status_from_issue_list() {
        let clean = CheckOutcome::new(CheckKind::Math).finish_with(CheckStatus::Warn, "ok", "bad");
        assert_eq!(clean.status, CheckStatus::Pass);
        assert_eq!(clean.headline, "ok");

        let mut dirty = CheckOutcome::new(CheckKind::Math);
        dirty.push("a.md", "odd", None);
        let dirty = dirty.finish_with(CheckStatus::Warn, "ok", "bad");
        assert_eq!(dirty.status, CheckStatus::Warn);
        assert_eq!(dirty.headline, "bad");
    }
}
