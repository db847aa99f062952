//! Runs the selected checks and renders the results.

use crate::docs::corpus::Corpus;
use crate::docs::{
    frontmatter, glossary, math, mermaid, references, wikilinks, CheckKind, CheckOutcome,
};
use crate::runtime::config::QaConfig;
use crate::runtime::error::{QaError, QaResult};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const RULE_WIDTH: usize = 80;

/// Owns the run configuration and the discovered corpus.
#[derive(Clone, Debug)]
pub struct Auditor {
    config: QaConfig,
    corpus: Corpus,
}

impl Auditor {
    /// Discover the corpus under `config.content_root`.
    pub fn new(config: QaConfig) -> QaResult<Self> {
        let corpus = Corpus::discover(&config.content_root)?;
        Ok(Self { config, corpus })
    }

    pub fn config(&self) -> &QaConfig {
        &self.config
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Run one check.
    pub fn run_check(&self, kind: CheckKind) -> CheckOutcome {
        debug!(check = %kind, "running check");
        let config = &self.config;
        match kind {
            CheckKind::Wikilinks => wikilinks::validate_wikilinks(&self.corpus),
            CheckKind::References => {
                references::validate_references(&self.corpus, &config.references_path())
            }
            CheckKind::Glossary => {
                glossary::validate_glossary(&config.glossary_path(), &config.required_terms)
            }
            CheckKind::Frontmatter => {
                frontmatter::validate_front_matter(&self.corpus, &config.required_fields)
            }
            CheckKind::Mermaid => mermaid::validate_mermaid(&self.corpus, &config.diagram_keywords),
            CheckKind::Math => math::validate_math(&self.corpus),
        }
    }

    /// Run the selected checks (all of them when `checks` is empty) in report order.
    pub fn run(&self, checks: &[CheckKind]) -> AuditReport {
        let selected: Vec<CheckKind> = CheckKind::ALL
            .into_iter()
            .filter(|kind| checks.is_empty() || checks.contains(kind))
            .collect();
        let outcomes = selected.into_iter().map(|kind| self.run_check(kind)).collect();
        let report = AuditReport {
            content_root: self.config.content_root.display().to_string(),
            files_analyzed: self.corpus.len(),
            sample_limit: self.config.sample_limit,
            outcomes,
        };
        info!(
            files = report.files_analyzed,
            issues = report.total_issues(),
            "audit complete"
        );
        report
    }
}

/// Everything one run produced.
#[derive(Clone, Debug)]
pub struct AuditReport {
    pub content_root: String,
    pub files_analyzed: usize,
    pub sample_limit: usize,
    pub outcomes: Vec<CheckOutcome>,
}

impl AuditReport {
    pub fn outcome(&self, kind: CheckKind) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|outcome| outcome.check == kind)
    }

    pub fn total_issues(&self) -> usize {
        self.outcomes.iter().map(|outcome| outcome.issues.len()).sum()
    }

    /// Every statistic of every check, keyed by name.
    pub fn statistics(&self) -> BTreeMap<&'static str, usize> {
        self.outcomes
            .iter()
            .flat_map(|outcome| outcome.stats.iter().map(|(k, v)| (*k, *v)))
            .collect()
    }

    pub fn stat(&self, key: &str) -> Option<usize> {
        self.statistics().get(key).copied()
    }

    /// Human-readable report.
    pub fn render(&self) -> String {
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);
        let mut out = String::new();

        let _ = writeln!(out, "{heavy}");
        let _ = writeln!(out, "Knowledge Base Quality Assurance");
        let _ = writeln!(out, "{heavy}");
        let _ = writeln!(out);

        for outcome in &self.outcomes {
            let _ = writeln!(out, "{}...", outcome.check.title());
            let _ = writeln!(out, "{light}");
            let _ = writeln!(out, "{}: {}", outcome.status.as_str(), outcome.headline);
            for issue in outcome.issues.iter().take(self.sample_limit) {
                let _ = writeln!(out, "  - {issue}");
            }
            if outcome.issues.len() > self.sample_limit {
                let _ = writeln!(
                    out,
                    "  ... and {} more",
                    outcome.issues.len() - self.sample_limit
                );
            }
            for skipped in &outcome.skipped {
                let _ = writeln!(
                    out,
                    "  skipped unreadable file {}: {}",
                    skipped.path, skipped.reason
                );
            }
            let _ = writeln!(out);
        }

        let _ = writeln!(out, "{heavy}");
        let _ = writeln!(out, "SUMMARY");
        let _ = writeln!(out, "{heavy}");
        let _ = writeln!(out);
        let _ = writeln!(out, "Total files analyzed: {}", self.files_analyzed);
        let _ = writeln!(out);
        let _ = writeln!(out, "Statistics:");
        for (key, value) in self.statistics() {
            let _ = writeln!(out, "  - {}: {value}", title_case(key));
        }
        let _ = writeln!(out);

        let total = self.total_issues();
        if total == 0 {
            let _ = writeln!(out, "OVERALL STATUS: PASS - no issues found");
        } else {
            let _ = writeln!(out, "OVERALL STATUS: {total} issue(s) found");
            let _ = writeln!(out);
            let _ = writeln!(out, "Issues by category:");
            for outcome in self.outcomes.iter().filter(|o| !o.issues.is_empty()) {
                let _ = writeln!(out, "  {}: {} issues", outcome.check, outcome.issues.len());
            }
        }
        out
    }

    /// Machine-readable audit document.
    pub fn to_json(&self) -> Value {
        let mut checks = Map::new();
        for outcome in &self.outcomes {
            let issues: Vec<Value> = outcome
                .issues
                .iter()
                .map(|issue| {
                    json!({
                        "path": issue.path,
                        "line": issue.line,
                        "message": issue.message,
                    })
                })
                .collect();
            let skipped: Vec<Value> = outcome
                .skipped
                .iter()
                .map(|s| json!({ "path": s.path, "reason": s.reason }))
                .collect();
            checks.insert(
                outcome.check.as_str().to_string(),
                json!({
                    "status": outcome.status.as_str(),
                    "summary": outcome.headline,
                    "statistics": outcome.stats,
                    "issues": issues,
                    "skipped": skipped,
                }),
            );
        }

        json!({
            "generated_at": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            "content_root": self.content_root,
            "files_analyzed": self.files_analyzed,
            "total_issues": self.total_issues(),
            "checks": checks,
        })
    }

    /// Write [`AuditReport::to_json`] to `output`, creating parent directories.
    pub fn write_json(&self, output: &Path) -> QaResult<()> {
        let context = |err: QaError| {
            err.with_operation("write audit report")
                .with_path(output)
                .with_hint("pass `--report` a writable path")
        };
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|err| context(QaError::io(format!("failed to create directory: {err}"))))?;
        }
        let body = serde_json::to_string_pretty(&self.to_json())
            .map_err(|err| context(QaError::io(format!("failed to serialize report: {err}"))))?;
        fs::write(output, format!("{body}\n"))
            .map_err(|err| context(QaError::io(format!("failed to write report: {err}"))))?;
        info!(path = %output.display(), "wrote audit report");
        Ok(())
    }

    /// `Ok` when no check produced an issue.
    pub fn fail_if_issues(&self) -> QaResult<()> {
        match self.total_issues() {
            0 => Ok(()),
            n => Err(QaError::validation(format!(
                "knowledge base validation failed: {n} issue(s)"
            ))),
        }
    }
}

/// `broken_wikilinks` -> `Broken Wikilinks`.
fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
