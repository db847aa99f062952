//! Citation audit: every cited identifier must be defined in the references document.

use crate::docs::corpus::Corpus;
use crate::docs::frontmatter::parse_front_matter;
use crate::docs::{CheckKind, CheckOutcome, CheckStatus};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

static CITATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([A-Z0-9-]+)\]").expect("valid citation pattern"));

const REFERENCES_KEY: &str = "references";

/// Every bracketed identifier in the references document.
pub fn defined_citations(text: &str) -> BTreeSet<String> {
    CITATION_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Bracketed identifiers used inline.
///
/// A token immediately followed by `:` is treated as a definition line and skipped. This also
/// skips a genuine citation that happens to precede a colon.
pub fn inline_citations(text: &str) -> BTreeSet<String> {
    CITATION_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            if text[whole.end()..].starts_with(':') {
                return None;
            }
            caps.get(1).map(|m| m.as_str().to_string())
        })
        .collect()
}

/// Identifiers listed in the document's `references` front-matter sequence.
///
/// Unparsable front-matter contributes nothing; the front-matter check reports it.
pub fn front_matter_citations(text: &str) -> Vec<String> {
    match parse_front_matter(text) {
        Ok(Some(front_matter)) => front_matter.string_list(REFERENCES_KEY).unwrap_or_default(),
        Ok(None) | Err(_) => Vec::new(),
    }
}

/// `used − defined`, in lexical order.
pub fn undefined_citations(used: &BTreeSet<String>, defined: &BTreeSet<String>) -> Vec<String> {
    used.difference(defined).cloned().collect()
}

pub fn validate_references(corpus: &Corpus, references_path: &Path) -> CheckOutcome {
    let mut outcome = CheckOutcome::new(CheckKind::References);
    let references_name = references_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let defined = match fs::read_to_string(references_path) {
        Ok(text) => defined_citations(&text),
        Err(err) => {
            let message = if err.kind() == ErrorKind::NotFound {
                format!("{references_name} not found")
            } else {
                format!("failed to read {references_name}: {err}")
            };
            outcome.push_global(message.clone());
            return outcome.finish(CheckStatus::Fail, message);
        }
    };
    debug!(count = defined.len(), "loaded reference definitions");

    let mut used = BTreeSet::new();
    for path in corpus.files() {
        if path.file_name().is_some_and(|name| name == references_name.as_str()) {
            continue;
        }
        let Some(doc) = corpus.read_or_skip(path, &mut outcome) else {
            continue;
        };
        used.extend(front_matter_citations(&doc.text));
        used.extend(inline_citations(&doc.text));
    }

    let undefined = undefined_citations(&used, &defined);
    for id in &undefined {
        outcome.push_global(format!("[{id}] cited but not defined in {references_name}"));
    }

    outcome.stat("total_references", defined.len());
    outcome.stat("cited_references", used.len());
    outcome.stat("uncited_references", undefined.len());
    info!(
        defined = defined.len(),
        used = used.len(),
        undefined = undefined.len(),
        "reference check complete"
    );

    let count = undefined.len();
    outcome.finish_with(
        CheckStatus::Warn,
        format!(
            "All cited references are defined ({} definitions in {references_name})",
            defined.len()
        ),
        format!("{count} references cited but not defined"),
    )
}
