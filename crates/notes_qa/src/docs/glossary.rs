//! Glossary coverage of a fixed list of required domain terms.

use crate::docs::{CheckKind, CheckOutcome, CheckStatus};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::info;

/// Level-2 headings, lines opening with a bold span, and bullets opening with a bold span.
static TERM_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"(?m)^##\s+(.+)$").expect("valid heading pattern"),
        Regex::new(r"(?m)^\*\*([^*]+)\*\*").expect("valid bold pattern"),
        Regex::new(r"(?m)^-\s+\*\*([^*]+)\*\*").expect("valid bullet pattern"),
    ]
});

/// Normalized (trimmed, lower-cased) candidate terms of a glossary document.
pub fn glossary_terms(text: &str) -> BTreeSet<String> {
    TERM_PATTERNS
        .iter()
        .flat_map(|re| re.captures_iter(text))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_lowercase())
        .collect()
}

/// Bidirectional substring match, so `bft` is covered by `byzantine fault tolerance (bft)`
/// and `consensus` by a `consensus` heading.
pub fn term_is_covered(required: &str, terms: &BTreeSet<String>) -> bool {
    let required = required.to_lowercase();
    terms
        .iter()
        .any(|term| term.contains(&required) || required.contains(term.as_str()))
}

/// Required terms with no match, in lexical order.
pub fn missing_terms(required: &[String], terms: &BTreeSet<String>) -> Vec<String> {
    let mut missing: Vec<String> = required
        .iter()
        .filter(|term| !term_is_covered(term, terms))
        .cloned()
        .collect();
    missing.sort();
    missing.dedup();
    missing
}

pub fn validate_glossary(glossary_path: &Path, required: &[String]) -> CheckOutcome {
    let mut outcome = CheckOutcome::new(CheckKind::Glossary);
    let glossary_name = glossary_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let text = match fs::read_to_string(glossary_path) {
        Ok(text) => text,
        Err(err) => {
            let message = if err.kind() == ErrorKind::NotFound {
                format!("{glossary_name} not found")
            } else {
                format!("failed to read {glossary_name}: {err}")
            };
            outcome.push_global(message.clone());
            return outcome.finish(CheckStatus::Fail, message);
        }
    };

    let terms = glossary_terms(&text);
    let missing = missing_terms(required, &terms);
    for term in &missing {
        outcome.push(
            glossary_name.clone(),
            format!("expected term `{term}` not in glossary"),
            None,
        );
    }

    outcome.stat("glossary_terms", terms.len());
    outcome.stat("missing_terms", missing.len());
    info!(
        terms = terms.len(),
        missing = missing.len(),
        "glossary check complete"
    );

    let count = missing.len();
    outcome.finish_with(
        CheckStatus::Warn,
        format!("All expected terms are in the glossary ({} terms defined)", terms.len()),
        format!("{count} expected terms not in glossary"),
    )
}
