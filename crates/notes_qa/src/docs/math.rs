//! `$` delimiter parity.
//!
//! Heuristic only: `$` inside code spans still counts, so the check can over- or under-report on
//! unusual input.

use crate::docs::corpus::Corpus;
use crate::docs::{CheckKind, CheckOutcome, CheckStatus};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

static DISPLAY_MATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\$\$.*?\$\$").expect("valid display math pattern"));

/// `$` characters left after removing two per non-overlapping `$$`.
pub fn stray_dollar_count(text: &str) -> usize {
    let total = text.matches('$').count();
    let doubled = text.matches("$$").count();
    total - 2 * doubled
}

/// An odd residual count suggests an unterminated inline expression.
pub fn has_unbalanced_delimiters(text: &str) -> bool {
    stray_dollar_count(text) % 2 != 0
}

pub fn count_display_math(text: &str) -> usize {
    DISPLAY_MATH_RE.find_iter(text).count()
}

/// Inline expressions: a `$` not followed by `$`, closed by the next `$` on the same line that
/// is not itself followed by `$`.
pub fn count_inline_math(text: &str) -> usize {
    let bytes = text.as_bytes();
    let opens_or_closes = |i: usize| bytes[i] == b'$' && bytes.get(i + 1) != Some(&b'$');
    let mut count = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        if opens_or_closes(i) {
            let close = (i + 1..bytes.len())
                .take_while(|&j| bytes[j] != b'\n')
                .find(|&j| opens_or_closes(j));
            if let Some(j) = close {
                count += 1;
                i = j + 1;
                continue;
            }
        }
        i += 1;
    }

    count
}

pub fn validate_math(corpus: &Corpus) -> CheckOutcome {
    let mut outcome = CheckOutcome::new(CheckKind::Math);
    let mut expressions = 0usize;

    for path in corpus.files() {
        let Some(doc) = corpus.read_or_skip(path, &mut outcome) else {
            continue;
        };
        expressions += count_inline_math(&doc.text) + count_display_math(&doc.text);
        if has_unbalanced_delimiters(&doc.text) {
            let stray = stray_dollar_count(&doc.text);
            outcome.push(
                doc.rel_path,
                format!("mismatched `$` delimiters ({stray} unpaired single `$`)"),
                None,
            );
        }
    }

    let mismatched = outcome.issues.len();
    outcome.stat("total_math_expressions", expressions);
    outcome.stat("mismatched_math_delimiters", mismatched);
    info!(expressions, mismatched, "math notation check complete");

    outcome.finish_with(
        CheckStatus::Warn,
        format!("All {expressions} mathematical expressions have balanced delimiters"),
        format!("{mismatched} files with mismatched $ delimiters"),
    )
}
