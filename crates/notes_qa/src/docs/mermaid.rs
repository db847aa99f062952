//! Shallow Mermaid checks: each ```` ```mermaid ```` block must open with a known diagram type.
//!
//! This is a lexical check only. A malformed diagram of a recognized type passes.

use crate::docs::corpus::Corpus;
use crate::docs::{CheckKind, CheckOutcome, CheckStatus};
use tracing::info;

const MERMAID_LANG: &str = "mermaid";
const FENCE: &str = "```";
const PREVIEW_CHARS: usize = 100;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DiagramBlock {
    /// 1-based line of the opening fence.
    pub line: usize,
    /// Trimmed block body.
    pub source: String,
}

/// Mermaid blocks of a document, plus the opening line of an unterminated mermaid fence.
///
/// Fences may be indented (list items) and may carry attributes after the language
/// (```` ```js title="x" ````). Only a bare run of backticks closes a block.
pub fn extract_mermaid_blocks(text: &str) -> (Vec<DiagramBlock>, Option<usize>) {
    let mut blocks = Vec::new();
    let mut in_fence = false;
    let mut fence_lang = String::new();
    let mut fence_start_line = 0usize;
    let mut buffer: Vec<&str> = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line_no = line_no + 1;
        if !in_fence {
            if let Some(lang) = parse_fence_lang(line) {
                in_fence = true;
                fence_lang = lang.to_lowercase();
                fence_start_line = line_no;
                buffer.clear();
            }
            continue;
        }

        if is_closing_fence(line) {
            if fence_lang == MERMAID_LANG {
                blocks.push(DiagramBlock {
                    line: fence_start_line,
                    source: buffer.join("\n").trim().to_string(),
                });
            }
            in_fence = false;
            fence_lang.clear();
            buffer.clear();
            continue;
        }
        buffer.push(line);
    }

    let unclosed = (in_fence && fence_lang == MERMAID_LANG).then_some(fence_start_line);
    (blocks, unclosed)
}

/// Case-sensitive prefix match against the recognized diagram keywords.
pub fn has_known_diagram_type(source: &str, keywords: &[String]) -> bool {
    let source = source.trim();
    keywords.iter().any(|kw| source.starts_with(kw.as_str()))
}

pub fn validate_mermaid(corpus: &Corpus, keywords: &[String]) -> CheckOutcome {
    let mut outcome = CheckOutcome::new(CheckKind::Mermaid);
    let mut total = 0usize;
    let mut invalid = 0usize;

    for path in corpus.files() {
        let Some(doc) = corpus.read_or_skip(path, &mut outcome) else {
            continue;
        };
        let (blocks, unclosed) = extract_mermaid_blocks(&doc.text);
        for block in blocks {
            total += 1;
            if has_known_diagram_type(&block.source, keywords) {
                continue;
            }
            invalid += 1;
            let message = if block.source.is_empty() {
                "empty mermaid block".to_string()
            } else {
                format!("unrecognized diagram type: `{}`", preview(&block.source))
            };
            outcome.push(doc.rel_path.clone(), message, Some(block.line));
        }
        if let Some(line) = unclosed {
            outcome.push(doc.rel_path.clone(), "unclosed mermaid fence", Some(line));
        }
    }

    outcome.stat("total_mermaid", total);
    outcome.stat("invalid_mermaid", invalid);
    info!(total, invalid, "mermaid check complete");

    let count = outcome.issues.len();
    outcome.finish_with(
        CheckStatus::Warn,
        format!("All {total} Mermaid diagrams have a recognized type"),
        format!("{count} potentially invalid Mermaid diagrams"),
    )
}

fn preview(source: &str) -> String {
    if source.chars().count() > PREVIEW_CHARS {
        let head: String = source.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        source.to_string()
    }
}

/// Language of an opening fence: the first word of the info string, attributes dropped.
fn parse_fence_lang(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix(FENCE)?;
    let info = rest.trim_start_matches('`');
    Some(info.split_whitespace().next().unwrap_or(""))
}

fn is_closing_fence(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= FENCE.len() && trimmed.chars().all(|ch| ch == '`')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::DIAGRAM_KEYWORDS;
    use pretty_assertions::assert_eq;

    fn keywords() -> Vec<String> {
        DIAGRAM_KEYWORDS.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn extract_collects_only_mermaid_fences() {
        let text = "# Title\n\
            ```rust\n\
            fn main() {}\n\
            ```\n\
            ```mermaid\n\
            \n\
            sequenceDiagram\n\
            A->>B: propose\n\
            ```\n";
        let (blocks, unclosed) = extract_mermaid_blocks(text);
        assert_eq!(
            blocks,
            vec![DiagramBlock {
                line: 5,
                source: "sequenceDiagram\nA->>B: propose".into(),
            }]
        );
        assert_eq!(unclosed, None);
    }

    #[test]
    fn keyword_match_is_prefix_and_case_sensitive() {
        let keywords = keywords();
        assert!(has_known_diagram_type("sequenceDiagram\nA->>B: x", &keywords));
        assert!(has_known_diagram_type("  graph TD\nA-->B", &keywords));
        assert!(has_known_diagram_type("stateDiagram-v2", &keywords));
        assert!(!has_known_diagram_type("sequence\nA->>B: x", &keywords));
        assert!(!has_known_diagram_type("SequenceDiagram", &keywords));
        assert!(!has_known_diagram_type("", &keywords));
    }

    #[test]
    fn unclosed_mermaid_fence_is_reported() {
        let (blocks, unclosed) = extract_mermaid_blocks("text\n```mermaid\ngraph TD\n");
        assert!(blocks.is_empty());
        assert_eq!(unclosed, Some(2));

        let (_, unclosed) = extract_mermaid_blocks("```python\nx = 1\n");
        assert_eq!(unclosed, None);
    }

    #[test]
    fn attributed_fence_does_not_hide_later_diagrams() {
        let text = "```js title=\"demo.js\"\n\
            let x = 1;\n\
            ```\n\
            \n\
            ```mermaid\n\
            sequence\n\
            A->>B: x\n\
            ```\n";
        let (blocks, unclosed) = extract_mermaid_blocks(text);
        assert_eq!(
            blocks,
            vec![DiagramBlock {
                line: 5,
                source: "sequence\nA->>B: x".into(),
            }]
        );
        assert_eq!(unclosed, None);
        assert!(!has_known_diagram_type(&blocks[0].source, &keywords()));
    }

    #[test]
    fn indented_fence_inside_list_item_is_extracted() {
        let (blocks, unclosed) = extract_mermaid_blocks("- step\n  ```mermaid\n  bogus\n  ```\n");
        assert_eq!(
            blocks,
            vec![DiagramBlock {
                line: 2,
                source: "bogus".into(),
            }]
        );
        assert_eq!(unclosed, None);
    }

    #[test]
    fn fence_language_ignores_attributes_and_indentation() {
        assert_eq!(parse_fence_lang("```mermaid"), Some("mermaid"));
        assert_eq!(parse_fence_lang("   ```Mermaid   "), Some("Mermaid"));
        assert_eq!(parse_fence_lang("```js title=\"x\""), Some("js"));
        assert_eq!(parse_fence_lang("````mermaid"), Some("mermaid"));
        assert_eq!(parse_fence_lang("```"), Some(""));
        assert_eq!(parse_fence_lang("text ```mermaid"), None);
        assert!(is_closing_fence("  ```  "));
        assert!(!is_closing_fence("```mermaid"));
    }

    #[test]
    fn preview_truncates_long_sources() {
        let long = "x".repeat(150);
        assert_eq!(preview(&long), format!("{}...", "x".repeat(100)));
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn validate_counts_blocks_and_flags_unknown_types() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("diagrams.md"),
            "```mermaid\nflowchart LR\nA-->B\n```\n\n```mermaid\nsequence\nA->>B: x\n```\n\n```mermaid\n```\n",
        )
        .expect("write");
        let corpus = Corpus::discover(dir.path()).expect("discover");

        let outcome = validate_mermaid(&corpus, &keywords());
        assert_eq!(outcome.status, CheckStatus::Warn);
        assert_eq!(outcome.stat_value("total_mermaid"), Some(3));
        assert_eq!(outcome.stat_value("invalid_mermaid"), Some(2));
        let messages: Vec<&str> = outcome.issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["unrecognized diagram type: `sequence\nA->>B: x`", "empty mermaid block"]
        );
        assert_eq!(outcome.issues[0].line, Some(6));
    }
}
