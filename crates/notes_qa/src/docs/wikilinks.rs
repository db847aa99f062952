//! `[[wikilink]]` extraction and resolution.

use crate::docs::corpus::Corpus;
use crate::docs::{CheckKind, CheckOutcome, CheckStatus};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

static WIKILINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\]]+)\]\]").expect("valid wikilink pattern"));

/// One `[[...]]` token. `target` is empty for anchor-only or label-only links.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Wikilink {
    /// Text between the brackets, unmodified.
    pub raw: String,
    pub target: String,
    pub display: Option<String>,
    pub anchor: Option<String>,
    /// 1-based line of the opening brackets.
    pub line: usize,
}

impl Wikilink {
    /// Split `target#anchor|display` into its parts.
    pub fn parse(raw: &str, line: usize) -> Self {
        let (link, display) = match raw.split_once('|') {
            Some((link, display)) => (link, Some(display.trim().to_string())),
            None => (raw, None),
        };
        let (target, anchor) = match link.split_once('#') {
            Some((target, anchor)) => (target, Some(anchor.trim().to_string())),
            None => (link, None),
        };
        Self {
            raw: raw.to_string(),
            target: target.trim().to_string(),
            display,
            anchor,
            line,
        }
    }
}

pub fn extract_wikilinks(text: &str) -> Vec<Wikilink> {
    WIKILINK_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let inner = caps.get(1)?;
            let line = text[..whole.start()].matches('\n').count() + 1;
            Some(Wikilink::parse(inner.as_str(), line))
        })
        .collect()
}

/// Which lookup found the target.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Resolution {
    SourceDir,
    ContentRoot,
    AnyStem,
}

/// Resolves wikilink targets against the files of one corpus.
#[derive(Clone, Debug)]
pub struct WikilinkResolver<'a> {
    root: &'a Path,
    stems: HashSet<String>,
}

impl<'a> WikilinkResolver<'a> {
    pub fn new(corpus: &'a Corpus) -> Self {
        Self {
            root: corpus.root(),
            stems: corpus.stems(),
        }
    }

    /// Try `<source dir>/<target>.md`, then `<root>/<target>.md`, then any file stem.
    ///
    /// Callers must reject empty targets first; they never resolve.
    pub fn resolve(&self, source: &Path, target: &str) -> Option<Resolution> {
        if target.is_empty() {
            return None;
        }
        let file_name = format!("{target}.md");
        let source_dir = source.parent().unwrap_or(self.root);
        if source_dir.join(&file_name).exists() {
            return Some(Resolution::SourceDir);
        }
        if self.root.join(&file_name).exists() {
            return Some(Resolution::ContentRoot);
        }
        if self.stems.contains(target) {
            return Some(Resolution::AnyStem);
        }
        None
    }
}

pub fn validate_wikilinks(corpus: &Corpus) -> CheckOutcome {
    let mut outcome = CheckOutcome::new(CheckKind::Wikilinks);
    let resolver = WikilinkResolver::new(corpus);
    let mut total = 0usize;

    for path in corpus.files() {
        let Some(doc) = corpus.read_or_skip(path, &mut outcome) else {
            continue;
        };
        for link in extract_wikilinks(&doc.text) {
            total += 1;
            if link.target.is_empty() {
                outcome.push(
                    doc.rel_path.clone(),
                    format!("[[{}]] has an empty target", link.raw),
                    Some(link.line),
                );
                continue;
            }
            match resolver.resolve(&doc.path, &link.target) {
                Some(how) => {
                    debug!(path = %doc.rel_path, target = %link.target, ?how, "resolved wikilink")
                }
                None => outcome.push(
                    doc.rel_path.clone(),
                    format!("[[{}]] -> target `{}` not found", link.raw, link.target),
                    Some(link.line),
                ),
            }
        }
    }

    let broken = outcome.issues.len();
    outcome.stat("total_wikilinks", total);
    outcome.stat("broken_wikilinks", broken);
    info!(total, broken, "wikilink check complete");

    outcome.finish_with(
        CheckStatus::Fail,
        format!("All {total} wikilinks resolve correctly"),
        format!("Found {broken} broken wikilinks out of {total} total"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn parse_strips_display_text_and_anchor() {
        let link = Wikilink::parse("pbft#View Change|view changes", 3);
        assert_eq!(
            link,
            Wikilink {
                raw: "pbft#View Change|view changes".into(),
                target: "pbft".into(),
                display: Some("view changes".into()),
                anchor: Some("View Change".into()),
                line: 3,
            }
        );
        assert_eq!(Wikilink::parse(" hotstuff ", 1).target, "hotstuff");
        assert_eq!(Wikilink::parse("#Section", 1).target, "");
        assert_eq!(Wikilink::parse("|label", 1).target, "");
    }

    #[test]
    fn extract_reports_line_numbers() {
        let text = "intro [[a]]\n\nsee [[b|B]] and [[c#x]]\n";
        let links = extract_wikilinks(text);
        let found: Vec<(&str, usize)> = links.iter().map(|l| (l.target.as_str(), l.line)).collect();
        assert_eq!(found, vec![("a", 1), ("b", 3), ("c", 3)]);
    }

    #[test]
    fn resolution_is_location_independent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::create_dir_all(root.join("protocols/classic")).expect("mkdir");
        fs::create_dir_all(root.join("theory")).expect("mkdir");
        fs::write(root.join("protocols/classic/pbft.md"), "x").expect("write");
        fs::write(root.join("theory/safety.md"), "x").expect("write");
        fs::write(root.join("index.md"), "x").expect("write");
        fs::write(root.join("protocols/classic/sibling.md"), "x").expect("write");

        let corpus = Corpus::discover(root).expect("discover");
        let resolver = WikilinkResolver::new(&corpus);
        let source = root.join("protocols/classic/pbft.md");

        assert_eq!(resolver.resolve(&source, "sibling"), Some(Resolution::SourceDir));
        assert_eq!(resolver.resolve(&source, "index"), Some(Resolution::ContentRoot));
        assert_eq!(
            resolver.resolve(&source, "theory/safety"),
            Some(Resolution::ContentRoot)
        );
        assert_eq!(resolver.resolve(&source, "safety"), Some(Resolution::AnyStem));
        assert_eq!(resolver.resolve(&source, "liveness"), None);
        assert_eq!(resolver.resolve(&source, ""), None);
    }

    #[test]
    fn validate_flags_missing_and_empty_targets() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::write(root.join("a.md"), "[[b]] [[missing]] [[#Local]]\n").expect("write");
        fs::write(root.join("b.md"), "[[a|back]]\n").expect("write");

        let corpus = Corpus::discover(root).expect("discover");
        let outcome = validate_wikilinks(&corpus);

        assert_eq!(outcome.status, CheckStatus::Fail);
        assert_eq!(outcome.stat_value("total_wikilinks"), Some(4));
        assert_eq!(outcome.stat_value("broken_wikilinks"), Some(2));
        let messages: Vec<&str> = outcome.issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "[[missing]] -> target `missing` not found",
                "[[#Local]] has an empty target",
            ]
        );
    }
}
