use crate::cache;
use crate::edit::Edit;
use crate::rewrite::errors::RuleError;
use regex::{Match, Regex};
use std::fmt;
use tracing::{debug, info};

/// One textual transformation over the whole artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteRule {
    /// Every non-overlapping occurrence of `find` becomes `replace`.
    /// Never fails; zero occurrences leave the text unchanged.
    LiteralReplace { find: String, replace: String },
    /// Splice `text` immediately before the first match of `pattern`.
    InsertBefore { pattern: String, text: String },
    /// Splice `text` in place of the first match of `pattern`.
    ReplaceMatch { pattern: String, text: String },
    /// Insert every line of `imports` not already contained in the current
    /// text immediately before the first match of `anchor`.
    MergeImports { anchor: String, imports: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Literal,
    InsertBefore,
    ReplaceMatch,
    MergeImports,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleKind::Literal => "literal",
            RuleKind::InsertBefore => "insert-before",
            RuleKind::ReplaceMatch => "replace-match",
            RuleKind::MergeImports => "merge-imports",
        };
        f.write_str(name)
    }
}

/// What a successful rule did to the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Replaced { occurrences: usize },
    InsertedAt { offset: usize },
    ReplacedSpan { start: usize, end: usize },
    MergedImports { offset: usize, kept: usize, dropped: usize },
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Replaced { occurrences } => write!(f, "{occurrences} occurrence(s)"),
            StepOutcome::InsertedAt { offset } => write!(f, "inserted at {offset}"),
            StepOutcome::ReplacedSpan { start, end } => write!(f, "replaced [{start}, {end})"),
            StepOutcome::MergedImports {
                offset,
                kept,
                dropped,
            } => write!(f, "{kept} import line(s) at {offset}, {dropped} already present"),
        }
    }
}

impl RewriteRule {
    pub fn kind(&self) -> RuleKind {
        match self {
            RewriteRule::LiteralReplace { .. } => RuleKind::Literal,
            RewriteRule::InsertBefore { .. } => RuleKind::InsertBefore,
            RewriteRule::ReplaceMatch { .. } => RuleKind::ReplaceMatch,
            RewriteRule::MergeImports { .. } => RuleKind::MergeImports,
        }
    }

    /// The literal or regex this rule locates its target with.
    pub fn anchor(&self) -> &str {
        match self {
            RewriteRule::LiteralReplace { find, .. } => find,
            RewriteRule::InsertBefore { pattern, .. } | RewriteRule::ReplaceMatch { pattern, .. } => {
                pattern
            }
            RewriteRule::MergeImports { anchor, .. } => anchor,
        }
    }

    /// Apply this rule to `content`. `step` names the rule in diagnostics.
    pub fn apply(&self, step: &str, content: &str) -> Result<(String, StepOutcome), RuleError> {
        match self {
            RewriteRule::LiteralReplace { find, replace } => {
                let occurrences = if find.is_empty() {
                    0
                } else {
                    content.matches(find.as_str()).count()
                };
                debug!(step, occurrences, "literal replace");
                if occurrences == 0 {
                    return Ok((content.to_string(), StepOutcome::Replaced { occurrences }));
                }
                Ok((
                    content.replace(find.as_str(), replace),
                    StepOutcome::Replaced { occurrences },
                ))
            }
            RewriteRule::InsertBefore { pattern, text } => {
                let found = locate(step, pattern, content)?;
                info!(step, pattern = %pattern, offset = found.start(), "found match");
                let out = splice(step, Edit::insertion(found.start(), text.as_str()), content)?;
                Ok((out, StepOutcome::InsertedAt { offset: found.start() }))
            }
            RewriteRule::ReplaceMatch { pattern, text } => {
                let found = locate(step, pattern, content)?;
                info!(step, pattern = %pattern, offset = found.end(), "found match");
                let edit = Edit::new(found.start(), found.end(), text.as_str(), found.as_str());
                let out = splice(step, edit, content)?;
                Ok((
                    out,
                    StepOutcome::ReplacedSpan {
                        start: found.start(),
                        end: found.end(),
                    },
                ))
            }
            RewriteRule::MergeImports { anchor, imports } => {
                let (kept, dropped) = filter_imports(imports, content);
                let found = locate(step, anchor, content)?;
                info!(step, pattern = %anchor, offset = found.start(), "found match");
                let offset = found.start();
                let out = splice(step, Edit::insertion(offset, kept.concat()), content)?;
                Ok((
                    out,
                    StepOutcome::MergedImports {
                        offset,
                        kept: kept.len(),
                        dropped,
                    },
                ))
            }
        }
    }
}

/// Keep the import lines that do not already occur anywhere in `content`.
///
/// Containment is a substring test against the whole text, not a line
/// comparison, so blank lines are always dropped. Survivors keep their
/// order and each gets a `\n` terminator.
pub fn filter_imports(imports: &str, content: &str) -> (Vec<String>, usize) {
    let mut kept = Vec::new();
    let mut dropped = 0;
    for line in imports.split('\n') {
        if content.contains(line) {
            dropped += 1;
        } else {
            kept.push(format!("{line}\n"));
        }
    }
    (kept, dropped)
}

fn compile(step: &str, pattern: &str) -> Result<Regex, RuleError> {
    cache::get_or_compile(pattern).map_err(|source| RuleError::InvalidPattern {
        step: step.to_string(),
        pattern: pattern.to_string(),
        source,
    })
}

fn locate<'t>(step: &str, pattern: &str, content: &'t str) -> Result<Match<'t>, RuleError> {
    compile(step, pattern)?
        .find(content)
        .ok_or_else(|| RuleError::AnchorNotFound {
            step: step.to_string(),
            pattern: pattern.to_string(),
        })
}

fn splice(step: &str, edit: Edit, content: &str) -> Result<String, RuleError> {
    edit.apply_to(content).map_err(|source| RuleError::Edit {
        step: step.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(find: &str, replace: &str) -> RewriteRule {
        RewriteRule::LiteralReplace {
            find: find.to_string(),
            replace: replace.to_string(),
        }
    }

    #[test]
    fn test_literal_replaces_all() {
        let (out, outcome) = literal("newYaml().", "")
            .apply("t", "newYaml().dump(a); newYaml().load(b);")
            .unwrap();
        assert_eq!(out, "dump(a); load(b);");
        assert_eq!(outcome, StepOutcome::Replaced { occurrences: 2 });
    }

    #[test]
    fn test_literal_without_match_is_identity() {
        let input = "protected FileConfiguration(String path) {}";
        let (out, outcome) = literal("public FileConfiguration(", "protected FileConfiguration(")
            .apply("t", input)
            .unwrap();
        assert_eq!(out, input);
        assert_eq!(outcome, StepOutcome::Replaced { occurrences: 0 });
    }

    #[test]
    fn test_empty_literal_is_identity() {
        let (out, _) = literal("", "x").apply("t", "abc").unwrap();
        assert_eq!(out, "abc");
    }

    #[test]
    fn test_insert_before_first_match() {
        let rule = RewriteRule::InsertBefore {
            pattern: "b+".to_string(),
            text: "[".to_string(),
        };
        let (out, outcome) = rule.apply("t", "aabbcbb").unwrap();
        assert_eq!(out, "aa[bbcbb");
        assert_eq!(outcome, StepOutcome::InsertedAt { offset: 2 });
    }

    #[test]
    fn test_replace_match_span() {
        let rule = RewriteRule::ReplaceMatch {
            pattern: r"\}\n*$".to_string(),
            text: "    void extra() {}\n}\n".to_string(),
        };
        let (out, outcome) = rule.apply("t", "class A {\n}\n\n").unwrap();
        assert_eq!(out, "class A {\n    void extra() {}\n}\n");
        assert_eq!(outcome, StepOutcome::ReplacedSpan { start: 10, end: 13 });
    }

    #[test]
    fn test_anchor_not_found_names_pattern() {
        let rule = RewriteRule::InsertBefore {
            pattern: "import".to_string(),
            text: "x".to_string(),
        };
        let err = rule.apply("merge", "class A {}").unwrap_err();
        assert!(matches!(err, RuleError::AnchorNotFound { ref pattern, .. } if pattern == "import"));
        assert_eq!(err.step(), "merge");
        assert!(err.to_string().contains("\"import\""));
    }

    #[test]
    fn test_invalid_pattern() {
        let rule = RewriteRule::ReplaceMatch {
            pattern: "(".to_string(),
            text: String::new(),
        };
        assert!(matches!(
            rule.apply("t", "abc"),
            Err(RuleError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_filter_imports_containment() {
        let content = "import java.io.File;\nimport java.util.Map;\n";
        let imports = "import java.io.File;\nimport java.io.InputStream;\n\nimport java.util.Map;\n";
        let (kept, dropped) = filter_imports(imports, content);
        assert_eq!(kept, vec!["import java.io.InputStream;\n".to_string()]);
        assert_eq!(dropped, 4);
    }

    #[test]
    fn test_filter_imports_substring_overmatch() {
        // A partial line counts as present: containment, not line equality.
        let content = "import java.io.FileNotFoundException;\n";
        let (kept, _) = filter_imports("import java.io.Fil", content);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_merge_imports_inserts_before_first_import() {
        let rule = RewriteRule::MergeImports {
            anchor: "import".to_string(),
            imports: "import a.B;\nimport c.D;\n".to_string(),
        };
        let content = "package p;\n\nimport c.D;\n";
        let (out, outcome) = rule.apply("t", content).unwrap();
        assert_eq!(out, "package p;\n\nimport a.B;\nimport c.D;\n");
        assert_eq!(
            outcome,
            StepOutcome::MergedImports {
                offset: 12,
                kept: 1,
                dropped: 2
            }
        );
    }

    #[test]
    fn test_merge_imports_requires_anchor() {
        let rule = RewriteRule::MergeImports {
            anchor: "import".to_string(),
            imports: String::new(),
        };
        assert!(matches!(
            rule.apply("t", "class A {}"),
            Err(RuleError::AnchorNotFound { .. })
        ));
    }
}
