use crate::config::RegenConfig;
use crate::payload::AugmentationPayload;
use crate::rewrite::errors::RuleError;
use crate::rewrite::rule::{RewriteRule, RuleKind, StepOutcome};
use tracing::info;

/// Leading class doc comment: `/**`, lines starting with ` *`, then ` */`.
/// Member doc comments are indented further and never match.
pub const CLASS_COMMENT_ANCHOR: &str = r"/\*\*\n( \*([^\n]+)?\n)* \*/";

/// First import statement.
pub const IMPORT_ANCHOR: &str = "import";

/// First member doc comment whose summary does not start with `I`
/// (which skips the `Instantiates a new ...` constructor docs).
pub const FIRST_MEMBER_DOC_ANCHOR: &str = r"/\*\*\n     \* [^I]";

/// The class's closing brace and any trailing newlines.
pub const CLOSING_BRACE_ANCHOR: &str = r"\}\n*$";

/// A named rule in a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleStep {
    pub name: String,
    pub rule: RewriteRule,
}

impl RuleStep {
    pub fn new(name: impl Into<String>, rule: RewriteRule) -> Self {
        Self {
            name: name.into(),
            rule,
        }
    }
}

/// Record of one applied step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepTrace {
    pub name: String,
    pub kind: RuleKind,
    pub outcome: StepOutcome,
}

/// An ordered rule list, applied as a single fold over the text.
///
/// Later anchors assume the text shape left by earlier rules, so the order
/// of `steps` is part of the plan's meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewritePlan {
    steps: Vec<RuleStep>,
}

impl RewritePlan {
    pub fn new(steps: Vec<RuleStep>) -> Self {
        Self { steps }
    }

    /// The fixed sequence that turns the upstream class into an abstract
    /// base class carrying the local helper methods.
    pub fn standard(config: &RegenConfig, payload: &AugmentationPayload) -> Self {
        let class = &config.class_name;
        let literal = |find: String, replace: String| RewriteRule::LiteralReplace { find, replace };

        Self::new(vec![
            RuleStep::new(
                "widen-class",
                literal(
                    format!("public final class {class}"),
                    format!("public abstract class {class}"),
                ),
            ),
            RuleStep::new(
                "drop-dead-calls",
                literal(config.dead_call_prefix.clone(), String::new()),
            ),
            RuleStep::new(
                "protect-constructors",
                literal(format!("public {class}("), format!("protected {class}(")),
            ),
            RuleStep::new(
                "remove-from-string",
                literal(from_string_factory(class), String::new()),
            ),
            RuleStep::new(
                "replace-class-comment",
                RewriteRule::ReplaceMatch {
                    pattern: CLASS_COMMENT_ANCHOR.to_string(),
                    text: config.class_comment.clone(),
                },
            ),
            RuleStep::new(
                "merge-imports",
                RewriteRule::MergeImports {
                    anchor: IMPORT_ANCHOR.to_string(),
                    imports: payload.imports.clone(),
                },
            ),
            RuleStep::new(
                "inject-abstract-methods",
                RewriteRule::InsertBefore {
                    pattern: FIRST_MEMBER_DOC_ANCHOR.to_string(),
                    text: config.abstract_methods.clone(),
                },
            ),
            RuleStep::new(
                "inject-static-methods",
                RewriteRule::ReplaceMatch {
                    pattern: CLOSING_BRACE_ANCHOR.to_string(),
                    text: payload.method_bodies.clone(),
                },
            ),
        ])
    }

    pub fn steps(&self) -> &[RuleStep] {
        &self.steps
    }

    pub fn apply(&self, text: &str) -> Result<String, RuleError> {
        self.apply_traced(text).map(|(out, _)| out)
    }

    /// Apply every step in order, recording what each one did.
    ///
    /// The first failing step aborts the whole plan.
    pub fn apply_traced(&self, text: &str) -> Result<(String, Vec<StepTrace>), RuleError> {
        self.steps.iter().try_fold(
            (text.to_string(), Vec::with_capacity(self.steps.len())),
            |(current, mut trace), step| {
                info!(step = %step.name, kind = %step.rule.kind(), "applying rule");
                let (next, outcome) = step.rule.apply(&step.name, &current)?;
                trace.push(StepTrace {
                    name: step.name.clone(),
                    kind: step.rule.kind(),
                    outcome,
                });
                Ok((next, trace))
            },
        )
    }
}

/// The upstream `fromString` factory with its doc comment. It instantiates
/// the class directly, which an abstract class cannot allow.
fn from_string_factory(class: &str) -> String {
    format!(
        "\n\n    /**\n     * From string file configuration.\n     *\n     \
         * @param string the string\n     * @return the file configuration\n     \
         */\n    public static @NotNull {class} fromString(@NotNull String string) {{\n        \
         return new {class}(new ByteArrayInputStream(string.getBytes()));\n    }}"
    )
}
