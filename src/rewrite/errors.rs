use crate::edit::EditError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("rule '{step}': could not find any string matching the regex \"{pattern}\" in content")]
    AnchorNotFound { step: String, pattern: String },

    #[error("rule '{step}': invalid regex \"{pattern}\": {source}")]
    InvalidPattern {
        step: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("rule '{step}': {source}")]
    Edit {
        step: String,
        #[source]
        source: EditError,
    },
}

impl RuleError {
    /// Name of the rule that failed.
    pub fn step(&self) -> &str {
        match self {
            RuleError::AnchorNotFound { step, .. }
            | RuleError::InvalidPattern { step, .. }
            | RuleError::Edit { step, .. } => step,
        }
    }
}
