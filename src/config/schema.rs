use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_URL: &str = "https://raw.githubusercontent.com/Fulminazzo/YAMLParser/main/src/main/java/it/fulminazzo/yamlparser/configuration/FileConfiguration.java";
pub const DEFAULT_AUGMENTATION_PATH: &str = "common/src/main/java/FileConfigurationStaticMethods.java";
pub const DEFAULT_DESTINATION_PATH: &str =
    "common/src/main/java/it/fulminazzo/yamlparser/configuration/FileConfiguration.java";
pub const DEFAULT_CLASS_NAME: &str = "FileConfiguration";
pub const DEFAULT_MARKER: &str = "FileConfigurationStaticMethods";
pub const DEFAULT_SELF_IMPORT: &str = "it.fulminazzo.yamlparser.configuration.FileConfiguration";
pub const DEFAULT_DEAD_CALL_PREFIX: &str = "newYaml().";

pub const DEFAULT_CLASS_COMMENT: &str = "/**\n * A re-implementation of the <a href=\"https://www.github.com/Fulminazzo/YAMLParser\">YAMLParser</a> <b>FileConfiguration</b> class.\n * It provides two new methods to implement: {@link #load(InputStream)} and {@link #dump(Map, Writer)}.\n */";

/// Declarations of the two extension points, inserted before the first
/// method doc comment. The trailing indentation re-indents the displaced
/// comment opener.
pub const DEFAULT_ABSTRACT_METHODS: &str = "/**
     * Load to map.
     *
     * @param stream the stream
     * @return the map
     */
    protected abstract Map<?, ?> load(@NotNull final InputStream stream);

    /**
     * Dump to stream.
     *
     * @param data   the data
     * @param writer the writer
     */
    protected abstract void dump(@NotNull final Map<?, ?> data, @NotNull final Writer writer);

    ";

/// Everything the regeneration pipeline needs to know about one artifact.
///
/// Paths are relative to the project root handed to the pipeline.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RegenConfig {
    /// Raw URL of the upstream artifact.
    pub url: String,
    /// Local file holding the helper-methods container.
    pub augmentation_path: PathBuf,
    /// Where the regenerated artifact is written.
    pub destination_path: PathBuf,
    /// Simple name of the artifact's class.
    pub class_name: String,
    /// Name of the helper-methods container; its declaration line splits
    /// imports from method bodies.
    pub marker: String,
    /// Fully-qualified name of the artifact, never imported into itself.
    pub self_import: String,
    /// Call prefix stripped from every call site.
    pub dead_call_prefix: String,
    /// Replacement for the artifact's leading doc comment.
    pub class_comment: String,
    /// Abstract extension points injected into the class body.
    pub abstract_methods: String,
}

impl Default for RegenConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            augmentation_path: PathBuf::from(DEFAULT_AUGMENTATION_PATH),
            destination_path: PathBuf::from(DEFAULT_DESTINATION_PATH),
            class_name: DEFAULT_CLASS_NAME.to_string(),
            marker: DEFAULT_MARKER.to_string(),
            self_import: DEFAULT_SELF_IMPORT.to_string(),
            dead_call_prefix: DEFAULT_DEAD_CALL_PREFIX.to_string(),
            class_comment: DEFAULT_CLASS_COMMENT.to_string(),
            abstract_methods: DEFAULT_ABSTRACT_METHODS.to_string(),
        }
    }
}

impl RegenConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        let required: [(&'static str, &str); 5] = [
            ("url", &self.url),
            ("class_name", &self.class_name),
            ("marker", &self.marker),
            ("self_import", &self.self_import),
            ("dead_call_prefix", &self.dead_call_prefix),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                issues.push(ValidationIssue::MissingField { field });
            }
        }

        if self.augmentation_path.as_os_str().is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "augmentation_path",
            });
        }
        if self.destination_path.as_os_str().is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "destination_path",
            });
        }

        let url = self.url.trim();
        if !url.is_empty() && !(url.starts_with("https://") || url.starts_with("http://")) {
            issues.push(ValidationIssue::InvalidValue {
                field: "url",
                message: format!("'{url}' is not an http(s) URL"),
            });
        }

        if !self.class_name.trim().is_empty()
            && !self.self_import.trim().is_empty()
            && !self
                .self_import
                .ends_with(&format!(".{}", self.class_name))
            && self.self_import != self.class_name
        {
            issues.push(ValidationIssue::InvalidValue {
                field: "self_import",
                message: format!(
                    "'{}' does not name class '{}'",
                    self.self_import, self.class_name
                ),
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    pub fn augmentation_file(&self, root: &Path) -> PathBuf {
        root.join(&self.augmentation_path)
    }

    pub fn destination_file(&self, root: &Path) -> PathBuf {
        root.join(&self.destination_path)
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    MissingField {
        field: &'static str,
    },
    InvalidValue {
        field: &'static str,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField { field } => {
                write!(f, "missing required field '{field}'")
            }
            ValidationIssue::InvalidValue { field, message } => {
                write!(f, "invalid value for '{field}': {message}")
            }
        }
    }
}
