//! End-to-end pipeline behaviour on small synthetic artifacts.

use artifact_regen::config::schema::{DEFAULT_ABSTRACT_METHODS, DEFAULT_CLASS_COMMENT};
use artifact_regen::{
    regenerate, render, PayloadError, RegenConfig, RegenError, RuleError, StaticSource,
};
use std::fs;
use tempfile::TempDir;

const MINIMAL_ARTIFACT: &str = "package p;

import java.io.InputStream;

/**
 * Upstream.
 */
public final class FileConfiguration {

    /**
     * Instantiates a new File configuration.
     */
    public FileConfiguration(InputStream stream) {
    }

    /**
     * Reload.
     */
    public void reload() {
    }
}
";

const MINIMAL_HELPERS: &str = "import java.util.Map;
import it.fulminazzo.yamlparser.configuration.FileConfiguration;

class FileConfigurationStaticMethods {

    static void helper() {
    }
}
";

fn setup_project(helpers: &str) -> (TempDir, RegenConfig) {
    let dir = TempDir::new().unwrap();
    let config = RegenConfig::default();
    let path = config.augmentation_file(dir.path());
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, helpers).unwrap();
    (dir, config)
}

#[test]
fn test_round_trip_shape() {
    let (dir, config) = setup_project(MINIMAL_HELPERS);
    let report = regenerate(&config, dir.path(), &StaticSource(MINIMAL_ARTIFACT.to_string()))
        .unwrap();

    let expected = format!(
        "package p;\n\nimport java.util.Map;\nimport java.io.InputStream;\n\n\
         {DEFAULT_CLASS_COMMENT}\npublic abstract class FileConfiguration {{\n\n    \
         /**\n     * Instantiates a new File configuration.\n     */\n    \
         protected FileConfiguration(InputStream stream) {{\n    }}\n\n    \
         {DEFAULT_ABSTRACT_METHODS}/**\n     * Reload.\n     */\n    \
         public void reload() {{\n    }}\n\n    static void helper() {{\n    }}\n}}\n"
    );

    let written = fs::read_to_string(&report.destination).unwrap();
    assert_eq!(written, expected);

    assert!(written.contains("public abstract class FileConfiguration"));
    assert!(!written.contains("public FileConfiguration("));
    assert!(written.contains("protected abstract Map<?, ?> load(@NotNull final InputStream stream);"));
    assert!(written.contains(
        "protected abstract void dump(@NotNull final Map<?, ?> data, @NotNull final Writer writer);"
    ));
    assert!(written.ends_with("    static void helper() {\n    }\n}\n"));
}

#[test]
fn test_self_import_elided() {
    let (dir, config) = setup_project(MINIMAL_HELPERS);
    let rendered = render(&config, dir.path(), &StaticSource(MINIMAL_ARTIFACT.to_string()))
        .unwrap();

    assert!(!rendered.payload.imports.contains(&config.self_import));
    assert!(!rendered
        .text
        .contains("import it.fulminazzo.yamlparser.configuration.FileConfiguration;"));
}

#[test]
fn test_existing_import_not_duplicated() {
    let helpers = "import java.io.InputStream;\nimport java.util.Map;\n\
                   class FileConfigurationStaticMethods {\n}\n";
    let (dir, config) = setup_project(helpers);
    let rendered = render(&config, dir.path(), &StaticSource(MINIMAL_ARTIFACT.to_string()))
        .unwrap();

    assert_eq!(rendered.text.matches("import java.io.InputStream;").count(), 1);
    assert_eq!(rendered.text.matches("import java.util.Map;").count(), 1);
}

#[test]
fn test_dead_call_sites_flattened() {
    let artifact = MINIMAL_ARTIFACT.replace(
        "    public void reload() {\n    }",
        "    public void reload() {\n        newYaml().load(stream);\n        newYaml().dump(map, writer);\n    }",
    );
    let (dir, config) = setup_project(MINIMAL_HELPERS);
    let rendered = render(&config, dir.path(), &StaticSource(artifact)).unwrap();

    assert_eq!(rendered.text.matches("newYaml().").count(), 0);
    assert!(rendered.text.contains("        load(stream);\n        dump(map, writer);\n"));
}

/// Each regex anchor, and an input that lacks it.
fn broken_inputs() -> Vec<(&'static str, String)> {
    vec![
        (
            "replace-class-comment",
            MINIMAL_ARTIFACT.replace("/**\n * Upstream.\n */\n", ""),
        ),
        (
            "merge-imports",
            MINIMAL_ARTIFACT.replace("import java.io.InputStream;\n", ""),
        ),
        (
            "inject-abstract-methods",
            MINIMAL_ARTIFACT.replace("     * Reload.", "     * Invalidate."),
        ),
        (
            "inject-static-methods",
            format!("{MINIMAL_ARTIFACT}// trailing comment\n"),
        ),
    ]
}

#[test]
fn test_missing_anchor_writes_nothing() {
    for (step, artifact) in broken_inputs() {
        let (dir, config) = setup_project(MINIMAL_HELPERS);
        let err = regenerate(&config, dir.path(), &StaticSource(artifact)).unwrap_err();

        match &err {
            RegenError::Rule(RuleError::AnchorNotFound { step: failed, pattern }) => {
                assert_eq!(failed, step);
                assert!(err.to_string().contains(pattern.as_str()));
            }
            other => panic!("{step}: unexpected error {other}"),
        }
        assert!(
            !config.destination_file(dir.path()).exists(),
            "{step}: destination must not be created"
        );
    }
}

#[test]
fn test_missing_anchor_keeps_previous_file() {
    let (dir, config) = setup_project(MINIMAL_HELPERS);
    let destination = config.destination_file(dir.path());
    fs::create_dir_all(destination.parent().unwrap()).unwrap();
    fs::write(&destination, "previous generation").unwrap();

    let artifact = MINIMAL_ARTIFACT.replace("import java.io.InputStream;\n", "");
    assert!(regenerate(&config, dir.path(), &StaticSource(artifact)).is_err());
    assert_eq!(fs::read_to_string(&destination).unwrap(), "previous generation");
}

#[test]
fn test_missing_marker_fails_before_fetch() {
    let (dir, config) = setup_project("import java.util.Map;\nclass Other {\n}\n");
    let err = render(&config, dir.path(), &StaticSource(MINIMAL_ARTIFACT.to_string()))
        .unwrap_err();
    assert!(matches!(
        err,
        RegenError::Payload(PayloadError::MissingMarker { .. })
    ));
}

#[test]
fn test_custom_config_paths() {
    let dir = TempDir::new().unwrap();
    let config = RegenConfig {
        augmentation_path: "helpers/Statics.java".into(),
        destination_path: "out/FileConfiguration.java".into(),
        ..RegenConfig::default()
    };
    let helpers = config.augmentation_file(dir.path());
    fs::create_dir_all(helpers.parent().unwrap()).unwrap();
    fs::write(&helpers, MINIMAL_HELPERS).unwrap();

    let report = regenerate(&config, dir.path(), &StaticSource(MINIMAL_ARTIFACT.to_string()))
        .unwrap();
    assert_eq!(report.destination, dir.path().join("out/FileConfiguration.java"));
    assert!(report.destination.exists());
}

#[test]
fn test_crlf_helpers_merge_without_duplicates() {
    let helpers = "import java.io.InputStream;\r\nimport java.util.Map;\r\n\r\n\
                   class FileConfigurationStaticMethods {\r\n\r\n    \
                   static void helper() {\r\n    }\r\n}\r\n";
    let (dir, config) = setup_project(helpers);
    let rendered = render(&config, dir.path(), &StaticSource(MINIMAL_ARTIFACT.to_string()))
        .unwrap();

    assert_eq!(rendered.text.matches("import java.io.InputStream;").count(), 1);
    assert_eq!(rendered.text.matches("import java.util.Map;").count(), 1);
    assert!(!rendered.text.contains('\r'));
    assert!(rendered.text.ends_with("    static void helper() {\n    }\n}\n"));
}
