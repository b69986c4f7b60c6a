mod common;
use crate::common::ConfigFileBuilder;

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use tempfile::{NamedTempFile, TempDir};

use mudscript::cli::CliArgs;
use mudscript::config::{ConfigFile, expand_home, load_and_validate, load_or_default};
use mudscript::errors::MudscriptError;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_full_config_loads() {
    let file = write_config(
        r#"
[scripts]
directories = ["/srv/scripts", "/opt/more"]
fallback_directory = "/var/fallback"

[session]
character = "bob"

[session.properties]
roundtime = "0"

[variables.bob]
weapon = "broadsword"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(
        cfg.script_directories(),
        vec![PathBuf::from("/srv/scripts"), PathBuf::from("/opt/more")]
    );
    assert_eq!(cfg.fallback_directory(), PathBuf::from("/var/fallback"));
    assert_eq!(cfg.session.character.as_deref(), Some("bob"));
    assert_eq!(cfg.session.properties["roundtime"], "0");
    assert_eq!(cfg.variables["bob"]["weapon"], "broadsword");
}

#[test]
fn test_empty_config_uses_defaults() {
    let file = write_config("");

    let cfg = load_and_validate(file.path()).unwrap();

    assert!(cfg.script_directories().is_empty());
    assert_eq!(cfg.scripts.fallback_directory, "$HOME/.mudscript/scripts");
    assert!(cfg.session.character.is_none());
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let cfg = load_or_default(dir.path().join("Mudscript.toml")).unwrap();
    assert!(cfg.variables.is_empty());
    assert!(cfg.fallback_directory().ends_with(".mudscript/scripts"));
}

#[test]
fn test_empty_directory_entry_is_config_error() {
    let file = write_config(
        r#"
[scripts]
directories = ["/ok", "  "]
"#,
    );

    match load_and_validate(file.path()) {
        Err(MudscriptError::ConfigError(msg)) => {
            assert!(msg.contains("[scripts].directories[1]"), "{msg}");
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_blank_character_is_config_error() {
    let file = write_config(
        r#"
[session]
character = ""
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(MudscriptError::ConfigError(_))
    ));
}

#[test]
fn test_invalid_variable_name_is_config_error() {
    let raw = ConfigFileBuilder::new()
        .with_variable("bob", "two words", "x")
        .raw();

    match ConfigFile::try_from(raw) {
        Err(MudscriptError::ConfigError(msg)) => {
            assert!(msg.contains("two words"), "{msg}");
            assert!(msg.contains("[variables.bob]"), "{msg}");
        }
        other => panic!("Expected ConfigError, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_bad_toml_is_toml_error() {
    let file = write_config("[scripts\ndirectories = 3");

    assert!(matches!(
        load_and_validate(file.path()),
        Err(MudscriptError::TomlError(_))
    ));
}

#[test]
fn test_builder_config_is_valid() {
    let cfg = ConfigFileBuilder::new()
        .with_directory("/srv/scripts")
        .with_fallback("/tmp/fallback")
        .with_character("alice")
        .build();

    assert_eq!(cfg.script_directories(), vec![PathBuf::from("/srv/scripts")]);
    assert_eq!(cfg.fallback_directory(), PathBuf::from("/tmp/fallback"));
}

#[test]
fn test_expand_home() {
    if let Some(home) = dirs::home_dir() {
        assert_eq!(expand_home("~"), home);
        assert_eq!(expand_home("~/scripts"), home.join("scripts"));
        assert_eq!(
            expand_home("$HOME/scripts"),
            PathBuf::from(format!("{}/scripts", home.display()))
        );
    }
    assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
}

#[test]
fn test_cli_arguments() {
    let args = CliArgs::try_parse_from([
        "mudscript",
        "--character",
        "bob",
        "--property",
        "hp=100",
        "--script-dir",
        "/a",
        "--script-dir",
        "/b",
        ".hunt goblin",
        "walk",
    ])
    .unwrap();

    assert_eq!(args.config, PathBuf::from("Mudscript.toml"));
    assert_eq!(args.character.as_deref(), Some("bob"));
    assert_eq!(args.properties, vec![("hp".to_string(), "100".to_string())]);
    assert_eq!(args.script_dirs, vec!["/a", "/b"]);
    assert_eq!(args.commands, vec![".hunt goblin", "walk"]);
    assert!(!args.dry_run);
}

#[test]
fn test_cli_rejects_malformed_property() {
    assert!(CliArgs::try_parse_from(["mudscript", "--property", "novalue"]).is_err());
}
