//! Tests for client configuration and puzzle file loading.

use crossplay::{ClientConfig, load_puzzle, load_script};
use crossplay_core::{Action, CellKey, validate_puzzle};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_config_from_file() {
    let file = write_temp(
        r#"
participant_id = "ann"
display_name = "Ann"
autocheck = true
log_filter = "warn"
"#,
    );
    let config = ClientConfig::from_file(file.path()).unwrap();
    assert_eq!(config.participant_id(), "ann");
    assert_eq!(config.display_name(), "Ann");
    assert!(*config.autocheck());
    assert!(!*config.pencil_mode());
    assert_eq!(config.log_filter(), "warn");

    let local = config.local_state();
    assert!(local.autocheck);
    assert!(!local.pencil_mode);
    assert_eq!(config.participant().id, "ann");
}

#[test]
fn test_config_defaults_fill_missing_fields() {
    let file = write_temp("pencil_mode = true\n");
    let config = ClientConfig::from_file(file.path()).unwrap();
    assert_eq!(config.participant_id(), "player-1");
    assert_eq!(config.display_name(), "Player 1");
    assert!(config.local_state().pencil_mode);
    assert_eq!(
        ClientConfig::default().log_filter(),
        config.log_filter()
    );
}

#[test]
fn test_config_rejects_bad_input() {
    let file = write_temp("participant_id = [");
    let error = ClientConfig::from_file(file.path()).unwrap_err();
    assert!(error.message.contains("Failed to parse config"));

    let file = write_temp("participant_id = \"  \"\n");
    let error = ClientConfig::from_file(file.path()).unwrap_err();
    assert!(error.message.contains("participant_id"));

    assert!(ClientConfig::from_file("/nonexistent/crossplay.toml").is_err());
}

#[test]
fn test_sample_config_loads() {
    let config = ClientConfig::from_file(concat!(env!("CARGO_MANIFEST_DIR"), "/crossplay.toml"));
    assert!(config.is_ok());
}

#[test]
fn test_load_bundled_puzzles() {
    for name in ["cat_web", "hello", "rebus"] {
        let path = format!("{}/puzzles/{name}.json", env!("CARGO_MANIFEST_DIR"));
        let puzzle = load_puzzle(&path).unwrap();
        validate_puzzle(&puzzle).unwrap();
    }
}

#[test]
fn test_core_fixtures_match_bundled_puzzles() {
    for name in ["cat_web", "hello", "rebus"] {
        let bundled = format!("{}/puzzles/{name}.json", env!("CARGO_MANIFEST_DIR"));
        let core = format!(
            "{}/crates/crossplay_core/puzzles/{name}.json",
            env!("CARGO_MANIFEST_DIR")
        );
        assert_eq!(load_puzzle(&core).unwrap(), load_puzzle(&bundled).unwrap());
    }
}

#[test]
fn test_load_puzzle_errors() {
    let file = write_temp("{ \"puzzleID\": ");
    let error = load_puzzle(file.path()).unwrap_err();
    assert!(error.message.contains("Failed to parse puzzle"));
    assert!(load_puzzle("/nonexistent/puzzle.json").is_err());
}

#[test]
fn test_load_script() {
    let file = write_temp(
        r#"[
  { "type": "CELL_CLICKED", "payload": "2,1" },
  { "type": "LETTER_PRESSED", "payload": "a" },
  { "type": "REVEAL_MOST_SQUARES" }
]"#,
    );
    let actions = load_script(file.path()).unwrap();
    assert_eq!(
        actions,
        vec![
            Action::CellClicked(CellKey::new(2, 1)),
            Action::LetterPressed('a'),
            Action::RevealMostSquares,
        ]
    );

    let file = write_temp(r#"[{ "type": "DANCE" }]"#);
    assert!(load_script(file.path()).is_err());
}
