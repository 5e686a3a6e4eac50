//! Integration tests for ConfigManager and the settings file
//!
//! These tests verify:
//! - First-run creation with discovered or prompted mkvmerge path
//! - Completion of partially written files
//! - Interactive editing
//! - Error reporting for malformed files

use camino::Utf8PathBuf;
use maika_mux::ConfigManager;
use maika_mux::config::CONFIG_FILE_NAME;
use maika_mux::models::RawSettings;
use maika_mux::ui::ScriptedPrompter;
use std::fs;
use tempfile::TempDir;

fn create_test_config() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().unwrap();
    let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, ConfigManager::new(dir.join(CONFIG_FILE_NAME)))
}

#[test]
fn test_first_run_uses_discovered_mkvmerge() {
    let (_temp_dir, manager) = create_test_config();
    let mut prompter = ScriptedPrompter::default();

    let settings = manager
        .load_or_init_with(&mut prompter, || Some(Utf8PathBuf::from("/usr/bin/mkvmerge")))
        .unwrap();

    assert_eq!(settings.mkvmerge_path, Utf8PathBuf::from("/usr/bin/mkvmerge"));
    assert!(settings.overwrite_original);
    assert!(settings.create_folders);
    assert!(settings.save_mux_log);
    assert!(prompter.questions.is_empty());

    // Written back immediately with every key present
    let raw = manager.load_raw().unwrap();
    assert!(!raw.is_incomplete());
}

#[test]
fn test_first_run_prompts_when_not_found() {
    let (_temp_dir, manager) = create_test_config();
    let mut prompter = ScriptedPrompter::new(["", "/opt/mkvtoolnix/mkvmerge"]);

    let settings = manager.load_or_init_with(&mut prompter, || None).unwrap();

    assert_eq!(settings.mkvmerge_path, Utf8PathBuf::from("/opt/mkvtoolnix/mkvmerge"));
    assert_eq!(prompter.questions.len(), 2);
    assert_eq!(prompter.messages, vec!["mkvmerge not found in default locations."]);
}

#[test]
fn test_partial_file_is_completed() {
    let (_temp_dir, manager) = create_test_config();
    fs::write(
        manager.config_path(),
        "MKVMergePath: /custom/mkvmerge\nOverwriteOriginal: 'False'\n",
    )
    .unwrap();

    let mut prompter = ScriptedPrompter::default();
    let settings = manager
        .load_or_init_with(&mut prompter, || panic!("lookup not needed"))
        .unwrap();

    assert_eq!(settings.mkvmerge_path, Utf8PathBuf::from("/custom/mkvmerge"));
    assert!(!settings.overwrite_original);
    assert!(settings.create_folders);
    assert!(settings.save_mux_log);

    let written = fs::read_to_string(manager.config_path()).unwrap();
    assert!(written.contains("MKVMergePath"));
    assert!(written.contains("OverwriteOriginal"));
    assert!(written.contains("CreateFolders"));
    assert!(written.contains("SaveMuxLog"));
}

#[test]
fn test_complete_file_round_trip() {
    let (_temp_dir, manager) = create_test_config();
    fs::write(
        manager.config_path(),
        "MKVMergePath: /m\nOverwriteOriginal: false\nCreateFolders: no\nSaveMuxLog: True\n",
    )
    .unwrap();

    let mut prompter = ScriptedPrompter::default();
    let settings = manager
        .load_or_init_with(&mut prompter, || panic!("lookup not needed"))
        .unwrap();

    assert!(!settings.overwrite_original);
    assert!(!settings.create_folders);
    assert!(settings.save_mux_log);
    assert_eq!(manager.load_raw().unwrap(), RawSettings::from(&settings));
}

#[test]
fn test_edit_interactively() {
    let (_temp_dir, manager) = create_test_config();
    let mut prompter = ScriptedPrompter::default();
    let current = manager
        .load_or_init_with(&mut prompter, || Some(Utf8PathBuf::from("/usr/bin/mkvmerge")))
        .unwrap();

    // Keep the path, turn off overwrite, keep folders, invalid then "false" for the log
    let mut prompter = ScriptedPrompter::new(["", "False", "", "sometimes", "false"]);
    let edited = manager.edit_interactively(&current, &mut prompter).unwrap();

    assert_eq!(edited.mkvmerge_path, current.mkvmerge_path);
    assert!(!edited.overwrite_original);
    assert!(edited.create_folders);
    assert!(!edited.save_mux_log);
    assert!(prompter.questions[0].contains("[/usr/bin/mkvmerge]"));
    assert!(prompter.questions[1].contains("[True]"));

    let reloaded = manager
        .load_or_init_with(&mut ScriptedPrompter::default(), || None)
        .unwrap();
    assert_eq!(reloaded, edited);
}

#[test]
fn test_malformed_file_is_an_error() {
    let (_temp_dir, manager) = create_test_config();
    fs::write(manager.config_path(), "OverwriteOriginal: [1, 2\n").unwrap();

    let mut prompter = ScriptedPrompter::default();
    assert!(manager.load_or_init_with(&mut prompter, || None).is_err());
}

#[test]
fn test_invalid_boolean_is_an_error() {
    let (_temp_dir, manager) = create_test_config();
    fs::write(manager.config_path(), "SaveMuxLog: sometimes\n").unwrap();

    assert!(manager.load_raw().is_err());
}
