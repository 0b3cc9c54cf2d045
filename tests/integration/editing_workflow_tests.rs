/*!
 * End-to-end editing workflow against a JSON project directory
 */

use anyhow::Result;
use std::fs;

use subbank::app_config::Config;
use subbank::editor::SceneOrigin;
use subbank::errors::EditError;
use subbank::repl::{MockReplClient, BUMP_TEXT_VERSION_FORM, MAKE_TEXT_FORM};
use subbank::session::{EditorSession, RebuildOutcome};
use subbank::store::{BankStore, JsonBankStore};

use crate::common;

fn open_session(root: &std::path::Path, repl: MockReplClient) -> Result<EditorSession> {
    let mut config = Config::for_project(root.display().to_string());
    config.editor.current_language = 1;
    config.editor.base_language = 0;
    let mut session = EditorSession::new(config, Box::new(JsonBankStore::new(root)), Box::new(repl));
    session.load()?;
    Ok(session)
}

/// Translate a base scene into a second language and push it to the game
#[tokio::test]
async fn test_translateSceneFromBase_shouldPersistAndRebuild() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    JsonBankStore::new(temp_dir.path()).save(&[
        common::sample_bank(0, "english.json"),
        common::empty_bank(1, "french.json"),
    ])?;

    let repl = MockReplClient::connected();
    let mut session = open_session(temp_dir.path(), repl.clone())?;

    // Base scenes show up as missing from the French bank
    let missing: Vec<(String, SceneOrigin)> = session
        .model()
        .merged_view(1, 0)
        .map(|listed| (listed.name.to_string(), listed.origin))
        .collect();
    assert_eq!(
        missing,
        vec![
            ("intro".to_string(), SceneOrigin::BaseOnly),
            ("outro".to_string(), SceneOrigin::BaseOnly)
        ]
    );

    session.model_mut().copy_scene(0, 1, "intro")?;
    session.model_mut().select_scene(1, "intro")?;
    {
        let draft = session.model_mut().line_draft_mut();
        draft.start = 30.0;
        draft.end = 40.0;
        draft.text = "quatrième".to_string();
    }
    session.submit_new_line()?;
    session.model_mut().delete_lines(1, "intro", &[0, 1])?;
    session.set_speaker_display("jak", "Jak")?;

    let status = session.save().await;
    assert!(status.saved);
    assert_eq!(status.rebuild, RebuildOutcome::Requested);
    assert_eq!(repl.received(), vec![MAKE_TEXT_FORM, BUMP_TEXT_VERSION_FORM]);

    // The English bank is untouched by edits to its copy
    let reopened = open_session(temp_dir.path(), MockReplClient::working())?;
    let english = reopened.model().scene(0, "intro").unwrap();
    assert_eq!(english.len(), 3);

    let french = reopened.model().scene(1, "intro").unwrap();
    let texts: Vec<&str> = french.lines().iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["third", "quatrième"]);
    assert_eq!(reopened.speaker_display(1, "jak").as_deref(), Some("Jak"));
    assert!(!reopened.model().scene_exists(1, "outro"));
    Ok(())
}

/// Saving writes each bank back to its own file
#[tokio::test]
async fn test_save_shouldWriteEachBankToItsFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    JsonBankStore::new(temp_dir.path()).save(&[
        common::sample_bank(0, "english.json"),
        common::sample_bank(1, "nested/french.json"),
    ])?;

    let mut session = open_session(temp_dir.path(), MockReplClient::working())?;
    session.model_mut().delete_scene(1, "outro")?;
    let status = session.save().await;

    assert!(status.saved);
    assert_eq!(status.rebuild, RebuildOutcome::Skipped);
    let french = fs::read_to_string(temp_dir.path().join("nested").join("french.json"))?;
    let english = fs::read_to_string(temp_dir.path().join("english.json"))?;
    assert!(!french.contains("\"outro\""));
    assert!(english.contains("\"outro\""));
    Ok(())
}

/// Protected operations leave the files alone
#[tokio::test]
async fn test_rejectedEdits_shouldNotChangeSavedBanks() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = JsonBankStore::new(temp_dir.path());
    store.save(&[common::sample_bank(0, "english.json"), common::empty_bank(1, "french.json")])?;
    let before = store.load()?;

    let mut session = open_session(temp_dir.path(), MockReplClient::working())?;
    assert!(matches!(
        session.model_mut().delete_line(0, "outro", 0),
        Err(EditError::LastLineProtected { .. })
    ));
    assert!(matches!(
        session.model_mut().delete_lines(0, "intro", &[0, 1, 2]),
        Err(EditError::LastLineProtected { .. })
    ));
    assert!(matches!(
        session.model_mut().copy_scene(1, 0, "intro"),
        Err(EditError::DuplicateScene { .. })
    ));
    session.save().await;

    assert_eq!(store.load()?, before);
    Ok(())
}
